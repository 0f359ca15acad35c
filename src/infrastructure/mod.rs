//! 基础设施层：持有浏览器资源，只暴露驱动表单的能力

pub mod chrome_driver;
pub mod form_driver;
pub mod js_executor;

pub use chrome_driver::{ChromeFormDriver, DriverTimings};
pub use form_driver::FormDriver;
pub use js_executor::JsExecutor;

//! 编排层（Orchestration Layer）
//!
//! ```text
//! app (配置 + 浏览器 + 表格文件)
//!     ↓
//! batch_processor (处理 Vec<RawRow>)
//!     ↓
//! workflow::RecordFlow (处理单个 Record)
//!     ↓
//! infrastructure::FormDriver (驱动表单)
//! ```
//!
//! 只有编排层持有浏览器驱动；批处理器只依赖 `FormDriver` trait。

pub mod app;
pub mod batch_processor;

pub use app::App;
pub use batch_processor::BatchProcessor;

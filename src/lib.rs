//! # Form Batch Submit
//!
//! 读取 Excel 表格，逐行驱动浏览器填写并提交固定的网页表单
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（浏览器会话），只暴露能力
//! - `FormDriver` - 表单驱动 trait，批处理器只依赖它
//! - `ChromeFormDriver` - 基于 chromiumoxide 的唯一实现
//!
//! ### ② 能力层（Services）
//! - `ProgressSink` - 进度上报（控制台、通道、闭包）
//! - `FailureReportWriter` - 写失败明细
//!
//! ### ③ 流程层（Workflow）
//! - `RecordFlow` - 一条记录的完整流程（清空 → 填写 → 选择 → 保存）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批处理器：校验、逐行驱动、统计、取消、释放
//! - `orchestrator/app` - 配置 + 浏览器 + 表格文件的组装
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, FormLayout};
pub use error::{AppError, AppResult, DriverError, RecordError, SourceError};
pub use infrastructure::{ChromeFormDriver, FormDriver};
pub use models::{BatchStats, Cell, FailureDetail, RawRow, Record, RecordSource};
pub use orchestrator::{App, BatchProcessor};
pub use services::{ProgressEvent, ProgressSink};
pub use workflow::{RecordFlow, RecordOutcome, RowCtx};

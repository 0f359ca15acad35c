pub mod record_flow;
pub mod row_ctx;

pub use record_flow::{RecordFlow, RecordOutcome};
pub use row_ctx::RowCtx;

pub mod xlsx_loader;

pub use xlsx_loader::XlsxSource;

use crate::error::SourceError;
use crate::models::record::RawRow;

/// 原始行来源
///
/// 返回的第一行是表头。
pub trait RecordSource {
    fn read_rows(&mut self) -> Result<Vec<RawRow>, SourceError>;
}

/// 内存中的行来源，用于测试或由调用方预先读取的数据
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: Vec<RawRow>,
}

impl MemorySource {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self { rows }
    }
}

impl RecordSource for MemorySource {
    fn read_rows(&mut self) -> Result<Vec<RawRow>, SourceError> {
        Ok(self.rows.clone())
    }
}

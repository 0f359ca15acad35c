//! 行处理上下文
//!
//! 封装"我正在处理表格的第几行"这一信息

use std::fmt::Display;

/// 行处理上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCtx {
    /// 表格中的物理行号（表头为第 1 行）
    pub row_number: usize,

    /// 在非空数据行中的序号（从 1 开始），用于进度
    pub position: usize,

    /// 非空数据行总数
    pub total: usize,
}

impl RowCtx {
    /// `data_index` 为数据行下标（第一条数据行为 1）
    pub fn new(data_index: usize, position: usize, total: usize) -> Self {
        Self {
            row_number: data_index + 1,
            position,
            total,
        }
    }
}

impl Display for RowCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[行 {} | {}/{}]", self.row_number, self.position, self.total)
    }
}

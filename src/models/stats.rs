//! 批处理统计

use serde::{Deserialize, Serialize};

/// 关键失败使用的行号
pub const CRITICAL_ROW: usize = 0;
/// 关键失败使用的标签
pub const CRITICAL_LABEL: &str = "CRITICAL";

/// 单行失败详情
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDetail {
    /// 表格中的物理行号（表头为第 1 行）；关键失败为 0
    pub row_number: usize,
    pub label: String,
    pub reason: String,
}

/// 一次批处理的统计结果
///
/// `succeeded + failed` 只有在被取消时才会小于 `total`。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<FailureDetail>,
}

impl BatchStats {
    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_failure(
        &mut self,
        row_number: usize,
        label: impl Into<String>,
        reason: impl Into<String>,
    ) {
        self.failed += 1;
        self.failures.push(FailureDetail {
            row_number,
            label: label.into(),
            reason: reason.into(),
        });
    }

    /// 记录导致整批终止的关键失败
    pub fn record_critical(&mut self, reason: impl Into<String>) {
        self.record_failure(CRITICAL_ROW, CRITICAL_LABEL, reason);
    }

    /// 已处理（成功或失败）的行数
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }

    /// 因取消而未处理的行数
    pub fn unprocessed(&self) -> usize {
        self.total.saturating_sub(self.processed())
    }

    pub fn is_critical(&self) -> bool {
        self.failures.iter().any(|f| f.row_number == CRITICAL_ROW)
    }
}

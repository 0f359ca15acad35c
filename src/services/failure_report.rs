//! 失败明细写入服务
//!
//! 只负责把一次批处理的失败列表写入文本文件

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::AppResult;
use crate::models::BatchStats;

/// 失败明细写入服务
pub struct FailureReportWriter {
    report_path: PathBuf,
}

impl FailureReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            report_path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.report_path
    }

    /// 追加本次运行的失败明细，没有失败时不写文件
    ///
    /// 返回写入的条数。
    pub fn write(&self, source_name: &str, stats: &BatchStats) -> AppResult<usize> {
        if stats.failures.is_empty() {
            return Ok(0);
        }

        debug!(
            "写入失败明细: {} 条 -> {}",
            stats.failures.len(),
            self.report_path.display()
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.report_path)?;

        let mut content = format!(
            "# {} | {} | succeeded {} / failed {} / total {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            source_name,
            stats.succeeded,
            stats.failed,
            stats.total
        );
        for failure in &stats.failures {
            content.push_str(&format!(
                "row {}: {} - {}\n",
                failure.row_number, failure.label, failure.reason
            ));
        }

        file.write_all(content.as_bytes())?;
        Ok(stats.failures.len())
    }
}

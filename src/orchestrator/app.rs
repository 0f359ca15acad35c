//! 应用入口 - 编排层
//!
//! 持有配置和浏览器驱动，把一个表格文件交给批处理器，
//! 结束后输出统计并写入失败明细。

use std::path::Path;

use anyhow::{bail, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Config;
use crate::infrastructure::{ChromeFormDriver, FormDriver};
use crate::models::{BatchStats, XlsxSource};
use crate::orchestrator::BatchProcessor;
use crate::services::{FailureReportWriter, ProgressSink};
use crate::utils::logging::{log_startup, print_final_stats};

/// 应用主结构
pub struct App<D = ChromeFormDriver> {
    config: Config,
    driver: D,
}

impl App<ChromeFormDriver> {
    /// 初始化应用：启动或连接浏览器
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);
        let driver = ChromeFormDriver::open(&config).await?;
        Ok(Self::with_driver(config, driver))
    }
}

impl<D: FormDriver> App<D> {
    pub fn with_driver(config: Config, driver: D) -> Self {
        Self { config, driver }
    }

    /// 处理一个表格文件
    ///
    /// 浏览器会话在返回前被释放。
    pub async fn run(
        mut self,
        input: &Path,
        cancel: CancellationToken,
        sink: &dyn ProgressSink,
    ) -> Result<BatchStats> {
        if !input.exists() {
            self.driver.release().await;
            bail!("文件不存在: {}", input.display());
        }

        let mut source = XlsxSource::new(input);
        let processor = BatchProcessor::from_config(&self.config).with_cancellation(cancel);
        let stats = processor.run(&mut source, &mut self.driver, sink).await;

        print_final_stats(&stats);
        self.write_failure_report(input, &stats);

        Ok(stats)
    }

    fn write_failure_report(&self, input: &Path, stats: &BatchStats) {
        let writer = FailureReportWriter::new(&self.config.failure_report_file);
        let source_name = input
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        match writer.write(&source_name, stats) {
            Ok(0) => {}
            Ok(count) => info!(
                "📋 {} 条失败明细已写入: {}",
                count,
                writer.path().display()
            ),
            Err(e) => warn!("写入失败明细失败: {}", e),
        }
    }
}

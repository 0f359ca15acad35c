//! 批处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **打开表单**：导航失败属于关键失败，整批终止
//! 2. **读取行**：跳过表头和空行，确定总数
//! 3. **逐行处理**：校验 → 驱动表单 → 记录结果，单行失败不影响后续行
//! 4. **取消**：每行开始前检查取消信号
//! 5. **释放资源**：任何退出路径都调用一次 `release()`
//!
//! 严格按表格顺序处理，不并发：目标表单每次提交都有状态，
//! 而且失败明细中的行号必须与表格一致。

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::{Config, FormLayout};
use crate::infrastructure::FormDriver;
use crate::models::{is_blank, row_label, BatchStats, RawRow, Record, RecordSource};
use crate::services::{ProgressEvent, ProgressSink};
use crate::workflow::{RecordFlow, RecordOutcome, RowCtx};

/// 批处理器
pub struct BatchProcessor {
    target_url: String,
    flow: RecordFlow,
    cancel: CancellationToken,
}

impl BatchProcessor {
    pub fn new(target_url: impl Into<String>, layout: FormLayout) -> Self {
        Self {
            target_url: target_url.into(),
            flow: RecordFlow::new(layout),
            cancel: CancellationToken::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.target_url.clone(), config.form.clone())
    }

    /// 使用调用方提供的取消信号
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// 执行一次批处理
    ///
    /// 总是返回统计结果，不向外抛出错误。返回前驱动恰好被释放一次。
    /// 被取消时 `total` 保持原值，未处理的行既不算成功也不算失败。
    pub async fn run<S, D>(
        &self,
        source: &mut S,
        driver: &mut D,
        sink: &dyn ProgressSink,
    ) -> BatchStats
    where
        S: RecordSource + ?Sized,
        D: FormDriver + ?Sized,
    {
        let stats = self.execute(source, driver, sink).await;
        driver.release().await;
        stats
    }

    async fn execute<S, D>(
        &self,
        source: &mut S,
        driver: &mut D,
        sink: &dyn ProgressSink,
    ) -> BatchStats
    where
        S: RecordSource + ?Sized,
        D: FormDriver + ?Sized,
    {
        let mut stats = BatchStats::default();

        emit(sink, ProgressEvent::info(format!("Opening {}", self.target_url)));
        if let Err(e) = driver.navigate_to_form(&self.target_url).await {
            error!("❌ 关键错误，批处理终止: {}", e);
            stats.record_critical(e.to_string());
            return stats;
        }

        let rows = match source.read_rows() {
            Ok(rows) => rows,
            Err(e) => {
                error!("❌ 关键错误，无法读取表格: {}", e);
                stats.record_critical(e.to_string());
                return stats;
            }
        };

        let data_rows = data_rows(rows);
        stats.total = data_rows.len();
        emit(
            sink,
            ProgressEvent::info(format!("Starting processing of {} records", stats.total)),
        );

        for (position, (data_index, row)) in data_rows.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!(
                    "⏹️ 收到停止信号，已处理 {}/{}，剩余 {} 行未处理",
                    stats.processed(),
                    stats.total,
                    stats.unprocessed()
                );
                emit(
                    sink,
                    ProgressEvent::info(format!(
                        "Stopped: {} of {} records processed",
                        stats.processed(),
                        stats.total
                    )),
                );
                return stats;
            }

            let ctx = RowCtx::new(*data_index, position + 1, stats.total);

            let record = match Record::parse(row) {
                Ok(record) => record,
                Err(e) => {
                    warn!("{} ⚠️ 数据无效: {}", ctx, e);
                    stats.record_failure(ctx.row_number, row_label(row), e.to_string());
                    continue;
                }
            };

            emit(
                sink,
                ProgressEvent::step(
                    format!("Processing: {}", record.label()),
                    ctx.position,
                    ctx.total,
                ),
            );

            match self.flow.run(driver, &record, &ctx).await {
                RecordOutcome::Success => stats.record_success(),
                RecordOutcome::Failure(reason) => {
                    stats.record_failure(ctx.row_number, record.item.clone(), reason)
                }
            }
        }

        emit(
            sink,
            ProgressEvent::info(format!(
                "Processing finished: {} succeeded, {} failed",
                stats.succeeded, stats.failed
            )),
        );
        stats
    }
}

/// 去掉表头和空行，保留每行的数据下标（第一条数据行为 1）
fn data_rows(rows: Vec<RawRow>) -> Vec<(usize, RawRow)> {
    rows.into_iter()
        .enumerate()
        .skip(1)
        .filter(|(_, row)| !is_blank(row))
        .collect()
}

fn emit(sink: &dyn ProgressSink, event: ProgressEvent) {
    if event.is_quantitative() {
        info!("{} ({}/{})", event.message, event.current, event.total);
    } else {
        info!("{}", event.message);
    }
    sink.report(&event);
}

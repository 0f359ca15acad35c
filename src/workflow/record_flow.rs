//! 单条记录的表单填写流程 - 流程层
//!
//! 流程顺序：
//! 1. 清空表单（失败只记日志）
//! 2. 依次填写 customer → item → quantity
//! 3. 选择 category
//! 4. 保存

use tracing::{debug, error, warn};

use crate::config::FormLayout;
use crate::error::DriverError;
use crate::infrastructure::FormDriver;
use crate::models::Record;
use crate::workflow::row_ctx::RowCtx;

/// 单条记录的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Success,
    Failure(String),
}

impl RecordOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RecordOutcome::Success)
    }
}

/// 单条记录的处理流程
///
/// 不持有驱动，只知道字段 id 和填写顺序。
pub struct RecordFlow {
    layout: FormLayout,
}

impl RecordFlow {
    pub fn new(layout: FormLayout) -> Self {
        Self { layout }
    }

    /// 驱动一条记录，任何驱动错误都转换为 `RecordOutcome::Failure`
    pub async fn run<D>(&self, driver: &mut D, record: &Record, ctx: &RowCtx) -> RecordOutcome
    where
        D: FormDriver + ?Sized,
    {
        if let Err(e) = driver.clear_form().await {
            warn!("{} ⚠️ 清空表单失败（忽略）: {}", ctx, e);
        }

        match self.fill_and_submit(driver, record).await {
            Ok(()) => {
                debug!("{} ✓ 提交成功: {}", ctx, record);
                RecordOutcome::Success
            }
            Err(e) => {
                error!("{} ❌ 填写记录失败 {}: {}", ctx, record.item, e);
                RecordOutcome::Failure(e.to_string())
            }
        }
    }

    async fn fill_and_submit<D>(&self, driver: &mut D, record: &Record) -> Result<(), DriverError>
    where
        D: FormDriver + ?Sized,
    {
        let quantity = record.quantity.to_string();
        let text_fields = [
            (self.layout.customer_field.as_str(), record.customer.as_str()),
            (self.layout.item_field.as_str(), record.item.as_str()),
            (self.layout.quantity_field.as_str(), quantity.as_str()),
        ];
        for (field_id, value) in text_fields {
            driver.fill_text(field_id, value).await?;
        }

        driver
            .select_option(&self.layout.category_field, &record.category)
            .await?;
        driver.submit().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// 记录调用顺序，可指定在某个字段上失败
    #[derive(Default)]
    struct ScriptedDriver {
        calls: Vec<String>,
        fail_field: Option<&'static str>,
        fail_clear: bool,
    }

    #[async_trait]
    impl FormDriver for ScriptedDriver {
        async fn navigate_to_form(&mut self, url: &str) -> Result<(), DriverError> {
            self.calls.push(format!("navigate:{}", url));
            Ok(())
        }

        async fn clear_form(&mut self) -> Result<(), DriverError> {
            self.calls.push("clear".to_string());
            if self.fail_clear {
                return Err(DriverError::Clear("no clear button".to_string()));
            }
            Ok(())
        }

        async fn fill_text(&mut self, field_id: &str, value: &str) -> Result<(), DriverError> {
            self.calls.push(format!("fill:{}={}", field_id, value));
            if self.fail_field == Some(field_id) {
                return Err(DriverError::field(field_id, "timeout"));
            }
            Ok(())
        }

        async fn select_option(&mut self, field_id: &str, value: &str) -> Result<(), DriverError> {
            self.calls.push(format!("select:{}={}", field_id, value));
            Ok(())
        }

        async fn submit(&mut self) -> Result<(), DriverError> {
            self.calls.push("submit".to_string());
            Ok(())
        }

        async fn release(&mut self) {
            self.calls.push("release".to_string());
        }
    }

    fn record() -> Record {
        Record {
            customer: "Acme".to_string(),
            item: "Widget".to_string(),
            quantity: 3,
            category: "eletronicos".to_string(),
        }
    }

    #[test]
    fn test_fill_order() {
        let flow = RecordFlow::new(FormLayout::default());
        let mut driver = ScriptedDriver::default();

        let outcome =
            tokio_test::block_on(flow.run(&mut driver, &record(), &RowCtx::new(1, 1, 1)));

        assert_eq!(outcome, RecordOutcome::Success);
        assert_eq!(
            driver.calls,
            vec![
                "clear",
                "fill:cliente=Acme",
                "fill:produto=Widget",
                "fill:quantidade=3",
                "select:categoria=eletronicos",
                "submit",
            ]
        );
    }

    #[test]
    fn test_clear_failure_is_ignored() {
        let flow = RecordFlow::new(FormLayout::default());
        let mut driver = ScriptedDriver {
            fail_clear: true,
            ..Default::default()
        };

        let outcome =
            tokio_test::block_on(flow.run(&mut driver, &record(), &RowCtx::new(1, 1, 1)));

        assert!(outcome.is_success());
        assert_eq!(driver.calls.last().map(String::as_str), Some("submit"));
    }

    #[test]
    fn test_field_failure_stops_record() {
        let flow = RecordFlow::new(FormLayout::default());
        let mut driver = ScriptedDriver {
            fail_field: Some("produto"),
            ..Default::default()
        };

        let outcome =
            tokio_test::block_on(flow.run(&mut driver, &record(), &RowCtx::new(1, 1, 1)));

        match outcome {
            RecordOutcome::Failure(reason) => assert!(reason.contains("produto")),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(!driver.calls.iter().any(|c| c == "submit"));
    }
}

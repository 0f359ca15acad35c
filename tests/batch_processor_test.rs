use std::sync::Mutex;

use async_trait::async_trait;
use form_batch_submit::models::MemorySource;
use form_batch_submit::services::{NoProgress, ProgressEvent};
use form_batch_submit::{
    BatchProcessor, Cell, DriverError, FormDriver, FormLayout, RawRow, RecordSource, SourceError,
};
use tokio_util::sync::CancellationToken;

const URL: &str = "http://localhost/form";

/// 内存中的表单驱动，记录所有调用
#[derive(Default)]
struct FakeDriver {
    calls: Vec<String>,
    /// 每次 submit 时 item 字段的值
    submitted: Vec<String>,
    current_item: Option<String>,
    fail_navigation: bool,
    /// 填写到这个值时失败
    fail_on_value: Option<String>,
    /// 选择这个选项时失败
    fail_select_on: Option<String>,
    /// 提交这个 item 时失败
    fail_submit_on: Option<String>,
    /// 第 n 次 submit 后触发取消
    cancel_after: Option<(usize, CancellationToken)>,
    release_count: usize,
}

impl FakeDriver {
    fn fills(&self) -> Vec<&String> {
        self.calls.iter().filter(|c| c.starts_with("fill:")).collect()
    }
}

#[async_trait]
impl FormDriver for FakeDriver {
    async fn navigate_to_form(&mut self, url: &str) -> Result<(), DriverError> {
        self.calls.push(format!("navigate:{}", url));
        if self.fail_navigation {
            return Err(DriverError::navigation(url, "net::ERR_CONNECTION_REFUSED"));
        }
        Ok(())
    }

    async fn clear_form(&mut self) -> Result<(), DriverError> {
        self.calls.push("clear".to_string());
        self.current_item = None;
        Ok(())
    }

    async fn fill_text(&mut self, field_id: &str, value: &str) -> Result<(), DriverError> {
        self.calls.push(format!("fill:{}={}", field_id, value));
        if self.fail_on_value.as_deref() == Some(value) {
            return Err(DriverError::field(field_id, "element not interactable"));
        }
        if field_id == "produto" {
            self.current_item = Some(value.to_string());
        }
        Ok(())
    }

    async fn select_option(&mut self, field_id: &str, value: &str) -> Result<(), DriverError> {
        self.calls.push(format!("select:{}={}", field_id, value));
        if self.fail_select_on.as_deref() == Some(value) {
            return Err(DriverError::field(
                field_id,
                format!("no option with value '{}'", value),
            ));
        }
        Ok(())
    }

    async fn submit(&mut self) -> Result<(), DriverError> {
        self.calls.push("submit".to_string());
        if self.fail_submit_on.is_some() && self.fail_submit_on == self.current_item {
            return Err(DriverError::Submit("save button not found".to_string()));
        }
        self.submitted
            .push(self.current_item.clone().unwrap_or_default());
        if let Some((after, token)) = &self.cancel_after {
            if self.submitted.len() == *after {
                token.cancel();
            }
        }
        Ok(())
    }

    async fn release(&mut self) {
        self.release_count += 1;
    }
}

/// 打不开的表格
struct FailingSource;

impl RecordSource for FailingSource {
    fn read_rows(&mut self) -> Result<Vec<RawRow>, SourceError> {
        Err(SourceError::Open {
            path: "dados.xlsx".to_string(),
            reason: "zip error: invalid archive".to_string(),
        })
    }
}

fn header() -> RawRow {
    vec![
        "Cliente".into(),
        "Produto".into(),
        "Quantidade".into(),
        "Categoria".into(),
    ]
}

fn row(customer: &str, item: &str, quantity: i64, category: &str) -> RawRow {
    vec![
        customer.into(),
        item.into(),
        Cell::Int(quantity),
        category.into(),
    ]
}

fn valid_rows(n: usize) -> Vec<RawRow> {
    let mut rows = vec![header()];
    for i in 1..=n {
        rows.push(row(&format!("Client {}", i), &format!("Item {}", i), i as i64, "eletronicos"));
    }
    rows
}

fn processor() -> BatchProcessor {
    BatchProcessor::new(URL, FormLayout::default())
}

#[tokio::test]
async fn test_all_valid_rows_succeed_in_order() {
    let mut source = MemorySource::new(valid_rows(5));
    let mut driver = FakeDriver::default();

    let stats = processor().run(&mut source, &mut driver, &NoProgress).await;

    assert_eq!(stats.total, 5);
    assert_eq!(stats.succeeded, 5);
    assert_eq!(stats.failed, 0);
    assert!(stats.failures.is_empty());
    assert_eq!(
        driver.submitted,
        vec!["Item 1", "Item 2", "Item 3", "Item 4", "Item 5"]
    );
    assert_eq!(driver.calls.iter().filter(|c| *c == "submit").count(), 5);
    assert_eq!(driver.calls[0], format!("navigate:{}", URL));
    assert_eq!(driver.release_count, 1);
}

#[tokio::test]
async fn test_invalid_row_is_reported_with_physical_line() {
    let mut rows = valid_rows(4);
    // 第 2 条数据行：category 为空
    rows[2] = row("Client 2", "Item 2", 2, "");
    let mut source = MemorySource::new(rows);
    let mut driver = FakeDriver::default();

    let stats = processor().run(&mut source, &mut driver, &NoProgress).await;

    assert_eq!(stats.total, 4);
    assert_eq!(stats.succeeded, 3);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.failures[0].row_number, 3);
    assert_eq!(stats.failures[0].label, "Item 2");
    assert!(stats.failures[0].reason.contains("missing required field"));
    // 无效行不应触发任何填写
    assert!(!driver.fills().iter().any(|c| c.contains("Client 2")));
    assert_eq!(driver.submitted, vec!["Item 1", "Item 3", "Item 4"]);
}

#[tokio::test]
async fn test_blank_rows_are_excluded_from_total() {
    let rows = vec![
        header(),
        row("Client 1", "Item 1", 1, "x"),
        vec![Cell::Empty, "ignored".into(), Cell::Int(1), "x".into()],
        vec![],
        vec![Cell::Empty, "ignored".into(), Cell::Int(1), "x".into()],
        row("Client 2", "", 1, "x"),
    ];
    let mut source = MemorySource::new(rows);
    let mut driver = FakeDriver::default();

    let stats = processor().run(&mut source, &mut driver, &NoProgress).await;

    assert_eq!(stats.total, 2);
    assert_eq!(stats.succeeded, 1);
    assert_eq!(stats.failed, 1);
    // 行号跳过空行后仍与表格一致
    assert_eq!(stats.failures[0].row_number, 6);
    assert_eq!(stats.failures[0].label, "unknown");
}

#[tokio::test]
async fn test_field_failure_does_not_stop_batch() {
    let mut source = MemorySource::new(valid_rows(5));
    let mut driver = FakeDriver {
        fail_on_value: Some("Client 2".to_string()),
        ..Default::default()
    };

    let stats = processor().run(&mut source, &mut driver, &NoProgress).await;

    assert_eq!(stats.total, 5);
    assert_eq!(stats.succeeded, 4);
    assert_eq!(stats.failed, 1);
    let failure = &stats.failures[0];
    assert_eq!(failure.row_number, 3);
    assert_eq!(failure.label, "Item 2");
    assert!(failure.reason.contains("cliente"));
    assert!(failure.reason.contains("element not interactable"));
    assert_eq!(driver.submitted, vec!["Item 1", "Item 3", "Item 4", "Item 5"]);
}

#[tokio::test]
async fn test_navigation_failure_is_critical() {
    let mut source = MemorySource::new(valid_rows(3));
    let mut driver = FakeDriver {
        fail_navigation: true,
        ..Default::default()
    };

    let stats = processor().run(&mut source, &mut driver, &NoProgress).await;

    assert_eq!(stats.total, 0);
    assert_eq!(stats.succeeded, 0);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.failures.len(), 1);
    assert_eq!(stats.failures[0].row_number, 0);
    assert_eq!(stats.failures[0].label, "CRITICAL");
    assert!(stats.failures[0].reason.contains("ERR_CONNECTION_REFUSED"));
    assert!(driver.fills().is_empty());
    assert_eq!(driver.release_count, 1);
}

#[tokio::test]
async fn test_source_error_is_critical() {
    let mut source = FailingSource;
    let mut driver = FakeDriver::default();

    let stats = processor().run(&mut source, &mut driver, &NoProgress).await;

    assert_eq!(stats.total, 0);
    assert_eq!(stats.succeeded, 0);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.failures.len(), 1);
    assert_eq!(stats.failures[0].row_number, 0);
    assert_eq!(stats.failures[0].label, "CRITICAL");
    assert!(stats.failures[0].reason.contains("invalid archive"));
    assert!(stats.is_critical());
    assert!(driver.fills().is_empty());
    assert!(!driver.calls.iter().any(|c| c == "submit"));
    assert_eq!(driver.release_count, 1);
}

#[tokio::test]
async fn test_select_failure_isolated_to_row() {
    let rows = vec![
        header(),
        row("Client 1", "Item 1", 1, "eletronicos"),
        row("Client 2", "Item 2", 2, "brinquedos"),
        row("Client 3", "Item 3", 3, "eletronicos"),
    ];
    let mut source = MemorySource::new(rows);
    let mut driver = FakeDriver {
        fail_select_on: Some("brinquedos".to_string()),
        ..Default::default()
    };

    let stats = processor().run(&mut source, &mut driver, &NoProgress).await;

    assert_eq!(stats.total, 3);
    assert_eq!(stats.succeeded, 2);
    assert_eq!(stats.failed, 1);
    let failure = &stats.failures[0];
    assert_eq!(failure.row_number, 3);
    assert_eq!(failure.label, "Item 2");
    assert!(failure.reason.contains("categoria"));
    assert!(failure.reason.contains("brinquedos"));
    // 选择失败的行不会提交
    assert_eq!(driver.submitted, vec!["Item 1", "Item 3"]);
    assert_eq!(driver.calls.iter().filter(|c| *c == "submit").count(), 2);
    assert_eq!(driver.release_count, 1);
}

#[tokio::test]
async fn test_submit_failure_isolated_to_row() {
    let mut source = MemorySource::new(valid_rows(4));
    let mut driver = FakeDriver {
        fail_submit_on: Some("Item 3".to_string()),
        ..Default::default()
    };

    let stats = processor().run(&mut source, &mut driver, &NoProgress).await;

    assert_eq!(stats.total, 4);
    assert_eq!(stats.succeeded, 3);
    assert_eq!(stats.failed, 1);
    let failure = &stats.failures[0];
    assert_eq!(failure.row_number, 4);
    assert_eq!(failure.label, "Item 3");
    assert!(failure.reason.contains("save button not found"));
    assert_eq!(driver.submitted, vec!["Item 1", "Item 2", "Item 4"]);
    assert_eq!(driver.calls.iter().filter(|c| *c == "submit").count(), 4);
    assert_eq!(driver.release_count, 1);
}

#[tokio::test]
async fn test_cancellation_after_third_row() {
    let token = CancellationToken::new();
    let mut source = MemorySource::new(valid_rows(10));
    let mut driver = FakeDriver {
        cancel_after: Some((3, token.clone())),
        ..Default::default()
    };

    let stats = processor()
        .with_cancellation(token)
        .run(&mut source, &mut driver, &NoProgress)
        .await;

    assert_eq!(stats.total, 10);
    assert_eq!(stats.succeeded + stats.failed, 3);
    assert_eq!(stats.unprocessed(), 7);
    assert_eq!(driver.submitted.len(), 3);
    assert_eq!(driver.release_count, 1);
}

#[tokio::test]
async fn test_cancelled_before_first_row() {
    let processor = processor();
    processor.cancellation_token().cancel();
    let mut source = MemorySource::new(valid_rows(4));
    let mut driver = FakeDriver::default();

    let stats = processor.run(&mut source, &mut driver, &NoProgress).await;

    assert_eq!(stats.total, 4);
    assert_eq!(stats.processed(), 0);
    assert!(stats.failures.is_empty());
    assert_eq!(driver.release_count, 1);
}

#[tokio::test]
async fn test_bad_quantity_is_row_failure() {
    let rows = vec![
        header(),
        vec!["Client 1".into(), "Item 1".into(), "dez".into(), "x".into()],
        row("Client 2", "Item 2", 2, "x"),
    ];
    let mut source = MemorySource::new(rows);
    let mut driver = FakeDriver::default();

    let stats = processor().run(&mut source, &mut driver, &NoProgress).await;

    assert_eq!(stats.succeeded, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.failures[0].row_number, 2);
    assert!(stats.failures[0].reason.contains("not an integer"));
}

#[tokio::test]
async fn test_progress_events() {
    let events = Mutex::new(Vec::new());
    let sink = |event: &ProgressEvent| events.lock().unwrap().push(event.clone());

    let mut rows = valid_rows(2);
    rows.push(row("Client 3", "Item 3", 3, ""));
    let mut source = MemorySource::new(rows);
    let mut driver = FakeDriver::default();

    let stats = processor().run(&mut source, &mut driver, &sink).await;
    assert_eq!(stats.failed, 1);

    let events = events.into_inner().unwrap();
    assert_eq!(events[0], ProgressEvent::info(format!("Opening {}", URL)));
    assert_eq!(events[1], ProgressEvent::info("Starting processing of 3 records"));
    assert_eq!(
        events[2],
        ProgressEvent::step("Processing: Client 1 - Item 1", 1, 3)
    );
    assert_eq!(
        events[3],
        ProgressEvent::step("Processing: Client 2 - Item 2", 2, 3)
    );
    assert_eq!(
        events.last(),
        Some(&ProgressEvent::info("Processing finished: 2 succeeded, 1 failed"))
    );
    assert_eq!(events.len(), 5);
}

#[tokio::test]
async fn test_boxed_driver() {
    let mut source = MemorySource::new(valid_rows(2));
    let mut driver: Box<dyn FormDriver> = Box::new(FakeDriver::default());

    let stats = processor().run(&mut source, &mut driver, &NoProgress).await;

    assert_eq!(stats.succeeded, 2);
}

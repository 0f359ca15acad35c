//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，暴露"执行 JS"和"等待元素"的能力

use std::time::Duration;

use chromiumoxide::{Element, Page};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tokio::time::{sleep, Instant};

use crate::error::DriverError;

/// 轮询元素的间隔
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// JS 执行器
///
/// 不认识 Record，也不处理批处理流程。
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn into_page(self) -> Page {
        self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue, DriverError> {
        let result = self.page.evaluate(js_code.into()).await?;
        result
            .into_value()
            .map_err(|e| DriverError::Session(format!("无法解析脚本结果: {}", e)))
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(
        &self,
        js_code: impl Into<String>,
    ) -> Result<T, DriverError> {
        let json_value = self.eval(js_code).await?;
        serde_json::from_value(json_value)
            .map_err(|e| DriverError::Session(format!("脚本返回值类型不符: {}", e)))
    }

    /// 等待元素出现，超时返回最后一次查找的错误信息
    pub async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Element, String> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.page.find_element(selector).await {
                Ok(element) => return Ok(element),
                Err(e) if Instant::now() >= deadline => {
                    return Err(format!(
                        "element '{}' not found within {:?}: {}",
                        selector, timeout, e
                    ))
                }
                Err(_) => sleep(POLL_INTERVAL).await,
            }
        }
    }
}

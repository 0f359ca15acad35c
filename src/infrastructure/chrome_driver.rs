//! 基于 Chrome DevTools Protocol 的表单驱动

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::Browser;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::browser::{self, BrowserSession};
use crate::config::{Config, FormLayout};
use crate::error::DriverError;
use crate::infrastructure::form_driver::FormDriver;
use crate::infrastructure::js_executor::JsExecutor;

/// 等待与节流参数
#[derive(Debug, Clone)]
pub struct DriverTimings {
    pub navigation_timeout: Duration,
    pub element_timeout: Duration,
    pub navigation_settle: Duration,
    pub fill_delay: Duration,
    pub submit_delay: Duration,
    pub action_delay: Duration,
}

impl From<&Config> for DriverTimings {
    fn from(config: &Config) -> Self {
        Self {
            navigation_timeout: config.navigation_timeout(),
            element_timeout: config.element_timeout(),
            navigation_settle: config.navigation_settle(),
            fill_delay: config.fill_delay(),
            submit_delay: config.submit_delay(),
            action_delay: config.action_delay(),
        }
    }
}

/// Chrome 表单驱动
///
/// 持有浏览器会话；`release()` 之后所有操作返回 `DriverError::Session`。
pub struct ChromeFormDriver {
    browser: Option<Browser>,
    executor: Option<JsExecutor>,
    handler: Option<JoinHandle<()>>,
    owns_browser: bool,
    timings: DriverTimings,
    save_button: String,
    clear_button: String,
}

impl ChromeFormDriver {
    pub fn new(session: BrowserSession, timings: DriverTimings, layout: &FormLayout) -> Self {
        Self {
            browser: Some(session.browser),
            executor: Some(JsExecutor::new(session.page)),
            handler: Some(session.handler),
            owns_browser: session.owns_browser,
            timings,
            save_button: layout.save_button.clone(),
            clear_button: layout.clear_button.clone(),
        }
    }

    /// 按配置启动或连接浏览器
    pub async fn open(config: &Config) -> anyhow::Result<Self> {
        let session = browser::open_session(config).await?;
        Ok(Self::new(session, DriverTimings::from(config), &config.form))
    }

    fn executor(&self) -> Result<&JsExecutor, DriverError> {
        self.executor
            .as_ref()
            .ok_or_else(|| DriverError::Session("driver already released".to_string()))
    }
}

#[async_trait]
impl FormDriver for ChromeFormDriver {
    async fn navigate_to_form(&mut self, url: &str) -> Result<(), DriverError> {
        let executor = self.executor()?;
        info!("🌐 正在打开: {}", url);

        match timeout(self.timings.navigation_timeout, executor.page().goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(DriverError::navigation(url, e)),
            Err(_) => {
                return Err(DriverError::navigation(
                    url,
                    format!("timed out after {:?}", self.timings.navigation_timeout),
                ))
            }
        }

        // 等待页面脚本渲染表单
        sleep(self.timings.navigation_settle).await;
        debug!("页面已打开: {}", url);
        Ok(())
    }

    async fn clear_form(&mut self) -> Result<(), DriverError> {
        let executor = self.executor()?;
        // 清空按钮不等待，找不到就跳过
        let button = executor
            .page()
            .find_element(self.clear_button.as_str())
            .await
            .map_err(|e| DriverError::Clear(e.to_string()))?;
        button
            .click()
            .await
            .map_err(|e| DriverError::Clear(e.to_string()))?;
        sleep(self.timings.action_delay).await;
        Ok(())
    }

    async fn fill_text(&mut self, field_id: &str, value: &str) -> Result<(), DriverError> {
        let executor = self.executor()?;
        let selector = format!("#{}", field_id);
        let element = executor
            .wait_for_element(&selector, self.timings.element_timeout)
            .await
            .map_err(|e| DriverError::field(field_id, e))?;

        element
            .call_js_fn("function() { this.value = ''; }", false)
            .await
            .map_err(|e| DriverError::field(field_id, e))?;
        element
            .click()
            .await
            .map_err(|e| DriverError::field(field_id, e))?
            .type_str(value)
            .await
            .map_err(|e| DriverError::field(field_id, e))?;

        debug!("已填写 {} = {}", field_id, value);
        sleep(self.timings.fill_delay).await;
        Ok(())
    }

    async fn select_option(&mut self, field_id: &str, value: &str) -> Result<(), DriverError> {
        let executor = self.executor()?;
        let selector = format!("#{}", field_id);
        executor
            .wait_for_element(&selector, self.timings.element_timeout)
            .await
            .map_err(|e| DriverError::field(field_id, e))?;

        let js_code = format!(
            r#"
            (() => {{
                const el = document.getElementById({id});
                if (!el) return "missing-element";
                const opt = Array.from(el.options).find(o => o.value === {value});
                if (!opt) return "missing-option";
                el.value = opt.value;
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return "ok";
            }})()
            "#,
            id = serde_json::to_string(field_id).map_err(|e| DriverError::field(field_id, e))?,
            value = serde_json::to_string(value).map_err(|e| DriverError::field(field_id, e))?,
        );

        let status: String = executor
            .eval_as(js_code)
            .await
            .map_err(|e| DriverError::field(field_id, e))?;
        match status.as_str() {
            "ok" => {
                debug!("已选择 {} = {}", field_id, value);
                sleep(self.timings.fill_delay).await;
                Ok(())
            }
            "missing-option" => Err(DriverError::field(
                field_id,
                format!("no option with value '{}'", value),
            )),
            other => Err(DriverError::field(field_id, other)),
        }
    }

    async fn submit(&mut self) -> Result<(), DriverError> {
        let executor = self.executor()?;
        let button = executor
            .wait_for_element(&self.save_button, self.timings.element_timeout)
            .await
            .map_err(DriverError::Submit)?;
        button
            .click()
            .await
            .map_err(|e| DriverError::Submit(e.to_string()))?;
        sleep(self.timings.submit_delay).await;
        Ok(())
    }

    async fn release(&mut self) {
        let Some(executor) = self.executor.take() else {
            debug!("浏览器会话已释放，跳过");
            return;
        };

        if self.owns_browser {
            if let Some(mut browser) = self.browser.take() {
                if let Err(e) = browser.close().await {
                    warn!("关闭浏览器失败: {}", e);
                }
                if let Err(e) = browser.wait().await {
                    warn!("等待浏览器退出失败: {}", e);
                }
            }
        } else if let Err(e) = executor.into_page().close().await {
            // 连接的是外部浏览器，只关闭自己创建的页面
            warn!("关闭页面失败: {}", e);
        }
        self.browser = None;

        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
        info!("🔒 浏览器会话已释放");
    }
}

use anyhow::{anyhow, Context, Result};
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use super::BrowserSession;
use crate::config::Config;

/// 启动浏览器（有界面或无头）
pub async fn launch_browser(config: &Config) -> Result<BrowserSession> {
    info!(
        "🚀 启动浏览器... (无头模式: {})",
        if config.headless { "是" } else { "否" }
    );

    let mut builder = BrowserConfig::builder().args(vec![
        "--disable-blink-features=AutomationControlled", // 隐藏自动化标记
        "--disable-gpu",
        "--no-sandbox",
        "--disable-dev-shm-usage",
    ]);
    builder = if config.headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(path) = &config.chrome_executable {
        debug!("浏览器路径: {}", path.display());
        builder = builder.chrome_executable(path);
    }

    let browser_config = builder.build().map_err(|e| {
        error!("配置浏览器失败: {}", e);
        anyhow!("配置浏览器失败: {}", e)
    })?;

    let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        anyhow!("启动浏览器失败: {}", e)
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    let handler = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    sleep(tokio::time::Duration::from_millis(300)).await;

    // 页面由表单驱动负责导航
    let page = browser
        .new_page("about:blank")
        .await
        .context("创建页面失败")?;

    Ok(BrowserSession {
        browser,
        page,
        handler,
        owns_browser: true,
    })
}

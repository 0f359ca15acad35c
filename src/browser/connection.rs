use anyhow::{Context, Result};
use chromiumoxide::Browser;
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use super::BrowserSession;

/// 连接到已打开的浏览器并创建新页面
///
/// 浏览器需以 `--remote-debugging-port=<port>` 启动。
pub async fn connect_to_browser_and_page(port: u16) -> Result<BrowserSession> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        e
    })
    .with_context(|| format!("无法连接到浏览器 (端口: {})", port))?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    let handler = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    // 不复用已有标签页，避免覆盖用户正在使用的页面
    let page = browser
        .new_page("about:blank")
        .await
        .context("创建空白页面失败")?;
    debug!("已创建空白页面");

    Ok(BrowserSession {
        browser,
        page,
        handler,
        owns_browser: false,
    })
}

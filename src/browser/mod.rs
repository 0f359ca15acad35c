//! 浏览器会话
//!
//! 启动新浏览器或连接已打开的浏览器，返回持有唯一 Page 的会话。

pub mod connection;
pub mod launch;

use chromiumoxide::{Browser, Page};
use tokio::task::JoinHandle;

use crate::config::Config;

pub use connection::connect_to_browser_and_page;
pub use launch::launch_browser;

/// 一次浏览器会话
pub struct BrowserSession {
    pub browser: Browser,
    pub page: Page,
    /// 后台处理 CDP 事件的任务
    pub handler: JoinHandle<()>,
    /// 浏览器是否由本程序启动（决定释放时是否关闭整个浏览器）
    pub owns_browser: bool,
}

/// 根据配置连接或启动浏览器
pub async fn open_session(config: &Config) -> anyhow::Result<BrowserSession> {
    match config.browser_debug_port {
        Some(port) => connect_to_browser_and_page(port).await,
        None => launch_browser(config).await,
    }
}

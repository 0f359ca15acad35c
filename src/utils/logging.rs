//! 日志工具模块
//!
//! 初始化 tracing，并提供启动信息和最终统计的输出

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;
use crate::models::BatchStats;

/// 初始化日志
///
/// 控制台输出到 stderr（stdout 留给进度条）；指定 `log_file` 时同时追加写入文件。
/// 日志级别默认为 `info`，可用 `RUST_LOG` 覆盖。
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("无法打开日志文件: {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .context("日志系统已初始化")?;

    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🌐 目标表单: {}", config.target_url);
    match config.browser_debug_port {
        Some(port) => info!("🔌 连接已打开的浏览器，端口: {}", port),
        None => info!("🖥️ 启动新浏览器，无头模式: {}", config.headless),
    }
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(stats: &BatchStats) {
    info!("\n{}", "=".repeat(60));
    info!("📊 处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", stats.succeeded, stats.total);
    info!("❌ 失败: {}", stats.failed);
    if stats.unprocessed() > 0 {
        info!("⏹️ 未处理: {}", stats.unprocessed());
    }
    for failure in &stats.failures {
        error!(
            "  行 {}: {} - {}",
            failure.row_number,
            failure.label,
            truncate_text(&failure.reason, 200)
        );
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

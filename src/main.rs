use std::path::PathBuf;

use anyhow::Result;
use form_batch_submit::services::ConsoleProgress;
use form_batch_submit::utils::logging;
use form_batch_submit::{App, Config};
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.log_file.as_deref())?;

    // 表格路径：命令行参数优先
    let input = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.input_file.clone());
    if !input.exists() {
        error!("❌ 文件不存在: {}", input.display());
        std::process::exit(1);
    }

    println!("{}", "=".repeat(50));
    println!("🚀 表格批量提交");
    println!("{}", "=".repeat(50));
    println!("📁 文件: {}", input.display());

    // Ctrl-C：当前行完成后停止
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("⏹️ 收到中断信号，当前行完成后停止...");
            signal_token.cancel();
        }
    });

    let app = App::initialize(config).await?;
    let stats = app.run(&input, cancel, &ConsoleProgress::new()).await?;

    println!("\n{}", "=".repeat(50));
    println!("✓ 处理完成");
    println!("{}", "=".repeat(50));
    println!("Total: {}", stats.total);
    println!("✓ Succeeded: {}", stats.succeeded);
    println!("✗ Failed: {}", stats.failed);
    if stats.unprocessed() > 0 {
        println!("⏹ Not processed: {}", stats.unprocessed());
    }

    if !stats.failures.is_empty() {
        println!("\n📋 Failures:");
        for failure in &stats.failures {
            println!(
                "  Row {}: {} - {}",
                failure.row_number, failure.label, failure.reason
            );
        }
    }

    if stats.is_critical() {
        std::process::exit(1);
    }
    Ok(())
}

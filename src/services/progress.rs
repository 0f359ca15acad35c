//! 进度上报
//!
//! 引擎只向 sink 发送消息，从不反向依赖界面。

use std::io::Write;

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// 一条进度事件
///
/// `total == 0` 表示阶段提示；`total > 0` 表示数量进度。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub message: String,
    pub current: usize,
    pub total: usize,
}

impl ProgressEvent {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            current: 0,
            total: 0,
        }
    }

    pub fn step(message: impl Into<String>, current: usize, total: usize) -> Self {
        Self {
            message: message.into(),
            current,
            total,
        }
    }

    pub fn is_quantitative(&self) -> bool {
        self.total > 0
    }

    /// 完成百分比（0-100），阶段提示返回 None
    pub fn percentage(&self) -> Option<f64> {
        self.is_quantitative()
            .then(|| self.current as f64 / self.total as f64 * 100.0)
    }
}

/// 进度消费者，不允许失败也不应阻塞
pub trait ProgressSink: Send + Sync {
    fn report(&self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn report(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// 丢弃所有事件
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _event: &ProgressEvent) {}
}

/// 控制台进度条
#[derive(Debug, Clone)]
pub struct ConsoleProgress {
    width: usize,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self { width: 40 }
    }

    /// 渲染一行输出（不含换行控制）
    pub fn render(&self, event: &ProgressEvent) -> String {
        match event.percentage() {
            Some(pct) => {
                let filled = ((pct / 100.0) * self.width as f64).round() as usize;
                let filled = filled.min(self.width);
                format!(
                    "[{}{}] {:.1}% - {}",
                    "=".repeat(filled),
                    " ".repeat(self.width - filled),
                    pct,
                    event.message
                )
            }
            None => format!("✓ {}", event.message),
        }
    }

    /// 写出一个事件：进度事件覆盖当前行，信息事件另起一行
    pub fn write_event<W: Write>(&self, out: &mut W, event: &ProgressEvent) -> std::io::Result<()> {
        let line = self.render(event);
        if event.is_quantitative() {
            write!(out, "\r{}", line)?;
            out.flush()
        } else {
            writeln!(out, "\n{}", line)
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn report(&self, event: &ProgressEvent) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = self.write_event(&mut stdout, event) {
            debug!("进度输出失败: {}", e);
        }
    }
}

/// 把事件转发到通道，供界面线程消费
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    tx: UnboundedSender<ProgressEvent>,
}

impl ChannelProgress {
    pub fn new(tx: UnboundedSender<ProgressEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgress {
    fn report(&self, event: &ProgressEvent) {
        if self.tx.send(event.clone()).is_err() {
            debug!("进度接收端已关闭，丢弃事件: {}", event.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        assert_eq!(ProgressEvent::info("start").percentage(), None);
        assert_eq!(ProgressEvent::step("x", 1, 4).percentage(), Some(25.0));
    }

    #[test]
    fn test_console_render() {
        let console = ConsoleProgress::new();
        assert_eq!(console.render(&ProgressEvent::info("done")), "✓ done");

        let line = console.render(&ProgressEvent::step("Processing: Acme - Widget", 2, 4));
        assert!(line.starts_with(&format!("[{}{}]", "=".repeat(20), " ".repeat(20))));
        assert!(line.ends_with("50.0% - Processing: Acme - Widget"));
    }

    /// 所有写入都失败的输出
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_console_write_event() {
        let console = ConsoleProgress::new();
        let mut out = Vec::new();
        console
            .write_event(&mut out, &ProgressEvent::step("row", 1, 2))
            .unwrap();
        console
            .write_event(&mut out, &ProgressEvent::info("done"))
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\r["));
        assert!(text.ends_with("\n✓ done\n"));
    }

    #[test]
    fn test_console_write_failure_is_reported() {
        let console = ConsoleProgress::new();
        let err = console
            .write_event(&mut BrokenPipe, &ProgressEvent::info("done"))
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
        // report 吸收错误，不会 panic
        console.report(&ProgressEvent::info("done"));
    }

    #[test]
    fn test_channel_progress_forwards_and_survives_closed_receiver() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let sink = ChannelProgress::new(tx);

        sink.report(&ProgressEvent::step("row", 1, 2));
        assert_eq!(rx.try_recv().unwrap(), ProgressEvent::step("row", 1, 2));

        drop(rx);
        sink.report(&ProgressEvent::info("ignored"));
    }
}

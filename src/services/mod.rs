pub mod failure_report;
pub mod progress;

pub use failure_report::FailureReportWriter;
pub use progress::{ChannelProgress, ConsoleProgress, NoProgress, ProgressEvent, ProgressSink};

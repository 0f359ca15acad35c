pub mod loaders;
pub mod record;
pub mod stats;

pub use loaders::{MemorySource, RecordSource, XlsxSource};
pub use record::{is_blank, row_label, Cell, RawRow, Record};
pub use stats::{BatchStats, FailureDetail};

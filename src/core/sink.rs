//! Sink trait for log output destinations

use super::{error::Result, record::Record};

/// A destination that accepts encoded lines.
///
/// Sinks are shared between concurrent callers and between the two routes
/// of a configuration, so they synchronize internally and take `&self`.
pub trait Sink: Send + Sync {
    /// Write one encoded `line` for `record`.
    fn write(&self, record: &Record, line: &str) -> Result<()>;
    fn flush(&self) -> Result<()>;
    fn name(&self) -> &str;
}

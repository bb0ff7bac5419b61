//! Console stream sink

use crate::core::{LoggerError, Record, Result, Sink};
use parking_lot::Mutex;
use std::io::Write;

/// One console stream. A console configuration pairs a `stdout` sink
/// (low severities) with a `stderr` sink (high severities).
pub struct ConsoleSink {
    name: String,
    stream: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    pub fn stdout() -> Self {
        Self::from_writer("stdout", std::io::stdout())
    }

    pub fn stderr() -> Self {
        Self::from_writer("stderr", std::io::stderr())
    }

    /// Wrap any writer as a console stream, e.g. a pipe or a test buffer.
    pub fn from_writer(name: impl Into<String>, writer: impl Write + Send + 'static) -> Self {
        Self {
            name: name.into(),
            stream: Mutex::new(Box::new(writer)),
        }
    }
}

impl Sink for ConsoleSink {
    fn write(&self, _record: &Record, line: &str) -> Result<()> {
        self.stream
            .lock()
            .write_all(line.as_bytes())
            .map_err(|e| LoggerError::sink_write(&self.name, e))
    }

    fn flush(&self) -> Result<()> {
        self.stream
            .lock()
            .flush()
            .map_err(|e| LoggerError::sink_write(&self.name, e))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Level;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

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
    fn test_writes_line_verbatim() {
        let buf = SharedBuf::default();
        let sink = ConsoleSink::from_writer("test", buf.clone());

        sink.write(&Record::new(Level::Info, "hi"), "line one\n").unwrap();
        sink.write(&Record::new(Level::Info, "hi"), "line two\n").unwrap();
        sink.flush().unwrap();

        assert_eq!(&*buf.0.lock(), b"line one\nline two\n");
        assert_eq!(sink.name(), "test");
    }

    #[test]
    fn test_write_failure_names_stream() {
        let sink = ConsoleSink::from_writer("pipe", BrokenPipe);
        let err = sink.write(&Record::new(Level::Error, "x"), "x\n").unwrap_err();
        assert!(matches!(err, LoggerError::SinkWrite { ref sink, .. } if sink == "pipe"));
    }
}

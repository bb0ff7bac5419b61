//! Error types for the logger

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Unrecognized level name
    #[error("Invalid log level: '{name}'")]
    InvalidLevelName { name: String },

    /// Sink configuration rejected before anything was swapped in
    #[error("Invalid sink configuration: {message}")]
    InvalidSinkConfig { message: String },

    /// A sink failed to accept a record
    #[error("Sink '{sink}' failed to write: {source}")]
    SinkWrite {
        sink: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotation { path: String, message: String },

    /// Configuration document could not be decoded
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl LoggerError {
    pub fn invalid_level_name(name: impl Into<String>) -> Self {
        LoggerError::InvalidLevelName { name: name.into() }
    }

    pub fn invalid_sink_config(message: impl Into<String>) -> Self {
        LoggerError::InvalidSinkConfig {
            message: message.into(),
        }
    }

    pub fn sink_write(sink: impl Into<String>, source: std::io::Error) -> Self {
        LoggerError::SinkWrite {
            sink: sink.into(),
            source,
        }
    }

    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotation {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::invalid_level_name("bogus");
        assert!(matches!(err, LoggerError::InvalidLevelName { .. }));

        let err = LoggerError::invalid_sink_config("primary path is empty");
        assert!(matches!(err, LoggerError::InvalidSinkConfig { .. }));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            LoggerError::invalid_level_name("bogus").to_string(),
            "Invalid log level: 'bogus'"
        );
        assert_eq!(
            LoggerError::file_rotation("/var/log/app.log", "Disk full").to_string(),
            "File rotation failed for '/var/log/app.log': Disk full"
        );
    }

    #[test]
    fn test_malformed_config_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: LoggerError = json_err.into();
        assert!(matches!(err, LoggerError::Config(_)));
        assert!(err.to_string().starts_with("Configuration error: "));
    }

    #[test]
    fn test_sink_write_keeps_source() {
        use std::error::Error as _;

        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = LoggerError::sink_write("stdout", io_err);

        assert!(err.to_string().contains("stdout"));
        assert!(err.to_string().contains("pipe closed"));
        assert!(err.source().is_some());
    }
}

//! Declarative logger configuration

use super::error::{LoggerError, Result};
use super::level::Level;
use super::logger::Logger;
use crate::sinks::FileRotationPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where records go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputConfig {
    #[default]
    Console,
    Files {
        primary: PathBuf,
        #[serde(default)]
        secondary: PathBuf,
        #[serde(default)]
        rotation: FileRotationPolicy,
    },
}

/// Threshold plus output, e.g.
///
/// ```json
/// {
///   "level": "debug",
///   "output": {
///     "type": "files",
///     "primary": "logs/app.log",
///     "secondary": "logs/err.log",
///     "rotation": { "maxsize": 100, "maxbackups": 7, "compress": true }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub level: Option<String>,
    pub output: OutputConfig,
}

impl LoggerConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "read logger configuration",
                format!("Failed to read '{}'", path.display()),
                e,
            )
        })?;
        Self::from_json(&text)
    }

    /// Apply to `logger`. Nothing changes unless everything is valid.
    ///
    /// # Errors
    ///
    /// [`LoggerError::InvalidLevelName`] for a bad level, or any error from
    /// [`Logger::reconfigure_to_files`].
    pub fn apply(&self, logger: &Logger) -> Result<()> {
        let level = self.level.as_deref().map(Level::parse).transpose()?;

        match &self.output {
            OutputConfig::Console => logger.reconfigure_to_console(),
            OutputConfig::Files {
                primary,
                secondary,
                rotation,
            } => logger.reconfigure_to_files(primary, secondary, rotation)?,
        }

        if let Some(level) = level {
            logger.set_min_level(level);
        }
        Ok(())
    }
}

impl Logger {
    /// See [`LoggerConfig::apply`].
    pub fn apply_config(&self, config: &LoggerConfig) -> Result<()> {
        config.apply(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::route::RouteConfig;
    use crate::sinks::MemorySink;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_to_console() {
        let config = LoggerConfig::from_json("{}").unwrap();
        assert_eq!(config, LoggerConfig::default());
        assert_eq!(config.output, OutputConfig::Console);
    }

    #[test]
    fn test_parses_file_output() {
        let config = LoggerConfig::from_json(
            r#"{
                "level": "debug",
                "output": {
                    "type": "files",
                    "primary": "logs/app.log",
                    "rotation": { "maxsize": 5 }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.level.as_deref(), Some("debug"));
        assert_eq!(
            config.output,
            OutputConfig::Files {
                primary: PathBuf::from("logs/app.log"),
                secondary: PathBuf::new(),
                rotation: FileRotationPolicy::new().with_max_size_mb(5),
            }
        );
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = LoggerConfig::from_json("{ level: ").unwrap_err();
        assert!(matches!(err, LoggerError::Config(_)));
    }

    #[test]
    fn test_apply_switches_output_and_level() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let logger = Logger::with_routes(RouteConfig::shared(Arc::new(MemorySink::new("mem"))));

        let config = LoggerConfig {
            level: Some("warn".to_string()),
            output: OutputConfig::Files {
                primary: path.clone(),
                secondary: PathBuf::new(),
                rotation: FileRotationPolicy::default(),
            },
        };
        logger.apply_config(&config).unwrap();

        assert_eq!(logger.level(), Level::Warn);
        assert_eq!(
            logger.route_config().sink_for(Level::Debug).name(),
            path.display().to_string()
        );
    }

    #[test]
    fn test_apply_is_all_or_nothing() {
        let memory = Arc::new(MemorySink::new("mem"));
        let logger = Logger::with_routes(RouteConfig::shared(memory));

        let bad_level = LoggerConfig {
            level: Some("chatty".to_string()),
            output: OutputConfig::Console,
        };
        assert!(matches!(
            logger.apply_config(&bad_level),
            Err(LoggerError::InvalidLevelName { .. })
        ));

        let bad_path = LoggerConfig {
            level: Some("debug".to_string()),
            output: OutputConfig::Files {
                primary: PathBuf::new(),
                secondary: PathBuf::new(),
                rotation: FileRotationPolicy::default(),
            },
        };
        assert!(matches!(
            logger.apply_config(&bad_path),
            Err(LoggerError::InvalidSinkConfig { .. })
        ));

        assert_eq!(logger.level(), Level::Info);
        assert_eq!(logger.route_config().sink_for(Level::Info).name(), "mem");
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logger.json");
        std::fs::write(&path, r#"{"level":"error"}"#).unwrap();

        let config = LoggerConfig::from_json_file(&path).unwrap();
        assert_eq!(config.level.as_deref(), Some("error"));

        let err = LoggerConfig::from_json_file(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, LoggerError::IoOperation { .. }));
    }
}

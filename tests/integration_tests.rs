//! Integration tests for the routing core
//!
//! These tests verify:
//! - Threshold filtering across both routes
//! - Console to file reconfiguration, shared and split
//! - All-or-nothing reconfiguration on bad input
//! - Log injection prevention in written files
//! - Sink reuse across reconfigurations

use std::fs;
use std::sync::Arc;
use switchlog::prelude::*;
use tempfile::TempDir;

fn memory_split(min_level: Level) -> (Logger, Arc<MemorySink>, Arc<MemorySink>) {
    let low = Arc::new(MemorySink::new("low"));
    let high = Arc::new(MemorySink::new("high"));
    let logger = Logger::builder()
        .min_level(min_level)
        .routes(RouteConfig::split(low.clone(), high.clone()))
        .build();
    (logger, low, high)
}

#[test]
fn test_threshold_error_drops_lower_levels() {
    let (logger, low, high) = memory_split(Level::Debug);
    logger.set_level("error");

    logger.debug("d");
    logger.info("i");
    logger.warn("w");
    logger.error("boom");

    assert!(low.is_empty());
    assert_eq!(high.levels(), vec![Level::Error]);
    assert!(high.lines()[0].contains("\tERROR\t"));
    assert!(high.lines()[0].ends_with("\tboom\n"));

    for level in [Level::Panic, Level::Fatal] {
        let effect = logger.emit_terminal(&Record::new(level, "terminal"));
        assert!(effect.is_some());
    }
    assert!(low.is_empty());
    assert_eq!(high.levels(), vec![Level::Error, Level::Panic, Level::Fatal]);
}

#[test]
fn test_default_threshold_is_info() {
    let (logger, low, _) = memory_split(Level::Info);
    logger.debug("hidden");
    logger.info("shown");
    assert_eq!(low.levels(), vec![Level::Info]);
}

#[test]
fn test_reconfigure_to_single_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("a.log");
    let (logger, low, high) = memory_split(Level::Debug);

    logger
        .reconfigure_to_files(&path, "", &FileRotationPolicy::default())
        .expect("Failed to reconfigure");

    logger.info("to file");
    logger.error("also to file");
    logger.flush().expect("Failed to flush");

    let content = fs::read_to_string(&path).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("\tINFO\t"));
    assert!(lines[1].contains("\tERROR\t"));
    assert!(low.is_empty());
    assert!(high.is_empty());
}

#[test]
fn test_reconfigure_to_split_files() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let primary = temp_dir.path().join("a.log");
    let secondary = temp_dir.path().join("b.log");
    let logger = Logger::builder().min_level(Level::Debug).build();

    logger
        .reconfigure_to_files(&primary, &secondary, &FileRotationPolicy::default())
        .expect("Failed to reconfigure");

    logger.debug("low one");
    logger.warn("low two");
    logger.error("high one");
    logger.flush().expect("Failed to flush");

    let low = fs::read_to_string(&primary).expect("Failed to read primary");
    let high = fs::read_to_string(&secondary).expect("Failed to read secondary");
    assert_eq!(low.lines().count(), 2);
    assert_eq!(high.lines().count(), 1);
    assert!(high.contains("high one"));
    assert!(!low.contains("high one"));
}

#[test]
fn test_empty_primary_leaves_config_intact() {
    let (logger, low, _) = memory_split(Level::Debug);
    let before = logger.route_config();

    let result = logger.reconfigure_to_files("", "b.log", &FileRotationPolicy::default());
    assert!(matches!(result, Err(LoggerError::InvalidSinkConfig { .. })));

    assert!(Arc::ptr_eq(&before, &logger.route_config()));
    logger.info("still here");
    assert_eq!(low.len(), 1);
    assert_eq!(logger.metrics().reconfigurations(), 0);
}

#[test]
fn test_switch_back_to_console() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("a.log");
    let logger = Logger::new();

    logger
        .reconfigure_to_files(&path, "", &FileRotationPolicy::default())
        .expect("Failed to reconfigure");
    logger.info("in file");
    logger.reconfigure_to_console();
    logger.info("on stdout");

    let content = fs::read_to_string(&path).expect("Failed to read log file");
    assert_eq!(content.lines().count(), 1);
    assert_eq!(
        logger.route_config().sink_for(Level::Error).name(),
        "stderr"
    );
    assert_eq!(logger.metrics().reconfigurations(), 2);
}

#[test]
fn test_same_path_reuses_open_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("a.log");
    let policy = FileRotationPolicy::default();
    let logger = Logger::new();

    logger.reconfigure_to_files(&path, "", &policy).unwrap();
    let first = Arc::clone(logger.route_config().sink_for(Level::Info));
    logger.reconfigure_to_files(&path, "", &policy).unwrap();
    let second = Arc::clone(logger.route_config().sink_for(Level::Info));

    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_log_injection_prevention() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("injection.log");
    let logger = Logger::new();
    logger
        .reconfigure_to_files(&path, "", &FileRotationPolicy::default())
        .unwrap();

    logger.info("User login\nERROR\tFake error injected\r\nINFO Continuation");
    logger.flush().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 1, "Log should be a single line");
    assert!(content.contains("\\n"));
    assert!(content.contains("\\t"));
    assert!(content.contains("\\r"));
}

#[test]
fn test_config_file_drives_logger() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_path = temp_dir.path().join("logs").join("app.log");
    let config_path = temp_dir.path().join("logger.json");
    let config = serde_json::json!({
        "level": "warn",
        "output": { "type": "files", "primary": log_path }
    });
    fs::write(&config_path, config.to_string()).unwrap();

    let logger = Logger::new();
    let config = LoggerConfig::from_json_file(&config_path).unwrap();
    logger.apply_config(&config).unwrap();

    logger.info("dropped");
    logger.warn("kept");
    logger.flush().unwrap();

    let content = fs::read_to_string(&log_path).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert!(content.contains("kept"));
}

#[test]
fn test_timestamp_format_unix_millis() {
    let (logger, low, _) = memory_split(Level::Debug);
    logger.reconfigure(
        (*logger.route_config())
            .clone()
            .with_encoder(Encoder::new().with_timestamp_format(TimestampFormat::UnixMillis)),
    );

    logger.info("stamped");
    let line = &low.lines()[0];
    let timestamp = line.split('\t').next().unwrap();
    assert!(timestamp.parse::<i64>().is_ok(), "{timestamp}");
}

//! Routing core and emission entry points

use super::{
    encoder::Encoder,
    error::{LoggerError, Result},
    level::{AtomicLevel, Level},
    metrics::LoggerMetrics,
    record::{capture_stack, CallSite, Record},
    route::RouteConfig,
    sink::Sink,
    termination::{Termination, FATAL_EXIT_CODE},
};
use crate::sinks::{FileRotationPolicy, RotatingFileSink};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

/// Environment variable holding the initial level name.
pub const LEVEL_ENV_VAR: &str = "LOG_LEVEL";

/// Join values with single spaces, the way line-style entry points render.
pub fn join_values(values: &[&dyn fmt::Display]) -> String {
    let mut out = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&value.to_string());
    }
    out
}

/// Concatenate values with no separator, the way value-list entry points render.
pub fn concat_values(values: &[&dyn fmt::Display]) -> String {
    let mut out = String::new();
    for value in values {
        out.push_str(&value.to_string());
    }
    out
}

/// Handle to a logging backend: a threshold plus the active route config.
///
/// Clones share the same state. Threshold reads are a single atomic load; the
/// route config is swapped as a whole `Arc`, so a record is always delivered
/// through one complete configuration, and replaced sinks are released once
/// the last in-flight record holding them is done.
#[derive(Clone)]
pub struct Logger {
    threshold: Arc<AtomicLevel>,
    routes: Arc<RwLock<Arc<RouteConfig>>>,
    metrics: Arc<LoggerMetrics>,
    /// Open file sinks by absolute path, so a path is never opened twice
    open_files: Arc<Mutex<HashMap<PathBuf, Weak<RotatingFileSink>>>>,
}

macro_rules! level_methods {
    ($level:expr, $plain:ident, $values:ident, $fmt:ident, $ln:ident) => {
        #[doc = concat!("Log at `", stringify!($level), "`.")]
        #[track_caller]
        #[inline]
        pub fn $plain(&self, message: impl fmt::Display) {
            self.log_with($level, CallSite::caller(), false, || message.to_string());
        }

        #[doc = concat!("Log values concatenated without separators at `", stringify!($level), "`.")]
        #[track_caller]
        #[inline]
        pub fn $values(&self, values: &[&dyn fmt::Display]) {
            self.log_with($level, CallSite::caller(), false, || concat_values(values));
        }

        #[doc = concat!("Log preformatted arguments at `", stringify!($level), "`.")]
        #[track_caller]
        #[inline]
        pub fn $fmt(&self, args: fmt::Arguments<'_>) {
            self.log_with($level, CallSite::caller(), false, || fmt::format(args));
        }

        #[doc = concat!("Log space-joined values at `", stringify!($level), "`.")]
        #[track_caller]
        #[inline]
        pub fn $ln(&self, values: &[&dyn fmt::Display]) {
            self.log_with($level, CallSite::caller(), false, || join_values(values));
        }
    };
    ($level:expr, $plain:ident, $values:ident, $fmt:ident, $ln:ident, $stack:ident) => {
        level_methods!($level, $plain, $values, $fmt, $ln);

        #[doc = concat!(
            "Log space-joined values at `", stringify!($level),
            "` followed by the caller's stack trace."
        )]
        #[track_caller]
        pub fn $stack(&self, values: &[&dyn fmt::Display]) {
            self.log_with($level, CallSite::caller(), true, || join_values(values));
        }
    };
}

impl Logger {
    /// Console routes, `Info` threshold.
    #[must_use]
    pub fn new() -> Self {
        Self::with_routes(RouteConfig::console())
    }

    #[must_use]
    pub fn with_routes(config: RouteConfig) -> Self {
        Self {
            threshold: Arc::new(AtomicLevel::default()),
            routes: Arc::new(RwLock::new(Arc::new(config))),
            metrics: Arc::new(LoggerMetrics::new()),
            open_files: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Console routes with the threshold taken from [`LEVEL_ENV_VAR`].
    #[must_use]
    pub fn from_env() -> Self {
        let logger = Self::new();
        logger.apply_level_setting(std::env::var(LEVEL_ENV_VAR).ok().as_deref());
        logger
    }

    /// Apply a startup level setting. Absent or empty settings keep the
    /// current threshold; unrecognized ones are reported like [`set_level`].
    ///
    /// [`set_level`]: Logger::set_level
    #[track_caller]
    pub fn apply_level_setting(&self, setting: Option<&str>) {
        if let Some(name) = setting.map(str::trim).filter(|s| !s.is_empty()) {
            self.set_level(name);
        }
    }

    pub fn level(&self) -> Level {
        self.threshold.get()
    }

    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        self.threshold.enabled(level)
    }

    pub fn set_min_level(&self, level: Level) {
        self.threshold.set(level);
        self.metrics.record_level_change();
    }

    /// Set the threshold by name.
    ///
    /// A bad name leaves the threshold as it was and is reported as an
    /// `Error` record through the active routes.
    #[track_caller]
    pub fn set_level(&self, name: &str) {
        match Level::parse(name) {
            Ok(level) => self.set_min_level(level),
            Err(e) => {
                let call_site = CallSite::caller();
                self.log_with(Level::Error, call_site, false, || {
                    format!("parse log level failed: {}", e)
                });
            }
        }
    }

    /// Snapshot of the active configuration.
    pub fn route_config(&self) -> Arc<RouteConfig> {
        Arc::clone(&self.routes.read())
    }

    /// Swap in `config` as the active configuration.
    pub fn reconfigure(&self, config: RouteConfig) {
        let previous = std::mem::replace(&mut *self.routes.write(), Arc::new(config));
        self.metrics.record_reconfiguration();

        for sink in previous.sinks() {
            if let Err(e) = sink.flush() {
                eprintln!("[LOGGER ERROR] Failed to flush replaced sink '{}': {}", sink.name(), e);
            }
        }
    }

    /// Route low severities to stdout and high severities to stderr.
    pub fn reconfigure_to_console(&self) {
        let encoder = self.route_config().encoder().clone();
        self.reconfigure(RouteConfig::console().with_encoder(encoder));
    }

    /// Route records to rotating files.
    ///
    /// With an empty `secondary`, or one equal to `primary`, every severity
    /// goes to `primary`. Otherwise `primary` takes severities up to `Warn`
    /// and `secondary` takes the rest.
    ///
    /// # Errors
    ///
    /// [`LoggerError::InvalidSinkConfig`] for an empty `primary`, or an IO
    /// error opening either file. The active configuration is untouched on
    /// error.
    pub fn reconfigure_to_files(
        &self,
        primary: impl AsRef<Path>,
        secondary: impl AsRef<Path>,
        policy: &FileRotationPolicy,
    ) -> Result<()> {
        let primary = primary.as_ref();
        let secondary = secondary.as_ref();
        if primary.as_os_str().is_empty() {
            return Err(LoggerError::invalid_sink_config(
                "primary log file path must not be empty",
            ));
        }

        let encoder = self.route_config().encoder().clone().with_colored_levels(false);
        let low = self.open_file_sink(primary, policy)?;
        let config = if secondary.as_os_str().is_empty() || secondary == primary {
            RouteConfig::shared(low)
        } else {
            let high = self.open_file_sink(secondary, policy)?;
            RouteConfig::split(low, high)
        };

        self.reconfigure(config.with_encoder(encoder));
        Ok(())
    }

    fn open_file_sink(
        &self,
        path: &Path,
        policy: &FileRotationPolicy,
    ) -> Result<Arc<RotatingFileSink>> {
        let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let mut open_files = self.open_files.lock();
        open_files.retain(|_, sink| sink.strong_count() > 0);

        if let Some(existing) = open_files.get(&key).and_then(Weak::upgrade) {
            if existing.policy() == policy {
                return Ok(existing);
            }
        }

        let sink = Arc::new(RotatingFileSink::open(path, policy.clone())?);
        open_files.insert(key, Arc::downgrade(&sink));
        Ok(sink)
    }

    /// Route `record` if it passes the threshold.
    pub fn emit(&self, record: &Record) {
        if !self.threshold.enabled(record.level) {
            return;
        }
        let config = self.route_config();
        self.deliver(&config, record);
    }

    /// Route `record`, flush, and hand back the control transfer its level
    /// requests, without performing it.
    pub fn emit_terminal(&self, record: &Record) -> Option<Termination> {
        if self.threshold.enabled(record.level) {
            let config = self.route_config();
            self.deliver(&config, record);
            Self::flush_config(&config);
        }
        Termination::for_level(record.level, &record.message)
    }

    pub fn flush(&self) -> Result<()> {
        let config = self.route_config();
        for sink in config.sinks() {
            sink.flush()?;
        }
        Ok(())
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    fn log_with(
        &self,
        level: Level,
        call_site: CallSite,
        with_stack: bool,
        render: impl FnOnce() -> String,
    ) {
        if !self.threshold.enabled(level) {
            return;
        }

        let mut record = Record::new(level, render()).with_call_site(call_site);
        if with_stack {
            record = record.with_stack(capture_stack());
        }

        let config = self.route_config();
        self.deliver(&config, &record);
    }

    /// Route a Panic or Fatal record, then transfer control. The effect takes
    /// place even when the threshold suppresses the record.
    fn terminate(&self, level: Level, call_site: CallSite, message: String) -> ! {
        if self.threshold.enabled(level) {
            let record = Record::new(level, message.as_str())
                .with_call_site(call_site)
                .with_stack(capture_stack());
            let config = self.route_config();
            self.deliver(&config, &record);
            Self::flush_config(&config);
        }

        match level {
            Level::Panic => Termination::Unwind(message).execute(),
            _ => Termination::Exit(FATAL_EXIT_CODE).execute(),
        }
    }

    /// Encode once and write to the one sink the level maps to.
    ///
    /// Sink errors and panics are contained here and reported on the
    /// diagnostic route; they never reach the caller.
    fn deliver(&self, config: &RouteConfig, record: &Record) {
        let line = config.encoder().encode(record);
        let sink = config.sink_for(record.level);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            sink.write(record, &line)
        }));

        match result {
            Ok(Ok(())) => {
                self.metrics.record_written();
            }
            Ok(Err(e)) => {
                self.metrics.record_write_failure();
                Self::report_failure(config, sink, &e.to_string());
            }
            Err(panic_info) => {
                self.metrics.record_write_failure();
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                Self::report_failure(config, sink, &format!("panicked: {}", panic_msg));
            }
        }
    }

    /// Best-effort report on the high-severity route, or stderr if that is
    /// the sink that failed.
    fn report_failure(config: &RouteConfig, failed: &Arc<dyn Sink>, reason: &str) {
        let message = format!("[LOGGER ERROR] Sink '{}' failed: {}", failed.name(), reason);
        let diagnostic = config.sink_for(Level::Error);

        if !Arc::ptr_eq(diagnostic, failed) {
            let record = Record::new(Level::Error, message.as_str());
            let line = config.encoder().encode(&record);
            if diagnostic.write(&record, &line).is_ok() {
                return;
            }
        }
        eprintln!("{}", message);
    }

    fn flush_config(config: &RouteConfig) {
        for sink in config.sinks() {
            if let Err(e) = sink.flush() {
                eprintln!("[LOGGER ERROR] Failed to flush sink '{}': {}", sink.name(), e);
            }
        }
    }

    /// Log `message` at `level`. Panic and Fatal levels transfer control
    /// after routing, as their dedicated entry points do.
    #[track_caller]
    pub fn log(&self, level: Level, message: impl fmt::Display) {
        let call_site = CallSite::caller();
        if level >= Level::Panic {
            self.terminate(level, call_site, message.to_string());
        }
        self.log_with(level, call_site, false, || message.to_string());
    }

    #[track_caller]
    pub fn logv(&self, level: Level, values: &[&dyn fmt::Display]) {
        let call_site = CallSite::caller();
        if level >= Level::Panic {
            self.terminate(level, call_site, concat_values(values));
        }
        self.log_with(level, call_site, false, || concat_values(values));
    }

    #[track_caller]
    pub fn logf(&self, level: Level, args: fmt::Arguments<'_>) {
        let call_site = CallSite::caller();
        if level >= Level::Panic {
            self.terminate(level, call_site, fmt::format(args));
        }
        self.log_with(level, call_site, false, || fmt::format(args));
    }

    #[track_caller]
    pub fn logln(&self, level: Level, values: &[&dyn fmt::Display]) {
        let call_site = CallSite::caller();
        if level >= Level::Panic {
            self.terminate(level, call_site, join_values(values));
        }
        self.log_with(level, call_site, false, || join_values(values));
    }

    level_methods!(Level::Debug, debug, debugv, debugf, debugln, debug_stack);
    level_methods!(Level::Info, info, infov, infof, infoln, info_stack);
    level_methods!(Level::Warn, warn, warnv, warnf, warnln, warn_stack);
    level_methods!(Level::Error, error, errorv, errorf, errorln, error_stack);

    /// Log at `Panic`, then unwind with the message as payload.
    #[track_caller]
    pub fn panic(&self, message: impl fmt::Display) -> ! {
        self.terminate(Level::Panic, CallSite::caller(), message.to_string())
    }

    #[track_caller]
    pub fn panicv(&self, values: &[&dyn fmt::Display]) -> ! {
        self.terminate(Level::Panic, CallSite::caller(), concat_values(values))
    }

    #[track_caller]
    pub fn panicf(&self, args: fmt::Arguments<'_>) -> ! {
        self.terminate(Level::Panic, CallSite::caller(), fmt::format(args))
    }

    #[track_caller]
    pub fn panicln(&self, values: &[&dyn fmt::Display]) -> ! {
        self.terminate(Level::Panic, CallSite::caller(), join_values(values))
    }

    /// Log at `Fatal`, flush, then exit the process with status 1.
    #[track_caller]
    pub fn fatal(&self, message: impl fmt::Display) -> ! {
        self.terminate(Level::Fatal, CallSite::caller(), message.to_string())
    }

    #[track_caller]
    pub fn fatalv(&self, values: &[&dyn fmt::Display]) -> ! {
        self.terminate(Level::Fatal, CallSite::caller(), concat_values(values))
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        self.terminate(Level::Fatal, CallSite::caller(), fmt::format(args))
    }

    #[track_caller]
    pub fn fatalln(&self, values: &[&dyn fmt::Display]) -> ! {
        self.terminate(Level::Fatal, CallSite::caller(), join_values(values))
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use switchlog::prelude::*;
/// use std::sync::Arc;
///
/// let memory = Arc::new(MemorySink::new("memory"));
/// let logger = Logger::builder()
///     .min_level(Level::Debug)
///     .routes(RouteConfig::shared(memory.clone()))
///     .encoder(Encoder::new().with_call_site(false))
///     .build();
///
/// logger.debug("ready");
/// assert_eq!(memory.len(), 1);
/// ```
pub struct LoggerBuilder {
    min_level: Level,
    routes: Option<RouteConfig>,
    encoder: Option<Encoder>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            min_level: Level::Info,
            routes: None,
            encoder: None,
        }
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    /// Initial route configuration (console if not set)
    #[must_use = "builder methods return a new value"]
    pub fn routes(mut self, routes: RouteConfig) -> Self {
        self.routes = Some(routes);
        self
    }

    /// Encoder for the initial route configuration
    #[must_use = "builder methods return a new value"]
    pub fn encoder(mut self, encoder: Encoder) -> Self {
        self.encoder = Some(encoder);
        self
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        let mut routes = self.routes.unwrap_or_else(RouteConfig::console);
        if let Some(encoder) = self.encoder {
            routes = routes.with_encoder(encoder);
        }

        let logger = Logger::with_routes(routes);
        logger.threshold.set(self.min_level);
        logger
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}

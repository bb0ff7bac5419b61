//! Process-wide default logger
//!
//! The first call into this module builds a [`Logger`] with console routes
//! and the threshold from `LOG_LEVEL`. The free functions forward to it.
//!
//! ```no_run
//! use switchlog::FileRotationPolicy;
//!
//! switchlog::set_level("debug");
//! switchlog::set_log_file("./app.log", "./err.log", &FileRotationPolicy::default())
//!     .expect("log files");
//! switchlog::infoln(&[&"listening on", &8080]);
//! switchlog::errorf(format_args!("backend {} unreachable", "db-1"));
//! ```

use crate::core::{Logger, LoggerConfig, Result};
use crate::sinks::FileRotationPolicy;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// The process-wide logger.
pub fn global() -> &'static Logger {
    GLOBAL.get_or_init(Logger::from_env)
}

#[track_caller]
pub fn set_level(name: &str) {
    global().set_level(name);
}

/// Switch the default logger to rotating files.
/// See [`Logger::reconfigure_to_files`].
pub fn set_log_file(
    primary: impl AsRef<Path>,
    secondary: impl AsRef<Path>,
    policy: &FileRotationPolicy,
) -> Result<()> {
    global().reconfigure_to_files(primary, secondary, policy)
}

pub fn use_console() {
    global().reconfigure_to_console();
}

pub fn apply_config(config: &LoggerConfig) -> Result<()> {
    global().apply_config(config)
}

pub fn flush() -> Result<()> {
    global().flush()
}

macro_rules! forward {
    ($plain:ident, $values:ident, $fmt:ident, $ln:ident) => {
        #[track_caller]
        pub fn $plain(message: impl fmt::Display) {
            global().$plain(message);
        }

        #[track_caller]
        pub fn $values(values: &[&dyn fmt::Display]) {
            global().$values(values);
        }

        #[track_caller]
        pub fn $fmt(args: fmt::Arguments<'_>) {
            global().$fmt(args);
        }

        #[track_caller]
        pub fn $ln(values: &[&dyn fmt::Display]) {
            global().$ln(values);
        }
    };
    ($plain:ident, $values:ident, $fmt:ident, $ln:ident, $stack:ident) => {
        forward!($plain, $values, $fmt, $ln);

        #[track_caller]
        pub fn $stack(values: &[&dyn fmt::Display]) {
            global().$stack(values);
        }
    };
}

forward!(debug, debugv, debugf, debugln, debug_stack);
forward!(info, infov, infof, infoln, info_stack);
forward!(warn, warnv, warnf, warnln, warn_stack);
forward!(error, errorv, errorf, errorln, error_stack);

#[track_caller]
pub fn panic(message: impl fmt::Display) -> ! {
    global().panic(message)
}

#[track_caller]
pub fn panicv(values: &[&dyn fmt::Display]) -> ! {
    global().panicv(values)
}

#[track_caller]
pub fn panicf(args: fmt::Arguments<'_>) -> ! {
    global().panicf(args)
}

#[track_caller]
pub fn panicln(values: &[&dyn fmt::Display]) -> ! {
    global().panicln(values)
}

/// Log at `Fatal` on the default logger and exit with status 1.
#[track_caller]
pub fn fatal(message: impl fmt::Display) -> ! {
    global().fatal(message)
}

#[track_caller]
pub fn fatalv(values: &[&dyn fmt::Display]) -> ! {
    global().fatalv(values)
}

#[track_caller]
pub fn fatalf(args: fmt::Arguments<'_>) -> ! {
    global().fatalf(args)
}

#[track_caller]
pub fn fatalln(values: &[&dyn fmt::Display]) -> ! {
    global().fatalln(values)
}

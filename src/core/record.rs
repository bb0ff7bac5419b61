//! Transient log record

use super::level::Level;
use chrono::{DateTime, Local};
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;

/// Source location of the log call, rendered as `file:line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
}

impl CallSite {
    pub fn from_location(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
        }
    }

    /// Call site of the nearest caller not marked `#[track_caller]`.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One logging event. Lives only for the duration of formatting and routing.
#[derive(Debug, Clone)]
pub struct Record {
    pub level: Level,
    pub timestamp: DateTime<Local>,
    pub call_site: Option<CallSite>,
    pub message: String,
    pub stack: Option<String>,
}

impl Record {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// so a message can never forge a separate line.
    fn sanitize_message(message: &str) -> String {
        if !message.contains(['\n', '\r', '\t']) {
            return message.to_string();
        }
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Local::now(),
            call_site: None,
            message: Self::sanitize_message(&message.into()),
            stack: None,
        }
    }

    pub fn with_call_site(mut self, call_site: CallSite) -> Self {
        self.call_site = Some(call_site);
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Capture the current thread's call stack. Must run at the call site.
pub fn capture_stack() -> String {
    Backtrace::force_capture().to_string()
}

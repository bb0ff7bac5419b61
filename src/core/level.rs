//! Severity levels and the atomically mutable threshold

use super::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

/// Record severity, ordered `Debug < Info < Warn < Error < Panic < Fatal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug = 0,
    #[default]
    Info = 1,
    Warn = 2,
    Error = 3,
    Panic = 4,
    Fatal = 5,
}

impl Level {
    pub const ALL: [Level; 6] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Panic,
        Level::Fatal,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Panic => "PANIC",
            Level::Fatal => "FATAL",
        }
    }

    /// Parse a level name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::InvalidLevelName`] for anything other than the
    /// six level names.
    pub fn parse(name: &str) -> Result<Self, LoggerError> {
        name.parse()
    }

    /// `true` when a record at `self` passes `threshold`.
    #[inline]
    pub fn enabled(self, threshold: Level) -> bool {
        self >= threshold
    }

    /// `true` for the levels carried by the high-severity route.
    #[inline]
    pub fn is_high_severity(self) -> bool {
        self >= Level::Error
    }

    #[inline]
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    fn from_ordinal(value: u8) -> Self {
        match value {
            0 => Level::Debug,
            1 => Level::Info,
            2 => Level::Warn,
            3 => Level::Error,
            4 => Level::Panic,
            _ => Level::Fatal,
        }
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            Level::Debug => Blue,
            Level::Info => Green,
            Level::Warn => Yellow,
            Level::Error => Red,
            Level::Panic => Magenta,
            Level::Fatal => BrightRed,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.to_str())
    }
}

impl FromStr for Level {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "panic" => Ok(Level::Panic),
            "fatal" => Ok(Level::Fatal),
            _ => Err(LoggerError::invalid_level_name(s)),
        }
    }
}

/// Process-wide threshold cell.
///
/// Stored as a single byte so readers always observe a whole level and never
/// wait on writers.
#[derive(Debug)]
pub struct AtomicLevel {
    value: AtomicU8,
}

impl AtomicLevel {
    pub const fn new(level: Level) -> Self {
        Self {
            value: AtomicU8::new(level as u8),
        }
    }

    #[inline]
    pub fn get(&self) -> Level {
        Level::from_ordinal(self.value.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, level: Level) {
        self.value.store(level as u8, Ordering::Release);
    }

    #[inline]
    pub fn enabled(&self, candidate: Level) -> bool {
        candidate.enabled(self.get())
    }
}

impl Default for AtomicLevel {
    fn default() -> Self {
        Self::new(Level::default())
    }
}

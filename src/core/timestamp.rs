//! Timestamp layouts for encoded lines

use chrono::{DateTime, Local};
use std::fmt::Write as _;
use serde::{Deserialize, Serialize};

/// Timestamp layout used by an [`Encoder`](super::encoder::Encoder).
///
/// All layouts render the record's local wall-clock time.
///
/// # Examples
///
/// ```
/// use switchlog::core::TimestampFormat;
/// use chrono::Local;
///
/// let stamp = TimestampFormat::LocalMillis.format(&Local::now());
/// assert!(stamp.contains('T'));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// `2025-01-08T10:30:45.123`
    #[default]
    LocalMillis,

    /// `2025-01-08T10:30:45.123456`
    LocalMicros,

    /// RFC 3339 with offset: `2025-01-08T10:30:45.123+09:00`
    Rfc3339,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Any strftime-compatible layout
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Local>) -> String {
        match self {
            TimestampFormat::LocalMillis => datetime.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
            TimestampFormat::LocalMicros => datetime.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            TimestampFormat::Rfc3339 => {
                datetime.to_rfc3339_opts(chrono::SecondsFormat::Millis, false)
            }
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(format_str) => {
                // An invalid specifier makes chrono's Display fail
                let mut out = String::new();
                match write!(out, "{}", datetime.format(format_str)) {
                    Ok(()) => out,
                    Err(_) => TimestampFormat::LocalMillis.format(datetime),
                }
            }
        }
    }
}

//! Text line encoder shared by both routes of a configuration

use super::record::Record;
use super::timestamp::TimestampFormat;

/// Renders a [`Record`] as one tab-separated text line:
///
/// `2025-01-08T10:30:45.123	INFO	src/main.rs:42	Request processed`
///
/// A captured stack trace, if any, follows on the next lines. The rendered
/// text always ends with a newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoder {
    pub timestamp_format: TimestampFormat,
    pub include_call_site: bool,
    pub colored_levels: bool,
}

impl Default for Encoder {
    fn default() -> Self {
        Self {
            timestamp_format: TimestampFormat::default(),
            include_call_site: true,
            colored_levels: false,
        }
    }
}

impl Encoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[must_use]
    pub fn with_call_site(mut self, include: bool) -> Self {
        self.include_call_site = include;
        self
    }

    /// Color level names with ANSI escapes. Ignored without the `console` feature.
    #[must_use]
    pub fn with_colored_levels(mut self, enabled: bool) -> Self {
        self.colored_levels = enabled;
        self
    }

    pub fn encode(&self, record: &Record) -> String {
        let mut line = String::with_capacity(64 + record.message.len());
        line.push_str(&self.timestamp_format.format(&record.timestamp));
        line.push('\t');
        line.push_str(&self.level_str(record));
        line.push('\t');
        if self.include_call_site {
            if let Some(call_site) = record.call_site {
                line.push_str(&call_site.to_string());
                line.push('\t');
            }
        }
        line.push_str(&record.message);
        line.push('\n');

        if let Some(ref stack) = record.stack {
            line.push_str(stack.trim_end_matches('\n'));
            line.push('\n');
        }
        line
    }

    #[cfg(feature = "console")]
    fn level_str(&self, record: &Record) -> String {
        use colored::Colorize;

        if self.colored_levels {
            record
                .level
                .to_str()
                .color(record.level.color_code())
                .to_string()
        } else {
            record.level.to_str().to_string()
        }
    }

    #[cfg(not(feature = "console"))]
    fn level_str(&self, record: &Record) -> String {
        record.level.to_str().to_string()
    }
}

//! Route configurations: which sink receives which severities

use super::encoder::Encoder;
use super::level::Level;
use super::sink::Sink;
use std::sync::Arc;

/// Shape of the active routes.
#[derive(Clone)]
pub enum Routes {
    /// One sink for every severity.
    Shared(Arc<dyn Sink>),
    /// `low` takes severities up to `Warn`, `high` takes `Error` and above.
    Split {
        low: Arc<dyn Sink>,
        high: Arc<dyn Sink>,
    },
}

/// An immutable pair of routes plus the encoder both routes share.
///
/// Reconfiguration builds a fresh `RouteConfig` and swaps it in whole.
#[derive(Clone)]
pub struct RouteConfig {
    routes: Routes,
    encoder: Encoder,
}

impl RouteConfig {
    pub fn shared(sink: Arc<dyn Sink>) -> Self {
        Self {
            routes: Routes::Shared(sink),
            encoder: Encoder::default(),
        }
    }

    pub fn split(low: Arc<dyn Sink>, high: Arc<dyn Sink>) -> Self {
        Self {
            routes: Routes::Split { low, high },
            encoder: Encoder::default(),
        }
    }

    /// `stdout` for severities up to `Warn`, `stderr` for the rest.
    pub fn console() -> Self {
        use crate::sinks::ConsoleSink;

        Self::split(Arc::new(ConsoleSink::stdout()), Arc::new(ConsoleSink::stderr()))
    }

    #[must_use]
    pub fn with_encoder(mut self, encoder: Encoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    /// The single sink a record at `level` is delivered to.
    pub fn sink_for(&self, level: Level) -> &Arc<dyn Sink> {
        match &self.routes {
            Routes::Shared(sink) => sink,
            Routes::Split { low, high } => {
                if level.is_high_severity() {
                    high
                } else {
                    low
                }
            }
        }
    }

    /// Every distinct sink, for flushing.
    pub fn sinks(&self) -> Vec<&Arc<dyn Sink>> {
        match &self.routes {
            Routes::Shared(sink) => vec![sink],
            Routes::Split { low, high } if Arc::ptr_eq(low, high) => vec![low],
            Routes::Split { low, high } => vec![low, high],
        }
    }
}

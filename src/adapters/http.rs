//! HTTP request logging
//!
//! One record per completed request: `Error` when the handler attached
//! [`PrivateErrors`] or the status is 400 or above, `Debug` otherwise.
//!
//! With the `http` feature, [`request_logging`] does this as axum middleware:
//!
//! ```no_run
//! # #[cfg(feature = "http")]
//! # {
//! use axum::{middleware, routing::get, Router};
//! use switchlog::adapters::request_logging;
//!
//! let logger = switchlog::global().clone();
//! let app: Router = Router::new()
//!     .route("/health", get(|| async { "ok" }))
//!     .layer(middleware::from_fn_with_state(logger, request_logging));
//! # }
//! ```

use crate::core::{Level, Logger};
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

/// Errors a handler wants in the request log but not in the response body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrivateErrors(Vec<String>);

impl PrivateErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: impl fmt::Display) {
        self.0.push(error.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<E: fmt::Display> FromIterator<E> for PrivateErrors {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self(iter.into_iter().map(|e| e.to_string()).collect())
    }
}

/// Renders as `Error #01: first; Error #02: second`.
impl fmt::Display for PrivateErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "Error #{:02}: {}", i + 1, error)?;
        }
        Ok(())
    }
}

/// What the request log needs to know about one finished request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSummary {
    pub status: u16,
    pub latency: Duration,
    pub client: String,
    pub method: String,
    /// Path with the raw query appended after `?`, if there is one
    pub path: String,
    pub private_errors: PrivateErrors,
}

impl RequestSummary {
    pub fn level(&self) -> Level {
        if !self.private_errors.is_empty() || self.status >= 400 {
            Level::Error
        } else {
            Level::Debug
        }
    }
}

impl fmt::Display for RequestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let latency = format!("{:?}", self.latency);
        write!(
            f,
            "[HTTP] {:>3} | {:>13} | {:>15} | {:<7} {:?}",
            self.status, latency, self.client, self.method, self.path
        )?;
        if !self.private_errors.is_empty() {
            write!(f, " | {}", self.private_errors)?;
        }
        Ok(())
    }
}

/// Emit the record for one finished request.
#[track_caller]
pub fn log_request(logger: &Logger, summary: &RequestSummary) {
    logger.log(summary.level(), summary);
}

/// Best guess at the client address: the socket peer, then the first
/// `X-Forwarded-For` entry, then `X-Real-IP`.
pub fn client_address(
    peer: Option<SocketAddr>,
    forwarded_for: Option<&str>,
    real_ip: Option<&str>,
) -> String {
    if let Some(peer) = peer {
        return peer.ip().to_string();
    }
    fn non_empty(v: &str) -> Option<&str> {
        Some(v.trim()).filter(|v| !v.is_empty())
    }

    forwarded_for
        .and_then(|v| v.split(',').next())
        .and_then(non_empty)
        .or_else(|| real_ip.and_then(non_empty))
        .unwrap_or("-")
        .to_string()
}

/// Path plus `?query` when the query is non-empty.
pub fn path_with_query(path: &str, query: Option<&str>) -> String {
    match query {
        Some(query) if !query.is_empty() => format!("{}?{}", path, query),
        _ => path.to_string(),
    }
}

#[cfg(feature = "http")]
mod middleware {
    use super::{client_address, log_request, path_with_query, PrivateErrors, RequestSummary};
    use crate::core::Logger;
    use axum::{
        extract::{ConnectInfo, Request, State},
        middleware::Next,
        response::Response,
    };
    use std::net::SocketAddr;
    use std::time::Instant;

    fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
        request.headers().get(name).and_then(|v| v.to_str().ok())
    }

    /// Axum middleware logging every request through `logger`.
    ///
    /// Install with `axum::middleware::from_fn_with_state(logger, request_logging)`.
    /// Handlers report private errors by inserting [`PrivateErrors`] into the
    /// response extensions.
    pub async fn request_logging(
        State(logger): State<Logger>,
        request: Request,
        next: Next,
    ) -> Response {
        let start = Instant::now();
        let method = request.method().to_string();
        let path = path_with_query(request.uri().path(), request.uri().query());
        let peer = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0);
        let client = client_address(
            peer,
            header(&request, "x-forwarded-for"),
            header(&request, "x-real-ip"),
        );

        let response = next.run(request).await;

        let summary = RequestSummary {
            status: response.status().as_u16(),
            latency: start.elapsed(),
            client,
            method,
            path,
            private_errors: response
                .extensions()
                .get::<PrivateErrors>()
                .cloned()
                .unwrap_or_default(),
        };
        log_request(&logger, &summary);

        response
    }
}

#[cfg(feature = "http")]
pub use middleware::request_logging;

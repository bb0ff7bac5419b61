//! Adapters that feed other frameworks' events into a [`Logger`]
//!
//! Neither adapter decides routing or threshold; both only pick a level and
//! a message and hand them to the emission API.
//!
//! [`Logger`]: crate::core::Logger

pub mod http;
pub mod query;

#[cfg(feature = "http")]
pub use http::request_logging;
pub use http::{client_address, log_request, PrivateErrors, RequestSummary};
pub use query::{QueryError, QueryTracer};

//! Integration tests for the HTTP and query adapters

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use switchlog::adapters::{QueryError, QueryTracer};
use switchlog::prelude::*;

fn memory_logger() -> (Logger, Arc<MemorySink>, Arc<MemorySink>) {
    let low = Arc::new(MemorySink::new("low"));
    let high = Arc::new(MemorySink::new("high"));
    let logger = Logger::builder()
        .min_level(Level::Debug)
        .routes(RouteConfig::split(low.clone(), high.clone()))
        .build();
    (logger, low, high)
}

#[derive(Debug)]
struct RecordNotFound;

impl fmt::Display for RecordNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("record not found")
    }
}

impl QueryError for RecordNotFound {
    fn is_not_found(&self) -> bool {
        true
    }
}

#[derive(Debug)]
struct Deadlock;

impl fmt::Display for Deadlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("deadlock detected")
    }
}

impl QueryError for Deadlock {}

#[test]
fn test_query_outcomes_route_by_severity() {
    let (logger, low, high) = memory_logger();
    let tracer = QueryTracer::new(logger, Duration::from_millis(100));
    let query = || ("SELECT id FROM users".to_string(), 7);

    tracer.trace(Duration::from_millis(50), query, None);
    tracer.trace(Duration::from_millis(150), query, None);
    tracer.trace(Duration::from_millis(10), query, Some(&RecordNotFound));
    tracer.trace(Duration::from_millis(10), query, Some(&Deadlock));

    assert_eq!(low.levels(), vec![Level::Debug, Level::Warn, Level::Debug]);
    assert_eq!(high.levels(), vec![Level::Error]);

    let lines = low.lines();
    assert!(lines[0].contains("[rows:7] SELECT id FROM users"));
    assert!(lines[1].contains("SLOW SQL >= 100ms"));
    assert!(high.lines()[0].contains("deadlock detected [10.000ms]"));
}

#[test]
fn test_query_tracer_follows_logger_threshold() {
    let (logger, low, high) = memory_logger();
    let tracer = QueryTracer::new(logger.clone(), Duration::from_millis(100));
    logger.set_level("warn");

    tracer.trace(Duration::from_millis(1), || ("SELECT 1".to_string(), 1), None);
    tracer.trace(Duration::from_secs(1), || ("SELECT 2".to_string(), 1), None);

    assert_eq!(low.levels(), vec![Level::Warn]);
    assert!(high.is_empty());
}

mod http {
    use super::memory_logger;
    use std::time::Duration;
    use switchlog::adapters::{log_request, PrivateErrors, RequestSummary};
    use switchlog::prelude::*;

    fn request(status: u16, errors: &[&str]) -> RequestSummary {
        RequestSummary {
            status,
            latency: Duration::from_micros(850),
            client: "127.0.0.1".to_string(),
            method: "POST".to_string(),
            path: "/orders".to_string(),
            private_errors: errors.iter().collect(),
        }
    }

    #[test]
    fn test_request_outcomes_route_by_severity() {
        let (logger, low, high) = memory_logger();

        log_request(&logger, &request(200, &[]));
        log_request(&logger, &request(500, &[]));
        log_request(&logger, &request(200, &["payment gateway timeout"]));

        assert_eq!(low.levels(), vec![Level::Debug]);
        assert_eq!(high.levels(), vec![Level::Error, Level::Error]);
        assert!(high.lines()[1].contains("Error #01: payment gateway timeout"));
        assert!(low.lines()[0].contains("[HTTP] 200 |"));
    }

    #[test]
    fn test_private_errors_collect() {
        let errors: PrivateErrors = ["a", "b"].into_iter().collect();
        assert_eq!(errors.len(), 2);
    }
}

#[cfg(feature = "http")]
mod middleware {
    use super::memory_logger;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        response::{IntoResponse, Response},
        routing::get,
        Router,
    };
    use switchlog::adapters::{request_logging, PrivateErrors};
    use switchlog::prelude::*;
    use tower::ServiceExt;

    async fn flaky() -> Response {
        let mut response = (StatusCode::OK, "served from replica").into_response();
        let mut errors = PrivateErrors::new();
        errors.push("primary unreachable");
        response.extensions_mut().insert(errors);
        response
    }

    fn app(logger: Logger) -> Router {
        Router::new()
            .route("/health", get(|| async { "ok" }))
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
            .route("/flaky", get(flaky))
            .layer(middleware::from_fn_with_state(logger, request_logging))
    }

    #[tokio::test]
    async fn test_middleware_logs_success_at_debug() {
        let (logger, low, high) = memory_logger();

        let response = app(logger)
            .oneshot(
                Request::builder()
                    .uri("/health?verbose=1")
                    .header("x-forwarded-for", "203.0.113.5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(low.levels(), vec![Level::Debug]);
        assert!(high.is_empty());

        let line = &low.lines()[0];
        assert!(line.contains("[HTTP] 200 |"), "{line}");
        assert!(line.contains("203.0.113.5"), "{line}");
        assert!(line.contains("GET     \"/health?verbose=1\""), "{line}");
    }

    #[tokio::test]
    async fn test_middleware_logs_client_error_at_error() {
        let (logger, low, high) = memory_logger();

        let response = app(logger)
            .oneshot(Request::builder().uri("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(low.is_empty());
        assert_eq!(high.levels(), vec![Level::Error]);
        assert!(high.lines()[0].contains("[HTTP] 404 |"));
    }

    #[tokio::test]
    async fn test_middleware_logs_private_errors() {
        let (logger, _, high) = memory_logger();

        let response = app(logger)
            .oneshot(Request::builder().uri("/flaky").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(high.levels(), vec![Level::Error]);
        assert!(high.lines()[0].contains("Error #01: primary unreachable"));
    }
}

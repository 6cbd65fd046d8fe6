//! Request instrumentation layer.
//!
//! Wraps every inbound request: monotonic latency timing, metrics recording,
//! span annotation, and audit-record production. Runs inside the request
//! span opened by the trace layer, so the trace context captured here is the
//! one the writer links its insert span to.

use std::collections::HashMap;
use std::time::Instant;

use axum::extract::{MatchedPath, Query, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::audit::{AuditRecord, TraceLinkage};
use crate::http::server::AppState;
use crate::observability::metrics;

/// Paths that produce no metrics and no audit record. Exact string match
/// against the request path.
pub const EXCLUDED_PATHS: [&str; 4] = ["/metrics", "/health", "/ready", "/favicon.ico"];

pub fn is_excluded(path: &str) -> bool {
    EXCLUDED_PATHS.contains(&path)
}

/// Middleware measuring each request and enqueueing its audit record.
///
/// The record is built after the response is finalized and enqueued just
/// before it is returned, so the observed latency excludes the enqueue cost.
pub async fn track_requests(
    State(state): State<AppState>,
    matched_path: Option<MatchedPath>,
    request: Request,
    next: Next,
) -> Response {
    // `Query` has no `OptionalFromRequestParts` impl in axum 0.8, so build
    // the Option manually; `Query::from_request_parts` is `try_from_uri`.
    let query: Option<Query<HashMap<String, String>>> =
        Query::try_from_uri(request.uri()).ok();
    let path = request.uri().path().to_string();
    if is_excluded(&path) {
        return next.run(request).await;
    }

    let method = request.method().to_string();
    // Matched route template, so /time?timezone=X and /time?timezone=Y land
    // in the same series. Unmatched requests fall back to the raw path.
    let route = matched_path
        .as_ref()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| path.clone());

    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed();
    let status = response.status().as_u16();

    metrics::record_request(&method, &route, status, duration);

    let span = tracing::Span::current();
    span.set_attribute("http.route", route.clone());
    span.set_attribute("http.method", method.clone());
    span.set_attribute("http.status_code", i64::from(status));

    let linkage = TraceLinkage::capture();
    let params = query.map(|Query(q)| q).unwrap_or_default();
    let record = AuditRecord::new(
        path,
        method,
        status,
        duration.as_millis() as u64,
        params.get("timezone").map(String::as_str),
        params.get("city").map(String::as_str),
        linkage.trace_id_hex(),
    );
    state.audit.enqueue(record, linkage);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusion_set() {
        assert!(is_excluded("/metrics"));
        assert!(is_excluded("/health"));
        assert!(is_excluded("/ready"));
        assert!(is_excluded("/favicon.ico"));
    }

    #[test]
    fn test_exclusion_is_exact_match() {
        assert!(!is_excluded("/time"));
        assert!(!is_excluded("/healthz"));
        assert!(!is_excluded("/health/"));
        assert!(!is_excluded("/metrics/extra"));
    }
}

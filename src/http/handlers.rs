//! Endpoint handlers.

use std::collections::HashMap;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Query, Request, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tokio::time;

use crate::clock::service as clock;
use crate::db;
use crate::http::server::AppState;

/// `GET /time?timezone=<name>` — current time in one timezone, UTC default.
pub async fn get_time(Query(params): Query<HashMap<String, String>>) -> Response {
    let name = params.get("timezone").map(String::as_str).unwrap_or("UTC");
    match clock::resolve(name) {
        Ok(tz) => Json(clock::now(tz)).into_response(),
        Err(_) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Unknown timezone"})),
        )
            .into_response(),
    }
}

/// `GET /timezones` — all canonical names grouped by region.
pub async fn list_timezones() -> Response {
    Json(clock::list_all()).into_response()
}

/// `GET /world-clocks` — snapshots for the fixed city table.
pub async fn world_clocks() -> Response {
    let cities = clock::world_clocks();
    Json(json!({
        "count": cities.len(),
        "cities": cities,
    }))
    .into_response()
}

/// `GET /legacy/time` — backward-compatible wall-clock string.
pub async fn legacy_time() -> Response {
    Json(json!({"current_time": clock::legacy_time()})).into_response()
}

/// `GET /health` — probes the audit database with a short timeout.
pub async fn health(State(state): State<AppState>) -> Response {
    match db::probe(&state.config.database).await {
        Ok(()) => Json(json!({"status": "healthy", "database": "up"})).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "status": "unhealthy",
                "database": format!("unhealthy: {}", e),
            })),
        )
            .into_response(),
    }
}

/// `GET /ready` — no dependency checks.
pub async fn ready() -> Response {
    Json(json!({"status": "ready"})).into_response()
}

/// `GET /metrics` — Prometheus exposition.
pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled").into_response(),
    }
}

/// `POST /frontend-traces` — forward the opaque body verbatim to the trace
/// collector. Synchronous with the client, so it carries a short timeout;
/// the upstream status is mirrored, and any forwarding failure is a 500.
pub async fn forward_traces(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let mut upstream = axum::http::Request::builder()
        .method(Method::POST)
        .uri(&state.config.trace_forwarding.collector_url);
    if let Some(content_type) = parts.headers.get(header::CONTENT_TYPE) {
        upstream = upstream.header(header::CONTENT_TYPE, content_type.clone());
    }
    let upstream = match upstream.body(body) {
        Ok(req) => req,
        Err(e) => {
            tracing::error!(error = %e, "failed to build collector request");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Trace forwarding failed")
                .into_response();
        }
    };

    let timeout = Duration::from_secs(state.config.trace_forwarding.timeout_secs);
    match time::timeout(timeout, state.forward_client.request(upstream)).await {
        Ok(Ok(response)) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body)).into_response()
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "trace forwarding failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Trace forwarding failed").into_response()
        }
        Err(_) => {
            tracing::error!(timeout_secs = timeout.as_secs(), "trace forwarding timed out");
            (StatusCode::INTERNAL_SERVER_ERROR, "Trace forwarding timed out").into_response()
        }
    }
}

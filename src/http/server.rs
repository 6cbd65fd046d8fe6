//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (CORS, tracing, request instrumentation)
//! - Inject shared state (config, audit queue, forward client, metrics)
//! - Serve with graceful shutdown

use std::sync::Arc;

use axum::body::Body;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::audit::AuditQueue;
use crate::config::AppConfig;
use crate::http::{handlers, instrument};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub audit: AuditQueue,
    pub forward_client: Client<HttpConnector, Body>,
    pub metrics: Option<PrometheusHandle>,
}

/// HTTP server for the kronos service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig, audit: AuditQueue, metrics: Option<PrometheusHandle>) -> Self {
        let forward_client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            config: Arc::new(config),
            audit,
            forward_client,
            metrics,
        };

        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        // Layer order (outermost first): CORS, trace span, instrumentation.
        // Instrumentation must run inside the trace layer's span so the
        // audit linkage captures the request span context.
        Router::new()
            .route("/time", get(handlers::get_time))
            .route("/timezones", get(handlers::list_timezones))
            .route("/world-clocks", get(handlers::world_clocks))
            .route("/legacy/time", get(handlers::legacy_time))
            .route("/health", get(handlers::health))
            .route("/ready", get(handlers::ready))
            .route("/metrics", get(handlers::metrics))
            .route("/frontend-traces", post(handlers::forward_traces))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                instrument::track_requests,
            ))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Run the server, accepting connections on the given listener, until
    /// ctrl-c or the external shutdown signal.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_signal() => {}
                    _ = shutdown.recv() => {
                        tracing::info!("External shutdown signal received");
                    }
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("Failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}

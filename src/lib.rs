//! Kronos: world-clock HTTP service with an asynchronous audit pipeline.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client Request ──▶ http (axum) ──▶ clock (chrono-tz lookups)
//!                        │
//!                        │  instrumentation middleware:
//!                        │  latency + metrics + span attrs
//!                        ▼
//!                  audit queue (unbounded, fire-and-forget)
//!                        │
//!                        ▼
//!                  audit writer (single task, owns the Postgres
//!                  connection, reconnect-with-backoff, linked spans)
//! ```
//!
//! The audit pipeline is fully isolated from the response path: enqueue
//! never blocks, and no storage failure can change an HTTP response.

// Core subsystems
pub mod audit;
pub mod clock;
pub mod db;
pub mod http;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

//! Observability: structured logging, distributed tracing, metrics.

pub mod metrics;
pub mod tracing;

//! Trace context carrier for the producer→consumer handoff.
//!
//! The ambient trace context lives in task-local storage and does not survive
//! the queue handoff, so the instrumentation layer snapshots it here and the
//! writer restores it explicitly before emitting its persistence span.

use opentelemetry::trace::{SpanContext, TraceContextExt};
use opentelemetry::Context;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Snapshot of the request span's context, carried by value through the
/// audit queue.
#[derive(Debug, Clone)]
pub struct TraceLinkage {
    span_context: SpanContext,
    context: Context,
}

impl TraceLinkage {
    /// Capture the current span's context. Valid only when an OTel-bridged
    /// subscriber is installed and a sampled span is active; otherwise the
    /// linkage is inert and [`trace_id_hex`](Self::trace_id_hex) is `None`.
    pub fn capture() -> Self {
        let context = tracing::Span::current().context();
        let span_context = context.span().span_context().clone();
        Self {
            span_context,
            context,
        }
    }

    /// Parent context for the deferred write: the captured span reinstated as
    /// a non-recording remote parent, so the insert span links to the request
    /// trace without the original span object needing to be alive.
    pub fn remote_parent(&self) -> Context {
        if self.span_context.is_valid() {
            self.context
                .with_remote_span_context(self.span_context.clone())
        } else {
            Context::new()
        }
    }

    /// Hex-encoded trace id, if a valid context was captured.
    pub fn trace_id_hex(&self) -> Option<String> {
        self.span_context
            .is_valid()
            .then(|| self.span_context.trace_id().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_without_subscriber_is_invalid() {
        // No OTel layer installed: the captured context must be inert, not
        // a panic or a bogus id.
        let linkage = TraceLinkage::capture();
        assert!(linkage.trace_id_hex().is_none());
    }

    #[test]
    fn test_remote_parent_without_context_is_empty() {
        let linkage = TraceLinkage::capture();
        let cx = linkage.remote_parent();
        assert!(!cx.span().span_context().is_valid());
    }
}

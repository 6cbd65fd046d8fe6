//! Audit record construction.

use serde::Serialize;

/// Placeholder for query parameters the client did not supply.
pub const UNKNOWN_PARAM: &str = "unknown";

/// One persisted row per completed, non-excluded HTTP request.
///
/// Built by the instrumentation layer after the response is finalized, then
/// handed to the queue. Ownership moves to the writer worker, which consumes
/// the record on its single persistence attempt; records are never requeued.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub path: String,
    pub method: String,
    pub status: u16,
    pub latency_ms: u64,
    pub timezone: String,
    pub city: String,
    /// Hex-encoded trace id, absent when no valid trace context existed.
    pub trace_id: Option<String>,
}

impl AuditRecord {
    pub fn new(
        path: impl Into<String>,
        method: impl Into<String>,
        status: u16,
        latency_ms: u64,
        timezone: Option<&str>,
        city: Option<&str>,
        trace_id: Option<String>,
    ) -> Self {
        Self {
            path: path.into(),
            method: method.into(),
            status,
            latency_ms,
            timezone: timezone.unwrap_or(UNKNOWN_PARAM).to_string(),
            city: city.unwrap_or(UNKNOWN_PARAM).to_string(),
            trace_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_params_default_to_unknown() {
        let record = AuditRecord::new("/time", "GET", 200, 3, None, None, None);
        assert_eq!(record.timezone, "unknown");
        assert_eq!(record.city, "unknown");
        assert!(record.trace_id.is_none());
    }

    #[test]
    fn test_supplied_params_kept() {
        let record = AuditRecord::new(
            "/time",
            "GET",
            200,
            3,
            Some("Europe/London"),
            Some("London"),
            Some("0af7651916cd43dd8448eb211c80319c".to_string()),
        );
        assert_eq!(record.timezone, "Europe/London");
        assert_eq!(record.city, "London");
        assert_eq!(
            record.trace_id.as_deref(),
            Some("0af7651916cd43dd8448eb211c80319c")
        );
    }
}

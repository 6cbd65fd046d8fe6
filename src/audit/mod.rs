//! Asynchronous audit pipeline.
//!
//! Request handlers produce `(AuditRecord, TraceLinkage)` tuples onto an
//! unbounded queue; a single writer worker persists them to Postgres. The
//! pipeline is fully isolated from the request/response lifecycle: no storage
//! problem can change an HTTP response.

pub mod queue;
pub mod record;
pub mod trace_link;
pub mod writer;

pub use queue::{channel, AuditMessage, AuditQueue, AuditQueueReceiver};
pub use record::AuditRecord;
pub use trace_link::TraceLinkage;
pub use writer::AuditWriter;

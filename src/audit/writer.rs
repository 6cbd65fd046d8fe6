//! Durable writer worker.
//!
//! Single long-lived task that drains the audit queue into Postgres. The
//! connection and its state machine are owned here exclusively; producers
//! never see storage errors. A failed insert drops that record and tears the
//! connection down; the connection (not the record) is retried on a fixed
//! interval. The shutdown sentinel closes the connection and exits.

use std::time::Duration;

use opentelemetry::global;
use opentelemetry::trace::{Span, SpanKind, Status, Tracer};
use opentelemetry::KeyValue;
use sqlx::{Connection, PgConnection};
use tokio::time;

use crate::audit::queue::{AuditMessage, AuditQueueReceiver};
use crate::audit::record::AuditRecord;
use crate::audit::trace_link::TraceLinkage;
use crate::config::DatabaseConfig;
use crate::db;

/// Storage seam for the writer. The state machine in [`drive`] is written
/// against this trait; [`PgStore`] is the production implementation.
pub(crate) trait AuditStore {
    type Conn;

    async fn connect(&self) -> sqlx::Result<Self::Conn>;
    async fn persist(
        &self,
        conn: &mut Self::Conn,
        record: &AuditRecord,
        linkage: &TraceLinkage,
    ) -> sqlx::Result<()>;
    async fn close(&self, conn: Self::Conn);
}

struct PgStore {
    config: DatabaseConfig,
}

impl AuditStore for PgStore {
    type Conn = PgConnection;

    async fn connect(&self) -> sqlx::Result<PgConnection> {
        db::connect(&self.config).await
    }

    async fn persist(
        &self,
        conn: &mut PgConnection,
        record: &AuditRecord,
        linkage: &TraceLinkage,
    ) -> sqlx::Result<()> {
        traced_insert(conn, &self.config.table, record, linkage).await
    }

    async fn close(&self, conn: PgConnection) {
        let _ = conn.close().await;
    }
}

/// Connection state, never shared outside the worker.
enum ConnectionState<C> {
    Disconnected,
    Connected(C),
}

pub struct AuditWriter {
    config: DatabaseConfig,
    queue: AuditQueueReceiver,
}

impl AuditWriter {
    pub fn new(config: DatabaseConfig, queue: AuditQueueReceiver) -> Self {
        Self { config, queue }
    }

    /// Run until the shutdown sentinel arrives. While disconnected the queue
    /// is not drained; entries accumulate until the connection comes back.
    pub async fn run(self) {
        let backoff = Duration::from_secs(self.config.reconnect_interval_secs);
        let store = PgStore {
            config: self.config,
        };
        drive(store, backoff, self.queue).await;
    }
}

/// The writer state machine: connect with a fixed retry interval, then drain
/// entries until an insert fails (close, go back to connecting) or the
/// sentinel arrives (close, exit).
async fn drive<S: AuditStore>(store: S, backoff: Duration, mut queue: AuditQueueReceiver) {
    let mut state = ConnectionState::Disconnected;

    loop {
        state = match state {
            ConnectionState::Disconnected => match store.connect().await {
                Ok(conn) => {
                    tracing::info!("audit writer connected");
                    ConnectionState::Connected(conn)
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        retry_in_secs = backoff.as_secs(),
                        "audit database unavailable"
                    );
                    time::sleep(backoff).await;
                    ConnectionState::Disconnected
                }
            },
            ConnectionState::Connected(mut conn) => match queue.recv().await {
                AuditMessage::Shutdown => {
                    store.close(conn).await;
                    tracing::info!("audit writer shutting down");
                    return;
                }
                AuditMessage::Entry(record, linkage) => {
                    match store.persist(&mut conn, &record, &linkage).await {
                        Ok(()) => ConnectionState::Connected(conn),
                        Err(e) => {
                            // The in-flight record is dropped, not retried.
                            tracing::error!(
                                error = %e,
                                path = %record.path,
                                trace_id = record.trace_id.as_deref().unwrap_or("-"),
                                "audit insert failed, dropping record and reconnecting"
                            );
                            store.close(conn).await;
                            ConnectionState::Disconnected
                        }
                    }
                }
            },
        };
    }
}

/// One transactional insert, wrapped in a span parented on the originating
/// request via the captured linkage (non-recording remote parent).
async fn traced_insert(
    conn: &mut PgConnection,
    table: &str,
    record: &AuditRecord,
    linkage: &TraceLinkage,
) -> sqlx::Result<()> {
    let parent_cx = linkage.remote_parent();
    let tracer = global::tracer("kronos-audit");
    let mut span = tracer
        .span_builder("INSERT requests")
        .with_kind(SpanKind::Client)
        .start_with_context(&tracer, &parent_cx);
    span.set_attribute(KeyValue::new("db.system", "postgresql"));
    span.set_attribute(KeyValue::new("db.sql.table", table.to_string()));
    span.set_attribute(KeyValue::new("http.route", record.path.clone()));

    // The context guard is thread-local and cannot be held across an await,
    // so the restored context is scoped to the span itself rather than
    // attached to the task.
    let result = insert_in_tx(conn, table, record).await;

    match &result {
        Ok(()) => span.set_status(Status::Ok),
        Err(e) => span.set_status(Status::error(e.to_string())),
    }
    span.end();

    result
}

async fn insert_in_tx(
    conn: &mut PgConnection,
    table: &str,
    record: &AuditRecord,
) -> sqlx::Result<()> {
    let mut tx = conn.begin().await?;
    if let Err(e) = db::insert_record(&mut tx, table, record).await {
        let _ = tx.rollback().await;
        return Err(e);
    }
    tx.commit().await
}

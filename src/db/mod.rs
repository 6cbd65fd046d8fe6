//! Postgres access for the audit pipeline.
//!
//! The writer worker owns a single `PgConnection`; nothing here is pooled or
//! shared. The health probe opens its own short-lived connection.

use std::time::Duration;

use sqlx::{Connection, PgConnection, Postgres, Transaction};
use thiserror::Error;
use tokio::time;

use crate::audit::record::AuditRecord;
use crate::config::DatabaseConfig;

/// Health-probe failure, surfaced as the diagnostic reason in `/health`.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("{0}")]
    Connect(#[from] sqlx::Error),
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
}

/// Open the writer's connection and make sure the audit table exists.
pub async fn connect(config: &DatabaseConfig) -> sqlx::Result<PgConnection> {
    let mut conn = PgConnection::connect(&config.dsn).await?;
    ensure_schema(&mut conn, &config.table).await?;
    Ok(conn)
}

async fn ensure_schema(conn: &mut PgConnection, table: &str) -> sqlx::Result<()> {
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id          BIGSERIAL PRIMARY KEY,
            path        TEXT NOT NULL,
            method      TEXT NOT NULL,
            status      INTEGER NOT NULL,
            latency_ms  BIGINT NOT NULL,
            timezone    TEXT NOT NULL,
            city        TEXT NOT NULL,
            trace_id    TEXT,
            created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
        table
    );
    sqlx::query(&ddl).execute(conn).await?;
    Ok(())
}

/// Insert one audit row inside the caller's transaction.
pub async fn insert_record(
    tx: &mut Transaction<'_, Postgres>,
    table: &str,
    record: &AuditRecord,
) -> sqlx::Result<()> {
    let sql = format!(
        "INSERT INTO {} (path, method, status, latency_ms, timezone, city, trace_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
        table
    );
    sqlx::query(&sql)
        .bind(&record.path)
        .bind(&record.method)
        .bind(record.status as i32)
        .bind(record.latency_ms as i64)
        .bind(&record.timezone)
        .bind(&record.city)
        .bind(&record.trace_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Open and immediately close a probe connection, bounded by the configured
/// timeout. Used by `/health` only; never touches the writer's connection.
pub async fn probe(config: &DatabaseConfig) -> Result<(), ProbeError> {
    let timeout = Duration::from_secs(config.probe_timeout_secs);
    match time::timeout(timeout, PgConnection::connect(&config.dsn)).await {
        Ok(Ok(conn)) => {
            let _ = conn.close().await;
            Ok(())
        }
        Ok(Err(e)) => Err(ProbeError::Connect(e)),
        Err(_) => Err(ProbeError::Timeout(timeout)),
    }
}

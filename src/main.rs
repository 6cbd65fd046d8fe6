use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use kronos::audit::{self, AuditWriter};
use kronos::config::{self, AppConfig};
use kronos::http::HttpServer;
use kronos::lifecycle::Shutdown;
use kronos::observability::{metrics, tracing as otel};

#[derive(Debug, Parser)]
#[command(name = "kronos", about = "World-clock service with async audit logging")]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => AppConfig::default(),
    };

    let provider = otel::init_tracing(&config.observability)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        otlp_endpoint = %config.observability.otlp_endpoint,
        database_table = %config.database.table,
        "Configuration loaded"
    );

    let metrics_handle = if config.observability.metrics_enabled {
        Some(metrics::init_metrics()?)
    } else {
        None
    };

    // Audit pipeline: queue shared with request handlers, one writer task.
    let (queue, queue_rx) = audit::channel();
    let writer = AuditWriter::new(config.database.clone(), queue_rx);
    let writer_handle = tokio::spawn(writer.run());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, queue.clone(), metrics_handle);
    server.run(listener, shutdown.subscribe()).await?;

    // Drain the audit pipeline. The writer only observes the sentinel while
    // connected; if storage is down it is mid-backoff, so bound the wait
    // rather than hang the process.
    queue.shutdown();
    if tokio::time::timeout(Duration::from_secs(10), writer_handle)
        .await
        .is_err()
    {
        tracing::warn!("audit writer did not drain before timeout");
    }

    provider.shutdown()?;

    tracing::info!("Shutdown complete");
    Ok(())
}

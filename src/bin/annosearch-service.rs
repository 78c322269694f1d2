//! annosearch service entry point.
//!
//! Owns the annotation store and answers search/export requests on a
//! loopback socket until interrupted with Ctrl+C.
//!
//! Logs are written to `<data_dir>/logs/annosearch-service.log.<date>`.

use tokio::sync::broadcast;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use annosearch::service::{run_service, ServiceConfig};

/// Initialize tracing with a daily file appender, falling back to stderr.
///
/// The returned guard must live until exit so buffered lines are flushed.
fn init_logging(config: &ServiceConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let log_dir = config.log_dir();

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Failed to create log directory {:?}: {}", log_dir, e);
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(&log_dir, "annosearch-service.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false)
        .init();

    tracing::info!("Logging initialized to {:?}", log_dir);
    tracing::info!("annosearch service v{} starting", env!("CARGO_PKG_VERSION"));

    Some(guard)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::load()?;
    let _guard = init_logging(&config);

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown signal received"),
            Err(e) => tracing::error!("Failed to listen for Ctrl+C: {}", e),
        }
        let _ = shutdown_tx.send(());
    });

    if let Err(e) = run_service(config, shutdown_rx).await {
        tracing::error!("Service failed: {}", e);
        return Err(e.into());
    }

    Ok(())
}

//! Service lifecycle management.
//!
//! Startup order:
//! 1. Create the data directory
//! 2. Open the annotation store
//! 3. Import the seed collection, if configured
//! 4. Bind the listener and serve requests until shutdown

pub mod config;

pub use config::ServiceConfig;

use std::path::Path;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::export::jsonld;
use crate::ipc::IpcServer;
use crate::search::SearchService;
use crate::store::SqliteStore;
use crate::{AnnoError, Result};

/// Open the store described by `config` and apply its seed file.
pub fn open_store(config: &ServiceConfig) -> Result<SqliteStore> {
    if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
        tracing::error!("Failed to create data directory: {}", e);
        return Err(AnnoError::Io(e));
    }

    let db_path = config.database_path();
    let store = SqliteStore::open(&db_path)?;
    tracing::info!("Database opened: {:?}", db_path);

    if let Some(seed) = &config.seed_file {
        let imported = seed_store(&store, seed)?;
        tracing::info!("Imported {} annotations from {:?}", imported, seed);
    }

    tracing::info!("Store holds {} annotations", store.count()?);
    Ok(store)
}

/// Import a JSON-LD collection (or bare array) of annotations.
pub fn seed_store(store: &SqliteStore, path: &Path) -> Result<usize> {
    let body = std::fs::read_to_string(path)?;
    let records = jsonld::deserialize(&body)?;
    store.import(&records)
}

/// Run the service until `shutdown` fires.
pub async fn run_service(config: ServiceConfig, shutdown: broadcast::Receiver<()>) -> Result<()> {
    tracing::info!("Loaded configuration: data_dir={:?}", config.data_dir);

    let store = open_store(&config)?;
    let service = Arc::new(SearchService::new(store));

    let listener = TcpListener::bind(&config.listen_addr).await.map_err(|e| {
        AnnoError::Ipc(format!("Failed to bind {}: {}", config.listen_addr, e))
    })?;

    IpcServer::new(service).run(listener, shutdown).await?;

    tracing::info!("Service stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnnotationRecord;
    use tempfile::TempDir;

    fn config_in(dir: &Path) -> ServiceConfig {
        ServiceConfig {
            data_dir: dir.join("data"),
            listen_addr: "127.0.0.1:0".to_string(),
            seed_file: None,
            log_filter: "info".to_string(),
        }
    }

    #[test]
    fn test_open_store_creates_data_dir() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());

        let store = open_store(&config).unwrap();
        assert_eq!(store.count().unwrap(), 0);
        assert!(config.database_path().exists());
    }

    #[test]
    fn test_seed_file_is_imported() {
        let dir = TempDir::new().unwrap();
        let seed = dir.path().join("seed.jsonld");
        let records = vec![
            AnnotationRecord::new("an1", "s1", "a@example.org").with_tags(["climate"]),
            AnnotationRecord::new("an2", "s2", "b@example.org"),
        ];
        std::fs::write(&seed, jsonld::serialize(&records).body).unwrap();

        let mut config = config_in(dir.path());
        config.seed_file = Some(seed);

        let store = open_store(&config).unwrap();
        assert_eq!(store.count().unwrap(), 2);

        // Seeding again upserts instead of duplicating.
        drop(store);
        let store = open_store(&config).unwrap();
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_malformed_seed_is_error() {
        let dir = TempDir::new().unwrap();
        let seed = dir.path().join("seed.jsonld");
        std::fs::write(&seed, "{ not json").unwrap();

        let mut config = config_in(dir.path());
        config.seed_file = Some(seed);

        assert!(matches!(open_store(&config), Err(AnnoError::Serialization(_))));
    }

    #[test]
    fn test_missing_seed_is_io_error() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(dir.path());
        config.seed_file = Some(dir.path().join("absent.jsonld"));

        assert!(matches!(open_store(&config), Err(AnnoError::Io(_))));
    }

    #[tokio::test]
    async fn test_run_service_stops_on_shutdown() {
        let dir = TempDir::new().unwrap();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        shutdown_tx.send(()).unwrap();

        run_service(config_in(dir.path()), shutdown_rx).await.unwrap();
    }
}

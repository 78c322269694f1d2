//! Annotation store seam used by the search service.
//!
//! The search layer only needs "execute this filter, give me the matching
//! records". [`SqliteStore`] provides that over the bundled SQLite database;
//! queries run on the blocking pool so async callers are never stalled.

use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::db::{self, Database};
use crate::model::AnnotationRecord;
use crate::search::StorageFilter;
use crate::{AnnoError, Result};

/// A document store that can execute a [`StorageFilter`].
pub trait AnnotationStore: Send + Sync {
    /// Return all records matching `filter`, in store order.
    fn find(
        &self,
        filter: &StorageFilter,
    ) -> impl Future<Output = Result<Vec<AnnotationRecord>>> + Send;
}

/// SQLite-backed annotation store.
#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Mutex<Database>>,
}

impl SqliteStore {
    /// Wrap an open database.
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Open (or create) a database file.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(db::open_database(path)?))
    }

    /// A fresh private in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(db::open_in_memory()?))
    }

    /// Upsert records, returning how many were written.
    pub fn import(&self, records: &[AnnotationRecord]) -> Result<usize> {
        let mut guard = self.lock()?;
        db::import_annotations(guard.conn_mut(), records)
    }

    /// Number of stored annotations.
    pub fn count(&self) -> Result<usize> {
        db::count_annotations(self.lock()?.conn())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Database>> {
        self.db
            .lock()
            .map_err(|e| AnnoError::Database(format!("Failed to acquire database lock: {}", e)))
    }
}

impl AnnotationStore for SqliteStore {
    async fn find(&self, filter: &StorageFilter) -> Result<Vec<AnnotationRecord>> {
        let store = self.clone();
        let filter = filter.clone();

        tokio::task::spawn_blocking(move || {
            let guard = store.lock()?;
            db::find_annotations(guard.conn(), &filter)
        })
        .await
        .map_err(|e| AnnoError::Database(format!("Search task failed: {}", e)))?
    }
}

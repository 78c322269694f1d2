//! Database module - SQLite document store for annotations.
//!
//! This module provides database connection management with WAL mode and
//! the schema used by the search layer.

mod schema;
mod ops;

pub use ops::*;

use rusqlite::Connection;
use std::path::Path;

use crate::{AnnoError, Result};

/// Database wrapper providing connection management.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Get a mutable reference to the underlying connection.
    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

/// Open a database connection with WAL mode and optimized PRAGMAs.
///
/// This function:
/// 1. Creates parent directory if it doesn't exist
/// 2. Opens connection with rusqlite
/// 3. Configures WAL mode for crash safety
/// 4. Initializes schema (creates tables if needed)
pub fn open_database(path: &Path) -> Result<Database> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(path).map_err(|e| AnnoError::Database(e.to_string()))?;

    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(|e| AnnoError::Database(format!("Failed to set journal_mode: {}", e)))?;

    // NORMAL synchronous is safe in WAL mode, faster than FULL
    conn.pragma_update(None, "synchronous", "NORMAL")
        .map_err(|e| AnnoError::Database(format!("Failed to set synchronous: {}", e)))?;

    conn.pragma_update(None, "busy_timeout", 5000i32)
        .map_err(|e| AnnoError::Database(format!("Failed to set busy_timeout: {}", e)))?;

    schema::init(&conn)?;

    Ok(Database { conn })
}

/// Open a private in-memory database with the schema initialized.
pub fn open_in_memory() -> Result<Database> {
    let conn = Connection::open_in_memory().map_err(|e| AnnoError::Database(e.to_string()))?;
    schema::init(&conn)?;
    Ok(Database { conn })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_database_creates_parent_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("subdir").join("annotations.db");

        let result = open_database(&db_path);
        assert!(result.is_ok());
        assert!(db_path.exists());
    }

    #[test]
    fn test_wal_mode_enabled() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db = open_database(&temp_dir.path().join("annotations.db")).unwrap();

        let journal_mode: String = db
            .conn()
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .unwrap();
        assert_eq!(journal_mode.to_lowercase(), "wal");
    }

    #[test]
    fn test_open_in_memory_has_schema() {
        let db = open_in_memory().unwrap();
        assert_eq!(count_annotations(db.conn()).unwrap(), 0);
    }
}

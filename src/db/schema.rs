//! Database schema module - table definitions.
//!
//! Annotations are stored as JSON documents; searches address their
//! attributes with SQLite JSON functions.

use rusqlite::Connection;
use crate::{AnnoError, Result};

/// Initialize the database schema.
///
/// Creates the annotations table and its indexes if they don't already
/// exist. This is called on every database open.
///
/// # Schema
///
/// ## annotations table
/// - `seq`: Insertion order, used to order search results
/// - `id`: Annotation IRI (unique)
/// - `doc`: The full record as JSON
///
/// ## Indexes
/// - `idx_annotations_creator`: Creator email lookups
/// - `idx_annotations_source`: Target source lookups
pub fn init(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS annotations (
            seq INTEGER PRIMARY KEY,
            id TEXT NOT NULL UNIQUE,
            doc TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_annotations_creator
            ON annotations(json_extract(doc, '$.creator.email'));

        CREATE INDEX IF NOT EXISTS idx_annotations_source
            ON annotations(json_extract(doc, '$.target.source'));
        "#,
    )
    .map_err(|e| AnnoError::Database(format!("Failed to initialize schema: {}", e)))?;

    Ok(())
}

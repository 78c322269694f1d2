//! Database operations module - bulk imports and filtered searches.

use rusqlite::{params, params_from_iter, Connection};

use crate::model::AnnotationRecord;
use crate::search::{build_sql_query, StorageFilter};
use crate::{AnnoError, Result};

/// Records per transaction for bulk imports.
pub const BATCH_SIZE: usize = 10_000;

/// Batch upsert annotations inside transactions.
///
/// Existing records with the same id are replaced in place and keep their
/// position in the result order.
///
/// # Returns
/// The number of records written.
pub fn import_annotations(conn: &mut Connection, records: &[AnnotationRecord]) -> Result<usize> {
    let mut total = 0;

    for chunk in records.chunks(BATCH_SIZE) {
        let tx = conn
            .transaction()
            .map_err(|e| AnnoError::Database(format!("Failed to start transaction: {}", e)))?;

        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO annotations (id, doc) VALUES (?1, ?2)
                     ON CONFLICT(id) DO UPDATE SET doc = excluded.doc",
                )
                .map_err(|e| AnnoError::Database(format!("Failed to prepare statement: {}", e)))?;

            for record in chunk {
                let doc = serde_json::to_string(record)?;
                stmt.execute(params![record.id, doc]).map_err(|e| {
                    AnnoError::Database(format!("Failed to import annotation: {}", e))
                })?;
                total += 1;
            }
        }

        tx.commit()
            .map_err(|e| AnnoError::Database(format!("Failed to commit transaction: {}", e)))?;
    }

    Ok(total)
}

/// Return every annotation matching `filter`, in insertion order.
pub fn find_annotations(
    conn: &Connection,
    filter: &StorageFilter,
) -> Result<Vec<AnnotationRecord>> {
    let (sql, params) = build_sql_query(filter);

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| AnnoError::Database(format!("Failed to prepare search: {}", e)))?;

    let rows = stmt
        .query_map(params_from_iter(params.iter()), |row| row.get::<_, String>(0))
        .map_err(|e| AnnoError::Database(format!("Failed to execute search: {}", e)))?;

    let mut results = Vec::new();
    for row in rows {
        let doc = row.map_err(|e| AnnoError::Database(format!("Failed to read row: {}", e)))?;
        results.push(serde_json::from_str(&doc)?);
    }

    Ok(results)
}

/// Get the total number of stored annotations.
pub fn count_annotations(conn: &Connection) -> Result<usize> {
    conn.query_row("SELECT COUNT(*) FROM annotations", [], |row| row.get::<_, i64>(0))
        .map(|count| count as usize)
        .map_err(|e| AnnoError::Database(format!("Failed to count annotations: {}", e)))
}

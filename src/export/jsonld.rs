//! JSON-LD export.
//!
//! Records are already Web Annotation JSON-LD; export wraps them in an
//! `AnnotationCollection` with a top-level `@context`. Object keys come out
//! sorted at every level, so equal inputs always produce identical bytes.

use serde::Deserialize;
use serde_json::json;

use super::Exported;
use crate::model::AnnotationRecord;

pub const CONTENT_TYPE: &str = "application/ld+json";

/// Web Annotation context document.
pub const ANNO_CONTEXT: &str = "http://www.w3.org/ns/anno.jsonld";

/// Render records as a JSON-LD annotation collection.
pub fn serialize(records: &[AnnotationRecord]) -> Exported {
    let collection = json!({
        "@context": ANNO_CONTEXT,
        "type": "AnnotationCollection",
        "total": records.len(),
        "items": records,
    });

    Exported {
        content_type: CONTENT_TYPE,
        body: format!("{:#}", collection),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    Collection { items: Vec<AnnotationRecord> },
    List(Vec<AnnotationRecord>),
}

/// Read records back from a collection document or a bare JSON array.
pub fn deserialize(body: &str) -> serde_json::Result<Vec<AnnotationRecord>> {
    Ok(match serde_json::from_str(body)? {
        Document::Collection { items } => items,
        Document::List(items) => items,
    })
}

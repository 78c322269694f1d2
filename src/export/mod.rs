//! Export module - rendering search results as linked data.
//!
//! Three independent serializers share one output shape, [`Exported`]:
//! - [`jsonld`]: Web Annotation JSON-LD collection
//! - [`rdf`]: RDF/XML
//! - [`turtle`]: Turtle
//!
//! The caller picks one with a [`Format`] selector (`jsonld|rdf|ttl`).

pub mod jsonld;
pub mod rdf;
pub mod triples;
pub mod turtle;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::AnnotationRecord;

/// A rendered export: body text plus its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exported {
    pub content_type: &'static str,
    pub body: String,
}

/// Export format selector.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    #[serde(rename = "jsonld")]
    JsonLd,
    #[serde(rename = "rdf")]
    Rdf,
    #[serde(rename = "ttl")]
    Turtle,
}

/// The format selector was not one of `jsonld`, `rdf`, `ttl`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown export format '{0}' (expected jsonld, rdf or ttl)")]
pub struct UnknownFormat(pub String);

impl Format {
    /// Selector string as used in requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::JsonLd => "jsonld",
            Format::Rdf => "rdf",
            Format::Turtle => "ttl",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Format::JsonLd => jsonld::CONTENT_TYPE,
            Format::Rdf => rdf::CONTENT_TYPE,
            Format::Turtle => turtle::CONTENT_TYPE,
        }
    }

    /// File extension for downloads.
    pub fn file_extension(&self) -> &'static str {
        match self {
            Format::JsonLd => "jsonld",
            Format::Rdf => "rdf",
            Format::Turtle => "ttl",
        }
    }

    /// Render `records` with this format's serializer.
    pub fn serialize(&self, records: &[AnnotationRecord]) -> Exported {
        match self {
            Format::JsonLd => jsonld::serialize(records),
            Format::Rdf => rdf::serialize(records),
            Format::Turtle => turtle::serialize(records),
        }
    }

    /// Parse an optional selector, defaulting to JSON-LD when absent or blank.
    pub fn from_selector(selector: Option<&str>) -> Result<Self, UnknownFormat> {
        match selector.map(str::trim) {
            None | Some("") => Ok(Format::default()),
            Some(s) => s.parse(),
        }
    }
}

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jsonld" => Ok(Format::JsonLd),
            "rdf" => Ok(Format::Rdf),
            "ttl" => Ok(Format::Turtle),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attachment filename for a download taken at `at`:
/// `annotations_20240301100000.ttl`.
pub fn download_filename(format: Format, at: DateTime<Utc>) -> String {
    format!(
        "annotations_{}.{}",
        at.format("%Y%m%d%H%M%S"),
        format.file_extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_selectors() {
        assert_eq!("jsonld".parse::<Format>(), Ok(Format::JsonLd));
        assert_eq!("rdf".parse::<Format>(), Ok(Format::Rdf));
        assert_eq!("ttl".parse::<Format>(), Ok(Format::Turtle));
        assert_eq!(
            "xml".parse::<Format>(),
            Err(UnknownFormat("xml".to_string()))
        );
    }

    #[test]
    fn test_selector_defaults_to_jsonld() {
        assert_eq!(Format::from_selector(None), Ok(Format::JsonLd));
        assert_eq!(Format::from_selector(Some("")), Ok(Format::JsonLd));
        assert_eq!(Format::from_selector(Some("ttl")), Ok(Format::Turtle));
        assert!(Format::from_selector(Some("csv")).is_err());
    }

    #[test]
    fn test_content_types() {
        assert_eq!(Format::JsonLd.content_type(), "application/ld+json");
        assert_eq!(Format::Rdf.content_type(), "application/rdf+xml");
        assert_eq!(Format::Turtle.content_type(), "text/turtle");
    }

    #[test]
    fn test_serialize_dispatch_matches_content_type() {
        let records = vec![AnnotationRecord::new("an1", "s1", "a@example.org")];
        for format in [Format::JsonLd, Format::Rdf, Format::Turtle] {
            assert_eq!(format.serialize(&records).content_type, format.content_type());
        }
    }

    #[test]
    fn test_serializers_do_not_mutate_input() {
        let records =
            vec![AnnotationRecord::new("an1", "s1", "a@example.org").with_tags(["b", "a"])];
        let before = records.clone();
        for format in [Format::JsonLd, Format::Rdf, Format::Turtle] {
            format.serialize(&records);
        }
        assert_eq!(records, before);
    }

    #[test]
    fn test_download_filename() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(download_filename(Format::Turtle, at), "annotations_20240301100000.ttl");
        assert_eq!(download_filename(Format::JsonLd, at), "annotations_20240301100000.jsonld");
    }

    #[test]
    fn test_selector_serde_names() {
        assert_eq!(serde_json::to_string(&Format::Turtle).unwrap(), r#""ttl""#);
        assert_eq!(serde_json::from_str::<Format>(r#""rdf""#).unwrap(), Format::Rdf);
    }
}

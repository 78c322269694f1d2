//! Turtle export.

use std::fmt::Write as FmtWrite;

use super::triples::{describe, Object, PREFIXES, RDF_TYPE};
use super::Exported;
use crate::model::AnnotationRecord;

pub const CONTENT_TYPE: &str = "text/turtle";

/// Render records as a Turtle document.
///
/// Every prefix is declared exactly once at the top; each record is one
/// subject block. Zero records give a document with only the prefixes.
/// IRIs arrive percent-encoded from [`describe`], so they are written as is.
pub fn serialize(records: &[AnnotationRecord]) -> Exported {
    let mut out = String::with_capacity(256 + records.len() * 512);

    let mut declared: Vec<&str> = Vec::with_capacity(PREFIXES.len());
    for &(prefix, ns) in PREFIXES {
        if declared.contains(&prefix) {
            continue;
        }
        declared.push(prefix);
        // writing to a String cannot fail
        let _ = writeln!(out, "@prefix {}: <{}> .", prefix, ns);
    }

    for record in records {
        let description = describe(record);
        let _ = write!(out, "\n<{}>", description.subject);

        let last = description.statements.len().saturating_sub(1);
        for (i, (predicate, object)) in description.statements.iter().enumerate() {
            let verb = if *predicate == RDF_TYPE {
                "a".to_string()
            } else {
                predicate.qname()
            };
            let object = match object {
                Object::Iri(iri) => format!("<{}>", iri),
                Object::Term(term) => term.qname(),
                Object::Literal(value) => format!("\"{}\"", escape_turtle_string(value)),
                Object::Typed(value, datatype) => {
                    format!("\"{}\"^^{}", escape_turtle_string(value), datatype.qname())
                }
            };
            let terminator = if i == last { " ." } else { " ;" };
            if i == 0 {
                let _ = writeln!(out, " {} {}{}", verb, object, terminator);
            } else {
                let _ = writeln!(out, "    {} {}{}", verb, object, terminator);
            }
        }
    }

    Exported {
        content_type: CONTENT_TYPE,
        body: out,
    }
}

/// Escape special characters for Turtle string literals.
///
/// Handles `\`, `"`, newline, carriage return and tab with short escapes;
/// other control characters use `\uXXXX`.
pub fn escape_turtle_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

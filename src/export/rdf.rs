//! RDF/XML export.

use std::fmt::Write as FmtWrite;

use super::triples::{describe, Object, PREFIXES, XSD_NS};
use super::Exported;
use crate::model::AnnotationRecord;

pub const CONTENT_TYPE: &str = "application/rdf+xml";

/// Render records as an RDF/XML document, one `rdf:Description` each.
///
/// Zero records give a valid document with an empty `rdf:RDF` element.
pub fn serialize(records: &[AnnotationRecord]) -> Exported {
    let mut out = String::with_capacity(256 + records.len() * 512);

    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rdf:RDF");
    for (prefix, ns) in PREFIXES.iter().filter(|(_, ns)| *ns != XSD_NS) {
        // writing to a String cannot fail
        let _ = write!(out, "\n    xmlns:{}=\"{}\"", prefix, xml_escape_attr(ns));
    }
    out.push_str(">\n");

    for record in records {
        let description = describe(record);
        let _ = writeln!(
            out,
            "  <rdf:Description rdf:about=\"{}\">",
            xml_escape_attr(&description.subject)
        );

        for (predicate, object) in &description.statements {
            let name = predicate.qname();
            let _ = match object {
                Object::Iri(iri) => {
                    writeln!(out, "    <{} rdf:resource=\"{}\"/>", name, xml_escape_attr(iri))
                }
                Object::Term(term) => {
                    writeln!(out, "    <{} rdf:resource=\"{}\"/>", name, term.iri())
                }
                Object::Literal(value) => {
                    writeln!(out, "    <{0}>{1}</{0}>", name, xml_escape(value))
                }
                Object::Typed(value, datatype) => writeln!(
                    out,
                    "    <{0} rdf:datatype=\"{1}\">{2}</{0}>",
                    name,
                    datatype.iri(),
                    xml_escape(value)
                ),
            };
        }

        out.push_str("  </rdf:Description>\n");
    }

    out.push_str("</rdf:RDF>\n");

    Exported {
        content_type: CONTENT_TYPE,
        body: out,
    }
}

/// Escape character data. Characters XML 1.0 forbids become U+FFFD.
fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\t' | '\n' | '\r' => out.push(ch),
            c if (c as u32) < 0x20 || c == '\u{FFFE}' || c == '\u{FFFF}' => out.push('\u{FFFD}'),
            c => out.push(c),
        }
    }
    out
}

/// Escape an attribute value (double-quoted).
fn xml_escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in xml_escape(s).chars() {
        match ch {
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            c => out.push(c),
        }
    }
    out
}

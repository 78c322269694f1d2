//! Triple model shared by the RDF/XML and Turtle writers.
//!
//! Each record becomes one subject (its `id`) with predicates in a fixed
//! order, so both formats describe exactly the same graph.

use crate::model::AnnotationRecord;

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const OA_NS: &str = "http://www.w3.org/ns/oa#";
pub const DCTERMS_NS: &str = "http://purl.org/dc/terms/";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

/// Prefix table, in declaration order.
pub const PREFIXES: &[(&str, &str)] = &[
    ("rdf", RDF_NS),
    ("oa", OA_NS),
    ("dcterms", DCTERMS_NS),
    ("xsd", XSD_NS),
];

/// A vocabulary term written as `prefix:local`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Term {
    pub prefix: &'static str,
    pub local: &'static str,
}

impl Term {
    const fn new(prefix: &'static str, local: &'static str) -> Self {
        Term { prefix, local }
    }

    pub fn namespace(&self) -> &'static str {
        PREFIXES
            .iter()
            .find(|(prefix, _)| *prefix == self.prefix)
            .map(|(_, ns)| *ns)
            .unwrap_or_default()
    }

    /// Full IRI of the term.
    pub fn iri(&self) -> String {
        format!("{}{}", self.namespace(), self.local)
    }

    /// `prefix:local` form.
    pub fn qname(&self) -> String {
        format!("{}:{}", self.prefix, self.local)
    }
}

pub const RDF_TYPE: Term = Term::new("rdf", "type");
pub const OA_ANNOTATION: Term = Term::new("oa", "Annotation");
pub const OA_HAS_TARGET: Term = Term::new("oa", "hasTarget");
pub const OA_BODY_VALUE: Term = Term::new("oa", "bodyValue");
pub const OA_MOTIVATED_BY: Term = Term::new("oa", "motivatedBy");
pub const DCTERMS_SUBJECT: Term = Term::new("dcterms", "subject");
pub const DCTERMS_CREATOR: Term = Term::new("dcterms", "creator");
pub const DCTERMS_CREATED: Term = Term::new("dcterms", "created");
pub const DCTERMS_MODIFIED: Term = Term::new("dcterms", "modified");
pub const XSD_DATE_TIME: Term = Term::new("xsd", "dateTime");

/// Object position of a triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    /// Absolute or relative IRI taken from record data
    Iri(String),
    /// Vocabulary term
    Term(Term),
    /// Plain string literal
    Literal(String),
    /// Literal with a datatype
    Typed(String, Term),
}

/// One subject with its predicate/object pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    pub subject: String,
    pub statements: Vec<(Term, Object)>,
}

fn has_scheme(value: &str) -> bool {
    let Some((scheme, _)) = value.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Whether `value` starts with an IRI scheme (`https:`, `urn:`, `mailto:` ...)
/// and has no whitespace.
pub fn is_absolute_iri(value: &str) -> bool {
    has_scheme(value)
        && value.split_once(':').is_some_and(|(_, rest)| !rest.is_empty())
        && !value.chars().any(char::is_whitespace)
}

/// RFC 3987 `ucschar`: non-ASCII characters allowed anywhere in an IRI.
fn is_ucschar(c: char) -> bool {
    let c = c as u32;
    matches!(c, 0xA0..=0xD7FF | 0xF900..=0xFDCF | 0xFDF0..=0xFFEF)
        || ((0x10000..=0xDFFFD).contains(&c) && (c & 0xFFFE) != 0xFFFE)
        || (0xE1000..=0xEFFFD).contains(&c)
}

/// Percent-encode everything that may not appear in an IRI reference.
///
/// Spaces, control characters and ``<>"{}|\^` `` become `%XX` escapes of
/// their UTF-8 bytes, as do square brackets, a second `#` and a `%` that
/// does not start an escape. Without a scheme, colons in the first path
/// segment are encoded too so the value stays a relative reference.
pub fn encode_iri(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len());
    let mut in_first_segment = !has_scheme(value);
    let mut in_fragment = false;

    for (i, &c) in chars.iter().enumerate() {
        let keep = match c {
            '%' => chars
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(char::is_ascii_hexdigit)),
            '#' => !in_fragment,
            ':' => !in_first_segment,
            '[' | ']' => false,
            c if c.is_ascii_alphanumeric() => true,
            '-' | '.' | '_' | '~' | '/' | '?' | '@' | '!' | '$' | '&' | '\'' | '(' | ')' | '*'
            | '+' | ',' | ';' | '=' => true,
            c => is_ucschar(c),
        };

        if matches!(c, '/' | '?' | '#') {
            in_first_segment = false;
        }
        if c == '#' {
            in_fragment = true;
        }

        if keep {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{:02X}", byte));
            }
        }
    }
    out
}

fn iri_or_literal(value: &str) -> Object {
    if is_absolute_iri(value) {
        Object::Iri(encode_iri(value))
    } else {
        Object::Literal(value.to_string())
    }
}

/// Describe one record.
///
/// Predicate order: type, target, body value, tags (sorted), creator,
/// motivation, created, modified.
pub fn describe(record: &AnnotationRecord) -> Description {
    let mut statements = vec![(RDF_TYPE, Object::Term(OA_ANNOTATION))];

    statements.push((OA_HAS_TARGET, iri_or_literal(&record.target.source)));

    if let Some(value) = &record.body.value {
        statements.push((OA_BODY_VALUE, Object::Literal(value.clone())));
    }

    let mut tags: Vec<&str> = record.body.tags.iter().map(String::as_str).collect();
    tags.sort_unstable();
    tags.dedup();
    for tag in tags {
        statements.push((DCTERMS_SUBJECT, Object::Literal(tag.to_string())));
    }

    let creator = record.creator.id.as_ref().or(record.creator.email.as_ref());
    if let Some(creator) = creator {
        statements.push((DCTERMS_CREATOR, iri_or_literal(creator)));
    }

    if let Some(motivation) = &record.motivation {
        let is_name =
            !motivation.is_empty() && motivation.chars().all(|c| c.is_ascii_alphanumeric());
        let object = if is_name {
            Object::Iri(format!("{}{}", OA_NS, motivation))
        } else {
            iri_or_literal(motivation)
        };
        statements.push((OA_MOTIVATED_BY, object));
    }

    if let Some(created) = &record.created {
        statements.push((DCTERMS_CREATED, Object::Typed(created.clone(), XSD_DATE_TIME)));
    }
    if let Some(modified) = &record.modified {
        statements.push((DCTERMS_MODIFIED, Object::Typed(modified.clone(), XSD_DATE_TIME)));
    }

    Description {
        subject: encode_iri(&record.id),
        statements,
    }
}

//! Store filter types.
//!
//! A [`StorageFilter`] is the store-side form of a search expression: the
//! same boolean shape, with every leaf resolved to an explicit document path
//! and match operator.

/// Searchable document paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldPath {
    /// Body tag list: `tag:climate` or a bare `climate`
    Tags,
    /// Creator email: `creator:jane@example.org`
    CreatorEmail,
    /// Body text: `body:"some text"`
    BodyValue,
    /// Target source: `target:https://example.org/doc`
    TargetSource,
    /// Motivation: `motivation:tagging`
    Motivation,
    /// Annotation IRI: `id:https://example.org/annotations/1`
    Id,
}

/// Field names accepted in `name:value` terms, in documentation order.
pub const FIELD_NAMES: &[&str] = &["tag", "creator", "body", "target", "motivation", "id"];

impl FieldPath {
    /// Resolve a field name from a search expression (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "tag" => Some(FieldPath::Tags),
            "creator" => Some(FieldPath::CreatorEmail),
            "body" => Some(FieldPath::BodyValue),
            "target" => Some(FieldPath::TargetSource),
            "motivation" => Some(FieldPath::Motivation),
            "id" => Some(FieldPath::Id),
            _ => None,
        }
    }

    /// JSON path of the attribute inside a stored record.
    pub fn json_path(&self) -> &'static str {
        match self {
            FieldPath::Tags => "$.body.tags",
            FieldPath::CreatorEmail => "$.creator.email",
            FieldPath::BodyValue => "$.body.value",
            FieldPath::TargetSource => "$.target.source",
            FieldPath::Motivation => "$.motivation",
            FieldPath::Id => "$.id",
        }
    }

    /// Match operator used for this path.
    pub fn match_op(&self) -> MatchOp {
        match self {
            FieldPath::Tags => MatchOp::Contains,
            _ => MatchOp::Equals,
        }
    }
}

/// How a condition compares the stored attribute with its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOp {
    /// Scalar attribute equals the value
    Equals,
    /// Array attribute has an element equal to the value
    Contains,
}

/// A single store condition: path, operator, value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub path: FieldPath,
    pub op: MatchOp,
    pub value: String,
}

impl Condition {
    /// Condition on `path` using the path's own match operator.
    pub fn on(path: FieldPath, value: &str) -> Self {
        Condition {
            path,
            op: path.match_op(),
            value: value.to_string(),
        }
    }
}

/// Predicate tree understood by the annotation store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageFilter {
    Condition(Condition),
    And(Box<StorageFilter>, Box<StorageFilter>),
    Or(Box<StorageFilter>, Box<StorageFilter>),
    Not(Box<StorageFilter>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_documented_name_resolves() {
        for name in FIELD_NAMES {
            assert!(FieldPath::from_name(name).is_some(), "{name} should resolve");
        }
    }

    #[test]
    fn test_names_are_case_insensitive() {
        assert_eq!(FieldPath::from_name("Creator"), Some(FieldPath::CreatorEmail));
        assert_eq!(FieldPath::from_name("TAG"), Some(FieldPath::Tags));
        assert_eq!(FieldPath::from_name("bogus"), None);
    }

    #[test]
    fn test_tags_use_contains() {
        assert_eq!(FieldPath::Tags.match_op(), MatchOp::Contains);
        assert_eq!(FieldPath::CreatorEmail.match_op(), MatchOp::Equals);
        assert_eq!(Condition::on(FieldPath::Tags, "x").op, MatchOp::Contains);
    }
}

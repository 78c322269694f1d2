//! Annotation record types.
//!
//! Records follow the W3C Web Annotation shape the store keeps them in.
//! The search and export layers only ever read them.

use serde::{Deserialize, Serialize};

/// A stored annotation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    /// JSON-LD context carried by the record itself, if any
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
    /// Annotation IRI
    pub id: String,
    /// Record type, normally "Annotation"
    #[serde(rename = "type", default = "default_annotation_type")]
    pub kind: String,
    /// What the annotation is about
    pub target: Target,
    /// Textual content and tags
    pub body: Body,
    /// Who wrote the annotation
    pub creator: Creator,
    /// Motivation, e.g. "tagging" or "commenting"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motivation: Option<String>,
    /// Creation time (xsd:dateTime)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Last modification time (xsd:dateTime)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
}

fn default_annotation_type() -> String {
    "Annotation".to_string()
}

/// The annotated resource.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Target {
    /// Fragment or specific-resource IRI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Source document reference
    pub source: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Annotation body: free text and/or a tag list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Body {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Free-text content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Keyword tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

/// Annotation author.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Creator {
    /// Profile IRI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl AnnotationRecord {
    /// Create a minimal record for `source` written by `creator_email`.
    pub fn new(id: &str, source: &str, creator_email: &str) -> Self {
        Self {
            context: None,
            id: id.to_string(),
            kind: default_annotation_type(),
            target: Target {
                source: source.to_string(),
                ..Target::default()
            },
            body: Body::default(),
            creator: Creator {
                email: Some(creator_email.to_string()),
                ..Creator::default()
            },
            motivation: None,
            created: None,
            modified: None,
        }
    }

    /// Replace the body tag list.
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.body.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the free-text body value.
    pub fn with_body_value(mut self, value: &str) -> Self {
        self.body.value = Some(value.to_string());
        self
    }
}

//! Translation of search trees into store filters.

use thiserror::Error;

use super::filters::{Condition, FieldPath, StorageFilter, FIELD_NAMES};
use super::sexpr::Sexpr;

/// A `name:value` term named a field the store cannot search.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown search field '{field}' (expected one of: {})", FIELD_NAMES.join(", "))]
pub struct TranslationError {
    pub field: String,
}

/// Convert a parsed expression into a [`StorageFilter`].
///
/// The mapping is structural: tags and fields become conditions, boolean
/// nodes map one-to-one. Tree depth is bounded by the parser, so the
/// recursion here is bounded too.
pub fn translate(tree: &Sexpr) -> Result<StorageFilter, TranslationError> {
    Ok(match tree {
        Sexpr::Tag(term) => StorageFilter::Condition(Condition::on(FieldPath::Tags, term)),
        Sexpr::Field { name, value } => {
            let path = FieldPath::from_name(name).ok_or_else(|| TranslationError {
                field: name.clone(),
            })?;
            StorageFilter::Condition(Condition::on(path, value))
        }
        Sexpr::And(left, right) => {
            StorageFilter::And(Box::new(translate(left)?), Box::new(translate(right)?))
        }
        Sexpr::Or(left, right) => {
            StorageFilter::Or(Box::new(translate(left)?), Box::new(translate(right)?))
        }
        Sexpr::Not(inner) => StorageFilter::Not(Box::new(translate(inner)?)),
    })
}

//! Search service - parse, translate, execute.
//!
//! Every search is a self-contained request: the filter is built fresh, the
//! store is queried once, and nothing is cached or retried here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::filters::StorageFilter;
use super::parser::{parse, SyntaxError};
use super::sexpr::Sexpr;
use super::translate::{translate, TranslationError};
use crate::export::{Exported, Format};
use crate::model::{AnnotationRecord, Target};
use crate::store::AnnotationStore;

/// Why a search did not produce results.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// No expression was supplied
    #[error("expression required")]
    EmptyExpression,

    /// The expression is not valid search syntax
    #[error("expression syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    /// The expression names a field the store cannot search
    #[error(transparent)]
    Translation(#[from] TranslationError),

    /// The store failed; details are logged, not returned
    #[error("annotation store unavailable")]
    Storage,
}

/// Error discriminator reported to callers.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    EmptyExpression,
    SyntaxError,
    TranslationError,
    StorageError,
    /// Unknown export format selector, rejected before serialization
    InvalidFormat,
}

impl SearchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SearchError::EmptyExpression => ErrorKind::EmptyExpression,
            SearchError::Syntax(_) => ErrorKind::SyntaxError,
            SearchError::Translation(_) => ErrorKind::TranslationError,
            SearchError::Storage => ErrorKind::StorageError,
        }
    }

    /// Character offset of a syntax error.
    pub fn offset(&self) -> Option<usize> {
        match self {
            SearchError::Syntax(e) => Some(e.offset),
            _ => None,
        }
    }

    /// Offending field of a translation error.
    pub fn field(&self) -> Option<&str> {
        match self {
            SearchError::Translation(e) => Some(&e.field),
            _ => None,
        }
    }
}

/// Check, parse and translate a raw expression without touching the store.
pub fn compile(raw: &str) -> Result<StorageFilter, SearchError> {
    if raw.trim().is_empty() {
        return Err(SearchError::EmptyExpression);
    }

    let tree = parse(raw)?;
    tracing::debug!(expression = raw, "parsed search expression: {}", tree);

    Ok(translate(&tree)?)
}

/// Runs search expressions against an [`AnnotationStore`].
pub struct SearchService<S> {
    store: S,
}

impl<S: AnnotationStore> SearchService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Return all annotations matching `raw`, in store order.
    ///
    /// An empty result is a success.
    pub async fn search(&self, raw: &str) -> Result<Vec<AnnotationRecord>, SearchError> {
        let filter = compile(raw)?;
        self.execute(&filter).await
    }

    /// Search and render the results in `format`.
    pub async fn export(&self, raw: &str, format: Format) -> Result<Exported, SearchError> {
        let records = self.search(raw).await?;
        Ok(format.serialize(&records))
    }

    /// Targets of every annotation tagged with `tag`.
    pub async fn targets_for_tag(&self, tag: &str) -> Result<Vec<Target>, SearchError> {
        if tag.trim().is_empty() {
            return Err(SearchError::EmptyExpression);
        }

        let filter = translate(&Sexpr::tag(tag))?;
        let records = self.execute(&filter).await?;
        Ok(records.into_iter().map(|r| r.target).collect())
    }

    async fn execute(&self, filter: &StorageFilter) -> Result<Vec<AnnotationRecord>, SearchError> {
        match self.store.find(filter).await {
            Ok(records) => {
                tracing::debug!("search matched {} annotations", records.len());
                Ok(records)
            }
            Err(e) => {
                tracing::error!(error = %e, "annotation store query failed");
                Err(SearchError::Storage)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::MAX_TERMS;
    use crate::store::SqliteStore;
    use crate::AnnoError;

    /// Store that always fails, for the storage error path.
    struct BrokenStore;

    impl AnnotationStore for BrokenStore {
        async fn find(&self, _filter: &StorageFilter) -> crate::Result<Vec<AnnotationRecord>> {
            Err(AnnoError::Database("disk I/O error at page 42".to_string()))
        }
    }

    fn climate_store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .import(&[
                AnnotationRecord::new("an1", "https://example.org/d/1", "jane@example.org")
                    .with_tags(["climate"]),
                AnnotationRecord::new("an2", "https://example.org/d/2", "bob@example.org")
                    .with_tags(["climate"]),
                AnnotationRecord::new("an3", "https://example.org/d/3", "bob@example.org")
                    .with_tags(["ocean"]),
            ])
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_end_to_end_example() {
        let service = SearchService::new(climate_store());
        let found = service
            .search(r#"tag:climate AND NOT creator:"jane@example.org""#)
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "an2");
    }

    #[tokio::test]
    async fn test_empty_result_is_success() {
        let service = SearchService::new(climate_store());
        assert_eq!(service.search("drought").await.unwrap(), vec![]);
    }

    #[tokio::test]
    async fn test_empty_expression_checked_before_parsing() {
        let service = SearchService::new(climate_store());
        assert_eq!(service.search("").await, Err(SearchError::EmptyExpression));
        assert_eq!(service.search("  \t").await, Err(SearchError::EmptyExpression));
    }

    #[tokio::test]
    async fn test_syntax_error_passed_through() {
        let service = SearchService::new(climate_store());
        let err = service.search("climate AND").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SyntaxError);
        assert_eq!(err.offset(), Some(11));
        assert!(err.to_string().contains("expected term after AND"));
    }

    #[tokio::test]
    async fn test_term_limit_is_syntax_error_not_storage() {
        let service = SearchService::new(climate_store());
        let expression = |n: usize| {
            let terms: Vec<String> = (0..n).map(|i| format!("tag:t{i}")).collect();
            terms
                .chunks(100)
                .map(|group| format!("({})", group.join(" OR ")))
                .collect::<Vec<_>>()
                .join(" OR ")
        };

        assert_eq!(service.search(&expression(MAX_TERMS)).await.unwrap(), vec![]);

        let input = expression(MAX_TERMS + 1);
        let err = service.search(&input).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SyntaxError);
        assert_eq!(err.offset(), input.find("tag:t1024"));
    }

    #[tokio::test]
    async fn test_translation_error_names_field() {
        let service = SearchService::new(climate_store());
        let err = service.search("bogus:1").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TranslationError);
        assert_eq!(err.field(), Some("bogus"));
        assert_eq!(err.offset(), None);
    }

    #[tokio::test]
    async fn test_storage_error_is_opaque() {
        let service = SearchService::new(BrokenStore);
        let err = service.search("climate").await.unwrap_err();
        assert_eq!(err, SearchError::Storage);
        assert_eq!(err.kind(), ErrorKind::StorageError);
        assert!(!err.to_string().contains("page 42"));
    }

    #[tokio::test]
    async fn test_export_renders_selected_format() {
        let service = SearchService::new(climate_store());
        let exported = service.export("ocean", Format::Turtle).await.unwrap();
        assert_eq!(exported.content_type, "text/turtle");
        assert!(exported.body.contains("<an3>"));
        assert!(!exported.body.contains("<an1>"));
    }

    #[tokio::test]
    async fn test_targets_for_tag() {
        let service = SearchService::new(climate_store());
        let targets = service.targets_for_tag("climate").await.unwrap();
        let sources: Vec<&str> = targets.iter().map(|t| t.source.as_str()).collect();
        assert_eq!(sources, vec!["https://example.org/d/1", "https://example.org/d/2"]);

        assert_eq!(
            service.targets_for_tag(" ").await,
            Err(SearchError::EmptyExpression)
        );
    }

    #[test]
    fn test_compile_is_pure() {
        assert_eq!(compile("a OR b"), compile("a OR b"));
        assert_eq!(compile(""), Err(SearchError::EmptyExpression));
    }

    #[test]
    fn test_error_kind_serializes_as_name() {
        assert_eq!(
            serde_json::to_string(&ErrorKind::SyntaxError).unwrap(),
            r#""SyntaxError""#
        );
    }
}

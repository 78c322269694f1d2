//! annosearch - search and export for an annotation store.
//!
//! This library provides the annotation search subsystem: a boolean query
//! language over annotation metadata, its translation into a store filter,
//! a SQLite-backed document store, and JSON-LD / RDF/XML / Turtle export.

pub mod db;
pub mod export;
pub mod ipc;
pub mod model;
pub mod search;
pub mod service;
pub mod store;

pub use model::{AnnotationRecord, Body, Creator, Target};

use thiserror::Error;

/// Infrastructure error types (store, IPC, configuration).
///
/// Search-language failures are reported separately through
/// [`search::SearchError`] so callers can tell them apart.
#[derive(Error, Debug)]
pub enum AnnoError {
    /// Database errors (SQLite operations)
    #[error("Database error: {0}")]
    Database(String),

    /// IPC errors (framing, connection handling)
    #[error("IPC error: {0}")]
    Ipc(String),

    /// Configuration errors (config file parsing)
    #[error("Config error: {0}")]
    Config(String),

    /// Record (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors (file/network operations)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using AnnoError
pub type Result<T> = std::result::Result<T, AnnoError>;

//! Search module - expression parsing, filter translation, and SQL generation.
//!
//! This module implements the annotation query language, enabling searches
//! like `tag:climate AND NOT creator:"jane@example.org"`.

pub mod filters;
pub mod lexer;
pub mod parser;
pub mod query;
pub mod service;
pub mod sexpr;
pub mod translate;

pub use filters::*;
pub use parser::{parse, ParseResult, SyntaxError, MAX_DEPTH, MAX_TERMS};
pub use query::build_sql_query;
pub use service::{compile, ErrorKind, SearchError, SearchService};
pub use sexpr::Sexpr;
pub use translate::{translate, TranslationError};

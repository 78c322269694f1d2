//! IPC protocol types for search and export requests.
//!
//! Uses length-prefixed JSON messages for reliable framing over a stream.
//! Format: 4-byte little-endian length prefix followed by JSON bytes.

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::model::Target;
use crate::search::{ErrorKind, SearchError};
use crate::{AnnoError, Result};

/// Default loopback address of the annosearch service.
pub const DEFAULT_ADDR: &str = "127.0.0.1:7878";

/// Reject messages over 16MB.
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Request from a client to the service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Run a search expression and export the results
    Search(SearchRequest),
    /// List the targets of annotations carrying a tag
    Targets(TargetsRequest),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Search expression, e.g. `tag:climate AND NOT creator:jane@example.org`
    pub expression: String,
    /// Export format selector (`jsonld`, `rdf`, `ttl`); JSON-LD when absent
    #[serde(default)]
    pub format: Option<String>,
    /// Ask for an attachment filename in the response
    #[serde(default)]
    pub download: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TargetsRequest {
    pub tag: String,
}

/// Response from the service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Export(ExportResponse),
    Targets(TargetsResponse),
    Error(ErrorResponse),
}

/// Rendered search results.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExportResponse {
    pub content_type: String,
    pub body: String,
    /// Number of matching annotations
    pub count: usize,
    /// Attachment filename, present when a download was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Time taken to execute the search in milliseconds
    pub search_time_ms: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TargetsResponse {
    pub targets: Vec<Target>,
}

/// Structured error envelope.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub message: String,
    /// Character offset, for syntax errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    /// Offending field name, for translation errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl From<&SearchError> for ErrorResponse {
    fn from(error: &SearchError) -> Self {
        let message = match error {
            SearchError::Syntax(e) => e.message.clone(),
            other => other.to_string(),
        };
        ErrorResponse {
            kind: error.kind(),
            message,
            offset: error.offset(),
            field: error.field().map(str::to_string),
        }
    }
}

/// Read a length-prefixed JSON message from an async reader.
///
/// Message format:
/// - 4 bytes: little-endian u32 message length
/// - N bytes: JSON-encoded message
///
/// # Errors
/// Returns error if read fails, message is too large, or JSON parsing fails.
pub async fn read_message<T, R>(reader: &mut R) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    R: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await.map_err(|e| {
        AnnoError::Ipc(format!("Failed to read message length: {}", e))
    })?;

    let len = u32::from_le_bytes(len_buf) as usize;

    if len > MAX_MESSAGE_SIZE {
        return Err(AnnoError::Ipc(format!(
            "Message too large: {} bytes (max {})",
            len, MAX_MESSAGE_SIZE
        )));
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await.map_err(|e| {
        AnnoError::Ipc(format!("Failed to read message body: {}", e))
    })?;

    serde_json::from_slice(&buf).map_err(|e| {
        AnnoError::Ipc(format!("Failed to parse message: {}", e))
    })
}

/// Encode a message as JSON, without the length prefix.
pub fn encode_message<T: Serialize>(message: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(message)
        .map_err(|e| AnnoError::Ipc(format!("Failed to serialize message: {}", e)))
}

/// Write an encoded message behind its length prefix.
///
/// # Errors
/// Returns error if the write fails or the frame is over
/// [`MAX_MESSAGE_SIZE`]. Nothing is written in the latter case.
pub async fn write_frame<W>(writer: &mut W, json: &[u8]) -> Result<()>
where
    W: AsyncWriteExt + Unpin,
{
    if json.len() > MAX_MESSAGE_SIZE {
        return Err(AnnoError::Ipc(format!(
            "Message too large: {} bytes (max {})",
            json.len(),
            MAX_MESSAGE_SIZE
        )));
    }

    let len = json.len() as u32;
    writer.write_all(&len.to_le_bytes()).await.map_err(|e| {
        AnnoError::Ipc(format!("Failed to write message length: {}", e))
    })?;

    writer.write_all(json).await.map_err(|e| {
        AnnoError::Ipc(format!("Failed to write message body: {}", e))
    })?;

    writer.flush().await.map_err(|e| {
        AnnoError::Ipc(format!("Failed to flush message: {}", e))
    })?;

    Ok(())
}

/// Write a length-prefixed JSON message to an async writer.
///
/// # Errors
/// Returns error if serialization or write fails, or the message is too large.
pub async fn write_message<T, W>(writer: &mut W, message: &T) -> Result<()>
where
    T: Serialize,
    W: AsyncWriteExt + Unpin,
{
    let json = encode_message(message)?;
    write_frame(writer, &json).await
}

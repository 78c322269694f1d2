//! TCP client for the annosearch service.
//!
//! The client is stateless - it connects per request.

use tokio::net::TcpStream;

use crate::ipc::protocol::{
    read_message, write_message, Request, Response, SearchRequest, TargetsRequest, DEFAULT_ADDR,
};
use crate::{AnnoError, Result};

/// IPC client for sending requests to the annosearch service.
pub struct IpcClient {
    addr: String,
}

impl IpcClient {
    /// Create a client for the service listening on `addr`.
    ///
    /// The client doesn't establish a connection until a request is sent.
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Run a search expression and export the results in `format`.
    ///
    /// Service-side failures come back as [`Response::Error`]; only
    /// connection and framing problems are returned as `Err`.
    pub async fn search(
        &self,
        expression: &str,
        format: Option<&str>,
        download: bool,
    ) -> Result<Response> {
        self.send(&Request::Search(SearchRequest {
            expression: expression.to_string(),
            format: format.map(str::to_string),
            download,
        }))
        .await
    }

    /// List the targets of annotations tagged with `tag`.
    pub async fn targets(&self, tag: &str) -> Result<Response> {
        self.send(&Request::Targets(TargetsRequest { tag: tag.to_string() }))
            .await
    }

    async fn send(&self, request: &Request) -> Result<Response> {
        let mut stream = TcpStream::connect(&self.addr).await.map_err(|e| {
            AnnoError::Ipc(format!(
                "Failed to connect to annosearch service at {}: {}. Is the service running?",
                self.addr, e
            ))
        })?;

        write_message(&mut stream, request).await?;
        read_message(&mut stream).await
    }
}

impl Default for IpcClient {
    fn default() -> Self {
        Self::new(DEFAULT_ADDR)
    }
}

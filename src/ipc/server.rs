//! TCP loopback server for the annosearch service.
//!
//! Accepts one request per connection, runs it through the
//! [`SearchService`] and writes back a single response. Connections are
//! handled concurrently; each runs on its own task.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

use crate::export::{download_filename, Format};
use crate::ipc::protocol::{
    encode_message, read_message, write_frame, ErrorResponse, ExportResponse, Request,
    Response, SearchRequest, TargetsResponse, MAX_MESSAGE_SIZE,
};
use crate::search::{ErrorKind, SearchService};
use crate::store::AnnotationStore;
use crate::Result;

/// IPC server answering search requests from local clients.
pub struct IpcServer<S> {
    service: Arc<SearchService<S>>,
}

impl<S> IpcServer<S>
where
    S: AnnotationStore + 'static,
{
    pub fn new(service: Arc<SearchService<S>>) -> Self {
        Self { service }
    }

    /// Accept client connections on `listener` until shutdown.
    ///
    /// # Errors
    /// Individual client errors are logged but don't stop the server.
    pub async fn run(
        &self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<()> {
        match listener.local_addr() {
            Ok(addr) => tracing::info!("Starting IPC server on {}", addr),
            Err(e) => tracing::warn!("Starting IPC server on unknown address: {}", e),
        }

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("IPC server shutting down");
                    return Ok(());
                }
                result = listener.accept() => {
                    match result {
                        Ok((stream, peer)) => {
                            tracing::debug!("Client connected from {}", peer);
                            let service = self.service.clone();
                            tokio::spawn(async move {
                                if let Err(e) = handle_client(stream, service).await {
                                    tracing::warn!("Client handler error: {}", e);
                                }
                            });
                        }
                        Err(e) => {
                            tracing::warn!("Failed to accept client connection: {}", e);
                        }
                    }
                }
            }
        }
    }
}

async fn handle_client<S: AnnotationStore>(
    mut stream: TcpStream,
    service: Arc<SearchService<S>>,
) -> Result<()> {
    let request: Request = read_message(&mut stream).await?;
    let response = handle_request(&service, request).await;

    let mut frame = encode_message(&response)?;
    if frame.len() > MAX_MESSAGE_SIZE {
        tracing::warn!(
            "Response of {} bytes exceeds the {} byte frame limit",
            frame.len(),
            MAX_MESSAGE_SIZE
        );
        frame = encode_message(&Response::Error(ErrorResponse {
            kind: ErrorKind::StorageError,
            message: format!(
                "result too large ({} bytes, limit {}); narrow the search expression",
                frame.len(),
                MAX_MESSAGE_SIZE
            ),
            offset: None,
            field: None,
        }))?;
    }
    write_frame(&mut stream, &frame).await
}

/// Answer one request. Failures become [`Response::Error`] envelopes.
pub async fn handle_request<S: AnnotationStore>(
    service: &SearchService<S>,
    request: Request,
) -> Response {
    match request {
        Request::Search(search) => handle_search(service, search).await,
        Request::Targets(targets) => match service.targets_for_tag(&targets.tag).await {
            Ok(targets) => Response::Targets(TargetsResponse { targets }),
            Err(e) => Response::Error(ErrorResponse::from(&e)),
        },
    }
}

async fn handle_search<S: AnnotationStore>(
    service: &SearchService<S>,
    request: SearchRequest,
) -> Response {
    tracing::debug!(
        "Search request: expression='{}', format={:?}, download={}",
        request.expression,
        request.format,
        request.download
    );

    // Checked up front so a bad selector never costs a store query.
    let format = match Format::from_selector(request.format.as_deref()) {
        Ok(format) => format,
        Err(e) => {
            return Response::Error(ErrorResponse {
                kind: ErrorKind::InvalidFormat,
                message: e.to_string(),
                offset: None,
                field: None,
            })
        }
    };

    let start = Instant::now();

    let records = match service.search(&request.expression).await {
        Ok(records) => records,
        Err(e) => {
            tracing::debug!("Search rejected: {}", e);
            return Response::Error(ErrorResponse::from(&e));
        }
    };

    let exported = format.serialize(&records);
    let search_time_ms = start.elapsed().as_millis() as u64;

    tracing::debug!(
        "Search completed: {} results as {} in {}ms",
        records.len(),
        format,
        search_time_ms
    );

    Response::Export(ExportResponse {
        content_type: exported.content_type.to_string(),
        body: exported.body,
        count: records.len(),
        filename: request.download.then(|| download_filename(format, Utc::now())),
        search_time_ms,
    })
}

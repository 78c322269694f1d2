//! IPC module for communication between clients and the annosearch service.
//!
//! The service listens on a loopback TCP socket; clients connect once per
//! request and exchange one length-prefixed JSON message each way.

pub mod client;
pub mod protocol;
pub mod server;

pub use client::IpcClient;
pub use protocol::*;
pub use server::{handle_request, IpcServer};

//! Resumable upload client for the tus protocol.
//!
//! [`TusClient`] drives the upload state machine: it creates upload
//! resources, discovers the server offset, streams the source in
//! checksummed chunks and, when the peer resets the connection mid-chunk,
//! re-queries the offset and carries on from there.
//!
//! HTTP is consumed through the [`Transport`] trait. [`HttpTransport`] is
//! the `reqwest`-backed implementation; tests plug in scripted mocks.
//!
//! # Flow
//!
//! 1. **Create**: `POST` with `Upload-Length` and `Upload-Metadata`
//! 2. **Offset**: `HEAD` for the server's `Upload-Offset`
//! 3. **Transfer**: `PATCH` one chunk at a time until the offset reaches the length
//! 4. **Lifecycle**: `OPTIONS`, `HEAD`, `DELETE` and `GET` helpers

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;

// Re-export primary types for convenience.
pub use client::TusClient;
pub use config::ClientConfig;
pub use error::TusError;
pub use http::HttpTransport;
pub use reqwest::{Method, StatusCode, Url};
pub use transport::{HttpRequest, HttpResponse, TransferProgress, Transport, TransportError};
pub use tus_protocol::{Metadata, ServerInfo, UploadProgress};
pub use tus_transfer::ProgressCallback;

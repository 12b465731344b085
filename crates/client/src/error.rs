//! Client error types.

use reqwest::StatusCode;
use tus_transfer::TransferError;

use crate::transport::TransportError;

/// Errors produced by [`TusClient`](crate::TusClient) operations.
///
/// Protocol failures carry the status and raw response body. Missing
/// headers are distinct from rejected requests so callers can branch.
#[derive(Debug, thiserror::Error)]
pub enum TusError {
    #[error("creation failed with status {status}: {body}")]
    CreationFailed { status: StatusCode, body: String },

    #[error("creation response has no Location header")]
    LocationMissing,

    #[error("invalid Location header: {0}")]
    LocationInvalid(String),

    #[error("chunk upload failed with status {status}: {body}")]
    UploadFailed { status: StatusCode, body: String },

    #[error("offset query failed with status {status}: {body}")]
    OffsetQueryFailed { status: StatusCode, body: String },

    #[error("offset response has no Upload-Offset header")]
    OffsetMissing,

    #[error("invalid Upload-Offset header: {0}")]
    OffsetInvalid(String),

    #[error("server offset {offset} exceeds source length {length}")]
    OffsetOutOfRange { offset: u64, length: u64 },

    #[error("capability query failed with status {status}: {body}")]
    CapabilityQueryFailed { status: StatusCode, body: String },

    #[error("cancelled")]
    Cancelled,

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("transport error: {0}")]
    Transport(#[source] TransportError),

    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl From<TransportError> for TusError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Cancelled => Self::Cancelled,
            other => Self::Transport(other),
        }
    }
}

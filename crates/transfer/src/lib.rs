//! Chunked reading of upload sources with per-chunk checksums and
//! monotonic progress reporting.

mod chunked;
mod progress;
mod types;

pub use chunked::{ChunkReader, checksum_bytes};
pub use progress::{ProgressCallback, ProgressReporter};
pub use types::Chunk;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("source ended at offset {offset} before its declared length {length}")]
    UnexpectedEof { offset: u64, length: u64 },

    #[error("offset {offset} is beyond source length {length}")]
    OffsetOutOfRange { offset: u64, length: u64 },
}

//! Wire-level types for the tus resumable upload protocol (v1.0.0).
//!
//! This crate performs no I/O. It holds the header vocabulary, the
//! `Upload-Metadata` codec and the parsed form of a capability query, so
//! that transports and the upload controller agree on a single source of
//! truth for every string that crosses the wire.

pub mod constants;
pub mod metadata;
pub mod types;

// Re-export primary types for convenience.
pub use constants::{DEFAULT_CHUNK_SIZE, TUS_VERSION};
pub use metadata::{Metadata, MetadataError};
pub use types::{ServerInfo, UploadProgress};

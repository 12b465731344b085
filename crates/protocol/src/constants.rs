//! Header names and fixed values used on the wire.

/// Protocol version sent in `Tus-Resumable` on every non-OPTIONS request.
pub const TUS_VERSION: &str = "1.0.0";

/// Default chunk size: 3 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 3 * 1024 * 1024;

/// Content type required on chunk-append (PATCH) requests.
pub const OFFSET_OCTET_STREAM: &str = "application/offset+octet-stream";

/// Algorithm tag prefixed to the digest in `Upload-Checksum`.
pub const CHECKSUM_ALGORITHM: &str = "sha1";

// Request/response header names (wire-exact casing).
pub const TUS_RESUMABLE: &str = "Tus-Resumable";
pub const TUS_VERSION_HEADER: &str = "Tus-Version";
pub const TUS_EXTENSION: &str = "Tus-Extension";
pub const TUS_MAX_SIZE: &str = "Tus-Max-Size";
pub const UPLOAD_LENGTH: &str = "Upload-Length";
pub const UPLOAD_OFFSET: &str = "Upload-Offset";
pub const UPLOAD_METADATA: &str = "Upload-Metadata";
pub const UPLOAD_CHECKSUM: &str = "Upload-Checksum";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const LOCATION: &str = "Location";

/// Metadata key injected by file-based creation when the caller omits it.
pub const FILENAME_KEY: &str = "filename";

/// Formats an `Upload-Checksum` value from an already-encoded digest.
pub fn checksum_header_value(base64_digest: &str) -> String {
    format!("{CHECKSUM_ALGORITHM} {base64_digest}")
}

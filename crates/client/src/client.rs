//! Upload session controller and resource lifecycle operations.
//!
//! Every operation is a strictly sequential series of awaited exchanges
//! on the client's [`Transport`]. A client owns one cancellation token;
//! once it fires, the in-flight exchange is abandoned and no new exchange
//! is started.

use std::path::Path;
use std::sync::Arc;

use reqwest::{Method, StatusCode, Url};
use tokio::io::{AsyncRead, AsyncSeek};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tus_protocol::constants::{
    CONTENT_LENGTH, CONTENT_TYPE, FILENAME_KEY, LOCATION, OFFSET_OCTET_STREAM, TUS_RESUMABLE,
    UPLOAD_CHECKSUM, UPLOAD_LENGTH, UPLOAD_METADATA, UPLOAD_OFFSET, checksum_header_value,
};
use tus_protocol::{Metadata, ServerInfo, TUS_VERSION};
use tus_transfer::{Chunk, ChunkReader, ProgressCallback, ProgressReporter};

use crate::config::ClientConfig;
use crate::error::TusError;
use crate::http::HttpTransport;
use crate::transport::{HttpRequest, HttpResponse, TransferProgress, Transport, TransportError};

/// Client for one tus server conversation at a time.
///
/// Run several clients concurrently for parallel uploads; a single client
/// never overlaps its own exchanges.
pub struct TusClient {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
    cancel: CancellationToken,
}

impl TusClient {
    /// Creates a client backed by [`HttpTransport`].
    pub fn new(config: ClientConfig) -> Result<Self, TusError> {
        let transport = HttpTransport::from_config(&config)?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    /// Creates a client on top of an arbitrary transport.
    pub fn with_transport(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self {
            transport,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the client's cancellation token, e.g. with a child of an
    /// application-wide token.
    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns a handle to this client's cancellation token.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Aborts the in-flight exchange and every later one.
    ///
    /// Chunks already acknowledged stay on the server.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    /// Creates an upload resource of `upload_length` bytes under `url`.
    ///
    /// Returns the absolute resource URL; a relative `Location` is resolved
    /// against `url`.
    pub async fn create(
        &self,
        url: &str,
        upload_length: u64,
        metadata: &Metadata,
    ) -> Result<Url, TusError> {
        let request_url = parse_url(url)?;

        let mut request = HttpRequest::new(Method::POST, request_url.clone())
            .header(UPLOAD_LENGTH, upload_length.to_string())
            .header(CONTENT_LENGTH, "0");
        if !metadata.is_empty() {
            request = request.header(UPLOAD_METADATA, metadata.encode());
        }

        let resp = self.exchange(request, None).await?;
        if resp.status != StatusCode::CREATED {
            return Err(TusError::CreationFailed {
                status: resp.status,
                body: resp.text(),
            });
        }

        let location = resp
            .headers
            .get(LOCATION)
            .ok_or(TusError::LocationMissing)?
            .to_str()
            .map_err(|e| TusError::LocationInvalid(e.to_string()))?;
        let resource = request_url
            .join(location)
            .map_err(|e| TusError::LocationInvalid(format!("{location}: {e}")))?;

        info!(%resource, upload_length, "upload resource created");
        Ok(resource)
    }

    /// Creates an upload resource sized to the file at `path`.
    ///
    /// Adds a `filename` entry holding the file's name unless `metadata`
    /// already has one.
    pub async fn create_for_file(
        &self,
        url: &str,
        path: impl AsRef<Path>,
        metadata: &Metadata,
    ) -> Result<Url, TusError> {
        let path = path.as_ref();
        let length = tokio::fs::metadata(path).await?.len();

        let mut metadata = metadata.clone();
        if !metadata.contains_key(FILENAME_KEY)
            && let Some(name) = path.file_name()
        {
            metadata.insert(FILENAME_KEY, name.to_string_lossy());
        }

        self.create(url, length, &metadata).await
    }

    // -----------------------------------------------------------------------
    // Transfer
    // -----------------------------------------------------------------------

    /// Uploads `source` to the resource at `url`, resuming from the
    /// server's current offset.
    ///
    /// `source` is only read and seeked. Pass `&mut source` to keep using
    /// it afterwards. Progress is absolute, strictly increasing and capped
    /// at the source length.
    pub async fn upload<R>(
        &self,
        url: &str,
        source: R,
        progress: Option<ProgressCallback>,
    ) -> Result<(), TusError>
    where
        R: AsyncRead + AsyncSeek + Unpin,
    {
        let url = parse_url(url)?;
        let mut reader = ChunkReader::new(source, self.config.effective_chunk_size()).await?;
        let length = reader.len();
        let reporter = Arc::new(ProgressReporter::new(length, progress));

        let mut offset = self.confirmed_offset(&url, length).await?;
        if offset == length {
            debug!(%url, length, "upload already complete");
            reporter.report(length);
            return Ok(());
        }

        while offset < length {
            self.check_cancelled()?;

            let chunk = reader.read_at(offset).await?;
            match self.send_chunk(&url, &chunk, &reporter).await {
                Ok(resp) if resp.status == StatusCode::NO_CONTENT => {
                    offset = chunk.end();
                    reporter.report(offset);
                }
                Ok(resp) => {
                    return Err(TusError::UploadFailed {
                        status: resp.status,
                        body: resp.text(),
                    });
                }
                Err(TransportError::ConnectionReset(reason)) => {
                    // The server may have kept part of the chunk.
                    warn!(%url, offset, %reason, "connection reset, resynchronizing offset");
                    offset = self.confirmed_offset(&url, length).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!(%url, length, "upload complete");
        Ok(())
    }

    /// Opens the file at `path` and uploads it to `url`.
    pub async fn upload_file(
        &self,
        url: &str,
        path: impl AsRef<Path>,
        progress: Option<ProgressCallback>,
    ) -> Result<(), TusError> {
        let file = tokio::fs::File::open(path.as_ref()).await?;
        self.upload(url, file, progress).await
    }

    async fn send_chunk(
        &self,
        url: &Url,
        chunk: &Chunk,
        reporter: &Arc<ProgressReporter>,
    ) -> Result<HttpResponse, TransportError> {
        debug!(%url, offset = chunk.offset, size = chunk.len(), "sending chunk");

        let request = HttpRequest::new(Method::PATCH, url.clone())
            .header(UPLOAD_OFFSET, chunk.offset.to_string())
            .header(UPLOAD_CHECKSUM, checksum_header_value(&chunk.checksum))
            .header(CONTENT_TYPE, OFFSET_OCTET_STREAM)
            .body(chunk.data.clone());

        let base = chunk.offset;
        let reporter = Arc::clone(reporter);
        let progress: TransferProgress = Arc::new(move |sent, _| {
            reporter.report(base + sent);
        });

        self.exchange(request, Some(progress)).await
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Returns the number of bytes the server holds for the resource.
    ///
    /// Both `204 No Content` and `200 OK` are accepted.
    pub async fn get_offset(&self, url: &str) -> Result<u64, TusError> {
        let url = parse_url(url)?;
        self.fetch_offset(&url).await
    }

    async fn fetch_offset(&self, url: &Url) -> Result<u64, TusError> {
        let resp = self
            .exchange(HttpRequest::new(Method::HEAD, url.clone()), None)
            .await?;
        if !is_no_content_or_ok(resp.status) {
            return Err(TusError::OffsetQueryFailed {
                status: resp.status,
                body: resp.text(),
            });
        }

        let raw = resp.header(UPLOAD_OFFSET).ok_or(TusError::OffsetMissing)?;
        raw.trim()
            .parse::<u64>()
            .map_err(|_| TusError::OffsetInvalid(raw.to_string()))
    }

    /// Fetches the offset and checks it against the source length.
    async fn confirmed_offset(&self, url: &Url, length: u64) -> Result<u64, TusError> {
        let offset = self.fetch_offset(url).await?;
        if offset > length {
            return Err(TusError::OffsetOutOfRange { offset, length });
        }
        debug!(%url, offset, length, "server offset");
        Ok(offset)
    }

    /// Queries the server's protocol version, extensions and size limit.
    pub async fn get_server_info(&self, url: &str) -> Result<ServerInfo, TusError> {
        let url = parse_url(url)?;
        let resp = self
            .exchange(HttpRequest::new(Method::OPTIONS, url), None)
            .await?;
        if !is_no_content_or_ok(resp.status) {
            return Err(TusError::CapabilityQueryFailed {
                status: resp.status,
                body: resp.text(),
            });
        }
        Ok(ServerInfo::from_headers(|name| resp.header(name)))
    }

    /// Issues a HEAD request and returns its status, whatever it is.
    pub async fn head(&self, url: &str) -> Result<StatusCode, TusError> {
        let url = parse_url(url)?;
        let resp = self
            .exchange(HttpRequest::new(Method::HEAD, url), None)
            .await?;
        Ok(resp.status)
    }

    /// Deletes the resource. A resource that is already gone counts as
    /// deleted.
    pub async fn delete(&self, url: &str) -> Result<bool, TusError> {
        let url = parse_url(url)?;
        let resp = self
            .exchange(HttpRequest::new(Method::DELETE, url), None)
            .await?;
        let deleted = matches!(
            resp.status,
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND | StatusCode::GONE
        );
        debug!(status = %resp.status, deleted, "delete finished");
        Ok(deleted)
    }

    /// Downloads the resource body. The status is returned, not checked.
    ///
    /// `progress` receives `(received, total)`; `total` is the running
    /// count when the server sends no `Content-Length`.
    pub async fn download(
        &self,
        url: &str,
        progress: Option<TransferProgress>,
    ) -> Result<HttpResponse, TusError> {
        let url = parse_url(url)?;
        Ok(self
            .exchange(HttpRequest::new(Method::GET, url), progress)
            .await?)
    }

    // -----------------------------------------------------------------------
    // Plumbing
    // -----------------------------------------------------------------------

    /// Sends one request with the protocol and configured headers attached.
    async fn exchange(
        &self,
        mut request: HttpRequest,
        progress: Option<TransferProgress>,
    ) -> Result<HttpResponse, TransportError> {
        if self.cancel.is_cancelled() {
            return Err(TransportError::Cancelled);
        }

        // OPTIONS must work without knowing the server's version.
        if request.method != Method::OPTIONS {
            request
                .headers
                .insert(0, (TUS_RESUMABLE.to_string(), TUS_VERSION.to_string()));
        }
        for (name, value) in &self.config.headers {
            request.headers.push((name.clone(), value.clone()));
        }

        let method = request.method.clone();
        debug!(%method, url = %request.url, "tus request");
        let resp = self.transport.send(request, &self.cancel, progress).await?;
        debug!(%method, status = %resp.status, "tus response");
        Ok(resp)
    }

    fn check_cancelled(&self) -> Result<(), TusError> {
        if self.cancel.is_cancelled() {
            Err(TusError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Offset and capability queries answer 204, but some servers send 200.
fn is_no_content_or_ok(status: StatusCode) -> bool {
    status == StatusCode::NO_CONTENT || status == StatusCode::OK
}

fn parse_url(url: &str) -> Result<Url, TusError> {
    Url::parse(url).map_err(|e| TusError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

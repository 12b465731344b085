//! `reqwest`-backed [`Transport`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::header::CONTENT_LENGTH;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::config::ClientConfig;
use crate::transport::{HttpRequest, HttpResponse, TransferProgress, Transport, TransportError};

/// Granularity of upload progress callbacks (64 KiB).
const PROGRESS_SLICE: usize = 64 * 1024;

/// HTTP transport on top of a pooled `reqwest::Client`.
///
/// Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Builds a transport with default settings.
    pub fn new() -> Result<Self, TransportError> {
        Self::from_config(&ClientConfig::default())
    }

    /// Builds a transport honoring the timeouts in `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
        })
    }

    /// Wraps an already configured client.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn perform(
        &self,
        request: HttpRequest,
        progress: Option<TransferProgress>,
    ) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.http.request(method, url);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let has_body = body.is_some();
        if let Some(body) = body {
            builder = match &progress {
                Some(cb) => builder
                    .header(CONTENT_LENGTH, body.len())
                    .body(progress_body(body, Arc::clone(cb))),
                None => builder.body(body),
            };
        }

        let mut resp = builder.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let total = resp.content_length();

        let receive_progress = if has_body { None } else { progress };
        let mut received: Vec<u8> = Vec::new();
        while let Some(piece) = resp.chunk().await? {
            received.extend_from_slice(&piece);
            if let Some(cb) = &receive_progress {
                let count = received.len() as u64;
                cb(count, total.unwrap_or(count));
            }
        }

        trace!(%status, body_len = received.len(), "HTTP exchange finished");

        Ok(HttpResponse {
            status,
            headers,
            body: Bytes::from(received),
        })
    }
}

impl Transport for HttpTransport {
    fn send<'a>(
        &'a self,
        request: HttpRequest,
        cancel: &'a CancellationToken,
        progress: Option<TransferProgress>,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + 'a>> {
        Box::pin(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(TransportError::Cancelled),
                result = self.perform(request, progress) => result,
            }
        })
    }
}

/// Streams `body` in slices, reporting cumulative bytes handed to the
/// connection after each slice.
fn progress_body(body: Bytes, progress: TransferProgress) -> reqwest::Body {
    let total = body.len() as u64;
    let slices: Vec<Bytes> = (0..body.len())
        .step_by(PROGRESS_SLICE)
        .map(|start| body.slice(start..(start + PROGRESS_SLICE).min(body.len())))
        .collect();

    let mut sent = 0u64;
    let stream = futures_util::stream::iter(slices).map(move |slice| {
        sent += slice.len() as u64;
        progress(sent, total);
        Ok::<_, std::io::Error>(slice)
    });
    reqwest::Body::wrap_stream(stream)
}

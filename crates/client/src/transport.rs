//! Transport seam between the upload controller and HTTP.
//!
//! The upload controller sees the network as a single operation: send one
//! request and get back a fully buffered response. Tests drive the state
//! machine through scripted implementations of the trait.

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use tokio_util::sync::CancellationToken;

/// Byte-level progress of a single exchange: `(transferred, total)`.
pub type TransferProgress = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Errors raised by a transport while performing an exchange.
///
/// `ConnectionReset` is split out because it is the one fault the upload
/// loop recovers from.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection reset by peer: {0}")]
    ConnectionReset(String),

    #[error("cancelled")]
    Cancelled,

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("I/O error: {0}")]
    Io(std::io::Error),
}

impl TransportError {
    pub fn is_connection_reset(&self) -> bool {
        matches!(self, Self::ConnectionReset(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if source_chain_has_reset(&err) {
            Self::ConnectionReset(err.to_string())
        } else {
            Self::Http(err)
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::ConnectionReset {
            Self::ConnectionReset(err.to_string())
        } else {
            Self::Io(err)
        }
    }
}

/// Walks `err` and its sources looking for an I/O reset-by-peer.
fn source_chain_has_reset(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>()
            && io.kind() == std::io::ErrorKind::ConnectionReset
        {
            return true;
        }
        current = e.source();
    }
    false
}

/// One outgoing HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    /// Header pairs in insertion order. Names keep their wire casing.
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Case-insensitive lookup of the last value set for `name`.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response to an exchange, with the body fully buffered.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    /// Case-insensitive by construction.
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Adds a header. Invalid names or values are skipped.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Case-insensitive header lookup. Non-ASCII values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Performs HTTP exchanges on behalf of [`TusClient`](crate::TusClient).
///
/// Implementations must:
/// - resolve with [`TransportError::Cancelled`] once `cancel` fires,
///   abandoning the exchange;
/// - call `progress` as the request body is sent, or as the response body
///   is received when the request has no body;
/// - report a peer reset as [`TransportError::ConnectionReset`].
///
/// Non-2xx statuses are responses, not errors.
pub trait Transport: Send + Sync {
    fn send<'a>(
        &'a self,
        request: HttpRequest,
        cancel: &'a CancellationToken,
        progress: Option<TransferProgress>,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + 'a>>;
}

//! `Upload-Metadata` header codec.
//!
//! Each entry is serialized as `key base64(value)` and entries are joined
//! by commas. Keys are sanitized by stripping every space and comma; they
//! are never escaped, so two caller keys that differ only in those
//! characters are sent under the same wire key.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Errors produced when decoding an `Upload-Metadata` header.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("empty metadata key in pair: {0:?}")]
    EmptyKey(String),

    #[error("invalid base64 value for key {0:?}")]
    InvalidBase64(String),

    #[error("metadata value for key {0:?} is not UTF-8")]
    InvalidUtf8(String),
}

/// Key/value metadata attached to an upload at creation time.
///
/// Ordered by key so the encoded header is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, String>);

impl Metadata {
    /// Creates an empty metadata map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a key/value pair, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encodes the map as an `Upload-Metadata` header value.
    ///
    /// An empty map encodes to an empty string.
    pub fn encode(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{} {}", sanitize_key(k), STANDARD.encode(v.as_bytes())))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Decodes an `Upload-Metadata` header value.
    ///
    /// A pair without a value (`key` alone) decodes to an empty string.
    pub fn decode(header: &str) -> Result<Self, MetadataError> {
        let mut out = Self::new();
        for pair in header.split(',') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let (key, encoded) = match pair.split_once(' ') {
                Some((k, v)) => (k, v.trim()),
                None => (pair, ""),
            };
            if key.is_empty() {
                return Err(MetadataError::EmptyKey(pair.to_string()));
            }
            let raw = STANDARD
                .decode(encoded)
                .map_err(|_| MetadataError::InvalidBase64(key.to_string()))?;
            let value =
                String::from_utf8(raw).map_err(|_| MetadataError::InvalidUtf8(key.to_string()))?;
            out.insert(key, value);
        }
        Ok(out)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Removes every space and comma from a metadata key.
pub fn sanitize_key(key: &str) -> String {
    key.chars().filter(|c| *c != ' ' && *c != ',').collect()
}

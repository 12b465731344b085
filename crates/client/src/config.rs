//! Client configuration.
//!
//! Every field has a default, so an empty JSON object (`{}`) is a valid
//! configuration.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tus_protocol::DEFAULT_CHUNK_SIZE;

use crate::error::TusError;

/// Settings for a [`TusClient`](crate::TusClient) and its default transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    /// Maximum bytes per PATCH. Fixed for the lifetime of a client.
    pub chunk_size: usize,

    /// Extra headers sent with every request (e.g. `Authorization`).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// Whole-exchange timeout for the HTTP transport.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// TCP connect timeout for the HTTP transport.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            headers: BTreeMap::new(),
            request_timeout_secs: None,
            connect_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Parses a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, TusError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, TusError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// Chunk size with 0 mapped to the default.
    pub fn effective_chunk_size(&self) -> usize {
        if self.chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            self.chunk_size
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.chunk_size, 3 * 1024 * 1024);
        assert!(config.headers.is_empty());
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn empty_json_is_default() {
        assert_eq!(ClientConfig::from_json("{}").unwrap(), ClientConfig::default());
    }

    #[test]
    fn parses_all_fields() {
        let config = ClientConfig::from_json(
            r#"{
                "chunkSize": 1024,
                "headers": {"Authorization": "Bearer abc"},
                "requestTimeoutSecs": 30,
                "connectTimeoutSecs": 5
            }"#,
        )
        .unwrap();
        assert_eq!(config.chunk_size, 1024);
        assert_eq!(config.headers.get("Authorization").unwrap(), "Bearer abc");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.connect_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn zero_chunk_size_falls_back_to_default() {
        let config = ClientConfig {
            chunk_size: 0,
            ..Default::default()
        };
        assert_eq!(config.effective_chunk_size(), DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn malformed_json_is_config_error() {
        assert!(matches!(
            ClientConfig::from_json("{\"chunkSize\": \"big\"}"),
            Err(TusError::Config(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.json");
        std::fs::write(&path, r#"{"chunkSize": 4096}"#).unwrap();
        assert_eq!(ClientConfig::load(&path).unwrap().chunk_size, 4096);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ClientConfig::load(&dir.path().join("absent.json")),
            Err(TusError::Io(_))
        ));
    }
}

use serde::{Deserialize, Serialize};

use crate::constants::{TUS_EXTENSION, TUS_MAX_SIZE, TUS_RESUMABLE, TUS_VERSION_HEADER};

/// Capabilities advertised by a server in response to an OPTIONS request.
///
/// Missing headers leave the matching field empty; `max_size` is 0 when
/// `Tus-Max-Size` is absent or not an integer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    /// Value of `Tus-Resumable`.
    pub version: String,
    /// Raw value of `Tus-Version` (comma-separated).
    pub supported_versions: String,
    /// Raw value of `Tus-Extension` (comma-separated).
    pub extensions: String,
    /// Value of `Tus-Max-Size` in bytes.
    pub max_size: u64,
}

impl ServerInfo {
    /// Builds a snapshot from response headers.
    ///
    /// `header` must perform a case-insensitive lookup.
    pub fn from_headers<'a>(header: impl Fn(&str) -> Option<&'a str>) -> Self {
        let text = |name: &str| header(name).map(str::trim).unwrap_or_default().to_string();
        Self {
            version: text(TUS_RESUMABLE),
            supported_versions: text(TUS_VERSION_HEADER),
            extensions: text(TUS_EXTENSION),
            max_size: header(TUS_MAX_SIZE)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0),
        }
    }

    /// Supported protocol versions as a list.
    pub fn supported_version_list(&self) -> Vec<&str> {
        split_list(&self.supported_versions)
    }

    /// Supported extensions as a list.
    pub fn extension_list(&self) -> Vec<&str> {
        split_list(&self.extensions)
    }

    /// Returns `true` if the server advertises `extension`.
    pub fn supports_extension(&self, extension: &str) -> bool {
        self.extension_list().contains(&extension)
    }
}

fn split_list(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Absolute upload progress: bytes acknowledged or in flight vs. total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadProgress {
    pub bytes_transferred: u64,
    pub bytes_total: u64,
}

impl UploadProgress {
    pub fn new(bytes_transferred: u64, bytes_total: u64) -> Self {
        Self {
            bytes_transferred,
            bytes_total,
        }
    }

    /// Fraction complete in `[0.0, 1.0]`. An empty upload counts as complete.
    pub fn fraction(&self) -> f64 {
        if self.bytes_total == 0 {
            return 1.0;
        }
        self.bytes_transferred as f64 / self.bytes_total as f64
    }

    pub fn is_complete(&self) -> bool {
        self.bytes_transferred >= self.bytes_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'h>(headers: &'h HashMap<String, String>) -> impl Fn(&str) -> Option<&'h str> + 'h {
        move |name| headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_all_capability_headers() {
        let h = headers(&[
            ("Tus-Resumable", "1.0.0"),
            ("Tus-Version", "1.0.0,0.2.2"),
            ("Tus-Extension", "creation, termination"),
            ("Tus-Max-Size", "1073741824"),
        ]);
        let info = ServerInfo::from_headers(lookup(&h));
        assert_eq!(info.version, "1.0.0");
        assert_eq!(info.supported_version_list(), vec!["1.0.0", "0.2.2"]);
        assert_eq!(info.extension_list(), vec!["creation", "termination"]);
        assert!(info.supports_extension("termination"));
        assert!(!info.supports_extension("checksum"));
        assert_eq!(info.max_size, 1_073_741_824);
    }

    #[test]
    fn missing_headers_yield_empty_fields() {
        let h = headers(&[("Tus-Resumable", "1.0.0")]);
        let info = ServerInfo::from_headers(lookup(&h));
        assert_eq!(info.supported_versions, "");
        assert!(info.extension_list().is_empty());
        assert_eq!(info.max_size, 0);
    }

    #[test]
    fn unparseable_max_size_is_zero() {
        let h = headers(&[("Tus-Max-Size", "lots")]);
        assert_eq!(ServerInfo::from_headers(lookup(&h)).max_size, 0);
    }

    #[test]
    fn progress_fraction() {
        assert!((UploadProgress::new(50, 200).fraction() - 0.25).abs() < f64::EPSILON);
        assert!(UploadProgress::new(0, 0).is_complete());
        assert!(!UploadProgress::new(1, 2).is_complete());
    }
}

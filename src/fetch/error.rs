//! Error types for the fetch module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while downloading and validating a book.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The resolved URL could not be parsed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {reason}")]
    ClientBuild {
        /// Builder failure description.
        reason: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}\n  Suggestion: raise read_timeout_secs or try another relay")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Non-success HTTP response.
    #[error("HTTP {status} fetching {url}\n  Suggestion: {suggestion}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// User-facing hint derived from the status class.
        suggestion: &'static str,
    },

    /// Body is below the minimum book size.
    #[error(
        "file too small ({bytes} bytes, minimum {min}) from {url}, probably a broken link\n  Suggestion: check that the link points at the book file itself"
    )]
    TooSmall {
        /// The URL that was fetched.
        url: String,
        /// Bytes received.
        bytes: u64,
        /// Configured minimum.
        min: u64,
    },

    /// Body exceeded the configured cap.
    #[error("response from {url} exceeds the {limit} byte limit")]
    TooLarge {
        /// The URL that was fetched.
        url: String,
        /// Configured maximum.
        limit: u64,
    },

    /// Body does not start with a ZIP local file header.
    #[error(
        "response from {url} is not an EPUB archive (content-type: {content_type})\n  Suggestion: the relay may have returned an error page; try --github raw or another relay"
    )]
    NotAnArchive {
        /// The URL that was fetched.
        url: String,
        /// Content-Type reported by the server, or `unknown`.
        content_type: String,
    },

    /// File system error while saving.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a client construction error.
    pub fn client_build(reason: impl Into<String>) -> Self {
        Self::ClientBuild {
            reason: reason.into(),
        }
    }

    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    ///
    /// 4xx responses point at the link, 5xx at the relay or host.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        let suggestion = if (400..500).contains(&status) {
            "Check that the link is public and still exists."
        } else {
            "The relay or host is failing; retry later or configure another relay_url."
        };
        Self::HttpStatus {
            url: url.into(),
            status,
            suggestion,
        }
    }

    /// Creates a too-small error.
    pub fn too_small(url: impl Into<String>, bytes: u64, min: u64) -> Self {
        Self::TooSmall {
            url: url.into(),
            bytes,
            min,
        }
    }

    /// Creates a too-large error.
    pub fn too_large(url: impl Into<String>, limit: u64) -> Self {
        Self::TooLarge {
            url: url.into(),
            limit,
        }
    }

    /// Creates a not-an-archive error.
    pub fn not_an_archive(url: impl Into<String>, content_type: Option<&str>) -> Self {
        Self::NotAnArchive {
            url: url.into(),
            content_type: content_type.unwrap_or("unknown").to_string(),
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: every variant needs the
// url or path, which the source errors do not carry.

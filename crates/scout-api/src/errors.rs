//! HTTP collaborator errors.

use thiserror::Error;

/// Errors from the backend's HTTP surface.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure or undecodable body.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response.
    #[error("{url} returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Request URL.
        url: String,
        /// Response body, possibly empty.
        body: String,
    },

    /// The named document does not exist on the backend.
    #[error("file not found: {name}")]
    NotFound {
        /// Document name.
        name: String,
    },

    /// Reading a local file for upload failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A base URL or file name could not form a request URL.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl {
        /// Offending input.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl ApiError {
    pub(crate) fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

//! Error types for registry operations.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry does not know the requested endpoint or resource.
    #[error("Not found: {path}")]
    NotFound {
        /// Request path.
        path: String,
    },

    /// Failed to connect to registry.
    #[error("Failed to connect to registry at {url}: {source}")]
    ConnectionFailed {
        /// Registry URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// HTTP error from registry.
    #[error("HTTP error from registry: {status} - {message}")]
    HttpError {
        /// HTTP status code.
        status: u16,
        /// Response body or error message.
        message: String,
    },

    /// Any other failure raised by the HTTP client (timeouts, body decoding, setup).
    #[error("HTTP client error: {source}")]
    Client {
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// Response body was not valid JSON.
    #[error("Failed to parse response from {path}: {source}")]
    Parse {
        /// Request path.
        path: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Response was valid JSON but not in the expected shape.
    #[error("Unexpected response from {path}: {message}")]
    UnexpectedResponse {
        /// Request path.
        path: String,
        /// What was wrong with it.
        message: String,
    },

    /// Invalid URL.
    #[error("Invalid URL: {url}")]
    InvalidUrl {
        /// URL string.
        url: String,
    },

    /// A configured header name or value cannot be sent.
    #[error("Invalid header: {name}")]
    InvalidHeader {
        /// Header name.
        name: String,
    },

    /// The query could not be compiled into a prefix pattern.
    #[error("Invalid query '{query}': {source}")]
    InvalidQuery {
        /// Query as given by the caller.
        query: String,
        /// Underlying error.
        #[source]
        source: regex::Error,
    },
}

impl RegistryError {
    /// Returns true if the registry signalled a missing endpoint or resource.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true for network, TLS and HTTP status failures.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::HttpError { .. } | Self::Client { .. }
        )
    }

    /// Returns true if the response body could not be understood.
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::UnexpectedResponse { .. })
    }
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::ConnectionFailed {
                url: err
                    .url()
                    .map_or_else(|| "unknown".to_string(), ToString::to_string),
                source: err,
            }
        } else {
            Self::Client { source: err }
        }
    }
}

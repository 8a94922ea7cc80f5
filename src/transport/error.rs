//! Transport error types.

use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors that can occur while running a query on the remote engine.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("request to query server failed: {0}")]
    Http(#[source] reqwest::Error),

    /// Non-success status without a recognizable error body.
    #[error("query server returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The engine rejected the query. Displays the engine message verbatim.
    #[error("{message}")]
    Engine {
        /// HTTP status code, when the error came with one.
        status: Option<u16>,
        /// Message from the engine.
        message: String,
    },

    /// A success response whose JSON body did not match the result shape.
    #[error("failed to deserialize response: {0}")]
    Deserialize(#[source] serde_json::Error),
}

impl TransportError {
    /// Create an engine error without an HTTP status.
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            status: None,
            message: message.into(),
        }
    }

    /// Check if the error was reported by the engine itself (bad SQL,
    /// permission denied) rather than the transport.
    pub fn is_engine_error(&self) -> bool {
        matches!(self, Self::Engine { .. })
    }

    /// Check if the error is retriable.
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status >= 500,
            Self::Engine { .. } | Self::Deserialize(_) => false,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err)
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Deserialize(err)
    }
}

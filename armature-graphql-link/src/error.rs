//! GraphQL link error types.

use std::fmt;

use http::StatusCode;
use thiserror::Error;

/// Result type for GraphQL link operations.
pub type Result<T> = std::result::Result<T, LinkError>;

/// A combination of encoding options that cannot be expressed as one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Incompatibility {
    /// Multipart upload was requested for a batch.
    UploadWithBatching,
    /// Multipart upload was requested for a method without a body.
    UploadWithQueryString,
    /// A batch was sent with a method without a body.
    BatchingWithQueryString,
}

impl fmt::Display for Incompatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::UploadWithBatching => "file upload is incompatible with batching",
            Self::UploadWithQueryString => "file upload is incompatible with query-string methods",
            Self::BatchingWithQueryString => "batching is incompatible with query-string methods",
        };
        f.write_str(message)
    }
}

/// GraphQL link errors.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The requested encoding options contradict each other.
    #[error("Incompatible encoding: {0}")]
    IncompatibleEncoding(Incompatibility),

    /// Multipart upload was requested but no extraction adapter is configured.
    #[error("File upload requires an extraction adapter; configure one with `HttpLink::extract_files`")]
    MissingAdapter,

    /// A batch was constructed without operations.
    #[error("A batch must contain at least one operation")]
    EmptyBatch,

    /// The underlying HTTP exchange failed.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// GraphQL errors returned by the server.
    #[error("GraphQL errors: {0:?}")]
    GraphQL(Vec<crate::GraphQLResponseError>),

    /// Response could not be interpreted.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A client registry was built without a `default` entry.
    #[error("Client registry has no \"default\" client")]
    MissingDefaultClient,

    /// No client is registered under the requested name.
    #[error("Unknown client: {0}")]
    UnknownClient(String),

    /// I/O error while reading an upload.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LinkError {
    /// Check if the request was rejected before anything was sent.
    pub fn is_encoding_error(&self) -> bool {
        matches!(
            self,
            Self::IncompatibleEncoding(_) | Self::MissingAdapter | Self::EmptyBatch
        )
    }

    /// Check if this is a transport failure.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Check if this is a GraphQL error (server-side).
    pub fn is_graphql_error(&self) -> bool {
        matches!(self, Self::GraphQL(_))
    }

    /// Get GraphQL errors if this is a GraphQL error.
    pub fn graphql_errors(&self) -> Option<&[crate::GraphQLResponseError]> {
        match self {
            Self::GraphQL(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Errors raised by a [`Transport`](crate::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    /// Underlying HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Response error: {status} - {body}")]
    Status {
        /// HTTP status code.
        status: StatusCode,
        /// Response body as text.
        body: String,
    },

    /// The request URL could not be resolved.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl TransportError {
    /// Get the HTTP status code if the server responded.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status(),
            _ => None,
        }
    }

    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }
}

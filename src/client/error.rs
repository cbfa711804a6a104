//! Store client error types.

use thiserror::Error;

/// Failure of a diagram store call, normalized from transport and HTTP status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Rejected input (400), or caught locally before any request was sent.
    #[error("Validation error: {0}")]
    Validation(String),
    /// Missing or rejected credential (401/403).
    #[error("Authentication error: {0}")]
    Auth(String),
    /// The diagram does not exist or belongs to someone else (404).
    #[error("Diagram not found or you don't have access to it")]
    NotFoundOrForbidden,
    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Network(String),
    /// Unexpected status or malformed response body.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
}

impl ClientError {
    /// Map a non-success HTTP status and its envelope message.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 | 422 => ClientError::Validation(message),
            401 | 403 => ClientError::Auth(message),
            404 => ClientError::NotFoundOrForbidden,
            _ => ClientError::Server { status, message },
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ClientError::from_status(status.as_u16(), err.to_string()),
            None => ClientError::Network(err.to_string()),
        }
    }
}

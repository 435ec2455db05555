//! Error types for request execution.
//!
//! Two failure kinds reach a caller of `trigger`:
//!
//! - [`TransportError`]: the HTTP collaborator itself failed
//! - [`EncodingError`]: the payload could not be turned into a query or body
//!
//! A logical error (the server answered, but the application says "failed")
//! is not represented here. It ends in `ViewState::error` and the
//! logical-error hook, and the response is still handed back to the caller.

use thiserror::Error;

/// Failure of the underlying HTTP exchange.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request never produced a response (connection refused, DNS, TLS, ...)
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The collaborator rejected the response status
    #[error("HTTP error (status {status}): {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The request could not be built (bad URL, bad header, ...)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Failure to encode the request payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// The query encoder could not represent the payload
    #[error("Unsupported payload: {0}")]
    Unsupported(String),
}

/// Errors returned by a request trigger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The HTTP collaborator failed
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The payload could not be encoded
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

impl RequestError {
    /// The transport failure, if this is one
    #[must_use]
    pub const fn as_transport(&self) -> Option<&TransportError> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Encoding(_) => None,
        }
    }
}

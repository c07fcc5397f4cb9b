use crate::sender::{RequestError, ResponseError};
use thiserror::Error;

/// Top-level error type of every client call.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request could not be completed, no response was received.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The server responded with a status of 400 or above.
    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error("Invalid response: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl ClientError {
    /// HTTP status code, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Response(e) => Some(e.status.as_u16()),
            _ => None,
        }
    }

    pub fn is_payload_too_large(&self) -> bool {
        matches!(self, ClientError::Response(e) if e.is_payload_too_large())
    }
}

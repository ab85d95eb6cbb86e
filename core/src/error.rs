//! Error types for the posts API client.
//!
//! # Design
//! Every failed round-trip ends up as one `ApiError` variant. The three
//! statuses the controller treats specially (400, 404, 500) get dedicated
//! variants so classification matches on tags instead of probing status
//! codes. All other non-2xx responses land in `HttpError` with the raw status
//! and body for debugging.

use thiserror::Error;

/// Errors returned by `PostClient` parse methods and by `Transport`s.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response (connect failure, timeout).
    #[error("no response received: {0}")]
    NoResponse(String),

    /// The server returned 400.
    #[error("bad request: {body}")]
    BadRequest { body: String },

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned 500.
    #[error("internal server error: {body}")]
    ServerError { body: String },

    /// The server returned any other non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

/// Closed taxonomy of failures, independent of the operation that hit them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Local form validation failed; see `ValidationError::kind`.
    Validation,
    Transport,
    ClientRequest,
    NotFound,
    Server,
    Unclassified,
}

impl ApiError {
    /// Build the error for a non-2xx status.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            400 => ApiError::BadRequest { body },
            404 => ApiError::NotFound,
            500 => ApiError::ServerError { body },
            _ => ApiError::HttpError { status, body },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::NoResponse(_) => ErrorKind::Transport,
            ApiError::BadRequest { .. } => ErrorKind::ClientRequest,
            ApiError::NotFound => ErrorKind::NotFound,
            ApiError::ServerError { .. } => ErrorKind::Server,
            ApiError::HttpError { .. }
            | ApiError::DeserializationError(_)
            | ApiError::SerializationError(_) => ErrorKind::Unclassified,
        }
    }

    /// HTTP status carried by the error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::BadRequest { .. } => Some(400),
            ApiError::NotFound => Some(404),
            ApiError::ServerError { .. } => Some(500),
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human-readable text shown in error notifications.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NoResponse(_) => "No response received from server".to_string(),
            ApiError::BadRequest { .. } => "Invalid request data".to_string(),
            ApiError::NotFound => "The requested resource was not found".to_string(),
            ApiError::ServerError { .. } => "Server error occurred".to_string(),
            ApiError::HttpError { status, .. } => format!("Error: {status}"),
            ApiError::DeserializationError(_) | ApiError::SerializationError(_) => {
                "An unexpected error occurred".to_string()
            }
        }
    }
}

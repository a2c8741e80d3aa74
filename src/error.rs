//! Crate-wide error type.
//!
//! Every fallible operation returns [`Result`]. Transport and server failures
//! keep enough detail (HTTP status, server message) for the retry engine to
//! decide whether a chunk may be retried.

use thiserror::Error;

/// Fallback message when a 4xx rejection carries no server message.
pub const REJECTED_FALLBACK_MESSAGE: &str = "Upload rejected by server";

#[derive(Debug, Error)]
pub enum AppError {
    /// Connection, timeout or body-stream failure before a status was received.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success HTTP status.
    #[error("server responded with status {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status { status: u16, message: Option<String> },

    /// A chunk was refused with a client error; never retried.
    #[error("{message}")]
    Rejected { chunk_index: u32, message: String },

    /// A chunk kept failing after the whole retry budget was spent.
    #[error("{message}")]
    RetriesExhausted {
        chunk_index: u32,
        retries: u32,
        message: String,
    },

    /// The upload finished without error but the server never reported a path.
    #[error("Upload completed but no path returned")]
    MissingPath,

    #[error("io error: {0}")]
    Io(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-supplied message carried by the error, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            AppError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => AppError::Status {
                status: status.as_u16(),
                message: None,
            },
            None => AppError::Network(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

//! Error type shared by the fallible parts of the crate.
//!
//! The normalizer and the camera framer are total functions and never
//! produce a [`SceneError`]; only loading, decoding and fetching do.

use thiserror::Error;

/// Errors raised by configuration loading, stream decoding and the HTTP client.
#[derive(Debug, Error)]
pub enum SceneError {
    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration document could not be parsed or serialized.
    #[error("Config error: {0}")]
    Config(String),

    /// A JSON payload could not be decoded.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The request never produced a response (connect, timeout, body read).
    #[error("Request error: {0}")]
    Http(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// A stream the caller needs is absent from the payload.
    #[error("Activity data does not contain the '{0}' stream")]
    MissingStream(&'static str),

    /// No access token is available.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The access token expired and there is no refresh token to renew it.
    #[error("Refresh token not available")]
    RefreshTokenUnavailable,
}

impl SceneError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a transport error.
    pub fn http(msg: impl std::fmt::Display) -> Self {
        Self::Http(msg.to_string())
    }

    /// True for errors worth retrying (transport failures and 429/5xx).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

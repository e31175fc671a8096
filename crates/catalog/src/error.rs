//! Adapter error types.

use thiserror::Error;

/// Failure while reading from the run registry.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request never produced a response (connect, timeout, DNS).
    #[error("registry unreachable: {0}")]
    Transport(String),
    /// The registry answered with a non-success status.
    #[error("registry returned {status}: {message}")]
    Status { status: u16, message: String },
    /// The response body did not match the expected shape.
    #[error("could not decode registry response: {0}")]
    Decode(String),
    /// Client misconfiguration (bad base URL, invalid token header).
    #[error("registry client misconfigured: {0}")]
    Config(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CatalogError::Decode(err.to_string())
        } else {
            CatalogError::Transport(err.to_string())
        }
    }
}

/// Failure while publishing a relaunch event.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The publish request never produced a response.
    #[error("event bus unreachable: {0}")]
    Transport(String),
    /// The event bus refused the event.
    #[error("event bus rejected '{event}' with {status}: {reason}")]
    Rejected {
        event: String,
        status: u16,
        reason: String,
    },
    /// Client misconfiguration.
    #[error("event bus client misconfigured: {0}")]
    Config(String),
}

impl From<reqwest::Error> for DispatchError {
    fn from(err: reqwest::Error) -> Self {
        DispatchError::Transport(err.to_string())
    }
}

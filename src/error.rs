//! Error types for the Usertour loader stub.

use thiserror::Error;

/// Failure to acquire the real implementation resource.
///
/// Cloneable so every holder of the shared load handle observes the same outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("Could not load Usertour.js from {url}: {reason}")]
    Acquisition { url: String, reason: String },

    #[error("Could not load Usertour.js: acquisition task aborted ({0})")]
    Aborted(String),
}

impl LoadError {
    pub fn acquisition(url: impl Into<String>, reason: impl Into<String>) -> Self {
        LoadError::Acquisition {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

/// Failure delivered through a deferred result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// The real implementation executed the call and it failed.
    #[error("Call rejected: {0}")]
    Rejected(String),

    /// The deferred handle was dropped without ever being settled.
    #[error("Deferred result abandoned before it was settled")]
    Abandoned,
}

/// Errors from installing the real implementation on a client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachError {
    #[error("Client is already active; the real implementation can only be attached once")]
    AlreadyActive,
}

/// Crate-level errors surfaced by configuration, the CLI and helpers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    #[error("Load failed: {0}")]
    Load(#[from] LoadError),

    #[error("Call failed: {0}")]
    Call(#[from] CallError),

    #[error("Attach failed: {0}")]
    Attach(#[from] AttachError),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

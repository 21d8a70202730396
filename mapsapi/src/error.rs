//! Error types for the mapsapi library.

use thiserror::Error;

/// Errors that can occur when calling a Maps web service.
#[derive(Error, Debug)]
pub enum MapsError {
    /// The request is structurally invalid and was never sent.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Connection failure, timeout, or a non-2xx response without a usable body.
    #[error("transport error{}: {message}", http_suffix(.status))]
    Transport {
        /// HTTP status, if a response was received at all.
        status: Option<u16>,
        message: String,
    },

    /// The service answered with a terminal non-OK status.
    #[error("service returned {status}{}", message_suffix(.message))]
    Service {
        status: String,
        message: Option<String>,
    },

    /// The service answered with a transient status (e.g. `OVER_QUERY_LIMIT`).
    #[error("service returned retryable status {status}{}", message_suffix(.message))]
    RetryableService {
        status: String,
        message: Option<String>,
    },

    /// The response body did not have the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Credentials or configuration were rejected.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The caller cancelled the call or its deadline passed.
    #[error("request cancelled")]
    Cancelled,
}

impl MapsError {
    /// Whether the dispatcher may try the call again.
    pub fn is_retryable(&self) -> bool {
        match self {
            MapsError::Transport { status: None, .. } => true,
            MapsError::Transport {
                status: Some(code), ..
            } => *code >= 500 || *code == 429,
            MapsError::RetryableService { .. } => true,
            _ => false,
        }
    }

    /// Converts a retryable service status into its terminal form.
    ///
    /// Used once the retry budget is spent; other errors pass through.
    pub(crate) fn into_terminal(self) -> Self {
        match self {
            MapsError::RetryableService { status, message } => {
                MapsError::Service { status, message }
            }
            other => other,
        }
    }
}

fn http_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

fn message_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

/// Result type alias using [`MapsError`].
pub type Result<T> = std::result::Result<T, MapsError>;

//! Console error types.

use thiserror::Error;

/// Errors raised outside the form and table widgets.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Request could not be sent or the connection failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Form configuration error.
    #[error("Form configuration error: {0}")]
    Form(#[from] console_widgets::ConfigError),

    /// Action needs a logged-in session.
    #[error("Not logged in")]
    NotLoggedIn,

    /// Invalid state.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type for console operations.
pub type ConsoleResult<T> = Result<T, ConsoleError>;

use thiserror::Error;

/// Errors raised by a driver implementation.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("script execution failed: {0}")]
    Script(String),

    /// The in-page scanner reported a structured failure.
    #[error("page scanner error [{code}]: {message}")]
    Page { code: String, message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("driver not connected")]
    NotReady,

    #[error("{0}")]
    Other(String),
}

/// Errors surfaced by automation operations.
///
/// `NotFound` is the only recoverable variant: the retry scheduler swallows
/// it until the wait deadline, then converts the last reason into `Timeout`.
/// Everything else aborts the operation immediately.
#[derive(Debug, Error)]
pub enum AutomationError {
    /// An anchor or widget could not be located in the current snapshot.
    /// Carries the literal anchor text.
    #[error("not found on page: {0}")]
    NotFound(String),

    /// Retry budget exhausted. The message is the last `NotFound` reason or
    /// a default naming the full anchor chain.
    #[error("timed out: {0}")]
    Timeout(String),

    /// Structural mismatch between the operation and the page shape, e.g.
    /// `options()` on a plain text input. Never retried.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Driver(#[from] DriverError),
}

pub type Result<T> = std::result::Result<T, AutomationError>;

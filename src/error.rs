//! Doorman error types

/// Doorman error types
#[derive(Debug, thiserror::Error)]
pub enum DoormanError {
    // Upstream errors surfaced by caller-supplied computations
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("empty response from upstream")]
    EmptyResponse,

    // Queue lifecycle errors
    /// The job was cancelled while still queued. Distinct from a
    /// computation failure so callers can tell "your request failed"
    /// apart from "you cancelled it".
    #[error("job cancelled before admission")]
    Cancelled,

    /// The queue was dropped or shut down while the job was outstanding.
    #[error("queue closed before the job resolved")]
    QueueClosed,

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl DoormanError {
    /// Whether this error is a cancellation rather than a genuine failure.
    ///
    /// Cancelled jobs are counted separately from failed jobs and their
    /// results are never cached.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, DoormanError::Cancelled)
    }
}

/// Result type alias for Doorman operations
pub type Result<T> = std::result::Result<T, DoormanError>;

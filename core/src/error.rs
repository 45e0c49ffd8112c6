//! Error types for the killonstart-core library.

use thiserror::Error;

/// Result type alias for killonstart operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while coordinating kill-on-startup terminations.
///
/// The first four variants are local validation failures. Presentation
/// layers are expected to render them as a disabled control rather than
/// surface them to the user.
#[derive(Error, Debug)]
pub enum Error {
    /// The same process instance appeared twice in one session.
    #[error("Duplicate event for process {pid} (generation {generation})")]
    DuplicateEvent { pid: u32, generation: u64 },

    /// No event in the session matches the process instance.
    #[error("Unknown event for process {pid} (generation {generation})")]
    UnknownEvent { pid: u32, generation: u64 },

    /// The event has a zero grace period and cannot be terminated.
    #[error("Grace period expired or disabled for process {pid} (generation {generation})")]
    GracePeriodExpiredOrDisabled { pid: u32, generation: u64 },

    /// The session was dismissed and accepts no new requests.
    #[error("Session has been dismissed")]
    SessionClosed,

    /// The OS refused or failed to deliver the kill.
    #[error("Failed to kill process {pid}: {reason}")]
    KillFailed { pid: u32, reason: String },

    /// Failed to parse process information.
    #[error("Failed to parse output: {0}")]
    ParseError(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Platform not supported.
    #[error("Platform not supported: {0}")]
    UnsupportedPlatform(String),
}

impl Error {
    /// Whether this error is a local validation failure rather than an
    /// environment problem.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::DuplicateEvent { .. }
                | Error::UnknownEvent { .. }
                | Error::GracePeriodExpiredOrDisabled { .. }
                | Error::SessionClosed
        )
    }
}

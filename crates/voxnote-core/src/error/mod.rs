use error_location::ErrorLocation;
use thiserror::Error;

/// Capture session errors with source location tracking.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The platform refused microphone access (permission, busy or missing hardware).
    #[error("Microphone access denied: {reason} {location}")]
    AcquisitionDenied {
        /// Description of the refusal.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// `start` was called while a recording is still in progress.
    #[error("Recording is already in progress {location}")]
    AlreadyRecording {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// `stop` was called with nothing recording.
    #[error("No active recording to stop {location}")]
    NoActiveRecording {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The recording was cancelled before it completed.
    #[error("Recording cancelled {location}")]
    Cancelled {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The capture device or encoder failed while recording.
    #[error("Capture device fault: {reason} {location}")]
    DeviceFault {
        /// Description of the fault.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Session options were rejected.
    #[error("Invalid configuration: {reason} {location}")]
    InvalidConfiguration {
        /// Description of the rejected value.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The session task is no longer running.
    #[error("Capture session is shut down {location}")]
    SessionClosed {
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl CaptureError {
    /// True for [`CaptureError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CaptureError::Cancelled { .. })
    }
}

/// Result type alias using [`CaptureError`].
pub type Result<T> = std::result::Result<T, CaptureError>;

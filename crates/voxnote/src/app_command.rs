use uuid::Uuid;

/// Commands sent from hotkey handler to main application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Start a new recording.
    StartRecording {
        /// Unique ID for this recording.
        session_id: Uuid,
    },
    /// Stop the current recording and keep its result.
    StopRecording {
        /// ID of the recording to stop.
        session_id: Uuid,
    },
    /// Abandon the current recording.
    CancelRecording {
        /// ID of the recording to cancel.
        session_id: Uuid,
    },
}

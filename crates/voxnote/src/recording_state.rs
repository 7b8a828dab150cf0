use crate::AppCommand;

use std::time::Instant;

use uuid::Uuid;

/// Recording state for the hotkey handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    /// Not currently recording.
    Idle,
    /// Currently recording audio.
    Recording {
        /// When recording started.
        started_at: Instant,
        /// Unique session ID for log correlation.
        session_id: Uuid,
    },
}

impl RecordingState {
    /// State after `command` was delivered.
    pub fn after(self, command: &AppCommand) -> Self {
        match command {
            AppCommand::StartRecording { session_id } => RecordingState::Recording {
                started_at: Instant::now(),
                session_id: *session_id,
            },
            AppCommand::StopRecording { .. } | AppCommand::CancelRecording { .. } => {
                RecordingState::Idle
            }
        }
    }
}

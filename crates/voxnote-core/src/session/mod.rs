//! The capture session: one microphone recording at a time, with a typed
//! lifecycle event channel and a single awaitable result per recording.

mod capture_session;
mod command;
mod events;
mod mime;
mod result;
mod worker;

pub use {
    capture_session::{CaptureSession, PendingRecording, SessionOptions},
    mime::{DEFAULT_EXTENSION, DEFAULT_MIME_TYPE, extension_for_mime},
    result::RecordingResult,
};

/// Event catalog of a [`CaptureSession`].
pub mod recorder_events {
    pub use super::events::{
        DataAvailable, RecorderEvents, RecordingCancelled, RecordingComplete, RecordingError,
        RecordingStarted, RecordingStopped, Teardown,
    };
}

//! Voxnote Core Library
//!
//! Microphone capture sessions with a typed lifecycle event channel, built on
//! CPAL and tokio.
//!
//! # Example
//!
//! ```no_run
//! use voxnote_core::{CaptureSession, CoreResult, CpalBackend, RecordingComplete};
//!
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> CoreResult<()> {
//!     let session = CaptureSession::spawn(CpalBackend::default());
//!
//!     session.events().subscribe::<RecordingComplete, _>(|result| {
//!         println!("Captured {} bytes of {}", result.len(), result.mime_type());
//!     });
//!
//!     session.start().await?;
//!     tokio::time::sleep(Duration::from_secs(3)).await;
//!     let recording = session.stop().await?;
//!
//!     println!("Saved as .{}", recording.extension());
//!     Ok(())
//! }
//! ```

mod analysis;
mod device;
mod error;
mod events;
mod session;

pub use {
    analysis::{
        AnalysisGraph, AnalysisInput, AnalysisTap, AudioLevels, DEFAULT_FFT_SIZE, MAX_FFT_SIZE,
        MIN_FFT_SIZE, validate_fft_size,
    },
    device::{
        CaptureBackend, CaptureStream, CpalBackend, CpalStream, Encoder, EncoderSink,
        EncoderState, WAV_MIME_TYPE, WavEncoder,
    },
    error::{CaptureError, Result as CoreResult},
    events::{Event, EventBus, Listener, ListenerId, Subscription, TypedEvents},
    session::{
        CaptureSession, DEFAULT_EXTENSION, DEFAULT_MIME_TYPE, PendingRecording, RecordingResult,
        SessionOptions, extension_for_mime,
        recorder_events::{
            DataAvailable, RecorderEvents, RecordingCancelled, RecordingComplete, RecordingError,
            RecordingStarted, RecordingStopped, Teardown,
        },
    },
};

#[cfg(test)]
mod tests;

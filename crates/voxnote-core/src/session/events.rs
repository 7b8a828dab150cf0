use crate::{CaptureError, RecordingResult};

crate::event_catalog! {
    /// Lifecycle events published by a [`CaptureSession`](crate::CaptureSession).
    pub RecorderEvents {
        /// An encoded chunk was appended to the buffer.
        DataAvailable(Vec<u8>) = "dataAvailable";
        /// Encoding began.
        RecordingStarted(()) = "recordingStarted";
        /// The encoder finalized. Fires after `RecordingComplete`.
        RecordingStopped(()) = "recordingStopped";
        /// The assembled payload is ready.
        RecordingComplete(RecordingResult) = "recordingComplete";
        /// The recording was cancelled; carries the rejection.
        RecordingCancelled(CaptureError) = "recordingCancelled";
        /// Acquisition, stop or device failure.
        RecordingError(CaptureError) = "error";
        /// Resources are about to be released.
        Teardown(()) = "teardown";
    }
}

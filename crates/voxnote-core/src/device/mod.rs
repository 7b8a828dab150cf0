//! Capture device boundary.
//!
//! A [`CaptureBackend`] hands out exclusive [`CaptureStream`]s (the device
//! handle). A stream binds one [`Encoder`] and feeds the analysis graph. The
//! encoder reports back only through the [`EncoderSink`] it was bound with.

mod cpal_backend;
mod wav;

pub use {
    cpal_backend::{CpalBackend, CpalStream, WavEncoder},
    wav::WAV_MIME_TYPE,
};

pub(crate) use wav::encode_wav;

#[cfg(test)]
pub(crate) use cpal_backend::{MAX_PCM_SAMPLES, append_capped};

use crate::{AnalysisInput, CoreResult};

use std::future::Future;

use tokio::sync::mpsc;

/// Recording state reported by an [`Encoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderState {
    /// Not started, or stopped and finalizing/finalized.
    Inactive,
    /// Encoding captured audio.
    Recording,
}

/// Platform media-device API.
pub trait CaptureBackend: Send + 'static {
    /// Device handle produced by a successful acquisition.
    type Stream: CaptureStream;

    /// Requests exclusive, audio-only access to the microphone.
    fn acquire(&mut self) -> impl Future<Output = CoreResult<Self::Stream>> + Send;
}

/// An acquired microphone stream.
pub trait CaptureStream: Send + 'static {
    /// Encoder type this stream binds.
    type Encoder: Encoder;

    /// Binds an encoder that reports through `sink`. Not started yet.
    fn bind_encoder(&mut self, sink: EncoderSink) -> CoreResult<Self::Encoder>;

    /// Starts copying captured mono samples into `input`.
    fn attach_analysis(&mut self, input: AnalysisInput) -> CoreResult<()>;

    /// Stops every hardware track. Must be idempotent and must not fail.
    fn stop_tracks(&mut self);

    /// Number of tracks still capturing.
    fn live_tracks(&self) -> usize;
}

/// Streaming encoder bound to a [`CaptureStream`].
///
/// After [`stop`](Encoder::stop) the encoder flushes any remaining data
/// through [`EncoderSink::data_available`] and then calls
/// [`EncoderSink::finalized`], possibly later and from another thread.
pub trait Encoder: Send + 'static {
    /// Begins encoding.
    fn start(&mut self) -> CoreResult<()>;

    /// Asks the encoder to finalize. No-op unless recording.
    fn stop(&mut self);

    /// Current state.
    fn state(&self) -> EncoderState;

    /// Negotiated MIME type, if known.
    fn mime_type(&self) -> Option<String>;
}

/// Callbacks an encoder raises.
#[derive(Debug)]
pub(crate) enum EncoderEvent {
    DataAvailable(Vec<u8>),
    Finalized,
    Fault(String),
}

/// Callback surface handed to an [`Encoder`].
///
/// Every method is non-blocking and safe to call from an audio thread. Once
/// the session detaches (teardown) calls are dropped and return `false`.
#[derive(Debug, Clone)]
pub struct EncoderSink {
    tx: mpsc::UnboundedSender<EncoderEvent>,
}

impl EncoderSink {
    pub(crate) fn new(tx: mpsc::UnboundedSender<EncoderEvent>) -> Self {
        Self { tx }
    }

    /// Delivers one encoded chunk.
    pub fn data_available(&self, chunk: Vec<u8>) -> bool {
        self.tx.send(EncoderEvent::DataAvailable(chunk)).is_ok()
    }

    /// Signals that every chunk has been delivered.
    pub fn finalized(&self) -> bool {
        self.tx.send(EncoderEvent::Finalized).is_ok()
    }

    /// Reports a runtime failure of the device or encoder.
    pub fn fault(&self, reason: impl Into<String>) -> bool {
        self.tx.send(EncoderEvent::Fault(reason.into())).is_ok()
    }

    /// False once the session has detached these callbacks.
    pub fn is_attached(&self) -> bool {
        !self.tx.is_closed()
    }
}

use crate::{
    AnalysisTap, CaptureError, CoreResult, DEFAULT_FFT_SIZE, RecordingResult,
    analysis::validate_fft_size,
    device::CaptureBackend,
    events::TypedEvents,
    session::{command::SessionCommand, events::RecorderEvents, worker::SessionWorker},
};

use std::{
    fmt,
    future::Future,
    panic::Location,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use error_location::ErrorLocation;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, instrument};

/// Tunables for a [`CaptureSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Transform size of the analysis tap.
    pub fft_size: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            fft_size: DEFAULT_FFT_SIZE,
        }
    }
}

/// Handle to a microphone capture session.
///
/// The session state lives in a task spawned on the current tokio runtime.
/// Every handle operation is queued to that task in call order, together
/// with the encoder's callbacks, so operations never interleave. Handles are
/// cheap to clone; when the last one is dropped the task tears the session
/// down and exits.
///
/// # Lifecycle
///
/// ```text
/// idle → acquiring → recording → stopping → completed → idle
///                        │            └──→ errored → idle
///                        └─ cancel ─→ cancelled → idle
/// ```
#[derive(Clone)]
pub struct CaptureSession {
    commands: mpsc::UnboundedSender<SessionCommand>,
    events: Arc<TypedEvents<RecorderEvents>>,
}

impl CaptureSession {
    /// Spawns a session over `backend` with default options.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<B: CaptureBackend>(backend: B) -> Self {
        let events = Arc::new(TypedEvents::new());
        let (commands, rx) = mpsc::unbounded_channel();

        let worker = SessionWorker::new(backend, Arc::clone(&events), DEFAULT_FFT_SIZE);
        tokio::spawn(worker.run(rx));

        Self { commands, events }
    }

    /// Spawns a session over `backend` with `options`.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::InvalidConfiguration`] for an unusable FFT size.
    #[track_caller]
    pub fn spawn_with<B: CaptureBackend>(backend: B, options: SessionOptions) -> CoreResult<Self> {
        validate_fft_size(options.fft_size)?;

        let events = Arc::new(TypedEvents::new());
        let (commands, rx) = mpsc::unbounded_channel();

        let worker = SessionWorker::new(backend, Arc::clone(&events), options.fft_size);
        tokio::spawn(worker.run(rx));

        info!(fft_size = options.fft_size, "Capture session spawned");

        Ok(Self { commands, events })
    }

    /// Typed event channel the session publishes on.
    pub fn events(&self) -> &TypedEvents<RecorderEvents> {
        &self.events
    }

    /// Acquires the microphone and starts recording.
    ///
    /// # Errors
    ///
    /// [`CaptureError::AlreadyRecording`] while a recording is running or
    /// finalizing. Acquisition and encoder failures are returned and also
    /// published as `RecordingError`.
    #[instrument(skip(self))]
    pub async fn start(&self) -> CoreResult<()> {
        let (reply, response) = oneshot::channel();
        self.send(SessionCommand::Start { reply })?;
        response.await.map_err(|_| session_closed(Location::caller()))?
    }

    /// Stops recording and returns the single outstanding result.
    ///
    /// Never fails synchronously. With nothing recording the returned future
    /// resolves to [`CaptureError::NoActiveRecording`] and one
    /// `RecordingError` event is published.
    pub fn stop(&self) -> PendingRecording {
        let (reply, response) = oneshot::channel();
        let sent = self.send(SessionCommand::Stop { reply });

        PendingRecording {
            inner: Box::pin(async move {
                sent?;
                let result = response
                    .await
                    .map_err(|_| session_closed(Location::caller()))??;

                // A dropped sender means the session was torn down before the
                // encoder finalized.
                result.await.unwrap_or_else(|_| {
                    Err(CaptureError::Cancelled {
                        location: ErrorLocation::from(Location::caller()),
                    })
                })
            }),
        }
    }

    /// Cancels the current recording, if any, and tears the session down.
    pub fn cancel(&self) {
        let _ = self.send(SessionCommand::Cancel);
    }

    /// Releases every resource the session holds. Idempotent.
    pub fn teardown(&self) {
        let _ = self.send(SessionCommand::Teardown);
    }

    /// Whether a device is held and its encoder is recording.
    ///
    /// Answered after every previously queued operation; `false` once the
    /// session task is gone.
    pub async fn is_recording(&self) -> bool {
        let (reply, response) = oneshot::channel();
        if self.send(SessionCommand::IsRecording { reply }).is_err() {
            return false;
        }
        response.await.unwrap_or(false)
    }

    /// The current analysis tap, if a recording cycle has one.
    ///
    /// Do not keep it across a teardown; it goes stale.
    pub async fn analysis_tap(&self) -> Option<AnalysisTap> {
        let (reply, response) = oneshot::channel();
        self.send(SessionCommand::AnalysisTap { reply }).ok()?;
        response.await.ok().flatten()
    }

    #[track_caller]
    fn send(&self, command: SessionCommand) -> CoreResult<()> {
        self.commands
            .send(command)
            .map_err(|_| session_closed(Location::caller()))
    }
}

impl fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSession")
            .field("closed", &self.commands.is_closed())
            .field("events", &self.events)
            .finish()
    }
}

fn session_closed(location: &'static Location<'static>) -> CaptureError {
    CaptureError::SessionClosed {
        location: ErrorLocation::from(location),
    }
}

/// The eventual outcome of a recording, returned by [`CaptureSession::stop`].
///
/// Resolves exactly once: to the assembled [`RecordingResult`], or to the
/// error that settled the recording (`NoActiveRecording`, `Cancelled`,
/// `DeviceFault`, `SessionClosed`).
#[must_use = "the recording result is only observable by awaiting it"]
pub struct PendingRecording {
    inner: Pin<Box<dyn Future<Output = CoreResult<RecordingResult>> + Send>>,
}

impl Future for PendingRecording {
    type Output = CoreResult<RecordingResult>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl fmt::Debug for PendingRecording {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRecording").finish_non_exhaustive()
    }
}

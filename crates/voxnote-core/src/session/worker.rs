use crate::{
    AnalysisGraph, AnalysisTap, CaptureError, CoreResult, RecordingResult,
    device::{CaptureBackend, CaptureStream, Encoder, EncoderEvent, EncoderSink, EncoderState},
    events::TypedEvents,
    session::{
        command::{ResultReceiver, ResultSender, SessionCommand},
        events::{
            DataAvailable, RecorderEvents, RecordingCancelled, RecordingComplete, RecordingError,
            RecordingStarted, RecordingStopped, Teardown,
        },
    },
};

use std::{mem, panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, instrument, warn};

type EncoderOf<B> = <<B as CaptureBackend>::Stream as CaptureStream>::Encoder;

/// Everything one recording cycle owns. Only the session task touches it.
struct SessionState<B: CaptureBackend> {
    stream: Option<B::Stream>,
    encoder: Option<EncoderOf<B>>,
    encoder_events: Option<mpsc::UnboundedReceiver<EncoderEvent>>,
    chunks: Vec<Vec<u8>>,
    resolver: Option<ResultSender>,
    pending: Option<ResultReceiver>,
    graph: Option<AnalysisGraph>,
    tap: Option<AnalysisTap>,
}

impl<B: CaptureBackend> SessionState<B> {
    fn empty() -> Self {
        Self {
            stream: None,
            encoder: None,
            encoder_events: None,
            chunks: Vec::new(),
            resolver: None,
            pending: None,
            graph: None,
            tap: None,
        }
    }

    fn holds_resources(&self) -> bool {
        self.stream.is_some()
            || self.encoder.is_some()
            || self.encoder_events.is_some()
            || self.graph.is_some()
            || self.resolver.is_some()
            || self.pending.is_some()
            || !self.chunks.is_empty()
    }
}

/// The session task: owns the state record and processes commands and
/// encoder callbacks one at a time.
pub(crate) struct SessionWorker<B: CaptureBackend> {
    backend: B,
    events: Arc<TypedEvents<RecorderEvents>>,
    fft_size: usize,
    state: SessionState<B>,
}

impl<B: CaptureBackend> SessionWorker<B> {
    pub(crate) fn new(backend: B, events: Arc<TypedEvents<RecorderEvents>>, fft_size: usize) -> Self {
        Self {
            backend,
            events,
            fft_size,
            state: SessionState::empty(),
        }
    }

    /// Runs until every session handle is dropped, then tears down. A
    /// panicking subscriber ends the task early; `Drop` releases the cycle.
    pub(crate) async fn run(mut self, mut commands: mpsc::UnboundedReceiver<SessionCommand>) {
        loop {
            tokio::select! {
                // Callbacks already queued are handled before the next command.
                biased;

                event = next_encoder_event(&mut self.state.encoder_events) => match event {
                    Some(event) => self.handle_encoder_event(event),
                    None => self.state.encoder_events = None,
                },

                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
            }
        }

        self.teardown();
        debug!("Capture session task stopped");
    }

    async fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Start { reply } => {
                let _ = reply.send(self.start().await);
            }
            SessionCommand::Stop { reply } => {
                let _ = reply.send(self.stop());
            }
            SessionCommand::Cancel => self.cancel(),
            SessionCommand::Teardown => self.teardown(),
            SessionCommand::IsRecording { reply } => {
                let _ = reply.send(self.is_recording());
            }
            SessionCommand::AnalysisTap { reply } => {
                let _ = reply.send(self.state.tap.clone());
            }
        }
    }

    fn is_recording(&self) -> bool {
        self.state.stream.is_some()
            && self
                .state
                .encoder
                .as_ref()
                .is_some_and(|encoder| encoder.state() == EncoderState::Recording)
    }

    /// Stopped but the encoder has not delivered its final chunk yet.
    fn is_finalizing(&self) -> bool {
        self.state.resolver.is_some()
            && self
                .state
                .encoder
                .as_ref()
                .is_some_and(|encoder| encoder.state() != EncoderState::Recording)
    }

    #[instrument(skip(self))]
    async fn start(&mut self) -> CoreResult<()> {
        if self.is_recording() || self.is_finalizing() {
            warn!("Start requested while a recording is in progress");
            return Err(CaptureError::AlreadyRecording {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        match self.begin().await {
            Ok(()) => {
                info!(fft_size = self.fft_size, "Recording started");
                self.events.emit::<RecordingStarted>(&());
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Error starting recording");
                self.release();
                self.events.emit::<RecordingError>(&e);
                Err(e)
            }
        }
    }

    /// Acquires the microphone and wires up one recording cycle. Every
    /// resource is stored as soon as it exists so a failure part-way through
    /// can be released by [`release`](Self::release).
    async fn begin(&mut self) -> CoreResult<()> {
        let state = &mut self.state;
        let stream = state.stream.insert(self.backend.acquire().await?);

        let (tx, rx) = mpsc::unbounded_channel();
        state.encoder_events = Some(rx);
        state.chunks.clear();

        let encoder = state.encoder.insert(stream.bind_encoder(EncoderSink::new(tx))?);

        let (resolver, pending) = oneshot::channel();
        state.resolver = Some(resolver);
        state.pending = Some(pending);

        let graph = state.graph.insert(AnalysisGraph::new(self.fft_size)?);
        stream.attach_analysis(graph.input())?;
        state.tap = Some(graph.tap());

        encoder.start()
    }

    #[instrument(skip(self))]
    fn stop(&mut self) -> CoreResult<ResultReceiver> {
        if !self.is_recording() {
            let e = CaptureError::NoActiveRecording {
                location: ErrorLocation::from(Location::caller()),
            };
            warn!("Stop requested with no active recording");
            self.events.emit::<RecordingError>(&e);
            return Err(e);
        }

        if let Some(encoder) = self.state.encoder.as_mut() {
            encoder.stop();
        }

        // Release the microphone now; the encoder finishes from what it has.
        if let Some(stream) = self.state.stream.as_mut() {
            stream.stop_tracks();
        }

        info!(chunks = self.state.chunks.len(), "Recording stopping");

        self.state
            .pending
            .take()
            .ok_or(CaptureError::NoActiveRecording {
                location: ErrorLocation::from(Location::caller()),
            })
    }

    #[instrument(skip(self))]
    fn cancel(&mut self) {
        if self.is_recording() {
            if let Some(encoder) = self.state.encoder.as_mut() {
                encoder.stop();
            }

            if let Some(resolver) = self.state.resolver.take() {
                let e = CaptureError::Cancelled {
                    location: ErrorLocation::from(Location::caller()),
                };
                info!("Recording cancelled");
                self.events.emit::<RecordingCancelled>(&e);
                let _ = resolver.send(Err(e));
            }
        }

        self.teardown();
    }

    fn handle_encoder_event(&mut self, event: EncoderEvent) {
        match event {
            EncoderEvent::DataAvailable(chunk) => {
                debug!(bytes = chunk.len(), "Chunk buffered");
                self.state.chunks.push(chunk);
                if let Some(chunk) = self.state.chunks.last() {
                    self.events.emit::<DataAvailable>(chunk);
                }
            }
            EncoderEvent::Finalized => self.finalize(),
            EncoderEvent::Fault(reason) => self.fault(reason),
        }
    }

    #[instrument(skip(self))]
    fn finalize(&mut self) {
        let mime_type = self.state.encoder.as_ref().and_then(Encoder::mime_type);
        let chunks = mem::take(&mut self.state.chunks);
        let result = RecordingResult::assemble(chunks, mime_type);

        info!(
            bytes = result.len(),
            mime_type = result.mime_type(),
            extension = result.extension(),
            "Recording complete"
        );

        if let Some(resolver) = self.state.resolver.take() {
            self.events.emit::<RecordingComplete>(&result);
            if resolver.send(Ok(result)).is_err() {
                debug!("Recording result dropped by caller");
            }
        }

        self.events.emit::<RecordingStopped>(&());
        self.teardown();
    }

    #[instrument(skip(self))]
    fn fault(&mut self, reason: String) {
        let e = CaptureError::DeviceFault {
            reason,
            location: ErrorLocation::from(Location::caller()),
        };
        error!(error = %e, "Capture device failed while recording");

        self.events.emit::<RecordingError>(&e);
        if let Some(resolver) = self.state.resolver.take() {
            let _ = resolver.send(Err(e));
        }

        self.teardown();
    }

    /// Announces and releases everything the current cycle holds. A no-op
    /// when nothing is held.
    fn teardown(&mut self) {
        if !self.state.holds_resources() {
            return;
        }

        self.events.emit::<Teardown>(&());
        self.release();
    }

    fn release(&mut self) {
        // Detach first: anything the encoder queues from here on is dropped.
        self.state.encoder_events = None;
        self.state.encoder = None;

        if let Some(mut stream) = self.state.stream.take() {
            stream.stop_tracks();
        }

        if let Some(graph) = self.state.graph.take()
            && !graph.close()
        {
            debug!("Analysis graph already closed");
        }
        self.state.tap = None;

        self.state.chunks = Vec::new();
        self.state.resolver = None;
        self.state.pending = None;

        debug!("Session resources released");
    }
}

impl<B: CaptureBackend> Drop for SessionWorker<B> {
    /// Also runs when a subscriber panic unwinds the session task. Listeners
    /// are not notified here.
    fn drop(&mut self) {
        if self.state.holds_resources() {
            warn!("Session task ended while holding resources");
            self.release();
        }
    }
}

async fn next_encoder_event(
    events: &mut Option<mpsc::UnboundedReceiver<EncoderEvent>>,
) -> Option<EncoderEvent> {
    match events {
        Some(events) => events.recv().await,
        None => std::future::pending().await,
    }
}

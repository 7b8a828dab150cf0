use crate::{AppCommand, AppResult, Notifier, RecordingSink, UiCommand};

use tao::event_loop::EventLoopProxy;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use voxnote_core::{
    CaptureSession, RecordingCancelled, RecordingComplete, RecordingError, Subscription,
};

/// Main application state.
///
/// Runs on the async runtime thread. Asks the main thread to exit through
/// `ui_proxy` because the `tao` event loop must stay on the UI thread.
pub struct App {
    pub(crate) session: CaptureSession,
    pub(crate) sink: Option<RecordingSink>,
    pub(crate) notifier: Notifier,
    pub(crate) ui_proxy: EventLoopProxy<UiCommand>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    /// Tells the hotkey handler a recording ended without its involvement.
    pub(crate) ended_tx: mpsc::UnboundedSender<Uuid>,
    /// Recording the hotkeys believe is running.
    pub(crate) active: Option<Uuid>,
}

/// The app's subscriptions on the session event channel.
struct SessionSubscriptions {
    error: Subscription<RecordingError>,
    cancelled: Subscription<RecordingCancelled>,
    complete: Subscription<RecordingComplete>,
}

impl SessionSubscriptions {
    /// Forwards session errors to `notice_tx` and logs the rest.
    fn attach(session: &CaptureSession, notice_tx: mpsc::UnboundedSender<String>) -> Self {
        let events = session.events();

        let error = events.subscribe::<RecordingError, _>(move |e| {
            warn!(error = %e, "Recording error");
            let _ = notice_tx.send(e.to_string());
        });

        let cancelled = events.subscribe::<RecordingCancelled, _>(|_| {
            info!("Recording cancelled");
        });

        let complete = events.subscribe::<RecordingComplete, _>(|recording| {
            debug!(
                bytes = recording.len(),
                mime_type = recording.mime_type(),
                "Recording complete"
            );
        });

        Self {
            error,
            cancelled,
            complete,
        }
    }

    fn withdraw(self, session: &CaptureSession) {
        let events = session.events();
        events.unsubscribe(&self.error);
        events.unsubscribe(&self.cancelled);
        events.unsubscribe(&self.complete);
    }
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Voxnote starting");

        let (notice_tx, mut notice_rx) = mpsc::unbounded_channel();
        let subscriptions = SessionSubscriptions::attach(&self.session, notice_tx);

        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        AppCommand::StartRecording { session_id } => {
                            match self.start_recording(session_id).await {
                                Ok(()) => self.active = Some(session_id),
                                Err(e) => {
                                    error!(session_id = %session_id, error = ?e, "Failed to start recording");
                                    self.report_ended(session_id);
                                }
                            }
                        }
                        AppCommand::StopRecording { session_id } => {
                            self.active = None;
                            self.stop_recording(session_id);
                        }
                        AppCommand::CancelRecording { session_id } => {
                            info!(session_id = %session_id, "Cancelling recording");
                            self.active = None;
                            self.session.cancel();
                        }
                    }
                }

                Some(message) = notice_rx.recv() => {
                    self.show_notice(message);
                    self.sync_after_error().await;
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupt received, shutting down");
                    break;
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        // Unload: abandon any recording, release the device, stop listening.
        self.session.cancel();
        self.session.teardown();
        subscriptions.withdraw(&self.session);

        let _ = self.shutdown_tx.send(true);
        if self.ui_proxy.send_event(UiCommand::Shutdown).is_err() {
            debug!("Event loop already closed");
        }

        info!("Voxnote shut down successfully");

        Ok(())
    }

    /// Start a recording. Failures also reach the user as a notice.
    #[instrument(skip(self))]
    async fn start_recording(&self, session_id: Uuid) -> AppResult<()> {
        self.session.start().await?;
        info!(session_id = %session_id, "Recording started");
        Ok(())
    }

    /// Stop recording and save the result in the background.
    #[instrument(skip(self))]
    fn stop_recording(&self, session_id: Uuid) {
        let pending = self.session.stop();
        let sink = self.sink.clone();

        tokio::spawn(async move {
            let recording = match pending.await {
                Ok(recording) => recording,
                Err(e) if e.is_cancelled() => {
                    info!(session_id = %session_id, "Recording discarded");
                    return;
                }
                Err(e) => {
                    error!(session_id = %session_id, error = ?e, "Recording failed");
                    return;
                }
            };

            info!(
                session_id = %session_id,
                bytes = recording.len(),
                extension = recording.extension(),
                "Recording finished"
            );

            let Some(sink) = sink else {
                return;
            };

            match tokio::task::spawn_blocking(move || sink.write(session_id, &recording)).await {
                Ok(Ok(path)) => debug!(session_id = %session_id, path = ?path, "Recording written"),
                Ok(Err(e)) => error!(session_id = %session_id, error = ?e, "Failed to save recording"),
                Err(e) => error!(session_id = %session_id, error = ?e, "Save task panicked"),
            }
        });
    }

    /// A session error may have ended the active recording (device fault).
    async fn sync_after_error(&mut self) {
        let Some(session_id) = self.active else {
            return;
        };

        if !self.session.is_recording().await {
            self.active = None;
            self.report_ended(session_id);
        }
    }

    fn report_ended(&self, session_id: Uuid) {
        if self.ended_tx.send(session_id).is_err() {
            debug!(session_id = %session_id, "Hotkey handler already stopped");
        }
    }

    fn show_notice(&self, message: String) {
        let notifier = self.notifier;
        tokio::spawn(async move {
            if let Err(e) = notifier.show(&message).await {
                warn!(error = ?e, "Failed to show notice");
            }
        });
    }
}

//! Global hotkey handler with recording state machine.
//!
//! Registers CTRL+SHIFT+Space as the record hotkey and CTRL+SHIFT+Escape as
//! the cancel hotkey. In push-to-talk mode pressing the record hotkey starts
//! a recording and releasing it stops; otherwise each press toggles. Uses
//! async channels to communicate with the main application.

use crate::{AppCommand, AppError, AppResult, RecordingState};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use global_hotkey::{
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
    hotkey::{Code, HotKey, Modifiers},
};
use tokio::sync::{Mutex, mpsc, watch};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Which registered hotkey fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyKind {
    /// Start/stop recording.
    Record,
    /// Abandon the current recording.
    Cancel,
}

/// IDs of the registered hotkeys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyIds {
    /// ID of CTRL+SHIFT+Space.
    pub record: u32,
    /// ID of CTRL+SHIFT+Escape.
    pub cancel: u32,
}

impl HotkeyIds {
    /// Which hotkey `id` belongs to, if any.
    pub fn kind(&self, id: u32) -> Option<HotkeyKind> {
        if id == self.record {
            Some(HotkeyKind::Record)
        } else if id == self.cancel {
            Some(HotkeyKind::Cancel)
        } else {
            None
        }
    }
}

/// Command a hotkey transition should send, if any.
///
/// Key repeats arrive as extra presses and never start a second recording.
pub fn next_command(
    state: &RecordingState,
    kind: HotkeyKind,
    key_state: HotKeyState,
    push_to_talk: bool,
) -> Option<AppCommand> {
    match (kind, key_state, state) {
        (HotkeyKind::Record, HotKeyState::Pressed, RecordingState::Idle) => {
            Some(AppCommand::StartRecording {
                session_id: Uuid::new_v4(),
            })
        }
        (HotkeyKind::Record, HotKeyState::Pressed, RecordingState::Recording { session_id, .. })
            if !push_to_talk =>
        {
            Some(AppCommand::StopRecording {
                session_id: *session_id,
            })
        }
        (HotkeyKind::Record, HotKeyState::Released, RecordingState::Recording { session_id, .. })
            if push_to_talk =>
        {
            Some(AppCommand::StopRecording {
                session_id: *session_id,
            })
        }
        (HotkeyKind::Cancel, HotKeyState::Pressed, RecordingState::Recording { session_id, .. }) => {
            Some(AppCommand::CancelRecording {
                session_id: *session_id,
            })
        }
        _ => None,
    }
}

/// Global hotkey handler with recording state machine.
pub struct HotkeyHandler {
    ids: HotkeyIds,
    push_to_talk: bool,
    state: Mutex<RecordingState>,
    command_tx: mpsc::Sender<AppCommand>,
}

impl HotkeyHandler {
    /// Register the record and cancel hotkeys.
    ///
    /// Must be called on a thread with a message pump (e.g. the main thread
    /// running a `tao` event loop) so that `WM_HOTKEY` messages are
    /// dispatched on Windows. The returned [`GlobalHotKeyManager`] must be
    /// kept alive on that thread for the hotkeys to remain registered.
    #[track_caller]
    #[instrument]
    pub fn register_hotkeys() -> AppResult<(GlobalHotKeyManager, HotkeyIds)> {
        let manager =
            GlobalHotKeyManager::new().map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to create manager: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let modifiers = Some(Modifiers::CONTROL | Modifiers::SHIFT);
        let record = HotKey::new(modifiers, Code::Space);
        let cancel = HotKey::new(modifiers, Code::Escape);

        manager
            .register(record)
            .map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to register CTRL+SHIFT+Space: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        manager
            .register(cancel)
            .map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to register CTRL+SHIFT+Escape: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(
            record = "CTRL+SHIFT+Space",
            cancel = "CTRL+SHIFT+Escape",
            "Global hotkeys registered"
        );

        Ok((
            manager,
            HotkeyIds {
                record: record.id(),
                cancel: cancel.id(),
            },
        ))
    }

    /// Create a handler for previously registered hotkeys.
    pub fn new(ids: HotkeyIds, push_to_talk: bool, command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self {
            ids,
            push_to_talk,
            state: Mutex::new(RecordingState::Idle),
            command_tx,
        }
    }

    /// Current recording state as the handler sees it.
    pub async fn state(&self) -> RecordingState {
        *self.state.lock().await
    }

    /// Run the hotkey handler event loop.
    ///
    /// `ended_rx` carries IDs of recordings that ended without a hotkey,
    /// such as a failed start or a device fault. This method blocks until a
    /// shutdown signal is received.
    #[instrument(skip_all)]
    pub async fn run(
        &self,
        mut shutdown_rx: watch::Receiver<bool>,
        mut ended_rx: mpsc::UnboundedReceiver<Uuid>,
    ) -> AppResult<()> {
        let receiver = GlobalHotKeyEvent::receiver().clone();
        let (event_tx, mut event_rx) = mpsc::channel(32);

        // GlobalHotKeyEvent::receiver() is a blocking crossbeam receiver; the
        // forwarder exits on the first send after event_rx is dropped.
        let handle = tokio::task::spawn_blocking(move || {
            while let Ok(event) = receiver.recv() {
                if event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Hotkey handler shutting down");
                    break;
                }
                Some(event) = event_rx.recv() => {
                    if let Some(kind) = self.ids.kind(event.id) {
                        self.handle_hotkey(kind, event.state).await?;
                    }
                }
                Some(session_id) = ended_rx.recv() => {
                    self.recording_ended(session_id).await;
                }
            }
        }

        drop(event_rx);

        if let RecordingState::Recording { session_id, .. } = self.state().await {
            info!(session_id = %session_id, "Hotkeys released while recording");
        }

        // The forwarder may sit in recv() until the next hotkey event.
        match tokio::time::timeout(Duration::from_secs(1), handle).await {
            Ok(Ok(())) => debug!("Hotkey event forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Hotkey event forwarder task panicked"),
            Err(_) => debug!(
                "Hotkey event forwarder did not stop within timeout, \
                   will be cleaned up on exit"
            ),
        }

        Ok(())
    }

    /// Return to `Idle` if `session_id` is still the recording in progress.
    ///
    /// The next record press then starts a fresh recording instead of
    /// stopping one the session no longer has.
    #[instrument(skip(self))]
    pub async fn recording_ended(&self, session_id: Uuid) {
        let mut state = self.state.lock().await;

        match *state {
            RecordingState::Recording {
                session_id: current,
                ..
            } if current == session_id => {
                info!(session_id = %session_id, "Recording ended outside the hotkeys");
                *state = RecordingState::Idle;
            }
            _ => debug!(session_id = %session_id, "Ended recording is not current"),
        }
    }

    /// Apply one hotkey transition.
    ///
    /// The command is sent first; the state only changes once it was
    /// delivered, so a closed channel leaves the state untouched.
    #[instrument(skip(self))]
    pub async fn handle_hotkey(&self, kind: HotkeyKind, key_state: HotKeyState) -> AppResult<()> {
        let mut state = self.state.lock().await;

        let Some(command) = next_command(&state, kind, key_state, self.push_to_talk) else {
            return Ok(());
        };

        self.command_tx
            .send(command.clone())
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send {:?}: {}", command, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        if let RecordingState::Recording { started_at, .. } = *state {
            info!(
                command = ?command,
                duration_ms = started_at.elapsed().as_millis(),
                "Recording ended by hotkey"
            );
        } else {
            info!(command = ?command, "Recording requested by hotkey");
        }

        *state = state.after(&command);

        Ok(())
    }
}

//! Voxnote: push-to-talk microphone recorder with global hotkey control.

mod app;
mod app_command;
mod config;
mod error;
mod hotkey_handler;
mod logging;
mod notifier;
mod recording_sink;
mod recording_state;
mod ui_command;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
    hotkey_handler::HotkeyHandler,
    notifier::Notifier,
    recording_sink::RecordingSink,
    recording_state::RecordingState,
    ui_command::UiCommand,
};

use crate::config::Config;

use global_hotkey::GlobalHotKeyManager;
use tao::{
    event::{Event, StartCause},
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tokio::sync::{mpsc, watch};
use tracing::error;
use voxnote_core::{CaptureSession, CpalBackend, SessionOptions};

/// Application entry point.
fn main() {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    // Dropping the guard flushes the log file, so it lives as long as main.
    let _log_guard = match Config::log_dir().and_then(|dir| logging::init(&dir)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialise logging: {e}");
            std::process::exit(1);
        }
    };

    let event_loop = EventLoopBuilder::<UiCommand>::with_user_event().build();
    let ui_proxy = event_loop.create_proxy();

    // Persists across event loop iterations; dropping it unregisters the hotkeys.
    let mut hotkey_manager: Option<GlobalHotKeyManager> = None;
    let mut config = Some(config);

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(UiCommand::Shutdown) => {
                *control_flow = ControlFlow::ExitWithCode(0);
            }
            Event::NewEvents(StartCause::Init) => {
                let Some(config) = config.take() else {
                    return;
                };

                let sink = if config.behavior.save_recordings {
                    match config.recordings_dir() {
                        Ok(dir) => Some(RecordingSink::new(dir)),
                        Err(e) => {
                            error!("Failed to resolve recordings directory: {:?}", e);
                            std::process::exit(1);
                        }
                    }
                } else {
                    None
                };

                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
                    CFRunLoopWakeUp(CFRunLoopGetMain());
                }

                let (command_tx, command_rx) = mpsc::channel(32);
                let (shutdown_tx, shutdown_rx) = watch::channel(false);
                let (ended_tx, ended_rx) = mpsc::unbounded_channel();

                // Registered on the main thread: tao's event loop pumps the
                // messages needed for WM_HOTKEY delivery on Windows.
                let (manager, hotkey_ids) = match HotkeyHandler::register_hotkeys() {
                    Ok(pair) => pair,
                    Err(e) => {
                        error!("Failed to register hotkeys: {:?}", e);
                        std::process::exit(1);
                    }
                };
                hotkey_manager = Some(manager);

                let ui_proxy = ui_proxy.clone();

                // The capture session and app run on a tokio runtime thread;
                // the event loop and hotkey manager stay on the main thread.
                std::thread::spawn(move || {
                    let rt = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("Failed to create tokio runtime: {:?}", e);
                            std::process::exit(1);
                        }
                    };

                    rt.block_on(async {
                        let backend = CpalBackend::with_device(config.audio.selected_device.clone());
                        let options = SessionOptions {
                            fft_size: config.audio.fft_size,
                        };
                        let session = match CaptureSession::spawn_with(backend, options) {
                            Ok(session) => session,
                            Err(e) => {
                                error!("Failed to create capture session: {:?}", e);
                                std::process::exit(1);
                            }
                        };

                        let hotkey_handler = HotkeyHandler::new(
                            hotkey_ids,
                            config.behavior.push_to_talk,
                            command_tx,
                        );

                        let app = App {
                            session,
                            sink,
                            notifier: Notifier::new(config.behavior.notice_timeout_ms),
                            ui_proxy,
                            command_rx,
                            shutdown_tx,
                            ended_tx,
                            active: None,
                        };

                        tokio::join!(
                            async {
                                if let Err(e) = hotkey_handler.run(shutdown_rx, ended_rx).await {
                                    error!(error = ?e, "Hotkey handler error");
                                }
                            },
                            async {
                                if let Err(e) = app.run().await {
                                    error!(error = ?e, "App error");
                                }
                            }
                        );
                    });
                });
            }
            _ => {}
        }

        // Keep hotkey_manager alive in the closure for the app's lifetime.
        let _ = &hotkey_manager;
    });
}

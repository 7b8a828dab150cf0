//! Transient desktop notices for recording failures.

use crate::{AppError, AppResult};

use std::panic::Location;

use error_location::ErrorLocation;
use notify_rust::{Notification, Timeout};
use tracing::{debug, instrument};

const APP_NAME: &str = "Voxnote";

/// Shows auto-dismissing notices.
#[derive(Debug, Clone, Copy)]
pub struct Notifier {
    timeout_ms: u32,
}

impl Notifier {
    /// Notices disappear after `timeout_ms` milliseconds.
    pub fn new(timeout_ms: u32) -> Self {
        Self { timeout_ms }
    }

    /// Builds the notification for `message` without showing it.
    pub fn notification(&self, message: &str) -> Notification {
        let mut notification = Notification::new();
        notification
            .appname(APP_NAME)
            .summary("Recording failed")
            .body(message)
            .timeout(Timeout::Milliseconds(self.timeout_ms));
        notification
    }

    /// Shows a notice for `message`.
    ///
    /// Runs on the blocking pool since some platforms wait on the
    /// notification server.
    #[instrument(skip(self))]
    pub async fn show(&self, message: &str) -> AppResult<()> {
        let notification = self.notification(message);

        tokio::task::spawn_blocking(move || notification.show().map(|_| ()))
            .await
            .map_err(|e| AppError::NoticeFailed {
                reason: format!("Notice task panicked: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .map_err(|e| AppError::NoticeFailed {
                reason: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!(timeout_ms = self.timeout_ms, "Notice shown");

        Ok(())
    }
}

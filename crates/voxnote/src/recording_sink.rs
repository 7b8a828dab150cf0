//! Writes finished recordings to disk.

use crate::{AppError, AppResult};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::PathBuf,
};

use error_location::ErrorLocation;
use tracing::{info, instrument};
use uuid::Uuid;
use voxnote_core::RecordingResult;

/// Destination directory for finished recordings.
#[derive(Debug, Clone)]
pub struct RecordingSink {
    dir: PathBuf,
}

impl RecordingSink {
    /// Writes into `dir`, creating it on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File name for recording `session_id` with `extension`.
    pub fn file_name(session_id: Uuid, extension: &str) -> String {
        format!("recording-{}.{}", session_id, extension)
    }

    /// Writes `recording` as `recording-<session_id>.<extension>`.
    ///
    /// Uses the same temp-then-rename pattern as the config file so a crash
    /// never leaves a truncated recording behind.
    #[track_caller]
    #[instrument(skip(self, recording), fields(bytes = recording.len()))]
    pub fn write(&self, session_id: Uuid, recording: &RecordingResult) -> AppResult<PathBuf> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }

        let path = self
            .dir
            .join(Self::file_name(session_id, recording.extension()));
        let temp_path = path.with_extension("part");

        let mut file = fs::File::create(&temp_path)?;
        file.write_all(recording.payload())?;
        file.sync_all()?;

        fs::rename(&temp_path, &path).map_err(|e| AppError::IoError {
            source: e,
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(path = ?path, mime_type = recording.mime_type(), "Recording saved");

        Ok(path)
    }
}

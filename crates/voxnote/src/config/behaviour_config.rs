use crate::config::{default_notice_timeout_ms, default_push_to_talk, default_save_recordings};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// Hold the record hotkey to record (`true`) or press it to toggle.
    #[serde(default = "default_push_to_talk")]
    pub push_to_talk: bool,

    /// Whether finished recordings are written to `output_dir`.
    #[serde(default = "default_save_recordings")]
    pub save_recordings: bool,

    /// Where recordings are written (None = `<data dir>/recordings`).
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// How long error notices stay on screen.
    #[serde(default = "default_notice_timeout_ms")]
    pub notice_timeout_ms: u32,
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self {
            push_to_talk: default_push_to_talk(),
            save_recordings: default_save_recordings(),
            output_dir: None,
            notice_timeout_ms: default_notice_timeout_ms(),
        }
    }
}

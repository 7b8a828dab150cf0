use crate::config::default_fft_size;

use serde::{Deserialize, Serialize};

/// Audio device configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Selected audio device name (None = default device).
    #[serde(default)]
    pub selected_device: Option<String>,

    /// Transform size of the live analysis tap.
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            selected_device: None,
            fft_size: default_fft_size(),
        }
    }
}

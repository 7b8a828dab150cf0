//! Real-time analysis graph fed from the captured stream.
//!
//! The session owns an [`AnalysisGraph`] per recording. The capture stream
//! writes mono samples through an [`AnalysisInput`]; visualisers read them
//! through an [`AnalysisTap`]. Closing the graph stops accepting input but
//! leaves any outstanding tap readable (it just goes stale).

pub(crate) mod spectrum;

use crate::{CaptureError, CoreResult};

use std::{
    collections::VecDeque,
    panic::Location,
    sync::{Arc, Mutex, MutexGuard},
};

use error_location::ErrorLocation;
use tracing::debug;

/// Transform size used when none is configured.
pub const DEFAULT_FFT_SIZE: usize = 256;
/// Smallest accepted transform size.
pub const MIN_FFT_SIZE: usize = 32;
/// Largest accepted transform size.
pub const MAX_FFT_SIZE: usize = 32_768;

/// RMS and peak amplitude of the current analysis window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AudioLevels {
    /// Root-mean-square amplitude, 0.0 to 1.0.
    pub rms: f32,
    /// Largest absolute sample, 0.0 to 1.0.
    pub peak: f32,
}

/// Checks that `fft_size` is a power of two within
/// [`MIN_FFT_SIZE`]..=[`MAX_FFT_SIZE`].
#[track_caller]
pub fn validate_fft_size(fft_size: usize) -> CoreResult<()> {
    if !fft_size.is_power_of_two() || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&fft_size) {
        return Err(CaptureError::InvalidConfiguration {
            reason: format!(
                "FFT size must be a power of two between {} and {}, got {}",
                MIN_FFT_SIZE, MAX_FFT_SIZE, fft_size
            ),
            location: ErrorLocation::from(Location::caller()),
        });
    }
    Ok(())
}

struct GraphState {
    window: VecDeque<f32>,
    smoothed: Vec<f32>,
    closed: bool,
}

struct GraphShared {
    fft_size: usize,
    blackman: Vec<f32>,
    state: Mutex<GraphState>,
}

impl GraphShared {
    fn lock(&self) -> MutexGuard<'_, GraphState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current window, zero-padded at the front until it has filled once.
    fn snapshot(&self) -> Vec<f32> {
        let state = self.lock();
        let mut samples = vec![0.0; self.fft_size - state.window.len()];
        samples.extend(state.window.iter().copied());
        samples
    }
}

/// Analysis graph owned by one recording cycle.
pub struct AnalysisGraph {
    shared: Arc<GraphShared>,
}

impl AnalysisGraph {
    /// Builds an open graph with a `fft_size`-point transform.
    #[track_caller]
    pub fn new(fft_size: usize) -> CoreResult<Self> {
        validate_fft_size(fft_size)?;

        Ok(Self {
            shared: Arc::new(GraphShared {
                fft_size,
                blackman: spectrum::blackman_window(fft_size),
                state: Mutex::new(GraphState {
                    window: VecDeque::with_capacity(fft_size),
                    smoothed: vec![0.0; fft_size / 2],
                    closed: false,
                }),
            }),
        })
    }

    /// Writer handed to the capture stream.
    pub fn input(&self) -> AnalysisInput {
        AnalysisInput {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Reader handed to visualisers.
    pub fn tap(&self) -> AnalysisTap {
        AnalysisTap {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Closes the graph. Returns `false` if it was already closed.
    pub fn close(&self) -> bool {
        let mut state = self.shared.lock();
        if state.closed {
            return false;
        }
        state.closed = true;
        debug!(fft_size = self.shared.fft_size, "Analysis graph closed");
        true
    }

    /// Whether [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }
}

/// Feeds captured mono samples into an [`AnalysisGraph`].
#[derive(Clone)]
pub struct AnalysisInput {
    shared: Arc<GraphShared>,
}

impl AnalysisInput {
    /// Appends samples, keeping only the newest `fft_size`. Ignored once the
    /// graph is closed.
    pub fn write(&self, samples: &[f32]) {
        let fft_size = self.shared.fft_size;
        let mut state = self.shared.lock();
        if state.closed {
            return;
        }

        let tail = &samples[samples.len().saturating_sub(fft_size)..];
        state.window.extend(tail.iter().copied());
        while state.window.len() > fft_size {
            state.window.pop_front();
        }
    }
}

/// Live frequency and amplitude view over the captured stream.
///
/// Only meaningful while the owning session is recording; a tap kept past
/// teardown keeps returning the last window it saw.
#[derive(Clone)]
pub struct AnalysisTap {
    shared: Arc<GraphShared>,
}

impl AnalysisTap {
    /// Transform size.
    pub fn fft_size(&self) -> usize {
        self.shared.fft_size
    }

    /// Number of frequency bins, half the transform size.
    pub fn frequency_bin_count(&self) -> usize {
        self.shared.fft_size / 2
    }

    /// Whether the graph behind this tap is still open.
    pub fn is_live(&self) -> bool {
        !self.shared.lock().closed
    }

    /// Smoothed spectrum in dBFS, one value per bin.
    pub fn float_frequency_data(&self) -> Vec<f32> {
        let samples = self.shared.snapshot();
        let current = spectrum::magnitudes(&samples, &self.shared.blackman);

        let mut state = self.shared.lock();
        spectrum::smooth(&mut state.smoothed, &current);
        state
            .smoothed
            .iter()
            .map(|&m| spectrum::to_decibels(m))
            .collect()
    }

    /// Smoothed spectrum scaled to 0..=255 over the -100..-30 dB range.
    pub fn byte_frequency_data(&self) -> Vec<u8> {
        self.float_frequency_data()
            .into_iter()
            .map(spectrum::decibels_to_byte)
            .collect()
    }

    /// Raw waveform of the current window.
    pub fn float_time_domain_data(&self) -> Vec<f32> {
        self.shared.snapshot()
    }

    /// Waveform scaled to bytes, 128 being silence.
    pub fn byte_time_domain_data(&self) -> Vec<u8> {
        self.shared
            .snapshot()
            .into_iter()
            .map(spectrum::sample_to_byte)
            .collect()
    }

    /// RMS and peak of the current window.
    pub fn levels(&self) -> AudioLevels {
        let samples = self.shared.snapshot();
        AudioLevels {
            rms: spectrum::rms_level(&samples),
            peak: spectrum::peak_level(&samples),
        }
    }
}

impl std::fmt::Debug for AnalysisTap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisTap")
            .field("fft_size", &self.shared.fft_size)
            .field("live", &self.is_live())
            .finish()
    }
}

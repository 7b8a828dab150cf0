use crate::{
    AnalysisInput, CaptureError, CoreResult,
    device::{CaptureBackend, CaptureStream, Encoder, EncoderSink, EncoderState, WAV_MIME_TYPE, encode_wav},
};

use std::{
    panic::Location,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
        mpsc as std_mpsc,
    },
    thread::{self, JoinHandle},
};

use cpal::{
    Device, Host, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tokio::sync::oneshot;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Clone, Copy)]
struct StreamFormat {
    sample_rate: u32,
    channels: u16,
}

/// Maximum buffered PCM samples, all channels interleaved.
///
/// **Memory footprint at max capacity:**
/// - 48,000 Hz * 2 channels * 60s * 30 min * 2 bytes/i16 = ~346MB
/// - Samples past the limit are dropped; the recording keeps its beginning
pub(crate) const MAX_PCM_SAMPLES: usize = 48_000 * 2 * 60 * 30;

struct PcmBuffer {
    state: EncoderState,
    samples: Vec<i16>,
    truncated: bool,
}

/// Appends `data` as 16-bit PCM while `samples` stays within `limit`,
/// cutting on a whole frame. Returns false if anything was dropped.
pub(crate) fn append_capped(
    samples: &mut Vec<i16>,
    data: &[f32],
    channels: usize,
    limit: usize,
) -> bool {
    let room = limit.saturating_sub(samples.len());
    let mut take = data.len().min(room);
    take -= take % channels.max(1);

    samples.extend(data[..take].iter().map(|&s| to_pcm16(s)));
    take == data.len()
}

/// State shared between the capture thread's callbacks and the session side.
struct CaptureShared {
    encoder: Mutex<PcmBuffer>,
    analysis: Mutex<Option<AnalysisInput>>,
    sink: Mutex<Option<EncoderSink>>,
    /// Signals the audio callback to stop writing. Set before the stream is
    /// dropped so a callback already in flight writes nothing.
    shutdown: AtomicBool,
}

impl CaptureShared {
    fn new() -> Self {
        Self {
            encoder: Mutex::new(PcmBuffer {
                state: EncoderState::Inactive,
                samples: Vec::new(),
                truncated: false,
            }),
            analysis: Mutex::new(None),
            sink: Mutex::new(None),
            shutdown: AtomicBool::new(false),
        }
    }

    fn capture(&self, data: &[f32], channels: usize) {
        if self.shutdown.load(Ordering::Acquire) {
            return;
        }

        {
            let mut encoder = lock(&self.encoder);
            if encoder.state == EncoderState::Recording {
                let complete =
                    append_capped(&mut encoder.samples, data, channels, MAX_PCM_SAMPLES);
                if !complete && !encoder.truncated {
                    encoder.truncated = true;
                    warn!(
                        max_samples = MAX_PCM_SAMPLES,
                        "Recording length limit reached, dropping further audio"
                    );
                }
            }
        }

        if let Some(input) = lock(&self.analysis).as_ref() {
            if channels <= 1 {
                input.write(data);
            } else {
                input.write(&downmix_to_mono(data, channels));
            }
        }
    }

    fn fault(&self, reason: String) {
        error!("Audio stream error: {}", reason);
        if let Some(sink) = lock(&self.sink).as_ref() {
            sink.fault(reason);
        }
    }
}

// Recover from lock poison rather than silently dropping audio. A poisoned
// mutex means a previous holder panicked, but the data is still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| {
        error!("Capture lock poisoned, recovering: {}", e);
        e.into_inner()
    })
}

fn to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}

fn downmix_to_mono(data: &[f32], channels: usize) -> Vec<f32> {
    data.chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Microphone backend on top of cpal.
///
/// cpal streams are not `Send` on every platform, so each acquisition runs
/// its stream on a dedicated capture thread that lives until the tracks are
/// stopped.
#[derive(Debug, Clone, Default)]
pub struct CpalBackend {
    device_name: Option<String>,
}

impl CpalBackend {
    /// Uses the host's default input device.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the input device with this name, or the default one for `None`.
    pub fn with_device(device_name: Option<String>) -> Self {
        Self { device_name }
    }
}

impl CaptureBackend for CpalBackend {
    type Stream = CpalStream;

    #[instrument(skip(self), fields(device = ?self.device_name))]
    async fn acquire(&mut self) -> CoreResult<CpalStream> {
        let device_name = self.device_name.clone();
        let shared = Arc::new(CaptureShared::new());
        let (ready_tx, ready_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = std_mpsc::channel();

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("voxnote-capture".into())
            .spawn(move || run_capture_thread(device_name, worker_shared, stop_rx, ready_tx))
            .map_err(|e| CaptureError::AcquisitionDenied {
                reason: format!("Failed to spawn capture thread: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let format = match ready_rx.await {
            Ok(Ok(format)) => format,
            Ok(Err(e)) => {
                let _ = worker.join();
                return Err(e);
            }
            Err(_) => {
                let _ = worker.join();
                return Err(CaptureError::AcquisitionDenied {
                    reason: "Capture thread exited before opening the microphone".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        Ok(CpalStream {
            shared,
            format,
            stop_tx: Some(stop_tx),
            worker: Some(worker),
        })
    }
}

fn run_capture_thread(
    device_name: Option<String>,
    shared: Arc<CaptureShared>,
    stop_rx: std_mpsc::Receiver<()>,
    ready: oneshot::Sender<CoreResult<StreamFormat>>,
) {
    let stream = match open_input_stream(device_name.as_deref(), &shared) {
        Ok((stream, format)) => {
            if ready.send(Ok(format)).is_err() {
                debug!("Acquisition abandoned, releasing microphone");
                return;
            }
            stream
        }
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    // Blocks until stop_tracks() runs or the CpalStream is dropped.
    let _ = stop_rx.recv();

    shared.shutdown.store(true, Ordering::Release);
    drop(stream);
    info!("Microphone tracks stopped");
}

#[track_caller]
fn open_input_stream(
    device_name: Option<&str>,
    shared: &Arc<CaptureShared>,
) -> CoreResult<(Stream, StreamFormat)> {
    let host = cpal::default_host();
    let device = select_device(&host, device_name)?;

    let config: StreamConfig = device
        .default_input_config()
        .map_err(|e| CaptureError::AcquisitionDenied {
            reason: format!("Failed to get config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?
        .into();

    let format = StreamFormat {
        sample_rate: config.sample_rate,
        channels: config.channels,
    };

    info!(
        device_id = ?device.id(),
        sample_rate = format.sample_rate,
        channels = format.channels,
        "Microphone acquired"
    );

    let data_shared = Arc::clone(shared);
    let error_shared = Arc::clone(shared);
    let channels = usize::from(format.channels);

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                data_shared.capture(data, channels);
            },
            move |err| {
                error_shared.fault(err.to_string());
            },
            None,
        )
        .map_err(|e| CaptureError::AcquisitionDenied {
            reason: format!("Failed to build stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    stream.play().map_err(|e| CaptureError::AcquisitionDenied {
        reason: format!("Failed to start stream: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok((stream, format))
}

#[track_caller]
#[allow(deprecated)]
fn select_device(host: &Host, device_name: Option<&str>) -> CoreResult<Device> {
    let Some(wanted) = device_name else {
        return host
            .default_input_device()
            .ok_or(CaptureError::AcquisitionDenied {
                reason: "No microphone found".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
    };

    let devices = host
        .input_devices()
        .map_err(|e| CaptureError::AcquisitionDenied {
            reason: format!("Failed to enumerate input devices: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    for device in devices {
        if device.name().is_ok_and(|name| name == wanted) {
            return Ok(device);
        }
    }

    Err(CaptureError::AcquisitionDenied {
        reason: format!("Input device '{}' not found", wanted),
        location: ErrorLocation::from(Location::caller()),
    })
}

/// Microphone stream acquired by [`CpalBackend`].
pub struct CpalStream {
    shared: Arc<CaptureShared>,
    format: StreamFormat,
    stop_tx: Option<std_mpsc::Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl CpalStream {
    /// Device sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.format.sample_rate
    }

    /// Device channel count.
    pub fn channels(&self) -> u16 {
        self.format.channels
    }
}

impl CaptureStream for CpalStream {
    type Encoder = WavEncoder;

    fn bind_encoder(&mut self, sink: EncoderSink) -> CoreResult<WavEncoder> {
        *lock(&self.shared.sink) = Some(sink.clone());

        Ok(WavEncoder {
            shared: Arc::clone(&self.shared),
            format: self.format,
            sink,
        })
    }

    fn attach_analysis(&mut self, input: AnalysisInput) -> CoreResult<()> {
        *lock(&self.shared.analysis) = Some(input);
        Ok(())
    }

    #[instrument(skip(self))]
    fn stop_tracks(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);

        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            warn!("Capture thread panicked while stopping");
        }
    }

    fn live_tracks(&self) -> usize {
        usize::from(self.worker.is_some())
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        self.stop_tracks();
    }
}

/// Buffers captured audio as 16-bit PCM and emits a single WAV chunk when
/// stopped.
pub struct WavEncoder {
    shared: Arc<CaptureShared>,
    format: StreamFormat,
    sink: EncoderSink,
}

impl Encoder for WavEncoder {
    #[track_caller]
    fn start(&mut self) -> CoreResult<()> {
        if self.shared.shutdown.load(Ordering::Acquire) {
            return Err(CaptureError::DeviceFault {
                reason: "Microphone tracks already stopped".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut encoder = lock(&self.shared.encoder);
        encoder.samples.clear();
        encoder.truncated = false;
        encoder.state = EncoderState::Recording;

        debug!(
            sample_rate = self.format.sample_rate,
            channels = self.format.channels,
            "WAV encoder started"
        );

        Ok(())
    }

    #[instrument(skip(self))]
    fn stop(&mut self) {
        let samples = {
            let mut encoder = lock(&self.shared.encoder);
            if encoder.state != EncoderState::Recording {
                return;
            }
            encoder.state = EncoderState::Inactive;
            std::mem::take(&mut encoder.samples)
        };

        debug!(sample_count = samples.len(), "Finalizing WAV payload");

        match encode_wav(&samples, self.format.channels, self.format.sample_rate) {
            Ok(bytes) => {
                self.sink.data_available(bytes);
                self.sink.finalized();
            }
            Err(e) => {
                self.sink.fault(format!("Failed to encode WAV: {}", e));
            }
        }
    }

    fn state(&self) -> EncoderState {
        lock(&self.shared.encoder).state
    }

    fn mime_type(&self) -> Option<String> {
        Some(WAV_MIME_TYPE.to_string())
    }
}

use crate::{
    CaptureBackend, CaptureSession, CpalBackend, WAV_MIME_TYPE,
    device::{MAX_PCM_SAMPLES, append_capped},
};

use std::time::Duration;

/// WHAT: A real microphone records a playable WAV file
/// WHY: Verifies the cpal backend end to end on hardware
#[tokio::test(flavor = "multi_thread")]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
#[allow(clippy::unwrap_used)]
async fn given_default_microphone_when_recording_then_wav_payload() {
    // Given: A session on the default input device
    let session = CaptureSession::spawn(CpalBackend::default());

    // When: Recording for half a second
    session.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    let tap = session.analysis_tap().await.unwrap();
    let result = session.stop().await.unwrap();

    // Then: A non-empty WAV payload and a stale tap
    assert_eq!(result.mime_type(), WAV_MIME_TYPE);
    assert_eq!(result.extension(), "wav");
    assert!(result.len() > 44);
    assert!(!tap.is_live());
}

/// WHAT: Unknown device names are refused at acquisition
/// WHY: A misconfigured device must surface as denied access
#[tokio::test(flavor = "multi_thread")]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
async fn given_unknown_device_name_when_acquiring_then_denied() {
    // Given: A backend pointed at a device that does not exist
    let mut backend = CpalBackend::with_device(Some("voxnote-missing-device".to_string()));

    // When: Acquiring
    let result = backend.acquire().await;

    // Then: Access denied
    assert!(matches!(
        result,
        Err(crate::CaptureError::AcquisitionDenied { .. })
    ));
}

/// WHAT: Samples below the limit are converted and kept in order
/// WHY: Normal recordings must not lose audio
#[test]
fn given_room_in_buffer_when_appending_then_all_samples_kept() {
    // Given: An empty buffer
    let mut samples = Vec::new();

    // When: Appending silence, full scale and negative full scale
    let complete = append_capped(&mut samples, &[0.0, 1.0, -1.0], 1, MAX_PCM_SAMPLES);

    // Then: Everything is kept as 16-bit PCM
    assert!(complete);
    assert_eq!(samples.len(), 3);
    assert_eq!(samples[0], 0);
    assert!(samples[1] > 32_000);
    assert!(samples[2] < -32_000);
}

/// WHAT: Buffer stops growing at its limit and keeps the beginning
/// WHY: Prevents unbounded memory growth during long recordings
#[test]
fn given_buffer_near_limit_when_appending_then_cut_on_whole_frame() {
    // Given: A stereo buffer with room for three more samples
    let limit = 8;
    let mut samples = vec![7i16; 5];

    // When: Appending two stereo frames
    let complete = append_capped(&mut samples, &[0.5, 0.5, 0.5, 0.5], 2, limit);

    // Then: Only one whole frame fits and the old samples are untouched
    assert!(!complete);
    assert_eq!(samples.len(), 7);
    assert_eq!(&samples[..5], &[7; 5]);

    // And: A full buffer accepts nothing more
    let mut full = vec![0i16; limit];
    assert!(!append_capped(&mut full, &[0.1], 1, limit));
    assert_eq!(full.len(), limit);
}

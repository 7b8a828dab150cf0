use crate::device::encode_wav;

use std::io::Cursor;

use hound::WavReader;

/// WHAT: PCM samples round-trip through the WAV container
/// WHY: The recording payload must be a playable file
#[test]
#[allow(clippy::unwrap_used)]
fn given_pcm_samples_when_encoding_then_readable_wav_with_same_format() {
    // Given: Stereo 16-bit samples at 48 kHz
    let samples: Vec<i16> = vec![0, 1000, -1000, i16::MAX, i16::MIN, 42];

    // When: Encoding
    let bytes = encode_wav(&samples, 2, 48_000).unwrap();

    // Then: A RIFF file describing the same audio
    assert_eq!(&bytes[..4], b"RIFF");
    let mut reader = WavReader::new(Cursor::new(bytes)).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 48_000);
    assert_eq!(spec.bits_per_sample, 16);
    let decoded: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
    assert_eq!(decoded, samples);
}

/// WHAT: An empty recording still yields a valid header
/// WHY: Stopping immediately after starting must not fail
#[test]
#[allow(clippy::unwrap_used)]
fn given_no_samples_when_encoding_then_header_only() {
    // Given: No audio
    let samples: Vec<i16> = Vec::new();

    // When: Encoding mono at 16 kHz
    let bytes = encode_wav(&samples, 1, 16_000).unwrap();

    // Then: Just the 44-byte header
    assert_eq!(bytes.len(), 44);
    let reader = WavReader::new(Cursor::new(bytes)).unwrap();
    assert_eq!(reader.len(), 0);
}

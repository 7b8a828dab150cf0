use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

/// MIME type produced by [`WavEncoder`](crate::WavEncoder).
pub const WAV_MIME_TYPE: &str = "audio/wav";

/// Encodes interleaved 16-bit PCM into an in-memory WAV file.
pub(crate) fn encode_wav(
    samples: &[i16],
    channels: u16,
    sample_rate: u32,
) -> Result<Vec<u8>, hound::Error> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

//! Canonical WAV serialization: a fixed 44-byte header followed by
//! little-endian 16-bit PCM.

use crate::error::{RecorderError, Result};

/// Length of the RIFF/fmt/data header preceding the sample payload
pub const WAV_HEADER_LEN: usize = 44;

/// Serialize interleaved samples into a complete WAV byte stream.
///
/// Every sample is clamped to [-1.0, 1.0] and quantized as
/// `round(s * 32767)` into a signed little-endian 16-bit word. The result
/// is exactly `44 + samples.len() * 2` bytes with self-consistent chunk
/// sizes.
///
/// # Errors
/// Returns `RecorderError::InvalidAudioFormat` for a zero channel count or
/// zero sample rate; nothing is written in that case.
pub fn encode_wav(samples: &[f32], sample_rate: u32, channel_count: u16) -> Result<Vec<u8>> {
    if channel_count == 0 {
        return Err(RecorderError::InvalidAudioFormat(
            "zero channels reached the encoder".into(),
        ));
    }
    if sample_rate == 0 {
        return Err(RecorderError::InvalidAudioFormat(
            "zero sample rate reached the encoder".into(),
        ));
    }

    let data_size = (samples.len() * 2) as u32;
    let byte_rate = sample_rate * channel_count as u32 * 2;
    let block_align = channel_count * 2;

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + samples.len() * 2);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_size).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes()); // fmt chunk size
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&channel_count.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());

    for &sample in samples {
        let quantized = (sample.clamp(-1.0, 1.0) * 32767.0).round() as i16;
        out.extend_from_slice(&quantized.to_le_bytes());
    }

    Ok(out)
}

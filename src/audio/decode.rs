use std::io::Cursor;

use hound::WavReader;

use crate::audio::AudioBuffer;
use crate::error::{RecorderError, Result};

/// Decodes the bytes a capture source produced into raw PCM
///
/// Paired with the capture source that produced the bytes: `DeviceSource`
/// emits raw frames for `RawPcmDecoder`, `FileSource` emits a WAV container
/// for `WavDecoder`.
pub trait Decoder {
    fn decode(&self, bytes: &[u8]) -> Result<AudioBuffer>;
}

/// WAV container decoder backed by hound
///
/// Accepts integer and float sample formats; also serves as the reference
/// decoder for round-trip tests.
pub struct WavDecoder;

impl Decoder for WavDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<AudioBuffer> {
        if bytes.is_empty() {
            return Err(RecorderError::DecodeFailure("no audio data captured".into()));
        }

        let mut reader = WavReader::new(Cursor::new(bytes))
            .map_err(|e| RecorderError::DecodeFailure(e.to_string()))?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| RecorderError::DecodeFailure(e.to_string()))?,
            hound::SampleFormat::Int => {
                // Symmetric with the encoder's round(s * max) quantization
                let max_val = (2_i32.pow(spec.bits_per_sample as u32 - 1) - 1) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / max_val))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| RecorderError::DecodeFailure(e.to_string()))?
            }
        };

        AudioBuffer::from_interleaved(spec.sample_rate, spec.channels as usize, &samples)
    }
}

/// Decoder for the raw little-endian f32 frames the device source emits
pub struct RawPcmDecoder {
    pub sample_rate: u32,
    pub channels: u16,
}

impl Decoder for RawPcmDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<AudioBuffer> {
        if bytes.is_empty() {
            return Err(RecorderError::DecodeFailure("no audio data captured".into()));
        }
        if !bytes.len().is_multiple_of(4) {
            return Err(RecorderError::DecodeFailure(format!(
                "{} bytes is not a whole number of f32 samples",
                bytes.len()
            )));
        }

        let samples: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        AudioBuffer::from_interleaved(self.sample_rate, self.channels as usize, &samples)
    }
}

use crate::error::{RecorderError, Result};

/// Planar multichannel PCM buffer
///
/// Samples are f32, nominally in [-1.0, 1.0] (filter overshoot may exceed
/// this transiently; the WAV encoder clamps). All channel planes have the
/// same length; this is checked at construction. Buffers are immutable
/// once built.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Build a buffer from per-channel sample planes.
    ///
    /// # Errors
    /// Returns `RecorderError::InvalidAudioFormat` for a zero sample rate,
    /// zero channels, or channel planes of unequal length.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self> {
        if sample_rate == 0 {
            return Err(RecorderError::InvalidAudioFormat(
                "sample rate must be positive".into(),
            ));
        }
        if channels.is_empty() {
            return Err(RecorderError::InvalidAudioFormat(
                "at least one channel required".into(),
            ));
        }
        let frames = channels[0].len();
        if channels.iter().any(|c| c.len() != frames) {
            return Err(RecorderError::InvalidAudioFormat(
                "channel planes differ in length".into(),
            ));
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Build a buffer by de-interleaving frame-major samples
    /// [c0, c1, ..., c0, c1, ...].
    pub fn from_interleaved(
        sample_rate: u32,
        channel_count: usize,
        interleaved: &[f32],
    ) -> Result<Self> {
        if channel_count == 0 {
            return Err(RecorderError::InvalidAudioFormat(
                "at least one channel required".into(),
            ));
        }
        if !interleaved.len().is_multiple_of(channel_count) {
            return Err(RecorderError::InvalidAudioFormat(format!(
                "{} samples do not divide into {} channels",
                interleaved.len(),
                channel_count
            )));
        }
        let frames = interleaved.len() / channel_count;
        let mut channels: Vec<Vec<f32>> = (0..channel_count)
            .map(|_| Vec::with_capacity(frames))
            .collect();
        for frame in interleaved.chunks_exact(channel_count) {
            for (plane, &sample) in channels.iter_mut().zip(frame) {
                plane.push(sample);
            }
        }
        Self::new(sample_rate, channels)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames (samples per channel)
    pub fn frame_count(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    /// One channel's sample plane
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// Interleave the channel planes into a single frame-major sequence:
    /// frame i contributes channel 0 first, then channel 1, and so on.
    /// Output length is exactly `frame_count() * channel_count()`.
    pub fn interleave(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.frame_count() * self.channel_count());
        for i in 0..self.frame_count() {
            for plane in &self.channels {
                out.push(plane[i]);
            }
        }
        out
    }
}

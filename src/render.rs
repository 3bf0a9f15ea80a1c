//! Offline rendering: deterministic resample plus bandpass pass.

use crate::audio::AudioBuffer;
use crate::config::FilterConfig;
use crate::error::Result;
use crate::signal_processing::BandpassBiquad;

/// Re-runs source audio through the filter chain at a target sample rate
///
/// Each `render` call constructs a fresh [`BandpassBiquad`], so no delay-line
/// state leaks between renders and identical inputs always produce
/// byte-identical outputs.
pub struct OfflineRenderer {
    filter: FilterConfig,
    target_sample_rate: u32,
}

impl OfflineRenderer {
    pub fn new(filter: FilterConfig, target_sample_rate: u32) -> Self {
        Self {
            filter,
            target_sample_rate,
        }
    }

    /// Resample (if the rates differ) and filter every channel.
    ///
    /// The output has exactly
    /// `round(source_frames * target_rate / source_rate)` frames and the
    /// source's channel count. An empty source renders to an empty buffer.
    ///
    /// # Errors
    /// Returns `RecorderError::InvalidFilterParameters` when the filter
    /// configuration is invalid for the target rate.
    pub fn render(&self, source: &AudioBuffer) -> Result<AudioBuffer> {
        let channel_count = source.channel_count();

        if source.is_empty() {
            return AudioBuffer::new(self.target_sample_rate, vec![Vec::new(); channel_count]);
        }

        let mut filter = BandpassBiquad::new(
            self.filter.center_hz,
            self.filter.q,
            self.target_sample_rate,
            channel_count,
        )?;

        let target_frames = target_frame_count(
            source.frame_count(),
            source.sample_rate(),
            self.target_sample_rate,
        );

        let mut channels = Vec::with_capacity(channel_count);
        for index in 0..channel_count {
            let mut plane = if source.sample_rate() == self.target_sample_rate {
                source.channel(index).to_vec()
            } else {
                resample_linear(
                    source.channel(index),
                    source.sample_rate(),
                    self.target_sample_rate,
                    target_frames,
                )
            };
            filter.process_channel(index, &mut plane);
            channels.push(plane);
        }

        AudioBuffer::new(self.target_sample_rate, channels)
    }
}

/// `round(source_frames * target_rate / source_rate)`
fn target_frame_count(source_frames: usize, source_rate: u32, target_rate: u32) -> usize {
    (source_frames as f64 * target_rate as f64 / source_rate as f64).round() as usize
}

/// Two-point linear interpolation at source positions
/// `i * source_rate / target_rate`
///
/// Positions at or past the final source sample hold its value. Positions
/// are computed in f64 and samples mixed in f32, so results are fully
/// deterministic for a given input.
fn resample_linear(
    input: &[f32],
    source_rate: u32,
    target_rate: u32,
    output_len: usize,
) -> Vec<f32> {
    let step = source_rate as f64 / target_rate as f64;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let position = i as f64 * step;
        let index = position.floor() as usize;
        let fraction = (position - index as f64) as f32;

        let sample = if index + 1 < input.len() {
            input[index] * (1.0 - fraction) + input[index + 1] * fraction
        } else {
            input.last().copied().unwrap_or(0.0)
        };
        output.push(sample);
    }

    output
}

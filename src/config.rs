//! Configuration for the bandpass recorder.
//!
//! All values have defaults matching the stock pipeline: capture at the
//! device's 48 kHz, filter around 2 kHz, render to 16 kHz. A TOML file can
//! override any subset:
//!
//! ```toml
//! [filter]
//! center_hz = 1500.0
//! q = 2.0
//!
//! [render]
//! target_sample_rate = 8000
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{RecorderError, Result};

/// System-wide recorder configuration
///
/// Use `RecorderConfig::default()` for the stock pipeline, or
/// `RecorderConfig::load()` to read overrides from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Live capture configuration
    pub capture: CaptureConfig,
    /// Bandpass filter configuration
    pub filter: FilterConfig,
    /// Offline render configuration
    pub render: RenderConfig,
}

impl RecorderConfig {
    /// Load configuration from a TOML file, falling back to defaults for
    /// any field the file omits.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref()).map_err(|e| {
            RecorderError::Config(format!("{}: {}", path.as_ref().display(), e))
        })?;
        toml::from_str(&text).map_err(|e| {
            RecorderError::Config(format!("{}: {}", path.as_ref().display(), e))
        })
    }
}

/// Live capture configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Capture sample rate in Hz (typically 48000)
    pub sample_rate: u32,
    /// Number of capture channels
    pub channels: u16,
    /// Capture buffer size in frames
    pub buffer_size: usize,
    /// Maximum chunks held between capture callbacks and `stop()`.
    /// Chunks past this are dropped with a warning rather than blocking
    /// the audio thread.
    pub queue_depth: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            channels: 1,
            buffer_size: 1024,
            queue_depth: 1024,
        }
    }
}

/// Bandpass filter configuration
///
/// The same parameters drive both the live-monitor filter and the offline
/// render filter; each use constructs its own filter state.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Centre frequency in Hz
    pub center_hz: f32,
    /// Quality factor (bandwidth = center / Q)
    pub q: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            center_hz: 2000.0,
            q: 1.0,
        }
    }
}

/// Offline render configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Sample rate of the rendered artifact in Hz
    pub target_sample_rate: u32,
    /// Suggested filename for the rendered artifact
    pub filename: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: 16000,
            filename: "filtered_audio.wav".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RecorderConfig::default();
        assert_eq!(config.render.target_sample_rate, 16000);
        assert_eq!(config.filter.center_hz, 2000.0);
        assert_eq!(config.filter.q, 1.0);
        assert_eq!(config.render.filename, "filtered_audio.wav");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RecorderConfig = toml::from_str(
            r#"
            [filter]
            center_hz = 1500.0
            "#,
        )
        .unwrap();
        assert_eq!(config.filter.center_hz, 1500.0);
        assert_eq!(config.filter.q, 1.0);
        assert_eq!(config.render.target_sample_rate, 16000);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = RecorderConfig::load("/nonexistent/bandrec.toml").unwrap_err();
        assert!(matches!(err, RecorderError::Config(_)));
    }
}

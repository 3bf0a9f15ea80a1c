use std::fs;
use std::path::PathBuf;

use audio_thread_priority::RtPriorityHandle;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;

use crate::config::CaptureConfig;
use crate::error::{RecorderError, Result};
use crate::signal_processing::BandpassBiquad;

/// Produces the opaque byte chunks a recording session buffers
///
/// Implementations pair with a [`Decoder`](crate::audio::Decoder) that
/// understands their byte format. `begin` acquires the underlying device
/// or data and starts delivering chunks into `tx`; `end` stops delivery.
pub trait CaptureSource {
    fn begin(&mut self, tx: Sender<Vec<u8>>, monitor: Option<MonitorTap>) -> Result<()>;
    fn end(&mut self);
}

/// Optional consumer of the live-monitor signal
///
/// Monitoring is a presentation concern: frames handed to the sink are
/// bandpass-filtered copies of the capture and never reach the stored
/// artifact.
pub trait MonitorSink: Send {
    /// Receive one interleaved block of filtered frames at the capture rate
    fn consume(&mut self, frames: &[f32]);
}

/// Live-monitor hookup: a dedicated filter feeding an attached sink
///
/// Owns its own filter state so monitoring never shares delay lines with
/// the offline render. Moves into the capture stream's callback for the
/// duration of one capture.
pub struct MonitorTap {
    filter: BandpassBiquad,
    channels: usize,
    sink: Box<dyn MonitorSink>,
}

impl MonitorTap {
    pub(crate) fn new(filter: BandpassBiquad, sink: Box<dyn MonitorSink>) -> Self {
        let channels = filter.channel_count();
        Self {
            filter,
            channels,
            sink,
        }
    }

    pub(crate) fn feed(&mut self, interleaved: &[f32]) {
        let mut filtered = interleaved.to_vec();
        for (i, sample) in filtered.iter_mut().enumerate() {
            *sample = self.filter.process_sample(i % self.channels, *sample);
        }
        self.sink.consume(&filtered);
    }
}

/// Microphone capture via cpal
///
/// The input stream callback packages each block of interleaved f32 frames
/// as little-endian bytes for the session's chunk queue (decode side:
/// [`RawPcmDecoder`](crate::audio::RawPcmDecoder)) and feeds the monitor
/// tap when one is attached. `try_send` keeps the audio thread from ever
/// blocking on a full queue; overflow chunks are dropped with a warning.
pub struct DeviceSource {
    config: CaptureConfig,
    stream: Option<cpal::Stream>,
    _rt_handle: Option<RtPriorityHandle>,
}

impl DeviceSource {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            stream: None,
            _rt_handle: None,
        }
    }
}

impl CaptureSource for DeviceSource {
    fn begin(&mut self, tx: Sender<Vec<u8>>, monitor: Option<MonitorTap>) -> Result<()> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| RecorderError::DeviceUnavailable("no input device found".into()))?;

        match device.description() {
            Ok(desc) => log::info!("Input device: {:?}", desc),
            Err(_) => log::info!("Input device: Unknown"),
        }

        let stream_config = cpal::StreamConfig {
            channels: self.config.channels,
            sample_rate: self.config.sample_rate,
            buffer_size: cpal::BufferSize::Fixed(self.config.buffer_size as u32),
        };

        let mut monitor = monitor;
        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let mut chunk = Vec::with_capacity(data.len() * 4);
                    for sample in data {
                        chunk.extend_from_slice(&sample.to_le_bytes());
                    }
                    if tx.try_send(chunk).is_err() {
                        log::warn!("Capture queue full, dropping {} frames", data.len());
                    }
                    if let Some(tap) = monitor.as_mut() {
                        tap.feed(data);
                    }
                },
                |err| log::error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| RecorderError::DeviceUnavailable(format!("{}", e)))?;

        // Attempt to promote to real-time priority
        let rt_handle = audio_thread_priority::promote_current_thread_to_real_time(
            self.config.buffer_size as u32,
            self.config.sample_rate,
        );

        self._rt_handle = match rt_handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("Could not set real-time priority: {}", e);
                None
            }
        };

        stream
            .play()
            .map_err(|e| RecorderError::DeviceUnavailable(format!("{}", e)))?;

        self.stream = Some(stream);
        Ok(())
    }

    fn end(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.pause();
        }
    }
}

impl Drop for DeviceSource {
    fn drop(&mut self) {
        self.end();
    }
}

/// Replays an already-recorded file as a single captured chunk
///
/// Pairs with [`WavDecoder`](crate::audio::WavDecoder); used by the CLI to
/// run existing recordings through the same pipeline as live capture.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl CaptureSource for FileSource {
    // No live signal to monitor when replaying a file
    fn begin(&mut self, tx: Sender<Vec<u8>>, _monitor: Option<MonitorTap>) -> Result<()> {
        let bytes = fs::read(&self.path).map_err(|e| {
            RecorderError::DeviceUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        tx.try_send(bytes).map_err(|_| {
            RecorderError::DeviceUnavailable("capture queue cannot hold the file".into())
        })?;
        Ok(())
    }

    fn end(&mut self) {}
}

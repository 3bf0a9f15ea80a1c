//! Recording session orchestration.
//!
//! A session owns one capture source and its paired decoder, buffers the
//! chunks the source delivers, and on `stop()` runs the whole
//! decode → render → interleave → encode pipeline as one unit of work.

use crossbeam_channel::Receiver;

use crate::audio::{CaptureSource, Decoder, MonitorSink, MonitorTap};
use crate::config::RecorderConfig;
use crate::error::{RecorderError, Result};
use crate::render::OfflineRenderer;
use crate::signal_processing::BandpassBiquad;
use crate::wav::encode_wav;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Capturing,
    Processing,
    Ready,
}

/// The finished recording: canonical WAV bytes plus a suggested filename
#[derive(Debug, Clone)]
pub struct WavArtifact {
    pub bytes: Vec<u8>,
    pub filename: String,
}

/// Single-session recording pipeline
///
/// State machine: Idle → Capturing → Processing → Ready → Idle. All
/// methods take `&mut self`, so the pipeline cannot be re-entered while a
/// stage is running. Every `start()` builds a fresh chunk queue and fresh
/// filter state; nothing is shared between sessions.
pub struct RecordingSession {
    config: RecorderConfig,
    source: Box<dyn CaptureSource>,
    decoder: Box<dyn Decoder>,
    monitor: Option<Box<dyn MonitorSink>>,
    rx: Option<Receiver<Vec<u8>>>,
    state: SessionState,
    artifact: Option<WavArtifact>,
}

impl RecordingSession {
    pub fn new(
        config: RecorderConfig,
        source: Box<dyn CaptureSource>,
        decoder: Box<dyn Decoder>,
    ) -> Self {
        Self {
            config,
            source,
            decoder,
            monitor: None,
            rx: None,
            state: SessionState::Idle,
            artifact: None,
        }
    }

    /// Attach a live-monitor sink for the next capture.
    ///
    /// The sink moves into the capture stream on `start()` and is dropped
    /// when that capture ends; monitored audio never reaches the artifact.
    pub fn attach_monitor(&mut self, sink: Box<dyn MonitorSink>) {
        self.monitor = Some(sink);
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Begin capturing. Idle → Capturing.
    ///
    /// Validates the filter configuration up front so a bad configuration
    /// fails here rather than after a whole capture. Calling `start()`
    /// while already capturing leaves the session untouched and reports
    /// `AlreadyRecording`.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            SessionState::Capturing | SessionState::Processing => {
                return Err(RecorderError::AlreadyRecording);
            }
            SessionState::Ready => {
                log::warn!("Starting a new capture, discarding unretrieved artifact");
                self.artifact = None;
            }
            SessionState::Idle => {}
        }

        // Fail fast on a filter that cannot be designed at the target rate.
        BandpassBiquad::new(
            self.config.filter.center_hz,
            self.config.filter.q,
            self.config.render.target_sample_rate,
            1,
        )?;

        let tap = match self.monitor.take() {
            Some(sink) => {
                let filter = BandpassBiquad::new(
                    self.config.filter.center_hz,
                    self.config.filter.q,
                    self.config.capture.sample_rate,
                    self.config.capture.channels as usize,
                )?;
                Some(MonitorTap::new(filter, sink))
            }
            None => None,
        };

        let (tx, rx) = crossbeam_channel::bounded(self.config.capture.queue_depth);
        self.source.begin(tx, tap)?;

        self.rx = Some(rx);
        self.state = SessionState::Capturing;
        log::info!(
            "Capture started ({} Hz, {} channels)",
            self.config.capture.sample_rate,
            self.config.capture.channels
        );
        Ok(())
    }

    /// End capture and run the processing pipeline.
    /// Capturing → Processing → Ready, or back to Idle on failure.
    ///
    /// Calling `stop()` with no capture in progress leaves state and any
    /// held artifact untouched and reports `NotRecording`.
    pub fn stop(&mut self) -> Result<()> {
        if self.state != SessionState::Capturing {
            log::debug!("stop() with no active capture");
            return Err(RecorderError::NotRecording);
        }

        self.source.end();
        self.state = SessionState::Processing;

        let mut captured = Vec::new();
        if let Some(rx) = self.rx.take() {
            while let Ok(chunk) = rx.try_recv() {
                captured.extend_from_slice(&chunk);
            }
        }
        log::info!("Capture stopped, {} bytes buffered", captured.len());

        match self.process(&captured) {
            Ok(artifact) => {
                log::info!(
                    "Rendered {} bytes as {}",
                    artifact.bytes.len(),
                    artifact.filename
                );
                self.artifact = Some(artifact);
                self.state = SessionState::Ready;
                Ok(())
            }
            Err(e) => {
                log::error!("Processing failed: {}", e);
                self.state = SessionState::Idle;
                Err(e)
            }
        }
    }

    /// Decode → render → interleave → encode. No partial artifact escapes:
    /// the caller only sees the result when every stage succeeded.
    fn process(&self, captured: &[u8]) -> Result<WavArtifact> {
        let decoded = self.decoder.decode(captured)?;
        log::debug!(
            "Decoded {} frames at {} Hz ({} channels)",
            decoded.frame_count(),
            decoded.sample_rate(),
            decoded.channel_count()
        );

        let renderer = OfflineRenderer::new(
            self.config.filter.clone(),
            self.config.render.target_sample_rate,
        );
        let rendered = renderer.render(&decoded)?;

        let interleaved = rendered.interleave();
        let bytes = encode_wav(
            &interleaved,
            rendered.sample_rate(),
            rendered.channel_count() as u16,
        )?;

        Ok(WavArtifact {
            bytes,
            filename: self.config.render.filename.clone(),
        })
    }

    /// Hand the finished artifact to the caller. Ready → Idle.
    pub fn take_artifact(&mut self) -> Option<WavArtifact> {
        let artifact = self.artifact.take();
        if artifact.is_some() {
            self.state = SessionState::Idle;
        }
        artifact
    }

    /// Abandon the session from any state. Discards captured chunks and
    /// any unretrieved artifact.
    pub fn reset(&mut self) {
        if self.state == SessionState::Capturing {
            self.source.end();
        }
        self.rx = None;
        self.artifact = None;
        self.state = SessionState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::WavDecoder;
    use crossbeam_channel::Sender;

    /// Capture source that delivers a fixed byte script on `begin`
    struct ScriptedSource {
        chunks: Vec<Vec<u8>>,
        fail_begin: bool,
    }

    impl ScriptedSource {
        fn with_chunks(chunks: Vec<Vec<u8>>) -> Self {
            Self {
                chunks,
                fail_begin: false,
            }
        }

        fn unavailable() -> Self {
            Self {
                chunks: Vec::new(),
                fail_begin: true,
            }
        }
    }

    impl CaptureSource for ScriptedSource {
        fn begin(&mut self, tx: Sender<Vec<u8>>, _monitor: Option<MonitorTap>) -> Result<()> {
            if self.fail_begin {
                return Err(RecorderError::DeviceUnavailable("scripted failure".into()));
            }
            for chunk in self.chunks.drain(..) {
                tx.try_send(chunk).expect("test queue too small");
            }
            Ok(())
        }

        fn end(&mut self) {}
    }

    fn session_with(chunks: Vec<Vec<u8>>) -> RecordingSession {
        RecordingSession::new(
            RecorderConfig::default(),
            Box::new(ScriptedSource::with_chunks(chunks)),
            Box::new(WavDecoder),
        )
    }

    fn capture_of_silence() -> Vec<u8> {
        // 0.1 s of mono silence at 44.1 kHz, packaged as WAV bytes
        encode_wav(&vec![0.0f32; 4410], 44100, 1).unwrap()
    }

    #[test]
    fn test_full_session_flow() {
        let mut session = session_with(vec![capture_of_silence()]);
        assert_eq!(session.state(), SessionState::Idle);

        session.start().unwrap();
        assert_eq!(session.state(), SessionState::Capturing);

        session.stop().unwrap();
        assert_eq!(session.state(), SessionState::Ready);

        let artifact = session.take_artifact().unwrap();
        assert_eq!(artifact.filename, "filtered_audio.wav");
        // 0.1 s rendered at 16 kHz: 1600 frames of 16-bit mono + header
        assert_eq!(artifact.bytes.len(), 44 + 1600 * 2);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.take_artifact().is_none());
    }

    #[test]
    fn test_start_while_capturing_is_rejected() {
        let mut session = session_with(vec![capture_of_silence()]);
        session.start().unwrap();

        let err = session.start().unwrap_err();
        assert!(matches!(err, RecorderError::AlreadyRecording));
        assert_eq!(session.state(), SessionState::Capturing);

        // The original capture is still intact
        session.stop().unwrap();
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn test_stop_on_idle_is_noop() {
        let mut session = session_with(vec![capture_of_silence()]);

        let err = session.stop().unwrap_err();
        assert!(matches!(err, RecorderError::NotRecording));
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.take_artifact().is_none());
    }

    #[test]
    fn test_stop_without_data_reports_decode_failure() {
        let mut session = session_with(vec![]);
        session.start().unwrap();

        let err = session.stop().unwrap_err();
        assert!(matches!(err, RecorderError::DecodeFailure(_)));
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.take_artifact().is_none());
    }

    #[test]
    fn test_malformed_capture_returns_to_idle() {
        let mut session = session_with(vec![vec![0xba, 0xad, 0xf0, 0x0d]]);
        session.start().unwrap();

        let err = session.stop().unwrap_err();
        assert!(matches!(err, RecorderError::DecodeFailure(_)));
        assert_eq!(session.state(), SessionState::Idle);

        // The session can start cleanly again after a failure
        assert!(session.start().is_ok());
    }

    #[test]
    fn test_device_unavailable_keeps_idle() {
        let mut session = RecordingSession::new(
            RecorderConfig::default(),
            Box::new(ScriptedSource::unavailable()),
            Box::new(WavDecoder),
        );

        let err = session.start().unwrap_err();
        assert!(matches!(err, RecorderError::DeviceUnavailable(_)));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_invalid_filter_config_fails_at_start() {
        let mut config = RecorderConfig::default();
        config.filter.q = 0.0;
        let mut session = RecordingSession::new(
            config,
            Box::new(ScriptedSource::with_chunks(vec![capture_of_silence()])),
            Box::new(WavDecoder),
        );

        let err = session.start().unwrap_err();
        assert!(matches!(err, RecorderError::InvalidFilterParameters(_)));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_reset_from_capturing() {
        let mut session = session_with(vec![capture_of_silence()]);
        session.start().unwrap();
        session.reset();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.take_artifact().is_none());
    }
}

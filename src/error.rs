use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("Capture device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Invalid filter parameters: {0}")]
    InvalidFilterParameters(String),

    #[error("Decode failed: {0}")]
    DecodeFailure(String),

    #[error("Invalid audio format: {0}")]
    InvalidAudioFormat(String),

    #[error("Recording already in progress")]
    AlreadyRecording,

    #[error("No recording in progress")]
    NotRecording,

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RecorderError>;

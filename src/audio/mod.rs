pub mod buffer;
pub mod capture;
pub mod decode;

pub use buffer::AudioBuffer;
pub use capture::{CaptureSource, DeviceSource, FileSource, MonitorSink, MonitorTap};
pub use decode::{Decoder, RawPcmDecoder, WavDecoder};

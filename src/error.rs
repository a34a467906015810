//! Player error types
//!
//! Startup failures are fatal and propagate to `main`. `Decode` and
//! `Convert` are steady-state failures the pipeline logs and skips.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the playback pipeline
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Container could not be opened or parsed
    #[error("failed to open {}: {reason}", .path.display())]
    Open { path: PathBuf, reason: String },

    /// Container opened but reported no streams
    #[error("no stream information found in {}", .path.display())]
    NoStreamInfo { path: PathBuf },

    /// None of the streams is a video stream
    #[error("no video stream found among {stream_count} streams")]
    NoVideoStream { stream_count: usize },

    /// No decoder implementation exists for the codec
    #[error("unsupported codec: {codec}")]
    UnsupportedCodec { codec: String },

    /// Decoder exists but its context could not be opened
    #[error("failed to open decoder for {codec}: {reason}")]
    DecoderOpen { codec: String, reason: String },

    /// Pixel conversion backend rejected the format pair
    #[error("failed to create conversion context ({src_format} -> RGBA): {reason}")]
    ConversionContext { src_format: String, reason: String },

    /// Frame rate is zero, negative or not finite
    #[error("invalid frame rate: {0}")]
    InvalidFrameRate(f64),

    /// A packet could not be decoded
    #[error("decode failed: {0}")]
    Decode(String),

    /// A decoded frame could not be converted
    #[error("conversion failed: {0}")]
    Convert(String),

    /// Configuration file could not be read or is invalid
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PlayerError>;

impl PlayerError {
    /// Whether this error aborts startup
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PlayerError::Decode(_) | PlayerError::Convert(_))
    }
}

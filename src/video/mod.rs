//! Video module
//!
//! Provides the decode-convert-present pipeline and its FFmpeg backend.
//!
//! # Usage
//!
//! ```rust,ignore
//! use video::{FfmpegBackend, FramePipeline};
//!
//! let mut pipeline = FramePipeline::open(&FfmpegBackend::new(), path, &config)?;
//!
//! // Once per event loop iteration
//! pipeline.advance(elapsed, &mut surface);
//! ```

mod backend;
mod buffer;
mod container;
mod ffmpeg;
mod frame_rate;
mod pacer;
mod pipeline;

#[cfg(test)]
mod testing;

pub use ffmpeg::FfmpegBackend;
pub use pipeline::{FramePipeline, PresentationSurface};

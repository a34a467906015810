//! Frame pipeline
//!
//! Owns every playback resource and drives decode, conversion and
//! presentation from the caller's time steps.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::PlayerConfig;
use crate::error::Result;

use super::backend::{DecodeStatus, FrameDecoder, MediaBackend, PixelConverter, StreamDescriptor};
use super::buffer::{FrameMailbox, RgbaBuffer};
use super::container::ContainerReader;
use super::frame_rate::derive_frame_rate;
use super::pacer::{FramePacer, PacerTick};

/// Receiver of converted frames
pub trait PresentationSurface {
    /// Upload a full `width * height * 4` RGBA buffer
    fn upload_pixels(&mut self, rgba: &[u8]);
}

/// Pipeline lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    /// Before `open`; an opened pipeline never returns here
    #[default]
    Uninitialized,
    /// All resources acquired, no time step yet
    Opened,
    Playing,
    /// End of stream reached; terminal
    Finished,
}

impl PipelineState {
    pub fn display_name(&self) -> &'static str {
        match self {
            PipelineState::Uninitialized => "Uninitialized",
            PipelineState::Opened => "Opened",
            PipelineState::Playing => "Playing",
            PipelineState::Finished => "Finished",
        }
    }
}

/// Playback counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    pub frames_decoded: u64,
    pub frames_presented: u64,
    /// Converted frames replaced before they were presented
    pub frames_dropped: u64,
    /// Packets that did not yield a frame yet
    pub packets_pending: u64,
    /// Decode or conversion failures skipped during playback
    pub failures: u64,
}

/// Decode-convert-present pipeline over one video stream
///
/// Fields are declared in reverse acquisition order so they are released
/// in that order when the pipeline drops.
pub struct FramePipeline<B: MediaBackend> {
    rgba: RgbaBuffer,
    frame: B::Frame,
    converter: B::Converter,
    decoder: B::Decoder,
    reader: ContainerReader<B::Source>,

    stream: StreamDescriptor,
    pacer: FramePacer,
    frame_rate: f64,
    mailbox: FrameMailbox,
    state: PipelineState,
    stats: PlaybackStats,
}

impl<B: MediaBackend> FramePipeline<B> {
    /// Acquire all resources for playing `path`
    ///
    /// Any failure aborts startup; resources acquired so far are released
    /// in reverse order.
    pub fn open(backend: &B, path: &Path, config: &PlayerConfig) -> Result<Self> {
        debug!(
            "Pipeline {} -> opening {}",
            PipelineState::Uninitialized.display_name(),
            path.display()
        );

        let mut reader = ContainerReader::open(backend, path)?;
        let mut stream = reader.select_video_stream()?;
        let decoder = backend.open_decoder(reader.source(), &stream)?;

        // The codec is authoritative for the frame size
        (stream.width, stream.height) = decoder.dimensions();

        let frame_rate = derive_frame_rate(
            stream.avg_frame_rate,
            config.frame_rate_mode,
            config.default_frame_rate,
        );
        let pacer = FramePacer::new(frame_rate)?;

        let converter = backend.open_converter(&decoder, &stream)?;
        let frame = backend.alloc_frame();
        let rgba = RgbaBuffer::new(stream.width, stream.height);

        info!(
            "Opened video: {}x{} @ {}fps, codec: {}, format: {}",
            stream.width,
            stream.height,
            frame_rate,
            stream.codec,
            decoder.pixel_format()
        );

        Ok(Self {
            rgba,
            frame,
            converter,
            decoder,
            reader,
            stream,
            pacer,
            frame_rate,
            mailbox: FrameMailbox::new(),
            state: PipelineState::Opened,
            stats: PlaybackStats::default(),
        })
    }

    /// Run one time step
    ///
    /// A pending frame is presented first, then the pacer decides whether
    /// to decode the next one.
    pub fn advance<S: PresentationSurface + ?Sized>(&mut self, elapsed: Duration, surface: &mut S) {
        if self.mailbox.take() {
            surface.upload_pixels(self.rgba.as_bytes());
            self.stats.frames_presented += 1;
        }

        match self.state {
            // Uninitialized is unreachable once open has returned
            PipelineState::Finished | PipelineState::Uninitialized => return,
            PipelineState::Opened => self.set_state(PipelineState::Playing),
            PipelineState::Playing => {}
        }

        if self.pacer.advance(elapsed) == PacerTick::Tick {
            self.step();
        }
    }

    /// Read, decode and convert one frame
    fn step(&mut self) {
        let Some(packet) = self.reader.read_packet() else {
            self.set_state(PipelineState::Finished);
            let stats = self.stats();
            info!(
                "Playback finished: {} decoded, {} presented, {} dropped, {} failures",
                stats.frames_decoded, stats.frames_presented, stats.frames_dropped, stats.failures
            );
            return;
        };

        match self.decoder.decode(&packet, &mut self.frame) {
            Ok(DecodeStatus::Frame) => {}
            Ok(DecodeStatus::NeedsMorePackets) => {
                self.stats.packets_pending += 1;
                return;
            }
            Err(e) => {
                self.report_failure(&e);
                return;
            }
        }
        self.stats.frames_decoded += 1;

        if let Err(e) = self.converter.convert(&self.frame, &mut self.rgba) {
            self.report_failure(&e);
            return;
        }

        if self.mailbox.post() {
            debug!("Frame dropped before presentation");
        }
    }

    fn report_failure(&mut self, e: &crate::error::PlayerError) {
        self.stats.failures += 1;
        if e.is_fatal() {
            error!("Unexpected error during playback: {}", e);
        } else {
            warn!("Skipping frame: {}", e);
        }
    }

    fn set_state(&mut self, next: PipelineState) {
        debug!(
            "Pipeline {} -> {}",
            self.state.display_name(),
            next.display_name()
        );
        self.state = next;
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn is_frame_ready(&self) -> bool {
        self.mailbox.is_ready()
    }

    pub fn is_finished(&self) -> bool {
        self.state == PipelineState::Finished
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    pub fn width(&self) -> u32 {
        self.stream.width
    }

    pub fn height(&self) -> u32 {
        self.stream.height
    }

    pub fn stream(&self) -> &StreamDescriptor {
        &self.stream
    }

    /// Current converted frame; overwritten by the next decode step
    pub fn rgba(&self) -> &RgbaBuffer {
        &self.rgba
    }

    pub fn stats(&self) -> PlaybackStats {
        PlaybackStats {
            frames_dropped: self.mailbox.overwritten(),
            ..self.stats
        }
    }

    /// Packets skipped because they belong to other streams
    pub fn discarded_packets(&self) -> u64 {
        self.reader.discarded_packets()
    }
}

impl<B: MediaBackend> Drop for FramePipeline<B> {
    fn drop(&mut self) {
        debug!(
            "Releasing pipeline in state {} ({} frames presented)",
            self.state.display_name(),
            self.stats.frames_presented
        );
    }
}

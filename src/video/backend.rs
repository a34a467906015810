//! Media backend traits
//!
//! The pipeline talks to the native media subsystem only through these
//! traits. `FfmpegBackend` is the production implementation.

use std::path::Path;

use crate::error::Result;

use super::buffer::RgbaBuffer;

/// Kind of media carried by a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
    Subtitle,
    Other,
}

/// Description of one stream in a container
#[derive(Debug, Clone, PartialEq)]
pub struct StreamDescriptor {
    /// Position in the container's stream table
    pub index: usize,
    pub kind: MediaKind,
    /// Codec name as reported by the container
    pub codec: String,
    /// Frame size; containers may report 0x0 until a decoder is opened
    pub width: u32,
    pub height: u32,
    /// Declared average frame rate as (numerator, denominator)
    pub avg_frame_rate: (i32, i32),
}

/// Result of submitting one packet to a decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// The frame slot now holds a complete frame
    Frame,
    /// The codec needs more input before it can emit a frame
    NeedsMorePackets,
}

/// An open container that yields packets in file order
pub trait PacketSource {
    type Packet;

    /// Stream table in declaration order
    fn streams(&self) -> Vec<StreamDescriptor>;

    /// Next packet of any stream with the index of its stream, or `None`
    /// once the container is exhausted
    fn next_packet(&mut self) -> Option<(usize, Self::Packet)>;
}

/// A codec instance bound to one stream
pub trait FrameDecoder {
    type Packet;
    type Frame;

    /// Submit a packet and try to receive a frame into `frame`
    fn decode(&mut self, packet: &Self::Packet, frame: &mut Self::Frame) -> Result<DecodeStatus>;

    /// Name of the pixel format decoded frames are produced in
    fn pixel_format(&self) -> String;

    /// Frame size as (width, height) reported by the open codec
    fn dimensions(&self) -> (u32, u32);
}

/// A format conversion context from decoded frames to RGBA
pub trait PixelConverter {
    type Frame;

    /// Convert `frame` into `out`, overwriting it in place
    fn convert(&mut self, frame: &Self::Frame, out: &mut RgbaBuffer) -> Result<()>;
}

/// Factory for the native resources a pipeline owns
pub trait MediaBackend {
    type Packet;
    type Frame;
    type Source: PacketSource<Packet = Self::Packet>;
    type Decoder: FrameDecoder<Packet = Self::Packet, Frame = Self::Frame>;
    type Converter: PixelConverter<Frame = Self::Frame>;

    /// Open a container and read its stream information
    fn open_source(&self, path: &Path) -> Result<Self::Source>;

    /// Open a decoder for the given stream of `source`
    fn open_decoder(&self, source: &Self::Source, stream: &StreamDescriptor)
        -> Result<Self::Decoder>;

    /// Build an RGBA conversion context for frames produced by `decoder`
    fn open_converter(
        &self,
        decoder: &Self::Decoder,
        stream: &StreamDescriptor,
    ) -> Result<Self::Converter>;

    /// Allocate an empty frame to decode into
    fn alloc_frame(&self) -> Self::Frame;
}

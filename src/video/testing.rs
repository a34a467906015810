//! Synthetic in-memory media backend for tests
//!
//! Packets carry raw pixel values instead of compressed data, and every
//! native-like resource records its acquisition and release in a shared
//! log so tests can check ordering and leaks.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{PlayerError, Result};

use super::backend::{
    DecodeStatus, FrameDecoder, MediaBackend, MediaKind, PacketSource, PixelConverter,
    StreamDescriptor,
};
use super::buffer::RgbaBuffer;

/// Payload that makes the synthetic decoder fail
pub const CORRUPT_PAYLOAD: u8 = 0xFF;

/// Pixel formats the synthetic decoder can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyntheticFormat {
    #[default]
    Rgb24,
    Gray8,
}

impl SyntheticFormat {
    fn bytes_per_pixel(self) -> usize {
        match self {
            SyntheticFormat::Rgb24 => 3,
            SyntheticFormat::Gray8 => 1,
        }
    }
}

/// Description of a synthetic container and how its resources behave
#[derive(Debug, Clone, Default)]
pub struct SyntheticMedia {
    pub streams: Vec<StreamDescriptor>,
    /// (stream index, payload) in file order
    pub packets: Vec<(usize, Vec<u8>)>,
    pub format: SyntheticFormat,
    pub unsupported_codec: bool,
    pub fail_decoder_open: bool,
    pub fail_converter: bool,
}

pub fn video_stream(index: usize, width: u32, height: u32) -> StreamDescriptor {
    StreamDescriptor {
        index,
        kind: MediaKind::Video,
        codec: "rawvideo".to_string(),
        width,
        height,
        avg_frame_rate: (25, 1),
    }
}

pub fn audio_stream(index: usize) -> StreamDescriptor {
    StreamDescriptor {
        index,
        kind: MediaKind::Audio,
        codec: "pcm_s16le".to_string(),
        width: 0,
        height: 0,
        avg_frame_rate: (0, 0),
    }
}

/// Shared record of resource events and decoder input
#[derive(Debug, Default)]
pub struct ResourceLog {
    pub events: Vec<String>,
    pub decoded_payloads: Vec<Vec<u8>>,
}

impl ResourceLog {
    fn record(&mut self, event: impl Into<String>) {
        self.events.push(event.into());
    }

    /// Resources acquired and not yet released
    pub fn live(&self) -> Vec<String> {
        let mut live = Vec::new();
        for event in &self.events {
            if let Some(name) = event.strip_prefix("acquire:") {
                live.push(name.to_string());
            } else if let Some(name) = event.strip_prefix("release:") {
                if let Some(pos) = live.iter().position(|l| l == name) {
                    live.remove(pos);
                }
            }
        }
        live
    }

    /// Names of released resources in release order
    pub fn released(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| e.strip_prefix("release:"))
            .collect()
    }
}

pub type SharedLog = Rc<RefCell<ResourceLog>>;

pub struct SyntheticBackend {
    media: SyntheticMedia,
    log: SharedLog,
}

impl SyntheticBackend {
    pub fn new(media: SyntheticMedia) -> Self {
        Self {
            media,
            log: SharedLog::default(),
        }
    }

    /// A path that exists on disk; the synthetic source ignores its content
    pub fn path(&self) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml")
    }

    pub fn log(&self) -> SharedLog {
        Rc::clone(&self.log)
    }
}

#[derive(Debug, Clone)]
pub struct SyntheticPacket {
    pub payload: Vec<u8>,
}

pub struct SyntheticFrame {
    pub format: SyntheticFormat,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    log: SharedLog,
}

impl Drop for SyntheticFrame {
    fn drop(&mut self) {
        self.log.borrow_mut().record("release:frame");
    }
}

pub struct SyntheticSource {
    streams: Vec<StreamDescriptor>,
    packets: VecDeque<(usize, Vec<u8>)>,
    log: SharedLog,
}

impl PacketSource for SyntheticSource {
    type Packet = SyntheticPacket;

    fn streams(&self) -> Vec<StreamDescriptor> {
        self.streams.clone()
    }

    fn next_packet(&mut self) -> Option<(usize, SyntheticPacket)> {
        self.packets
            .pop_front()
            .map(|(index, payload)| (index, SyntheticPacket { payload }))
    }
}

impl Drop for SyntheticSource {
    fn drop(&mut self) {
        self.log.borrow_mut().record("release:source");
    }
}

pub struct SyntheticDecoder {
    format: SyntheticFormat,
    size: (u32, u32),
    log: SharedLog,
}

impl FrameDecoder for SyntheticDecoder {
    type Packet = SyntheticPacket;
    type Frame = SyntheticFrame;

    fn decode(&mut self, packet: &SyntheticPacket, frame: &mut SyntheticFrame) -> Result<DecodeStatus> {
        self.log
            .borrow_mut()
            .decoded_payloads
            .push(packet.payload.clone());

        let bpp = self.format.bytes_per_pixel();
        if packet.payload.first() == Some(&CORRUPT_PAYLOAD) {
            return Err(PlayerError::Decode("corrupt packet".to_string()));
        }
        if packet.payload.len() < bpp {
            return Ok(DecodeStatus::NeedsMorePackets);
        }

        let pixel = &packet.payload[..bpp];
        frame.format = self.format;
        for chunk in frame.data.chunks_exact_mut(bpp) {
            chunk.copy_from_slice(pixel);
        }
        Ok(DecodeStatus::Frame)
    }

    fn pixel_format(&self) -> String {
        format!("{:?}", self.format)
    }

    fn dimensions(&self) -> (u32, u32) {
        self.size
    }
}

impl Drop for SyntheticDecoder {
    fn drop(&mut self) {
        self.log.borrow_mut().record("release:decoder");
    }
}

pub struct SyntheticConverter {
    log: SharedLog,
}

impl PixelConverter for SyntheticConverter {
    type Frame = SyntheticFrame;

    fn convert(&mut self, frame: &SyntheticFrame, out: &mut RgbaBuffer) -> Result<()> {
        assert_eq!((frame.width, frame.height), (out.width(), out.height()));
        let bpp = frame.format.bytes_per_pixel();
        for (src, dst) in frame
            .data
            .chunks_exact(bpp)
            .zip(out.as_bytes_mut().chunks_exact_mut(4))
        {
            let rgba = match frame.format {
                SyntheticFormat::Rgb24 => [src[0], src[1], src[2], 255],
                SyntheticFormat::Gray8 => [src[0], src[0], src[0], 255],
            };
            dst.copy_from_slice(&rgba);
        }
        Ok(())
    }
}

impl Drop for SyntheticConverter {
    fn drop(&mut self) {
        self.log.borrow_mut().record("release:converter");
    }
}

impl MediaBackend for SyntheticBackend {
    type Packet = SyntheticPacket;
    type Frame = SyntheticFrame;
    type Source = SyntheticSource;
    type Decoder = SyntheticDecoder;
    type Converter = SyntheticConverter;

    fn open_source(&self, _path: &Path) -> Result<SyntheticSource> {
        self.log.borrow_mut().record("acquire:source");
        Ok(SyntheticSource {
            streams: self.media.streams.clone(),
            packets: self.media.packets.iter().cloned().collect(),
            log: self.log(),
        })
    }

    fn open_decoder(&self, _source: &SyntheticSource, stream: &StreamDescriptor) -> Result<SyntheticDecoder> {
        if self.media.unsupported_codec {
            return Err(PlayerError::UnsupportedCodec {
                codec: stream.codec.clone(),
            });
        }
        if self.media.fail_decoder_open {
            return Err(PlayerError::DecoderOpen {
                codec: stream.codec.clone(),
                reason: "synthetic failure".to_string(),
            });
        }
        self.log.borrow_mut().record("acquire:decoder");
        Ok(SyntheticDecoder {
            format: self.media.format,
            size: (stream.width, stream.height),
            log: self.log(),
        })
    }

    fn open_converter(&self, decoder: &SyntheticDecoder, _stream: &StreamDescriptor) -> Result<SyntheticConverter> {
        if self.media.fail_converter {
            return Err(PlayerError::ConversionContext {
                src_format: decoder.pixel_format(),
                reason: "synthetic failure".to_string(),
            });
        }
        self.log.borrow_mut().record("acquire:converter");
        Ok(SyntheticConverter { log: self.log() })
    }

    fn alloc_frame(&self) -> SyntheticFrame {
        self.log.borrow_mut().record("acquire:frame");
        let (width, height) = self
            .media
            .streams
            .iter()
            .find(|s| s.kind == MediaKind::Video)
            .map(|s| (s.width, s.height))
            .unwrap_or((0, 0));
        SyntheticFrame {
            format: self.media.format,
            width,
            height,
            data: vec![0; width as usize * height as usize * self.media.format.bytes_per_pixel()],
            log: self.log(),
        }
    }
}

//! FFmpeg media backend
//!
//! Demuxing, decoding and RGBA conversion through FFmpeg.

use std::path::Path;

use tracing::debug;

use ffmpeg_next as ffmpeg;
use ffmpeg::format::Pixel;
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{Context as Scaler, Flags};
use ffmpeg::util::frame::video::Video as VideoFrame;

use crate::error::{PlayerError, Result};

use super::backend::{
    DecodeStatus, FrameDecoder, MediaBackend, MediaKind, PacketSource, PixelConverter,
    StreamDescriptor,
};
use super::buffer::{image_buffer_size, RgbaBuffer, LINE_ALIGN, RGBA_BYTES_PER_PIXEL};

/// Media backend backed by FFmpeg
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegBackend;

impl FfmpegBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Open FFmpeg input context
pub struct FfmpegSource {
    input: ffmpeg::format::context::Input,
}

impl PacketSource for FfmpegSource {
    type Packet = ffmpeg::Packet;

    fn streams(&self) -> Vec<StreamDescriptor> {
        self.input.streams().map(|stream| describe(&stream)).collect()
    }

    fn next_packet(&mut self) -> Option<(usize, ffmpeg::Packet)> {
        self.input
            .packets()
            .next()
            .map(|(stream, packet)| (stream.index(), packet))
    }
}

fn describe(stream: &ffmpeg::Stream<'_>) -> StreamDescriptor {
    let params = stream.parameters();

    let kind = match params.medium() {
        Type::Video => MediaKind::Video,
        Type::Audio => MediaKind::Audio,
        Type::Subtitle => MediaKind::Subtitle,
        _ => MediaKind::Other,
    };

    let rate = stream.avg_frame_rate();

    // Frame size is read from the decoder once the stream is opened
    StreamDescriptor {
        index: stream.index(),
        kind,
        codec: params.id().name().to_string(),
        width: 0,
        height: 0,
        avg_frame_rate: (rate.numerator(), rate.denominator()),
    }
}

/// Video decoder bound to one stream
pub struct FfmpegDecoder {
    decoder: ffmpeg::decoder::Video,
}

impl FrameDecoder for FfmpegDecoder {
    type Packet = ffmpeg::Packet;
    type Frame = VideoFrame;

    fn decode(&mut self, packet: &ffmpeg::Packet, frame: &mut VideoFrame) -> Result<DecodeStatus> {
        self.decoder
            .send_packet(packet)
            .map_err(|e| PlayerError::Decode(e.to_string()))?;

        match self.decoder.receive_frame(frame) {
            Ok(()) => Ok(DecodeStatus::Frame),
            Err(ffmpeg::Error::Other { errno }) if errno == ffmpeg::util::error::EAGAIN => {
                Ok(DecodeStatus::NeedsMorePackets)
            }
            Err(ffmpeg::Error::Eof) => Ok(DecodeStatus::NeedsMorePackets),
            Err(e) => Err(PlayerError::Decode(e.to_string())),
        }
    }

    fn pixel_format(&self) -> String {
        format!("{:?}", self.decoder.format())
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.decoder.width(), self.decoder.height())
    }
}

/// Same-size conversion from the decoder's pixel format to RGBA
pub struct FfmpegConverter {
    scaler: Scaler,
    /// RGBA frame with 32-byte aligned lines, reused for every frame
    staging: VideoFrame,
}

impl FfmpegConverter {
    pub fn new(src_format: Pixel, width: u32, height: u32) -> Result<Self> {
        let scaler = Scaler::get(
            src_format,
            width,
            height,
            Pixel::RGBA,
            width,
            height,
            Flags::FAST_BILINEAR,
        )
        .map_err(|e| PlayerError::ConversionContext {
            src_format: format!("{:?}", src_format),
            reason: e.to_string(),
        })?;

        let staging = VideoFrame::new(Pixel::RGBA, width, height);
        let required = image_buffer_size(width, height, RGBA_BYTES_PER_PIXEL, LINE_ALIGN);
        if staging.data(0).len() < required {
            return Err(PlayerError::ConversionContext {
                src_format: format!("{:?}", src_format),
                reason: format!(
                    "staging frame holds {} bytes, {} required",
                    staging.data(0).len(),
                    required
                ),
            });
        }

        debug!(
            "Conversion context {:?} -> RGBA {}x{}, staging {} bytes",
            src_format, width, height, required
        );

        Ok(Self { scaler, staging })
    }
}

impl PixelConverter for FfmpegConverter {
    type Frame = VideoFrame;

    fn convert(&mut self, frame: &VideoFrame, out: &mut RgbaBuffer) -> Result<()> {
        self.scaler
            .run(frame, &mut self.staging)
            .map_err(|e| PlayerError::Convert(e.to_string()))?;

        out.copy_from_strided(self.staging.data(0), self.staging.stride(0));
        Ok(())
    }
}

impl MediaBackend for FfmpegBackend {
    type Packet = ffmpeg::Packet;
    type Frame = VideoFrame;
    type Source = FfmpegSource;
    type Decoder = FfmpegDecoder;
    type Converter = FfmpegConverter;

    fn open_source(&self, path: &Path) -> Result<FfmpegSource> {
        let open_error = |e: ffmpeg::Error| PlayerError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        // Safe to call multiple times
        ffmpeg::init().map_err(open_error)?;

        // Also reads stream information
        let input = ffmpeg::format::input(&path).map_err(open_error)?;

        Ok(FfmpegSource { input })
    }

    fn open_decoder(&self, source: &FfmpegSource, stream: &StreamDescriptor) -> Result<FfmpegDecoder> {
        let open_error = |reason: String| PlayerError::DecoderOpen {
            codec: stream.codec.clone(),
            reason,
        };

        let av_stream = source
            .input
            .stream(stream.index)
            .ok_or_else(|| open_error(format!("stream #{} disappeared", stream.index)))?;
        let params = av_stream.parameters();

        if ffmpeg::decoder::find(params.id()).is_none() {
            return Err(PlayerError::UnsupportedCodec {
                codec: stream.codec.clone(),
            });
        }

        let context = ffmpeg::codec::context::Context::from_parameters(params)
            .map_err(|e| open_error(e.to_string()))?;
        let decoder = context
            .decoder()
            .video()
            .map_err(|e| open_error(e.to_string()))?;

        debug!(
            "Opened {} decoder: {}x{} {:?}",
            stream.codec,
            decoder.width(),
            decoder.height(),
            decoder.format()
        );

        Ok(FfmpegDecoder { decoder })
    }

    fn open_converter(&self, decoder: &FfmpegDecoder, stream: &StreamDescriptor) -> Result<FfmpegConverter> {
        FfmpegConverter::new(decoder.decoder.format(), stream.width, stream.height)
    }

    fn alloc_frame(&self) -> VideoFrame {
        VideoFrame::empty()
    }
}

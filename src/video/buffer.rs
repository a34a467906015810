//! Frame buffers
//!
//! The packed RGBA output buffer and the single-slot mailbox that tells the
//! presentation side a new frame is waiting.

use image::{Rgba, RgbaImage};

/// Bytes per RGBA pixel
pub const RGBA_BYTES_PER_PIXEL: usize = 4;

/// Line alignment used for converter staging frames
pub const LINE_ALIGN: usize = 32;

/// Round `value` up to a multiple of `align` (`align` must be non-zero)
fn align_up(value: usize, align: usize) -> usize {
    value.div_ceil(align) * align
}

/// Size in bytes of a packed single-plane image whose lines are padded to
/// `align` bytes
pub fn image_buffer_size(width: u32, height: u32, bytes_per_pixel: usize, align: usize) -> usize {
    align_up(width as usize * bytes_per_pixel, align) * height as usize
}

/// Contiguous `width * height * 4` RGBA buffer, overwritten in place
pub struct RgbaBuffer {
    image: RgbaImage,
}

impl RgbaBuffer {
    /// Allocate a zeroed buffer for the given dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Bytes per output row
    pub fn row_bytes(&self) -> usize {
        self.image.width() as usize * RGBA_BYTES_PER_PIXEL
    }

    /// Raw pixel bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Mutable raw pixel bytes; the length never changes
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.image
    }

    /// Pixel at (x, y)
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let Rgba(px) = *self.image.get_pixel(x, y);
        px
    }

    /// Copy rows from a strided source plane, dropping line padding
    pub fn copy_from_strided(&mut self, data: &[u8], stride: usize) {
        let row_bytes = self.row_bytes();
        if stride == row_bytes {
            let len = self.as_bytes().len();
            self.as_bytes_mut().copy_from_slice(&data[..len]);
            return;
        }

        for (y, row) in self.as_bytes_mut().chunks_exact_mut(row_bytes).enumerate() {
            let start = y * stride;
            row.copy_from_slice(&data[start..start + row_bytes]);
        }
    }
}

/// Single-slot mailbox with overwrite
///
/// The producer may post over an unconsumed frame (the older frame is
/// dropped); the consumer drains at most one frame per call.
#[derive(Debug, Default)]
pub struct FrameMailbox {
    ready: bool,
    overwritten: u64,
}

impl FrameMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a new frame as ready. Returns true if an unconsumed frame was
    /// overwritten.
    pub fn post(&mut self) -> bool {
        let overwrote = self.ready;
        if overwrote {
            self.overwritten += 1;
        }
        self.ready = true;
        overwrote
    }

    /// Consume the pending frame, if any
    pub fn take(&mut self) -> bool {
        std::mem::replace(&mut self.ready, false)
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Frames that were replaced before being presented
    pub fn overwritten(&self) -> u64 {
        self.overwritten
    }
}

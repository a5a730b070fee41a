//! Decoded frame pixel buffers.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::store::FrameStoreError;

/// Pixel layout of every frame in a visualization.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// One unsigned byte of luminance per pixel.
    #[default]
    Luminance8,
    /// One 32-bit float of intensity per pixel.
    AlphaF32,
}

impl PixelFormat {
    /// Bytes used by one pixel.
    #[must_use]
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            Self::Luminance8 => 1,
            Self::AlphaF32 => 4,
        }
    }

    /// Matching single-channel GPU texture format.
    #[must_use]
    pub fn texture_format(self) -> wgpu::TextureFormat {
        match self {
            Self::Luminance8 => wgpu::TextureFormat::R8Unorm,
            Self::AlphaF32 => wgpu::TextureFormat::R32Float,
        }
    }
}

/// Pixel dimensions shared by all frames of all windows.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
pub struct FrameSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameSize {
    /// Size of `width` × `height` pixels.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total pixel count.
    #[must_use]
    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        Self::new(50, 50)
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One decoded, GPU-uploadable image belonging to a window and time index.
///
/// Frames are immutable once built; uploads borrow the pixel bytes.
#[derive(Clone, PartialEq)]
pub struct Frame {
    size: FrameSize,
    format: PixelFormat,
    pixels: Box<[u8]>,
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("size", &self.size)
            .field("format", &self.format)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

impl Frame {
    /// Frame from 8-bit luminance values, row-major.
    ///
    /// # Errors
    ///
    /// Returns [`FrameStoreError::BufferLength`] if `pixels` does not hold
    /// exactly one byte per pixel.
    pub fn luminance(
        size: FrameSize,
        pixels: Vec<u8>,
    ) -> Result<Self, FrameStoreError> {
        Self::from_bytes(size, PixelFormat::Luminance8, pixels)
    }

    /// Frame from float intensity values, row-major.
    ///
    /// # Errors
    ///
    /// Returns [`FrameStoreError::BufferLength`] if `values` does not hold
    /// exactly one float per pixel.
    pub fn alpha(
        size: FrameSize,
        values: &[f32],
    ) -> Result<Self, FrameStoreError> {
        let bytes = bytemuck::cast_slice::<f32, u8>(values).to_vec();
        Self::from_bytes(size, PixelFormat::AlphaF32, bytes)
    }

    /// Frame from raw bytes already laid out in `format`.
    ///
    /// # Errors
    ///
    /// Returns [`FrameStoreError::BufferLength`] if the byte count does not
    /// match `size` and `format`.
    pub fn from_bytes(
        size: FrameSize,
        format: PixelFormat,
        pixels: Vec<u8>,
    ) -> Result<Self, FrameStoreError> {
        let expected = size.pixel_count() * format.bytes_per_pixel() as usize;
        if pixels.len() != expected {
            return Err(FrameStoreError::BufferLength {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            size,
            format,
            pixels: pixels.into_boxed_slice(),
        })
    }

    /// Pixel dimensions.
    #[must_use]
    pub fn size(&self) -> FrameSize {
        self.size
    }

    /// Pixel layout.
    #[must_use]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Raw pixel bytes, row-major, tightly packed.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Bytes in one row of pixels.
    #[must_use]
    pub fn bytes_per_row(&self) -> u32 {
        self.size.width * self.format.bytes_per_pixel()
    }
}

//! Frame sources: where decoded pixel buffers come from.

use std::fmt;
use std::path::{Path, PathBuf};

use rand::{Rng, SeedableRng};

use super::frame::{Frame, FrameSize, PixelFormat};
use super::store::FrameStoreError;

/// Why a single frame could not be produced.
#[derive(Debug)]
pub enum DecodeError {
    /// The image file could not be read or decoded.
    Image {
        /// File that failed.
        path: PathBuf,
        /// Underlying decoder error.
        source: image::ImageError,
    },
    /// The decoded image does not have the visualization's frame size.
    SizeMismatch {
        /// File that failed.
        path: PathBuf,
        /// Expected frame size.
        expected: FrameSize,
        /// Decoded frame size.
        actual: FrameSize,
    },
    /// The decoded pixels could not form a frame.
    Frame(FrameStoreError),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image { path, source } => {
                write!(f, "failed to decode {}: {source}", path.display())
            }
            Self::SizeMismatch {
                path,
                expected,
                actual,
            } => write!(
                f,
                "{} is {actual}, expected {expected}",
                path.display()
            ),
            Self::Frame(e) => write!(f, "invalid frame: {e}"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Image { source, .. } => Some(source),
            Self::Frame(e) => Some(e),
            Self::SizeMismatch { .. } => None,
        }
    }
}

impl From<FrameStoreError> for DecodeError {
    fn from(e: FrameStoreError) -> Self {
        Self::Frame(e)
    }
}

/// Produces the decoded frame for a `(window, time)` slot.
///
/// Implementations are called concurrently from loader worker threads.
pub trait FrameSource: Send + Sync {
    /// Pixel size of every frame this source yields.
    fn frame_size(&self) -> FrameSize;

    /// Pixel format of every frame this source yields.
    fn format(&self) -> PixelFormat;

    /// Decode the frame for `window` at `time`.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the frame cannot be produced.
    fn decode(&self, window: usize, time: usize) -> Result<Frame, DecodeError>;
}

/// Random-intensity frames, one deterministic noise field per slot.
#[derive(Debug, Clone)]
pub struct NoiseSource {
    size: FrameSize,
    format: PixelFormat,
    seed: u64,
}

impl NoiseSource {
    /// Noise frames of `size` in `format`, seeded by `seed`.
    #[must_use]
    pub fn new(size: FrameSize, format: PixelFormat, seed: u64) -> Self {
        Self { size, format, seed }
    }

    fn slot_seed(&self, window: usize, time: usize) -> u64 {
        self.seed
            ^ (window as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ (time as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
    }
}

impl FrameSource for NoiseSource {
    fn frame_size(&self) -> FrameSize {
        self.size
    }

    fn format(&self) -> PixelFormat {
        self.format
    }

    fn decode(&self, window: usize, time: usize) -> Result<Frame, DecodeError> {
        let mut rng =
            rand::rngs::StdRng::seed_from_u64(self.slot_seed(window, time));
        let count = self.size.pixel_count();
        let frame = match self.format {
            PixelFormat::Luminance8 => {
                let pixels = (0..count).map(|_| rng.random::<u8>()).collect();
                Frame::luminance(self.size, pixels)?
            }
            PixelFormat::AlphaF32 => {
                let values: Vec<f32> =
                    (0..count).map(|_| rng.random::<f32>()).collect();
                Frame::alpha(self.size, &values)?
            }
        };
        Ok(frame)
    }
}

/// Image files on disk, decoded to 8-bit luminance.
///
/// Paths are built from a template containing `{window}` and `{time}`
/// placeholders, relative to a root directory.
#[derive(Debug, Clone)]
pub struct ImageSequenceSource {
    root: PathBuf,
    template: String,
    size: FrameSize,
}

impl ImageSequenceSource {
    /// Default file layout: one directory per window, one file per time.
    pub const DEFAULT_TEMPLATE: &'static str = "{window}/{time}.png";

    /// Source reading `root/template` files of the given `size`.
    #[must_use]
    pub fn new(
        root: impl Into<PathBuf>,
        template: impl Into<String>,
        size: FrameSize,
    ) -> Self {
        Self {
            root: root.into(),
            template: template.into(),
            size,
        }
    }

    /// Root directory frames are read from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for `window` at `time`.
    #[must_use]
    pub fn path_for(&self, window: usize, time: usize) -> PathBuf {
        let relative = self
            .template
            .replace("{window}", &window.to_string())
            .replace("{time}", &time.to_string());
        self.root.join(relative)
    }
}

impl FrameSource for ImageSequenceSource {
    fn frame_size(&self) -> FrameSize {
        self.size
    }

    fn format(&self) -> PixelFormat {
        PixelFormat::Luminance8
    }

    fn decode(&self, window: usize, time: usize) -> Result<Frame, DecodeError> {
        let path = self.path_for(window, time);
        let image = image::open(&path)
            .map_err(|source| DecodeError::Image {
                path: path.clone(),
                source,
            })?
            .to_luma8();

        let actual = FrameSize::new(image.width(), image.height());
        if actual != self.size {
            return Err(DecodeError::SizeMismatch {
                path,
                expected: self.size,
                actual,
            });
        }
        Ok(Frame::luminance(self.size, image.into_raw())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_is_deterministic_per_slot() {
        let source =
            NoiseSource::new(FrameSize::new(8, 8), PixelFormat::AlphaF32, 42);
        let a = source.decode(1, 2).unwrap();
        let b = source.decode(1, 2).unwrap();
        let c = source.decode(2, 1).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        let values: &[f32] = bytemuck::cast_slice(a.bytes());
        assert!(values.iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn template_paths_substitute_indices() {
        let source = ImageSequenceSource::new(
            "/data",
            "w{window}_t{time}.png",
            FrameSize::new(4, 4),
        );
        assert_eq!(
            source.path_for(3, 12),
            PathBuf::from("/data/w3_t12.png")
        );
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let source = ImageSequenceSource::new(
            "/nonexistent-framewall-root",
            ImageSequenceSource::DEFAULT_TEMPLATE,
            FrameSize::new(4, 4),
        );
        assert!(matches!(
            source.decode(0, 0),
            Err(DecodeError::Image { .. })
        ));
    }

    #[test]
    fn image_files_decode_to_luminance() {
        let dir = std::env::temp_dir()
            .join(format!("framewall-source-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("0")).unwrap();
        let img = image::GrayImage::from_fn(4, 3, |x, y| image::Luma([(x + y * 4) as u8]));
        img.save(dir.join("0/1.png")).unwrap();

        let source = ImageSequenceSource::new(
            &dir,
            ImageSequenceSource::DEFAULT_TEMPLATE,
            FrameSize::new(4, 3),
        );
        let frame = source.decode(0, 1).unwrap();
        assert_eq!(frame.bytes()[5], 5);

        let wrong = ImageSequenceSource::new(
            &dir,
            ImageSequenceSource::DEFAULT_TEMPLATE,
            FrameSize::new(8, 8),
        );
        assert!(matches!(
            wrong.decode(0, 1),
            Err(DecodeError::SizeMismatch { .. })
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }
}

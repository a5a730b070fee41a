//! Pre-sized, out-of-order-fillable storage for every window's frames.

use std::fmt;

use super::frame::{Frame, FrameSize, PixelFormat};

/// Reasons a frame cannot be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameStoreError {
    /// Window index beyond the configured window count.
    WindowOutOfRange {
        /// Requested window.
        window: usize,
        /// Configured window count.
        num_windows: usize,
    },
    /// Time index beyond the configured timepoint count.
    TimeOutOfRange {
        /// Requested time index.
        time: usize,
        /// Configured timepoint count.
        num_timepoints: usize,
    },
    /// Frame dimensions differ from the store's fixed size.
    SizeMismatch {
        /// Store frame size.
        expected: FrameSize,
        /// Offending frame size.
        actual: FrameSize,
    },
    /// Frame pixel format differs from the store's format.
    FormatMismatch {
        /// Store pixel format.
        expected: PixelFormat,
        /// Offending pixel format.
        actual: PixelFormat,
    },
    /// Pixel buffer length does not match dimensions and format.
    BufferLength {
        /// Required byte count.
        expected: usize,
        /// Supplied byte count.
        actual: usize,
    },
}

impl fmt::Display for FrameStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WindowOutOfRange {
                window,
                num_windows,
            } => write!(f, "window {window} out of range ({num_windows} windows)"),
            Self::TimeOutOfRange {
                time,
                num_timepoints,
            } => write!(
                f,
                "time index {time} out of range ({num_timepoints} timepoints)"
            ),
            Self::SizeMismatch { expected, actual } => {
                write!(f, "frame is {actual}, expected {expected}")
            }
            Self::FormatMismatch { expected, actual } => {
                write!(f, "frame format {actual:?}, expected {expected:?}")
            }
            Self::BufferLength { expected, actual } => {
                write!(f, "pixel buffer has {actual} bytes, expected {expected}")
            }
        }
    }
}

impl std::error::Error for FrameStoreError {}

/// Every window's frame sequence, stored window-major in one flat slot
/// array sized `num_windows × num_timepoints` up front.
///
/// Frames may arrive in any order; each newly filled slot bumps the loaded
/// count exactly once. [`all_loaded`](Self::all_loaded) is monotonic.
#[derive(Debug)]
pub struct FrameStore {
    num_windows: usize,
    num_timepoints: usize,
    frame_size: FrameSize,
    format: PixelFormat,
    slots: Vec<Option<Frame>>,
    loaded: usize,
}

impl FrameStore {
    /// Empty store with every slot pre-allocated.
    #[must_use]
    pub fn new(
        num_windows: usize,
        num_timepoints: usize,
        frame_size: FrameSize,
        format: PixelFormat,
    ) -> Self {
        let mut slots = Vec::new();
        slots.resize_with(num_windows * num_timepoints, || None);
        Self {
            num_windows,
            num_timepoints,
            frame_size,
            format,
            slots,
            loaded: 0,
        }
    }

    fn slot_index(
        &self,
        window: usize,
        time: usize,
    ) -> Result<usize, FrameStoreError> {
        if window >= self.num_windows {
            return Err(FrameStoreError::WindowOutOfRange {
                window,
                num_windows: self.num_windows,
            });
        }
        if time >= self.num_timepoints {
            return Err(FrameStoreError::TimeOutOfRange {
                time,
                num_timepoints: self.num_timepoints,
            });
        }
        Ok(window * self.num_timepoints + time)
    }

    /// Store `frame` in its designated slot.
    ///
    /// Returns `true` if the slot was previously empty (the loaded count
    /// grew). A repeated completion for the same slot replaces the frame
    /// without counting twice.
    ///
    /// # Errors
    ///
    /// Returns a [`FrameStoreError`] if the indices are out of range or the
    /// frame does not match the store's size and format.
    pub fn insert(
        &mut self,
        window: usize,
        time: usize,
        frame: Frame,
    ) -> Result<bool, FrameStoreError> {
        let index = self.slot_index(window, time)?;
        if frame.size() != self.frame_size {
            return Err(FrameStoreError::SizeMismatch {
                expected: self.frame_size,
                actual: frame.size(),
            });
        }
        if frame.format() != self.format {
            return Err(FrameStoreError::FormatMismatch {
                expected: self.format,
                actual: frame.format(),
            });
        }

        let slot = &mut self.slots[index];
        let newly_filled = slot.is_none();
        *slot = Some(frame);
        if newly_filled {
            self.loaded += 1;
        } else {
            log::warn!("frame ({window}, {time}) delivered twice; replaced");
        }
        Ok(newly_filled)
    }

    /// Frame for `window` at `time`, if it has been stored.
    #[must_use]
    pub fn get(&self, window: usize, time: usize) -> Option<&Frame> {
        let index = self.slot_index(window, time).ok()?;
        self.slots[index].as_ref()
    }

    /// Whether the slot for `window` at `time` is filled.
    #[must_use]
    pub fn is_loaded(&self, window: usize, time: usize) -> bool {
        self.get(window, time).is_some()
    }

    /// Number of filled slots.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.loaded
    }

    /// Number of slots.
    #[must_use]
    pub fn total(&self) -> usize {
        self.slots.len()
    }

    /// Whether every slot is filled.
    #[must_use]
    pub fn all_loaded(&self) -> bool {
        self.loaded == self.slots.len()
    }

    /// Window count.
    #[must_use]
    pub fn num_windows(&self) -> usize {
        self.num_windows
    }

    /// Frames per window.
    #[must_use]
    pub fn num_timepoints(&self) -> usize {
        self.num_timepoints
    }

    /// Fixed frame size.
    #[must_use]
    pub fn frame_size(&self) -> FrameSize {
        self.frame_size
    }

    /// Fixed pixel format.
    #[must_use]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Consume the store, yielding `(window, time, frame)` for every filled
    /// slot.
    pub fn into_frames(self) -> impl Iterator<Item = (usize, usize, Frame)> {
        let num_timepoints = self.num_timepoints.max(1);
        self.slots
            .into_iter()
            .enumerate()
            .filter_map(move |(index, slot)| {
                slot.map(|frame| {
                    (index / num_timepoints, index % num_timepoints, frame)
                })
            })
    }
}

//! Frame storage and loading.
//!
//! Frames are decoded off the render thread by a [`loader::FrameLoader`],
//! stored out of order in a pre-sized [`store::FrameStore`], and playback
//! is gated on a one-shot [`barrier::LoadBarrier`].

/// One-shot load barrier and decode-failure policy.
pub mod barrier;
/// Decoded pixel buffers.
pub mod frame;
/// Background decode worker pool.
pub mod loader;
/// Frame sources (image files, noise).
pub mod source;
/// Pre-sized frame slot storage.
pub mod store;

pub use barrier::{FailurePolicy, LoadBarrier, LoadProgress, ReadyReason};
pub use frame::{Frame, FrameSize, PixelFormat};
pub use loader::{FrameLoader, LoadPlan, LoadedFrame};
pub use source::{DecodeError, FrameSource, ImageSequenceSource, NoiseSource};
pub use store::{FrameStore, FrameStoreError};

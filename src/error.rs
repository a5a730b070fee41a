//! Crate-level error types.

use std::fmt;

use crate::frames::store::FrameStoreError;
use crate::gpu::render_context::RenderContextError;

/// Errors produced by the framewall crate.
#[derive(Debug)]
pub enum FramewallError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// Shader composition failure.
    Shader(String),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// Failed to spawn a background thread.
    ThreadSpawn(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Host data could not be normalized into a layout.
    DataFormat(String),
    /// A decoded frame was rejected by the frame store.
    FrameStore(FrameStoreError),
    /// The animation clock was started twice.
    ClockAlreadyStarted,
    /// A draw was issued without a matching upload.
    StaleUpload,
    /// The surface texture could not be acquired.
    Surface(wgpu::SurfaceError),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for FramewallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Shader(msg) => write!(f, "shader error: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ThreadSpawn(e) => {
                write!(f, "failed to spawn thread: {e}")
            }
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::DataFormat(msg) => write!(f, "data format error: {msg}"),
            Self::FrameStore(e) => write!(f, "frame store error: {e}"),
            Self::ClockAlreadyStarted => {
                write!(f, "animation clock already started")
            }
            Self::StaleUpload => {
                write!(f, "draw issued without a matching frame upload")
            }
            Self::Surface(e) => write!(f, "surface error: {e}"),
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for FramewallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Io(e) | Self::ThreadSpawn(e) => Some(e),
            Self::FrameStore(e) => Some(e),
            Self::Surface(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for FramewallError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for FramewallError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<FrameStoreError> for FramewallError {
    fn from(e: FrameStoreError) -> Self {
        Self::FrameStore(e)
    }
}

impl From<wgpu::SurfaceError> for FramewallError {
    fn from(e: wgpu::SurfaceError) -> Self {
        Self::Surface(e)
    }
}

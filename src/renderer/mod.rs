//! Drawing windows: the backend seam the compositor drives, the quad
//! geometry and pipeline, and the wgpu implementation of the backend.

pub mod gpu_backend;
pub(crate) mod pipeline_util;
pub mod quad;

use glam::{Vec2, Vec3};

use crate::camera::core::SceneGlobals;
use crate::error::FramewallError;
use crate::frames::Frame;

pub use gpu_backend::{GpuFrame, GpuSceneRenderer};
pub use quad::{quad_vertices, QuadRenderer, QUAD_TEXCOORDS};

/// Proof that a frame's pixels are resident in the shared texture.
///
/// Only [`RenderBackend::upload`] hands these out, and
/// [`RenderBackend::draw_instance`] consumes one, so a draw can never sample
/// pixels that were not uploaded for it.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "an upload is wasted unless its token is drawn"]
pub struct UploadToken {
    generation: u64,
}

impl UploadToken {
    pub(crate) fn new(generation: u64) -> Self {
        Self { generation }
    }

    /// Upload sequence number within the frame.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Per-tick drawing operations the compositor issues.
///
/// Calls arrive as `begin_frame`, then optionally `set_globals` followed by
/// any number of `upload`/`draw_instance` pairs, then `end_frame`.
pub trait RenderBackend {
    /// Start a tick. The background is cleared before anything is drawn.
    ///
    /// # Errors
    ///
    /// Backend-specific failure to start the frame.
    fn begin_frame(&mut self) -> Result<(), FramewallError>;

    /// Set the projection, view, and model matrices for the rest of the tick.
    fn set_globals(&mut self, globals: &SceneGlobals);

    /// Make `frame` the texture the next draw samples.
    ///
    /// # Errors
    ///
    /// Fails if the frame does not match the backend's texture.
    fn upload(&mut self, frame: &Frame) -> Result<UploadToken, FramewallError>;

    /// Draw one window quad at `position` with `size`, sampling the upload
    /// `token` refers to.
    ///
    /// # Errors
    ///
    /// Fails if the token is stale.
    fn draw_instance(
        &mut self,
        token: UploadToken,
        position: Vec3,
        size: Vec2,
    ) -> Result<(), FramewallError>;

    /// Finish the tick.
    ///
    /// # Errors
    ///
    /// Backend-specific failure to finish the frame.
    fn end_frame(&mut self) -> Result<(), FramewallError>;
}

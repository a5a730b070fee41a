use glam::Mat4;

use crate::camera::controller::OrbitCamera;

/// Perspective projection parameters for the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fovy: 45.0,
            aspect: 1.0,
            znear: 0.1,
            zfar: 1000.0,
        }
    }
}

impl Projection {
    /// Update the aspect ratio from a viewport size. Ignores zero-sized
    /// dimensions.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Build the projection matrix.
    #[must_use]
    pub fn build_matrix(&self) -> Mat4 {
        // perspective_rh already uses [0,1] depth range (wgpu/Vulkan
        // convention)
        Mat4::perspective_rh(
            self.fovy.to_radians(),
            self.aspect,
            self.znear,
            self.zfar,
        )
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
/// Per-tick GPU uniform: projection, view and model matrices.
///
/// Written once per render tick, before any window is drawn.
pub struct SceneGlobals {
    /// Projection matrix.
    pub projection: [[f32; 4]; 4],
    /// View matrix from the orbit camera.
    pub view: [[f32; 4]; 4],
    /// Model matrix (identity; windows are placed in world space).
    pub model: [[f32; 4]; 4],
}

impl Default for SceneGlobals {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY.to_cols_array_2d(),
            view: Mat4::IDENTITY.to_cols_array_2d(),
            model: Mat4::IDENTITY.to_cols_array_2d(),
        }
    }
}

impl SceneGlobals {
    /// Globals for the given projection and camera state.
    #[must_use]
    pub fn new(projection: &Projection, camera: &OrbitCamera) -> Self {
        Self {
            projection: projection.build_matrix().to_cols_array_2d(),
            view: camera.view_matrix().to_cols_array_2d(),
            model: Mat4::IDENTITY.to_cols_array_2d(),
        }
    }
}

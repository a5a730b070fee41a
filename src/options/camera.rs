use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Camera", inline)]
#[serde(default)]
/// Camera projection and control parameters.
pub struct CameraOptions {
    /// Vertical field of view in degrees.
    #[schemars(title = "Field of View", range(min = 20.0, max = 90.0), extend("step" = 1.0))]
    pub fovy: f32,
    /// Near clipping plane distance.
    #[schemars(skip)]
    pub znear: f32,
    /// Far clipping plane distance.
    #[schemars(skip)]
    pub zfar: f32,
    /// Fraction of the current distance zoomed per scroll line.
    #[schemars(title = "Zoom Step", range(min = 0.01, max = 0.5), extend("step" = 0.01))]
    pub zoom_step: f32,
    /// Closest the eye may get to the look-at center.
    #[schemars(skip)]
    pub min_distance: f32,
    /// Farthest the eye may get from the look-at center.
    #[schemars(skip)]
    pub max_distance: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fovy: 45.0,
            znear: 0.1,
            zfar: 1000.0,
            zoom_step: 0.1,
            min_distance: 1e-3,
            max_distance: 1e6,
        }
    }
}

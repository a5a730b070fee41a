use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Display", inline)]
#[serde(default)]
/// Scene presentation toggles.
pub struct DisplayOptions {
    /// Background clear color (RGBA), shown before frames are ready.
    #[schemars(skip)]
    pub clear_color: [f32; 4],
    /// Depth-test overlapping windows.
    #[schemars(title = "Depth Test")]
    pub depth_test: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            depth_test: true,
        }
    }
}

impl DisplayOptions {
    /// Clear color as a wgpu color.
    #[must_use]
    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_color;
        wgpu::Color {
            r: f64::from(r),
            g: f64::from(g),
            b: f64::from(b),
            a: f64::from(a),
        }
    }
}

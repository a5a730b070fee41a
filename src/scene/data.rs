//! Host-supplied visualization data: where the windows go and what their
//! frames look like.

use serde::{Deserialize, Serialize};

use crate::error::FramewallError;
use crate::frames::{FrameSize, PixelFormat};
use crate::scene::layout::Window;

fn default_num_timepoints() -> usize {
    1
}

/// Normalized layout and frame description for a visualization.
///
/// The JSON form uses camelCase keys:
///
/// ```json
/// {
///   "windowDimensions": [64.0, 48.0],
///   "offsets": [[0.0, 0.0, 0.0], [80.0, 0.0, -10.0]],
///   "frameDimensions": { "width": 50, "height": 50 },
///   "numTimepoints": 3
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationData {
    /// Default window width and height in world units.
    pub window_dimensions: [f32; 2],
    /// Lower-left corner of each window, one entry per window.
    pub offsets: Vec<[f32; 3]>,
    /// Per-window `[w, h]` overriding `window_dimensions`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<Vec<[f32; 2]>>,
    /// Pixel dimensions of every frame.
    #[serde(default)]
    pub frame_dimensions: FrameSize,
    /// Pixel format of every frame.
    #[serde(default)]
    pub pixel_format: PixelFormat,
    /// Frames per window.
    #[serde(default = "default_num_timepoints")]
    pub num_timepoints: usize,
}

impl VisualizationData {
    /// Data with one window per offset, all of `window_dimensions`.
    #[must_use]
    pub fn new(window_dimensions: [f32; 2], offsets: Vec<[f32; 3]>) -> Self {
        Self {
            window_dimensions,
            offsets,
            sizes: None,
            frame_dimensions: FrameSize::default(),
            pixel_format: PixelFormat::default(),
            num_timepoints: default_num_timepoints(),
        }
    }

    /// Set the frame layout.
    #[must_use]
    pub fn with_frames(
        mut self,
        frame_dimensions: FrameSize,
        pixel_format: PixelFormat,
        num_timepoints: usize,
    ) -> Self {
        self.frame_dimensions = frame_dimensions;
        self.pixel_format = pixel_format;
        self.num_timepoints = num_timepoints;
        self
    }

    /// Parse and validate host JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FramewallError::DataFormat`] if a key is missing, an
    /// offset does not have exactly three components, or a value fails
    /// [`validate`](Self::validate).
    pub fn from_json(raw: &serde_json::Value) -> Result<Self, FramewallError> {
        let data = Self::deserialize(raw)
            .map_err(|e| FramewallError::DataFormat(e.to_string()))?;
        data.validate()?;
        Ok(data)
    }

    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// See [`from_json`](Self::from_json).
    pub fn from_json_str(raw: &str) -> Result<Self, FramewallError> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| FramewallError::DataFormat(e.to_string()))?;
        Self::from_json(&value)
    }

    /// Check that every dimension is positive and every coordinate finite.
    ///
    /// # Errors
    ///
    /// Returns [`FramewallError::DataFormat`] describing the first problem.
    pub fn validate(&self) -> Result<(), FramewallError> {
        let invalid = |msg: String| Err(FramewallError::DataFormat(msg));

        if !is_positive_size(self.window_dimensions) {
            return invalid(format!(
                "windowDimensions must be positive, got {:?}",
                self.window_dimensions
            ));
        }
        if let Some(i) = self
            .offsets
            .iter()
            .position(|o| o.iter().any(|c| !c.is_finite()))
        {
            return invalid(format!("offset {i} is not finite"));
        }
        if let Some(sizes) = &self.sizes {
            if sizes.len() != self.offsets.len() {
                return invalid(format!(
                    "{} sizes for {} offsets",
                    sizes.len(),
                    self.offsets.len()
                ));
            }
            if let Some(i) = sizes.iter().position(|s| !is_positive_size(*s)) {
                return invalid(format!("size {i} must be positive"));
            }
        }
        if self.frame_dimensions.width == 0 || self.frame_dimensions.height == 0
        {
            return invalid(format!(
                "frameDimensions must be non-zero, got {}",
                self.frame_dimensions
            ));
        }
        if self.num_timepoints == 0 {
            return invalid("numTimepoints must be at least 1".into());
        }
        Ok(())
    }

    /// Number of windows.
    #[must_use]
    pub fn num_windows(&self) -> usize {
        self.offsets.len()
    }

    /// Frames expected across all windows.
    #[must_use]
    pub fn total_frames(&self) -> usize {
        self.num_windows() * self.num_timepoints
    }

    /// Window placements in index order.
    #[must_use]
    pub fn windows(&self) -> Vec<Window> {
        self.offsets
            .iter()
            .enumerate()
            .map(|(i, offset)| {
                let size = self
                    .sizes
                    .as_ref()
                    .and_then(|sizes| sizes.get(i))
                    .copied()
                    .unwrap_or(self.window_dimensions);
                Window::new(*offset, size)
            })
            .collect()
    }

    /// Append `other`'s windows after this data's windows.
    ///
    /// # Errors
    ///
    /// Returns [`FramewallError::DataFormat`] if the frame layouts differ,
    /// since existing frames could not be reused.
    pub fn append(&mut self, other: &Self) -> Result<(), FramewallError> {
        other.validate()?;
        if other.frame_dimensions != self.frame_dimensions
            || other.pixel_format != self.pixel_format
            || other.num_timepoints != self.num_timepoints
        {
            return Err(FramewallError::DataFormat(format!(
                "appended frames are {} {:?} x{}, expected {} {:?} x{}",
                other.frame_dimensions,
                other.pixel_format,
                other.num_timepoints,
                self.frame_dimensions,
                self.pixel_format,
                self.num_timepoints
            )));
        }

        if self.sizes.is_some()
            || other.sizes.is_some()
            || other.window_dimensions != self.window_dimensions
        {
            let mut sizes: Vec<[f32; 2]> =
                self.windows().iter().map(|w| w.size.to_array()).collect();
            sizes.extend(other.windows().iter().map(|w| w.size.to_array()));
            self.sizes = Some(sizes);
        }
        self.offsets.extend_from_slice(&other.offsets);
        Ok(())
    }
}

fn is_positive_size(size: [f32; 2]) -> bool {
    size.iter().all(|d| d.is_finite() && *d > 0.0)
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_camel_case_with_defaults() {
        let data = VisualizationData::from_json(&json!({
            "windowDimensions": [64.0, 48.0],
            "offsets": [[0.0, 0.0, 0.0], [80.0, 10.0, -5.0]],
        }))
        .unwrap();

        assert_eq!(data.num_windows(), 2);
        assert_eq!(data.num_timepoints, 1);
        assert_eq!(data.frame_dimensions, FrameSize::new(50, 50));
        assert_eq!(data.pixel_format, PixelFormat::Luminance8);

        let windows = data.windows();
        assert_eq!(windows[1].position, Vec3::new(80.0, 10.0, -5.0));
        assert_eq!(windows[1].size, Vec2::new(64.0, 48.0));
    }

    #[test]
    fn parses_frame_layout() {
        let data = VisualizationData::from_json(&json!({
            "windowDimensions": [10.0, 10.0],
            "offsets": [[0.0, 0.0, 0.0]],
            "frameDimensions": { "width": 32, "height": 16 },
            "pixelFormat": "alpha_f32",
            "numTimepoints": 7,
        }))
        .unwrap();
        assert_eq!(data.frame_dimensions, FrameSize::new(32, 16));
        assert_eq!(data.pixel_format, PixelFormat::AlphaF32);
        assert_eq!(data.total_frames(), 7);
    }

    #[test]
    fn rejects_two_component_offsets() {
        let err = VisualizationData::from_json(&json!({
            "windowDimensions": [10.0, 10.0],
            "offsets": [[0.0, 0.0]],
        }));
        assert!(matches!(err, Err(FramewallError::DataFormat(_))));
    }

    #[test]
    fn rejects_missing_keys_and_bad_values() {
        assert!(VisualizationData::from_json(&json!({ "offsets": [] })).is_err());
        assert!(VisualizationData::from_json(&json!({
            "windowDimensions": [0.0, 10.0],
            "offsets": [],
        }))
        .is_err());
        assert!(VisualizationData::from_json(&json!({
            "windowDimensions": [1.0, 1.0],
            "offsets": [[0.0, 0.0, 0.0]],
            "numTimepoints": 0,
        }))
        .is_err());
        assert!(VisualizationData::from_json(&json!({
            "windowDimensions": [1.0, 1.0],
            "offsets": [[0.0, 0.0, 0.0]],
            "sizes": [],
        }))
        .is_err());
    }

    #[test]
    fn per_window_sizes_override_default() {
        let data = VisualizationData::from_json_str(
            r#"{
                "windowDimensions": [10.0, 10.0],
                "offsets": [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]],
                "sizes": [[3.0, 4.0], [5.0, 6.0]]
            }"#,
        )
        .unwrap();
        let windows = data.windows();
        assert_eq!(windows[0].size, Vec2::new(3.0, 4.0));
        assert_eq!(windows[1].size, Vec2::new(5.0, 6.0));
    }

    #[test]
    fn append_keeps_order_and_sizes() {
        let mut data =
            VisualizationData::new([10.0, 10.0], vec![[0.0, 0.0, 0.0]]);
        let more = VisualizationData::new(
            [20.0, 5.0],
            vec![[1.0, 0.0, 0.0], [2.0, 0.0, 0.0]],
        );
        data.append(&more).unwrap();

        let windows = data.windows();
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].size, Vec2::new(10.0, 10.0));
        assert_eq!(windows[2].position.x, 2.0);
        assert_eq!(windows[2].size, Vec2::new(20.0, 5.0));
    }

    #[test]
    fn append_rejects_different_frame_layout() {
        let mut data =
            VisualizationData::new([10.0, 10.0], vec![[0.0, 0.0, 0.0]]);
        let more = VisualizationData::new([10.0, 10.0], vec![[1.0, 0.0, 0.0]])
            .with_frames(FrameSize::new(8, 8), PixelFormat::Luminance8, 1);
        assert!(data.append(&more).is_err());
        assert_eq!(data.num_windows(), 1);
    }

    #[test]
    fn json_round_trip_uses_camel_case() {
        let data = VisualizationData::new([1.0, 2.0], vec![[3.0, 4.0, 5.0]]);
        let value = serde_json::to_value(&data).unwrap();
        assert!(value.get("windowDimensions").is_some());
        assert!(value.get("numTimepoints").is_some());
        assert!(value.get("sizes").is_none());
    }
}

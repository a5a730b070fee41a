//! The window scene: host data, window layout, and per-tick compositing.

pub mod compositor;
pub mod data;
pub mod layout;

pub use compositor::{RenderStats, SceneCompositor, SceneView};
pub use data::VisualizationData;
pub use layout::{random_layout, Window};

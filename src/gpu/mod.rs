//! GPU resource management utilities.
//!
//! Provides wgpu device/surface initialization, the streamed frame texture,
//! the depth target, and shader composition.

/// Shared wgpu boilerplate helpers for layouts and samplers.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;
/// Streamed frame texture and depth attachment.
pub mod texture;

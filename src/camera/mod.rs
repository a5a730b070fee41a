//! Camera system for 3D scene viewing.
//!
//! Provides an orbit camera with rotation, panning and zoom, the
//! projection/view uniforms derived from it, and the per-tick input mapping.

/// Orbit camera state and its incremental update algebra.
pub mod controller;
/// Projection parameters and the per-tick GPU globals uniform.
pub mod core;
/// Polled-input to camera-operation mapping.
pub mod input;

pub use controller::OrbitCamera;
pub use input::InputController;

// -- Lint policy ---------------------------------------------------------
// Crate-wide clippy policy. Rustc lints are configured in Cargo.toml.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Function signature hygiene
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Tests may unwrap and index freely
#![cfg_attr(
    test,
    allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)
)]

//! GPU-accelerated wall of time-varying image windows built on wgpu.
//!
//! Framewall draws many small image "windows" as textured quads in one 3D
//! scene. Every window plays its own frame sequence in lockstep with the
//! others, and the scene is explored with an orbit camera.
//!
//! # Key entry points
//!
//! - [`visualization::Visualization`] - the host lifecycle: data, loading,
//!   input, and drawing
//! - [`scene::VisualizationData`] - window layout and frame description
//! - [`frames`] - frame storage, decoding, and the load barrier
//! - [`options::Options`] - runtime configuration (camera, playback,
//!   loading, display)
//!
//! # Architecture
//!
//! Frames are decoded on background threads and collected on the render
//! thread into a pre-sized [`frames::FrameStore`]. Nothing is drawn until
//! the [`frames::LoadBarrier`] opens; then an
//! [`animation::AnimationClock`] on its own thread advances the shared
//! time index at a fixed rate. Each tick the
//! [`scene::SceneCompositor`] walks the windows in order and, through a
//! [`renderer::RenderBackend`], uploads the window's current frame into a
//! single shared texture and draws its quad before moving on.

pub mod animation;
pub mod camera;
pub mod error;
pub mod frames;
pub mod gpu;
pub mod input;
pub mod options;
pub mod renderer;
pub mod scene;
pub mod util;
#[cfg(feature = "viewer")]
pub mod viewer;
pub mod visualization;

pub use error::FramewallError;
pub use input::{InputEvent, MouseButton};
pub use options::Options;
#[cfg(feature = "viewer")]
pub use viewer::Viewer;
pub use visualization::Visualization;

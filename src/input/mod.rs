//! Input handling: platform-agnostic event types and the tracker that
//! turns raw window events into one polled snapshot per render tick.

/// Platform-agnostic input events.
pub mod event;
/// Button and pointer tracking across a render tick.
pub mod mouse;

pub use event::{InputEvent, MouseButton};
pub use mouse::{PointerTracker, TickInput};

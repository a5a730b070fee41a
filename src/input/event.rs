/// Platform-agnostic input events.
///
/// These are fed into a [`PointerTracker`](super::PointerTracker), which
/// folds them into one [`TickInput`](super::TickInput) snapshot per render
/// tick.
///
/// # Example
///
/// ```
/// use framewall::input::{InputEvent, MouseButton, PointerTracker};
///
/// let mut tracker = PointerTracker::new();
/// tracker.handle_event(InputEvent::MouseButton {
///     button: MouseButton::Left,
///     pressed: true,
/// });
/// tracker.handle_event(InputEvent::CursorMoved { x: 100.0, y: 200.0 });
/// let tick = tracker.snapshot(glam::Vec2::new(800.0, 600.0));
/// assert!(tick.was_down(MouseButton::Left));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Cursor moved to absolute screen position.
    CursorMoved {
        /// Horizontal position in physical pixels.
        x: f32,
        /// Vertical position in physical pixels.
        y: f32,
    },
    /// Mouse button pressed or released.
    MouseButton {
        /// Which button changed.
        button: MouseButton,
        /// `true` for press, `false` for release.
        pressed: bool,
    },
    /// Scroll wheel movement, in lines.
    Scroll {
        /// Horizontal scroll amount.
        x: f32,
        /// Vertical scroll amount.
        y: f32,
    },
}

/// Platform-agnostic mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary (left) mouse button.
    Left,
    /// Secondary (right) mouse button.
    Right,
    /// Middle mouse button (wheel click).
    Middle,
}

#[cfg(feature = "viewer")]
impl From<winit::event::MouseButton> for MouseButton {
    fn from(button: winit::event::MouseButton) -> Self {
        match button {
            winit::event::MouseButton::Right => Self::Right,
            winit::event::MouseButton::Middle => Self::Middle,
            _ => Self::Left,
        }
    }
}

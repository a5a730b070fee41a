use glam::Vec2;

use super::event::{InputEvent, MouseButton};

/// Input state for one render tick, as polled from the window shell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    /// Left button was held at some point during the tick.
    pub left_down: bool,
    /// Right button was held at some point during the tick.
    pub right_down: bool,
    /// Middle button was held at some point during the tick.
    pub middle_down: bool,
    /// Pointer position at the end of the tick, in pixels.
    pub pointer: Vec2,
    /// Pointer position at the end of the previous tick, in pixels.
    pub prev_pointer: Vec2,
    /// Scroll accumulated over the tick.
    pub scroll: Vec2,
    /// Viewport size in pixels.
    pub viewport: Vec2,
}

impl TickInput {
    /// Idle input for a viewport of the given size.
    #[must_use]
    pub fn idle(viewport: Vec2) -> Self {
        Self {
            left_down: false,
            right_down: false,
            middle_down: false,
            pointer: Vec2::ZERO,
            prev_pointer: Vec2::ZERO,
            scroll: Vec2::ZERO,
            viewport,
        }
    }

    /// Whether `button` was down during this tick.
    #[must_use]
    pub fn was_down(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.left_down,
            MouseButton::Right => self.right_down,
            MouseButton::Middle => self.middle_down,
        }
    }

    /// Pointer movement since the previous tick, in pixels.
    #[must_use]
    pub fn pointer_delta(&self) -> Vec2 {
        self.pointer - self.prev_pointer
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ButtonState {
    held: bool,
    /// Pressed at any point since the last snapshot, even if already
    /// released.
    seen: bool,
}

impl ButtonState {
    fn set(&mut self, pressed: bool) {
        self.held = pressed;
        self.seen |= pressed;
    }

    fn take(&mut self) -> bool {
        let down = self.held || self.seen;
        self.seen = self.held;
        down
    }
}

/// Folds raw window events into per-tick [`TickInput`] snapshots.
///
/// Pointer position carries over between ticks; scroll is accumulated and
/// reset on every snapshot.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    left: ButtonState,
    right: ButtonState,
    middle: ButtonState,
    pointer: Vec2,
    prev_pointer: Vec2,
    scroll: Vec2,
}

impl PointerTracker {
    /// Tracker with no buttons held and the pointer at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one event.
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::CursorMoved { x, y } => {
                self.pointer = Vec2::new(x, y);
            }
            InputEvent::MouseButton { button, pressed } => match button {
                MouseButton::Left => self.left.set(pressed),
                MouseButton::Right => self.right.set(pressed),
                MouseButton::Middle => self.middle.set(pressed),
            },
            InputEvent::Scroll { x, y } => {
                self.scroll += Vec2::new(x, y);
            }
        }
    }

    /// Current pointer position in pixels.
    #[must_use]
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// Produce the snapshot for the tick that just ended and start a new
    /// one.
    pub fn snapshot(&mut self, viewport: Vec2) -> TickInput {
        let tick = TickInput {
            left_down: self.left.take(),
            right_down: self.right.take(),
            middle_down: self.middle.take(),
            pointer: self.pointer,
            prev_pointer: self.prev_pointer,
            scroll: self.scroll,
            viewport,
        };
        self.prev_pointer = self.pointer;
        self.scroll = Vec2::ZERO;
        tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    fn press(button: MouseButton, pressed: bool) -> InputEvent {
        InputEvent::MouseButton { button, pressed }
    }

    #[test]
    fn previous_pointer_is_last_snapshot_position() {
        let mut tracker = PointerTracker::new();
        tracker.handle_event(InputEvent::CursorMoved { x: 10.0, y: 20.0 });
        let first = tracker.snapshot(VIEWPORT);
        assert_eq!(first.prev_pointer, Vec2::ZERO);

        tracker.handle_event(InputEvent::CursorMoved { x: 15.0, y: 25.0 });
        tracker.handle_event(InputEvent::CursorMoved { x: 30.0, y: 40.0 });
        let second = tracker.snapshot(VIEWPORT);
        assert_eq!(second.prev_pointer, Vec2::new(10.0, 20.0));
        assert_eq!(second.pointer_delta(), Vec2::new(20.0, 20.0));
    }

    #[test]
    fn scroll_accumulates_and_resets() {
        let mut tracker = PointerTracker::new();
        tracker.handle_event(InputEvent::Scroll { x: 0.0, y: 1.0 });
        tracker.handle_event(InputEvent::Scroll { x: 0.0, y: 2.0 });
        assert_eq!(tracker.snapshot(VIEWPORT).scroll, Vec2::new(0.0, 3.0));
        assert_eq!(tracker.snapshot(VIEWPORT).scroll, Vec2::ZERO);
    }

    #[test]
    fn quick_click_is_seen_for_one_tick() {
        let mut tracker = PointerTracker::new();
        tracker.handle_event(press(MouseButton::Left, true));
        tracker.handle_event(press(MouseButton::Left, false));
        assert!(tracker.snapshot(VIEWPORT).was_down(MouseButton::Left));
        assert!(!tracker.snapshot(VIEWPORT).was_down(MouseButton::Left));
    }

    #[test]
    fn held_button_stays_down_across_ticks() {
        let mut tracker = PointerTracker::new();
        tracker.handle_event(press(MouseButton::Right, true));
        assert!(tracker.snapshot(VIEWPORT).right_down);
        assert!(tracker.snapshot(VIEWPORT).right_down);
        tracker.handle_event(press(MouseButton::Right, false));
        assert!(tracker.snapshot(VIEWPORT).right_down);
        assert!(!tracker.snapshot(VIEWPORT).right_down);
    }
}

use glam::Vec2;

use crate::camera::controller::OrbitCamera;
use crate::input::{MouseButton, TickInput};

/// Default scroll-to-zoom factor.
pub const DEFAULT_ZOOM_STEP: f32 = 0.1;

/// Maps one tick of polled pointer state onto orbit-camera operations.
///
/// Left drag rotates, right drag pans and vertical scroll zooms. All three
/// may apply in the same tick; there is no smoothing or inertia.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputController {
    zoom_step: f32,
}

impl Default for InputController {
    fn default() -> Self {
        Self::new(DEFAULT_ZOOM_STEP)
    }
}

impl InputController {
    /// Controller with the given scroll-to-zoom factor.
    #[must_use]
    pub fn new(zoom_step: f32) -> Self {
        Self { zoom_step }
    }

    /// Apply `input` to `camera`. Returns true if any operation was issued.
    pub fn apply(&self, camera: &mut OrbitCamera, input: &TickInput) -> bool {
        let size = input.viewport.max(Vec2::ONE);
        let mut changed = false;

        if input.was_down(MouseButton::Left) {
            camera.rotate(
                input.pointer / size - 0.5,
                input.prev_pointer / size - 0.5,
            );
            changed = true;
        }

        if input.was_down(MouseButton::Right) {
            camera.pan(2.0 * input.pointer_delta() / size);
            changed = true;
        }

        if input.scroll.y != 0.0 {
            camera.zoom(input.scroll.y * self.zoom_step);
            changed = true;
        }

        changed
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn camera() -> OrbitCamera {
        OrbitCamera::look_at(Vec3::new(0.0, 0.0, 100.0), Vec3::ZERO, Vec3::Y)
    }

    fn input() -> TickInput {
        TickInput::idle(Vec2::new(800.0, 600.0))
    }

    #[test]
    fn idle_tick_leaves_camera_untouched() {
        let mut cam = camera();
        let before = cam.clone();
        assert!(!InputController::default().apply(&mut cam, &input()));
        assert_eq!(cam, before);
    }

    #[test]
    fn right_drag_pans_by_normalized_delta() {
        let mut cam = camera();
        let tick = TickInput {
            right_down: true,
            pointer: Vec2::new(440.0, 300.0),
            prev_pointer: Vec2::new(400.0, 300.0),
            ..input()
        };
        assert!(InputController::default().apply(&mut cam, &tick));
        // 2 * 40 / 800 = 0.1 of the distance, against camera right.
        assert!((cam.center() - Vec3::new(-10.0, 0.0, 0.0)).length() < 1e-3);
        assert!((cam.distance() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn scroll_zooms_by_step() {
        let mut cam = camera();
        let tick = TickInput {
            scroll: Vec2::new(0.0, 2.0),
            ..input()
        };
        let _ = InputController::default().apply(&mut cam, &tick);
        assert!((cam.distance() - 120.0).abs() < 1e-3);
    }

    #[test]
    fn rotate_pan_and_zoom_apply_in_one_tick() {
        let mut cam = camera();
        let tick = TickInput {
            left_down: true,
            right_down: true,
            pointer: Vec2::new(500.0, 300.0),
            prev_pointer: Vec2::new(400.0, 300.0),
            scroll: Vec2::new(0.0, -1.0),
            ..input()
        };
        let _ = InputController::default().apply(&mut cam, &tick);
        assert!((cam.distance() - 90.0).abs() < 1e-3);
        assert!(cam.center() != Vec3::ZERO);
        assert!((cam.eye() - Vec3::new(0.0, 0.0, 100.0)).length() > 1.0);
    }

    #[test]
    fn left_button_without_motion_is_noop_rotation() {
        let mut cam = camera();
        let before = cam.clone();
        let tick = TickInput {
            left_down: true,
            pointer: Vec2::new(100.0, 100.0),
            prev_pointer: Vec2::new(100.0, 100.0),
            ..input()
        };
        let _ = InputController::default().apply(&mut cam, &tick);
        assert_eq!(cam, before);
    }
}

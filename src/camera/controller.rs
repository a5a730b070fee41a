use glam::{Mat3, Mat4, Quat, Vec2, Vec3};

/// Smallest eye-to-center distance the camera will settle at.
pub const MIN_DISTANCE: f32 = 1e-3;

/// Largest eye-to-center distance the camera will settle at.
pub const MAX_DISTANCE: f32 = 1e6;

/// Orbit camera constrained to a sphere around a look-at center.
///
/// State is kept as a world-to-camera rotation, a center and a scalar
/// distance, so `eye`/`up` are always derived and `|eye - center|` is only
/// ever changed by [`zoom`](Self::zoom). Rotation composes a fresh arcball
/// quaternion per call and renormalizes, so long sessions do not drift.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    rotation: Quat,
    center: Vec3,
    distance: f32,
    min_distance: f32,
    max_distance: f32,
}

impl OrbitCamera {
    /// Camera looking from `eye` toward `center` with the given `up` hint.
    ///
    /// A coincident eye/center is pushed out to [`MIN_DISTANCE`] along +Z,
    /// and an `up` parallel to the view direction is replaced by an
    /// arbitrary orthogonal vector.
    #[must_use]
    pub fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Self {
        let offset = eye - center;
        let length = offset.length();
        let (back, distance) = if length.is_finite() && length > MIN_DISTANCE
        {
            (offset / length, length)
        } else {
            (Vec3::Z, MIN_DISTANCE)
        };

        let mut right = up.cross(back);
        if !right.is_finite() || right.length_squared() < 1e-12 {
            right = back.any_orthonormal_vector();
        }
        let right = right.normalize();
        let true_up = back.cross(right);

        let camera_to_world =
            Quat::from_mat3(&Mat3::from_cols(right, true_up, back));

        Self {
            rotation: camera_to_world.conjugate().normalize(),
            center,
            distance,
            min_distance: MIN_DISTANCE,
            max_distance: MAX_DISTANCE,
        }
    }

    /// Override the zoom clamp range. `min` is floored at [`MIN_DISTANCE`].
    #[must_use]
    pub fn with_distance_limits(mut self, min: f32, max: f32) -> Self {
        self.min_distance = if min.is_finite() {
            min.max(MIN_DISTANCE)
        } else {
            MIN_DISTANCE
        };
        self.max_distance = if max.is_finite() {
            max.max(self.min_distance)
        } else {
            MAX_DISTANCE
        };
        self.distance =
            self.distance.clamp(self.min_distance, self.max_distance);
        self
    }

    /// Eye (camera) position in world space.
    #[must_use]
    pub fn eye(&self) -> Vec3 {
        self.center + self.rotation.conjugate() * (Vec3::Z * self.distance)
    }

    /// Look-at center in world space.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Camera up direction in world space.
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.rotation.conjugate() * Vec3::Y
    }

    /// Distance from eye to center.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Orbit the eye about the center by the arcball rotation that takes
    /// `previous` to `current`.
    ///
    /// Both points are in normalized screen space, roughly [-0.5, 0.5].
    pub fn rotate(&mut self, current: Vec2, previous: Vec2) {
        if !current.is_finite() || !previous.is_finite() || current == previous
        {
            return;
        }

        let delta = arcball_delta(arcball_point(current), arcball_point(previous));
        if delta.xyz().length_squared() < 1e-14 {
            return;
        }

        self.rotation = (self.rotation * delta).normalize();
    }

    /// Translate eye and center together in the view plane.
    ///
    /// The translation is scaled by the current distance so panning feels
    /// the same at every zoom level.
    pub fn pan(&mut self, delta: Vec2) {
        if !delta.is_finite() {
            return;
        }
        let d = self.distance;
        let local = Vec3::new(-d * delta.x, d * delta.y, 0.0);
        self.center += self.rotation.conjugate() * local;
    }

    /// Move the eye along the view direction by `amount` times the current
    /// distance (positive moves away from the center).
    pub fn zoom(&mut self, amount: f32) {
        if !amount.is_finite() {
            return;
        }
        let next = self.distance + amount * self.distance;
        self.distance = if next.is_nan() {
            self.min_distance
        } else {
            next.clamp(self.min_distance, self.max_distance)
        };
    }

    /// Right-handed look-at transform for the current eye, center and up.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.center, self.up())
    }
}

/// Map a normalized screen point onto the arcball. X is mirrored so the
/// ball turns under the pointer in camera space.
fn arcball_point(p: Vec2) -> Vec3 {
    let s = (p.x * p.x + p.y * p.y).min(1.0);
    Vec3::new(-p.x, p.y, (1.0 - s).sqrt())
}

/// Product `a * b⁻¹` of the pure quaternions for two arcball points.
///
/// The axis is `b × a`, so a horizontal drag turns about the camera's Y
/// axis and a vertical drag about its X axis.
fn arcball_delta(a: Vec3, b: Vec3) -> Quat {
    let axis = b.cross(a);
    Quat::from_xyzw(axis.x, axis.y, axis.z, a.dot(b)).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPS
    }

    fn viewport_camera(width: f32, height: f32) -> OrbitCamera {
        OrbitCamera::look_at(
            Vec3::new(width / 2.0, height / 2.0, 500.0),
            Vec3::new(width / 2.0, height / 2.0, -10.0),
            Vec3::Y,
        )
    }

    #[test]
    fn look_at_reproduces_eye_center_up() {
        let cam = viewport_camera(800.0, 600.0);
        assert!(close(cam.eye(), Vec3::new(400.0, 300.0, 500.0)));
        assert!(close(cam.center(), Vec3::new(400.0, 300.0, -10.0)));
        assert!(close(cam.up(), Vec3::Y));
        assert!((cam.distance() - 510.0).abs() < EPS);
    }

    #[test]
    fn look_at_matches_glam_view() {
        let eye = Vec3::new(3.0, 4.0, 10.0);
        let cam = OrbitCamera::look_at(eye, Vec3::ZERO, Vec3::Y);
        let expected = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        assert!(cam.view_matrix().abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn degenerate_look_at_is_repaired() {
        let cam = OrbitCamera::look_at(Vec3::ONE, Vec3::ONE, Vec3::Y);
        assert!(cam.distance() > 0.0);
        assert!(cam.view_matrix().is_finite());

        let parallel =
            OrbitCamera::look_at(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO, Vec3::Y);
        assert!(parallel.up().is_finite());
        assert!(parallel.up().dot(parallel.eye().normalize()).abs() < EPS);
    }

    #[test]
    fn rotate_preserves_distance_over_long_sessions() {
        let mut cam = viewport_camera(800.0, 600.0);
        let start = cam.distance();
        for i in 0..10_000 {
            let t = i as f32 * 0.01;
            let cur = Vec2::new(0.3 * t.sin(), 0.2 * t.cos());
            let prev = Vec2::new(0.3 * (t - 0.01).sin(), 0.2 * (t - 0.01).cos());
            cam.rotate(cur, prev);
        }
        let measured = (cam.eye() - cam.center()).length();
        assert!((measured - start).abs() / start < 1e-4);
        assert!((cam.rotation.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn rotate_with_zero_delta_is_noop() {
        let mut cam = viewport_camera(640.0, 480.0);
        let before = cam.clone();
        cam.rotate(Vec2::new(0.1, 0.1), Vec2::new(0.1, 0.1));
        assert_eq!(cam, before);
    }

    #[test]
    fn rotate_moves_eye_but_not_center() {
        let mut cam = OrbitCamera::look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        cam.rotate(Vec2::new(0.2, 0.0), Vec2::ZERO);
        assert!(close(cam.center(), Vec3::ZERO));
        assert!(!close(cam.eye(), Vec3::new(0.0, 0.0, 10.0)));
    }

    #[test]
    fn horizontal_drag_orbits_about_up() {
        let mut cam = OrbitCamera::look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        cam.rotate(Vec2::new(0.2, 0.0), Vec2::ZERO);
        let eye = cam.eye();
        assert!(eye.y.abs() < EPS);
        assert!(eye.x > 1.0);
        assert!(close(cam.up(), Vec3::Y));
    }

    #[test]
    fn vertical_drag_orbits_about_right() {
        let mut cam = OrbitCamera::look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        cam.rotate(Vec2::new(0.0, 0.2), Vec2::ZERO);
        let eye = cam.eye();
        assert!(eye.x.abs() < EPS);
        assert!(eye.y.abs() > 1.0);
        assert!((eye.length() - 10.0).abs() < EPS);
    }

    #[test]
    fn pan_translates_eye_and_center_equally() {
        let mut cam =
            OrbitCamera::look_at(Vec3::new(0.0, 0.0, 100.0), Vec3::ZERO, Vec3::Y);
        let eye_before = cam.eye();
        let center_before = cam.center();

        cam.pan(Vec2::new(0.1, 0.0));

        let eye_shift = cam.eye() - eye_before;
        let center_shift = cam.center() - center_before;
        assert!(close(eye_shift, center_shift));
        assert!(close(center_shift, Vec3::new(-10.0, 0.0, 0.0)));
        assert!((cam.distance() - 100.0).abs() < EPS);
    }

    #[test]
    fn pan_scales_with_distance() {
        let mut near = OrbitCamera::look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        let mut far = OrbitCamera::look_at(Vec3::new(0.0, 0.0, 100.0), Vec3::ZERO, Vec3::Y);
        near.pan(Vec2::new(0.0, 0.5));
        far.pan(Vec2::new(0.0, 0.5));
        assert!((far.center().y / near.center().y - 10.0).abs() < EPS);
    }

    #[test]
    fn zoom_is_relative_to_distance() {
        let mut cam = OrbitCamera::look_at(Vec3::new(0.0, 0.0, 100.0), Vec3::ZERO, Vec3::Y);
        cam.zoom(0.1);
        assert!((cam.distance() - 110.0).abs() < EPS);
        cam.zoom(-0.5);
        assert!((cam.distance() - 55.0).abs() < EPS);
        assert!(close(cam.center(), Vec3::ZERO));
    }

    #[test]
    fn zoom_never_reaches_zero_or_inverts() {
        let mut cam = OrbitCamera::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        cam.zoom(-1.0);
        assert!(cam.distance() > 0.0);
        cam.zoom(-50.0);
        assert!(cam.distance() >= MIN_DISTANCE);
        cam.zoom(f32::NAN);
        cam.zoom(f32::INFINITY);
        assert!(cam.distance().is_finite() && cam.distance() > 0.0);
        cam.zoom(f32::MAX);
        assert!(cam.distance().is_finite() && cam.distance() <= MAX_DISTANCE);
    }

    #[test]
    fn mixed_operations_keep_distance_positive_and_finite() {
        let mut cam = viewport_camera(1024.0, 768.0);
        let amounts = [-0.9, 3.0, -0.99, 0.5, -2.0, 10.0, -0.999];
        for (i, amount) in amounts.iter().cycle().take(200).enumerate() {
            let f = i as f32;
            cam.rotate(Vec2::new(0.01 * f.sin(), -0.02), Vec2::new(0.0, 0.01));
            cam.pan(Vec2::new(0.05, -0.03));
            cam.zoom(*amount);
            assert!(cam.distance().is_finite());
            assert!(cam.distance() > 0.0);
            assert!(cam.view_matrix().is_finite());
        }
    }

    #[test]
    fn view_matrix_is_pure() {
        let mut cam = viewport_camera(800.0, 600.0);
        cam.rotate(Vec2::new(0.1, -0.2), Vec2::new(0.0, 0.0));
        let a = cam.view_matrix();
        let b = cam.view_matrix();
        assert_eq!(a, b);
    }

    #[test]
    fn distance_limits_clamp_zoom() {
        let mut cam = OrbitCamera::look_at(Vec3::new(0.0, 0.0, 50.0), Vec3::ZERO, Vec3::Y)
            .with_distance_limits(10.0, 100.0);
        cam.zoom(5.0);
        assert_eq!(cam.distance(), 100.0);
        cam.zoom(-0.99);
        assert_eq!(cam.distance(), 10.0);
    }
}

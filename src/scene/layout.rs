//! Window placement in world space.

use glam::{Vec2, Vec3};
use rand::Rng;

use crate::frames::{FrameSize, PixelFormat};
use crate::scene::data::VisualizationData;

/// Number of windows in the demo layout.
pub const DEMO_WINDOW_COUNT: usize = 60;
/// Frames per window in the demo layout.
pub const DEMO_TIMEPOINTS: usize = 30;

/// One image window: a quad anchored at its lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    /// Lower-left corner in world units.
    pub position: Vec3,
    /// Width and height in world units.
    pub size: Vec2,
}

impl Window {
    /// Window at `offset` with `size`.
    #[must_use]
    pub fn new(offset: [f32; 3], size: [f32; 2]) -> Self {
        Self {
            position: Vec3::from_array(offset),
            size: Vec2::from_array(size),
        }
    }

    /// Center of the window's rectangle.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.position + (self.size * 0.5).extend(0.0)
    }
}

/// Scatter `count` windows over a `viewport`-sized area: x and y uniform
/// over the viewport, z in [-100, 0), and each side up to a tenth of the
/// viewport's.
pub fn random_layout<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    viewport: Vec2,
) -> VisualizationData {
    let mut offsets = Vec::with_capacity(count);
    let mut sizes = Vec::with_capacity(count);
    for _ in 0..count {
        offsets.push([
            rng.random::<f32>() * viewport.x,
            rng.random::<f32>() * viewport.y,
            -rng.random::<f32>() * 100.0,
        ]);
        sizes.push([
            (rng.random::<f32>() * viewport.x / 10.0).max(1.0),
            (rng.random::<f32>() * viewport.y / 10.0).max(1.0),
        ]);
    }

    let mut data =
        VisualizationData::new([viewport.x / 10.0, viewport.y / 10.0], offsets)
            .with_frames(
                FrameSize::default(),
                PixelFormat::AlphaF32,
                DEMO_TIMEPOINTS,
            );
    data.sizes = Some(sizes);
    data
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn random_layout_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let viewport = Vec2::new(800.0, 600.0);
        let data = random_layout(&mut rng, DEMO_WINDOW_COUNT, viewport);

        assert!(data.validate().is_ok());
        assert_eq!(data.num_windows(), DEMO_WINDOW_COUNT);
        for window in data.windows() {
            assert!((0.0..800.0).contains(&window.position.x));
            assert!((0.0..600.0).contains(&window.position.y));
            assert!((-100.0..=0.0).contains(&window.position.z));
            assert!(window.size.x <= 80.0 && window.size.y <= 60.0);
            assert!(window.size.x >= 1.0 && window.size.y >= 1.0);
        }
    }

    #[test]
    fn window_center() {
        let window = Window::new([10.0, 20.0, 5.0], [30.0, 40.0]);
        assert_eq!(window.center(), Vec3::new(25.0, 40.0, 5.0));
    }
}

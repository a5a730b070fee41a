//! Per-tick scene drawing.
//!
//! Once loading has settled, every tick sets the matrices once and then
//! walks the windows in index order, uploading each window's current frame
//! and drawing its quad before moving to the next window.

use crate::camera::controller::OrbitCamera;
use crate::camera::core::{Projection, SceneGlobals};
use crate::error::FramewallError;
use crate::frames::{FrameStore, LoadBarrier};
use crate::renderer::RenderBackend;
use crate::scene::layout::Window;

/// What a tick drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Time index every window displayed, or `None` if nothing was drawn
    /// because loading had not settled.
    pub time_index: Option<usize>,
    /// Windows drawn.
    pub drawn: usize,
    /// Windows whose current frame is missing.
    pub skipped: usize,
}

/// Everything the compositor reads for one tick.
#[derive(Clone, Copy)]
pub struct SceneView<'a> {
    /// Camera producing the view matrix.
    pub camera: &'a OrbitCamera,
    /// Projection producing the projection matrix.
    pub projection: &'a Projection,
    /// Windows in draw order.
    pub windows: &'a [Window],
    /// Decoded frames.
    pub store: &'a FrameStore,
    /// Loading gate.
    pub barrier: &'a LoadBarrier,
    /// Time index sampled from the clock for this tick.
    pub time_index: usize,
}

/// Draws the window grid through a [`RenderBackend`].
#[derive(Debug, Default)]
pub struct SceneCompositor;

impl SceneCompositor {
    /// Compositor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Draw one tick.
    ///
    /// Before the barrier opens only the background is cleared. Afterwards
    /// every window shows frame `time_index`; windows whose frame failed to
    /// load are skipped.
    ///
    /// # Errors
    ///
    /// Propagates backend failures; the frame is abandoned at the first
    /// error.
    pub fn render<B: RenderBackend + ?Sized>(
        &self,
        backend: &mut B,
        view: &SceneView<'_>,
    ) -> Result<RenderStats, FramewallError> {
        backend.begin_frame()?;
        if !view.barrier.is_ready() {
            backend.end_frame()?;
            return Ok(RenderStats::default());
        }

        backend.set_globals(&SceneGlobals::new(view.projection, view.camera));

        let mut stats = RenderStats {
            time_index: Some(view.time_index),
            ..RenderStats::default()
        };
        for (index, window) in view.windows.iter().enumerate() {
            let Some(frame) = view.store.get(index, view.time_index) else {
                stats.skipped += 1;
                continue;
            };
            let token = backend.upload(frame)?;
            backend.draw_instance(token, window.position, window.size)?;
            stats.drawn += 1;
        }

        backend.end_frame()?;
        log::debug!(
            "tick at t={}: {} drawn, {} skipped",
            view.time_index,
            stats.drawn,
            stats.skipped
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};
    use web_time::Instant;

    use super::*;
    use crate::animation::AnimationClock;
    use crate::frames::{FailurePolicy, Frame, FrameSize};
    use crate::renderer::recording::{Call, RecordingBackend};

    const SIZE: FrameSize = FrameSize::new(2, 2);

    /// Frame whose pixels encode its slot.
    fn tagged(window: usize, time: usize) -> Frame {
        let tag = u8::try_from(window * 16 + time).unwrap();
        Frame::luminance(SIZE, vec![tag; 4]).unwrap()
    }

    fn windows(n: usize) -> Vec<Window> {
        (0..n)
            .map(|i| Window::new([i as f32 * 10.0, 0.0, 0.0], [5.0, 5.0]))
            .collect()
    }

    struct Fixture {
        camera: OrbitCamera,
        projection: Projection,
        windows: Vec<Window>,
        store: FrameStore,
        barrier: LoadBarrier,
    }

    impl Fixture {
        fn new(num_windows: usize, num_timepoints: usize) -> Self {
            Self {
                camera: OrbitCamera::look_at(
                    Vec3::new(0.0, 0.0, 500.0),
                    Vec3::ZERO,
                    Vec3::Y,
                ),
                projection: Projection::default(),
                windows: windows(num_windows),
                store: FrameStore::new(
                    num_windows,
                    num_timepoints,
                    SIZE,
                    crate::frames::PixelFormat::Luminance8,
                ),
                barrier: LoadBarrier::new(
                    num_windows * num_timepoints,
                    FailurePolicy::SkipMissing,
                    None,
                ),
            }
        }

        fn load(&mut self, window: usize, time: usize) {
            if self.store.insert(window, time, tagged(window, time)).unwrap() {
                let _ = self.barrier.record_loaded(Instant::now());
            }
        }

        fn fail(&mut self) {
            let _ = self.barrier.record_failed(Instant::now());
        }

        fn view(&self, time_index: usize) -> SceneView<'_> {
            SceneView {
                camera: &self.camera,
                projection: &self.projection,
                windows: &self.windows,
                store: &self.store,
                barrier: &self.barrier,
                time_index,
            }
        }
    }

    #[test]
    fn nothing_drawn_before_ready() {
        let mut fixture = Fixture::new(2, 2);
        fixture.load(0, 0);
        fixture.load(1, 1);

        let mut backend = RecordingBackend::default();
        let stats = SceneCompositor::new()
            .render(&mut backend, &fixture.view(0))
            .unwrap();

        assert_eq!(stats, RenderStats::default());
        assert_eq!(backend.draws(), 0);
        assert_eq!(backend.calls, vec![Call::Begin, Call::End]);
    }

    #[test]
    fn fetches_current_index_in_window_order() {
        let mut fixture = Fixture::new(2, 3);
        for w in 0..2 {
            for t in 0..3 {
                fixture.load(w, t);
            }
        }
        let clock = AnimationClock::new(3, 30.0);
        for _ in 0..5 {
            clock.step();
        }

        let mut backend = RecordingBackend::default();
        let stats = SceneCompositor::new()
            .render(&mut backend, &fixture.view(clock.current_index()))
            .unwrap();

        assert_eq!(stats.time_index, Some(2));
        assert_eq!(stats.drawn, 2);
        assert_eq!(
            backend.uploaded(),
            vec![tagged(0, 2).bytes().to_vec(), tagged(1, 2).bytes().to_vec()]
        );
    }

    #[test]
    fn each_upload_is_followed_by_its_draw() {
        let mut fixture = Fixture::new(3, 1);
        for w in 0..3 {
            fixture.load(w, 0);
        }

        let mut backend = RecordingBackend::default();
        let _ = SceneCompositor::new()
            .render(&mut backend, &fixture.view(0))
            .unwrap();

        assert_eq!(backend.calls[0], Call::Begin);
        assert_eq!(backend.calls[1], Call::Globals);
        for (w, pair) in backend.calls[2..8].chunks(2).enumerate() {
            assert!(matches!(pair[0], Call::Upload(_)));
            assert_eq!(
                pair[1],
                Call::Draw {
                    position: Vec3::new(w as f32 * 10.0, 0.0, 0.0),
                    size: Vec2::new(5.0, 5.0),
                }
            );
        }
        assert_eq!(backend.calls[8], Call::End);
    }

    #[test]
    fn globals_match_camera_and_projection() {
        let mut fixture = Fixture::new(1, 1);
        fixture.load(0, 0);

        let mut backend = RecordingBackend::default();
        let _ = SceneCompositor::new()
            .render(&mut backend, &fixture.view(0))
            .unwrap();

        let expected = SceneGlobals::new(&fixture.projection, &fixture.camera);
        assert_eq!(backend.globals, Some(expected));
    }

    #[test]
    fn missing_frames_are_skipped() {
        let mut fixture = Fixture::new(3, 1);
        fixture.load(0, 0);
        fixture.fail();
        fixture.load(2, 0);
        assert!(fixture.barrier.is_ready());

        let mut backend = RecordingBackend::default();
        let stats = SceneCompositor::new()
            .render(&mut backend, &fixture.view(0))
            .unwrap();

        assert_eq!(stats.drawn, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(
            backend.uploaded(),
            vec![tagged(0, 0).bytes().to_vec(), tagged(2, 0).bytes().to_vec()]
        );
    }
}

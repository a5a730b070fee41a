//! Host-facing lifecycle for one window-grid visualization.
//!
//! A [`Visualization`] owns the camera, the playback clock, the frame store
//! and its load barrier, and the optional background loader. The host
//! feeds it data, decode completions, and per-tick input, and asks it to
//! draw through any [`RenderBackend`].
//!
//! Playback starts exactly once per data generation: the clock is started
//! when the load barrier opens. Replacing the data begins a new generation
//! with a fresh clock; appending windows extends the current one.

use std::collections::HashSet;
use std::sync::Arc;

use glam::{Vec2, Vec3};
use web_time::Instant;

use crate::animation::AnimationClock;
use crate::camera::controller::OrbitCamera;
use crate::camera::core::Projection;
use crate::camera::InputController;
use crate::error::FramewallError;
use crate::frames::{
    DecodeError, Frame, FrameLoader, FrameSource, FrameStore, LoadBarrier,
    LoadPlan, LoadProgress, LoadedFrame, ReadyReason,
};
use crate::input::TickInput;
use crate::options::Options;
use crate::renderer::RenderBackend;
use crate::scene::{
    RenderStats, SceneCompositor, SceneView, VisualizationData, Window,
};

/// Distance of the initial eye in front of the window plane.
const INITIAL_EYE_Z: f32 = 500.0;
/// Depth of the initial orbit center behind the window plane.
const INITIAL_CENTER_Z: f32 = -10.0;

/// One running visualization.
pub struct Visualization {
    options: Options,
    viewport: (u32, u32),
    data: VisualizationData,
    windows: Vec<Window>,
    camera: OrbitCamera,
    projection: Projection,
    input: InputController,
    compositor: SceneCompositor,
    clock: AnimationClock,
    store: FrameStore,
    barrier: LoadBarrier,
    failed_slots: HashSet<(usize, usize)>,
    source: Option<Arc<dyn FrameSource>>,
    loader: Option<FrameLoader>,
    reported_quarter: usize,
}

impl Visualization {
    /// Visualization of `data` in a `width` × `height` viewport.
    ///
    /// The camera looks down -Z at the middle of the viewport. No frames
    /// are loaded until [`load_from`](Self::load_from) or
    /// [`receive_frame`](Self::receive_frame) is called.
    ///
    /// # Errors
    ///
    /// Returns [`FramewallError::DataFormat`] if `data` is invalid, or a
    /// clock error if an empty layout is ready immediately and playback
    /// cannot start.
    pub fn new(
        width: u32,
        height: u32,
        data: VisualizationData,
        options: Options,
    ) -> Result<Self, FramewallError> {
        data.validate()?;

        let half = Vec2::new(width as f32, height as f32) * 0.5;
        let camera = OrbitCamera::look_at(
            half.extend(INITIAL_EYE_Z),
            half.extend(INITIAL_CENTER_Z),
            Vec3::Y,
        )
        .with_distance_limits(
            options.camera.min_distance,
            options.camera.max_distance,
        );

        let mut projection = Projection {
            fovy: options.camera.fovy,
            znear: options.camera.znear,
            zfar: options.camera.zfar,
            ..Projection::default()
        };
        projection.resize(width, height);

        let (clock, store, barrier) = Self::generation(&data, &options);
        let mut visualization = Self {
            input: InputController::new(options.camera.zoom_step),
            viewport: (width, height),
            windows: data.windows(),
            data,
            camera,
            projection,
            compositor: SceneCompositor::new(),
            clock,
            store,
            barrier,
            failed_slots: HashSet::new(),
            source: None,
            loader: None,
            reported_quarter: 0,
            options,
        };
        visualization.start_if_ready()?;

        log::info!(
            "visualization created: {} windows x {} timepoints, frames {}",
            visualization.data.num_windows(),
            visualization.data.num_timepoints,
            visualization.data.frame_dimensions
        );
        Ok(visualization)
    }

    /// Parse and validate host JSON into [`VisualizationData`].
    ///
    /// # Errors
    ///
    /// Returns [`FramewallError::DataFormat`] on malformed input.
    pub fn format_data(
        raw: &serde_json::Value,
    ) -> Result<VisualizationData, FramewallError> {
        VisualizationData::from_json(raw)
    }

    /// Fresh clock, store and barrier for `data`.
    fn generation(
        data: &VisualizationData,
        options: &Options,
    ) -> (AnimationClock, FrameStore, LoadBarrier) {
        let clock =
            AnimationClock::new(data.num_timepoints, options.playback.fps);
        let store = FrameStore::new(
            data.num_windows(),
            data.num_timepoints,
            data.frame_dimensions,
            data.pixel_format,
        );
        let barrier = LoadBarrier::new(
            data.total_frames(),
            options.loading.failure_policy,
            options.loading.stall_timeout(),
        );
        (clock, store, barrier)
    }

    /// Replace the data wholesale. Loaded frames are discarded and playback
    /// waits for the new frames.
    ///
    /// If a frame source is attached and still matches the new frame
    /// layout, loading restarts from it.
    ///
    /// # Errors
    ///
    /// Returns [`FramewallError::DataFormat`] if `data` is invalid, or a
    /// loader or clock error if restarting fails.
    pub fn update_data(
        &mut self,
        data: VisualizationData,
    ) -> Result<(), FramewallError> {
        data.validate()?;
        self.cancel_loading();
        self.clock.stop();

        let (clock, store, barrier) = Self::generation(&data, &self.options);
        self.clock = clock;
        self.store = store;
        self.barrier = barrier;
        self.failed_slots.clear();
        self.reported_quarter = 0;
        self.windows = data.windows();
        self.data = data;
        log::info!(
            "data replaced: {} windows x {} timepoints",
            self.data.num_windows(),
            self.data.num_timepoints
        );

        match self.source.take() {
            Some(source) if self.source_matches(source.as_ref()) => {
                self.source = Some(Arc::clone(&source));
                self.spawn_loader(source)?;
            }
            Some(_) => {
                log::warn!(
                    "frame source no longer matches the data; call load_from"
                );
            }
            None => {}
        }
        self.start_if_ready()
    }

    /// Add windows after the existing ones.
    ///
    /// Frames already loaded are kept and the clock keeps running. The
    /// store grows to the larger grid and the barrier expects the new
    /// frames; an open barrier stays open, so existing windows keep playing
    /// while the new ones are skipped until their frames arrive. The
    /// attached source, if any, decodes only what is missing.
    ///
    /// # Errors
    ///
    /// Returns [`FramewallError::DataFormat`] if `data` is invalid or its
    /// frame layout differs, or a loader error.
    pub fn append_data(
        &mut self,
        data: &VisualizationData,
    ) -> Result<(), FramewallError> {
        self.data.append(data)?;
        self.cancel_loading();

        let store = FrameStore::new(
            self.data.num_windows(),
            self.data.num_timepoints,
            self.data.frame_dimensions,
            self.data.pixel_format,
        );
        let previous = std::mem::replace(&mut self.store, store);
        for (window, time, frame) in previous.into_frames() {
            let _ = self.store.insert(window, time, frame)?;
        }
        self.barrier.extend(data.total_frames(), Instant::now());
        self.reported_quarter = 0;
        self.windows = self.data.windows();
        log::info!(
            "appended {} windows ({} frames carried over)",
            data.num_windows(),
            self.store.loaded_count()
        );

        if let Some(source) = self.source.clone() {
            self.spawn_loader(source)?;
        }
        self.start_if_ready()
    }

    /// Decode every missing frame from `source` in the background.
    /// Completions are applied by [`poll_loader`](Self::poll_loader).
    ///
    /// # Errors
    ///
    /// Returns [`FramewallError::DataFormat`] if the source's frame size or
    /// format differs from the data, or [`FramewallError::ThreadSpawn`].
    pub fn load_from(
        &mut self,
        source: Arc<dyn FrameSource>,
    ) -> Result<(), FramewallError> {
        if !self.source_matches(source.as_ref()) {
            return Err(FramewallError::DataFormat(format!(
                "source frames are {} {:?}, data expects {} {:?}",
                source.frame_size(),
                source.format(),
                self.data.frame_dimensions,
                self.data.pixel_format
            )));
        }
        self.cancel_loading();
        self.source = Some(Arc::clone(&source));
        self.spawn_loader(source)
    }

    fn source_matches(&self, source: &dyn FrameSource) -> bool {
        source.frame_size() == self.data.frame_dimensions
            && source.format() == self.data.pixel_format
    }

    fn spawn_loader(
        &mut self,
        source: Arc<dyn FrameSource>,
    ) -> Result<(), FramewallError> {
        let plan = self.missing_plan();
        if plan.is_empty() {
            return Ok(());
        }
        self.loader = Some(FrameLoader::spawn(
            source,
            plan,
            self.options.loading.decode_threads,
        )?);
        Ok(())
    }

    /// Windows with at least one frame not yet stored.
    fn missing_plan(&self) -> LoadPlan {
        let num_timepoints = self.data.num_timepoints;
        let windows = (0..self.data.num_windows())
            .filter(|&w| {
                (0..num_timepoints).any(|t| !self.store.is_loaded(w, t))
            })
            .collect();
        LoadPlan {
            windows,
            num_timepoints,
        }
    }

    fn cancel_loading(&mut self) {
        if let Some(mut loader) = self.loader.take() {
            loader.cancel();
        }
    }

    /// Apply one decode completion.
    ///
    /// Frames are stored in their slot; failures and rejected frames count
    /// toward the barrier's settled total once per slot. Completions for
    /// slots outside the grid are logged and ignored.
    pub fn receive_frame(
        &mut self,
        window: usize,
        time: usize,
        result: Result<Frame, DecodeError>,
    ) {
        let now = Instant::now();
        let opened = match result {
            Ok(frame) => match self.store.insert(window, time, frame) {
                Ok(true) if self.failed_slots.remove(&(window, time)) => {
                    self.barrier.record_recovered(now)
                }
                Ok(true) => self.barrier.record_loaded(now),
                Ok(false) => None,
                Err(e) => {
                    log::warn!("rejected frame ({window}, {time}): {e}");
                    self.record_failure(window, time, now)
                }
            },
            Err(e) => {
                log::warn!("failed to decode frame ({window}, {time}): {e}");
                self.record_failure(window, time, now)
            }
        };

        self.report_progress();
        if let Some(reason) = opened {
            self.on_ready(reason);
        }
    }

    fn record_failure(
        &mut self,
        window: usize,
        time: usize,
        now: Instant,
    ) -> Option<ReadyReason> {
        let in_grid =
            window < self.data.num_windows() && time < self.data.num_timepoints;
        if !in_grid
            || self.store.is_loaded(window, time)
            || !self.failed_slots.insert((window, time))
        {
            return None;
        }
        self.barrier.record_failed(now)
    }

    /// Apply every completion the background loader has produced and check
    /// the stall timeout. Call once per tick.
    pub fn poll_loader(&mut self) {
        let completions = self
            .loader
            .as_ref()
            .map(FrameLoader::drain)
            .unwrap_or_default();
        for LoadedFrame {
            window,
            time,
            result,
        } in completions
        {
            self.receive_frame(window, time, result);
        }

        if let Some(reason) = self.barrier.poll_timeout(Instant::now()) {
            self.on_ready(reason);
        }
    }

    fn report_progress(&mut self) {
        let quarter = (self.barrier.progress().fraction() * 4.0) as usize;
        if quarter > self.reported_quarter {
            self.reported_quarter = quarter;
            let progress = self.barrier.progress();
            log::info!(
                "loaded {}/{} frames ({} failed)",
                progress.loaded,
                progress.total,
                progress.failed
            );
        }
    }

    fn on_ready(&mut self, reason: ReadyReason) {
        match reason {
            ReadyReason::Complete => log::info!("all frames loaded"),
            ReadyReason::Settled { failed } => {
                log::warn!("loading settled with {failed} missing frames");
            }
            ReadyReason::TimedOut { loaded } => log::warn!(
                "loading stalled; starting with {loaded}/{} frames",
                self.barrier.progress().total
            ),
        }
        if let Err(e) = self.start_if_ready() {
            log::error!("failed to start playback: {e}");
        }
    }

    fn start_if_ready(&mut self) -> Result<(), FramewallError> {
        if self.barrier.is_ready() && !self.clock.has_started() {
            self.clock.start()?;
        }
        Ok(())
    }

    /// Apply one tick of input to the camera. Returns true if the camera
    /// moved.
    pub fn tick(&mut self, input: &TickInput) -> bool {
        self.input.apply(&mut self.camera, input)
    }

    /// Draw the current tick through `backend`.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn render<B: RenderBackend + ?Sized>(
        &self,
        backend: &mut B,
    ) -> Result<RenderStats, FramewallError> {
        self.compositor.render(
            backend,
            &SceneView {
                camera: &self.camera,
                projection: &self.projection,
                windows: &self.windows,
                store: &self.store,
                barrier: &self.barrier,
                time_index: self.clock.current_index(),
            },
        )
    }

    /// Track a new viewport size. Zero-sized dimensions are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.viewport = (width, height);
            self.projection.resize(width, height);
        }
    }

    /// Stop loading and playback. Safe to call more than once and before
    /// loading completes.
    pub fn dispose(&mut self) {
        self.cancel_loading();
        self.clock.stop();
    }

    /// Orbit camera.
    #[must_use]
    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    /// Mutable orbit camera.
    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    /// Projection parameters.
    #[must_use]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Playback clock of the current generation.
    #[must_use]
    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    /// Decoded frames.
    #[must_use]
    pub fn store(&self) -> &FrameStore {
        &self.store
    }

    /// Loading progress of the current generation.
    #[must_use]
    pub fn progress(&self) -> LoadProgress {
        self.barrier.progress()
    }

    /// Whether loading has settled and windows are drawn.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.barrier.is_ready()
    }

    /// Window placements in draw order.
    #[must_use]
    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    /// Current data.
    #[must_use]
    pub fn data(&self) -> &VisualizationData {
        &self.data
    }

    /// Options in effect.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Viewport size in pixels.
    #[must_use]
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }
}

impl Drop for Visualization {
    fn drop(&mut self) {
        self.dispose();
    }
}

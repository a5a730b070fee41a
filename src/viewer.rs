//! Standalone visualization window backed by winit.
//!
//! ```no_run
//! # use framewall::Viewer;
//! Viewer::builder()
//!     .with_title("Framewall demo")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```
//!
//! Without data the viewer shows the demo layout: randomly scattered
//! windows playing noise frames.

use std::sync::Arc;

use glam::Vec2;
use web_time::Duration;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    error::FramewallError,
    frames::{FrameSource, NoiseSource},
    gpu::render_context::RenderContext,
    input::{InputEvent, MouseButton, PointerTracker},
    options::Options,
    renderer::GpuSceneRenderer,
    scene::{layout::DEMO_WINDOW_COUNT, random_layout, VisualizationData},
    util::FrameTiming,
    visualization::Visualization,
};

/// How often the render rate is logged.
const TIMING_REPORT_INTERVAL: Duration = Duration::from_secs(5);

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    data: Option<VisualizationData>,
    options: Option<Options>,
    source: Option<Arc<dyn FrameSource>>,
    title: String,
}

impl ViewerBuilder {
    /// Create a builder with defaults (title "Framewall", demo layout,
    /// noise frames, default options).
    fn new() -> Self {
        Self {
            data: None,
            options: None,
            source: None,
            title: "Framewall".into(),
        }
    }

    /// Show `data` instead of the demo layout.
    #[must_use]
    pub fn with_data(mut self, data: VisualizationData) -> Self {
        self.data = Some(data);
        self
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Decode frames from `source` instead of generating noise.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn FrameSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            data: self.data,
            options: self.options,
            source: self.source,
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A standalone window that plays a window grid.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Viewer {
    data: Option<VisualizationData>,
    options: Option<Options>,
    source: Option<Arc<dyn FrameSource>>,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns [`FramewallError::Viewer`] if the event loop fails.
    pub fn run(self) -> Result<(), FramewallError> {
        let event_loop = EventLoop::new()
            .map_err(|e| FramewallError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            window: None,
            gpu: None,
            visualization: None,
            tracker: PointerTracker::new(),
            timing: FrameTiming::new(0),
            data: self.data,
            options: self.options.unwrap_or_default(),
            source: self.source,
            title: self.title,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| FramewallError::Viewer(e.to_string()))
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

/// wgpu state created once the window exists.
struct GpuState {
    context: RenderContext,
    renderer: GpuSceneRenderer,
}

/// Internal winit application handler.
struct ViewerApp {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    visualization: Option<Visualization>,
    tracker: PointerTracker,
    timing: FrameTiming,
    data: Option<VisualizationData>,
    options: Options,
    source: Option<Arc<dyn FrameSource>>,
    title: String,
}

/// Surface size for a window, never zero.
fn viewport_size(inner: winit::dpi::PhysicalSize<u32>) -> (u32, u32) {
    (inner.width.max(1), inner.height.max(1))
}

impl ViewerApp {
    /// Create the GPU context, the visualization, and start loading.
    fn initialize(
        &mut self,
        window: &Arc<Window>,
    ) -> Result<(GpuState, Visualization), FramewallError> {
        let (width, height) = viewport_size(window.inner_size());

        let data = self.data.take().unwrap_or_else(|| {
            let mut demo = random_layout(
                &mut rand::rng(),
                DEMO_WINDOW_COUNT,
                Vec2::new(width as f32, height as f32),
            );
            if let Some(source) = &self.source {
                demo.frame_dimensions = source.frame_size();
                demo.pixel_format = source.format();
            }
            demo
        });
        let source = self.source.take().unwrap_or_else(|| {
            Arc::new(NoiseSource::new(
                data.frame_dimensions,
                data.pixel_format,
                rand::random(),
            ))
        });

        let context = pollster::block_on(RenderContext::new(
            Arc::clone(window),
            (width, height),
        ))?;
        let renderer = GpuSceneRenderer::new(
            &context,
            data.frame_dimensions,
            data.pixel_format,
            &self.options.display,
        )?;

        let mut visualization =
            Visualization::new(width, height, data, self.options.clone())?;
        visualization.load_from(source)?;

        Ok((GpuState { context, renderer }, visualization))
    }

    fn resize(&mut self, width: u32, height: u32) {
        if let Some(gpu) = &mut self.gpu {
            gpu.context.resize(width, height);
            gpu.renderer.resize(&gpu.context);
        }
        if let Some(visualization) = &mut self.visualization {
            visualization.resize(width, height);
        }
    }

    fn redraw(&mut self) {
        let (Some(gpu), Some(visualization)) =
            (&mut self.gpu, &mut self.visualization)
        else {
            return;
        };

        visualization.poll_loader();
        let (width, height) = gpu.context.size();
        let input = self
            .tracker
            .snapshot(Vec2::new(width as f32, height as f32));
        let _ = visualization.tick(&input);

        match render_frame(gpu, visualization) {
            Ok(()) => {}
            Err(FramewallError::Surface(
                wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost,
            )) => {
                if let Some(inner) = self.window.as_ref().map(|w| w.inner_size())
                {
                    let (w, h) = viewport_size(inner);
                    self.resize(w, h);
                }
            }
            Err(e) => log::error!("render error: {e}"),
        }

        self.timing.end_frame();
        if let Some(frames) = self.timing.take_report(TIMING_REPORT_INTERVAL) {
            log::debug!(
                "{frames} frames drawn ({:.1} fps smoothed)",
                self.timing.fps()
            );
        }
    }
}

/// Draw one tick into the next swapchain image.
fn render_frame(
    gpu: &mut GpuState,
    visualization: &Visualization,
) -> Result<(), FramewallError> {
    let data = visualization.data();
    gpu.renderer.ensure_frame_layout(
        &gpu.context,
        data.frame_dimensions,
        data.pixel_format,
    )?;

    let output = gpu.context.get_next_frame()?;
    let view = output
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());
    {
        let mut frame = gpu.renderer.frame(&gpu.context, &view);
        let _ = visualization.render(&mut frame)?;
    }
    output.present();
    Ok(())
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(&self.title)
            .with_inner_size(winit::dpi::LogicalSize::new(1024, 768));
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        match self.initialize(&window) {
            Ok((gpu, visualization)) => {
                self.gpu = Some(gpu);
                self.visualization = Some(visualization);
            }
            Err(e) => {
                log::error!("Failed to initialize visualization: {e}");
                event_loop.exit();
                return;
            }
        }

        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::Resized(size) => {
                let (w, h) = viewport_size(size);
                self.resize(w, h);
            }

            WindowEvent::RedrawRequested => {
                self.redraw();
                if let Some(w) = &self.window {
                    w.request_redraw();
                }
            }

            WindowEvent::MouseInput { button, state, .. } => {
                self.tracker.handle_event(InputEvent::MouseButton {
                    button: MouseButton::from(button),
                    pressed: state == ElementState::Pressed,
                });
            }

            WindowEvent::CursorMoved { position, .. } => {
                #[allow(clippy::cast_possible_truncation)]
                let (x, y) = (position.x as f32, position.y as f32);
                self.tracker.handle_event(InputEvent::CursorMoved { x, y });
            }

            WindowEvent::MouseWheel { delta, .. } => {
                #[allow(clippy::cast_possible_truncation)]
                let (x, y) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => (x, y),
                    MouseScrollDelta::PixelDelta(pos) => {
                        (pos.x as f32 * 0.01, pos.y as f32 * 0.01)
                    }
                };
                self.tracker.handle_event(InputEvent::Scroll { x, y });
            }

            _ => (),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(visualization) = &mut self.visualization {
            visualization.dispose();
        }
    }
}

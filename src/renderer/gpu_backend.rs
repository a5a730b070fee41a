//! wgpu implementation of [`RenderBackend`].
//!
//! wgpu applies queued buffer and texture writes at the next submission, so
//! a batch of uploads followed by one submit would show only the last frame
//! in every window. Each window therefore gets its own upload, pass, and
//! submit. The first pass of a tick clears; later passes load.

use glam::{Vec2, Vec3};

use crate::camera::core::SceneGlobals;
use crate::error::FramewallError;
use crate::frames::{Frame, FrameSize, PixelFormat};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::gpu::texture::{DepthTarget, TextureStreamer};
use crate::options::DisplayOptions;
use crate::renderer::quad::{QuadRenderer, QuadTargets};
use crate::renderer::{RenderBackend, UploadToken};

/// GPU resources for drawing the scene: one streamed texture, one quad
/// pipeline, and the depth target.
pub struct GpuSceneRenderer {
    shader_composer: ShaderComposer,
    streamer: TextureStreamer,
    quad: QuadRenderer,
    depth: DepthTarget,
    display: DisplayOptions,
}

impl GpuSceneRenderer {
    /// Allocate resources for frames of `frame_size` and `format`.
    ///
    /// # Errors
    ///
    /// Returns [`FramewallError::Shader`] if shader composition fails.
    pub fn new(
        context: &RenderContext,
        frame_size: FrameSize,
        format: PixelFormat,
        display: &DisplayOptions,
    ) -> Result<Self, FramewallError> {
        let mut shader_composer = ShaderComposer::new()?;
        let streamer = TextureStreamer::new(&context.device, frame_size, format);
        let quad = QuadRenderer::new(
            context,
            &mut shader_composer,
            streamer.layout(),
            display.depth_test,
        )?;
        let (width, height) = context.size();
        let depth = DepthTarget::new(&context.device, width, height);

        Ok(Self {
            shader_composer,
            streamer,
            quad,
            depth,
            display: display.clone(),
        })
    }

    /// Reallocate the frame texture if the data's frame layout changed.
    ///
    /// # Errors
    ///
    /// Returns [`FramewallError::Shader`] if the pipeline rebuild fails.
    pub fn ensure_frame_layout(
        &mut self,
        context: &RenderContext,
        frame_size: FrameSize,
        format: PixelFormat,
    ) -> Result<(), FramewallError> {
        if self.streamer.accepts(frame_size, format) {
            return Ok(());
        }
        log::info!("frame layout changed to {frame_size} {format:?}");
        self.streamer = TextureStreamer::new(&context.device, frame_size, format);
        self.quad = QuadRenderer::new(
            context,
            &mut self.shader_composer,
            self.streamer.layout(),
            self.display.depth_test,
        )?;
        Ok(())
    }

    /// Match the depth target to the surface.
    pub fn resize(&mut self, context: &RenderContext) {
        let (width, height) = context.size();
        self.depth.resize(&context.device, width, height);
    }

    /// Start drawing a tick into `target`.
    pub fn frame<'a>(
        &'a mut self,
        context: &'a RenderContext,
        target: &'a wgpu::TextureView,
    ) -> GpuFrame<'a> {
        GpuFrame {
            renderer: self,
            context,
            target,
            cleared: false,
            uploads: 0,
            pending: None,
        }
    }
}

/// One tick of drawing against a surface view.
pub struct GpuFrame<'a> {
    renderer: &'a mut GpuSceneRenderer,
    context: &'a RenderContext,
    target: &'a wgpu::TextureView,
    cleared: bool,
    uploads: u64,
    pending: Option<u64>,
}

impl GpuFrame<'_> {
    fn targets(&self) -> QuadTargets<'_> {
        QuadTargets {
            color: self.target,
            depth: &self.renderer.depth.view,
            clear: (!self.cleared).then(|| self.renderer.display.clear_color()),
        }
    }
}

impl RenderBackend for GpuFrame<'_> {
    fn begin_frame(&mut self) -> Result<(), FramewallError> {
        self.cleared = false;
        self.pending = None;
        Ok(())
    }

    fn set_globals(&mut self, globals: &SceneGlobals) {
        self.renderer.quad.write_globals(&self.context.queue, globals);
    }

    fn upload(&mut self, frame: &Frame) -> Result<UploadToken, FramewallError> {
        self.renderer.streamer.upload(&self.context.queue, frame)?;
        self.uploads += 1;
        self.pending = Some(self.uploads);
        Ok(UploadToken::new(self.uploads))
    }

    fn draw_instance(
        &mut self,
        token: UploadToken,
        position: Vec3,
        size: Vec2,
    ) -> Result<(), FramewallError> {
        if self.pending.take() != Some(token.generation()) {
            return Err(FramewallError::StaleUpload);
        }

        let mut encoder = self.context.create_encoder("Quad Encoder");
        let targets = self.targets();
        self.renderer.quad.draw_instance(
            &self.context.queue,
            &mut encoder,
            targets,
            self.renderer.streamer.bind_group(),
            position,
            size,
        );
        self.context.submit(encoder);
        self.cleared = true;
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), FramewallError> {
        if !self.cleared {
            let mut encoder = self.context.create_encoder("Clear Encoder");
            {
                let _pass = self.targets().begin_pass(&mut encoder, "Clear Pass");
            }
            self.context.submit(encoder);
            self.cleared = true;
        }
        Ok(())
    }
}

//! GPU textures: the single streamed frame texture and the depth target.

use crate::frames::{Frame, FrameSize, FrameStoreError, PixelFormat};
use crate::gpu::pipeline_helpers;

/// Depth format shared by the depth target and every pipeline that tests
/// against it.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// One frame-sized texture that every window's pixels are streamed through.
///
/// The texture, its nearest-neighbour sampler, and the bind group are
/// created once; uploads overwrite the texel data in place. Because wgpu
/// applies queued texture writes at the next submission, callers must
/// submit the draw that samples an upload before uploading the next frame.
pub struct TextureStreamer {
    texture: wgpu::Texture,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    size: FrameSize,
    format: PixelFormat,
}

impl TextureStreamer {
    /// Allocate a streaming texture for frames of `size` and `format`.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        size: FrameSize,
        format: PixelFormat,
    ) -> Self {
        let layout = Self::create_layout(device);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Frame Texture"),
            size: extent(size),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: format.texture_format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = pipeline_helpers::nearest_sampler(device, "Frame Sampler");

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        log::debug!("frame texture allocated: {size} {format:?}");
        Self {
            texture,
            layout,
            bind_group,
            size,
            format,
        }
    }

    /// Bind group layout: unfilterable 2D texture at 0, non-filtering
    /// sampler at 1.
    pub fn create_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[
                pipeline_helpers::texture_2d_unfilterable(0),
                pipeline_helpers::non_filtering_sampler(1),
            ],
        })
    }

    /// Queue `frame`'s pixels for the next submission.
    ///
    /// # Errors
    ///
    /// Returns [`FrameStoreError::SizeMismatch`] or
    /// [`FrameStoreError::FormatMismatch`] if the frame does not match the
    /// texture.
    pub fn upload(
        &self,
        queue: &wgpu::Queue,
        frame: &Frame,
    ) -> Result<(), FrameStoreError> {
        if frame.size() != self.size {
            return Err(FrameStoreError::SizeMismatch {
                expected: self.size,
                actual: frame.size(),
            });
        }
        if frame.format() != self.format {
            return Err(FrameStoreError::FormatMismatch {
                expected: self.format,
                actual: frame.format(),
            });
        }

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            frame.bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(frame.bytes_per_row()),
                rows_per_image: Some(self.size.height),
            },
            extent(self.size),
        );
        Ok(())
    }

    /// Whether this texture can receive frames of `size` and `format`.
    #[must_use]
    pub fn accepts(&self, size: FrameSize, format: PixelFormat) -> bool {
        self.size == size && self.format == format
    }

    /// Layout the bind group was created against.
    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// Texture and sampler bind group.
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Frame dimensions.
    pub fn size(&self) -> FrameSize {
        self.size
    }
}

fn extent(size: FrameSize) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: size.width,
        height: size.height,
        depth_or_array_layers: 1,
    }
}

/// Depth attachment matching the surface size.
pub struct DepthTarget {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view.
    pub view: wgpu::TextureView,
}

impl DepthTarget {
    /// Create a depth texture with the given dimensions.
    #[must_use]
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Target"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// Reallocate if the surface size changed.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let current = self.texture.size();
        if current.width != width.max(1) || current.height != height.max(1) {
            *self = Self::new(device, width, height);
        }
    }
}

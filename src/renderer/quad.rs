//! Window quad geometry and the single shared quad pipeline.
//!
//! Every window is drawn with the same six-vertex buffers. The texcoord
//! buffer never changes; the position buffer is rewritten before each draw.

use glam::{Vec2, Vec3};
use wgpu::util::DeviceExt;

use crate::camera::core::SceneGlobals;
use crate::error::FramewallError;
use crate::gpu::pipeline_helpers;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{ShaderComposer, QUAD_SHADER};
use crate::renderer::pipeline_util;

/// Vertices per window quad (two triangles).
pub const QUAD_VERTEX_COUNT: u32 = 6;

/// Two-triangle decomposition of the rectangle `(x, y)`..`(x + w, y + h)`.
///
/// The vertex order is shared by positions and texcoords so every window
/// samples its frame with the same orientation.
#[must_use]
pub const fn rectangle(x: f32, y: f32, w: f32, h: f32) -> [[f32; 2]; 6] {
    let (x1, x2, y1, y2) = (x, x + w, y, y + h);
    [[x1, y1], [x2, y1], [x1, y2], [x1, y2], [x2, y1], [x2, y2]]
}

/// Texture coordinates spanning the whole frame, in quad vertex order.
pub const QUAD_TEXCOORDS: [[f32; 2]; 6] = rectangle(0.0, 0.0, 1.0, 1.0);

/// Position vertices for a window anchored at `position` with `size`,
/// all at the window's depth.
#[must_use]
pub fn quad_vertices(position: Vec3, size: Vec2) -> [[f32; 3]; 6] {
    rectangle(position.x, position.y, size.x, size.y)
        .map(|[x, y]| [x, y, position.z])
}

/// Pipeline plus the shared position, texcoord, and globals buffers.
pub struct QuadRenderer {
    pipeline: wgpu::RenderPipeline,
    position_buffer: wgpu::Buffer,
    texcoord_buffer: wgpu::Buffer,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
}

impl QuadRenderer {
    /// Build the pipeline against `frame_layout` (the streamed texture's
    /// bind group layout).
    ///
    /// # Errors
    ///
    /// Returns [`FramewallError::Shader`] if the quad shader fails to
    /// compose.
    pub fn new(
        context: &RenderContext,
        shader_composer: &mut ShaderComposer,
        frame_layout: &wgpu::BindGroupLayout,
        depth_test: bool,
    ) -> Result<Self, FramewallError> {
        let device = &context.device;

        let position_buffer = device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("Quad Position Buffer"),
                contents: bytemuck::cast_slice(&quad_vertices(
                    Vec3::ZERO,
                    Vec2::ONE,
                )),
                usage: wgpu::BufferUsages::VERTEX
                    | wgpu::BufferUsages::COPY_DST,
            },
        );
        let texcoord_buffer = device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("Quad Texcoord Buffer"),
                contents: bytemuck::cast_slice(&QUAD_TEXCOORDS),
                usage: wgpu::BufferUsages::VERTEX,
            },
        );
        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Globals Buffer"),
            size: std::mem::size_of::<SceneGlobals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globals_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Scene Globals Layout"),
                entries: &[pipeline_helpers::vertex_uniform_buffer(0)],
            });
        let globals_bind_group =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Scene Globals Bind Group"),
                layout: &globals_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                }],
            });

        let shader = shader_composer.compose(
            device,
            "Quad Shader",
            QUAD_SHADER,
            "quad.wgsl",
        )?;

        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Quad Pipeline Layout"),
                bind_group_layouts: &[&globals_layout, frame_layout],
                push_constant_ranges: &[],
            });

        let position_attributes = pipeline_helpers::vertex_attribute_layout(
            0,
            wgpu::VertexFormat::Float32x3,
        );
        let texcoord_attributes = pipeline_helpers::vertex_attribute_layout(
            1,
            wgpu::VertexFormat::Float32x2,
        );

        let pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Quad Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[
                        wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<[f32; 3]>()
                                as u64,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &position_attributes,
                        },
                        wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<[f32; 2]>()
                                as u64,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &texcoord_attributes,
                        },
                    ],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(pipeline_util::color_target(
                        context.format(),
                    ))],
                    compilation_options: Default::default(),
                }),
                // The two triangles wind in opposite directions.
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(pipeline_util::depth_stencil_state(
                    depth_test,
                )),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        Ok(Self {
            pipeline,
            position_buffer,
            texcoord_buffer,
            globals_buffer,
            globals_bind_group,
        })
    }

    /// Write the per-tick matrices.
    pub fn write_globals(&self, queue: &wgpu::Queue, globals: &SceneGlobals) {
        queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::bytes_of(globals),
        );
    }

    /// Rewrite the position buffer for one window and record its draw.
    ///
    /// The caller owns submission: the position write and any texture
    /// upload land when the encoder holding this pass is submitted.
    pub fn draw_instance(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        targets: QuadTargets<'_>,
        frame_bind_group: &wgpu::BindGroup,
        position: Vec3,
        size: Vec2,
    ) {
        queue.write_buffer(
            &self.position_buffer,
            0,
            bytemuck::cast_slice(&quad_vertices(position, size)),
        );

        let mut pass = targets.begin_pass(encoder, "Quad Pass");
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.globals_bind_group, &[]);
        pass.set_bind_group(1, frame_bind_group, &[]);
        pass.set_vertex_buffer(0, self.position_buffer.slice(..));
        pass.set_vertex_buffer(1, self.texcoord_buffer.slice(..));
        pass.draw(0..QUAD_VERTEX_COUNT, 0..1);
    }
}

/// Color and depth attachments for one pass, with the clear applied only
/// by the first pass of a tick.
#[derive(Clone, Copy)]
pub struct QuadTargets<'a> {
    /// Surface view.
    pub color: &'a wgpu::TextureView,
    /// Depth view.
    pub depth: &'a wgpu::TextureView,
    /// `Some` clears both attachments; `None` loads them.
    pub clear: Option<wgpu::Color>,
}

impl QuadTargets<'_> {
    /// Begin a render pass on these attachments.
    pub fn begin_pass<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        label: &str,
    ) -> wgpu::RenderPass<'e> {
        let (color_load, depth_load) = match self.clear {
            Some(color) => (wgpu::LoadOp::Clear(color), wgpu::LoadOp::Clear(1.0)),
            None => (wgpu::LoadOp::Load, wgpu::LoadOp::Load),
        };
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: color_load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(
                wgpu::RenderPassDepthStencilAttachment {
                    view: self.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                },
            ),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_vertices_decompose_rectangle() {
        let vertices =
            quad_vertices(Vec3::new(10.0, 20.0, 5.0), Vec2::new(30.0, 40.0));
        assert_eq!(
            vertices,
            [
                [10.0, 20.0, 5.0],
                [40.0, 20.0, 5.0],
                [10.0, 60.0, 5.0],
                [10.0, 60.0, 5.0],
                [40.0, 20.0, 5.0],
                [40.0, 60.0, 5.0],
            ]
        );
    }

    #[test]
    fn texcoords_span_unit_square_in_vertex_order() {
        assert_eq!(
            QUAD_TEXCOORDS,
            [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]
        );
    }

    #[test]
    fn texcoords_follow_position_corners() {
        let position = Vec3::new(-3.0, 7.0, -1.0);
        let size = Vec2::new(2.0, 4.0);
        for (vertex, uv) in quad_vertices(position, size).iter().zip(QUAD_TEXCOORDS) {
            assert_eq!(vertex[0], position.x + uv[0] * size.x);
            assert_eq!(vertex[1], position.y + uv[1] * size.y);
            assert_eq!(vertex[2], position.z);
        }
    }

    #[test]
    fn degenerate_size_collapses_to_point() {
        let vertices = quad_vertices(Vec3::new(1.0, 2.0, 3.0), Vec2::ZERO);
        assert!(vertices.iter().all(|v| *v == [1.0, 2.0, 3.0]));
    }
}

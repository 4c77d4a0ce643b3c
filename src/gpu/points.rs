//! Point cloud render pipeline.

use bytemuck::Zeroable;
use wgpu::util::DeviceExt;

use super::DEPTH_FORMAT;
use crate::error::{GeometryError, ShaderError};
use crate::geometry::{PointBuffer, POINT_STRIDE};
use crate::shader::{self, Uniforms, POINT_SHADER};
use crate::transform::TransformState;

/// Vertices per point quad.
const QUAD_VERTICES: u32 = 6;

/// Shader program, uniform block and vertex buffer for the tornado.
pub struct PointPipeline {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    vertex_buffer: Option<wgpu::Buffer>,
    point_size: f32,
}

impl PointPipeline {
    /// Compile the point shader and build the pipeline.
    ///
    /// Fails if the WGSL does not validate or the device rejects the pipeline.
    pub async fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        point_size: f32,
    ) -> Result<Self, ShaderError> {
        shader::validate(POINT_SHADER, "Point")?;

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Point Shader"),
            source: wgpu::ShaderSource::Wgsl(POINT_SHADER.into()),
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Transform Uniforms"),
            contents: bytemuck::bytes_of(&Uniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Transform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Transform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Point Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Point Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: (POINT_STRIDE * std::mem::size_of::<f32>())
                        as wgpu::BufferAddress,
                    // One quad per point
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &[wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x3, // vertexPos
                    }],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(err) = device.pop_error_scope().await {
            return Err(ShaderError::Link(err.to_string()));
        }

        Ok(Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            vertex_buffer: None,
            point_size,
        })
    }

    /// Replace the vertex buffer with a freshly generated cloud.
    ///
    /// Clouds larger than the device's buffer limit are rejected and the
    /// current buffer is kept.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        points: &PointBuffer,
    ) -> Result<(), GeometryError> {
        points.check_fits(device.limits().max_buffer_size)?;
        self.vertex_buffer = Some(device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("Tornado Points"),
                contents: points.as_bytes(),
                usage: wgpu::BufferUsages::VERTEX,
            },
        ));
        Ok(())
    }

    /// Push the current matrices and canvas size.
    pub fn write_uniforms(
        &self,
        queue: &wgpu::Queue,
        transforms: &TransformState,
        viewport: (u32, u32),
    ) {
        let uniforms = Uniforms {
            projection: transforms.projection.to_cols_array_2d(),
            model_view: transforms.model_view.to_cols_array_2d(),
            viewport: [viewport.0.max(1) as f32, viewport.1.max(1) as f32],
            point_size: self.point_size,
            _padding: 0.0,
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Record the draw for `point_count` points. No-op without geometry.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, point_count: u32) {
        let Some(buffer) = &self.vertex_buffer else {
            return;
        };
        if point_count == 0 || buffer.size() == 0 {
            return;
        }

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        pass.set_vertex_buffer(0, buffer.slice(..));
        pass.draw(0..QUAD_VERTICES, 0..point_count);
    }
}

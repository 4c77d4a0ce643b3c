//! Device, surface and per-frame rendering.

mod egui_integration;
mod points;

use std::sync::Arc;

use winit::window::Window;

pub use egui_integration::{EguiFrameOutput, EguiIntegration};
pub use points::PointPipeline;

use crate::controls::ControlPanel;
use crate::error::{AppError, GeometryError, GpuError};
use crate::geometry::PointBuffer;
use crate::resize::canvas_size;
use crate::transform::TransformState;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Everything that lives on the GPU for the session.
pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    depth_texture: wgpu::TextureView,
    points: PointPipeline,
    pub egui: EguiIntegration,
    /// Drawing rectangle inside the surface, set by the debounced resize.
    canvas: (u32, u32),
}

impl GpuState {
    pub async fn new(window: Arc<Window>, point_size: f32, vsync: bool) -> Result<Self, AppError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(GpuError::from)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(GpuError::from)?;

        // egui expects a linear target; the shader color is authored unencoded too
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);
        log::info!("Surface format {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = create_depth_texture(&device, &config);
        let points = PointPipeline::new(&device, config.format, point_size).await?;
        let egui = EguiIntegration::new(&device, config.format, &window, ControlPanel::style());

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_texture,
            points,
            egui,
            canvas: canvas_size(size.width),
        })
    }

    /// Match the swapchain to the window. Called on every resize event.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.reconfigure();
        }
    }

    /// Reconfigure the surface at its current size, e.g. after it was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = create_depth_texture(&self.device, &self.config);
    }

    /// Set the canvas rectangle the cloud is drawn into.
    pub fn set_canvas(&mut self, width: u32, height: u32) {
        self.canvas = (width, height);
    }

    pub fn canvas(&self) -> (u32, u32) {
        self.canvas
    }

    pub fn upload_points(&mut self, points: &PointBuffer) -> Result<(), GeometryError> {
        self.points.upload(&self.device, points)
    }

    /// Canvas clipped to the surface, since viewports may not exceed the target.
    fn viewport(&self) -> (u32, u32) {
        (
            self.canvas.0.min(self.config.width),
            self.canvas.1.min(self.config.height),
        )
    }

    /// Clear, draw the cloud, draw the overlay and present.
    pub fn render(
        &mut self,
        transforms: &TransformState,
        point_count: u32,
        overlay: &EguiFrameOutput,
    ) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let (vp_width, vp_height) = self.viewport();
        self.points
            .write_uniforms(&self.queue, transforms, (vp_width, vp_height));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Tornado Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if vp_width > 0 && vp_height > 0 {
                render_pass.set_viewport(0.0, 0.0, vp_width as f32, vp_height as f32, 0.0, 1.0);
                self.points.draw(&mut render_pass, point_count);
            }
        }

        let egui_commands = self.egui.paint(
            &self.device,
            &self.queue,
            &mut encoder,
            &view,
            [self.config.width, self.config.height],
            overlay,
        );

        self.queue.submit(
            egui_commands
                .into_iter()
                .chain(std::iter::once(encoder.finish())),
        );
        output.present();

        Ok(())
    }
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

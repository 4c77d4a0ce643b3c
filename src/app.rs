//! Window and event loop wiring.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::controls::ControlPanel;
use crate::error::{AppError, GeometryError};
use crate::frame_loop::{FrameHost, FrameLoop};
use crate::geometry::PointBuffer;
use crate::gpu::{EguiFrameOutput, GpuState};
use crate::resize::canvas_size;
use crate::settings::Settings;
use crate::stats::StatsReadout;
use crate::time::SessionClock;
use crate::transform::TransformState;

const TITLE: &str = "Tornado";

pub struct App {
    settings: Settings,
    clock: SessionClock,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    frame_loop: Option<FrameLoop>,
    panel: ControlPanel,
    resize_signaled: bool,
    error: Option<AppError>,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        let panel = ControlPanel::new(
            settings.rotation_rate,
            settings.initial_point_count,
            settings.max_point_count,
        );

        Self {
            settings,
            clock: SessionClock::new(),
            window: None,
            gpu: None,
            frame_loop: None,
            panel,
            resize_signaled: false,
            error: None,
        }
    }

    /// Fatal error that stopped the event loop, if any.
    pub fn take_error(&mut self) -> Option<AppError> {
        self.error.take()
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let (width, height) = canvas_size(self.settings.window_width);
        let window_attrs = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(winit::dpi::PhysicalSize::new(width, height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = pollster::block_on(GpuState::new(
            window.clone(),
            self.settings.point_size,
            self.settings.vsync,
        ))?;

        let (canvas_w, canvas_h) = gpu.canvas();
        self.frame_loop = Some(FrameLoop::new(
            canvas_w,
            canvas_h,
            self.settings.initial_point_count,
            self.clock.now_ms(),
        ));

        window.request_redraw();
        self.window = Some(window);
        self.gpu = Some(gpu);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        self.error = Some(err);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(gpu), Some(frame_loop)) =
            (self.window.as_ref(), self.gpu.as_mut(), self.frame_loop.as_mut())
        else {
            return;
        };

        let panel = &mut self.panel;
        let overlay = gpu.egui.run(window, |ctx| panel.show(ctx));

        let controls = self
            .panel
            .snapshot(std::mem::take(&mut self.resize_signaled));

        let mut host = WindowHost {
            window,
            gpu: &mut *gpu,
            overlay: &overlay,
            panel: &mut self.panel,
            out_of_memory: false,
        };
        frame_loop.tick(self.clock.now_ms(), &controls, &mut host);
        let out_of_memory = host.out_of_memory;

        gpu.egui.free_textures(&overlay);

        if out_of_memory {
            log::error!("GPU out of memory, exiting");
            event_loop.exit();
        }
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        match event.physical_key {
            PhysicalKey::Code(KeyCode::Escape) => event_loop.exit(),
            PhysicalKey::Code(KeyCode::KeyR) => self.panel.request_reset(),
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let consumed = match (&self.window, &mut self.gpu) {
            (Some(window), Some(gpu)) => gpu.egui.on_window_event(window, &event),
            _ => false,
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(physical_size);
                }
                self.resize_signaled = true;
            }
            WindowEvent::KeyboardInput { event, .. } if !consumed => {
                self.on_key(event_loop, &event);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }
}

/// [`FrameHost`] backed by the live window and GPU.
struct WindowHost<'a> {
    window: &'a Window,
    gpu: &'a mut GpuState,
    overlay: &'a EguiFrameOutput,
    panel: &'a mut ControlPanel,
    out_of_memory: bool,
}

impl FrameHost for WindowHost<'_> {
    type DrawError = wgpu::SurfaceError;

    fn request_next_frame(&mut self) {
        self.window.request_redraw();
    }

    fn window_width(&self) -> u32 {
        self.window.inner_size().width
    }

    fn resize_viewport(&mut self, width: u32, height: u32) {
        self.gpu.set_canvas(width, height);
    }

    fn upload_points(&mut self, points: &PointBuffer) -> Result<(), GeometryError> {
        self.gpu.upload_points(points)
    }

    fn draw(
        &mut self,
        transforms: &TransformState,
        point_count: u32,
    ) -> Result<(), wgpu::SurfaceError> {
        let result = self.gpu.render(transforms, point_count, self.overlay);
        match &result {
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gpu.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => self.out_of_memory = true,
            _ => {}
        }
        result
    }

    fn show_stats(&mut self, readout: &StatsReadout) {
        self.window.set_title(&format!("{} - {}", TITLE, readout));
        self.panel.set_stats(*readout);
    }
}

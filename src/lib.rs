//! # Tornado
//!
//! A rotating, tornado-shaped point cloud rendered with wgpu.
//!
//! The interesting part is [`FrameLoop`]: each tick it applies a debounced
//! resize, regenerates the cloud when the requested point count changes,
//! draws, spins the model by the elapsed wall-clock time and keeps running
//! frame rate stats. It talks to the window and GPU only through
//! [`FrameHost`], so it can be driven headless:
//!
//! ```ignore
//! use tornado::prelude::*;
//!
//! let mut frame_loop = FrameLoop::new(640, 480, 10_000, 0.0);
//! let controls = ControlSnapshot {
//!     rotation_rate: Some(0.5),
//!     desired_point_count: Some(500),
//!     ..Default::default()
//! };
//! let report = frame_loop.tick(16.0, &controls, &mut my_host);
//! assert_eq!(report.regenerated, Some(500));
//! ```
//!
//! [`run`] opens a window and drives the loop from winit redraw events.

mod app;
pub mod controls;
pub mod error;
pub mod frame_loop;
pub mod geometry;
mod gpu;
pub mod resize;
pub mod settings;
pub mod shader;
pub mod stats;
pub mod time;
pub mod transform;

pub use controls::ControlSnapshot;
pub use error::{AppError, ConfigError, GeometryError, GpuError, ShaderError};
pub use frame_loop::{FrameHost, FrameLoop, TickReport};
pub use geometry::{PointBuffer, TornadoShape};
pub use settings::Settings;
pub use stats::{StatsReadout, StatsTracker};
pub use transform::TransformState;

use winit::event_loop::{ControlFlow, EventLoop};

/// Open the window and run until it is closed.
///
/// Returns an error if the window, GPU or shaders fail to initialize.
pub fn run(settings: Settings) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    // Each frame requests the next redraw, so the loop can sleep in between
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = app::App::new(settings);
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Common imports.
pub mod prelude {
    pub use crate::controls::ControlSnapshot;
    pub use crate::frame_loop::{FrameHost, FrameLoop, TickReport};
    pub use crate::geometry::{PointBuffer, TornadoShape};
    pub use crate::settings::Settings;
    pub use crate::stats::StatsReadout;
    pub use crate::transform::TransformState;
    pub use glam::{Mat4, Vec3};
}

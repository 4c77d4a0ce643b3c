//! One-frame debounce for window resizes.
//!
//! A resize seen on tick T is acted on at T+1 if nothing newer arrived, so the
//! window has a frame to settle. A fresh signal at T+1 pushes handling to T+2.

/// Canvas height over width.
pub const ASPECT_RATIO: f32 = 480.0 / 640.0;

/// Canvas size for a host window width, keeping [`ASPECT_RATIO`].
pub fn canvas_size(window_width: u32) -> (u32, u32) {
    let height = (ASPECT_RATIO * window_width as f32).floor() as u32;
    (window_width, height)
}

/// Tracks resize signals across two ticks.
#[derive(Debug, Default, Clone)]
pub struct ResizeDebouncer {
    this_frame: bool,
    previous_frame: bool,
}

impl ResizeDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Note that at least one resize happened since the last poll.
    pub fn signal(&mut self) {
        self.this_frame = true;
    }

    /// Advance one tick. Returns true when a resize should be handled now.
    pub fn poll(&mut self) -> bool {
        let needs_handling = !self.this_frame && self.previous_frame;
        self.previous_frame = self.this_frame;
        self.this_frame = false;
        needs_handling
    }
}

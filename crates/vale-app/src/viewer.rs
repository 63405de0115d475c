//! Headless viewer: a walking camera that keeps its eye above the ground.
//!
//! Each frame the viewer moves along its heading, the streaming window is
//! updated around it, and the eye height eases toward `ground + eye_height`.
//! Rising ground snaps the eye up at once; falling ground is followed with an
//! exponential blend so the camera never dips below the surface.

use glam::DVec3;
use vale_config::ViewerSettings;
use vale_stream::{StreamError, StreamUpdate, StreamingWorld, TileBuilder};

/// Simulated frame time used by the headless loop (60 Hz).
pub const FRAME_TIME: f64 = 1.0 / 60.0;

/// Longest step a single frame may take. Longer hitches are clamped so the
/// viewer never jumps across several tiles at once.
pub const MAX_FRAME_DT: f64 = 0.05;

/// Frame counter with clamped per-frame time steps.
#[derive(Debug, Default)]
pub struct FrameClock {
    frames: u64,
    elapsed: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one frame of `frame_time` seconds; returns the clamped step.
    pub fn tick(&mut self, frame_time: f64) -> f64 {
        let dt = if frame_time.is_finite() {
            frame_time.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        if frame_time > MAX_FRAME_DT {
            tracing::trace!(
                "frame time {:.1}ms clamped to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_DT * 1000.0
            );
        }
        self.frames += 1;
        self.elapsed += dt;
        dt
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Simulated seconds so far.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

/// Camera state for the walk.
#[derive(Debug, Clone)]
pub struct Viewer {
    position: DVec3,
    heading: f64,
    settings: ViewerSettings,
    travelled: f64,
}

impl Viewer {
    pub fn new(position: DVec3, settings: ViewerSettings) -> Self {
        Self {
            position,
            heading: settings.heading_degrees.to_radians(),
            settings,
            travelled: 0.0,
        }
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    /// Horizontal distance walked.
    pub fn travelled(&self) -> f64 {
        self.travelled
    }

    /// Unit walk direction on the XZ plane, heading 0 facing +Z.
    pub fn direction(&self) -> DVec3 {
        DVec3::new(self.heading.sin(), 0.0, self.heading.cos())
    }

    /// Move along the heading for `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        let distance = self.settings.move_speed * dt;
        self.position += self.direction() * distance;
        self.travelled += distance;
    }

    /// Ease the eye toward `ground + eye_height`.
    ///
    /// `None` means the ground could not be queried; the eye then heads for
    /// the fixed fallback height.
    pub fn follow_ground(&mut self, ground: Option<f64>) {
        let target = match ground {
            Some(h) => h + self.settings.eye_height,
            None => self.settings.fallback_height,
        };
        if self.position.y < target {
            self.position.y = target;
        } else {
            self.position.y += (target - self.position.y) * self.settings.follow;
        }
    }

    /// One frame: move, stream tiles around the new position, follow ground.
    pub fn step<B: TileBuilder>(
        &mut self,
        dt: f64,
        world: &mut StreamingWorld<B>,
    ) -> Result<StreamUpdate, StreamError<B::Error>> {
        self.advance(dt);
        let update = world.update(self.position, false)?;
        let ground = world.sample_height(self.position.x, self.position.z);
        self.follow_ground(ground);
        Ok(update)
    }
}

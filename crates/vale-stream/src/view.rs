//! Draw-distance and fog settings derived from the streaming window.

/// Camera and fog distances that hide the edge of the streamed window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewSettings {
    /// Far clip plane distance.
    pub far_clip: f64,
    /// Distance where linear fog starts.
    pub fog_start: f64,
    /// Distance where fog is fully opaque.
    pub fog_end: f64,
}

impl ViewSettings {
    /// Derive distances from the window span `size * (2 * radius + 1)`.
    pub fn for_window(size: f64, radius: u32) -> Self {
        let span = size * f64::from(2 * radius + 1);
        Self {
            far_clip: span * 1.4,
            fog_start: span * 0.6,
            fog_end: span * 1.1,
        }
    }
}

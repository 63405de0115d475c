//! Decorative scatter placement (trees and similar props).

use glam::DVec3;
use vale_config::ScatterSettings;

use crate::seed::{SCATTER_SEED_MIX, SeededStream};

/// A placed scatter instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterPoint {
    /// Anchor on the ground surface.
    pub position: DVec3,
}

/// Draw `settings.count` candidates around the origin and keep those standing
/// on ground at least `settings.min_height` high.
///
/// `ground` is queried once per candidate; `None` (no ground data) drops the
/// candidate. The candidate stream does not depend on which ones survive.
pub fn scatter_points(
    seed: u32,
    size: f64,
    settings: &ScatterSettings,
    mut ground: impl FnMut(f64, f64) -> Option<f64>,
) -> Vec<ScatterPoint> {
    let mut rng = SeededStream::new(seed ^ SCATTER_SEED_MIX);
    let span = size * settings.spread;
    let mut points = Vec::new();

    for _ in 0..settings.count {
        let x = rng.next_centered(span);
        let z = rng.next_centered(span);
        match ground(x, z) {
            Some(y) if y >= settings.min_height => points.push(ScatterPoint {
                position: DVec3::new(x, y, z),
            }),
            _ => {}
        }
    }

    tracing::debug!(seed, candidates = settings.count, placed = points.len(), "scattered props");
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_candidates_kept_on_high_ground() {
        let settings = ScatterSettings::default();
        let points = scatter_points(5, 240.0, &settings, |_, _| Some(10.0));
        assert_eq!(points.len(), 30);
        for p in &points {
            assert!(p.position.x.abs() <= 90.0 && p.position.z.abs() <= 90.0);
            assert_eq!(p.position.y, 10.0);
        }
    }

    #[test]
    fn test_low_and_missing_ground_dropped() {
        let settings = ScatterSettings::default();
        assert!(scatter_points(5, 240.0, &settings, |_, _| Some(1.9)).is_empty());
        assert!(scatter_points(5, 240.0, &settings, |_, _| None).is_empty());
    }

    #[test]
    fn test_candidates_independent_of_filter() {
        let settings = ScatterSettings::default();
        let all = scatter_points(11, 240.0, &settings, |_, _| Some(5.0));
        let east = scatter_points(11, 240.0, &settings, |x, _| (x > 0.0).then_some(5.0));
        let expected: Vec<_> = all.iter().filter(|p| p.position.x > 0.0).copied().collect();
        assert_eq!(east, expected, "filtering must not shift later candidates");
    }

    #[test]
    fn test_deterministic() {
        let settings = ScatterSettings::default();
        let a = scatter_points(99, 240.0, &settings, |x, z| Some(x.abs() + z.abs()));
        let b = scatter_points(99, 240.0, &settings, |x, z| Some(x.abs() + z.abs()));
        assert_eq!(a, b);
    }
}

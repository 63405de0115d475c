//! Seed-placed landmarks that reshape the generated surface.
//!
//! Cliffs raise one half of a disc and sink the other, mesas lift a disc
//! toward a plateau above the uncarved surface, and ruins only mark spots
//! for decoration. Placement draws from a dedicated [`SeededStream`] in a
//! fixed order (every cliff, then every mesa, then every ruin), so counts
//! and positions are stable for a given seed and settings.

use glam::DVec2;
use vale_config::LandmarkSettings;

use crate::seed::{LANDMARK_SEED_MIX, SeededStream, det_cos, det_hypot, det_pow, det_sin, lerp};

/// One placed landmark.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Landmark {
    /// Half-disc step: the side facing `angle` is raised, the other lowered.
    Cliff { center: DVec2, radius: f64, angle: f64 },
    /// Plateau lifted `plateau` above the uncarved surface at its centre.
    Mesa { center: DVec2, radius: f64, plateau: f64 },
    /// Decoration anchor; does not change the surface.
    Ruin { center: DVec2, yaw: f64 },
}

impl Landmark {
    pub fn center(&self) -> DVec2 {
        match *self {
            Landmark::Cliff { center, .. }
            | Landmark::Mesa { center, .. }
            | Landmark::Ruin { center, .. } => center,
        }
    }
}

/// Surface values at one point, threaded through landmark application.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfacePoint {
    /// Composite height before carving; mesas plateau relative to this.
    pub base: f64,
    pub height: f64,
    pub water_level: f64,
}

/// Every landmark for one seed, plus the shaping constants.
#[derive(Clone, Debug)]
pub struct LandmarkSet {
    landmarks: Vec<Landmark>,
    settings: LandmarkSettings,
}

impl LandmarkSet {
    /// Place landmarks for `seed` in a world of edge length `size`.
    pub fn generate(seed: u32, size: f64, settings: &LandmarkSettings) -> Self {
        let mut rng = SeededStream::new(seed ^ LANDMARK_SEED_MIX);
        let s = settings;
        let total = (s.cliff_count + s.mesa_count + s.ruin_count) as usize;
        let mut landmarks = Vec::with_capacity(total);

        for _ in 0..s.cliff_count {
            let center = draw_center(&mut rng, s.cliff_spread * size);
            let radius = rng.next_range(s.cliff_radius.0, s.cliff_radius.1);
            let angle = rng.next_angle();
            landmarks.push(Landmark::Cliff { center, radius, angle });
        }
        for _ in 0..s.mesa_count {
            let center = draw_center(&mut rng, s.mesa_spread * size);
            let radius = rng.next_range(s.mesa_radius.0, s.mesa_radius.1);
            let plateau = rng.next_range(s.mesa_plateau.0, s.mesa_plateau.1);
            landmarks.push(Landmark::Mesa { center, radius, plateau });
        }
        for _ in 0..s.ruin_count {
            let center = draw_center(&mut rng, s.ruin_spread * size);
            let yaw = rng.next_angle();
            landmarks.push(Landmark::Ruin { center, yaw });
        }

        tracing::debug!(
            seed,
            cliffs = s.cliff_count,
            mesas = s.mesa_count,
            ruins = s.ruin_count,
            "placed landmarks"
        );

        Self {
            landmarks,
            settings: settings.clone(),
        }
    }

    /// All landmarks in placement order.
    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.landmarks.iter()
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn cliffs(&self) -> impl Iterator<Item = &Landmark> {
        self.iter().filter(|l| matches!(l, Landmark::Cliff { .. }))
    }

    pub fn mesas(&self) -> impl Iterator<Item = &Landmark> {
        self.iter().filter(|l| matches!(l, Landmark::Mesa { .. }))
    }

    pub fn ruins(&self) -> impl Iterator<Item = &Landmark> {
        self.iter().filter(|l| matches!(l, Landmark::Ruin { .. }))
    }

    /// Apply every cliff, then every mesa, to one point at `(x, z)`.
    pub fn apply_at(&self, x: f64, z: f64, mut point: SurfacePoint) -> SurfacePoint {
        for landmark in self.cliffs() {
            self.apply_one(landmark, x, z, &mut point);
        }
        for landmark in self.mesas() {
            self.apply_one(landmark, x, z, &mut point);
        }
        point
    }

    fn apply_one(&self, landmark: &Landmark, x: f64, z: f64, point: &mut SurfacePoint) {
        let s = &self.settings;
        match *landmark {
            Landmark::Cliff { center, radius, angle } => {
                let (dx, dz) = (x - center.x, z - center.y);
                let dist = det_hypot(dx, dz);
                if dist > radius {
                    return;
                }
                let side = dx * det_cos(angle) + dz * det_sin(angle);
                let influence = det_pow((1.0 - dist / radius).max(0.0), s.cliff_falloff);
                let sign = if side > 0.0 { 1.0 } else { -1.0 };
                point.height += sign * influence * s.cliff_strength;
                point.water_level = point.water_level.min(point.height - s.cliff_water_clearance);
            }
            Landmark::Mesa { center, radius, plateau } => {
                let dist = det_hypot(x - center.x, z - center.y);
                if dist > radius {
                    return;
                }
                let falloff = det_pow((1.0 - dist / radius).max(0.0), s.mesa_falloff);
                let target = (point.base + plateau).max(point.height);
                point.height = lerp(point.height, target, falloff);
                point.water_level = point
                    .water_level
                    .min(point.height - s.mesa_water_depression * falloff);
            }
            Landmark::Ruin { .. } => {}
        }
    }
}

fn draw_center(rng: &mut SeededStream, span: f64) -> DVec2 {
    let x = rng.next_centered(span);
    let z = rng.next_centered(span);
    DVec2::new(x, z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(height: f64) -> SurfacePoint {
        SurfacePoint {
            base: height,
            height,
            water_level: height - 1.0,
        }
    }

    fn single(landmark: Landmark) -> LandmarkSet {
        LandmarkSet {
            landmarks: vec![landmark],
            settings: LandmarkSettings::default(),
        }
    }

    #[test]
    fn test_default_counts_and_order() {
        let set = LandmarkSet::generate(42, 240.0, &LandmarkSettings::default());
        assert_eq!(set.len(), 9);
        assert_eq!(set.cliffs().count(), 3);
        assert_eq!(set.mesas().count(), 2);
        assert_eq!(set.ruins().count(), 4);
        let kinds: Vec<u8> = set
            .iter()
            .map(|l| match l {
                Landmark::Cliff { .. } => 0,
                Landmark::Mesa { .. } => 1,
                Landmark::Ruin { .. } => 2,
            })
            .collect();
        assert!(kinds.windows(2).all(|w| w[0] <= w[1]), "cliffs, then mesas, then ruins");
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = LandmarkSet::generate(9001, 240.0, &LandmarkSettings::default());
        let b = LandmarkSet::generate(9001, 240.0, &LandmarkSettings::default());
        assert_eq!(a.landmarks, b.landmarks);
        let c = LandmarkSet::generate(9002, 240.0, &LandmarkSettings::default());
        assert_ne!(a.landmarks, c.landmarks, "different seeds should move landmarks");
    }

    #[test]
    fn test_first_cliff_follows_stream() {
        let set = LandmarkSet::generate(42, 240.0, &LandmarkSettings::default());
        let mut rng = SeededStream::new(42 ^ LANDMARK_SEED_MIX);
        let x = (rng.next_f64() - 0.5) * 144.0;
        let z = (rng.next_f64() - 0.5) * 144.0;
        let radius = 18.0 + rng.next_f64() * 22.0;
        match set.cliffs().next() {
            Some(Landmark::Cliff { center, radius: r, .. }) => {
                assert!((center.x - x).abs() < 1e-12);
                assert!((center.y - z).abs() < 1e-12);
                assert!((r - radius).abs() < 1e-12);
            }
            other => panic!("expected a cliff, got {other:?}"),
        }
    }

    #[test]
    fn test_placement_within_spread() {
        let settings = LandmarkSettings::default();
        for seed in 0..50 {
            let set = LandmarkSet::generate(seed, 240.0, &settings);
            for l in set.iter() {
                let limit = match l {
                    Landmark::Cliff { radius, .. } => {
                        assert!((18.0..40.0).contains(radius));
                        72.0
                    }
                    Landmark::Mesa { radius, plateau, .. } => {
                        assert!((16.0..34.0).contains(radius));
                        assert!((3.0..7.0).contains(plateau));
                        60.0
                    }
                    Landmark::Ruin { .. } => 66.0,
                };
                let c = l.center();
                assert!(c.x.abs() <= limit && c.y.abs() <= limit, "{l:?} outside spread");
            }
        }
    }

    #[test]
    fn test_cliff_raises_front_and_lowers_back() {
        let set = single(Landmark::Cliff {
            center: DVec2::ZERO,
            radius: 20.0,
            angle: 0.0,
        });
        let front = set.apply_at(5.0, 0.0, flat(10.0));
        let back = set.apply_at(-5.0, 0.0, flat(10.0));
        assert!(front.height > 10.0, "front side should rise, got {}", front.height);
        assert!(back.height < 10.0, "back side should sink, got {}", back.height);
        let expected = det_pow(0.75, 1.8) * 2.2;
        assert!((front.height - 10.0 - expected).abs() < 1e-12);
        assert!(front.water_level <= front.height - 0.8 + 1e-12);
    }

    #[test]
    fn test_cliff_outside_radius_untouched() {
        let set = single(Landmark::Cliff {
            center: DVec2::new(10.0, 10.0),
            radius: 5.0,
            angle: 1.0,
        });
        let p = flat(4.0);
        assert_eq!(set.apply_at(30.0, 10.0, p), p);
    }

    #[test]
    fn test_mesa_never_lowers_ground() {
        let set = single(Landmark::Mesa {
            center: DVec2::ZERO,
            radius: 20.0,
            plateau: 5.0,
        });
        for i in 0..=40 {
            let x = i as f64 - 20.0;
            let before = SurfacePoint {
                base: 8.0,
                height: 7.5 + (i % 3) as f64,
                water_level: 6.0,
            };
            let after = set.apply_at(x, 3.0, before);
            assert!(after.height >= before.height, "mesa lowered ground at x = {x}");
        }
    }

    #[test]
    fn test_mesa_centre_reaches_plateau() {
        let set = single(Landmark::Mesa {
            center: DVec2::ZERO,
            radius: 20.0,
            plateau: 5.0,
        });
        let flooded = SurfacePoint {
            water_level: 20.0,
            ..flat(8.0)
        };
        let p = set.apply_at(0.0, 0.0, flooded);
        assert!((p.height - 13.0).abs() < 1e-12, "centre should sit on the plateau");
        assert!((p.water_level - (13.0 - 1.2)).abs() < 1e-12, "water should be depressed");
    }

    #[test]
    fn test_ruins_do_not_touch_surface() {
        let set = single(Landmark::Ruin {
            center: DVec2::ZERO,
            yaw: 0.5,
        });
        let p = flat(3.0);
        assert_eq!(set.apply_at(0.0, 0.0, p), p);
    }
}

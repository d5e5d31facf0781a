//! Connection arcs, the particles that travel along them, and the starfield.

use crate::location::Location;
use rand::Rng;
use std::f64::consts::TAU;

pub const PARTICLES_PER_ARC: usize = 3;
pub const STAR_COUNT: usize = 200;
/// Samples per arc curve.
pub const ARC_STEPS: usize = 40;

/// An arc from location `from` (always the primary) to location `to`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConnectionArc {
    pub from: usize,
    pub to: usize,
    pub lift: f64,
}

/// Outward lift for the arc ending at location `index`; later arcs fly higher.
pub fn arc_lift(index: usize) -> f64 {
    0.08 + 0.04 * index as f64
}

/// One arc from the primary location to each of the others, in list order.
pub fn connection_arcs(locations: &[Location]) -> Vec<ConnectionArc> {
    (1..locations.len())
        .map(|to| ConnectionArc { from: 0, to, lift: arc_lift(to) })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcParticle {
    /// Index into the arc list.
    pub arc: usize,
    /// Position along the arc, in `[0, 1)`.
    pub progress: f64,
    pub speed: f64,
    pub size_scale: f64,
}

impl ArcParticle {
    pub fn advance(&mut self) {
        self.progress += self.speed;
        if self.progress >= 1.0 {
            self.progress -= 1.0;
        }
    }
}

pub fn spawn_particles<R: Rng>(arcs: &[ConnectionArc], rng: &mut R) -> Vec<ArcParticle> {
    let mut particles = Vec::with_capacity(arcs.len() * PARTICLES_PER_ARC);
    for arc in 0..arcs.len() {
        for _ in 0..PARTICLES_PER_ARC {
            particles.push(ArcParticle {
                arc,
                progress: rng.gen_range(0.0..1.0),
                speed: rng.gen_range(0.003..0.007),
                size_scale: rng.gen_range(1.5..3.0),
            });
        }
    }
    particles
}

/// A background star in normalized viewport coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub twinkle_speed: f64,
    pub phase: f64,
}

impl Star {
    /// Twinkle brightness in `[0.3, 1.0]` at frame `frame`.
    pub fn brightness(&self, frame: f64) -> f64 {
        0.3 + 0.7 * (((frame * self.twinkle_speed + self.phase).sin() + 1.0) / 2.0)
    }
}

pub fn spawn_stars<R: Rng>(count: usize, rng: &mut R) -> Vec<Star> {
    (0..count)
        .map(|_| Star {
            x: rng.gen_range(0.0..1.0),
            y: rng.gen_range(0.0..1.0),
            radius: rng.gen_range(0.3..1.5),
            twinkle_speed: rng.gen_range(0.005..0.025),
            phase: rng.gen_range(0.0..TAU),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::load_locations;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn arcs_fan_out_from_primary() {
        let locations = load_locations(None).unwrap();
        let arcs = connection_arcs(&locations);
        assert_eq!(arcs.len(), locations.len() - 1);
        assert!(arcs.iter().all(|a| a.from == 0));
        assert_eq!(arcs.iter().map(|a| a.to).collect::<Vec<_>>(), (1..locations.len()).collect::<Vec<_>>());
        assert!((arcs[0].lift - 0.12).abs() < 1e-12);
    }

    #[test]
    fn single_location_has_no_arcs() {
        let locations = load_locations(None).unwrap();
        assert!(connection_arcs(&locations[..1]).is_empty());
        assert!(connection_arcs(&[]).is_empty());
    }

    #[test]
    fn particles_stay_in_unit_interval() {
        let mut rng = StdRng::seed_from_u64(7);
        let arcs = [ConnectionArc { from: 0, to: 1, lift: arc_lift(1) }; 2];
        let mut particles = spawn_particles(&arcs, &mut rng);
        assert_eq!(particles.len(), 2 * PARTICLES_PER_ARC);
        for _ in 0..1000 {
            for p in &mut particles {
                p.advance();
                assert!((0.0..1.0).contains(&p.progress));
            }
        }
        for p in &particles {
            assert!((0.003..0.007).contains(&p.speed));
            assert!((1.5..3.0).contains(&p.size_scale));
        }
    }

    #[test]
    fn twinkle_is_bounded() {
        let mut rng = StdRng::seed_from_u64(1);
        for star in spawn_stars(STAR_COUNT, &mut rng) {
            for frame in [0.0, 17.0, 400.0, 9001.0] {
                let b = star.brightness(frame);
                assert!((0.3..=1.0).contains(&b));
            }
        }
    }
}

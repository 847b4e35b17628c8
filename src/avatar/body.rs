//! Half-body silhouette sampler.
//!
//! All lengths are authored against a 400px reference square and scaled by
//! `min(width, height) / 400`. Region counts are fixed up front so proportions
//! never drift with the random draw; only positions inside a region are random.

use std::f32::consts::TAU;

use rand::Rng;
use tracing::debug;

use crate::avatar::particle::{Glyph, Particle, Region};
use crate::core::phase::wrap_0_tau;

const REFERENCE_SIZE: f32 = 400.0;
const TOP_MARGIN_FRAC: f32 = 0.1;

const HEAD_CENTER_Y: f32 = 80.0;
const HEAD_RADIUS: f32 = 35.0;
const HEAD_ASPECT: f32 = 1.2;

const TORSO_TOP: f32 = 120.0;
const TORSO_LEN: f32 = 140.0;
const TORSO_HALF_WIDTH: f32 = 80.0;
const TORSO_WIDEST_AT: f32 = 0.4;

const ARM_TOP: f32 = 130.0;
const ARM_LEN: f32 = 160.0;
const ARM_OFFSET: f32 = 65.0;
const ARM_TAPER: f32 = 15.0;
const ARM_SCATTER: f32 = 15.0;

const BLINK_SPEED_MIN: f32 = 0.05;
const BLINK_SPEED_SPAN: f32 = 0.1;

pub const DEFAULT_PARTICLE_COUNT: usize = 900;

/// Per-region particle counts for a given budget.
pub fn region_counts(total: usize) -> [(Region, usize); 4] {
    let head = (total as f32 * Region::Head.share()).round() as usize;
    let torso = ((total as f32 * Region::Torso.share()).round() as usize).min(total - head);
    let arms = total - head - torso;
    let left = arms / 2;
    let right = arms - left;
    [
        (Region::Head, head),
        (Region::Torso, torso),
        (Region::LeftArm, left),
        (Region::RightArm, right),
    ]
}

/// Geometry derived from the drawing area.
#[derive(Clone, Copy, Debug)]
struct Frame {
    cx: f32,
    top: f32,
    scale: f32,
}

impl Frame {
    fn new(width: f32, height: f32) -> Self {
        Self {
            cx: width / 2.0,
            top: height * TOP_MARGIN_FRAC,
            scale: width.min(height) / REFERENCE_SIZE,
        }
    }

    fn sample<R: Rng + ?Sized>(&self, region: Region, rng: &mut R) -> (f32, f32) {
        let s = self.scale;
        match region {
            Region::Head => {
                let angle = rng.random_range(0.0..TAU);
                let rad = rng.random::<f32>() * HEAD_RADIUS * s;
                let x = self.cx + angle.cos() * rad;
                let y = self.top + HEAD_CENTER_Y * s + angle.sin() * rad * HEAD_ASPECT;
                (x, y)
            }
            Region::Torso => {
                let t = rng.random::<f32>();
                let y = self.top + TORSO_TOP * s + t * TORSO_LEN * s;
                let half_width = (1.0 - (t - TORSO_WIDEST_AT).abs()) * TORSO_HALF_WIDTH * s;
                let x = self.cx + (rng.random::<f32>() - 0.5) * half_width * 2.0;
                (x, y)
            }
            Region::LeftArm | Region::RightArm => {
                let t = rng.random::<f32>();
                let y = self.top + ARM_TOP * s + t * ARM_LEN * s;
                let offset = ARM_OFFSET * s + t * ARM_TAPER * s;
                let scatter = rng.random::<f32>() * ARM_SCATTER * s;
                let x = if region == Region::LeftArm {
                    self.cx - offset - scatter
                } else {
                    self.cx + offset + scatter
                };
                (x, y)
            }
        }
    }
}

/// Scatter `count` particles over the silhouette for a `width` x `height` area.
/// Returns an empty set when the area is degenerate.
pub fn generate<R: Rng + ?Sized>(width: f32, height: f32, count: usize, rng: &mut R) -> Vec<Particle> {
    if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
        return Vec::new();
    }
    let frame = Frame::new(width, height);
    let mut out = Vec::with_capacity(count);
    for (region, n) in region_counts(count) {
        for _ in 0..n {
            let (x, y) = frame.sample(region, rng);
            let glyph = if rng.random_bool(0.5) {
                Glyph::One
            } else {
                Glyph::Zero
            };
            let speed = BLINK_SPEED_MIN + rng.random::<f32>() * BLINK_SPEED_SPAN;
            let offset = wrap_0_tau(rng.random::<f32>() * TAU);
            out.push(Particle::new(x, y, glyph, region, speed, offset));
        }
    }
    out
}

/// The particle set bound to the current surface size.
#[derive(Debug)]
pub struct BodyField {
    count: usize,
    size: Option<(f32, f32)>,
    particles: Vec<Particle>,
    generation: u64,
}

impl BodyField {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            size: None,
            particles: Vec::new(),
            generation: 0,
        }
    }

    /// Bind the field to a surface size. Regenerates the whole set when the size
    /// changed; the same size twice is a no-op. Returns whether it regenerated.
    pub fn resize<R: Rng + ?Sized>(&mut self, width: f32, height: f32, rng: &mut R) -> bool {
        if self.size == Some((width, height)) {
            return false;
        }
        self.particles = generate(width, height, self.count, rng);
        self.size = if self.particles.is_empty() {
            None
        } else {
            Some((width, height))
        };
        self.generation += 1;
        debug!(
            width,
            height,
            particles = self.particles.len(),
            generation = self.generation,
            "body field regenerated"
        );
        true
    }

    pub fn size(&self) -> Option<(f32, f32)> {
        self.size
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn count_in(&self, region: Region) -> usize {
        self.particles.iter().filter(|p| p.region == region).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn region_counts_sum_to_total() {
        for total in [0, 1, 7, 100, 899, 900, 901, 2000] {
            let sum: usize = region_counts(total).iter().map(|(_, n)| n).sum();
            assert_eq!(sum, total);
        }
    }

    #[test]
    fn degenerate_area_yields_no_particles() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate(0.0, 300.0, 900, &mut rng).is_empty());
        assert!(generate(300.0, -1.0, 900, &mut rng).is_empty());
        assert!(generate(f32::NAN, 300.0, 900, &mut rng).is_empty());
    }

    #[test]
    fn arms_sit_on_their_side_of_the_torso() {
        let mut rng = StdRng::seed_from_u64(3);
        let (w, h) = (800.0, 600.0);
        let particles = generate(w, h, 900, &mut rng);
        let cx = w / 2.0;
        for p in &particles {
            match p.region {
                Region::LeftArm => assert!(p.x < cx, "left arm at {}", p.x),
                Region::RightArm => assert!(p.x > cx, "right arm at {}", p.x),
                _ => {}
            }
        }
    }

    #[test]
    fn head_sits_above_torso() {
        let mut rng = StdRng::seed_from_u64(5);
        let particles = generate(400.0, 400.0, 900, &mut rng);
        let head_max = particles
            .iter()
            .filter(|p| p.region == Region::Head)
            .map(|p| p.y)
            .fold(f32::MIN, f32::max);
        let torso_min = particles
            .iter()
            .filter(|p| p.region == Region::Torso)
            .map(|p| p.y)
            .fold(f32::MAX, f32::min);
        // head reaches 80 + 35 * 1.2 = 122 at most, torso starts at 120 (+ 40 margin)
        assert!(head_max <= 40.0 + 122.0 + 1e-3);
        assert!(torso_min >= 40.0 + 120.0 - 1e-3);
    }

    #[test]
    fn particle_attributes_are_in_range() {
        let mut rng = StdRng::seed_from_u64(9);
        for p in generate(640.0, 480.0, 900, &mut rng) {
            assert!(p.phase_speed > 0.0);
            assert!((0.0..TAU).contains(&p.phase_offset));
            assert_eq!((p.x, p.y), (p.origin_x, p.origin_y));
        }
    }

    #[test]
    fn resize_same_size_is_noop_and_new_size_regenerates() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut field = BodyField::new(900);
        assert!(field.resize(500.0, 500.0, &mut rng));
        let first: Vec<(f32, f32)> = field.particles().iter().map(|p| (p.x, p.y)).collect();
        assert!(!field.resize(500.0, 500.0, &mut rng));
        let again: Vec<(f32, f32)> = field.particles().iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(first, again);

        assert!(field.resize(700.0, 500.0, &mut rng));
        assert_eq!(field.particles().len(), 900);
        assert_eq!(field.generation(), 2);
    }

    #[test]
    fn resize_to_zero_clears_field_until_surface_returns() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut field = BodyField::new(900);
        field.resize(500.0, 500.0, &mut rng);
        field.resize(0.0, 0.0, &mut rng);
        assert!(field.is_empty());
        assert_eq!(field.size(), None);
        field.resize(500.0, 500.0, &mut rng);
        assert_eq!(field.particles().len(), 900);
    }
}

//! Per-frame avatar update: idle blink, speaking modulation of the head,
//! ambient glyph static, full clear-and-redraw.

use rand::Rng;
use rand::rngs::StdRng;

use crate::avatar::body::BodyField;
use crate::avatar::particle::Region;
use crate::avatar::surface::Surface;
use crate::core::phase::{abs_sine_blink, centred_sine};

#[derive(Clone, Debug)]
pub struct AnimatorParams {
    pub particle_count: usize,
    /// Per-frame chance that any particle flips its glyph.
    pub ambient_flip_chance: f64,
    /// Per-frame chance that a head particle flips while speaking.
    pub speaking_flip_chance: f64,
    /// Angular rate of the speaking oscillation (rad/s).
    pub speaking_rate: f32,
}

impl Default for AnimatorParams {
    fn default() -> Self {
        Self {
            particle_count: crate::avatar::body::DEFAULT_PARTICLE_COUNT,
            ambient_flip_chance: 0.02,
            speaking_flip_chance: 0.1,
            speaking_rate: 20.0,
        }
    }
}

/// `random_bool` panics outside [0, 1]; NaN never flips.
fn probability(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Surface not ready; nothing was touched.
    Skipped,
    Drawn { particles: usize, regenerated: bool },
}

pub struct Animator {
    params: AnimatorParams,
    field: BodyField,
    rng: StdRng,
}

impl Animator {
    pub fn new(params: AnimatorParams, rng: StdRng) -> Self {
        let field = BodyField::new(params.particle_count);
        Self { params, field, rng }
    }

    pub fn field(&self) -> &BodyField {
        &self.field
    }

    /// Update every particle for time `elapsed` (seconds). Positions never change.
    pub fn update(&mut self, elapsed: f32, speaking: bool) {
        let ambient = probability(self.params.ambient_flip_chance);
        let speaking_flip = probability(self.params.speaking_flip_chance);
        let rate = self.params.speaking_rate;
        for p in self.field.particles_mut() {
            p.opacity = abs_sine_blink(elapsed, p.phase_speed, p.phase_offset, 0.3, 0.7);
            if speaking && p.region == Region::Head {
                p.opacity = centred_sine(elapsed, rate, p.phase_offset, 0.5, 0.5);
                if self.rng.random_bool(speaking_flip) {
                    p.glyph = p.glyph.flipped();
                }
            }
            if self.rng.random_bool(ambient) {
                p.glyph = p.glyph.flipped();
            }
        }
    }

    /// Clear the surface and draw the whole field.
    pub fn draw(&self, surface: &mut dyn Surface) {
        surface.clear();
        for p in self.field.particles() {
            surface.draw_glyph(p.x, p.y, p.glyph, p.region.color(), p.opacity);
        }
    }

    /// One display tick: bind to the surface size, update, redraw.
    pub fn frame(&mut self, surface: &mut dyn Surface, elapsed: f32, speaking: bool) -> FrameOutcome {
        let Some((width, height)) = surface.size() else {
            return FrameOutcome::Skipped;
        };
        let regenerated = self.field.resize(width, height, &mut self.rng);
        if self.field.is_empty() {
            return FrameOutcome::Skipped;
        }
        self.update(elapsed, speaking);
        self.draw(surface);
        FrameOutcome::Drawn {
            particles: self.field.particles().len(),
            regenerated,
        }
    }
}

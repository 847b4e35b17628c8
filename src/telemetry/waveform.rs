//! Rolling cardiac-style trace.
//!
//! A 40-tick cycle: the first seven positions replay a fixed beat shape, the
//! rest idle on the baseline with a little uniform noise. The table is an
//! opaque lookup, not a physiological model.

use std::collections::VecDeque;
use std::fmt::Write;

use rand::Rng;

use crate::core::timebase::Tick;

pub const WINDOW_LEN: usize = 50;
pub const CYCLE_LEN: u64 = 40;
pub const BASELINE: f32 = 50.0;
/// Beat shape for cycle positions 0..=6 (drawing space, y grows downward).
pub const BEAT: [f32; 7] = [50.0, 40.0, 10.0, 90.0, 45.0, 55.0, 50.0];
const NOISE_SPAN: f32 = 4.0;
/// Horizontal spacing so the window spans 0..100.
pub const X_STEP: f32 = 2.0;

pub fn cycle_position(tick: Tick) -> u64 {
    tick % CYCLE_LEN
}

#[derive(Debug, Clone)]
pub struct WaveformGenerator {
    samples: VecDeque<f32>,
    tick: Tick,
}

impl Default for WaveformGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveformGenerator {
    pub fn new() -> Self {
        Self {
            samples: std::iter::repeat_n(BASELINE, WINDOW_LEN).collect(),
            tick: 0,
        }
    }

    /// Ticks consumed so far.
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Sample for a given cycle position.
    pub fn sample_at<R: Rng + ?Sized>(pos: u64, rng: &mut R) -> f32 {
        match BEAT.get(pos as usize) {
            Some(v) => *v,
            None => BASELINE + (rng.random::<f32>() - 0.5) * NOISE_SPAN,
        }
    }

    /// Drop the oldest sample, append the next one, return it.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f32 {
        let value = Self::sample_at(cycle_position(self.tick), rng);
        self.samples.pop_front();
        self.samples.push_back(value);
        self.tick += 1;
        value
    }

    pub fn samples(&self) -> Vec<f32> {
        self.samples.iter().copied().collect()
    }

    pub fn points(&self) -> Vec<[f32; 2]> {
        self.samples
            .iter()
            .enumerate()
            .map(|(i, v)| [i as f32 * X_STEP, *v])
            .collect()
    }

    /// Path description: `M0,v0 L2,v1 L4,v2 ...`.
    pub fn path(&self) -> String {
        path_from_samples(self.samples.iter().copied())
    }
}

pub fn path_from_samples(samples: impl IntoIterator<Item = f32>) -> String {
    let mut out = String::from("M");
    for (i, v) in samples.into_iter().enumerate() {
        if i > 0 {
            out.push_str(" L");
        }
        let _ = write!(out, "{},{}", i as f32 * X_STEP, v);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn starts_flat_at_baseline() {
        let wf = WaveformGenerator::new();
        assert_eq!(wf.samples(), vec![BASELINE; WINDOW_LEN]);
    }

    #[test]
    fn first_ticks_replay_the_beat() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut wf = WaveformGenerator::new();
        let emitted: Vec<f32> = (0..7).map(|_| wf.step(&mut rng)).collect();
        assert_eq!(emitted, BEAT.to_vec());
        let tail = &wf.samples()[WINDOW_LEN - 7..];
        assert_eq!(tail, &BEAT[..]);
    }

    #[test]
    fn idle_positions_stay_near_baseline() {
        let mut rng = StdRng::seed_from_u64(2);
        for pos in 7..CYCLE_LEN {
            let v = WaveformGenerator::sample_at(pos, &mut rng);
            assert!((v - BASELINE).abs() <= 2.0, "pos {pos} -> {v}");
        }
    }

    #[test]
    fn path_connects_points_left_to_right() {
        let path = path_from_samples([50.0, 40.0, 10.0]);
        assert_eq!(path, "M0,50 L2,40 L4,10");
        let wf = WaveformGenerator::new();
        let full = wf.path();
        assert!(full.starts_with("M0,50 L2,50"));
        assert!(full.ends_with("L98,50"));
        assert_eq!(full.matches(" L").count(), WINDOW_LEN - 1);
    }

    #[test]
    fn points_match_samples() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut wf = WaveformGenerator::new();
        for _ in 0..13 {
            wf.step(&mut rng);
        }
        let pts = wf.points();
        assert_eq!(pts.len(), WINDOW_LEN);
        for (i, (p, s)) in pts.iter().zip(wf.samples()).enumerate() {
            assert_eq!(p[0], i as f32 * X_STEP);
            assert_eq!(p[1], s);
        }
    }

    #[test]
    fn beat_repeats_every_cycle_for_any_seed() {
        for seed in [0u64, 7, 42, 1234] {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut wf = WaveformGenerator::new();
            for t in 0..400u64 {
                let v = wf.step(&mut rng);
                let pos = (t % CYCLE_LEN) as usize;
                if pos < BEAT.len() {
                    assert_eq!(v, BEAT[pos], "seed {seed} tick {t}");
                }
                assert_eq!(wf.samples().len(), WINDOW_LEN);
                assert_eq!(wf.tick(), t + 1);
            }
        }
    }
}

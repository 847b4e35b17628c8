//! Bounded random walk over the three displayed vitals.
//! No mean reversion: a value may rest on a clamp boundary indefinitely.

use std::ops::RangeInclusive;

use rand::Rng;

use crate::core::util::round_to;

pub const PULSE_RANGE: RangeInclusive<i32> = 60..=120;
pub const OSC_FREQ_RANGE: RangeInclusive<f32> = 5.0..=40.0;
pub const CORE_TEMP_RANGE: RangeInclusive<f32> = 35.0..=40.0;

const PULSE_STEP: i32 = 2;
const OSC_FREQ_STEP: f32 = 1.0;
const CORE_TEMP_STEP: f32 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VitalsState {
    /// Beats per minute.
    pub pulse_rate: i32,
    /// Hz, one decimal.
    pub osc_freq: f32,
    /// Celsius, one decimal.
    pub core_temp: f32,
}

impl Default for VitalsState {
    fn default() -> Self {
        Self {
            pulse_rate: 72,
            osc_freq: 14.5,
            core_temp: 36.6,
        }
    }
}

impl VitalsState {
    pub fn in_bounds(&self) -> bool {
        PULSE_RANGE.contains(&self.pulse_rate)
            && OSC_FREQ_RANGE.contains(&self.osc_freq)
            && CORE_TEMP_RANGE.contains(&self.core_temp)
    }
}

#[derive(Debug, Default)]
pub struct VitalsSimulator {
    state: VitalsState,
}

impl VitalsSimulator {
    pub fn new(initial: VitalsState) -> Self {
        let mut sim = Self { state: initial };
        sim.state = sim.clamped(initial);
        sim
    }

    pub fn state(&self) -> VitalsState {
        self.state
    }

    fn clamped(&self, s: VitalsState) -> VitalsState {
        VitalsState {
            pulse_rate: s.pulse_rate.clamp(*PULSE_RANGE.start(), *PULSE_RANGE.end()),
            osc_freq: s.osc_freq.clamp(*OSC_FREQ_RANGE.start(), *OSC_FREQ_RANGE.end()),
            core_temp: s
                .core_temp
                .clamp(*CORE_TEMP_RANGE.start(), *CORE_TEMP_RANGE.end()),
        }
    }

    /// Advance one tick and return the new state.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> VitalsState {
        let pulse_delta = rng.random_range(-PULSE_STEP..=PULSE_STEP);
        let freq_delta = (rng.random::<f32>() - 0.5) * 2.0 * OSC_FREQ_STEP;
        let temp_delta = (rng.random::<f32>() - 0.5) * 2.0 * CORE_TEMP_STEP;

        let next = self.clamped(VitalsState {
            pulse_rate: self.state.pulse_rate + pulse_delta,
            osc_freq: self.state.osc_freq + freq_delta,
            core_temp: self.state.core_temp + temp_delta,
        });
        // Rounding happens after the clamp; both bounds are exact at one decimal.
        self.state = VitalsState {
            pulse_rate: next.pulse_rate,
            osc_freq: round_to(next.osc_freq, 1),
            core_temp: round_to(next.core_temp, 1),
        };
        self.state
    }
}

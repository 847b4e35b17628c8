//! Parametric tone bursts for discrete UI events.
//!
//! A burst is one oscillator with an exponential pitch glide and an
//! exponential amplitude decay from 0.05 to 0.001 over its duration.

use std::f32::consts::TAU;

use crate::core::util::exp_ramp;

pub const START_GAIN: f32 = 0.05;
pub const END_GAIN: f32 = 0.001;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToneEvent {
    Keystroke,
    ProcessStart,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveshape {
    Sine,
    Sawtooth,
    Square,
}

impl Waveshape {
    /// One cycle evaluated at `phase` in [0, 1).
    #[inline]
    pub fn eval(self, phase: f32) -> f32 {
        match self {
            Waveshape::Sine => (TAU * phase).sin(),
            Waveshape::Sawtooth => 2.0 * phase - 1.0,
            Waveshape::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneSpec {
    pub shape: Waveshape,
    pub start_hz: f32,
    pub end_hz: f32,
    pub duration_s: f32,
    pub start_gain: f32,
    pub end_gain: f32,
}

impl ToneSpec {
    pub fn for_event(event: ToneEvent) -> Self {
        let (shape, start_hz, end_hz, duration_s) = match event {
            ToneEvent::Keystroke => (Waveshape::Sine, 800.0, 300.0, 0.05),
            ToneEvent::ProcessStart => (Waveshape::Sawtooth, 150.0, 40.0, 0.2),
            ToneEvent::Error => (Waveshape::Square, 220.0, 110.0, 0.15),
        };
        Self {
            shape,
            start_hz,
            end_hz,
            duration_s,
            start_gain: START_GAIN,
            end_gain: END_GAIN,
        }
    }

    pub fn len_samples(&self, sample_rate: u32) -> usize {
        (self.duration_s.max(0.0) * sample_rate as f32).round() as usize
    }

    pub fn frequency_at(&self, t: f32) -> f32 {
        exp_ramp(self.start_hz, self.end_hz, t)
    }

    pub fn gain_at(&self, t: f32) -> f32 {
        exp_ramp(self.start_gain, self.end_gain, t)
    }

    /// Render the burst as mono samples.
    pub fn render(&self, sample_rate: u32) -> Vec<f32> {
        let n = self.len_samples(sample_rate);
        if n == 0 {
            return Vec::new();
        }
        let fs = sample_rate as f32;
        let denom = (n.saturating_sub(1)).max(1) as f32;
        let mut phase = 0.0f32;
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            let t = i as f32 / denom;
            out.push(self.shape.eval(phase) * self.gain_at(t));
            phase = (phase + self.frequency_at(t) / fs).fract();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_parameters() {
        let k = ToneSpec::for_event(ToneEvent::Keystroke);
        assert_eq!(k.shape, Waveshape::Sine);
        assert_eq!((k.start_hz, k.end_hz, k.duration_s), (800.0, 300.0, 0.05));
        let p = ToneSpec::for_event(ToneEvent::ProcessStart);
        assert_eq!(p.shape, Waveshape::Sawtooth);
        assert_eq!((p.start_hz, p.end_hz, p.duration_s), (150.0, 40.0, 0.2));
        for ev in [ToneEvent::Keystroke, ToneEvent::ProcessStart, ToneEvent::Error] {
            assert!(ToneSpec::for_event(ev).duration_s <= 0.2);
        }
    }

    #[test]
    fn render_length_matches_duration() {
        let spec = ToneSpec::for_event(ToneEvent::Keystroke);
        assert_eq!(spec.render(48_000).len(), 2_400);
        let spec = ToneSpec::for_event(ToneEvent::ProcessStart);
        assert_eq!(spec.render(44_100).len(), 8_820);
    }

    #[test]
    fn envelope_decays_to_near_zero() {
        let spec = ToneSpec::for_event(ToneEvent::ProcessStart);
        let out = spec.render(48_000);
        let peak_head = out[..480].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let peak_tail = out[out.len() - 480..]
            .iter()
            .fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak_head <= START_GAIN + 1e-6);
        assert!(peak_tail < 0.002, "tail peak {peak_tail}");
        assert!(peak_head > peak_tail * 10.0);
    }

    #[test]
    fn waveshapes_are_bounded() {
        for shape in [Waveshape::Sine, Waveshape::Sawtooth, Waveshape::Square] {
            for i in 0..100 {
                let v = shape.eval(i as f32 / 100.0);
                assert!((-1.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn zero_sample_rate_renders_nothing() {
        assert!(ToneSpec::for_event(ToneEvent::Error).render(0).is_empty());
    }
}

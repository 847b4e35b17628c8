/// Round to a fixed number of decimals (display precision for telemetry).
pub fn round_to(x: f32, decimals: u32) -> f32 {
    let scale = 10f32.powi(decimals as i32);
    (x * scale).round() / scale
}

/// Exponential ramp from `start` to `end` at normalized position `t` in [0, 1].
/// Both endpoints must be positive; non-positive values are floored to a tiny epsilon.
pub fn exp_ramp(start: f32, end: f32, t: f32) -> f32 {
    let start = start.max(1.0e-6);
    let end = end.max(1.0e-6);
    let t = t.clamp(0.0, 1.0);
    start * (end / start).powf(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_to_one_decimal() {
        assert_eq!(round_to(36.64, 1), 36.6);
        assert_eq!(round_to(14.96, 1), 15.0);
        assert_eq!(round_to(-0.04, 1), 0.0);
    }

    #[test]
    fn exp_ramp_hits_endpoints_and_is_monotone() {
        assert!((exp_ramp(800.0, 300.0, 0.0) - 800.0).abs() < 1e-3);
        assert!((exp_ramp(800.0, 300.0, 1.0) - 300.0).abs() < 1e-3);
        let mut prev = f32::INFINITY;
        for i in 0..=20 {
            let v = exp_ramp(800.0, 300.0, i as f32 / 20.0);
            assert!(v <= prev);
            prev = v;
        }
        // geometric midpoint
        let mid = exp_ramp(0.05, 0.001, 0.5);
        assert!((mid - (0.05f32 * 0.001).sqrt()).abs() < 1e-6);
    }
}

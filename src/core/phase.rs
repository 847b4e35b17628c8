use std::f32::consts::TAU;

#[inline]
pub fn wrap_0_tau(x: f32) -> f32 {
    x.rem_euclid(TAU)
}

/// Blink curve used for idle particles: `floor + depth * |sin(t * speed + offset)|`.
#[inline]
pub fn abs_sine_blink(t: f32, speed: f32, offset: f32, floor: f32, depth: f32) -> f32 {
    floor + depth * (t * speed + offset).sin().abs()
}

/// Signed oscillation centred on `mid`: `mid + swing * sin(t * rate + offset)`.
#[inline]
pub fn centred_sine(t: f32, rate: f32, offset: f32, mid: f32, swing: f32) -> f32 {
    mid + swing * (t * rate + offset).sin()
}

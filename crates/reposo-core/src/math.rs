//! Sample conversion helpers.

/// Flush denormals to zero.
///
/// Slow one-pole filters fed with silence decay toward zero forever; once the
/// state is subnormal every multiply takes the slow path on x86.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x > -1e-20 && x < 1e-20 { 0.0 } else { x }
}

/// Convert a float sample to 16-bit PCM, clamping to `[-1, 1]` first.
///
/// Uses a symmetric `32767` scale so `-1.0` maps to `-32767`.
#[inline]
pub fn sample_to_i16(sample: f32) -> i16 {
    let clamped = if sample.is_nan() {
        0.0
    } else {
        sample.clamp(-1.0, 1.0)
    };
    (clamped * f32::from(i16::MAX)) as i16
}

/// Multiply every sample by `gain`.
#[inline]
pub fn apply_gain(samples: &mut [f32], gain: f32) {
    for s in samples.iter_mut() {
        *s *= gain;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i16_conversion_clamps() {
        assert_eq!(sample_to_i16(0.0), 0);
        assert_eq!(sample_to_i16(1.0), 32767);
        assert_eq!(sample_to_i16(-1.0), -32767);
        assert_eq!(sample_to_i16(3.0), 32767);
        assert_eq!(sample_to_i16(-3.0), -32767);
        assert_eq!(sample_to_i16(f32::NAN), 0);
        assert_eq!(sample_to_i16(0.5), 16383);
    }

    #[test]
    fn denormals_flush() {
        assert_eq!(flush_denormal(1e-30), 0.0);
        assert_eq!(flush_denormal(-1e-30), 0.0);
        assert_eq!(flush_denormal(0.25), 0.25);
    }

    #[test]
    fn gain_scales() {
        let mut buf = [1.0, -0.5, 0.25];
        apply_gain(&mut buf, 0.5);
        assert_eq!(buf, [0.5, -0.25, 0.125]);
    }
}

//! Asymmetric one-pole smoothing of a modulation gain.
//!
//! The AM and isochronic voices compute a raw gain target every sample. When
//! the beat waveform turns (or a parameter jumps mid-buffer) that target can
//! move faster than the ear tolerates, so it is passed through a one-pole
//! low-pass with separate rise and fall rates:
//!
//! ```text
//! coeff = 1 - exp(-1 / (sample_rate * time_constant_secs))
//! y[n]  = y[n-1] + coeff * (target - y[n-1])
//! ```
//!
//! The attack coefficient applies while the target is above the current
//! value, the release coefficient otherwise.

use libm::exp;

/// Attack time constant for tone gain smoothing, in milliseconds.
pub const ATTACK_MS: f64 = 15.0;

/// Release time constant for tone gain smoothing, in milliseconds.
pub const RELEASE_MS: f64 = 30.0;

/// One-pole coefficient for a time constant in seconds.
///
/// Returns the fraction of the remaining distance covered per sample.
#[inline]
pub fn smoothing_coefficient(sample_rate: f64, time_constant_secs: f64) -> f64 {
    1.0 - exp(-1.0 / (sample_rate * time_constant_secs))
}

/// Gain envelope smoother with distinct attack and release.
///
/// # Invariants
///
/// - both coefficients are in `(0, 1]`, so every step is a convex
///   combination: the output never overshoots the `[min, max]` range of the
///   targets it has been fed
///
/// # Example
///
/// ```rust
/// use reposo_core::EnvelopeSmoother;
///
/// let mut env = EnvelopeSmoother::new(44100.0, 0.8);
/// let next = env.process(1.0);
/// assert!(next > 0.8 && next < 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeSmoother {
    value: f64,
    attack_coeff: f64,
    release_coeff: f64,
}

impl EnvelopeSmoother {
    /// Create a smoother with the default 15 ms / 30 ms time constants.
    pub fn new(sample_rate: f64, initial: f64) -> Self {
        Self::with_times(sample_rate, ATTACK_MS, RELEASE_MS, initial)
    }

    /// Create a smoother with explicit attack and release times.
    pub fn with_times(sample_rate: f64, attack_ms: f64, release_ms: f64, initial: f64) -> Self {
        Self {
            value: initial,
            attack_coeff: smoothing_coefficient(sample_rate, attack_ms / 1000.0),
            release_coeff: smoothing_coefficient(sample_rate, release_ms / 1000.0),
        }
    }

    /// Move toward `target` by one sample and return the new value.
    #[inline]
    pub fn process(&mut self, target: f64) -> f64 {
        let coeff = if target > self.value {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.value += coeff * (target - self.value);
        self.value
    }

    /// Current smoothed value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Jump to `value` with no smoothing.
    pub fn reset(&mut self, value: f64) {
        self.value = value;
    }

    /// Attack coefficient (per-sample fraction).
    pub fn attack_coeff(&self) -> f64 {
        self.attack_coeff
    }

    /// Release coefficient (per-sample fraction).
    pub fn release_coeff(&self) -> f64 {
        self.release_coeff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coefficient_matches_formula() {
        let c = smoothing_coefficient(44100.0, 0.015);
        let expected = 1.0 - libm::exp(-1.0 / (44100.0 * 0.015));
        assert_eq!(c, expected);
        assert!(c > 0.0 && c < 1.0);
    }

    #[test]
    fn attack_is_faster_than_release() {
        let env = EnvelopeSmoother::new(44100.0, 0.0);
        assert!(env.attack_coeff() > env.release_coeff());
    }

    #[test]
    fn rising_uses_attack_falling_uses_release() {
        let mut env = EnvelopeSmoother::new(44100.0, 0.5);
        let up = env.process(1.0) - 0.5;
        assert!((up - env.attack_coeff() * 0.5).abs() < 1e-12);

        env.reset(0.5);
        let down = 0.5 - env.process(0.0);
        assert!((down - env.release_coeff() * 0.5).abs() < 1e-12);
    }

    #[test]
    fn converges_to_target() {
        let mut env = EnvelopeSmoother::new(44100.0, 0.0);
        // 15 ms time constant: ten constants is ~6615 samples
        for _ in 0..6615 {
            env.process(1.0);
        }
        assert!((env.value() - 1.0).abs() < 1e-4, "got {}", env.value());
    }

    #[test]
    fn never_overshoots() {
        let mut env = EnvelopeSmoother::new(44100.0, 0.8);
        for i in 0..10000 {
            let target = if (i / 50) % 2 == 0 { 1.0 } else { 0.8 };
            let v = env.process(target);
            assert!((0.8..=1.0).contains(&v), "overshoot: {v}");
        }
    }
}

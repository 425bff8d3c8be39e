//! Stochastic transient events: thunder, chirps, croaks, bubbles.
//!
//! Every event follows one pattern. A timer counts samples. Once it passes the
//! cooldown, each sample rolls a uniform number and fires when the roll beats
//! the threshold. An active event yields an envelope value per sample until
//! its shape finishes, then goes idle.

use core::f64::consts::PI;

use libm::sin;
use rand::Rng;

/// Envelope shape of a transient event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventShape {
    /// `sin(π·t/duration)` clamped to `[0, 1]`, for `duration` samples.
    HalfSine {
        /// Window length in samples (fractional).
        duration: f64,
    },
    /// Starts at `start`, multiplied by `factor` each sample, ends below
    /// `cutoff`.
    ExponentialDecay {
        /// Initial level.
        start: f32,
        /// Per-sample multiplier.
        factor: f32,
        /// Level at which the event ends.
        cutoff: f32,
    },
}

/// One sample of an active event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burst {
    /// Envelope value for this sample.
    pub envelope: f32,
    /// True on the sample the event fired.
    pub onset: bool,
}

/// Cooldown-gated random trigger with a shaped envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct TransientEvent {
    cooldown: u32,
    threshold: f32,
    shape: EventShape,
    timer: u32,
    active: bool,
    level: f32,
}

impl TransientEvent {
    /// Event with a half-sine envelope of `duration_secs`.
    ///
    /// `probability` is the per-sample chance of firing once the cooldown has
    /// passed (`threshold = 1 - probability`).
    pub fn half_sine(cooldown: u32, probability: f32, duration_secs: f64, sample_rate: u32) -> Self {
        Self::new(
            cooldown,
            1.0 - probability,
            EventShape::HalfSine {
                duration: f64::from(sample_rate) * duration_secs,
            },
        )
    }

    /// Event with an explicit threshold and shape.
    pub fn new(cooldown: u32, threshold: f32, shape: EventShape) -> Self {
        Self {
            cooldown,
            threshold,
            shape,
            timer: 0,
            active: false,
            level: 0.0,
        }
    }

    /// Whether the event is sounding.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Samples since the last trigger (or reset).
    pub fn timer(&self) -> u32 {
        self.timer
    }

    /// Return to idle with a cleared timer.
    pub fn reset(&mut self) {
        self.timer = 0;
        self.active = false;
        self.level = 0.0;
    }

    /// Advance one sample, drawing a trigger roll from `rng` only when the
    /// event is idle and past its cooldown.
    pub fn tick<R: Rng>(&mut self, rng: &mut R) -> Option<Burst> {
        self.timer = self.timer.saturating_add(1);
        let mut onset = false;
        if !self.active && self.timer > self.cooldown && rng.random::<f32>() > self.threshold {
            self.active = true;
            self.timer = 0;
            onset = true;
            if let EventShape::ExponentialDecay { start, .. } = self.shape {
                self.level = start;
            }
        }
        if !self.active {
            return None;
        }

        let envelope = match self.shape {
            EventShape::HalfSine { duration } => {
                let env = sin(PI * f64::from(self.timer) / duration).clamp(0.0, 1.0) as f32;
                if self.timer > duration as u32 {
                    self.active = false;
                    self.timer = 0;
                }
                env
            }
            EventShape::ExponentialDecay { factor, cutoff, .. } => {
                self.level *= factor;
                if self.level < cutoff {
                    self.active = false;
                    self.level = 0.0;
                }
                self.level
            }
        };
        Some(Burst { envelope, onset })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn never_fires_during_cooldown() {
        let mut rng = Pcg32::seed_from_u64(1);
        // threshold below every roll: fires the first sample it is allowed to
        let mut ev = TransientEvent::new(100, -1.0, EventShape::HalfSine { duration: 10.0 });
        for _ in 0..100 {
            assert!(ev.tick(&mut rng).is_none());
        }
        let burst = ev.tick(&mut rng);
        assert_eq!(
            burst,
            Some(Burst {
                envelope: 0.0,
                onset: true
            })
        );
    }

    #[test]
    fn half_sine_runs_its_window_then_clears() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut ev = TransientEvent::new(50, -1.0, EventShape::HalfSine { duration: 20.0 });
        let envs: Vec<f32> = (0..100)
            .filter_map(|_| ev.tick(&mut rng))
            .map(|b| b.envelope)
            .collect();
        // onset at timer 0 through timer 21 inclusive, then a fresh cooldown
        assert_eq!(envs.len(), 22);
        assert!(envs.iter().all(|e| (0.0..=1.0).contains(e)));
        assert!((envs[10] - 1.0).abs() < 1e-6);
        assert!(!ev.is_active());
    }

    #[test]
    fn decay_ends_below_cutoff() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ev = TransientEvent::new(
            100,
            -1.0,
            EventShape::ExponentialDecay {
                start: 0.6,
                factor: 0.9,
                cutoff: 0.01,
            },
        );
        let levels: Vec<f32> = (0..180)
            .filter_map(|_| ev.tick(&mut rng))
            .map(|b| b.envelope)
            .collect();
        assert!((levels[0] - 0.54).abs() < 1e-6);
        // 0.6 * 0.9^k < 0.01 first at k = 39
        assert_eq!(levels.len(), 39);
        assert_eq!(levels[38], 0.0);
    }

    #[test]
    fn reset_clears_active() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut ev = TransientEvent::new(0, -1.0, EventShape::HalfSine { duration: 1000.0 });
        ev.tick(&mut rng);
        assert!(ev.is_active());
        ev.reset();
        assert!(!ev.is_active());
        assert_eq!(ev.timer(), 0);
    }
}

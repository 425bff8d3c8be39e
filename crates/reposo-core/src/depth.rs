//! Safety-bounded modulation depth.
//!
//! The user-facing depth control is a fraction in `[0.1, 0.7]`, but the gain
//! envelope never swings by that much. [`effective_depth`] maps the control
//! through three stages:
//!
//! 1. **Band cap**: each entrainment band has a maximum depth. Faster beats
//!    are capped lower since deep fast modulation reads as tremolo flutter.
//! 2. **Carrier scale**: carriers below 200 Hz are scaled by 0.7, because
//!    deep modulation of a bass tone is heard as speaker wobble.
//! 3. **Real-depth map**: the scaled fraction is mapped linearly into
//!    `[0, MAX_REAL_DEPTH]` and clamped so that `1 - 2·depth` stays at or above
//!    [`MIN_GAIN_FLOOR`].
//!
//! The floor guarantee holds for every input, in range or not.
//!
//! | Band  | Beat range (Hz) | Max depth |
//! |-------|-----------------|-----------|
//! | Delta | ≤ 4             | 0.25      |
//! | Theta | ≤ 8             | 0.20      |
//! | Alpha | ≤ 13            | 0.20      |
//! | Beta  | ≤ 30            | 0.20      |
//! | Gamma | > 30            | 0.15      |

use crate::params::{MAX_DEPTH, MIN_DEPTH, clamp_param};

/// Lowest instantaneous gain allowed, as a fraction of peak.
pub const MIN_GAIN_FLOOR: f32 = 0.70;

/// Real depth reached when the scaled user depth equals [`MIN_GAIN_FLOOR`].
pub const MAX_REAL_DEPTH: f32 = 0.25;

/// Upper clamp on real depth: `(1 - MIN_GAIN_FLOOR) / 2`.
pub const REAL_DEPTH_LIMIT: f32 = (1.0 - MIN_GAIN_FLOOR) / 2.0;

/// Carriers below this frequency get [`LOW_CARRIER_SCALE`] applied.
pub const LOW_CARRIER_HZ: f32 = 200.0;

/// Depth multiplier for low carriers.
pub const LOW_CARRIER_SCALE: f32 = 0.7;

/// Brainwave band a beat frequency falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EntrainmentBand {
    /// Up to 4 Hz.
    Delta,
    /// Above 4 Hz, up to 8 Hz.
    Theta,
    /// Above 8 Hz, up to 13 Hz.
    Alpha,
    /// Above 13 Hz, up to 30 Hz.
    Beta,
    /// Above 30 Hz.
    Gamma,
}

impl EntrainmentBand {
    /// Every band, slowest first.
    pub const ALL: [Self; 5] = [
        Self::Delta,
        Self::Theta,
        Self::Alpha,
        Self::Beta,
        Self::Gamma,
    ];

    /// Classify a beat frequency. NaN falls into Delta.
    pub fn from_beat_hz(beat_hz: f32) -> Self {
        if beat_hz.is_nan() || beat_hz <= 4.0 {
            Self::Delta
        } else if beat_hz <= 8.0 {
            Self::Theta
        } else if beat_hz <= 13.0 {
            Self::Alpha
        } else if beat_hz <= 30.0 {
            Self::Beta
        } else {
            Self::Gamma
        }
    }

    /// Maximum user depth permitted in this band.
    pub const fn max_depth(self) -> f32 {
        match self {
            Self::Delta => 0.25,
            Self::Theta | Self::Alpha | Self::Beta => 0.20,
            Self::Gamma => 0.15,
        }
    }

    /// Lowercase band name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Delta => "delta",
            Self::Theta => "theta",
            Self::Alpha => "alpha",
            Self::Beta => "beta",
            Self::Gamma => "gamma",
        }
    }
}

impl core::fmt::Display for EntrainmentBand {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Band cap for a beat frequency.
#[inline]
pub fn max_depth_for_beat(beat_hz: f32) -> f32 {
    EntrainmentBand::from_beat_hz(beat_hz).max_depth()
}

/// Carrier-dependent multiplier: [`LOW_CARRIER_SCALE`] below
/// [`LOW_CARRIER_HZ`], otherwise 1.
#[inline]
pub fn carrier_scale(carrier_hz: f32) -> f32 {
    if carrier_hz < LOW_CARRIER_HZ {
        LOW_CARRIER_SCALE
    } else {
        1.0
    }
}

/// Map a user depth to the real modulation depth used by the gain envelope.
///
/// Always returns a value in `[0, REAL_DEPTH_LIMIT]`, so `1 - 2·d >= 0.70`.
///
/// ```rust
/// use reposo_core::{effective_depth, MIN_GAIN_FLOOR};
///
/// let d = effective_depth(0.4, 6.0, 200.0);
/// assert!(1.0 - 2.0 * d >= MIN_GAIN_FLOOR);
/// ```
pub fn effective_depth(user_depth: f32, beat_hz: f32, carrier_hz: f32) -> f32 {
    let user = clamp_param(user_depth, MIN_DEPTH, MAX_DEPTH);
    let capped = user.min(max_depth_for_beat(beat_hz));
    let scaled = capped * carrier_scale(carrier_hz);
    let real = scaled / MIN_GAIN_FLOOR * MAX_REAL_DEPTH;
    clamp_param(real, 0.0, REAL_DEPTH_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries() {
        assert_eq!(EntrainmentBand::from_beat_hz(1.0), EntrainmentBand::Delta);
        assert_eq!(EntrainmentBand::from_beat_hz(4.0), EntrainmentBand::Delta);
        assert_eq!(EntrainmentBand::from_beat_hz(4.01), EntrainmentBand::Theta);
        assert_eq!(EntrainmentBand::from_beat_hz(8.0), EntrainmentBand::Theta);
        assert_eq!(EntrainmentBand::from_beat_hz(13.0), EntrainmentBand::Alpha);
        assert_eq!(EntrainmentBand::from_beat_hz(30.0), EntrainmentBand::Beta);
        assert_eq!(EntrainmentBand::from_beat_hz(30.5), EntrainmentBand::Gamma);
        assert_eq!(EntrainmentBand::from_beat_hz(f32::NAN), EntrainmentBand::Delta);
    }

    #[test]
    fn caps_never_increase() {
        let caps = EntrainmentBand::ALL.map(EntrainmentBand::max_depth);
        for w in caps.windows(2) {
            assert!(w[1] <= w[0], "{caps:?}");
        }
    }

    #[test]
    fn low_carrier_scales_down() {
        assert_eq!(carrier_scale(199.9), 0.7);
        assert_eq!(carrier_scale(200.0), 1.0);
        let high = effective_depth(0.7, 2.0, 300.0);
        let low = effective_depth(0.7, 2.0, 100.0);
        assert!((low - high * 0.7).abs() < 1e-6);
    }

    #[test]
    fn default_parameters() {
        // 0.4 capped to theta 0.20, no carrier scale, 0.20 / 0.70 * 0.25
        let d = effective_depth(0.4, 6.0, 200.0);
        assert!((d - 0.2 / 0.7 * 0.25).abs() < 1e-6, "got {d}");
    }

    #[test]
    fn floor_holds_for_garbage_input() {
        for &(u, b, c) in &[
            (f32::NAN, 6.0, 200.0),
            (100.0, -3.0, 0.0),
            (f32::INFINITY, f32::NAN, f32::NAN),
            (-5.0, 1000.0, 1e9),
        ] {
            let d = effective_depth(u, b, c);
            assert!((0.0..=REAL_DEPTH_LIMIT).contains(&d), "{u} {b} {c} -> {d}");
            assert!(1.0 - 2.0 * d >= MIN_GAIN_FLOOR);
        }
    }
}

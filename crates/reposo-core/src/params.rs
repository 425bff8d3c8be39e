//! Tone parameters, their ranges, and a lock-free shared snapshot.
//!
//! Control code mutates parameters from any thread; the fill loop reads them
//! once at the top of each buffer. [`SharedToneParams`] stores every field as
//! an atomic (`f32` bit-cast into `AtomicU32`) so neither side ever blocks.
//! A reader may observe a mix of old and new fields for one buffer, which is
//! acceptable for audio parameters.

use core::fmt;
use core::str::FromStr;
use core::sync::atomic::{AtomicU8, AtomicU32, Ordering};

use crate::depth::effective_depth;

/// Engine sample rate in Hz.
pub const SAMPLE_RATE: u32 = 44100;

/// Interleaved samples per fill-loop buffer.
pub const BUFFER_SAMPLES: usize = 2048;

/// Lowest beat frequency in Hz.
pub const MIN_BEAT_HZ: f32 = 1.0;
/// Highest beat frequency in Hz.
pub const MAX_BEAT_HZ: f32 = 50.0;
/// Default beat frequency (theta).
pub const DEFAULT_BEAT_HZ: f32 = 6.0;

/// Lowest carrier frequency in Hz.
pub const MIN_CARRIER_HZ: f32 = 80.0;
/// Highest carrier frequency in Hz.
pub const MAX_CARRIER_HZ: f32 = 500.0;
/// Default carrier frequency.
pub const DEFAULT_CARRIER_HZ: f32 = 200.0;

/// Lowest user-facing modulation depth.
pub const MIN_DEPTH: f32 = 0.1;
/// Highest user-facing modulation depth.
pub const MAX_DEPTH: f32 = 0.7;
/// Default user-facing modulation depth.
pub const DEFAULT_DEPTH: f32 = 0.4;

/// Default tone volume.
pub const DEFAULT_TONE_VOLUME: f32 = 0.5;
/// Default ambience volume.
pub const DEFAULT_NOISE_VOLUME: f32 = 0.4;
/// Volume used for UI previews of ambience.
pub const PREVIEW_VOLUME: f32 = 0.25;

/// Clamp into `[min, max]`, mapping NaN to `min`.
#[inline]
pub fn clamp_param(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

/// Clamp a volume into `[0, 1]`.
#[inline]
pub fn clamp_volume(volume: f32) -> f32 {
    clamp_param(volume, 0.0, 1.0)
}

/// Entrainment mode of the tone engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum ToneMode {
    /// Sine carrier with sinusoidal amplitude modulation.
    #[default]
    Am = 0,
    /// Carrier gated by a half-rectified beat sine.
    Isochronic = 1,
    /// Carrier in the left ear, carrier + beat in the right.
    Binaural = 2,
    /// Carrier and carrier + beat summed in one channel.
    Monaural = 3,
}

impl ToneMode {
    /// Every mode.
    pub const ALL: [Self; 4] = [Self::Am, Self::Isochronic, Self::Binaural, Self::Monaural];

    /// Output channel count: 2 for binaural, 1 otherwise.
    pub const fn channels(self) -> u16 {
        match self {
            Self::Binaural => 2,
            _ => 1,
        }
    }

    /// Lowercase mode name, as accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::Am => "am",
            Self::Isochronic => "isochronic",
            Self::Binaural => "binaural",
            Self::Monaural => "monaural",
        }
    }

    /// Decode from the `repr(u8)` discriminant. Unknown values map to AM.
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Isochronic,
            2 => Self::Binaural,
            3 => Self::Monaural,
            _ => Self::Am,
        }
    }
}

impl fmt::Display for ToneMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a tone mode name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseToneModeError;

impl fmt::Display for ParseToneModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown tone mode (expected am, isochronic, binaural or monaural)")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseToneModeError {}

impl FromStr for ToneMode {
    type Err = ParseToneModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .or_else(|| s.eq_ignore_ascii_case("iso").then_some(Self::Isochronic))
            .ok_or(ParseToneModeError)
    }
}

/// A complete, clamped set of tone parameters.
///
/// Fields are private so every value passes through its clamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneParams {
    beat_hz: f32,
    carrier_hz: f32,
    depth: f32,
    mode: ToneMode,
    volume: f32,
}

impl Default for ToneParams {
    fn default() -> Self {
        Self {
            beat_hz: DEFAULT_BEAT_HZ,
            carrier_hz: DEFAULT_CARRIER_HZ,
            depth: DEFAULT_DEPTH,
            mode: ToneMode::Am,
            volume: DEFAULT_TONE_VOLUME,
        }
    }
}

impl ToneParams {
    /// Build a parameter set, clamping each value into range.
    pub fn new(beat_hz: f32, carrier_hz: f32, depth: f32, mode: ToneMode, volume: f32) -> Self {
        let mut p = Self::default();
        p.set_beat_hz(beat_hz);
        p.set_carrier_hz(carrier_hz);
        p.set_depth(depth);
        p.set_mode(mode);
        p.set_volume(volume);
        p
    }

    /// Beat frequency in Hz.
    pub fn beat_hz(&self) -> f32 {
        self.beat_hz
    }

    /// Carrier frequency in Hz.
    pub fn carrier_hz(&self) -> f32 {
        self.carrier_hz
    }

    /// User-facing depth.
    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Tone mode.
    pub fn mode(&self) -> ToneMode {
        self.mode
    }

    /// Output volume in `[0, 1]`.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Set the beat frequency, clamped to `[1, 50]` Hz.
    pub fn set_beat_hz(&mut self, hz: f32) {
        self.beat_hz = clamp_param(hz, MIN_BEAT_HZ, MAX_BEAT_HZ);
    }

    /// Set the carrier frequency, clamped to `[80, 500]` Hz.
    pub fn set_carrier_hz(&mut self, hz: f32) {
        self.carrier_hz = clamp_param(hz, MIN_CARRIER_HZ, MAX_CARRIER_HZ);
    }

    /// Set the user depth, clamped to `[0.1, 0.7]`.
    pub fn set_depth(&mut self, depth: f32) {
        self.depth = clamp_param(depth, MIN_DEPTH, MAX_DEPTH);
    }

    /// Set the tone mode.
    pub fn set_mode(&mut self, mode: ToneMode) {
        self.mode = mode;
    }

    /// Set the volume, clamped to `[0, 1]`.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_volume(volume);
    }

    /// Real modulation depth after the safety policy.
    pub fn effective_depth(&self) -> f32 {
        effective_depth(self.depth, self.beat_hz, self.carrier_hz)
    }
}

/// Atomic `f32` stored as its bit pattern.
#[derive(Debug)]
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Tone parameters shared between the control thread and a fill loop.
///
/// Setters clamp before storing, so [`snapshot`](Self::snapshot) always yields
/// in-range values.
#[derive(Debug)]
pub struct SharedToneParams {
    beat_hz: AtomicF32,
    carrier_hz: AtomicF32,
    depth: AtomicF32,
    volume: AtomicF32,
    mode: AtomicU8,
}

impl Default for SharedToneParams {
    fn default() -> Self {
        Self::new(ToneParams::default())
    }
}

impl SharedToneParams {
    /// Create shared storage initialized from `params`.
    pub fn new(params: ToneParams) -> Self {
        Self {
            beat_hz: AtomicF32::new(params.beat_hz),
            carrier_hz: AtomicF32::new(params.carrier_hz),
            depth: AtomicF32::new(params.depth),
            volume: AtomicF32::new(params.volume),
            mode: AtomicU8::new(params.mode as u8),
        }
    }

    /// Read every field. Called once per buffer.
    pub fn snapshot(&self) -> ToneParams {
        ToneParams {
            beat_hz: self.beat_hz.load(),
            carrier_hz: self.carrier_hz.load(),
            depth: self.depth.load(),
            mode: ToneMode::from_u8(self.mode.load(Ordering::Relaxed)),
            volume: self.volume.load(),
        }
    }

    /// Store every field of `params`.
    pub fn load_params(&self, params: &ToneParams) {
        self.beat_hz.store(params.beat_hz);
        self.carrier_hz.store(params.carrier_hz);
        self.depth.store(params.depth);
        self.volume.store(params.volume);
        self.mode.store(params.mode as u8, Ordering::Relaxed);
    }

    /// Set the beat frequency (clamped).
    pub fn set_beat_hz(&self, hz: f32) {
        self.beat_hz.store(clamp_param(hz, MIN_BEAT_HZ, MAX_BEAT_HZ));
    }

    /// Set the carrier frequency (clamped).
    pub fn set_carrier_hz(&self, hz: f32) {
        self.carrier_hz
            .store(clamp_param(hz, MIN_CARRIER_HZ, MAX_CARRIER_HZ));
    }

    /// Set the user depth (clamped).
    pub fn set_depth(&self, depth: f32) {
        self.depth.store(clamp_param(depth, MIN_DEPTH, MAX_DEPTH));
    }

    /// Set the volume (clamped).
    pub fn set_volume(&self, volume: f32) {
        self.volume.store(clamp_volume(volume));
    }

    /// Set the tone mode.
    pub fn set_mode(&self, mode: ToneMode) {
        self.mode.store(mode as u8, Ordering::Relaxed);
    }

    /// Current tone mode.
    pub fn mode(&self) -> ToneMode {
        ToneMode::from_u8(self.mode.load(Ordering::Relaxed))
    }

    /// Current volume.
    pub fn volume(&self) -> f32 {
        self.volume.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_clamp() {
        let mut p = ToneParams::default();
        p.set_beat_hz(0.0);
        assert_eq!(p.beat_hz(), MIN_BEAT_HZ);
        p.set_beat_hz(400.0);
        assert_eq!(p.beat_hz(), MAX_BEAT_HZ);
        p.set_carrier_hz(10.0);
        assert_eq!(p.carrier_hz(), MIN_CARRIER_HZ);
        p.set_depth(2.0);
        assert_eq!(p.depth(), MAX_DEPTH);
        p.set_volume(-1.0);
        assert_eq!(p.volume(), 0.0);
        p.set_volume(f32::NAN);
        assert_eq!(p.volume(), 0.0);
    }

    #[test]
    fn defaults() {
        let p = ToneParams::default();
        assert_eq!(p.beat_hz(), 6.0);
        assert_eq!(p.carrier_hz(), 200.0);
        assert_eq!(p.depth(), 0.4);
        assert_eq!(p.mode(), ToneMode::Am);
        assert_eq!(p.volume(), 0.5);
    }

    #[test]
    fn mode_parse_and_display() {
        for mode in ToneMode::ALL {
            assert_eq!(mode.name().parse::<ToneMode>(), Ok(mode));
            assert_eq!(ToneMode::from_u8(mode as u8), mode);
        }
        assert_eq!("BINAURAL".parse::<ToneMode>(), Ok(ToneMode::Binaural));
        assert_eq!("iso".parse::<ToneMode>(), Ok(ToneMode::Isochronic));
        assert!("stereo".parse::<ToneMode>().is_err());
        assert_eq!(ToneMode::Binaural.channels(), 2);
        assert_eq!(ToneMode::Monaural.channels(), 1);
    }

    #[test]
    fn shared_snapshot_reflects_setters() {
        let shared = SharedToneParams::default();
        shared.set_beat_hz(10.0);
        shared.set_carrier_hz(9000.0);
        shared.set_mode(ToneMode::Monaural);
        shared.set_volume(0.8);
        let snap = shared.snapshot();
        assert_eq!(snap.beat_hz(), 10.0);
        assert_eq!(snap.carrier_hz(), MAX_CARRIER_HZ);
        assert_eq!(snap.mode(), ToneMode::Monaural);
        assert_eq!(snap.volume(), 0.8);
    }

    #[test]
    fn load_params_round_trips() {
        let p = ToneParams::new(3.0, 150.0, 0.2, ToneMode::Isochronic, 0.3);
        let shared = SharedToneParams::default();
        shared.load_params(&p);
        assert_eq!(shared.snapshot(), p);
    }
}

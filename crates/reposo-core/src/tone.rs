//! Entrainment tone voices.
//!
//! [`ToneGenerator`] is a closed set of per-mode voices, chosen once when the
//! mode is set. Each voice owns its phase and envelope state and fills an
//! interleaved `f32` buffer. Increments and depth are recomputed from the
//! parameter snapshot at the start of every [`render`](ToneGenerator::render)
//! call, so live changes take effect within one buffer.
//!
//! Volume is *not* applied here. Live playback sets it on the output device,
//! offline rendering multiplies it in afterwards, and both share the samples
//! produced by this module.
//!
//! | Mode       | Channels | Gain envelope                          |
//! |------------|----------|----------------------------------------|
//! | AM         | 1        | `(1 - d) + d·sin(beat)`, smoothed      |
//! | Isochronic | 1        | `(1 - 2d) + 2d·max(0, sin(beat))`, smoothed |
//! | Binaural   | 2        | none                                   |
//! | Monaural   | 1        | none (primary + 0.25 partner, / 1.25)  |

use crate::envelope::EnvelopeSmoother;
use crate::params::{ToneMode, ToneParams};
use crate::phase::PhaseAccumulator;

/// Partner amplitude of the monaural voice relative to the primary (-12 dB).
pub const MONAURAL_PARTNER_RATIO: f64 = 0.25;

const MONAURAL_NORM: f64 = 1.0 + MONAURAL_PARTNER_RATIO;

/// Amplitude-modulated carrier.
#[derive(Debug, Clone)]
pub struct AmVoice {
    sample_rate: f64,
    carrier: PhaseAccumulator,
    beat: PhaseAccumulator,
    envelope: EnvelopeSmoother,
}

impl AmVoice {
    /// Create a voice with the envelope resting at its center gain `1 - d`.
    pub fn new(sample_rate: f64, params: &ToneParams) -> Self {
        let depth = f64::from(params.effective_depth());
        Self {
            sample_rate,
            carrier: PhaseAccumulator::new(),
            beat: PhaseAccumulator::new(),
            envelope: EnvelopeSmoother::new(sample_rate, 1.0 - depth),
        }
    }

    fn render(&mut self, params: &ToneParams, out: &mut [f32]) {
        let depth = f64::from(params.effective_depth());
        self.carrier
            .set_frequency(f64::from(params.carrier_hz()), self.sample_rate);
        self.beat
            .set_frequency(f64::from(params.beat_hz()), self.sample_rate);

        for sample in out.iter_mut() {
            let raw = (1.0 - depth) + depth * self.beat.next_sin();
            let gain = self.envelope.process(raw);
            *sample = (self.carrier.next_sin() * gain) as f32;
        }
    }
}

/// Carrier gated by a half-rectified beat pulse.
#[derive(Debug, Clone)]
pub struct IsochronicVoice {
    sample_rate: f64,
    carrier: PhaseAccumulator,
    beat: PhaseAccumulator,
    envelope: EnvelopeSmoother,
}

impl IsochronicVoice {
    /// Create a voice with the envelope resting at the floor `1 - 2d`.
    pub fn new(sample_rate: f64, params: &ToneParams) -> Self {
        let depth = f64::from(params.effective_depth());
        Self {
            sample_rate,
            carrier: PhaseAccumulator::new(),
            beat: PhaseAccumulator::new(),
            envelope: EnvelopeSmoother::new(sample_rate, 1.0 - 2.0 * depth),
        }
    }

    fn render(&mut self, params: &ToneParams, out: &mut [f32]) {
        let depth = f64::from(params.effective_depth());
        let floor = 1.0 - 2.0 * depth;
        self.carrier
            .set_frequency(f64::from(params.carrier_hz()), self.sample_rate);
        self.beat
            .set_frequency(f64::from(params.beat_hz()), self.sample_rate);

        for sample in out.iter_mut() {
            let pulse = self.beat.next_sin().max(0.0);
            let gain = self.envelope.process(floor + 2.0 * depth * pulse);
            *sample = (self.carrier.next_sin() * gain) as f32;
        }
    }
}

/// Stereo pair detuned by the beat frequency.
#[derive(Debug, Clone)]
pub struct BinauralVoice {
    sample_rate: f64,
    left: PhaseAccumulator,
    right: PhaseAccumulator,
}

impl BinauralVoice {
    /// Create a voice with both ears at phase 0.
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            left: PhaseAccumulator::new(),
            right: PhaseAccumulator::new(),
        }
    }

    fn render(&mut self, params: &ToneParams, out: &mut [f32]) {
        let carrier = f64::from(params.carrier_hz());
        self.left.set_frequency(carrier, self.sample_rate);
        self.right
            .set_frequency(carrier + f64::from(params.beat_hz()), self.sample_rate);

        let mut frames = out.chunks_exact_mut(2);
        for frame in &mut frames {
            frame[0] = self.left.next_sin() as f32;
            frame[1] = self.right.next_sin() as f32;
        }
        frames.into_remainder().fill(0.0);
    }
}

/// Primary tone plus an attenuated partner in one channel.
#[derive(Debug, Clone)]
pub struct MonauralVoice {
    sample_rate: f64,
    primary: PhaseAccumulator,
    partner: PhaseAccumulator,
}

impl MonauralVoice {
    /// Create a voice with both partials at phase 0.
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            primary: PhaseAccumulator::new(),
            partner: PhaseAccumulator::new(),
        }
    }

    fn render(&mut self, params: &ToneParams, out: &mut [f32]) {
        let carrier = f64::from(params.carrier_hz());
        self.primary.set_frequency(carrier, self.sample_rate);
        self.partner
            .set_frequency(carrier + f64::from(params.beat_hz()), self.sample_rate);

        for sample in out.iter_mut() {
            let sum = self.primary.next_sin() + MONAURAL_PARTNER_RATIO * self.partner.next_sin();
            *sample = (sum / MONAURAL_NORM) as f32;
        }
    }
}

/// One voice per [`ToneMode`].
///
/// ```rust
/// use reposo_core::{ToneGenerator, ToneMode, ToneParams};
///
/// let params = ToneParams::new(6.0, 200.0, 0.4, ToneMode::Binaural, 0.5);
/// let mut generator = ToneGenerator::new(44100.0, &params);
/// assert_eq!(generator.channels(), 2);
///
/// let mut buf = [0.0f32; 2048];
/// generator.render(&params, &mut buf);
/// ```
#[derive(Debug, Clone)]
pub enum ToneGenerator {
    /// Amplitude modulation.
    Am(AmVoice),
    /// Isochronic pulses.
    Isochronic(IsochronicVoice),
    /// Binaural stereo pair.
    Binaural(BinauralVoice),
    /// Monaural two-tone sum.
    Monaural(MonauralVoice),
}

impl ToneGenerator {
    /// Build the voice for `params.mode()`.
    pub fn new(sample_rate: f64, params: &ToneParams) -> Self {
        match params.mode() {
            ToneMode::Am => Self::Am(AmVoice::new(sample_rate, params)),
            ToneMode::Isochronic => Self::Isochronic(IsochronicVoice::new(sample_rate, params)),
            ToneMode::Binaural => Self::Binaural(BinauralVoice::new(sample_rate)),
            ToneMode::Monaural => Self::Monaural(MonauralVoice::new(sample_rate)),
        }
    }

    /// Mode this voice was built for.
    pub fn mode(&self) -> ToneMode {
        match self {
            Self::Am(_) => ToneMode::Am,
            Self::Isochronic(_) => ToneMode::Isochronic,
            Self::Binaural(_) => ToneMode::Binaural,
            Self::Monaural(_) => ToneMode::Monaural,
        }
    }

    /// Interleaved channel count of [`render`](Self::render) output.
    pub fn channels(&self) -> u16 {
        self.mode().channels()
    }

    /// Fill `out` with interleaved samples in `[-1, 1]`.
    ///
    /// The mode in `params` is ignored; a mode change needs a new generator
    /// (and, for live playback, a new output stream).
    pub fn render(&mut self, params: &ToneParams, out: &mut [f32]) {
        match self {
            Self::Am(v) => v.render(params, out),
            Self::Isochronic(v) => v.render(params, out),
            Self::Binaural(v) => v.render(params, out),
            Self::Monaural(v) => v.render(params, out),
        }
    }

    /// Current smoothed modulation gain, for modes that have an envelope.
    pub fn smoothed_gain(&self) -> Option<f64> {
        match self {
            Self::Am(v) => Some(v.envelope.value()),
            Self::Isochronic(v) => Some(v.envelope.value()),
            Self::Binaural(_) | Self::Monaural(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::MIN_GAIN_FLOOR;

    const SR: f64 = 44100.0;

    fn params(mode: ToneMode) -> ToneParams {
        ToneParams::new(6.0, 200.0, 0.4, mode, 0.5)
    }

    #[test]
    fn am_envelope_stays_above_floor() {
        let p = params(ToneMode::Am);
        let mut tone = ToneGenerator::new(SR, &p);
        let mut buf = [0.0f32; 1];
        for _ in 0..(SR as usize) {
            tone.render(&p, &mut buf);
            let gain = tone.smoothed_gain().unwrap_or_default();
            assert!(gain >= f64::from(MIN_GAIN_FLOOR), "gain {gain}");
            assert!(gain <= 1.0 + 1e-12);
        }
    }

    #[test]
    fn isochronic_starts_at_floor_and_pulses() {
        let p = params(ToneMode::Isochronic);
        let d = f64::from(p.effective_depth());
        let mut tone = ToneGenerator::new(SR, &p);
        assert!((tone.smoothed_gain().unwrap_or_default() - (1.0 - 2.0 * d)).abs() < 1e-12);

        let mut buf = vec![0.0f32; 44100];
        tone.render(&p, &mut buf);
        let gain = tone.smoothed_gain().unwrap_or_default();
        assert!(gain >= 1.0 - 2.0 * d - 1e-12);
        let peak = buf.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak > 0.9, "pulse never opened: {peak}");
    }

    #[test]
    fn binaural_channels_differ_by_beat() {
        let p = params(ToneMode::Binaural);
        let mut tone = ToneGenerator::new(SR, &p);
        assert_eq!(tone.channels(), 2);
        let mut buf = vec![0.0f32; 2 * 44100];
        tone.render(&p, &mut buf);

        let crossings = |ch: usize| {
            let mut n = 0;
            let mut prev = 0.0f32;
            for frame in buf.chunks_exact(2) {
                if prev <= 0.0 && frame[ch] > 0.0 {
                    n += 1;
                }
                prev = frame[ch];
            }
            n
        };
        let left: i32 = crossings(0);
        let right: i32 = crossings(1);
        assert!((left - 200).abs() <= 1, "left {left}");
        assert!((right - 206).abs() <= 1, "right {right}");
    }

    #[test]
    fn binaural_odd_buffer_zeroes_tail() {
        let p = params(ToneMode::Binaural);
        let mut tone = ToneGenerator::new(SR, &p);
        let mut buf = [1.0f32; 5];
        tone.render(&p, &mut buf);
        assert_eq!(buf[4], 0.0);
    }

    #[test]
    fn monaural_never_clips() {
        let p = params(ToneMode::Monaural);
        let mut tone = ToneGenerator::new(SR, &p);
        assert!(tone.smoothed_gain().is_none());
        let mut buf = vec![0.0f32; 44100];
        tone.render(&p, &mut buf);
        assert!(buf.iter().all(|s| s.abs() <= 1.0));
        let peak = buf.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak > 0.95, "peak {peak}");
    }

    #[test]
    fn frequency_change_applies_next_buffer() {
        let mut p = params(ToneMode::Binaural);
        let mut tone = ToneGenerator::new(SR, &p);
        let mut buf = vec![0.0f32; 2048];
        tone.render(&p, &mut buf);
        p.set_carrier_hz(400.0);
        tone.render(&p, &mut buf);
        if let ToneGenerator::Binaural(v) = &tone {
            let expected = crate::phase::phase_increment(400.0, SR);
            assert!((v.left.increment() - expected).abs() < 1e-15);
        } else {
            panic!("wrong voice");
        }
    }

    #[test]
    fn same_params_same_samples() {
        for mode in ToneMode::ALL {
            let p = params(mode);
            let mut a = ToneGenerator::new(SR, &p);
            let mut b = ToneGenerator::new(SR, &p);
            let mut buf_a = vec![0.0f32; 4096];
            let mut buf_b = vec![0.0f32; 4096];
            a.render(&p, &mut buf_a);
            b.render(&p, &mut buf_b);
            assert_eq!(buf_a, buf_b, "{mode}");
        }
    }
}

//! Per-profile ambience shapers and the [`NoiseGenerator`] that drives them.
//!
//! Each profile owns its own filter, LFO and event state inside one
//! [`Shaper`] variant. Switching profile builds a fresh shaper, so no timer or
//! active flag from the previous profile can survive the switch.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::filters::{BrownIntegrator, Lowpass, PinkFilter};
use super::profile::NoiseProfile;
use super::transient::{EventShape, TransientEvent};
use crate::phase::{PhaseAccumulator, phase_increment};

/// Light rain: high-passed pink noise plus droplets.
#[derive(Debug, Clone)]
pub struct RainLight {
    pink: PinkFilter,
    lowpass: Lowpass,
}

impl RainLight {
    fn new() -> Self {
        Self {
            pink: PinkFilter::new(),
            lowpass: Lowpass::new(0.02),
        }
    }

    fn process(&mut self, white: f32, rng: &mut Pcg32) -> f32 {
        let base = self.pink.process(white);
        let highpass = base - self.lowpass.process(base);
        let droplet = if rng.random::<f32>() > 0.997 {
            rng.random::<f32>() * 0.3
        } else {
            0.0
        };
        highpass * 1.2 + droplet
    }
}

/// Heavy rain: pink/low-pass blend plus decaying thunder.
#[derive(Debug, Clone)]
pub struct RainHeavy {
    pink: PinkFilter,
    lowpass: Lowpass,
    rumble: BrownIntegrator,
    thunder: TransientEvent,
}

impl RainHeavy {
    fn new(sample_rate: u32) -> Self {
        Self {
            pink: PinkFilter::new(),
            lowpass: Lowpass::new(0.015),
            rumble: BrownIntegrator::new(),
            thunder: TransientEvent::new(
                sample_rate.saturating_mul(4),
                0.99998,
                EventShape::ExponentialDecay {
                    start: 0.6,
                    factor: 0.99993,
                    cutoff: 0.01,
                },
            ),
        }
    }

    fn process(&mut self, white: f32, rng: &mut Pcg32) -> f32 {
        let base = self.pink.process(white);
        let rain = base * 0.7 + self.lowpass.process(base) * 0.5;
        let thunder = self
            .thunder
            .tick(rng)
            .map_or(0.0, |b| self.rumble.process(white * 0.5) * b.envelope);
        (rain + thunder).clamp(-1.0, 1.0)
    }
}

/// Wind, and ocean when `swell` is set.
#[derive(Debug, Clone)]
pub struct Gust {
    brown: BrownIntegrator,
    lowpass: Lowpass,
    swell: Option<PhaseAccumulator>,
}

impl Gust {
    fn wind() -> Self {
        Self {
            brown: BrownIntegrator::new(),
            lowpass: Lowpass::new(0.004),
            swell: None,
        }
    }

    fn ocean(sample_rate: u32) -> Self {
        let mut lfo = PhaseAccumulator::new();
        lfo.set_frequency(0.10, f64::from(sample_rate));
        Self {
            brown: BrownIntegrator::new(),
            lowpass: Lowpass::new(0.0025),
            swell: Some(lfo),
        }
    }

    fn process(&mut self, white: f32) -> f32 {
        let bed = self.lowpass.process(self.brown.process(white));
        match &mut self.swell {
            Some(lfo) => bed * (0.65 + 0.35 * lfo.next_sin()) as f32,
            None => bed,
        }
    }
}

/// Forest night: quiet bed, cricket chirps, frog croaks.
#[derive(Debug, Clone)]
pub struct Forest {
    brown: BrownIntegrator,
    lowpass: Lowpass,
    cricket: TransientEvent,
    cricket_lo: PhaseAccumulator,
    cricket_hi: PhaseAccumulator,
    frog: TransientEvent,
    frog_osc: PhaseAccumulator,
}

impl Forest {
    fn new(sample_rate: u32) -> Self {
        let sr = f64::from(sample_rate);
        let osc = |hz| {
            let mut p = PhaseAccumulator::new();
            p.set_frequency(hz, sr);
            p
        };
        Self {
            brown: BrownIntegrator::with_step(0.008, 1.0),
            lowpass: Lowpass::new(0.002),
            cricket: TransientEvent::half_sine(sample_rate / 4, 0.0003, 0.06, sample_rate),
            cricket_lo: osc(4200.0),
            cricket_hi: osc(4600.0),
            frog: TransientEvent::half_sine(sample_rate.saturating_mul(2), 0.0001, 0.15, sample_rate),
            frog_osc: osc(180.0),
        }
    }

    fn process(&mut self, white: f32, rng: &mut Pcg32) -> f32 {
        let ambient = self.lowpass.process(self.brown.process(white) * 2.0) * 0.3;

        let cricket = self.cricket.tick(rng).map_or(0.0, |b| {
            let pair = self.cricket_lo.next_sin() + self.cricket_hi.next_sin();
            (pair * 0.06 * f64::from(b.envelope)) as f32
        });
        let frog = self.frog.tick(rng).map_or(0.0, |b| {
            (self.frog_osc.next_sin() * 0.12 * f64::from(b.envelope)) as f32
        });

        (ambient + cricket + frog).clamp(-1.0, 1.0)
    }
}

/// River: two-band pink flow with an LFO and bubble pops.
#[derive(Debug, Clone)]
pub struct River {
    sample_rate: f64,
    pink: PinkFilter,
    body: Lowpass,
    rush: Lowpass,
    flow_lfo: PhaseAccumulator,
    bubble: TransientEvent,
    bubble_osc: PhaseAccumulator,
}

impl River {
    fn new(sample_rate: u32) -> Self {
        let sr = f64::from(sample_rate);
        let mut flow_lfo = PhaseAccumulator::new();
        flow_lfo.set_frequency(0.25, sr);
        Self {
            sample_rate: sr,
            pink: PinkFilter::new(),
            body: Lowpass::new(0.008),
            rush: Lowpass::new(0.003),
            flow_lfo,
            bubble: TransientEvent::half_sine(sample_rate / 8, 0.0005, 0.02, sample_rate),
            bubble_osc: PhaseAccumulator::new(),
        }
    }

    fn process(&mut self, white: f32, rng: &mut Pcg32) -> f32 {
        let pink = self.pink.process(white);
        let flow = self.body.process(pink) * 0.6 + (pink - self.rush.process(pink)) * 0.35;
        let modulation = (0.8 + 0.2 * self.flow_lfo.next_sin()) as f32;

        let bubble = match self.bubble.tick(rng) {
            Some(b) => {
                if b.onset {
                    self.bubble_osc.reset();
                }
                // pitch wobbles every sample
                let hz = 800.0 + rng.random::<f64>() * 400.0;
                self.bubble_osc
                    .set_increment(phase_increment(hz, self.sample_rate));
                (self.bubble_osc.next_sin() * 0.08 * f64::from(b.envelope)) as f32
            }
            None => 0.0,
        };

        (flow * modulation + bubble).clamp(-1.0, 1.0)
    }
}

/// Per-profile shaping state.
#[derive(Debug, Clone)]
pub enum Shaper {
    /// Pink noise.
    Pink(PinkFilter),
    /// Brown noise.
    Brown(BrownIntegrator),
    /// Light rain.
    RainLight(RainLight),
    /// Heavy rain with thunder.
    RainHeavy(RainHeavy),
    /// Wind.
    Wind(Gust),
    /// Ocean swell.
    Ocean(Gust),
    /// Forest night.
    Forest(Forest),
    /// River.
    River(River),
}

impl Shaper {
    /// Fresh state for `profile`.
    pub fn new(profile: NoiseProfile, sample_rate: u32) -> Self {
        match profile {
            NoiseProfile::Pink => Self::Pink(PinkFilter::new()),
            NoiseProfile::Brown => Self::Brown(BrownIntegrator::new()),
            NoiseProfile::RainLight => Self::RainLight(RainLight::new()),
            NoiseProfile::RainHeavy => Self::RainHeavy(RainHeavy::new(sample_rate)),
            NoiseProfile::Wind => Self::Wind(Gust::wind()),
            NoiseProfile::Ocean => Self::Ocean(Gust::ocean(sample_rate)),
            NoiseProfile::Forest => Self::Forest(Forest::new(sample_rate)),
            NoiseProfile::River => Self::River(River::new(sample_rate)),
        }
    }

    /// Shape one white sample. The result is not clamped.
    #[inline]
    pub fn process(&mut self, white: f32, rng: &mut Pcg32) -> f32 {
        match self {
            Self::Pink(f) => f.process(white),
            Self::Brown(b) => b.process(white),
            Self::RainLight(s) => s.process(white, rng),
            Self::RainHeavy(s) => s.process(white, rng),
            Self::Wind(s) | Self::Ocean(s) => s.process(white),
            Self::Forest(s) => s.process(white, rng),
            Self::River(s) => s.process(white, rng),
        }
    }

    /// Number of transient events currently sounding.
    pub fn active_events(&self) -> usize {
        match self {
            Self::RainHeavy(s) => usize::from(s.thunder.is_active()),
            Self::Forest(s) => usize::from(s.cricket.is_active()) + usize::from(s.frog.is_active()),
            Self::River(s) => usize::from(s.bubble.is_active()),
            _ => 0,
        }
    }
}

/// Seeded ambience source producing mono samples in `[-1, 1]`.
///
/// ```rust
/// use reposo_core::{NoiseGenerator, NoiseProfile};
///
/// let mut noise = NoiseGenerator::new(NoiseProfile::Ocean, 44100, 7);
/// let mut buf = [0.0f32; 1024];
/// noise.render(&mut buf);
/// assert!(buf.iter().all(|s| (-1.0..=1.0).contains(s)));
/// ```
#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    sample_rate: u32,
    profile: NoiseProfile,
    shaper: Shaper,
    rng: Pcg32,
}

impl NoiseGenerator {
    /// Create a generator. Equal seeds give equal output.
    pub fn new(profile: NoiseProfile, sample_rate: u32, seed: u64) -> Self {
        Self {
            sample_rate,
            profile,
            shaper: Shaper::new(profile, sample_rate),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Active profile.
    pub fn profile(&self) -> NoiseProfile {
        self.profile
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Switch profile, discarding all shaping and event state.
    ///
    /// Resets even when `profile` is already active.
    pub fn set_profile(&mut self, profile: NoiseProfile) {
        #[cfg(feature = "tracing")]
        tracing::debug!(from = %self.profile, to = %profile, "noise profile switch");
        self.profile = profile;
        self.shaper = Shaper::new(profile, self.sample_rate);
    }

    /// Switch profile by asset identifier. `None` keeps the current profile.
    ///
    /// Returns the profile active afterwards.
    pub fn set_profile_from_asset_id(&mut self, asset_id: Option<&str>) -> NoiseProfile {
        if let Some(id) = asset_id {
            self.set_profile(NoiseProfile::from_asset_id(id));
        }
        self.profile
    }

    /// Transient events currently sounding.
    pub fn active_events(&self) -> usize {
        self.shaper.active_events()
    }

    /// Produce one sample.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let white = self.rng.random::<f32>() * 2.0 - 1.0;
        self.shaper.process(white, &mut self.rng).clamp(-1.0, 1.0)
    }

    /// Fill `out` with mono samples.
    pub fn render(&mut self, out: &mut [f32]) {
        for s in out.iter_mut() {
            *s = self.next_sample();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 44100;

    #[test]
    fn equal_seeds_equal_output() {
        for profile in NoiseProfile::ALL {
            let mut a = NoiseGenerator::new(profile, SR, 42);
            let mut b = NoiseGenerator::new(profile, SR, 42);
            let mut buf_a = vec![0.0f32; 4096];
            let mut buf_b = vec![0.0f32; 4096];
            a.render(&mut buf_a);
            b.render(&mut buf_b);
            assert_eq!(buf_a, buf_b, "{profile}");
        }
    }

    #[test]
    fn every_profile_is_bounded_and_audible() {
        for profile in NoiseProfile::ALL {
            let mut noise = NoiseGenerator::new(profile, SR, 9);
            let mut buf = vec![0.0f32; SR as usize * 2];
            noise.render(&mut buf);
            assert!(buf.iter().all(|s| (-1.0..=1.0).contains(s)), "{profile}");
            let rms = (buf.iter().map(|s| s * s).sum::<f32>() / buf.len() as f32).sqrt();
            assert!(rms > 1e-4, "{profile} silent: {rms}");
        }
    }

    #[test]
    fn thunder_eventually_fires_and_profile_switch_clears_it() {
        let mut noise = NoiseGenerator::new(NoiseProfile::RainHeavy, SR, 1234);
        let mut fired = false;
        for _ in 0..(SR as usize * 60) {
            noise.next_sample();
            if noise.active_events() > 0 {
                fired = true;
                break;
            }
        }
        assert!(fired, "no thunder within a minute");

        noise.set_profile(NoiseProfile::Ocean);
        assert_eq!(noise.active_events(), 0);
        noise.set_profile(NoiseProfile::RainHeavy);
        // fresh cooldown: no thunder for four seconds
        for _ in 0..(SR as usize * 4) {
            noise.next_sample();
            assert_eq!(noise.active_events(), 0);
        }
    }

    #[test]
    fn forest_chirps_appear() {
        let mut noise = NoiseGenerator::new(NoiseProfile::Forest, SR, 5);
        let mut seen = false;
        for _ in 0..(SR as usize * 30) {
            noise.next_sample();
            if noise.active_events() > 0 {
                seen = true;
                break;
            }
        }
        assert!(seen);
    }

    #[test]
    fn asset_none_keeps_profile() {
        let mut noise = NoiseGenerator::new(NoiseProfile::Wind, SR, 0);
        assert_eq!(noise.set_profile_from_asset_id(None), NoiseProfile::Wind);
        assert_eq!(
            noise.set_profile_from_asset_id(Some("Rain_Heavy_Thunder")),
            NoiseProfile::RainHeavy
        );
        assert_eq!(
            noise.set_profile_from_asset_id(Some("unknown")),
            NoiseProfile::Pink
        );
    }
}

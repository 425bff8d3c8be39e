//! Live ambience playback.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use reposo_core::{DEFAULT_NOISE_VOLUME, NoiseGenerator, NoiseProfile};

use crate::Result;
use crate::backend::AudioBackend;
use crate::driver::{EngineState, PlaybackDriver, SampleSource};
use crate::options::EngineOptions;

/// Profile selection shared with the fill thread.
///
/// `epoch` bumps on every selection so re-selecting the active profile still
/// resets the generator.
#[derive(Debug)]
struct ProfileControl {
    profile: AtomicU8,
    epoch: AtomicU64,
}

impl ProfileControl {
    fn profile(&self) -> NoiseProfile {
        NoiseProfile::from_u8(self.profile.load(Ordering::Acquire))
    }

    fn select(&self, profile: NoiseProfile) {
        self.profile.store(profile as u8, Ordering::Release);
        self.epoch.fetch_add(1, Ordering::AcqRel);
    }
}

struct NoiseSource {
    control: Arc<ProfileControl>,
    epoch: u64,
    generator: NoiseGenerator,
}

impl SampleSource for NoiseSource {
    fn fill(&mut self, out: &mut [f32]) {
        let epoch = self.control.epoch.load(Ordering::Acquire);
        if epoch != self.epoch {
            self.epoch = epoch;
            self.generator.set_profile(self.control.profile());
        }
        self.generator.render(out);
    }
}

/// Plays one mono ambience stream through a [`PlaybackDriver`].
///
/// Independent of any [`ToneEngine`](crate::ToneEngine), so tone and ambience
/// run side by side on separate fill threads. Unlike the tone engine,
/// [`stop`](Self::stop) and [`pause`](Self::pause) release immediately.
#[derive(Debug)]
pub struct NoiseEngine {
    control: Arc<ProfileControl>,
    driver: PlaybackDriver,
    options: EngineOptions,
    seed: Option<u64>,
}

impl NoiseEngine {
    /// Engine with default options, playing pink noise at volume 0.4.
    pub fn new(backend: Arc<dyn AudioBackend>) -> Self {
        Self::with_options(backend, EngineOptions::default())
    }

    /// Engine with explicit options.
    pub fn with_options(backend: Arc<dyn AudioBackend>, options: EngineOptions) -> Self {
        Self::with_label("noise", backend, options)
    }

    pub(crate) fn with_label(
        label: &'static str,
        backend: Arc<dyn AudioBackend>,
        options: EngineOptions,
    ) -> Self {
        Self {
            control: Arc::new(ProfileControl {
                profile: AtomicU8::new(NoiseProfile::default() as u8),
                epoch: AtomicU64::new(0),
            }),
            driver: PlaybackDriver::new(label, backend, DEFAULT_NOISE_VOLUME),
            options,
            seed: None,
        }
    }

    /// Seed every stream this engine starts with `seed` instead of entropy.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Active profile.
    pub fn profile(&self) -> NoiseProfile {
        self.control.profile()
    }

    /// Select a profile. Takes effect at the next buffer and always resets
    /// the shaping state.
    pub fn set_profile(&self, profile: NoiseProfile) {
        tracing::debug!(profile = %profile, "noise profile selected");
        self.control.select(profile);
    }

    /// Select a profile by asset identifier. `None` keeps the current profile.
    ///
    /// Returns the profile active afterwards.
    pub fn set_profile_from_asset_id(&self, asset_id: Option<&str>) -> NoiseProfile {
        if let Some(id) = asset_id {
            self.set_profile(NoiseProfile::from_asset_id(id));
        }
        self.profile()
    }

    /// Requested volume.
    pub fn volume(&self) -> f32 {
        self.driver.volume()
    }

    /// Set the output volume (clamped to `[0, 1]`).
    pub fn set_volume(&self, volume: f32) {
        self.driver.set_volume(volume);
    }

    /// Open a mono output and start playing. No-op while already playing.
    pub fn start(&self) -> Result<()> {
        let seed = self.seed.unwrap_or_else(rand::random);
        let source = NoiseSource {
            epoch: self.control.epoch.load(Ordering::Acquire),
            generator: NoiseGenerator::new(self.profile(), self.options.sample_rate, seed),
            control: Arc::clone(&self.control),
        };
        tracing::debug!(profile = %self.profile(), seed, "starting ambience");
        self.driver.start(&self.options.output_config(1), source)
    }

    /// Release the output immediately. Same as [`stop`](Self::stop).
    pub fn pause(&self) {
        self.stop();
    }

    /// Release the output immediately.
    pub fn stop(&self) {
        self.driver.force_stop();
    }

    /// Release the output. Idempotent.
    pub fn release(&self) {
        self.driver.force_stop();
    }

    /// Lifecycle state.
    pub fn state(&self) -> EngineState {
        self.driver.state()
    }

    /// Whether the fill thread is producing samples.
    pub fn is_playing(&self) -> bool {
        self.driver.is_playing()
    }
}

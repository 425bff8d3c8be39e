//! Live entrainment-tone playback.

use std::sync::Arc;
use std::time::Duration;

use reposo_core::{SharedToneParams, ToneGenerator, ToneMode, ToneParams};

use crate::backend::AudioBackend;
use crate::driver::{EngineState, FadeCallback, PlaybackDriver, SampleSource};
use crate::options::EngineOptions;
use crate::Result;

/// Fill-thread side of a [`ToneEngine`]: one generator, reading the shared
/// parameters once per buffer.
struct ToneSource {
    params: Arc<SharedToneParams>,
    generator: ToneGenerator,
}

impl SampleSource for ToneSource {
    fn fill(&mut self, out: &mut [f32]) {
        let params = self.params.snapshot();
        self.generator.render(&params, out);
    }
}

/// Plays one tone stream through a [`PlaybackDriver`].
///
/// All setters may be called from any thread while playing; the fill thread
/// picks the change up at its next buffer. Changing the mode while playing
/// re-creates the output stream because the channel count may change.
///
/// Volume is applied by the device, never mixed into the samples.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use reposo_core::ToneMode;
/// use reposo_io::{mock::MockBackend, ToneEngine};
///
/// let engine = ToneEngine::new(Arc::new(MockBackend::new()));
/// engine.load_parameters(10.0, 220.0, 0.5, ToneMode::Isochronic, 0.6)?;
/// engine.start()?;
/// engine.set_frequency(8.0);
/// engine.stop();
/// # Ok::<(), reposo_io::Error>(())
/// ```
#[derive(Debug)]
pub struct ToneEngine {
    params: Arc<SharedToneParams>,
    driver: PlaybackDriver,
    options: EngineOptions,
}

impl ToneEngine {
    /// Engine with default options.
    pub fn new(backend: Arc<dyn AudioBackend>) -> Self {
        Self::with_options(backend, EngineOptions::default())
    }

    /// Engine with explicit options.
    pub fn with_options(backend: Arc<dyn AudioBackend>, options: EngineOptions) -> Self {
        Self::with_label("tone", backend, options)
    }

    pub(crate) fn with_label(
        label: &'static str,
        backend: Arc<dyn AudioBackend>,
        options: EngineOptions,
    ) -> Self {
        let params = ToneParams::default();
        Self {
            driver: PlaybackDriver::new(label, backend, params.volume()),
            params: Arc::new(SharedToneParams::new(params)),
            options,
        }
    }

    /// Options the engine was built with.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Current parameters.
    pub fn params(&self) -> ToneParams {
        self.params.snapshot()
    }

    /// Replace every parameter at once (each clamped).
    ///
    /// A mode change while playing restarts the stream.
    pub fn load_parameters(
        &self,
        beat_hz: f32,
        carrier_hz: f32,
        depth: f32,
        mode: ToneMode,
        volume: f32,
    ) -> Result<()> {
        let params = ToneParams::new(beat_hz, carrier_hz, depth, self.params.mode(), volume);
        self.params.load_params(&params);
        self.driver.set_volume(params.volume());
        self.set_tone_mode(mode)
    }

    /// Replace every parameter from a prepared set.
    pub fn load(&self, params: &ToneParams) -> Result<()> {
        self.load_parameters(
            params.beat_hz(),
            params.carrier_hz(),
            params.depth(),
            params.mode(),
            params.volume(),
        )
    }

    /// Set the beat frequency in Hz (clamped to `[1, 50]`).
    pub fn set_frequency(&self, beat_hz: f32) {
        self.params.set_beat_hz(beat_hz);
    }

    /// Set the carrier frequency in Hz (clamped to `[80, 500]`).
    pub fn set_carrier_frequency(&self, carrier_hz: f32) {
        self.params.set_carrier_hz(carrier_hz);
    }

    /// Set the user modulation depth (clamped to `[0.1, 0.7]`).
    pub fn set_modulation_depth(&self, depth: f32) {
        self.params.set_depth(depth);
    }

    /// Set the output volume (clamped to `[0, 1]`).
    pub fn set_volume(&self, volume: f32) {
        self.params.set_volume(volume);
        self.driver.set_volume(self.params.volume());
    }

    /// Switch mode. Restarts the stream only if playing and the mode changed.
    pub fn set_tone_mode(&self, mode: ToneMode) -> Result<()> {
        let previous = self.params.mode();
        self.params.set_mode(mode);
        if previous == mode || !self.driver.is_playing() {
            return Ok(());
        }
        tracing::info!(from = %previous, to = %mode, "tone mode switch, restarting stream");
        self.driver.force_stop();
        self.start()
    }

    /// Compatibility switch: `true` selects binaural, `false` selects AM.
    pub fn set_binaural(&self, binaural: bool) -> Result<()> {
        self.set_tone_mode(if binaural {
            ToneMode::Binaural
        } else {
            ToneMode::Am
        })
    }

    /// Open the output and start playing. No-op while already playing.
    pub fn start(&self) -> Result<()> {
        let params = self.params.snapshot();
        let source = ToneSource {
            generator: ToneGenerator::new(f64::from(self.options.sample_rate), &params),
            params: Arc::clone(&self.params),
        };
        let config = self.options.output_config(params.mode().channels());
        self.driver.start(&config, source)
    }

    /// Fade out briefly and release the output. Same as [`stop`](Self::stop).
    pub fn pause(&self) {
        self.stop();
    }

    /// Fade out briefly and release the output.
    pub fn stop(&self) {
        self.driver
            .fade_to_stop(self.options.stop_fade, self.options.stop_fade_steps);
    }

    /// Fade to silence over `duration` while still playing, then release and
    /// run `on_complete`.
    pub fn fade_out(&self, duration: Duration, on_complete: Option<FadeCallback>) {
        self.driver
            .fade_out(duration, self.options.fade_out_steps, on_complete);
    }

    /// Release the output immediately. Idempotent.
    pub fn release(&self) {
        self.driver.force_stop();
    }

    /// Block until a fade started by `stop`, `pause` or `fade_out` finishes.
    pub fn wait_for_fade(&self) {
        self.driver.wait_for_fade();
    }

    /// Lifecycle state.
    pub fn state(&self) -> EngineState {
        self.driver.state()
    }

    /// Whether the fill thread is producing samples.
    pub fn is_playing(&self) -> bool {
        self.driver.is_playing()
    }

    /// Channel count of the live stream, if any.
    pub fn channels(&self) -> Option<u16> {
        self.driver.channels()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;

    fn engine() -> (Arc<MockBackend>, ToneEngine) {
        let backend = Arc::new(MockBackend::new());
        let engine = ToneEngine::new(Arc::clone(&backend) as Arc<dyn AudioBackend>);
        (backend, engine)
    }

    #[test]
    fn setters_clamp() {
        let (_, engine) = engine();
        engine.set_frequency(500.0);
        engine.set_carrier_frequency(20.0);
        engine.set_modulation_depth(f32::NAN);
        engine.set_volume(3.0);
        let p = engine.params();
        assert_eq!(p.beat_hz(), 50.0);
        assert_eq!(p.carrier_hz(), 80.0);
        assert_eq!(p.depth(), 0.1);
        assert_eq!(p.volume(), 1.0);
    }

    #[test]
    fn mode_change_while_stopped_does_not_open() {
        let (backend, engine) = engine();
        engine.set_tone_mode(ToneMode::Binaural).unwrap();
        assert_eq!(backend.opened(), 0);
        assert_eq!(engine.params().mode(), ToneMode::Binaural);
    }

    #[test]
    fn same_mode_does_not_restart() {
        let (backend, engine) = engine();
        engine.start().unwrap();
        engine.set_tone_mode(ToneMode::Am).unwrap();
        assert_eq!(backend.opened(), 1);
        engine.release();
    }

    #[test]
    fn binaural_shim_maps_to_modes() {
        let (_, engine) = engine();
        engine.set_binaural(true).unwrap();
        assert_eq!(engine.params().mode(), ToneMode::Binaural);
        engine.set_binaural(false).unwrap();
        assert_eq!(engine.params().mode(), ToneMode::Am);
    }

    #[test]
    fn release_is_idempotent() {
        let (backend, engine) = engine();
        engine.start().unwrap();
        engine.release();
        engine.release();
        assert_eq!(engine.state(), EngineState::Stopped);
        assert_eq!(backend.live(), 0);
    }
}

//! Engine construction options.

use std::time::Duration;

use crate::backend::OutputConfig;

/// Settings shared by [`ToneEngine`](crate::ToneEngine) and
/// [`NoiseEngine`](crate::NoiseEngine).
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Interleaved samples per fill-loop buffer.
    ///
    /// Counted across channels, so a stereo stream holds half as many frames
    /// per buffer as a mono one at the same setting.
    pub buffer_samples: usize,
    /// Output device name filter; system default when `None`.
    pub device_name: Option<String>,
    /// Length of the fade run by `stop()` and `pause()`.
    pub stop_fade: Duration,
    /// Volume steps in the stop fade.
    pub stop_fade_steps: u32,
    /// Volume steps in [`ToneEngine::fade_out`](crate::ToneEngine::fade_out).
    pub fade_out_steps: u32,
    /// Ambience volume used by [`Previewer`](crate::Previewer).
    pub preview_volume: f32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            sample_rate: reposo_core::SAMPLE_RATE,
            buffer_samples: reposo_core::BUFFER_SAMPLES,
            device_name: None,
            stop_fade: Duration::from_millis(30),
            stop_fade_steps: 12,
            fade_out_steps: 50,
            preview_volume: reposo_core::PREVIEW_VOLUME,
        }
    }
}

impl EngineOptions {
    /// Output config for a stream with `channels`.
    pub fn output_config(&self, channels: u16) -> OutputConfig {
        OutputConfig {
            sample_rate: self.sample_rate,
            channels,
            buffer_samples: self.buffer_samples.max(usize::from(channels)),
            device_name: self.device_name.clone(),
        }
    }
}

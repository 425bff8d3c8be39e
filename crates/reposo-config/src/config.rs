//! Engine configuration file.

use std::path::Path;
use std::time::Duration;

use reposo_core::{
    BUFFER_SAMPLES, DEFAULT_BEAT_HZ, DEFAULT_CARRIER_HZ, DEFAULT_DEPTH, DEFAULT_NOISE_VOLUME,
    DEFAULT_TONE_VOLUME, NoiseProfile, PREVIEW_VOLUME, SAMPLE_RATE, ToneMode, ToneParams,
};
use reposo_io::EngineOptions;
use serde::{Deserialize, Serialize};

use crate::ConfigError;
use crate::paths;

/// Tone defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneSection {
    /// Beat frequency in Hz.
    pub beat_hz: f32,
    /// Carrier frequency in Hz.
    pub carrier_hz: f32,
    /// User modulation depth.
    pub depth: f32,
    /// Tone mode.
    pub mode: ToneMode,
    /// Output volume.
    pub volume: f32,
}

impl Default for ToneSection {
    fn default() -> Self {
        Self {
            beat_hz: DEFAULT_BEAT_HZ,
            carrier_hz: DEFAULT_CARRIER_HZ,
            depth: DEFAULT_DEPTH,
            mode: ToneMode::default(),
            volume: DEFAULT_TONE_VOLUME,
        }
    }
}

/// Ambience defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbienceSection {
    /// Free-text asset identifier, resolved by keyword.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
    /// Session ambience volume.
    pub volume: f32,
    /// Volume used when previewing ambience.
    pub preview_volume: f32,
}

impl Default for AmbienceSection {
    fn default() -> Self {
        Self {
            asset: None,
            volume: DEFAULT_NOISE_VOLUME,
            preview_volume: PREVIEW_VOLUME,
        }
    }
}

/// Fade timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FadeSection {
    /// Length of the stop/pause fade in milliseconds.
    pub stop_ms: u64,
    /// Steps in the stop fade.
    pub stop_steps: u32,
    /// Steps in a long fade-out.
    pub fade_out_steps: u32,
}

impl Default for FadeSection {
    fn default() -> Self {
        let options = EngineOptions::default();
        Self {
            stop_ms: options.stop_fade.as_millis() as u64,
            stop_steps: options.stop_fade_steps,
            fade_out_steps: options.fade_out_steps,
        }
    }
}

/// Full engine configuration.
///
/// Missing keys take their defaults. Out-of-range tone values are clamped
/// when applied, never rejected; [`validate`](Self::validate) rejects only
/// values that have no sensible clamp.
///
/// ```rust
/// use reposo_config::EngineConfig;
/// use reposo_core::ToneMode;
///
/// let config = EngineConfig::from_toml(r#"
///     [tone]
///     mode = "binaural"
///     beat_hz = 10.0
/// "#)?;
/// assert_eq!(config.tone.mode, ToneMode::Binaural);
/// assert_eq!(config.sample_rate, 44100);
/// # Ok::<(), reposo_config::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine and render sample rate in Hz.
    pub sample_rate: u32,
    /// Interleaved samples per fill-loop buffer.
    pub buffer_samples: usize,
    /// Output device name filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_device: Option<String>,
    /// Tone defaults.
    pub tone: ToneSection,
    /// Ambience defaults.
    pub ambience: AmbienceSection,
    /// Fade timing.
    pub fade: FadeSection,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            buffer_samples: BUFFER_SAMPLES,
            output_device: None,
            tone: ToneSection::default(),
            ambience: AmbienceSection::default(),
            fade: FadeSection::default(),
        }
    }
}

impl EngineConfig {
    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load `path`, or the platform default path when `None`.
    ///
    /// A missing file yields the defaults; an unreadable or invalid one is an
    /// error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map_or_else(paths::default_config_path, Path::to_path_buf);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate TOML.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write to `path`, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Reject values that cannot be clamped into something usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::invalid("sample_rate", "must be positive"));
        }
        if self.buffer_samples == 0 {
            return Err(ConfigError::invalid("buffer_samples", "must be positive"));
        }
        if self.fade.stop_steps == 0 {
            return Err(ConfigError::invalid("fade.stop_steps", "must be at least 1"));
        }
        Ok(())
    }

    /// Engine construction options.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            sample_rate: self.sample_rate,
            buffer_samples: self.buffer_samples,
            device_name: self.output_device.clone(),
            stop_fade: Duration::from_millis(self.fade.stop_ms),
            stop_fade_steps: self.fade.stop_steps,
            fade_out_steps: self.fade.fade_out_steps.max(1),
            preview_volume: self.ambience.preview_volume,
        }
    }

    /// Tone parameters, clamped.
    pub fn tone_params(&self) -> ToneParams {
        let t = &self.tone;
        ToneParams::new(t.beat_hz, t.carrier_hz, t.depth, t.mode, t.volume)
    }

    /// Ambience profile for the configured asset; pink when unset.
    pub fn noise_profile(&self) -> NoiseProfile {
        self.ambience
            .asset
            .as_deref()
            .map_or(NoiseProfile::Pink, NoiseProfile::from_asset_id)
    }
}

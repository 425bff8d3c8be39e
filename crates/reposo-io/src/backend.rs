//! Pluggable output-device abstraction.
//!
//! The engines never talk to a platform audio API directly. They open an
//! [`OutputDevice`] through an [`AudioBackend`] and push interleaved `f32`
//! buffers into it with a blocking [`write`](OutputDevice::write):
//!
//! ```text
//! ┌──────────────┐  write(&[f32])  ┌──────────────┐  callback  ┌──────────┐
//! │  fill thread │ ──────────────▶ │ OutputDevice │ ─────────▶ │ platform │
//! └──────────────┘   (blocks)      └──────────────┘            └──────────┘
//! ```
//!
//! Devices are shared as `Arc<dyn OutputDevice>` between the fill thread and
//! the control side, so every method takes `&self`. Once
//! [`release`](OutputDevice::release) has run, further calls return
//! [`Error::DeviceReleased`](crate::Error::DeviceReleased) instead of touching
//! the platform handle.

use std::sync::Arc;

use crate::Result;

/// Output device information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Whether this is the host's default output.
    pub is_default: bool,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
    /// Default channel count.
    pub channels: u16,
}

/// Requested output stream shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count: 1 (AM, isochronic, monaural, ambience) or 2 (binaural).
    pub channels: u16,
    /// Interleaved samples per fill-loop buffer. The device buffers at least
    /// this much, or the platform minimum if larger.
    pub buffer_samples: usize,
    /// Output device name filter (substring, case-insensitive). System
    /// default when `None`.
    pub device_name: Option<String>,
}

impl OutputConfig {
    /// Frames per fill-loop buffer.
    pub fn buffer_frames(&self) -> usize {
        self.buffer_samples / usize::from(self.channels.max(1))
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sample_rate: reposo_core::SAMPLE_RATE,
            channels: 1,
            buffer_samples: reposo_core::BUFFER_SAMPLES,
            device_name: None,
        }
    }
}

/// A live output stream.
///
/// Teardown is split into four steps so callers can run each one even when
/// an earlier one fails.
pub trait OutputDevice: Send + Sync {
    /// Channel count the device was opened with.
    fn channels(&self) -> u16;

    /// Sample rate the device was opened with.
    fn sample_rate(&self) -> u32;

    /// Write interleaved samples, blocking until the device has accepted all
    /// of them.
    ///
    /// Returns [`Error::DeviceReleased`](crate::Error::DeviceReleased) if the
    /// device is released before or during the write.
    fn write(&self, samples: &[f32]) -> Result<()>;

    /// Set linear output volume in `[0, 1]`.
    fn set_volume(&self, volume: f32) -> Result<()>;

    /// Pause playback, keeping queued samples.
    fn pause(&self) -> Result<()>;

    /// Drop queued samples.
    fn flush(&self) -> Result<()>;

    /// Stop playback.
    fn stop(&self) -> Result<()>;

    /// Release the platform handle. Idempotent.
    fn release(&self) -> Result<()>;

    /// Whether [`release`](Self::release) has run.
    fn is_released(&self) -> bool;
}

/// Source of output devices.
///
/// Object-safe so engines can hold `Arc<dyn AudioBackend>` and tests can swap
/// in [`MockBackend`](crate::mock::MockBackend).
pub trait AudioBackend: Send + Sync {
    /// Human-readable backend name (e.g. "cpal", "mock").
    fn name(&self) -> &str;

    /// List available output devices.
    fn list_devices(&self) -> Result<Vec<AudioDevice>>;

    /// Open and start an output stream.
    fn open_output(&self, config: &OutputConfig) -> Result<Arc<dyn OutputDevice>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = OutputConfig::default();
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.buffer_samples, 2048);
        assert_eq!(config.channels, 1);
        assert!(config.device_name.is_none());
    }

    #[test]
    fn buffer_frames_per_channel() {
        let config = OutputConfig {
            channels: 2,
            ..OutputConfig::default()
        };
        assert_eq!(config.buffer_frames(), 1024);
    }
}

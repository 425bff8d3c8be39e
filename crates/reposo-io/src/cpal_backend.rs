//! cpal-based output backend.
//!
//! cpal is callback-driven while the engines push buffers with a blocking
//! write. [`CpalOutput`] bridges the two with a bounded crossbeam channel:
//! the fill thread blocks in `send` while the channel is full, and the audio
//! callback drains it with `try_recv`, emitting silence on underrun. Volume is
//! applied in the callback from an atomic, so a fade takes effect on samples
//! that are already queued.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, SendTimeoutError, Sender, bounded};
use parking_lot::Mutex;

use crate::backend::{AudioBackend, AudioDevice, OutputConfig, OutputDevice};
use crate::{Error, Result};

/// How long a blocked write waits before re-checking for release.
const WRITE_POLL: Duration = Duration::from_millis(20);

/// Extract device name via `description()` (cpal 0.17+).
fn device_name(device: &cpal::Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Smallest buffer (in frames) the device accepts for this shape, if known.
fn min_buffer_frames(device: &cpal::Device, config: &OutputConfig) -> Option<u32> {
    let ranges = device.supported_output_configs().ok()?;
    ranges
        .filter(|r| {
            r.channels() == config.channels
                && r.sample_format() == cpal::SampleFormat::F32
                && r.min_sample_rate() <= config.sample_rate
                && r.max_sample_rate() >= config.sample_rate
        })
        .find_map(|r| match r.buffer_size() {
            cpal::SupportedBufferSize::Range { min, .. } => Some(*min),
            cpal::SupportedBufferSize::Unknown => None,
        })
}

/// cpal-based audio backend using the platform's default host.
///
/// On Linux this is ALSA, on macOS CoreAudio, on Windows WASAPI.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalBackend;

impl CpalBackend {
    /// Create a backend.
    pub fn new() -> Self {
        tracing::info!(
            host = cpal::default_host().id().name(),
            "cpal backend initialized"
        );
        Self
    }

    /// Find an output device by name, or return the default.
    fn find_output_device(host: &cpal::Host, name: Option<&str>) -> Result<cpal::Device> {
        match name {
            Some(search) => {
                let search_lower = search.to_lowercase();
                let devices = host
                    .output_devices()
                    .map_err(|e| Error::Stream(e.to_string()))?;

                for device in devices {
                    if let Ok(dev_name) = device_name(&device)
                        && dev_name.to_lowercase().contains(search_lower.as_str())
                    {
                        return Ok(device);
                    }
                }
                Err(Error::DeviceNotFound(format!(
                    "no output device matching '{}'",
                    search
                )))
            }
            None => host.default_output_device().ok_or(Error::NoDevice),
        }
    }
}

impl AudioBackend for CpalBackend {
    fn name(&self) -> &'static str {
        "cpal"
    }

    fn list_devices(&self) -> Result<Vec<AudioDevice>> {
        let host = cpal::default_host();
        let default_name = host
            .default_output_device()
            .and_then(|d| device_name(&d).ok());
        let outputs = host
            .output_devices()
            .map_err(|e| Error::Stream(e.to_string()))?;

        let mut devices = Vec::new();
        for device in outputs {
            let Ok(name) = device_name(&device) else {
                continue;
            };
            let (default_sample_rate, channels) = device
                .default_output_config()
                .map(|c| (c.sample_rate(), c.channels()))
                .unwrap_or((reposo_core::SAMPLE_RATE, 2));
            devices.push(AudioDevice {
                is_default: default_name.as_deref() == Some(name.as_str()),
                name,
                default_sample_rate,
                channels,
            });
        }
        Ok(devices)
    }

    fn open_output(&self, config: &OutputConfig) -> Result<Arc<dyn OutputDevice>> {
        let host = cpal::default_host();
        let device = Self::find_output_device(&host, config.device_name.as_deref())?;

        let channels = usize::from(config.channels.max(1));
        let requested = config.buffer_frames().max(1) as u32;
        let frames = match min_buffer_frames(&device, config) {
            Some(min) => requested.max(min),
            None => requested,
        };

        let stream_config = cpal::StreamConfig {
            channels: config.channels,
            sample_rate: config.sample_rate,
            buffer_size: cpal::BufferSize::Fixed(frames),
        };

        // Two device buffers of headroom between the fill thread and callback.
        let capacity = (frames as usize * channels).max(config.buffer_samples) * 2;
        let (tx, rx) = bounded::<f32>(capacity);
        let drain = rx.clone();
        let volume = Arc::new(AtomicU32::new(1.0f32.to_bits()));
        let callback_volume = Arc::clone(&volume);

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let gain = f32::from_bits(callback_volume.load(Ordering::Relaxed));
                    for sample in data.iter_mut() {
                        *sample = rx.try_recv().map_or(0.0, |s| s * gain);
                    }
                },
                move |err| {
                    tracing::warn!(error = %err, "output stream error");
                },
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            channels = config.channels,
            sample_rate = config.sample_rate,
            buffer_frames = frames,
            "output stream started"
        );

        Ok(Arc::new(CpalOutput {
            stream: Mutex::new(Some(stream)),
            tx,
            drain,
            volume,
            released: AtomicBool::new(false),
            channels: config.channels,
            sample_rate: config.sample_rate,
        }))
    }
}

/// A cpal output stream fed through a bounded channel.
pub struct CpalOutput {
    stream: Mutex<Option<cpal::Stream>>,
    tx: Sender<f32>,
    drain: Receiver<f32>,
    volume: Arc<AtomicU32>,
    released: AtomicBool,
    channels: u16,
    sample_rate: u32,
}

impl std::fmt::Debug for CpalOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpalOutput")
            .field("channels", &self.channels)
            .field("sample_rate", &self.sample_rate)
            .field("released", &self.is_released())
            .finish_non_exhaustive()
    }
}

impl CpalOutput {
    fn with_stream(&self, op: impl FnOnce(&cpal::Stream) -> Result<()>) -> Result<()> {
        match self.stream.lock().as_ref() {
            Some(stream) => op(stream),
            None => Err(Error::DeviceReleased),
        }
    }
}

impl OutputDevice for CpalOutput {
    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn write(&self, samples: &[f32]) -> Result<()> {
        for &sample in samples {
            let mut pending = sample;
            loop {
                if self.released.load(Ordering::Acquire) {
                    return Err(Error::DeviceReleased);
                }
                match self.tx.send_timeout(pending, WRITE_POLL) {
                    Ok(()) => break,
                    Err(SendTimeoutError::Timeout(s)) => pending = s,
                    Err(SendTimeoutError::Disconnected(_)) => {
                        return Err(Error::Stream("output channel closed".to_string()));
                    }
                }
            }
        }
        Ok(())
    }

    fn set_volume(&self, volume: f32) -> Result<()> {
        if self.is_released() {
            return Err(Error::DeviceReleased);
        }
        self.volume
            .store(reposo_core::clamp_volume(volume).to_bits(), Ordering::Relaxed);
        Ok(())
    }

    fn pause(&self) -> Result<()> {
        self.with_stream(|s| s.pause().map_err(|e| Error::Stream(e.to_string())))
    }

    fn flush(&self) -> Result<()> {
        while self.drain.try_recv().is_ok() {}
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        self.with_stream(|s| s.pause().map_err(|e| Error::Stream(e.to_string())))
    }

    fn release(&self) -> Result<()> {
        self.released.store(true, Ordering::Release);
        let stream = self.stream.lock().take();
        if stream.is_some() {
            drop(stream);
            while self.drain.try_recv().is_ok() {}
            tracing::debug!(channels = self.channels, "output stream released");
        }
        Ok(())
    }

    fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

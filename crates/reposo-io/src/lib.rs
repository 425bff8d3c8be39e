//! Audio I/O layer for reposo.
//!
//! This crate provides:
//!
//! - **Output devices**: the [`AudioBackend`] / [`OutputDevice`] seam, with a
//!   cpal implementation ([`CpalBackend`]) and a deterministic
//!   [`MockBackend`](mock::MockBackend) for tests
//! - **Playback driver**: [`PlaybackDriver`] owns the device handle, the
//!   background fill thread and the fade task
//! - **Engines**: [`ToneEngine`] and [`NoiseEngine`], independent so tone and
//!   ambience can play at once, plus a [`Previewer`] for UI auditioning
//! - **Offline rendering**: [`render_tone_wav`] and [`render_noise_wav`] write
//!   16-bit PCM WAV through the same generators live playback uses
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use reposo_io::{CpalBackend, ToneEngine};
//! use reposo_core::ToneMode;
//!
//! let engine = ToneEngine::new(Arc::new(CpalBackend::new()));
//! engine.load_parameters(6.0, 200.0, 0.4, ToneMode::Am, 0.5)?;
//! engine.start()?;
//! // ...
//! engine.stop();
//! ```

pub mod backend;
pub mod cpal_backend;
pub mod driver;
pub mod mock;
mod noise_engine;
mod options;
mod preview;
mod render;
mod tone_engine;

pub use backend::{AudioBackend, AudioDevice, OutputConfig, OutputDevice};
pub use cpal_backend::CpalBackend;
pub use driver::{EngineState, FadeCallback, PlaybackDriver, SampleSource};
pub use noise_engine::NoiseEngine;
pub use options::EngineOptions;
pub use preview::Previewer;
pub use render::{
    RenderSummary, render_noise_to_file, render_noise_wav, render_tone_to_file, render_tone_wav,
};
pub use tone_engine::ToneEngine;

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// A write or control call reached a device that was already released.
    #[error("Output device already released")]
    DeviceReleased,

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

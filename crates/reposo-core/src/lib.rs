//! Reposo Core - entrainment tone and ambience synthesis
//!
//! This crate holds the sample generators behind reposo's sleep and
//! relaxation sessions. Everything here is allocation-free in the audio path
//! and shared by live playback and offline rendering.
//!
//! # Tone synthesis
//!
//! - [`PhaseAccumulator`] / [`advance`] - wrapped-phase sine generation
//! - [`EnvelopeSmoother`] - asymmetric one-pole gain smoothing (15 ms / 30 ms)
//! - [`effective_depth`] - safety-bounded modulation depth
//! - [`ToneGenerator`] - AM, isochronic, binaural and monaural voices
//! - [`ToneParams`] / [`SharedToneParams`] - clamped parameters and their
//!   lock-free snapshot
//!
//! # Ambience
//!
//! - [`NoiseGenerator`] - seeded coloured noise and environmental soundscapes
//! - [`NoiseProfile`] - profile enum with asset-name resolution
//! - [`TransientEvent`] - cooldown-gated random bursts (thunder, crickets, ...)
//!
//! # no_std Support
//!
//! Disable the default `std` feature for embedded targets:
//!
//! ```toml
//! [dependencies]
//! reposo-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use reposo_core::{ToneGenerator, ToneMode, ToneParams, MIN_GAIN_FLOOR};
//!
//! let params = ToneParams::new(6.0, 200.0, 0.4, ToneMode::Am, 0.5);
//! let mut tone = ToneGenerator::new(44100.0, &params);
//!
//! let mut buffer = [0.0f32; 2048];
//! tone.render(&params, &mut buffer);
//!
//! let gain = tone.smoothed_gain().unwrap();
//! assert!(gain >= f64::from(MIN_GAIN_FLOOR));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod depth;
pub mod envelope;
pub mod math;
pub mod noise;
pub mod params;
pub mod phase;
pub mod tone;

pub use depth::{
    EntrainmentBand, MAX_REAL_DEPTH, MIN_GAIN_FLOOR, REAL_DEPTH_LIMIT, carrier_scale,
    effective_depth, max_depth_for_beat,
};
pub use envelope::{ATTACK_MS, EnvelopeSmoother, RELEASE_MS, smoothing_coefficient};
pub use math::{apply_gain, flush_denormal, sample_to_i16};
pub use noise::{
    NoiseGenerator, NoiseProfile, ParseNoiseProfileError, TransientEvent, asset_id_from_path,
};
pub use params::{
    BUFFER_SAMPLES, DEFAULT_BEAT_HZ, DEFAULT_CARRIER_HZ, DEFAULT_DEPTH, DEFAULT_NOISE_VOLUME,
    DEFAULT_TONE_VOLUME, MAX_BEAT_HZ, MAX_CARRIER_HZ, MAX_DEPTH, MIN_BEAT_HZ, MIN_CARRIER_HZ,
    MIN_DEPTH, PREVIEW_VOLUME, ParseToneModeError, SAMPLE_RATE, SharedToneParams, ToneMode,
    ToneParams, clamp_param, clamp_volume,
};
pub use phase::{PhaseAccumulator, advance, phase_increment, wrap_phase};
pub use tone::{MONAURAL_PARTNER_RATIO, ToneGenerator};

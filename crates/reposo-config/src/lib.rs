//! Configuration for reposo engines.
//!
//! An [`EngineConfig`] is read from TOML (by default
//! `~/.config/reposo/config.toml`) and turned into
//! [`EngineOptions`](reposo_io::EngineOptions), [`ToneParams`](reposo_core::ToneParams)
//! and a [`NoiseProfile`](reposo_core::NoiseProfile).
//!
//! # Example
//!
//! ```rust,no_run
//! use reposo_config::EngineConfig;
//!
//! let config = EngineConfig::load_or_default(None)?;
//! let options = config.engine_options();
//! let params = config.tone_params();
//! println!("{} Hz beat over {} Hz", params.beat_hz(), params.carrier_hz());
//! # let _ = options;
//! # Ok::<(), reposo_config::ConfigError>(())
//! ```

mod config;
mod error;

/// Platform-specific configuration paths.
pub mod paths;

pub use config::{AmbienceSection, EngineConfig, FadeSection, ToneSection};
pub use error::ConfigError;
pub use paths::{default_config_path, ensure_user_config_dir, user_config_dir};

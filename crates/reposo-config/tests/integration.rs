//! File round-trips for engine configuration.

use std::fs;

use reposo_config::{ConfigError, EngineConfig};
use reposo_core::{NoiseProfile, ToneMode};
use tempfile::TempDir;

#[test]
fn save_and_load_through_nested_dirs() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a/b/config.toml");

    let mut config = EngineConfig::default();
    config.tone.mode = ToneMode::Monaural;
    config.tone.carrier_hz = 150.0;
    config.ambience.asset = Some("river_stones".to_string());
    config.save(&path).unwrap();

    let loaded = EngineConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.noise_profile(), NoiseProfile::River);
}

#[test]
fn missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    let config = EngineConfig::load_or_default(Some(&path)).unwrap();
    assert_eq!(config, EngineConfig::default());
}

#[test]
fn load_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    let err = EngineConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[test]
fn invalid_file_is_an_error_not_a_default() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "buffer_samples = 0\n").unwrap();
    let err = EngineConfig::load_or_default(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { field: "buffer_samples", .. }));
}

#[test]
fn partial_file_keeps_other_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "[ambience]\nasset = \"heavy_rain\"\nvolume = 0.3\n",
    )
    .unwrap();
    let config = EngineConfig::load(&path).unwrap();
    assert_eq!(config.noise_profile(), NoiseProfile::RainHeavy);
    assert!((config.ambience.volume - 0.3).abs() < 1e-6);
    assert!((config.ambience.preview_volume - 0.25).abs() < 1e-6);
    assert_eq!(config.tone, EngineConfig::default().tone);
    assert_eq!(config.fade.stop_steps, 12);
}

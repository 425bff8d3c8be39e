//! Integration tests for the `reposo` binary.
//!
//! Only commands that need no audio hardware are exercised here.

use std::fs;
use std::process::Command;

use tempfile::TempDir;

/// Helper to get the path to the `reposo` binary built by cargo.
fn reposo_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_reposo"))
}

/// A `--config` path inside `dir` that does not exist yet.
fn config_arg(dir: &TempDir) -> String {
    dir.path().join("config.toml").display().to_string()
}

#[test]
fn help_lists_commands() {
    let output = reposo_bin().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for cmd in ["render", "play", "ambience", "depth", "devices", "config"] {
        assert!(stdout.contains(cmd), "help should mention '{cmd}'");
    }
}

#[test]
fn depth_reports_policy() {
    let output = reposo_bin()
        .args(["depth", "--beat", "6", "--carrier", "150", "--depth", "0.7"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("theta"), "got: {stdout}");
    assert!(stdout.contains("Carrier scale:   0.70"), "got: {stdout}");
    // 0.20 cap * 0.7 scale / 0.70 * 0.25 = 0.05
    assert!(stdout.contains("Effective depth: 0.0500"), "got: {stdout}");
    assert!(stdout.contains("Gain floor:      0.9000"), "got: {stdout}");
}

#[test]
fn depth_table_lists_bands() {
    let output = reposo_bin().args(["depth", "--table"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for band in ["delta", "theta", "alpha", "beta", "gamma"] {
        assert!(stdout.contains(band), "table should list {band}");
    }
}

#[test]
fn render_tone_writes_expected_wav() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("binaural.wav");
    let output = reposo_bin()
        .args(["--config", &config_arg(&dir), "render", "tone"])
        .arg(&out)
        .args(["--duration", "2", "--sample-rate", "8000", "--mode", "binaural"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let reader = hound::WavReader::open(&out).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 8000);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.len(), 8000 * 2 * 2);
}

#[test]
fn render_ambience_is_reproducible() {
    let dir = TempDir::new().unwrap();
    let render = |name: &str| {
        let out = dir.path().join(name);
        let status = reposo_bin()
            .args(["--config", &config_arg(&dir), "render", "ambience"])
            .arg(&out)
            .args(["--asset", "Forest_Night", "--duration", "1", "--seed", "42"])
            .args(["--sample-rate", "8000"])
            .status()
            .unwrap();
        assert!(status.success());
        fs::read(out).unwrap()
    };
    let a = render("a.wav");
    let b = render("b.wav");
    assert_eq!(a, b);
}

#[test]
fn invalid_mode_is_rejected() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("x.wav");
    let output = reposo_bin()
        .args(["render", "tone"])
        .arg(&out)
        .args(["--mode", "theta"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(!out.exists());
}

#[test]
fn config_init_then_show() {
    let dir = TempDir::new().unwrap();
    let config = config_arg(&dir);

    let status = reposo_bin()
        .args(["--config", &config, "config", "init"])
        .status()
        .unwrap();
    assert!(status.success());
    assert!(fs::metadata(&config).is_ok());

    // A second init refuses to clobber the file.
    let status = reposo_bin()
        .args(["--config", &config, "config", "init"])
        .status()
        .unwrap();
    assert!(!status.success());

    let output = reposo_bin()
        .args(["--config", &config, "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("sample_rate = 44100"), "got: {stdout}");
    assert!(stdout.contains("[tone]"), "got: {stdout}");
    assert!(stdout.contains("mode = \"am\""), "got: {stdout}");
}

#[cfg(target_os = "linux")]
#[test]
fn config_init_creates_user_config_dir() {
    let dir = TempDir::new().unwrap();
    let status = reposo_bin()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["config", "init"])
        .status()
        .unwrap();
    assert!(status.success());
    assert!(dir.path().join("reposo").is_dir());
    assert!(dir.path().join("reposo/config.toml").is_file());
}

#[test]
fn invalid_config_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    let config = config_arg(&dir);
    fs::write(&config, "sample_rate = 0\n").unwrap();
    let output = reposo_bin()
        .args(["--config", &config, "config", "show"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("sample_rate"), "got: {stderr}");
}

//! Shared argument groups and helpers.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Args;
use reposo_config::EngineConfig;
use reposo_core::{ToneMode, ToneParams};

/// Tone parameters; anything omitted comes from the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct ToneArgs {
    /// Beat frequency in Hz (1-50)
    #[arg(long)]
    pub beat: Option<f32>,

    /// Carrier frequency in Hz (80-500)
    #[arg(long)]
    pub carrier: Option<f32>,

    /// Modulation depth (0.1-0.7, further limited by the safety policy)
    #[arg(long)]
    pub depth: Option<f32>,

    /// Tone mode: am, isochronic, binaural or monaural
    #[arg(long)]
    pub mode: Option<ToneMode>,

    /// Output volume (0-1)
    #[arg(long)]
    pub volume: Option<f32>,
}

impl ToneArgs {
    /// Config tone settings with these overrides applied, clamped.
    pub fn resolve(&self, config: &EngineConfig) -> ToneParams {
        let t = &config.tone;
        ToneParams::new(
            self.beat.unwrap_or(t.beat_hz),
            self.carrier.unwrap_or(t.carrier_hz),
            self.depth.unwrap_or(t.depth),
            self.mode.unwrap_or(t.mode),
            self.volume.unwrap_or(t.volume),
        )
    }
}

/// Load the config file, or defaults if there is none.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let config = EngineConfig::load_or_default(path).context("failed to load configuration")?;
    tracing::debug!(sample_rate = config.sample_rate, "configuration loaded");
    Ok(config)
}

/// Install a Ctrl+C handler and return the flag it clears.
pub fn interrupt_flag() -> anyhow::Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        eprintln!("\nStopping...");
        r.store(false, Ordering::SeqCst);
    })?;
    Ok(running)
}

/// Block until `running` clears, `limit` elapses, or `alive` returns false.
pub fn wait_while(running: &AtomicBool, limit: Option<Duration>, mut alive: impl FnMut() -> bool) {
    let start = Instant::now();
    while running.load(Ordering::SeqCst) && alive() {
        if limit.is_some_and(|l| start.elapsed() >= l) {
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

/// Parse a duration in seconds, accepting fractions.
pub fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|e| format!("invalid seconds '{s}': {e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid seconds '{s}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_win_over_config() {
        let config = EngineConfig::default();
        let args = ToneArgs {
            beat: Some(10.0),
            mode: Some(ToneMode::Binaural),
            ..ToneArgs::default()
        };
        let params = args.resolve(&config);
        assert_eq!(params.beat_hz(), 10.0);
        assert_eq!(params.mode(), ToneMode::Binaural);
        assert_eq!(params.carrier_hz(), config.tone.carrier_hz);
    }

    #[test]
    fn seconds_parse() {
        assert_eq!(parse_seconds("1.5").unwrap(), Duration::from_millis(1500));
        assert!(parse_seconds("-1").is_err());
        assert!(parse_seconds("soon").is_err());
    }
}

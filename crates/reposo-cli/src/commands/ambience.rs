//! Live ambience playback command.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use reposo_core::NoiseProfile;
use reposo_io::{CpalBackend, NoiseEngine};

use super::common::{interrupt_flag, load_config, parse_seconds, wait_while};

#[derive(Args)]
pub struct AmbienceArgs {
    /// Asset name or path to resolve to a profile (defaults to the configured asset)
    #[arg(value_name = "ASSET", conflicts_with = "profile")]
    asset: Option<String>,

    /// Noise profile by name
    #[arg(long)]
    profile: Option<NoiseProfile>,

    /// Volume (defaults to the configured ambience volume)
    #[arg(long)]
    volume: Option<f32>,

    /// Stop after this many seconds
    #[arg(long, value_parser = parse_seconds)]
    duration: Option<Duration>,
}

pub fn run(args: AmbienceArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let engine = NoiseEngine::with_options(Arc::new(CpalBackend::new()), config.engine_options());

    let profile = match (args.profile, args.asset.as_deref()) {
        (Some(profile), _) => profile,
        (None, Some(asset)) => {
            NoiseProfile::from_asset_id(reposo_core::asset_id_from_path(asset))
        }
        (None, None) => config.noise_profile(),
    };
    engine.set_profile(profile);
    engine.set_volume(args.volume.unwrap_or(config.ambience.volume));
    engine.start()?;

    println!("Playing {profile} ambience. Press Ctrl+C to stop.");
    let running = interrupt_flag()?;
    wait_while(&running, args.duration, || engine.is_playing());

    engine.stop();
    println!("Stopped.");
    Ok(())
}

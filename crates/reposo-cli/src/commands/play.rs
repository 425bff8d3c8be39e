//! Live tone playback command.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use clap::Args;
use reposo_io::{AudioBackend, CpalBackend, EngineState, NoiseEngine, ToneEngine};

use super::common::{ToneArgs, interrupt_flag, load_config, parse_seconds, wait_while};

#[derive(Args)]
pub struct PlayArgs {
    #[command(flatten)]
    tone: ToneArgs,

    /// Ambience asset to play underneath (e.g. "rain_light", "ocean_waves")
    #[arg(long)]
    ambience: Option<String>,

    /// Stop after this many seconds
    #[arg(long, value_parser = parse_seconds)]
    duration: Option<Duration>,

    /// Fade the tone out over this many seconds once the duration ends
    #[arg(long, value_parser = parse_seconds, requires = "duration")]
    fade_out: Option<Duration>,

    /// Output device (substring match)
    #[arg(long)]
    device: Option<String>,
}

pub fn run(args: PlayArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let mut options = config.engine_options();
    if args.device.is_some() {
        options.device_name.clone_from(&args.device);
    }
    let params = args.tone.resolve(&config);

    let backend: Arc<dyn AudioBackend> = Arc::new(CpalBackend::new());
    let tone = ToneEngine::with_options(Arc::clone(&backend), options.clone());
    tone.load(&params)?;
    tone.start()?;

    let noise = match args.ambience.as_deref() {
        Some(asset) => {
            let noise = NoiseEngine::with_options(backend, options);
            let profile = noise.set_profile_from_asset_id(Some(asset));
            noise.set_volume(config.ambience.volume);
            noise.start()?;
            println!("Ambience: {profile}");
            Some(noise)
        }
        None => None,
    };

    println!(
        "Playing {} tone: {} Hz beat over {} Hz (effective depth {:.3})",
        params.mode(),
        params.beat_hz(),
        params.carrier_hz(),
        params.effective_depth()
    );
    println!("Press Ctrl+C to stop.");

    let running = interrupt_flag()?;
    wait_while(&running, args.duration, || tone.is_playing());

    if let Some(fade) = args.fade_out
        && running.load(Ordering::SeqCst)
        && tone.is_playing()
    {
        println!("Fading out over {:.1}s", fade.as_secs_f64());
        tone.fade_out(fade, None);
        wait_while(&running, None, || tone.state() != EngineState::Stopped);
    }

    tone.stop();
    tone.wait_for_fade();
    if let Some(noise) = noise {
        noise.stop();
    }
    println!("Stopped.");
    Ok(())
}

//! Offline WAV rendering command.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use reposo_core::NoiseProfile;

use super::common::{ToneArgs, load_config};

#[derive(Args)]
pub struct RenderArgs {
    #[command(subcommand)]
    command: RenderCommand,
}

#[derive(Subcommand)]
enum RenderCommand {
    /// Render an entrainment tone
    Tone {
        /// Output WAV file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Duration in whole seconds
        #[arg(long, default_value = "60")]
        duration: u32,

        /// Sample rate (defaults to the configured rate)
        #[arg(long)]
        sample_rate: Option<u32>,

        #[command(flatten)]
        tone: ToneArgs,
    },

    /// Render seeded ambience
    Ambience {
        /// Output WAV file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Noise profile (pink, brown, rain_light, rain_heavy, wind, ocean, forest, river)
        #[arg(long, conflicts_with = "asset")]
        profile: Option<NoiseProfile>,

        /// Asset name to resolve to a profile
        #[arg(long)]
        asset: Option<String>,

        /// Duration in whole seconds
        #[arg(long, default_value = "60")]
        duration: u32,

        /// Volume (defaults to the configured ambience volume)
        #[arg(long)]
        volume: Option<f32>,

        /// Random seed; equal seeds give identical files
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Sample rate (defaults to the configured rate)
        #[arg(long)]
        sample_rate: Option<u32>,
    },
}

fn progress_bar(total_frames: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_frames);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    pb
}

pub fn run(args: RenderArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    match args.command {
        RenderCommand::Tone {
            output,
            duration,
            sample_rate,
            tone,
        } => {
            let params = tone.resolve(&config);
            let sample_rate = sample_rate.unwrap_or(config.sample_rate);
            println!(
                "Rendering {} tone: {} Hz beat, {} Hz carrier, depth {:.2} (effective {:.3})",
                params.mode(),
                params.beat_hz(),
                params.carrier_hz(),
                params.depth(),
                params.effective_depth()
            );

            let pb = progress_bar(u64::from(sample_rate) * u64::from(duration));
            let summary =
                reposo_io::render_tone_to_file(&output, &params, sample_rate, duration, |done, _| {
                    pb.set_position(done);
                })?;
            pb.finish_and_clear();

            println!(
                "Wrote {} ({} frames, {} ch, {} Hz)",
                output.display(),
                summary.frames,
                summary.channels,
                summary.sample_rate
            );
        }

        RenderCommand::Ambience {
            output,
            profile,
            asset,
            duration,
            volume,
            seed,
            sample_rate,
        } => {
            let profile = match (profile, asset.as_deref()) {
                (Some(p), _) => p,
                (None, Some(id)) => NoiseProfile::from_asset_id(id),
                (None, None) => config.noise_profile(),
            };
            let volume = volume.unwrap_or(config.ambience.volume);
            let sample_rate = sample_rate.unwrap_or(config.sample_rate);
            println!("Rendering {profile} ambience (seed {seed})");

            let pb = progress_bar(u64::from(sample_rate) * u64::from(duration));
            let summary = reposo_io::render_noise_to_file(
                &output,
                profile,
                volume,
                seed,
                sample_rate,
                duration,
                |done, _| pb.set_position(done),
            )?;
            pb.finish_and_clear();

            println!(
                "Wrote {} ({} frames, {} Hz)",
                output.display(),
                summary.frames,
                summary.sample_rate
            );
        }
    }

    Ok(())
}

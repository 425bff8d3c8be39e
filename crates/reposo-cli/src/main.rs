//! Reposo CLI - render, play and inspect entrainment tones and ambience.

mod commands;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reposo")]
#[command(author, version, about = "Reposo entrainment tone and ambience engine", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a tone or ambience to a WAV file
    Render(commands::render::RenderArgs),

    /// Play a tone, optionally over ambience
    Play(commands::play::PlayArgs),

    /// Play ambience on its own
    Ambience(commands::ambience::AmbienceArgs),

    /// Show the modulation depth the safety policy allows
    Depth(commands::depth::DepthArgs),

    /// List output devices
    Devices(commands::devices::DevicesArgs),

    /// Show or initialize the configuration file
    Config(commands::config::ConfigArgs),
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Render(args) => commands::render::run(args, config),
        Commands::Play(args) => commands::play::run(args, config),
        Commands::Ambience(args) => commands::ambience::run(args, config),
        Commands::Depth(args) => commands::depth::run(&args),
        Commands::Devices(args) => commands::devices::run(&args),
        Commands::Config(args) => commands::config::run(args, config),
    }
}

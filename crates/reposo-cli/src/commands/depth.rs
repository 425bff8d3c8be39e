//! Depth policy inspection command.

use clap::Args;
use reposo_core::{EntrainmentBand, carrier_scale, effective_depth, max_depth_for_beat};

#[derive(Args)]
pub struct DepthArgs {
    /// Beat frequency in Hz
    #[arg(long, default_value = "6.0")]
    beat: f32,

    /// Carrier frequency in Hz
    #[arg(long, default_value = "200.0")]
    carrier: f32,

    /// Requested depth
    #[arg(long, default_value = "0.4")]
    depth: f32,

    /// Print the cap for every band instead
    #[arg(long)]
    table: bool,
}

pub fn run(args: &DepthArgs) -> anyhow::Result<()> {
    if args.table {
        println!("{:<8} {:>8}", "Band", "Max");
        for band in EntrainmentBand::ALL {
            println!("{:<8} {:>8.2}", band.name(), band.max_depth());
        }
        return Ok(());
    }

    let band = EntrainmentBand::from_beat_hz(args.beat);
    let real = effective_depth(args.depth, args.beat, args.carrier);

    println!("Band:            {band}");
    println!("Band cap:        {:.2}", max_depth_for_beat(args.beat));
    println!("Carrier scale:   {:.2}", carrier_scale(args.carrier));
    println!("Effective depth: {real:.4}");
    println!("Gain floor:      {:.4}", 1.0 - 2.0 * real);
    Ok(())
}

//! Triode - tube preamp stage renderer
//!
//! Runs raw mono audio through a cascade of triode stages.
//!
//! # Usage
//!
//! ```bash
//! ffmpeg -i input.wav -f f32le -ac 1 -ar 48000 - | triode --tube ecc83 --tube ecc82 | ffmpeg -f f32le -ac 1 -ar 48000 -i - output.wav
//! ```
//!
//! Log output goes to stderr and is controlled with `RUST_LOG`.

use clap::Parser;
use log::info;
use triode_core::{audio, error::Result, Sample, StageChain, TubeType, DEFAULT_SAMPLE_RATE};

/// Triode preamp stage simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Tube of each stage, in signal order (ecc82/12au7, ecc83/12ax7)
    #[arg(short, long = "tube", value_name = "TUBE", default_value = "ecc83")]
    tubes: Vec<TubeType>,

    /// Sample rate in Hz
    #[arg(short, long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: f64,

    /// Samples per processing block
    #[arg(short, long, default_value_t = audio::BUFFER_SIZE)]
    buffer_size: usize,

    /// Process in double precision
    #[arg(long)]
    f64: bool,
}

fn run<T: Sample>(args: &Args) -> Result<u64> {
    let mut chain = StageChain::<T>::with_tubes(&args.tubes, args.sample_rate)?
        .with_max_buffer_size(args.buffer_size);
    audio::process_audio(&mut chain, args.buffer_size)
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let names: Vec<_> = args.tubes.iter().map(|t| t.name()).collect();
    info!(
        "Triode v{}: {} stage(s) [{}] at {} Hz, {} precision",
        env!("CARGO_PKG_VERSION"),
        args.tubes.len(),
        names.join(" -> "),
        args.sample_rate,
        if args.f64 { "double" } else { "single" }
    );

    // Process audio
    let total = if args.f64 { run::<f64>(&args)? } else { run::<f32>(&args)? };

    info!("Processed {} samples", total);
    Ok(())
}

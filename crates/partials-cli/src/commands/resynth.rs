//! Additive resynthesis command.

use super::common::{AnalysisOpts, analyze_file};
use clap::Args;
use partials_io::{WavSpec, write_wav};
use std::path::PathBuf;

#[derive(Args)]
pub struct ResynthArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    #[command(flatten)]
    opts: AnalysisOpts,

    /// Leave out partials of this many frames or fewer
    #[arg(long, default_value = "0")]
    min_len: usize,

    /// Output bit depth (16, 24, or 32 for float)
    #[arg(long, default_value = "32")]
    bits: u16,
}

pub fn run(args: ResynthArgs) -> anyhow::Result<()> {
    println!("Resynthesizing {}...", args.input.display());

    let (analysis, config) = analyze_file(&args.input, &args.opts)?;
    let partials = analysis.to_partials(config.tracking);
    let kept = partials.summary(args.min_len).len();

    println!(
        "  {} of {} partials kept (longer than {} frames)",
        kept,
        partials.len(),
        args.min_len
    );

    let output = partials.synth_longer_than(config.sample_rate, analysis.hop_size, args.min_len);
    let peak = output.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    if peak > 1.0 {
        tracing::warn!(peak, "resynthesized signal exceeds full scale");
    }

    let spec = WavSpec::mono(config.sample_rate as u32).with_bits(args.bits);
    write_wav(&args.output, &output, spec)?;

    println!(
        "  {} samples ({:.2}s), peak {:.3}",
        output.len(),
        output.len() as f32 / config.sample_rate,
        peak
    );
    println!("Saved to {}", args.output.display());

    Ok(())
}

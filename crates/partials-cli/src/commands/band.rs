//! Band extraction command: the partial series around one frequency.

use super::common::{AnalysisOpts, analyze_file};
use clap::Args;
use partials_analysis::export::export_band_csv;
use partials_analysis::units::amplitude_db;
use std::path::PathBuf;

#[derive(Args)]
pub struct BandArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Centre frequency in Hz
    #[arg(long)]
    freq: f32,

    /// Half-width of the band in semitones
    #[arg(long, default_value = "1.0")]
    semitones: f32,

    #[command(flatten)]
    opts: AnalysisOpts,

    /// Write the series as CSV
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: BandArgs) -> anyhow::Result<()> {
    if !args.freq.is_finite() || args.freq <= 0.0 {
        anyhow::bail!("--freq must be positive, got {}", args.freq);
    }

    let (analysis, config) = analyze_file(&args.input, &args.opts)?;
    let partials = analysis.to_partials(config.tracking);
    let band = partials.part_data_around_freq(args.freq, args.semitones);

    let occupied: Vec<usize> = (0..band.times.len())
        .filter(|&k| band.magnitudes[k] > 0.0)
        .collect();

    println!(
        "Band {:.1} Hz ± {} semitones: {} of {} frames occupied",
        args.freq,
        args.semitones,
        occupied.len(),
        band.times.len()
    );

    if let (Some(&first), Some(&last)) = (occupied.first(), occupied.last()) {
        let mean_freq =
            occupied.iter().map(|&k| band.frequencies[k]).sum::<f32>() / occupied.len() as f32;
        let max_mag = occupied
            .iter()
            .map(|&k| band.magnitudes[k])
            .fold(0.0f32, f32::max);
        println!(
            "  {:.3}s to {:.3}s, mean {:.2} Hz, max level {:.1} dB",
            band.times[first],
            band.times[last],
            mean_freq,
            amplitude_db(max_mag)
        );
    }

    if let Some(path) = &args.output {
        export_band_csv(&band, path)?;
        println!("Saved band CSV to {}", path.display());
    }

    Ok(())
}

//! Partial analysis command.

use super::common::{AnalysisOpts, analyze_file};
use clap::Args;
use partials_analysis::export::{export_peaks_csv, export_summary_csv, export_summary_json};
use partials_analysis::units::amplitude_db;
use std::path::PathBuf;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    #[command(flatten)]
    opts: AnalysisOpts,

    /// Only report partials longer than this many frames
    #[arg(long, default_value = "5")]
    min_len: usize,

    /// Show the N loudest partials
    #[arg(long, default_value = "10")]
    top: usize,

    /// Write the partial summary as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the partial summary as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write every frame's peaks as CSV
    #[arg(long)]
    peaks_csv: Option<PathBuf>,
}

pub fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    println!("Analyzing partials of {}...", args.input.display());

    let (analysis, config) = analyze_file(&args.input, &args.opts)?;
    let partials = analysis.to_partials(config.tracking);
    let summary = partials.summary(args.min_len);

    println!(
        "  {} frames (FFT {}, hop {}, {:?} window)",
        analysis.num_frames(),
        analysis.fft_size,
        analysis.hop_size,
        config.window
    );
    println!(
        "  {} partials, {} longer than {} frames",
        partials.len(),
        summary.len(),
        args.min_len
    );

    if !summary.is_empty() {
        println!("\nLoudest partials:");
        println!(
            "{:>6} {:>7} {:>6} {:>12} {:>10}",
            "Index", "Start", "Len", "Freq (Hz)", "Level (dB)"
        );
        println!("{:->6} {:->7} {:->6} {:->12} {:->10}", "", "", "", "", "");
        for row in summary.iter().rev().take(args.top) {
            println!(
                "{:>6} {:>7} {:>6} {:>12.2} {:>10.1}",
                row.index,
                row.start,
                row.len,
                row.mean_frequency,
                amplitude_db(row.mean_magnitude)
            );
        }
    }

    if let Some(path) = &args.csv {
        export_summary_csv(&summary, path)?;
        println!("\nSaved summary CSV to {}", path.display());
    }
    if let Some(path) = &args.json {
        export_summary_json(&summary, path)?;
        println!("Saved summary JSON to {}", path.display());
    }
    if let Some(path) = &args.peaks_csv {
        export_peaks_csv(&analysis, path)?;
        println!("Saved peaks CSV to {}", path.display());
    }

    Ok(())
}

//! Display WAV file metadata and the analysis frame layout it would get.

use super::common::AnalysisOpts;
use clap::Args;
use partials_analysis::AnalysisConfig;
use partials_io::{WavFormat, read_wav_info};

/// Display WAV file information.
#[derive(Args)]
pub struct InfoArgs {
    /// Path to the WAV file
    pub file: std::path::PathBuf,

    #[command(flatten)]
    opts: AnalysisOpts,
}

/// Run the info command.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let info = read_wav_info(&args.file)?;

    let format_str = match info.format {
        WavFormat::Pcm => "PCM",
        WavFormat::IeeeFloat => "IEEE Float",
    };

    println!("File:        {}", args.file.display());
    println!("Format:      {} {}-bit", format_str, info.bits_per_sample);
    println!("Channels:    {}", info.channels);
    println!("Sample Rate: {} Hz", info.sample_rate);
    println!(
        "Duration:    {:.3}s ({} frames)",
        info.duration_secs, info.num_frames
    );

    let config = args.opts.to_config(info.sample_rate as f32)?;
    println!(
        "Analysis:    {} frames at FFT {} / hop {}",
        analysis_frames(info.num_frames, &config),
        config.fft_size,
        config.hop()
    );

    Ok(())
}

/// Frames a signal of `num_samples` yields: whole windows only.
fn analysis_frames(num_samples: u64, config: &AnalysisConfig) -> u64 {
    let fft_size = config.fft_size as u64;
    let hop = config.hop() as u64;
    if num_samples >= fft_size {
        (num_samples - fft_size) / hop + 1
    } else {
        0
    }
}

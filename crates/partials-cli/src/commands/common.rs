//! Shared CLI helpers used across multiple commands.

use clap::Args;
use partials_analysis::{AnalysisConfig, PhaseVocoder, PvAnalysis, Window};
use partials_io::read_wav;
use std::path::{Path, PathBuf};

/// Analysis options shared by every command that runs the phase vocoder.
///
/// Values given on the command line override those from `--config`.
#[derive(Args, Debug, Clone)]
pub struct AnalysisOpts {
    /// TOML analysis configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// FFT size (power of two)
    #[arg(long)]
    pub fft_size: Option<usize>,

    /// Hop size in samples (default: FFT size / 2)
    #[arg(long)]
    pub hop: Option<usize>,

    /// Maximum peaks per frame
    #[arg(long)]
    pub max_peaks: Option<usize>,

    /// Peak threshold relative to the frame maximum
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Window function (hann, hamming, blackman, blackman-harris, rectangular)
    #[arg(long)]
    pub window: Option<Window>,

    /// Maximum pitch jump between frames, in semitones
    #[arg(long)]
    pub max_jump: Option<f32>,

    /// f0 track file: one "time_s f0_hz" pair per line, enables harmonic analysis
    #[arg(long)]
    pub f0: Option<PathBuf>,
}

impl AnalysisOpts {
    /// Build the configuration for a file at `sample_rate`.
    pub fn to_config(&self, sample_rate: f32) -> anyhow::Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::load(path)?,
            None => AnalysisConfig::default(),
        };
        config.sample_rate = sample_rate;

        if let Some(fft_size) = self.fft_size {
            config.fft_size = fft_size;
        }
        if let Some(hop) = self.hop {
            config.hop_size = Some(hop);
        }
        if let Some(max_peaks) = self.max_peaks {
            config.max_peaks = max_peaks;
        }
        if let Some(threshold) = self.threshold {
            config.peak_threshold = threshold;
        }
        if let Some(window) = self.window {
            config.window = window;
        }
        if let Some(max_jump) = self.max_jump {
            config.tracking.max_pitch_jump = max_jump;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Load a WAV file and run the phase vocoder over it.
pub fn analyze_file(input: &Path, opts: &AnalysisOpts) -> anyhow::Result<(PvAnalysis, AnalysisConfig)> {
    let (samples, spec) = read_wav(input)?;
    let sample_rate = spec.sample_rate as f32;
    tracing::info!(
        input = %input.display(),
        samples = samples.len(),
        sample_rate = spec.sample_rate,
        "loaded"
    );

    let config = opts.to_config(sample_rate)?;
    let mut pv = PhaseVocoder::new(samples, config.clone())?;

    let analysis = match &opts.f0 {
        Some(path) => {
            let (times, f0) = load_f0_track(path)?;
            tracing::info!(points = f0.len(), "harmonic analysis");
            pv.run_harmonic_at(&f0, &times)?
        }
        None => pv.run(),
    };

    tracing::info!(
        frames = analysis.num_frames(),
        fft_size = analysis.fft_size,
        hop = analysis.hop_size,
        "analysis complete"
    );
    Ok((analysis, config))
}

/// Read a whitespace- or comma-separated `time f0` file. Lines starting
/// with `#` and blank lines are skipped.
pub fn load_f0_track(path: &Path) -> anyhow::Result<(Vec<f32>, Vec<f32>)> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read f0 track '{}': {}", path.display(), e))?;
    parse_f0_track(&content)
}

fn parse_f0_track(content: &str) -> anyhow::Result<(Vec<f32>, Vec<f32>)> {
    let mut times = Vec::new();
    let mut f0 = Vec::new();

    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();
        let (Some(t), Some(f)) = (fields.first(), fields.get(1)) else {
            anyhow::bail!("line {}: expected 'time f0', got '{}'", lineno + 1, line);
        };
        times.push(t.parse::<f32>().map_err(|e| anyhow::anyhow!("line {}: {}", lineno + 1, e))?);
        f0.push(f.parse::<f32>().map_err(|e| anyhow::anyhow!("line {}: {}", lineno + 1, e))?);
    }

    if f0.is_empty() {
        anyhow::bail!("f0 track is empty");
    }
    Ok((times, f0))
}

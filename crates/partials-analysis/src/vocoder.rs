//! Whole-signal phase-vocoder analysis.
//!
//! [`PhaseVocoder`] steps a [`FrameAnalyzer`] through the signal one hop at a
//! time and collects the peaks of every frame into fixed-width rows. A zero
//! magnitude marks an empty slot.

use crate::config::{AnalysisConfig, TrackingConfig};
use crate::error::Result;
use crate::frame::{BinDetector, FrameAnalyzer, SpectralPeaks};
use crate::harmonic::HarmonicComb;
use crate::set::PartialSet;

/// Peaks of every analysis frame, `[frame][slot]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PvAnalysis {
    /// Sample rate (Hz)
    pub sample_rate: f32,
    /// FFT size used
    pub fft_size: usize,
    /// Hop size between frames
    pub hop_size: usize,
    /// Slots per frame
    pub max_peaks: usize,
    /// Centre time of each frame (s)
    pub times: Vec<f32>,
    /// Peak frequencies (Hz)
    pub frequencies: Vec<Vec<f32>>,
    /// Peak magnitudes, 0 for an empty slot
    pub magnitudes: Vec<Vec<f32>>,
    /// Peak phases (radians)
    pub phases: Vec<Vec<f32>>,
}

impl PvAnalysis {
    /// Number of analysis frames.
    pub fn num_frames(&self) -> usize {
        self.times.len()
    }

    /// Frame centre times (s).
    pub fn time_vector(&self) -> &[f32] {
        &self.times
    }

    /// Frame centre times as sample indices.
    pub fn sample_vector(&self) -> Vec<usize> {
        self.times
            .iter()
            .map(|&t| (t * self.sample_rate).round() as usize)
            .collect()
    }

    /// Number of occupied slots in `frame`.
    pub fn peak_count(&self, frame: usize) -> usize {
        self.magnitudes
            .get(frame)
            .map_or(0, |row| row.iter().filter(|&&m| m > 0.0).count())
    }

    /// Link the peaks of all frames into partials.
    pub fn to_partials(&self, tracking: TrackingConfig) -> PartialSet {
        let mut set =
            PartialSet::with_tracking(self.sample_rate, self.fft_size, self.hop_size, tracking);
        for frame in 0..self.num_frames() {
            set.add_frame(
                frame,
                &self.frequencies[frame],
                &self.magnitudes[frame],
                &self.phases[frame],
            );
        }
        tracing::debug!(
            frames = self.num_frames(),
            partials = set.len(),
            "partial tracking complete"
        );
        set
    }
}

/// Phase-vocoder analysis of a complete signal.
pub struct PhaseVocoder {
    analyzer: FrameAnalyzer,
}

impl PhaseVocoder {
    /// Create a phase vocoder over `signal`, validating the configuration.
    pub fn new(signal: impl Into<Vec<f32>>, config: AnalysisConfig) -> Result<Self> {
        Ok(Self {
            analyzer: FrameAnalyzer::new(signal, config)?,
        })
    }

    /// The underlying frame analyzer.
    pub fn analyzer(&self) -> &FrameAnalyzer {
        &self.analyzer
    }

    /// The analysis configuration.
    pub fn config(&self) -> &AnalysisConfig {
        self.analyzer.config()
    }

    /// Analyze with free peak search.
    pub fn run(&mut self) -> PvAnalysis {
        let detector = SpectralPeaks::from_config(self.analyzer.config());
        self.run_with(&detector)
    }

    /// Analyze at multiples of an f0 track sampled once per frame.
    pub fn run_harmonic(&mut self, f0: Vec<f32>) -> PvAnalysis {
        let comb = HarmonicComb::new(f0, self.analyzer.config());
        self.run_with(&comb)
    }

    /// Analyze at multiples of an f0 track sampled at `times` (s).
    pub fn run_harmonic_at(&mut self, f0: &[f32], times: &[f32]) -> Result<PvAnalysis> {
        let frame_times = self.analyzer.frame_times();
        let comb = HarmonicComb::resampled(f0, times, &frame_times, self.analyzer.config())?;
        Ok(self.run_with(&comb))
    }

    /// Analyze with a custom bin detector.
    ///
    /// Starts from a clean analyzer state, so repeated runs give identical results.
    pub fn run_with(&mut self, detector: &dyn BinDetector) -> PvAnalysis {
        self.analyzer.reset();

        let config = self.analyzer.config().clone();
        let hop_size = self.analyzer.hop_size();
        let max_peaks = config.max_peaks;
        let num_frames = self.analyzer.num_frames();
        let half_window = config.fft_size as f32 / 2.0;

        let mut times = Vec::with_capacity(num_frames);
        let mut frequencies = Vec::with_capacity(num_frames);
        let mut magnitudes = Vec::with_capacity(num_frames);
        let mut phases = Vec::with_capacity(num_frames);
        let mut total_peaks = 0usize;

        for index in 0..num_frames {
            let position = index * hop_size;
            let peaks = self.analyzer.calc_frame_with(position, index, detector);

            let mut f = vec![0.0; max_peaks];
            let mut mag = vec![0.0; max_peaks];
            let mut ph = vec![0.0; max_peaks];
            for (slot, peak) in peaks.iter().take(max_peaks).enumerate() {
                f[slot] = peak.frequency;
                mag[slot] = peak.magnitude;
                ph[slot] = peak.phase;
            }
            total_peaks += peaks.iter().take(max_peaks).filter(|p| p.magnitude > 0.0).count();

            times.push((position as f32 + half_window) / config.sample_rate);
            frequencies.push(f);
            magnitudes.push(mag);
            phases.push(ph);
        }

        tracing::debug!(
            frames = num_frames,
            peaks = total_peaks,
            fft_size = config.fft_size,
            hop_size,
            "phase vocoder run complete"
        );

        PvAnalysis {
            sample_rate: config.sample_rate,
            fft_size: config.fft_size,
            hop_size,
            max_peaks,
            times,
            frequencies,
            magnitudes,
            phases,
        }
    }
}

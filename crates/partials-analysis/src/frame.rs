//! Phase-vocoder frame analysis.
//!
//! Each analysis frame is a windowed FFT of `fft_size` samples. The frequency
//! of a spectral peak is not read off its bin centre: it is estimated from the
//! phase advance of that bin between two consecutive frames `hop` samples
//! apart, which resolves frequencies far below the bin spacing.
//!
//! The phase difference is only known modulo 2π. [`FrequencyEstimator`]
//! resolves the ambiguity by assuming the true frequency lies closest to the
//! bin's own centre frequency.
//!
//! Which bins to measure is decided by a [`BinDetector`]:
//!
//! - [`SpectralPeaks`]: free search for local maxima of the magnitude spectrum
//! - [`HarmonicComb`](crate::harmonic::HarmonicComb): multiples of a known f0

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::fft::Fft;
use crate::peaks::PeakFinder;
use rustfft::num_complex::Complex;
use std::f32::consts::TAU;

/// One sinusoidal peak detected in an analysis frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    /// FFT bin the peak was measured at.
    pub bin: usize,
    /// Instantaneous frequency in Hz.
    pub frequency: f32,
    /// Local magnitude estimate (RMS of the bins around `bin`).
    pub magnitude: f32,
    /// Phase at the frame start, in radians.
    pub phase: f32,
}

/// Converts frame-to-frame phase differences into frequencies.
#[derive(Debug, Clone)]
pub struct FrequencyEstimator {
    /// Centre frequency of each bin (Hz).
    bin_freqs: Vec<f32>,
    /// Whole 2π turns a bin-centred sinusoid makes in one hop.
    bin_wraps: Vec<f32>,
    /// Time between frames (s).
    frame_dt: f32,
}

impl FrequencyEstimator {
    /// Create an estimator for the first `fft_size / 2` bins.
    pub fn new(sample_rate: f32, fft_size: usize, hop_size: usize) -> Self {
        let fstep = sample_rate / fft_size as f32;
        let frame_dt = hop_size as f32 / sample_rate;

        let bin_freqs: Vec<f32> = (0..fft_size / 2).map(|b| b as f32 * fstep).collect();
        let bin_wraps = bin_freqs
            .iter()
            .map(|&f| (f * frame_dt).round() * TAU)
            .collect();

        Self {
            bin_freqs,
            bin_wraps,
            frame_dt,
        }
    }

    /// Number of bins covered.
    pub fn num_bins(&self) -> usize {
        self.bin_freqs.len()
    }

    /// Centre frequency of `bin` in Hz.
    pub fn bin_frequency(&self, bin: usize) -> f32 {
        self.bin_freqs[bin]
    }

    /// Time between consecutive frames in seconds.
    pub fn frame_dt(&self) -> f32 {
        self.frame_dt
    }

    /// Instantaneous frequency for a wrapped phase difference `dphase` at `bin`.
    ///
    /// Tries the unwrappings `dphase + wrap[bin] + {-2π, 0, 2π}` and returns the
    /// one whose frequency is nearest the bin centre. A NaN phase difference
    /// yields NaN.
    pub fn dphase2freq(&self, dphase: f32, bin: usize) -> f32 {
        let base = dphase + self.bin_wraps[bin];
        let centre = self.bin_freqs[bin];

        let mut best = f32::NAN;
        let mut best_dist = f32::INFINITY;
        for turns in [-1.0f32, 0.0, 1.0] {
            let freq = (base + turns * TAU) / self.frame_dt / TAU;
            let dist = (freq - centre).abs();
            if dist < best_dist {
                best = freq;
                best_dist = dist;
            }
        }
        best
    }
}

/// Per-frame data handed to a [`BinDetector`].
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    /// Frame number (0 for the first frame of a run).
    pub index: usize,
    /// Magnitude of each of the `fft_size / 2` bins.
    pub magnitudes: &'a [f32],
    /// Wrapped phase advance of each bin since the previous frame.
    /// NaN where no previous frame exists or the previous bin was zero.
    pub phase_diffs: &'a [f32],
}

/// Strategy choosing which bins of a frame to measure.
pub trait BinDetector {
    /// Candidate bins for this frame.
    fn detect(&self, frame: &FrameView<'_>, estimator: &FrequencyEstimator) -> Vec<usize>;

    /// Whether every candidate keeps its position in the frame's peak list.
    ///
    /// Positional detectors keep peaks with a non-positive frequency, and an
    /// unresolved candidate becomes a zero placeholder instead of being
    /// removed. Otherwise both are dropped and later peaks move up.
    fn keeps_slots(&self) -> bool {
        false
    }
}

/// Free peak search: local maxima above a relative threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralPeaks {
    /// Maximum number of peaks per frame.
    pub max_peaks: usize,
    /// Threshold relative to the frame maximum.
    pub threshold: f32,
    /// Salience filter radius in bins.
    pub salience_radius: usize,
}

impl SpectralPeaks {
    /// Peak search parameters taken from an analysis configuration.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            max_peaks: config.max_peaks,
            threshold: config.peak_threshold,
            salience_radius: config.salience_radius,
        }
    }
}

impl BinDetector for SpectralPeaks {
    fn detect(&self, frame: &FrameView<'_>, _estimator: &FrequencyEstimator) -> Vec<usize> {
        let mut finder = PeakFinder::find(frame.magnitudes, self.max_peaks, self.threshold);
        finder.filter_by_salience(self.salience_radius);
        finder.positions()
    }
}

/// Root of the summed squares of `magnitudes[bin - half_width ..= bin + half_width]`,
/// never including the DC bin.
pub fn local_magnitude(magnitudes: &[f32], bin: usize, half_width: usize) -> f32 {
    if magnitudes.len() < 2 {
        return 0.0;
    }
    let lo = bin.saturating_sub(half_width).max(1);
    let hi = (bin + half_width).min(magnitudes.len() - 1);
    if lo > hi {
        return 0.0;
    }
    magnitudes[lo..=hi].iter().map(|m| m * m).sum::<f32>().sqrt()
}

/// Windowed-FFT frame analyzer holding the previous frame's spectrum.
pub struct FrameAnalyzer {
    signal: Vec<f32>,
    config: AnalysisConfig,
    hop_size: usize,
    fft: Fft,
    window_coeffs: Vec<f32>,
    /// Spectrum normalization: sqrt(Σw² · N) / 2
    wfact: f32,
    estimator: FrequencyEstimator,
    previous: Option<Vec<Complex<f32>>>,
}

impl FrameAnalyzer {
    /// Create an analyzer over `signal`, validating the configuration.
    pub fn new(signal: impl Into<Vec<f32>>, config: AnalysisConfig) -> Result<Self> {
        config.validate()?;

        let fft_size = config.fft_size;
        let hop_size = config.hop();
        let window_coeffs = config.window.coefficients(fft_size);
        let wfact = (config.window.energy(fft_size) * fft_size as f32).sqrt() / 2.0;
        let estimator = FrequencyEstimator::new(config.sample_rate, fft_size, hop_size);

        Ok(Self {
            signal: signal.into(),
            hop_size,
            fft: Fft::new(fft_size),
            window_coeffs,
            wfact,
            estimator,
            previous: None,
            config,
        })
    }

    /// The validated configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Hop size in samples.
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// The phase-difference frequency estimator.
    pub fn estimator(&self) -> &FrequencyEstimator {
        &self.estimator
    }

    /// Number of full frames: positions `k · hop` with `k · hop + fft_size <= len`.
    pub fn num_frames(&self) -> usize {
        let fft_size = self.config.fft_size;
        if self.signal.len() >= fft_size {
            (self.signal.len() - fft_size) / self.hop_size + 1
        } else {
            0
        }
    }

    /// Centre time (s) of each full frame.
    pub fn frame_times(&self) -> Vec<f32> {
        let half = self.config.fft_size as f32 / 2.0;
        (0..self.num_frames())
            .map(|k| ((k * self.hop_size) as f32 + half) / self.config.sample_rate)
            .collect()
    }

    /// Forget the previous frame; the next frame resolves no frequencies.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Normalized complex spectrum of the frame starting at `position`.
    ///
    /// Returns all `fft_size` bins; samples past the end of the signal are zero.
    pub fn calc_fft_frame(&self, position: usize) -> Vec<Complex<f32>> {
        let fft_size = self.config.fft_size;
        let start = position.min(self.signal.len());
        let end = (position + fft_size).min(self.signal.len());

        let mut frame: Vec<f32> = self.signal[start..end].to_vec();
        frame.resize(fft_size, 0.0);

        for (sample, &coeff) in frame.iter_mut().zip(self.window_coeffs.iter()) {
            *sample *= coeff;
        }

        let scale = 1.0 / self.wfact;
        let mut spectrum = self.fft.forward(&frame);
        for bin in &mut spectrum {
            *bin *= scale;
        }
        spectrum
    }

    /// Frequency for a phase difference at `bin`.
    pub fn dphase2freq(&self, dphase: f32, bin: usize) -> f32 {
        self.estimator.dphase2freq(dphase, bin)
    }

    /// Free-search peaks of the frame at `position`.
    pub fn calc_pv_frame(&mut self, position: usize) -> Vec<Peak> {
        let detector = SpectralPeaks::from_config(&self.config);
        self.calc_frame_with(position, position / self.hop_size, &detector)
    }

    /// Peaks of the frame at `position` using the given bin detector.
    ///
    /// The frame's spectrum replaces the stored previous spectrum, so frames
    /// must be analyzed in time order.
    pub fn calc_frame_with(
        &mut self,
        position: usize,
        index: usize,
        detector: &dyn BinDetector,
    ) -> Vec<Peak> {
        let num_bins = self.config.fft_size / 2;
        let mut spectrum = self.calc_fft_frame(position);
        spectrum.truncate(num_bins);

        let magnitudes: Vec<f32> = spectrum.iter().map(|c| c.norm()).collect();
        let phase_diffs: Vec<f32> = match &self.previous {
            Some(previous) => spectrum
                .iter()
                .zip(previous.iter())
                .map(|(current, old)| {
                    // arg(current / old), undefined where old is zero
                    if old.norm_sqr() > 0.0 {
                        (*current * old.conj()).arg()
                    } else {
                        f32::NAN
                    }
                })
                .collect(),
            None => vec![f32::NAN; num_bins],
        };

        let view = FrameView {
            index,
            magnitudes: &magnitudes,
            phase_diffs: &phase_diffs,
        };
        let bins = detector.detect(&view, &self.estimator);

        let mut peaks = Vec::with_capacity(bins.len());
        for bin in bins {
            if bin >= num_bins {
                continue;
            }
            let frequency = self.estimator.dphase2freq(phase_diffs[bin], bin);
            let keeps_slots = detector.keeps_slots();
            if !frequency.is_finite() || (!keeps_slots && frequency <= 0.0) {
                tracing::trace!(frame = index, bin, frequency, "dropping unresolved peak");
                if keeps_slots {
                    peaks.push(Peak {
                        bin,
                        frequency: 0.0,
                        magnitude: 0.0,
                        phase: 0.0,
                    });
                }
                continue;
            }
            peaks.push(Peak {
                bin,
                frequency,
                magnitude: local_magnitude(&magnitudes, bin, self.config.magnitude_half_width),
                phase: spectrum[bin].arg(),
            });
        }

        self.previous = Some(spectrum);
        peaks
    }
}

//! Harmonic-locked bin detection.
//!
//! Instead of searching the spectrum for peaks, [`HarmonicComb`] measures the
//! bins nearest to integer multiples of a supplied fundamental frequency. Once
//! the first harmonic has been measured, higher harmonics are re-centred on
//! multiples of that measured frequency, which follows slight drift and
//! inharmonicity better than the nominal f0 track alone.

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::frame::{BinDetector, FrameView, FrequencyEstimator};

/// Bin detector placing candidates at multiples of a per-frame f0.
#[derive(Debug, Clone)]
pub struct HarmonicComb {
    /// Fundamental frequency for each frame (Hz). Non-positive means unvoiced.
    f0: Vec<f32>,
    sample_rate: f32,
    fft_size: usize,
    max_peaks: usize,
    fmin: f32,
}

impl HarmonicComb {
    /// Comb following an f0 track already sampled once per analysis frame.
    pub fn new(f0: Vec<f32>, config: &AnalysisConfig) -> Self {
        Self {
            f0,
            sample_rate: config.sample_rate,
            fft_size: config.fft_size,
            max_peaks: config.max_peaks,
            fmin: config.harmonic_fmin,
        }
    }

    /// Comb following an f0 track sampled at arbitrary `times` (s), linearly
    /// interpolated onto `frame_times`. Values outside the track are held at
    /// the nearest end.
    pub fn resampled(
        f0: &[f32],
        times: &[f32],
        frame_times: &[f32],
        config: &AnalysisConfig,
    ) -> Result<Self> {
        if f0.len() != times.len() {
            return Err(AnalysisError::F0Length {
                f0: f0.len(),
                times: times.len(),
            });
        }
        if f0.is_empty() {
            return Err(AnalysisError::EmptySeries);
        }

        let per_frame = frame_times.iter().map(|&t| interp(t, times, f0)).collect();
        Ok(Self::new(per_frame, config))
    }

    /// The per-frame f0 track.
    pub fn f0(&self) -> &[f32] {
        &self.f0
    }
}

impl BinDetector for HarmonicComb {
    fn detect(&self, frame: &FrameView<'_>, estimator: &FrequencyEstimator) -> Vec<usize> {
        let Some(&f0) = self.f0.get(frame.index) else {
            return Vec::new();
        };
        if !(f0.is_finite() && f0 > 0.0) {
            return Vec::new();
        }

        let bins_per_hz = self.fft_size as f32 / self.sample_rate;
        let limit = frame.magnitudes.len().min(estimator.num_bins()) as f32 - 1.0;
        let f0_bin = f0 * bins_per_hz;

        let mut bins = Vec::new();
        let mut fundamental = f32::NAN;
        let mut harmonic = 1usize;
        while bins.len() < self.max_peaks {
            let nominal = f0_bin * harmonic as f32;
            if nominal >= limit {
                break;
            }
            let mut bin = nominal.round() as usize;

            if harmonic == 1 {
                fundamental = estimator.dphase2freq(frame.phase_diffs[bin], bin);
            } else if fundamental > self.fmin {
                let corrected = fundamental * bins_per_hz * harmonic as f32;
                if corrected < limit {
                    bin = corrected.round() as usize;
                }
            }

            bins.push(bin);
            harmonic += 1;
        }
        bins
    }

    fn keeps_slots(&self) -> bool {
        true
    }
}

/// Piecewise-linear interpolation of `(xp, fp)` at `x`, clamped at both ends.
/// `xp` must be ascending and non-empty.
fn interp(x: f32, xp: &[f32], fp: &[f32]) -> f32 {
    let i = xp.partition_point(|&v| v <= x);
    if i == 0 {
        return fp[0];
    }
    if i >= xp.len() {
        return fp[xp.len() - 1];
    }
    let (x0, x1) = (xp[i - 1], xp[i]);
    let (y0, y1) = (fp[i - 1], fp[i]);
    if x1 > x0 {
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    } else {
        y1
    }
}

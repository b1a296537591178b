//! Spectral peak picking.
//!
//! [`PeakFinder`] works in three steps, mirroring how the frame analyzer uses it:
//!
//! 1. [`PeakFinder::find`] collects local maxima of a magnitude spectrum that
//!    exceed a fraction of the global maximum.
//! 2. [`PeakFinder::filter_by_salience`] removes any peak that has a stronger
//!    peak within a given radius (weak ripples on the skirt of a strong peak).
//! 3. [`PeakFinder::positions`] returns the strongest survivors, at most
//!    `max_peaks`, in ascending bin order.

/// Local-maximum peak finder for magnitude spectra.
#[derive(Debug, Clone)]
pub struct PeakFinder {
    /// Candidate bins, strongest first (ties by ascending bin).
    candidates: Vec<(usize, f32)>,
    max_peaks: usize,
}

impl PeakFinder {
    /// Find local maxima of `data` above `min_rel_to_max` times its maximum.
    ///
    /// A bin is a local maximum when it is strictly greater than its left
    /// neighbour and not smaller than its right neighbour, so a flat-topped
    /// peak is reported once at its leftmost bin. The first and last bins are
    /// never reported.
    pub fn find(data: &[f32], max_peaks: usize, min_rel_to_max: f32) -> Self {
        let mut candidates = Vec::new();

        if data.len() >= 3 {
            let max_value = data
                .iter()
                .copied()
                .filter(|v| v.is_finite())
                .fold(0.0f32, f32::max);

            if max_value > 0.0 {
                let threshold = max_value * min_rel_to_max;
                for i in 1..data.len() - 1 {
                    let value = data[i];
                    if value > data[i - 1] && value >= data[i + 1] && value >= threshold {
                        candidates.push((i, value));
                    }
                }
            }
        }

        // Stable: equal magnitudes keep ascending bin order
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

        Self {
            candidates,
            max_peaks,
        }
    }

    /// Drop every peak that lies within `radius` bins of a stronger kept peak.
    pub fn filter_by_salience(&mut self, radius: usize) -> &mut Self {
        let mut kept: Vec<(usize, f32)> = Vec::with_capacity(self.candidates.len());
        for &(bin, value) in &self.candidates {
            let shadowed = kept.iter().any(|&(k, _)| k.abs_diff(bin) <= radius);
            if !shadowed {
                kept.push((bin, value));
            }
        }
        self.candidates = kept;
        self
    }

    /// Number of candidate peaks currently held (before the `max_peaks` cap).
    pub fn num_candidates(&self) -> usize {
        self.candidates.len()
    }

    /// Bins of the strongest `max_peaks` peaks, ascending.
    pub fn positions(&self) -> Vec<usize> {
        let mut bins: Vec<usize> = self
            .candidates
            .iter()
            .take(self.max_peaks)
            .map(|&(bin, _)| bin)
            .collect();
        bins.sort_unstable();
        bins
    }
}

//! A single partial: a contiguous per-frame series of frequency, magnitude and phase.

use crate::error::{AnalysisError, Result};
use std::f64::consts::TAU;

/// A quasi-sinusoidal partial sampled once per analysis frame.
///
/// The series has no gaps: point `i` belongs to frame `start + i`, and the
/// track always holds at least one point.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialTrack {
    start: usize,
    freq: Vec<f32>,
    mag: Vec<f32>,
    phase: Vec<f32>,
}

impl PartialTrack {
    /// Start a track with a single point at frame `start`.
    pub fn new(start: usize, freq: f32, mag: f32, phase: f32) -> Self {
        Self {
            start,
            freq: vec![freq],
            mag: vec![mag],
            phase: vec![phase],
        }
    }

    /// Build a track from complete series beginning at frame `start`.
    pub fn from_series(start: usize, freq: Vec<f32>, mag: Vec<f32>, phase: Vec<f32>) -> Result<Self> {
        if freq.len() != mag.len() || freq.len() != phase.len() {
            return Err(AnalysisError::SeriesLength {
                freq: freq.len(),
                mag: mag.len(),
                phase: phase.len(),
            });
        }
        if freq.is_empty() {
            return Err(AnalysisError::EmptySeries);
        }
        Ok(Self {
            start,
            freq,
            mag,
            phase,
        })
    }

    /// Add a point after the last frame.
    pub fn append_point(&mut self, freq: f32, mag: f32, phase: f32) {
        self.freq.push(freq);
        self.mag.push(mag);
        self.phase.push(phase);
    }

    /// Add a point before the first frame, moving the start one frame earlier.
    pub fn prepend_point(&mut self, freq: f32, mag: f32, phase: f32) -> Result<()> {
        if self.start == 0 {
            return Err(AnalysisError::PrependBeforeStart);
        }
        self.freq.insert(0, freq);
        self.mag.insert(0, mag);
        self.phase.insert(0, phase);
        self.start -= 1;
        Ok(())
    }

    /// First frame of the track.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Last frame of the track (inclusive).
    pub fn end(&self) -> usize {
        self.start + self.freq.len() - 1
    }

    /// Number of frames covered.
    pub fn len(&self) -> usize {
        self.freq.len()
    }

    /// Always false; a track holds at least one point.
    pub fn is_empty(&self) -> bool {
        self.freq.is_empty()
    }

    /// Whether `frame` lies within `[start, end]`.
    pub fn contains_frame(&self, frame: usize) -> bool {
        frame >= self.start && frame <= self.end()
    }

    fn value_at(&self, series: &[f32], frame: usize) -> f32 {
        if self.contains_frame(frame) {
            series[frame - self.start]
        } else {
            f32::NAN
        }
    }

    /// Frequency at `frame`, NaN outside the track.
    pub fn freq_at_frame(&self, frame: usize) -> f32 {
        self.value_at(&self.freq, frame)
    }

    /// Magnitude at `frame`, NaN outside the track.
    pub fn mag_at_frame(&self, frame: usize) -> f32 {
        self.value_at(&self.mag, frame)
    }

    /// Phase at `frame`, NaN outside the track.
    pub fn phase_at_frame(&self, frame: usize) -> f32 {
        self.value_at(&self.phase, frame)
    }

    /// Frequency series (Hz).
    pub fn frequencies(&self) -> &[f32] {
        &self.freq
    }

    /// Magnitude series.
    pub fn magnitudes(&self) -> &[f32] {
        &self.mag
    }

    /// Phase series (radians).
    pub fn phases(&self) -> &[f32] {
        &self.phase
    }

    /// Mean frequency over the track.
    pub fn mean_frequency(&self) -> f32 {
        self.freq.iter().sum::<f32>() / self.freq.len() as f32
    }

    /// Mean magnitude over the track.
    pub fn mean_magnitude(&self) -> f32 {
        self.mag.iter().sum::<f32>() / self.mag.len() as f32
    }

    /// Index (within the track) of the loudest point; first one on ties.
    pub fn reference_index(&self) -> usize {
        let mut best = 0;
        for (i, &m) in self.mag.iter().enumerate() {
            if m > self.mag[best] {
                best = i;
            }
        }
        best
    }

    /// Resynthesize the partial at `sample_rate`, frame `k` sitting at sample `k · hop`.
    ///
    /// Frequency and magnitude are interpolated linearly between frames, with
    /// one extra hop of fade-in before the start and fade-out after the end.
    /// The phase is the running integral of the frequency, shifted so that it
    /// matches the measured phase at the loudest frame.
    ///
    /// Returns the waveform and the sample offset of its first sample,
    /// `(start - 1) · hop`, which is negative for tracks starting at frame 0.
    pub fn synth(&self, sample_rate: f32, hop_size: usize) -> (Vec<f32>, isize) {
        let offset = (self.start as isize - 1) * hop_size as isize;
        if hop_size == 0 {
            return (Vec::new(), offset);
        }

        let n = self.len();
        let knot = |j: usize| -> (f32, f32) {
            if j == 0 {
                (self.freq[0], 0.0)
            } else if j > n {
                (self.freq[n - 1], 0.0)
            } else {
                (self.freq[j - 1], self.mag[j - 1])
            }
        };

        let num_samples = (n + 1) * hop_size + 1;
        let mut freq_env = Vec::with_capacity(num_samples);
        let mut mag_env = Vec::with_capacity(num_samples);
        for j in 0..=n {
            let (f_a, m_a) = knot(j);
            let (f_b, m_b) = knot(j + 1);
            for s in 0..hop_size {
                let frac = s as f32 / hop_size as f32;
                freq_env.push(f_a + (f_b - f_a) * frac);
                mag_env.push(m_a + (m_b - m_a) * frac);
            }
        }
        let (f_last, m_last) = knot(n + 1);
        freq_env.push(f_last);
        mag_env.push(m_last);

        // Integrate in f64: the running phase grows to thousands of radians
        let step = TAU / f64::from(sample_rate);
        let mut acc = 0.0f64;
        let phase: Vec<f64> = freq_env
            .iter()
            .map(|&f| {
                acc += step * f64::from(f);
                acc
            })
            .collect();

        let iref = self.reference_index();
        let sref = (iref + 1) * hop_size;
        let shift = f64::from(self.phase[iref]) - phase[sref];

        let wave = mag_env
            .iter()
            .zip(phase.iter())
            .map(|(&m, &ph)| m * (ph + shift).cos() as f32)
            .collect();

        (wave, offset)
    }
}

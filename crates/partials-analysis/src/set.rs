//! Peak-to-partial assignment and whole-sound resynthesis.
//!
//! [`PartialSet`] turns the per-frame peaks of a phase-vocoder run into
//! continuous partials. Peaks of each frame are visited loudest first; each
//! one continues the most similar partial that ended on the previous frame and
//! has not been claimed yet, or starts a new partial when even the closest one
//! is further than the allowed pitch jump.
//!
//! The matching is greedy and single-pass. A strong peak slightly off pitch
//! can take a partial that a weaker, better-fitting peak would have matched.
//! It is deterministic: the same peaks always produce the same partials.

use crate::config::TrackingConfig;
use crate::track::PartialTrack;
use crate::units::{dmag2db, dmag2db_exact, dpitch2st, dpitch2st_exact};
use serde::Serialize;

/// Aggregate description of one partial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PartialSummary {
    /// Index of the partial in its set.
    pub index: usize,
    /// Number of frames.
    pub len: usize,
    /// First frame.
    pub start: usize,
    /// Mean frequency (Hz).
    pub mean_frequency: f32,
    /// Mean magnitude.
    pub mean_magnitude: f32,
}

/// Frame-indexed series reconstructed from the partials of a frequency band.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BandSeries {
    /// Frame time `k · hop / sample_rate` (s).
    pub times: Vec<f32>,
    /// Frequency per frame (Hz), 0 where no partial is present.
    pub frequencies: Vec<f32>,
    /// Magnitude per frame, 0 where no partial is present.
    pub magnitudes: Vec<f32>,
    /// Phase per frame (radians), 0 where no partial is present.
    pub phases: Vec<f32>,
}

/// A sound decomposed into partials whose frequency and amplitude vary slowly.
#[derive(Debug, Clone)]
pub struct PartialSet {
    sample_rate: f32,
    fft_size: usize,
    hop_size: usize,
    tracking: TrackingConfig,
    tracks: Vec<PartialTrack>,
}

impl PartialSet {
    /// Empty set with default tracking parameters.
    pub fn new(sample_rate: f32, fft_size: usize, hop_size: usize) -> Self {
        Self::with_tracking(sample_rate, fft_size, hop_size, TrackingConfig::default())
    }

    /// Empty set with the given tracking parameters.
    pub fn with_tracking(
        sample_rate: f32,
        fft_size: usize,
        hop_size: usize,
        tracking: TrackingConfig,
    ) -> Self {
        Self {
            sample_rate,
            fft_size,
            hop_size,
            tracking,
            tracks: Vec::new(),
        }
    }

    /// Sample rate of the analyzed signal.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// FFT size of the analysis.
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Hop size of the analysis.
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Tracking parameters.
    pub fn tracking(&self) -> &TrackingConfig {
        &self.tracking
    }

    /// All partials, in creation order.
    pub fn tracks(&self) -> &[PartialTrack] {
        &self.tracks
    }

    /// Partial at `index`.
    pub fn track(&self, index: usize) -> Option<&PartialTrack> {
        self.tracks.get(index)
    }

    /// Number of partials.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the set has no partials.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Open a new partial at `frame` and return its index.
    fn start_partial(&mut self, frame: usize, freq: f32, mag: f32, phase: f32) -> usize {
        self.tracks.push(PartialTrack::new(frame, freq, mag, phase));
        self.tracks.len() - 1
    }

    /// Indices of the partials ending at `frame - 1`, loudest (at that frame) first.
    fn open_partials(&self, frame: usize) -> Vec<usize> {
        let Some(previous) = frame.checked_sub(1) else {
            return Vec::new();
        };
        let mut open = self.partials_ending_at_frame(previous);
        open.sort_by(|&a, &b| {
            let mag_a = self.tracks[a].mag_at_frame(previous);
            let mag_b = self.tracks[b].mag_at_frame(previous);
            mag_b.total_cmp(&mag_a)
        });
        open
    }

    /// Assign the peaks of `frame` to partials.
    ///
    /// Entries with a non-positive frequency or magnitude are ignored (zero
    /// slots of a phase-vocoder row). The slices must have equal length.
    pub fn add_frame(&mut self, frame: usize, freqs: &[f32], mags: &[f32], phases: &[f32]) {
        let n = freqs.len().min(mags.len()).min(phases.len());

        let mut order: Vec<usize> = (0..n).filter(|&i| freqs[i] > 0.0 && mags[i] > 0.0).collect();
        // Stable: equal magnitudes keep slot order
        order.sort_by(|&a, &b| mags[b].total_cmp(&mags[a]));

        let open = self.open_partials(frame);
        let previous = frame.saturating_sub(1);
        let candidates: Vec<(usize, f32, f32)> = open
            .iter()
            .map(|&idx| {
                let track = &self.tracks[idx];
                (idx, track.freq_at_frame(previous), track.mag_at_frame(previous))
            })
            .collect();
        let mut claimed = vec![false; candidates.len()];

        let TrackingConfig {
            max_pitch_jump,
            pitch_weight,
            magnitude_weight,
        } = self.tracking;

        let mut continued = 0usize;
        for i in order {
            let (fc, mc, pc) = (freqs[i], mags[i], phases[i]);

            let mut nearest: Option<(usize, f32)> = None;
            let mut nearest_dist = f32::INFINITY;
            for (slot, &(_, f_old, m_old)) in candidates.iter().enumerate() {
                if claimed[slot] {
                    continue;
                }
                let pitch = dpitch2st(f_old, fc).abs();
                let level = dmag2db(m_old, mc).abs();
                let dist = pitch_weight * pitch + magnitude_weight * level;
                if nearest.is_none() || dist < nearest_dist {
                    nearest = Some((slot, pitch));
                    nearest_dist = dist;
                }
            }

            match nearest {
                Some((slot, pitch)) if pitch < max_pitch_jump => {
                    claimed[slot] = true;
                    self.tracks[candidates[slot].0].append_point(fc, mc, pc);
                    continued += 1;
                }
                _ => {
                    self.start_partial(frame, fc, mc, pc);
                }
            }
        }

        tracing::trace!(
            frame,
            open = candidates.len(),
            continued,
            total = self.tracks.len(),
            "frame assigned"
        );
    }

    /// Assign a single peak at `frame`, returning the index of its partial.
    ///
    /// Uses the exact dB distance. Partials already extended to `frame` are
    /// no longer open, so repeated calls for one frame never share a partial.
    pub fn add_point(&mut self, frame: usize, freq: f32, mag: f32, phase: f32) -> usize {
        let previous = frame.saturating_sub(1);
        let mut nearest: Option<(usize, f32)> = None;
        let mut nearest_dist = f32::INFINITY;

        for idx in self.open_partials(frame) {
            let track = &self.tracks[idx];
            let pitch = dpitch2st(track.freq_at_frame(previous), freq).abs();
            let level = dmag2db_exact(track.mag_at_frame(previous), mag).abs();
            let dist = self.tracking.pitch_weight * pitch + self.tracking.magnitude_weight * level;
            if nearest.is_none() || dist < nearest_dist {
                nearest = Some((idx, pitch));
                nearest_dist = dist;
            }
        }

        match nearest {
            Some((idx, pitch)) if pitch < self.tracking.max_pitch_jump => {
                self.tracks[idx].append_point(freq, mag, phase);
                idx
            }
            _ => self.start_partial(frame, freq, mag, phase),
        }
    }

    /// Indices of the partials whose last frame is `frame`.
    pub fn partials_ending_at_frame(&self, frame: usize) -> Vec<usize> {
        self.tracks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.end() == frame)
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of the partials covering `frame`.
    pub fn partials_at_frame(&self, frame: usize) -> Vec<usize> {
        self.tracks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.contains_frame(frame))
            .map(|(i, _)| i)
            .collect()
    }

    /// Last frame covered by any partial, `None` for an empty set.
    pub fn nframes(&self) -> Option<usize> {
        self.tracks.iter().map(PartialTrack::end).max()
    }

    /// Mean frequency of every partial.
    pub fn mean_frequencies(&self) -> Vec<f32> {
        self.tracks.iter().map(PartialTrack::mean_frequency).collect()
    }

    /// Mean magnitude of every partial.
    pub fn mean_magnitudes(&self) -> Vec<f32> {
        self.tracks.iter().map(PartialTrack::mean_magnitude).collect()
    }

    /// Partials longer than `min_len` frames, quietest first.
    pub fn summary(&self, min_len: usize) -> Vec<PartialSummary> {
        let mut rows: Vec<PartialSummary> = self
            .tracks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.len() > min_len)
            .map(|(index, t)| PartialSummary {
                index,
                len: t.len(),
                start: t.start(),
                mean_frequency: t.mean_frequency(),
                mean_magnitude: t.mean_magnitude(),
            })
            .collect();
        rows.sort_by(|a, b| a.mean_magnitude.total_cmp(&b.mean_magnitude));
        rows
    }

    /// Overlay of all partials whose mean frequency is within `semitones` of `fc`.
    ///
    /// Partials are written quietest first, so where two overlap in time the
    /// louder one wins.
    ///
    /// A centre frequency that is not a positive number selects nothing.
    pub fn part_data_around_freq(&self, fc: f32, semitones: f32) -> BandSeries {
        if !fc.is_finite() || fc <= 0.0 {
            return BandSeries::default();
        }
        let Some(last) = self.nframes() else {
            return BandSeries::default();
        };
        let nframes = last + 1;

        let mut series = BandSeries {
            times: (0..nframes)
                .map(|k| (k * self.hop_size) as f32 / self.sample_rate)
                .collect(),
            frequencies: vec![0.0; nframes],
            magnitudes: vec![0.0; nframes],
            phases: vec![0.0; nframes],
        };

        for row in self.summary(0) {
            if dpitch2st_exact(fc, row.mean_frequency).abs() >= semitones {
                continue;
            }
            let track = &self.tracks[row.index];
            let range = track.start()..=track.end();
            series.frequencies[range.clone()].copy_from_slice(track.frequencies());
            series.magnitudes[range.clone()].copy_from_slice(track.magnitudes());
            series.phases[range].copy_from_slice(track.phases());
        }

        series
    }

    /// Resynthesize the whole set by overlap-adding every partial.
    ///
    /// The output holds `(last_frame + 1) · hop` samples; partials whose
    /// waveform would start before sample 0 (those beginning at frame 0) are
    /// skipped, and samples past the end are dropped.
    pub fn synth(&self, sample_rate: f32, hop_size: usize) -> Vec<f32> {
        self.synth_longer_than(sample_rate, hop_size, 0)
    }

    /// Resynthesize only the partials longer than `min_len` frames.
    ///
    /// The set itself is left untouched and the output length is the same as
    /// for [`PartialSet::synth`].
    pub fn synth_longer_than(&self, sample_rate: f32, hop_size: usize, min_len: usize) -> Vec<f32> {
        let Some(last) = self.nframes() else {
            return Vec::new();
        };
        let mut out = vec![0.0f32; (last + 1) * hop_size];

        let mut skipped = 0usize;
        for track in self.tracks.iter().filter(|t| t.len() > min_len) {
            let (wave, offset) = track.synth(sample_rate, hop_size);
            if offset < 0 {
                skipped += 1;
                continue;
            }
            let start = offset as usize;
            if start >= out.len() {
                continue;
            }
            for (dst, &src) in out[start..].iter_mut().zip(wave.iter()) {
                *dst += src;
            }
        }

        tracing::debug!(
            partials = self.tracks.len(),
            skipped,
            samples = out.len(),
            "resynthesis complete"
        );
        out
    }
}

//! Property-based tests for partial tracking and frequency estimation.
//!
//! Tests pitch-distance monotonicity, phase-difference frequency recovery,
//! track contiguity, and tracking determinism using proptest for randomized
//! peak lists.

use proptest::prelude::*;
use partials_analysis::{FrequencyEstimator, PartialSet, dpitch2st};
use std::f32::consts::{PI, TAU};

type FramePeaks = Vec<(f32, f32)>;

/// Random peak lists, one per frame: (frequency, magnitude) pairs.
fn frames_strategy() -> impl Strategy<Value = Vec<FramePeaks>> {
    prop::collection::vec(
        prop::collection::vec((50.0f32..5000.0f32, 0.0f32..1.0f32), 0..6),
        1..24,
    )
}

fn track_frames(frames: &[FramePeaks]) -> PartialSet {
    let mut set = PartialSet::new(44100.0, 1024, 256);
    for (frame, peaks) in frames.iter().enumerate() {
        let freqs: Vec<f32> = peaks.iter().map(|p| p.0).collect();
        let mags: Vec<f32> = peaks.iter().map(|p| p.1).collect();
        let phases = vec![0.0; peaks.len()];
        set.add_frame(frame, &freqs, &mags, &phases);
    }
    set
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Identical frequencies are zero semitones apart.
    #[test]
    fn pitch_distance_zero_for_equal(f in 1.0f32..20000.0f32) {
        prop_assert_eq!(dpitch2st(f, f), 0.0);
    }

    /// The approximate semitone distance grows with the frequency ratio.
    #[test]
    fn pitch_distance_monotonic(
        f in 20.0f32..10000.0f32,
        r in 0.5f32..2.0f32,
        dr in 0.01f32..1.0f32,
    ) {
        prop_assert!(dpitch2st(f, f * r) < dpitch2st(f, f * (r + dr)));
    }

    /// A sinusoid's wrapped phase advance over one hop maps back to its frequency.
    #[test]
    fn phase_advance_recovers_frequency(f in 50.0f32..10000.0f32) {
        let sr = 44100.0;
        let est = FrequencyEstimator::new(sr, 1024, 256);
        let bin = (f * 1024.0 / sr).round() as usize;
        let advance = TAU * f * est.frame_dt();
        let wrapped = (advance + PI).rem_euclid(TAU) - PI;
        let recovered = est.dphase2freq(wrapped, bin);
        prop_assert!((recovered - f).abs() < 0.05, "f={} recovered={}", f, recovered);
    }

    /// Every track is contiguous, and every valid peak lands in exactly one track.
    #[test]
    fn tracks_contiguous_and_complete(frames in frames_strategy()) {
        let set = track_frames(&frames);

        for track in set.tracks() {
            prop_assert_eq!(track.end() - track.start() + 1, track.len());
            prop_assert_eq!(track.frequencies().len(), track.len());
        }
        for (frame, peaks) in frames.iter().enumerate() {
            let valid = peaks.iter().filter(|p| p.0 > 0.0 && p.1 > 0.0).count();
            prop_assert_eq!(set.partials_at_frame(frame).len(), valid);
        }
    }

    /// Feeding the same frames twice gives the same tracks.
    #[test]
    fn tracking_deterministic(frames in frames_strategy()) {
        let a = track_frames(&frames);
        let b = track_frames(&frames);
        prop_assert_eq!(a.tracks(), b.tracks());
    }

    /// Mixdown length is one hop per frame up to the last covered frame.
    #[test]
    fn synth_length_follows_last_frame(frames in frames_strategy()) {
        let set = track_frames(&frames);
        let out = set.synth(44100.0, 256);
        match set.nframes() {
            Some(last) => prop_assert_eq!(out.len(), (last + 1) * 256),
            None => prop_assert!(out.is_empty()),
        }
        prop_assert!(out.iter().all(|x| x.is_finite()));
    }
}

//! Integration tests for partials-analysis crate.
//!
//! Tests exercise the public API end to end: phase-vocoder analysis, partial
//! tracking and additive resynthesis, using synthetic signals with known
//! properties.

use std::f32::consts::PI;

use partials_analysis::{
    AnalysisConfig, Fft, PartialSet, PhaseVocoder, TrackingConfig, Window, dpitch2st,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate a sine wave at a given frequency and amplitude.
fn sine(freq_hz: f32, sample_rate: f32, num_samples: usize, amplitude: f32) -> Vec<f32> {
    (0..num_samples)
        .map(|i| amplitude * (2.0 * PI * freq_hz * i as f32 / sample_rate).sin())
        .collect()
}

/// RMS of a signal slice.
fn rms(signal: &[f32]) -> f32 {
    (signal.iter().map(|x| x * x).sum::<f32>() / signal.len() as f32).sqrt()
}

/// Frequency of the strongest bin of a Hann-windowed spectrum.
fn dominant_frequency(signal: &[f32], sample_rate: f32) -> f32 {
    let n = signal.len();
    let mut windowed = signal.to_vec();
    Window::Hann.apply(&mut windowed);
    let spectrum = Fft::new(n).forward(&windowed);
    let bin = spectrum[..n / 2]
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.norm().total_cmp(&b.norm()))
        .map(|(i, _)| i)
        .unwrap();
    bin as f32 * sample_rate / n as f32
}

/// Slot holding the loudest peak of a frame row.
fn loudest_slot(magnitudes: &[f32]) -> usize {
    magnitudes
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
        .unwrap()
}

/// Analyze a signal with default settings and track its partials.
fn analyze(signal: Vec<f32>, config: AnalysisConfig) -> (usize, PartialSet) {
    let mut pv = PhaseVocoder::new(signal, config).unwrap();
    let analysis = pv.run();
    let hop = analysis.hop_size;
    (hop, analysis.to_partials(TrackingConfig::default()))
}

// ===========================================================================
// 1. Phase-vocoder frequency estimation
// ===========================================================================

#[test]
fn steady_tones_resolved_below_bin_spacing() {
    let sample_rate = 44100.0;
    // Bin spacing is ~43 Hz; every tone sits between bin centres
    for freq in [261.6, 440.0, 1234.5, 5000.0] {
        let signal = sine(freq, sample_rate, 16384, 0.5);
        let mut pv = PhaseVocoder::new(signal, AnalysisConfig::new(sample_rate)).unwrap();
        let analysis = pv.run();

        for frame in 1..analysis.num_frames() {
            let slot = loudest_slot(&analysis.magnitudes[frame]);
            let estimate = analysis.frequencies[frame][slot];
            assert!(
                (estimate - freq).abs() < 0.5,
                "frame {frame}: estimated {estimate} Hz for {freq} Hz"
            );
        }
    }
}

#[test]
fn magnitude_matches_amplitude() {
    let sample_rate = 44100.0;
    let signal = sine(1000.0, sample_rate, 16384, 0.3);
    let mut pv = PhaseVocoder::new(signal, AnalysisConfig::new(sample_rate)).unwrap();
    let analysis = pv.run();

    let mag = analysis.magnitudes[4][loudest_slot(&analysis.magnitudes[4])];
    assert!((mag - 0.3).abs() < 0.02, "magnitude {mag}");
}

#[test]
fn slots_never_exceed_max_peaks() {
    let sample_rate = 22050.0;
    // Eight partials, four slots
    let signal: Vec<f32> = (0..16384)
        .map(|i| {
            let t = i as f32 / sample_rate;
            (1..=8)
                .map(|k| (2.0 * PI * 200.0 * k as f32 * t).sin() / k as f32)
                .sum()
        })
        .collect();
    let config = AnalysisConfig::new(sample_rate)
        .with_fft_size(2048)
        .with_max_peaks(4);
    let mut pv = PhaseVocoder::new(signal, config).unwrap();
    let analysis = pv.run();

    for frame in 0..analysis.num_frames() {
        assert_eq!(analysis.magnitudes[frame].len(), 4);
        assert!(analysis.peak_count(frame) <= 4);
    }
    assert_eq!(analysis.peak_count(3), 4);
}

#[test]
fn silence_produces_no_peaks() {
    let mut pv = PhaseVocoder::new(vec![0.0; 8192], AnalysisConfig::new(44100.0)).unwrap();
    let analysis = pv.run();
    assert!(analysis.num_frames() > 0);
    for frame in 0..analysis.num_frames() {
        assert_eq!(analysis.peak_count(frame), 0);
    }
    assert!(analysis.to_partials(TrackingConfig::default()).is_empty());
}

#[test]
fn signal_shorter_than_window_has_no_frames() {
    let mut pv = PhaseVocoder::new(vec![0.1; 1000], AnalysisConfig::new(44100.0)).unwrap();
    let analysis = pv.run();
    assert_eq!(analysis.num_frames(), 0);
    assert!(analysis.to_partials(TrackingConfig::default()).synth(44100.0, 512).is_empty());
}

#[test]
fn invalid_configuration_rejected_at_construction() {
    let signal = vec![0.0; 4096];
    assert!(PhaseVocoder::new(signal.clone(), AnalysisConfig::new(0.0)).is_err());
    assert!(PhaseVocoder::new(signal.clone(), AnalysisConfig::new(44100.0).with_fft_size(0)).is_err());
    assert!(PhaseVocoder::new(signal, AnalysisConfig::new(44100.0).with_hop_size(0)).is_err());
}

// ===========================================================================
// 2. Partial tracking
// ===========================================================================

#[test]
fn tracking_threshold_boundary() {
    assert!(dpitch2st(440.0, 441.0).abs() < 0.5);
    assert!(dpitch2st(440.0, 466.0).abs() > 0.5);

    let mut continued = PartialSet::new(44100.0, 1024, 512);
    continued.add_frame(0, &[440.0], &[1.0], &[0.0]);
    continued.add_frame(1, &[441.0], &[1.0], &[0.0]);
    assert_eq!(continued.len(), 1);

    let mut split = PartialSet::new(44100.0, 1024, 512);
    split.add_frame(0, &[440.0], &[1.0], &[0.0]);
    split.add_frame(1, &[466.0], &[1.0], &[0.0]);
    assert_eq!(split.len(), 2);
}

#[test]
fn two_tones_give_two_long_partials() {
    let sample_rate = 44100.0;
    let signal: Vec<f32> = sine(440.0, sample_rate, 22050, 0.5)
        .iter()
        .zip(sine(1320.0, sample_rate, 22050, 0.25))
        .map(|(a, b)| a + b)
        .collect();
    let (_, partials) = analyze(signal, AnalysisConfig::new(sample_rate));

    let summary = partials.summary(20);
    assert!(summary.len() >= 2);
    let loudest = &summary[summary.len() - 1];
    let second = &summary[summary.len() - 2];
    assert!((loudest.mean_frequency - 440.0).abs() < 1.0);
    assert!((second.mean_frequency - 1320.0).abs() < 1.0);
}

#[test]
fn tracks_stay_contiguous() {
    let sample_rate = 22050.0;
    let mut phase = 0.0f32;
    // Vibrato around 600 Hz
    let signal: Vec<f32> = (0..22050)
        .map(|i| {
            let t = i as f32 / sample_rate;
            let f = 600.0 + 20.0 * (2.0 * PI * 5.0 * t).sin();
            phase += 2.0 * PI * f / sample_rate;
            phase.sin()
        })
        .collect();
    let (_, partials) = analyze(signal, AnalysisConfig::new(sample_rate));

    for track in partials.tracks() {
        assert_eq!(track.end() - track.start() + 1, track.len());
        assert_eq!(track.frequencies().len(), track.magnitudes().len());
        assert_eq!(track.frequencies().len(), track.phases().len());
    }
}

#[test]
fn tracking_is_deterministic() {
    let sample_rate = 22050.0;
    let signal: Vec<f32> = (0..16384)
        .map(|i| {
            let t = i as f32 / sample_rate;
            (2.0 * PI * 300.0 * t).sin() + 0.5 * (2.0 * PI * 310.0 * t).sin()
        })
        .collect();
    let mut pv = PhaseVocoder::new(signal, AnalysisConfig::new(sample_rate)).unwrap();
    let analysis = pv.run();

    let a = analysis.to_partials(TrackingConfig::default());
    let b = analysis.to_partials(TrackingConfig::default());
    assert_eq!(a.tracks(), b.tracks());
}

#[test]
fn band_series_follows_partial() {
    let sample_rate = 44100.0;
    let signal = sine(880.0, sample_rate, 16384, 0.5);
    let (_, partials) = analyze(signal, AnalysisConfig::new(sample_rate));

    let band = partials.part_data_around_freq(880.0, 1.0);
    let frames = partials.nframes().unwrap() + 1;
    assert_eq!(band.times.len(), frames);
    assert_eq!(band.frequencies[0], 0.0);
    for k in 1..frames {
        assert!((band.frequencies[k] - 880.0).abs() < 1.0, "frame {k}");
    }
}

// ===========================================================================
// 3. Resynthesis
// ===========================================================================

#[test]
fn constant_partial_resynthesis() {
    let sample_rate = 8000.0;
    let hop = 100;
    let mut set = PartialSet::new(sample_rate, 1024, hop);
    for frame in 1..=30 {
        set.add_frame(frame, &[500.0], &[0.5], &[0.0]);
    }
    assert_eq!(set.len(), 1);

    let out = set.synth(sample_rate, hop);
    assert_eq!(out.len(), 31 * hop);

    let interior = &out[3 * hop..3 * hop + 1024];
    let peak = interior.iter().fold(0.0f32, |a, &b| a.max(b.abs()));
    assert!((peak - 0.5).abs() < 0.01, "peak {peak}");
    assert!((dominant_frequency(interior, sample_rate) - 500.0).abs() < 8.0);
}

#[test]
fn round_trip_preserves_level_and_pitch() {
    let sample_rate = 44100.0;
    let signal = sine(440.0, sample_rate, 44100, 0.5);
    let (hop, partials) = analyze(signal.clone(), AnalysisConfig::new(sample_rate));

    let out = partials.synth(sample_rate, hop);
    assert_eq!(out.len(), (partials.nframes().unwrap() + 1) * hop);

    let lo = 8 * hop;
    let hi = out.len() - 8 * hop;
    let in_rms = rms(&signal[lo..hi]);
    let out_rms = rms(&out[lo..hi]);
    assert!(
        (out_rms - in_rms).abs() / in_rms < 0.1,
        "input RMS {in_rms}, output RMS {out_rms}"
    );
    let dominant = dominant_frequency(&out[lo..lo + 8192], sample_rate);
    assert!((dominant - 440.0).abs() < 6.0, "dominant {dominant}");
}

#[test]
fn empty_set_synthesizes_nothing() {
    let set = PartialSet::new(44100.0, 1024, 512);
    assert!(set.synth(44100.0, 512).is_empty());
}

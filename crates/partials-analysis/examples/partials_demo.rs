//! Partials demo: analyze a two-tone glide, track partials, resynthesize.
//!
//! Run with: cargo run -p partials-analysis --example partials_demo

use partials_analysis::{AnalysisConfig, PhaseVocoder, TrackingConfig};
use std::f32::consts::PI;

fn main() -> partials_analysis::Result<()> {
    let sample_rate = 44100.0;
    let num_samples = sample_rate as usize;

    // --- A 440 Hz tone plus a slow glide from 1000 to 1100 Hz ---
    println!("=== Phase Vocoder Analysis ===\n");

    let mut glide_phase = 0.0f32;
    let signal: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate;
            let glide = 1000.0 + 100.0 * t;
            glide_phase += 2.0 * PI * glide / sample_rate;
            0.6 * (2.0 * PI * 440.0 * t).sin() + 0.3 * glide_phase.sin()
        })
        .collect();

    let config = AnalysisConfig::new(sample_rate).with_fft_size(2048);
    let mut pv = PhaseVocoder::new(signal.clone(), config)?;
    let analysis = pv.run();

    println!(
        "Frames: {}, FFT size: {}, hop: {}",
        analysis.num_frames(),
        analysis.fft_size,
        analysis.hop_size
    );

    let mid = analysis.num_frames() / 2;
    println!("\nPeaks at frame {mid} (t = {:.3} s):", analysis.times[mid]);
    println!("{:>6} {:>12} {:>10}", "Slot", "Freq (Hz)", "Magnitude");
    println!("{:->6} {:->12} {:->10}", "", "", "");
    for slot in 0..analysis.peak_count(mid).min(5) {
        println!(
            "{:>6} {:>12.2} {:>10.4}",
            slot, analysis.frequencies[mid][slot], analysis.magnitudes[mid][slot]
        );
    }

    // --- Partial tracking ---
    println!("\n=== Partial Tracking ===\n");

    let partials = analysis.to_partials(TrackingConfig::default());
    let summary = partials.summary(10);
    println!("{} partials, {} longer than 10 frames", partials.len(), summary.len());
    println!("{:>6} {:>6} {:>6} {:>12} {:>10}", "Index", "Start", "Len", "Mean Hz", "Mean Mag");
    for s in summary.iter().rev().take(5) {
        println!(
            "{:>6} {:>6} {:>6} {:>12.2} {:>10.4}",
            s.index, s.start, s.len, s.mean_frequency, s.mean_magnitude
        );
    }

    // --- Resynthesis ---
    println!("\n=== Resynthesis ===\n");

    let output = partials.synth(sample_rate, analysis.hop_size);
    let rms = |x: &[f32]| (x.iter().map(|v| v * v).sum::<f32>() / x.len().max(1) as f32).sqrt();
    println!("Input:  {} samples, RMS {:.4}", signal.len(), rms(&signal));
    println!("Output: {} samples, RMS {:.4}", output.len(), rms(&output));

    Ok(())
}

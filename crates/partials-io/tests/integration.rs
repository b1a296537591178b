//! Integration tests for partials-io WAV I/O.

use partials_io::{Error, WavFormat, WavSpec, read_wav, read_wav_info, write_wav};
use tempfile::NamedTempFile;

/// Generate a sine wave at the given sample rate.
fn sine_wave(sample_rate: u32, freq_hz: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| (2.0 * std::f32::consts::PI * freq_hz * i as f32 / sample_rate as f32).sin())
        .collect()
}

// ---------------------------------------------------------------------------
// Roundtrips
// ---------------------------------------------------------------------------

#[test]
fn wav_roundtrip_f32_44100() {
    let sr = 44100;
    let samples = sine_wave(sr, 440.0, sr as usize);

    let file = NamedTempFile::new().unwrap();
    write_wav(file.path(), &samples, WavSpec::mono(sr)).unwrap();

    let (loaded, loaded_spec) = read_wav(file.path()).unwrap();
    assert_eq!(loaded_spec.sample_rate, sr);
    assert_eq!(loaded.len(), samples.len());
    for (a, b) in samples.iter().zip(loaded.iter()) {
        assert!((a - b).abs() < 1e-6, "f32 roundtrip mismatch: {a} vs {b}");
    }
}

#[test]
fn wav_roundtrip_i24_48000() {
    let sr = 48000;
    let samples: Vec<f32> = sine_wave(sr, 1000.0, 4800).iter().map(|s| s * 0.5).collect();

    let file = NamedTempFile::new().unwrap();
    write_wav(file.path(), &samples, WavSpec::mono(sr).with_bits(24)).unwrap();

    let (loaded, loaded_spec) = read_wav(file.path()).unwrap();
    assert_eq!(loaded_spec.bits_per_sample, 24);
    for (a, b) in samples.iter().zip(loaded.iter()) {
        assert!((a - b).abs() < 1e-5, "24-bit roundtrip mismatch: {a} vs {b}");
    }
}

// ---------------------------------------------------------------------------
// Metadata and failures
// ---------------------------------------------------------------------------

#[test]
fn wav_info_reports_duration() {
    let sr = 22050;
    let file = NamedTempFile::new().unwrap();
    write_wav(file.path(), &vec![0.0; 11025], WavSpec::mono(sr).with_bits(16)).unwrap();

    let info = read_wav_info(file.path()).unwrap();
    assert_eq!(info.channels, 1);
    assert_eq!(info.sample_rate, sr);
    assert_eq!(info.num_frames, 11025);
    assert!((info.duration_secs - 0.5).abs() < 1e-9);
    assert_eq!(info.format, WavFormat::Pcm);
}

#[test]
fn missing_file_is_an_error() {
    let result = read_wav("/nonexistent/path/input.wav");
    assert!(matches!(result, Err(Error::Wav(_))));
}

#[test]
fn non_wav_file_is_an_error() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), b"not a wav file").unwrap();
    assert!(read_wav(file.path()).is_err());
}

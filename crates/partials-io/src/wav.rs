//! WAV file reading and writing.
//!
//! Analysis works on a single channel, so reading always mixes down to mono
//! and writing always produces a mono file.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::io::Read;
use std::path::Path;

/// Sample encoding of a WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Integer PCM.
    Pcm,
    /// 32-bit float.
    IeeeFloat,
}

/// Header fields of a WAV file.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Channel count before mixdown.
    pub channels: u16,
    /// Hz.
    pub sample_rate: u32,
    /// Stored bits per sample.
    pub bits_per_sample: u16,
    /// Samples per channel.
    pub num_frames: u64,
    /// `num_frames / sample_rate`.
    pub duration_secs: f64,
    /// Stored encoding.
    pub format: WavFormat,
}

/// Read only the header of a WAV file.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let num_frames = u64::from(reader.duration());

    let format = match spec.sample_format {
        SampleFormat::Float => WavFormat::IeeeFloat,
        SampleFormat::Int => WavFormat::Pcm,
    };

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs: num_frames as f64 / f64::from(spec.sample_rate),
        format,
    })
}

/// Output WAV specification. Files are always written mono.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample: 16 or 24 for PCM, 32 for float.
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self::mono(44100)
    }
}

impl WavSpec {
    /// 32-bit float mono at `sample_rate`.
    pub fn mono(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            bits_per_sample: 32,
        }
    }

    /// Same rate with a different bit depth.
    pub fn with_bits(mut self, bits_per_sample: u16) -> Self {
        self.bits_per_sample = bits_per_sample;
        self
    }

    fn to_hound(self) -> Result<hound::WavSpec> {
        let sample_format = match self.bits_per_sample {
            32 => SampleFormat::Float,
            16 | 24 => SampleFormat::Int,
            bits => return Err(Error::UnsupportedBitDepth(bits)),
        };
        Ok(hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: self.bits_per_sample,
            sample_format,
        })
    }
}

/// Decode every sample of a reader to `f32` in [-1, 1], interleaved.
fn decode<R: Read>(reader: WavReader<R>) -> Result<Vec<f32>> {
    let spec = reader.spec();
    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };
    Ok(samples)
}

/// Average interleaved channels into one.
fn mixdown(samples: Vec<f32>, channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples;
    }
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Read a WAV file as mono `f32` samples, returning them with the file's
/// sample rate and bit depth.
///
/// Multi-channel files are mixed down by averaging channels. A file with no
/// sample frames is an error, since nothing can be analyzed.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, WavSpec)> {
    let path = path.as_ref();
    let reader = WavReader::open(path)?;
    let file_spec = reader.spec();
    let channels = usize::from(file_spec.channels);

    let samples = mixdown(decode(reader)?, channels);
    if samples.is_empty() {
        return Err(Error::EmptyFile(path.to_path_buf()));
    }

    tracing::debug!(
        path = %path.display(),
        channels,
        sample_rate = file_spec.sample_rate,
        frames = samples.len(),
        "read WAV"
    );

    Ok((
        samples,
        WavSpec {
            sample_rate: file_spec.sample_rate,
            bits_per_sample: file_spec.bits_per_sample,
        },
    ))
}

/// Write mono samples to a WAV file.
///
/// 32-bit output is float; 16- and 24-bit output is PCM with samples clipped
/// to full scale.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], spec: WavSpec) -> Result<()> {
    let path = path.as_ref();
    let hound_spec = spec.to_hound()?;
    let mut writer = WavWriter::create(path, hound_spec)?;

    match hound_spec.sample_format {
        SampleFormat::Float => {
            for &sample in samples {
                writer.write_sample(sample)?;
            }
        }
        SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            for &sample in samples {
                let int_sample = (sample * full_scale).clamp(-full_scale, full_scale - 1.0) as i32;
                writer.write_sample(int_sample)?;
            }
        }
    }

    writer.finalize()?;
    tracing::debug!(path = %path.display(), frames = samples.len(), "wrote WAV");
    Ok(())
}

//! Audio file I/O for partials analysis.
//!
//! This crate provides:
//!
//! - **WAV reading**: [`read_wav`] loads any PCM or float WAV file as mono `f32`
//! - **WAV writing**: [`write_wav`] saves mono `f32` samples as float or PCM
//! - **Header inspection**: [`read_wav_info`] reads the format without decoding
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use partials_io::{read_wav, write_wav, WavSpec};
//!
//! let (samples, spec) = read_wav("input.wav")?;
//! // ... analyze and resynthesize ...
//! write_wav("output.wav", &resynthesized, WavSpec::mono(spec.sample_rate))?;
//! ```

mod wav;

pub use wav::{WavFormat, WavInfo, WavSpec, read_wav, read_wav_info, write_wav};

use std::path::PathBuf;

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// The file holds no audio frames.
    #[error("WAV file has no samples: {}", .0.display())]
    EmptyFile(PathBuf),

    /// The requested bit depth cannot be written.
    #[error("Unsupported bit depth: {0}")]
    UnsupportedBitDepth(u16),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

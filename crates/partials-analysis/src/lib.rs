//! Partials Analysis - Sinusoidal partial tracking with a phase vocoder
//!
//! This crate decomposes a sound into partials, quasi-sinusoidal components
//! whose frequency and amplitude vary slowly over time, and resynthesizes a
//! waveform from them:
//!
//! - [`fft`] - FFT wrapper with windowing functions
//! - [`peaks`] - Local-maximum peak picking with salience filtering
//! - [`frame`] - Per-frame phase-vocoder frequency estimation
//! - [`harmonic`] - Harmonic-locked bin detection from an f0 track
//! - [`vocoder`] - Whole-signal analysis into per-frame peak matrices
//! - [`track`] - A single partial and its additive resynthesis
//! - [`set`] - Greedy peak-to-partial tracking and mixdown
//! - [`units`] - Pitch and level difference approximations
//! - [`config`] - TOML-backed analysis configuration
//! - [`export`] - CSV and JSON output
//!
//! ## Example Workflow
//!
//! ```rust,ignore
//! use partials_analysis::{AnalysisConfig, PhaseVocoder, TrackingConfig};
//!
//! // 1. Analyze: per-frame peaks with phase-vocoder frequencies
//! let mut pv = PhaseVocoder::new(signal, AnalysisConfig::new(44100.0))?;
//! let analysis = pv.run();
//!
//! // 2. Track: link peaks into partials
//! let partials = analysis.to_partials(TrackingConfig::default());
//!
//! // 3. Resynthesize
//! let output = partials.synth(44100.0, analysis.hop_size);
//! ```
//!
//! ## Harmonic Analysis
//!
//! ```rust,ignore
//! use partials_analysis::{AnalysisConfig, PhaseVocoder};
//!
//! // f0 track sampled at arbitrary times
//! let mut pv = PhaseVocoder::new(signal, AnalysisConfig::new(44100.0))?;
//! let analysis = pv.run_harmonic_at(&f0, &f0_times)?;
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod fft;
pub mod frame;
pub mod harmonic;
pub mod peaks;
pub mod set;
pub mod track;
pub mod units;
pub mod vocoder;

// Re-export main types
pub use config::{AnalysisConfig, TrackingConfig};
pub use error::{AnalysisError, Result};
pub use fft::{Fft, Window};
pub use frame::{BinDetector, FrameAnalyzer, FrameView, FrequencyEstimator, Peak, SpectralPeaks};
pub use harmonic::HarmonicComb;
pub use peaks::PeakFinder;
pub use set::{BandSeries, PartialSet, PartialSummary};
pub use track::PartialTrack;
pub use units::{dmag2db, dpitch2st};
pub use vocoder::{PhaseVocoder, PvAnalysis};

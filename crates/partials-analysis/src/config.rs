//! Analysis and tracking configuration.
//!
//! Both structs are `serde` (de)serializable with `#[serde(default)]`, so a
//! TOML file only needs to name the values it changes:
//!
//! ```toml
//! sample_rate = 48000.0
//! fft_size = 2048
//! max_peaks = 40
//!
//! [tracking]
//! max_pitch_jump = 0.3
//! ```

use crate::error::{AnalysisError, Result};
use crate::fft::Window;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Phase-vocoder analysis parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// FFT size in samples (power of two).
    pub fft_size: usize,
    /// Hop between frames in samples. `None` means `fft_size / 2`.
    pub hop_size: Option<usize>,
    /// Maximum number of peaks reported per frame.
    pub max_peaks: usize,
    /// Peak amplitude threshold relative to the frame maximum (0–1).
    pub peak_threshold: f32,
    /// Analysis window.
    pub window: Window,
    /// Half-width in bins of the peak magnitude estimate.
    pub magnitude_half_width: usize,
    /// Radius in bins of the peak salience filter.
    pub salience_radius: usize,
    /// Minimum fundamental (Hz) used to re-center harmonic bins.
    pub harmonic_fmin: f32,
    /// Peak-to-partial assignment parameters.
    pub tracking: TrackingConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            fft_size: 1024,
            hop_size: None,
            max_peaks: 20,
            peak_threshold: 0.005,
            window: Window::Hann,
            magnitude_half_width: 1,
            salience_radius: 5,
            harmonic_fmin: 30.0,
            tracking: TrackingConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Default configuration at the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }

    /// Set the FFT size.
    pub fn with_fft_size(mut self, fft_size: usize) -> Self {
        self.fft_size = fft_size;
        self
    }

    /// Set an explicit hop size.
    pub fn with_hop_size(mut self, hop_size: usize) -> Self {
        self.hop_size = Some(hop_size);
        self
    }

    /// Set the maximum number of peaks per frame.
    pub fn with_max_peaks(mut self, max_peaks: usize) -> Self {
        self.max_peaks = max_peaks;
        self
    }

    /// Set the relative peak threshold.
    pub fn with_peak_threshold(mut self, threshold: f32) -> Self {
        self.peak_threshold = threshold;
        self
    }

    /// Set the analysis window.
    pub fn with_window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    /// Set the tracking parameters.
    pub fn with_tracking(mut self, tracking: TrackingConfig) -> Self {
        self.tracking = tracking;
        self
    }

    /// Effective hop size in samples.
    pub fn hop(&self) -> usize {
        self.hop_size.unwrap_or(self.fft_size / 2)
    }

    /// Check every parameter against its valid range.
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(AnalysisError::invalid_config(
                "sample_rate",
                format!("must be positive, got {}", self.sample_rate),
            ));
        }
        if self.fft_size < 4 || !self.fft_size.is_power_of_two() {
            return Err(AnalysisError::invalid_config(
                "fft_size",
                format!("must be a power of two >= 4, got {}", self.fft_size),
            ));
        }
        if self.hop() == 0 {
            return Err(AnalysisError::invalid_config("hop_size", "must be positive"));
        }
        if self.max_peaks == 0 {
            return Err(AnalysisError::invalid_config("max_peaks", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.peak_threshold) {
            return Err(AnalysisError::invalid_config(
                "peak_threshold",
                format!("must be in [0, 1], got {}", self.peak_threshold),
            ));
        }
        if !(self.harmonic_fmin.is_finite() && self.harmonic_fmin >= 0.0) {
            return Err(AnalysisError::invalid_config(
                "harmonic_fmin",
                format!("must be non-negative, got {}", self.harmonic_fmin),
            ));
        }
        self.tracking.validate()
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| AnalysisError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| AnalysisError::write_file(path, e))
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Peak-to-partial assignment parameters.
///
/// The distance between a peak and an open partial is
/// `pitch_weight · |Δsemitones| + magnitude_weight · |ΔdB|`; the closest
/// partial is continued only if its pitch distance is below `max_pitch_jump`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Maximum pitch jump between consecutive frames, in semitones.
    pub max_pitch_jump: f32,
    /// Weight of the pitch distance.
    pub pitch_weight: f32,
    /// Weight of the magnitude distance.
    pub magnitude_weight: f32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            max_pitch_jump: 0.5,
            pitch_weight: 1.0,
            magnitude_weight: 1.0,
        }
    }
}

impl TrackingConfig {
    /// Default weights with the given pitch jump limit.
    pub fn with_max_pitch_jump(max_pitch_jump: f32) -> Self {
        Self {
            max_pitch_jump,
            ..Self::default()
        }
    }

    /// Check every parameter against its valid range.
    pub fn validate(&self) -> Result<()> {
        if !(self.max_pitch_jump.is_finite() && self.max_pitch_jump > 0.0) {
            return Err(AnalysisError::invalid_config(
                "max_pitch_jump",
                format!("must be positive, got {}", self.max_pitch_jump),
            ));
        }
        for (param, weight) in [
            ("pitch_weight", self.pitch_weight),
            ("magnitude_weight", self.magnitude_weight),
        ] {
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(AnalysisError::invalid_config(
                    param,
                    format!("must be non-negative, got {weight}"),
                ));
            }
        }
        Ok(())
    }
}

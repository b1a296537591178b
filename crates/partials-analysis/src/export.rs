//! Export formats for analysis results.
//!
//! - CSV for per-frame peak tables, band series and partial summaries
//! - JSON for partial summaries

use crate::error::{AnalysisError, Result};
use crate::set::{BandSeries, PartialSummary};
use crate::vocoder::PvAnalysis;
use std::fmt::Write as _;
use std::path::Path;

fn write_text(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).map_err(|e| AnalysisError::write_file(path, e))
}

/// Render partial summaries as CSV, one partial per line.
pub fn summary_csv(summary: &[PartialSummary]) -> String {
    let mut csv = String::from("index,start,len,mean_frequency_hz,mean_magnitude\n");
    for s in summary {
        let _ = writeln!(
            csv,
            "{},{},{},{:.4},{:.6}",
            s.index, s.start, s.len, s.mean_frequency, s.mean_magnitude
        );
    }
    csv
}

/// Export partial summaries to CSV.
pub fn export_summary_csv(summary: &[PartialSummary], path: impl AsRef<Path>) -> Result<()> {
    write_text(path.as_ref(), &summary_csv(summary))
}

/// Export partial summaries to a JSON array.
pub fn export_summary_json(summary: &[PartialSummary], path: impl AsRef<Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    write_text(path.as_ref(), &json)
}

/// Render the occupied peak slots of every frame as CSV.
///
/// Empty slots (zero magnitude) are omitted.
pub fn peaks_csv(analysis: &PvAnalysis) -> String {
    let mut csv = String::from("frame,time_s,slot,frequency_hz,magnitude,phase_rad\n");
    for frame in 0..analysis.num_frames() {
        let time = analysis.times[frame];
        let rows = analysis.frequencies[frame]
            .iter()
            .zip(&analysis.magnitudes[frame])
            .zip(&analysis.phases[frame])
            .enumerate();
        for (slot, ((&f, &m), &p)) in rows {
            if m > 0.0 {
                let _ = writeln!(csv, "{frame},{time:.6},{slot},{f:.4},{m:.6},{p:.6}");
            }
        }
    }
    csv
}

/// Export the peak table of a phase-vocoder run to CSV.
pub fn export_peaks_csv(analysis: &PvAnalysis, path: impl AsRef<Path>) -> Result<()> {
    write_text(path.as_ref(), &peaks_csv(analysis))
}

/// Export a band series to CSV, one frame per line.
pub fn export_band_csv(band: &BandSeries, path: impl AsRef<Path>) -> Result<()> {
    let mut csv = String::from("time_s,frequency_hz,magnitude,phase_rad\n");
    for i in 0..band.times.len() {
        let _ = writeln!(
            csv,
            "{:.6},{:.4},{:.6},{:.6}",
            band.times[i], band.frequencies[i], band.magnitudes[i], band.phases[i]
        );
    }
    write_text(path.as_ref(), &csv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn summary() -> Vec<PartialSummary> {
        vec![
            PartialSummary {
                index: 1,
                len: 4,
                start: 2,
                mean_frequency: 880.0,
                mean_magnitude: 0.25,
            },
            PartialSummary {
                index: 0,
                len: 9,
                start: 1,
                mean_frequency: 440.0,
                mean_magnitude: 0.5,
            },
        ]
    }

    #[test]
    fn test_summary_csv() {
        let temp_file = NamedTempFile::new().unwrap();
        export_summary_csv(&summary(), temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("index,"));
        assert_eq!(lines[1], "1,2,4,880.0000,0.250000");
    }

    #[test]
    fn test_summary_json() {
        let temp_file = NamedTempFile::new().unwrap();
        export_summary_json(&summary(), temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["index"], 0);
        assert_eq!(items[1]["len"], 9);
    }

    #[test]
    fn test_peaks_csv_skips_empty_slots() {
        let analysis = PvAnalysis {
            sample_rate: 1000.0,
            fft_size: 8,
            hop_size: 4,
            max_peaks: 2,
            times: vec![0.004, 0.008],
            frequencies: vec![vec![0.0, 0.0], vec![125.0, 250.0]],
            magnitudes: vec![vec![0.0, 0.0], vec![1.0, 0.0]],
            phases: vec![vec![0.0, 0.0], vec![0.5, 0.0]],
        };
        let csv = peaks_csv(&analysis);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "1,0.008000,0,125.0000,1.000000,0.500000");
    }

    #[test]
    fn test_band_csv() {
        let band = BandSeries {
            times: vec![0.0, 0.01],
            frequencies: vec![0.0, 440.0],
            magnitudes: vec![0.0, 0.3],
            phases: vec![0.0, 1.0],
        };
        let temp_file = NamedTempFile::new().unwrap();
        export_band_csv(&band, temp_file.path()).unwrap();
        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert!(content.contains("440.0000"));
    }

    #[test]
    fn test_write_error_names_path() {
        let err = export_summary_csv(&summary(), "/nonexistent/dir/summary.csv").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dir/summary.csv"));
    }
}

//! Pitch and level conversions used by the partial tracker.
//!
//! The tracker compares thousands of peak/track pairs per signal, so it uses
//! first-order approximations of the logarithmic ratios around 1:
//!
//! - `12·log2(r) ≈ 17.312·(r − 1)` (semitones)
//! - `20·log10(r) ≈ (20 / ln 10)·(r − 1)` (decibels)
//!
//! Exact forms are provided for queries where accuracy matters more than speed.

use std::f32::consts::LN_10;

/// Slope of the linearized semitone conversion (≈ 12 / ln 2).
pub const SEMITONE_SLOPE: f32 = 17.312;

/// Slope of the linearized decibel conversion (20 / ln 10).
pub const DB_SLOPE: f32 = 20.0 / LN_10;

/// Approximate interval from `f1` to `f2` in semitones.
///
/// Accurate for nearby frequencies; use [`dpitch2st_exact`] for wide intervals.
#[inline]
pub fn dpitch2st(f1: f32, f2: f32) -> f32 {
    SEMITONE_SLOPE * (f2 / f1 - 1.0)
}

/// Exact interval from `f1` to `f2` in semitones.
#[inline]
pub fn dpitch2st_exact(f1: f32, f2: f32) -> f32 {
    12.0 * (f2 / f1).log2()
}

/// Approximate level difference of the ratio `mag_a / mag_b` in dB.
#[inline]
pub fn dmag2db(mag_a: f32, mag_b: f32) -> f32 {
    DB_SLOPE * (mag_a / mag_b - 1.0)
}

/// Exact level difference of the ratio `mag_a / mag_b` in dB.
#[inline]
pub fn dmag2db_exact(mag_a: f32, mag_b: f32) -> f32 {
    20.0 * (mag_a / mag_b).log10()
}

/// Linear amplitude to dB, floored at -200 dB.
#[inline]
pub fn amplitude_db(mag: f32) -> f32 {
    20.0 * mag.max(1e-10).log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unison_is_zero() {
        for f in [20.0, 440.0, 1234.5, 18000.0] {
            assert_eq!(dpitch2st(f, f), 0.0);
            assert_eq!(dpitch2st_exact(f, f), 0.0);
        }
    }

    #[test]
    fn approximation_close_for_small_intervals() {
        let approx = dpitch2st(440.0, 441.0);
        let exact = dpitch2st_exact(440.0, 441.0);
        assert!((approx - 0.03935).abs() < 1e-3, "approx {approx}");
        assert!((approx - exact).abs() < 1e-3);
    }

    #[test]
    fn semitone_near_one() {
        // 466 Hz is roughly one semitone above 440 Hz
        let st = dpitch2st(440.0, 466.0);
        assert!(st > 0.9 && st < 1.1, "st {st}");
        assert!((dpitch2st_exact(440.0, 880.0) - 12.0).abs() < 1e-4);
    }

    #[test]
    fn db_conversions() {
        assert!((dmag2db_exact(10.0, 1.0) - 20.0).abs() < 1e-4);
        assert_eq!(dmag2db(0.5, 0.5), 0.0);
        let approx = dmag2db(1.01, 1.0);
        assert!((approx - dmag2db_exact(1.01, 1.0)).abs() < 1e-3);
        assert!((amplitude_db(1.0)).abs() < 1e-6);
        assert!((amplitude_db(0.0) + 200.0).abs() < 1e-3);
    }
}

//! Bandwidth Knee Detection
//!
//! Post-processes a frequency/amplitude response curve (typically the
//! fundamental amplitudes of a completed sweep) to find the frequencies
//! where the response first drops a given number of dB below a reference.
//!
//! The detector is fail-soft: degenerate curves yield absent knees, never
//! an error, so sweep post-processing cannot abort a run after the fact.

use serde::{Deserialize, Serialize};

/// Floor applied before taking log10 of an amplitude
const AMP_FLOOR: f64 = 1e-18;

/// How the reference amplitude is chosen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ReferenceMode {
    /// Reference is the maximum amplitude in the curve
    Max,
    /// Reference is the amplitude at the sample nearest this frequency
    AtFrequency { ref_hz: f64 },
}

/// Located rolloff points of a response curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KneeResult {
    /// Low-side knee frequency, absent when no crossing exists
    pub low_knee_hz: Option<f64>,

    /// High-side knee frequency, absent when no crossing exists
    pub high_knee_hz: Option<f64>,

    /// Linear reference amplitude the drop is measured from
    pub reference_amplitude: f64,

    /// Reference level in dB
    pub reference_db: f64,
}

impl KneeResult {
    /// Result for curves the detection is undefined on
    fn degenerate() -> Self {
        Self {
            low_knee_hz: None,
            high_knee_hz: None,
            reference_amplitude: f64::NAN,
            reference_db: f64::NAN,
        }
    }
}

/// Find the -`drop_db` rolloff frequencies of a response curve
///
/// Scans outward from the reference sample toward each end of the curve;
/// the first segment whose dB values straddle the threshold yields a knee,
/// linearly interpolated between the bracketing samples in (frequency, dB)
/// space for sub-sample resolution.
///
/// Preconditions (violations yield absent knees, not errors): equal-length
/// inputs, at least 2 samples, strictly increasing frequencies, positive
/// finite reference amplitude.
pub fn find_knees(
    freqs: &[f64],
    amps: &[f64],
    reference: ReferenceMode,
    drop_db: f64,
) -> KneeResult {
    if freqs.len() != amps.len() || freqs.len() < 2 {
        return KneeResult::degenerate();
    }
    if !freqs.windows(2).all(|w| w[1] > w[0]) {
        return KneeResult::degenerate();
    }

    let ref_index = match reference {
        ReferenceMode::Max => {
            let mut best = 0;
            for (i, &a) in amps.iter().enumerate() {
                if a > amps[best] {
                    best = i;
                }
            }
            best
        }
        ReferenceMode::AtFrequency { ref_hz } => {
            let mut best = 0;
            for (i, &f) in freqs.iter().enumerate() {
                if (f - ref_hz).abs() < (freqs[best] - ref_hz).abs() {
                    best = i;
                }
            }
            best
        }
    };

    let reference_amplitude = amps[ref_index];
    if !reference_amplitude.is_finite() || reference_amplitude <= 0.0 {
        return KneeResult::degenerate();
    }

    let reference_db = 20.0 * reference_amplitude.log10();
    let target_db = reference_db - drop_db;
    let db: Vec<f64> = amps.iter().map(|&a| 20.0 * a.max(AMP_FLOOR).log10()).collect();

    // Low side: walk from the reference toward the start of the curve
    let mut low_knee_hz = None;
    for i in (1..=ref_index).rev() {
        if let Some(knee) = crossing(freqs[i], db[i], freqs[i - 1], db[i - 1], target_db) {
            low_knee_hz = Some(knee);
            break;
        }
    }

    // High side: walk from the reference toward the end of the curve
    let mut high_knee_hz = None;
    for i in ref_index..freqs.len() - 1 {
        if let Some(knee) = crossing(freqs[i], db[i], freqs[i + 1], db[i + 1], target_db) {
            high_knee_hz = Some(knee);
            break;
        }
    }

    KneeResult {
        low_knee_hz,
        high_knee_hz,
        reference_amplitude,
        reference_db,
    }
}

/// Interpolated crossing frequency of one segment, inner sample first
fn crossing(inner_f: f64, inner_db: f64, outer_f: f64, outer_db: f64, target_db: f64) -> Option<f64> {
    let straddles = (inner_db >= target_db && outer_db <= target_db)
        || (inner_db <= target_db && outer_db >= target_db);
    if !straddles {
        return None;
    }
    if outer_db == inner_db {
        return Some(outer_f);
    }
    let frac = (target_db - inner_db) / (outer_db - inner_db);
    Some(inner_f + frac * (outer_f - inner_f))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_curve_has_no_knees() {
        let freqs = [100.0, 200.0, 400.0, 800.0];
        let amps = [1.0, 1.0, 1.0, 1.0];
        let result = find_knees(&freqs, &amps, ReferenceMode::Max, 3.0);
        assert!(result.low_knee_hz.is_none());
        assert!(result.high_knee_hz.is_none());
        assert_eq!(result.reference_amplitude, 1.0);
        assert_eq!(result.reference_db, 0.0);
    }

    #[test]
    fn test_step_response_interpolated_knees() {
        // 0 dB plateau with a sharp -6.02 dB step at both ends
        let freqs = [10.0, 20.0, 30.0, 40.0, 50.0];
        let amps = [0.5, 1.0, 1.0, 1.0, 0.5];
        let result = find_knees(&freqs, &amps, ReferenceMode::Max, 3.0);

        let step_db = 20.0 * 0.5_f64.log10(); // -6.0206
        let frac = -3.0 / step_db; // 0.4983

        let low = result.low_knee_hz.unwrap();
        let expected_low = 20.0 + frac * (10.0 - 20.0);
        assert!((low - expected_low).abs() < 1e-9, "low {low} != {expected_low}");

        let high = result.high_knee_hz.unwrap();
        let expected_high = 40.0 + frac * (50.0 - 40.0);
        assert!((high - expected_high).abs() < 1e-9);

        // Interpolated, not snapped to a sample
        assert!(freqs.iter().all(|&f| (f - low).abs() > 1.0));
        assert!(freqs.iter().all(|&f| (f - high).abs() > 1.0));
    }

    #[test]
    fn test_reference_at_frequency() {
        // Max sits at the low end; referencing 1 kHz measures midband rolloff
        let freqs = [100.0, 500.0, 1000.0, 5000.0, 10_000.0];
        let amps = [2.0, 1.2, 1.0, 1.0, 0.2];
        let result = find_knees(
            &freqs,
            &amps,
            ReferenceMode::AtFrequency { ref_hz: 1000.0 },
            3.0,
        );
        assert_eq!(result.reference_amplitude, 1.0);
        // High side crosses between 5 kHz and 10 kHz
        let high = result.high_knee_hz.unwrap();
        assert!(high > 5000.0 && high < 10_000.0);
        // Low side rises toward the max: no drop crossing
        assert!(result.low_knee_hz.is_none());
    }

    #[test]
    fn test_single_sided_rolloff() {
        let freqs = [100.0, 200.0, 400.0, 800.0];
        let amps = [1.0, 1.0, 0.9, 0.1];
        let result = find_knees(&freqs, &amps, ReferenceMode::Max, 3.0);
        assert!(result.low_knee_hz.is_none());
        let high = result.high_knee_hz.unwrap();
        assert!(high > 400.0 && high < 800.0);
    }

    #[test]
    fn test_degenerate_inputs_fail_soft() {
        // Too short
        let result = find_knees(&[100.0], &[1.0], ReferenceMode::Max, 3.0);
        assert!(result.low_knee_hz.is_none() && result.high_knee_hz.is_none());
        assert!(result.reference_amplitude.is_nan());

        // Length mismatch
        let result = find_knees(&[100.0, 200.0], &[1.0], ReferenceMode::Max, 3.0);
        assert!(result.reference_amplitude.is_nan());

        // Non-increasing frequencies
        let result = find_knees(&[100.0, 100.0], &[1.0, 0.5], ReferenceMode::Max, 3.0);
        assert!(result.reference_amplitude.is_nan());

        // All-zero curve: no positive reference
        let result = find_knees(&[100.0, 200.0], &[0.0, 0.0], ReferenceMode::Max, 3.0);
        assert!(result.reference_amplitude.is_nan());
    }

    #[test]
    fn test_exact_threshold_sample() {
        // Outer sample sits exactly on the threshold
        let drop = 3.0;
        let target_amp = 10.0_f64.powf(-drop / 20.0);
        let freqs = [10.0, 20.0, 30.0];
        let amps = [target_amp, 1.0, 1.0];
        let result = find_knees(&freqs, &amps, ReferenceMode::Max, drop);
        let low = result.low_knee_hz.unwrap();
        assert!((low - 10.0).abs() < 1e-9);
    }
}

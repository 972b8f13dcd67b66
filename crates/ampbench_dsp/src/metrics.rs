//! Amplitude KPIs
//!
//! Scalar summaries of a voltage record, used for sweep rows and the live
//! monitor readout. Empty input yields NaN, matching the analyzer's
//! "undefined, not an error" convention.

/// RMS voltage of a sample record
pub fn vrms(volts: &[f64]) -> f64 {
    if volts.is_empty() {
        return f64::NAN;
    }
    let mean_sq = volts.iter().map(|v| v * v).sum::<f64>() / volts.len() as f64;
    mean_sq.sqrt()
}

/// Peak-to-peak voltage of a sample record
pub fn vpp(volts: &[f64]) -> f64 {
    if volts.is_empty() {
        return f64::NAN;
    }
    let mut min = volts[0];
    let mut max = volts[0];
    for &v in &volts[1..] {
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }
    max - min
}

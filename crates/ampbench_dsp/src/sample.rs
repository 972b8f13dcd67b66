//! Captured Waveforms
//!
//! A capture is either a calibrated (time, volts) waveform from a scope
//! read, or a bare amplitude record with a nominal sample rate when the
//! acquisition path cannot provide a time base. Captures are transient:
//! the analyzer borrows one for the duration of a call and nothing in this
//! crate stores them.

use serde::{Deserialize, Serialize};

/// Fallback sample interval when a capture carries no usable time base
const FALLBACK_DT_S: f64 = 1e-6;

/// A single acquired signal, in volts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaptureSample {
    /// Calibrated waveform: equal-length time (seconds) and voltage arrays
    Waveform { time_s: Vec<f64>, volts: Vec<f64> },

    /// Amplitude-only record with a nominal sample rate
    Amplitudes { volts: Vec<f64>, sample_rate_hz: f64 },
}

impl CaptureSample {
    /// Build a calibrated waveform capture
    ///
    /// Mismatched array lengths are truncated to the shorter of the two so
    /// downstream analysis always sees aligned pairs.
    pub fn from_waveform(mut time_s: Vec<f64>, mut volts: Vec<f64>) -> Self {
        let n = time_s.len().min(volts.len());
        time_s.truncate(n);
        volts.truncate(n);
        CaptureSample::Waveform { time_s, volts }
    }

    /// Build an amplitude-only capture with a nominal sample rate
    pub fn from_amplitudes(volts: Vec<f64>, sample_rate_hz: f64) -> Self {
        CaptureSample::Amplitudes {
            volts,
            sample_rate_hz,
        }
    }

    /// Voltage samples, regardless of capture kind
    pub fn volts(&self) -> &[f64] {
        match self {
            CaptureSample::Waveform { volts, .. } => volts,
            CaptureSample::Amplitudes { volts, .. } => volts,
        }
    }

    /// Number of voltage samples
    pub fn len(&self) -> usize {
        self.volts().len()
    }

    pub fn is_empty(&self) -> bool {
        self.volts().is_empty()
    }

    /// Effective sample interval in seconds
    ///
    /// Waveforms use the median of the time deltas, which tolerates a few
    /// glitched timestamps in a scope dump. A non-positive median falls
    /// back to span/(n-1), then to a 1 us default.
    pub fn sample_interval(&self) -> f64 {
        match self {
            CaptureSample::Waveform { time_s, volts } => {
                let n = time_s.len().min(volts.len());
                if n < 2 {
                    return FALLBACK_DT_S;
                }
                let mut deltas: Vec<f64> =
                    time_s[..n].windows(2).map(|w| w[1] - w[0]).collect();
                deltas.sort_by(f64::total_cmp);
                let mid = deltas.len() / 2;
                let dt = if deltas.len() % 2 == 1 {
                    deltas[mid]
                } else {
                    0.5 * (deltas[mid - 1] + deltas[mid])
                };
                if dt.is_finite() && dt > 0.0 {
                    return dt;
                }
                let span = time_s[n - 1] - time_s[0];
                if span > 0.0 {
                    span / (n - 1) as f64
                } else {
                    FALLBACK_DT_S
                }
            }
            CaptureSample::Amplitudes { sample_rate_hz, .. } => {
                if sample_rate_hz.is_finite() && *sample_rate_hz > 0.0 {
                    1.0 / sample_rate_hz
                } else {
                    FALLBACK_DT_S
                }
            }
        }
    }
}

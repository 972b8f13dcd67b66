//! Frequency Test-Point Generation
//!
//! Produces the ordered, deterministic list of test frequencies a sweep
//! visits. Every point is rounded to 6 decimal places after computation
//! and the endpoints are force-set to the rounded bounds, so runs are
//! reproducible and endpoint-exact despite floating-point drift.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors for invalid sweep ranges
///
/// These fail fast: no partial frequency list is ever returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RangeError {
    #[error("points must be >= 2, got {0}")]
    TooFewPoints(usize),

    #[error("start frequency must be > 0 Hz, got {0}")]
    NonPositiveStart(f64),

    #[error("stop frequency {stop} Hz is below start frequency {start} Hz")]
    StopBelowStart { start: f64, stop: f64 },

    #[error("sweep bounds must be finite")]
    NonFiniteBounds,
}

/// Spacing of the generated test points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepMode {
    Linear,
    #[serde(alias = "log")]
    Logarithmic,
}

/// An ordered set of test frequencies plus the parameters that built it
///
/// Serializes to the machine-readable export record
/// `{start, stop, points, mode, frequencies}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyPlan {
    #[serde(rename = "start")]
    pub start_hz: f64,
    #[serde(rename = "stop")]
    pub stop_hz: f64,
    pub points: usize,
    pub mode: SweepMode,
    pub frequencies: Vec<f64>,
}

impl FrequencyPlan {
    /// Generate `points` frequencies from `start_hz` to `stop_hz` inclusive
    ///
    /// Linear mode steps uniformly; logarithmic mode steps uniformly in
    /// ln-space. Pure function: invalid parameters fail fast with no
    /// partial output.
    pub fn build(
        start_hz: f64,
        stop_hz: f64,
        points: usize,
        mode: SweepMode,
    ) -> Result<Self, RangeError> {
        if !start_hz.is_finite() || !stop_hz.is_finite() {
            return Err(RangeError::NonFiniteBounds);
        }
        if points < 2 {
            return Err(RangeError::TooFewPoints(points));
        }
        if start_hz <= 0.0 {
            return Err(RangeError::NonPositiveStart(start_hz));
        }
        if stop_hz < start_hz {
            return Err(RangeError::StopBelowStart {
                start: start_hz,
                stop: stop_hz,
            });
        }

        let steps = (points - 1) as f64;
        let mut frequencies: Vec<f64> = match mode {
            SweepMode::Linear => {
                let step = (stop_hz - start_hz) / steps;
                (0..points)
                    .map(|i| round6(start_hz + step * i as f64))
                    .collect()
            }
            SweepMode::Logarithmic => {
                let ln_start = start_hz.ln();
                let ln_step = (stop_hz.ln() - ln_start) / steps;
                (0..points)
                    .map(|i| round6((ln_start + ln_step * i as f64).exp()))
                    .collect()
            }
        };

        // Endpoints exact regardless of accumulated drift
        frequencies[0] = round6(start_hz);
        frequencies[points - 1] = round6(stop_hz);

        Ok(Self {
            start_hz,
            stop_hz,
            points,
            mode,
            frequencies,
        })
    }

    /// The generated test frequencies, in sweep order
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Line-oriented form for pipeline use: one frequency per line
    pub fn to_lines(&self) -> String {
        let mut out = String::new();
        for f in &self.frequencies {
            out.push_str(&format!("{f}\n"));
        }
        out
    }
}

/// Round to 6 decimal places (deterministic test-point identity)
fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

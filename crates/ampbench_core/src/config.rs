//! Sweep Run Configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::points::{FrequencyPlan, SweepMode};

/// Parameters for one characterization run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// First test frequency in Hz
    pub start_hz: f64,

    /// Last test frequency in Hz
    pub stop_hz: f64,

    /// Number of test points (inclusive of both endpoints)
    pub points: usize,

    /// Point spacing
    pub mode: SweepMode,

    /// Commanded generator amplitude, peak-to-peak volts
    pub amplitude_vpp: f64,

    /// Settle time between configuring the generator and capturing
    pub dwell_ms: u64,

    /// Number of harmonics included in the THD sum
    pub nharm: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        // Audio-band THD sweep defaults
        Self {
            start_hz: 20.0,
            stop_hz: 20_000.0,
            points: 61,
            mode: SweepMode::Logarithmic,
            amplitude_vpp: 0.5,
            dwell_ms: 150,
            nharm: 10,
        }
    }
}

impl SweepConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.points < 2 {
            return Err(format!("points must be >= 2, got {}", self.points));
        }
        if !self.start_hz.is_finite() || self.start_hz <= 0.0 {
            return Err(format!("start frequency must be > 0 Hz, got {}", self.start_hz));
        }
        if !self.stop_hz.is_finite() || self.stop_hz < self.start_hz {
            return Err(format!(
                "stop frequency must be >= start frequency, got {}",
                self.stop_hz
            ));
        }
        if !self.amplitude_vpp.is_finite() || self.amplitude_vpp <= 0.0 {
            return Err(format!("amplitude must be > 0 Vpp, got {}", self.amplitude_vpp));
        }
        if self.nharm < 2 {
            return Err(format!("nharm must be >= 2, got {}", self.nharm));
        }
        Ok(())
    }

    /// Build the frequency plan for this configuration
    pub fn plan(&self) -> CoreResult<FrequencyPlan> {
        self.validate().map_err(CoreError::InvalidConfig)?;
        Ok(FrequencyPlan::build(
            self.start_hz,
            self.stop_hz,
            self.points,
            self.mode,
        )?)
    }

    /// Settle time as a `Duration`
    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }
}

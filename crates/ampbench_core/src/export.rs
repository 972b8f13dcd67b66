//! Machine-Readable Export Records
//!
//! Structured forms handed to pipeline consumers and the plotting
//! collaborator. JSON via serde; the tabular forms are plain CSV text.
//!
//! Degenerate analysis results stay exportable: serde_json writes
//! non-finite floats as `null` and the CSV writer prints `NaN`, so the
//! records are always well-formed and the export itself never fails merely
//! because an input was too short to analyze.

use serde::{Deserialize, Serialize};

use ampbench_dsp::{AnalysisResult, Harmonic};

use crate::error::CoreResult;
use crate::points::FrequencyPlan;
use crate::sweep::{PointStatus, SweepReport};

/// THD/harmonic export record: `{thd, f0_est, fund_amp, harmonics}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThdRecord {
    pub thd: f64,
    pub f0_est: f64,
    pub fund_amp: f64,
    pub harmonics: Vec<Harmonic>,
}

impl ThdRecord {
    pub fn from_analysis(result: &AnalysisResult) -> Self {
        Self {
            thd: result.thd_ratio,
            f0_est: result.f0_estimate_hz,
            fund_amp: result.fundamental_amplitude,
            harmonics: result.harmonics.clone().unwrap_or_default(),
        }
    }
}

/// JSON form of an analysis result
pub fn thd_json(result: &AnalysisResult) -> CoreResult<String> {
    Ok(serde_json::to_string(&ThdRecord::from_analysis(result))?)
}

/// JSON form of a frequency plan: `{start, stop, points, mode, frequencies}`
pub fn frequency_plan_json(plan: &FrequencyPlan) -> CoreResult<String> {
    Ok(serde_json::to_string(plan)?)
}

/// Tabular harmonic export: `k,freq_hz,mag` rows
pub fn harmonic_table_csv(table: &[Harmonic]) -> String {
    let mut out = String::from("k,freq_hz,mag\n");
    for h in table {
        out.push_str(&format!("{},{},{}\n", h.k, h.freq_hz, h.mag));
    }
    out
}

/// Tabular sweep export, one row per point in plan order
pub fn sweep_report_csv(report: &SweepReport) -> String {
    let mut out = String::from("freq_hz,status,thd_ratio,thd_percent,f0_est,fund_amp\n");
    for point in &report.points {
        match &point.status {
            PointStatus::Ok(analysis) => {
                out.push_str(&format!(
                    "{},ok,{},{},{},{}\n",
                    point.frequency_hz,
                    analysis.thd_ratio,
                    analysis.thd_percent(),
                    analysis.f0_estimate_hz,
                    analysis.fundamental_amplitude,
                ));
            }
            PointStatus::Failed { .. } => {
                out.push_str(&format!("{},failed,NaN,NaN,NaN,NaN\n", point.frequency_hz));
            }
            PointStatus::Cancelled => {
                out.push_str(&format!(
                    "{},cancelled,NaN,NaN,NaN,NaN\n",
                    point.frequency_hz
                ));
            }
        }
    }
    out
}

//! Sweep Orchestration
//!
//! Drives an instrument session through every frequency of a plan and
//! collects one result per point into an ordered report.
//!
//! # Failure model
//!
//! The run is fail-soft: a configure or acquire error at one point is
//! recorded as a `Failed` entry and the sweep moves on. The report always
//! has exactly one entry per plan frequency, in plan order - nothing is
//! skipped, and no per-point error ever propagates to the caller.
//!
//! # Concurrency
//!
//! Strictly sequential. Generator and scope operations are assumed
//! non-reentrant, so points are processed one at a time. Cancellation is
//! cooperative and checked once per point boundary, never mid-acquisition;
//! the remainder of a cancelled run is recorded as `Cancelled` entries so
//! the one-entry-per-frequency invariant holds even then.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use ampbench_dsp::{AnalysisResult, HarmonicAnalyzer};

use crate::config::SweepConfig;
use crate::instrument::InstrumentSession;
use crate::points::FrequencyPlan;

/// Cooperative cancellation handle
///
/// Clone freely; all clones share the flag. The orchestrator checks it at
/// each point boundary and the monitor at each cycle boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation at the next boundary
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of one test point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum PointStatus {
    /// Capture analyzed successfully
    Ok(AnalysisResult),

    /// Configure or acquire failed; the run continued
    Failed { reason: String },

    /// Point was not reached because the run was cancelled
    Cancelled,
}

impl PointStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, PointStatus::Ok(_))
    }
}

/// One report entry, immutable once appended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub frequency_hz: f64,
    pub status: PointStatus,
}

/// Ordered result of a sweep run: one entry per plan frequency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Whether cancellation cut the run short
    pub cancelled: bool,

    pub points: Vec<SweepPoint>,
}

impl SweepReport {
    pub fn ok_count(&self) -> usize {
        self.points.iter().filter(|p| p.status.is_ok()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.points
            .iter()
            .filter(|p| matches!(p.status, PointStatus::Failed { .. }))
            .count()
    }

    /// `(frequency, fundamental amplitude)` pairs of the successful points
    ///
    /// This is the response curve the knee detector and the plotting
    /// collaborator consume. Points whose amplitude is NaN are dropped.
    pub fn response_curve(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .filter_map(|p| match &p.status {
                PointStatus::Ok(analysis) if analysis.fundamental_amplitude.is_finite() => {
                    Some((p.frequency_hz, analysis.fundamental_amplitude))
                }
                _ => None,
            })
            .collect()
    }
}

/// Per-run options that are not part of the frequency plan
#[derive(Debug, Clone, Default)]
pub struct SweepOptions {
    /// Settle time between configure and acquire at each point
    pub dwell: Duration,
}

impl From<&SweepConfig> for SweepOptions {
    fn from(config: &SweepConfig) -> Self {
        Self {
            dwell: config.dwell(),
        }
    }
}

/// Run a sweep over every frequency of `plan`
///
/// Always returns a complete report; the only way to get an error out of a
/// sweep is to pass invalid parameters when building the plan beforehand.
pub fn run_sweep<S: InstrumentSession>(
    plan: &FrequencyPlan,
    session: &mut S,
    analyzer: &HarmonicAnalyzer,
    options: &SweepOptions,
    cancel: &CancelToken,
) -> SweepReport {
    let started_at = Utc::now();
    info!(points = plan.frequencies().len(), "starting sweep");

    let mut points = Vec::with_capacity(plan.frequencies().len());
    let mut cancelled = false;

    for &frequency_hz in plan.frequencies() {
        // Cancellation boundary: once per point, never mid-acquisition
        if cancel.is_cancelled() {
            if !cancelled {
                info!(frequency_hz, "sweep cancelled, marking remaining points");
                cancelled = true;
            }
            points.push(SweepPoint {
                frequency_hz,
                status: PointStatus::Cancelled,
            });
            continue;
        }

        let status = measure_point(session, analyzer, frequency_hz, options.dwell);
        points.push(SweepPoint {
            frequency_hz,
            status,
        });
    }

    let report = SweepReport {
        started_at,
        finished_at: Utc::now(),
        cancelled,
        points,
    };
    info!(
        ok = report.ok_count(),
        failed = report.failed_count(),
        cancelled = report.cancelled,
        "sweep finished"
    );
    report
}

fn measure_point<S: InstrumentSession>(
    session: &mut S,
    analyzer: &HarmonicAnalyzer,
    frequency_hz: f64,
    dwell: Duration,
) -> PointStatus {
    if let Err(e) = session.configure(frequency_hz) {
        warn!(frequency_hz, error = %e, "configure failed, recording point as failed");
        return PointStatus::Failed {
            reason: e.to_string(),
        };
    }

    if !dwell.is_zero() {
        thread::sleep(dwell);
    }

    match session.acquire(frequency_hz) {
        Ok(capture) => {
            debug!(frequency_hz, samples = capture.len(), "capture acquired");
            // Commanded frequency doubles as the fundamental hint
            PointStatus::Ok(analyzer.analyze(&capture, Some(frequency_hz)))
        }
        Err(e) => {
            warn!(frequency_hz, error = %e, "acquire failed, recording point as failed");
            PointStatus::Failed {
                reason: e.to_string(),
            }
        }
    }
}

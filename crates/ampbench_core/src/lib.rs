//! Ampbench Core - Sweep Engine
//!
//! This crate provides the measurement engine for Ampbench, including:
//! - Frequency test-point generation with exact, reproducible endpoints
//! - Fail-soft sweep orchestration over injected instrument sessions
//! - A background capture monitor for live displays
//! - Machine-readable export records for pipeline consumers
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Caller (GUI/CLI)                       │
//! │   SweepConfig ──▶ FrequencyPlan ──▶ run_sweep ──▶ Report    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ InstrumentSession (injected)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Bench Hardware Drivers                  │
//! │   configure(freq) ──▶ generator     acquire(freq) ──▶ scope │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine never talks to hardware directly: configure/acquire are
//! injected collaborators, which keeps every sweep testable with fakes and
//! keeps driver timeouts out of the core. Per-point failures become report
//! entries, never errors - a sweep invocation always completes with a full
//! report unless its parameters were invalid before the run started.

mod config;
mod error;
mod export;
mod instrument;
mod monitor;
mod points;
mod sweep;

pub use config::SweepConfig;
pub use error::{CoreError, CoreResult};
pub use export::{
    frequency_plan_json, harmonic_table_csv, sweep_report_csv, thd_json, ThdRecord,
};
pub use instrument::{AcquireError, ConfigError, FnSession, InstrumentSession, SampleSource};
pub use monitor::{CaptureMonitor, MonitorEvent, MonitorReading};
pub use points::{FrequencyPlan, RangeError, SweepMode};
pub use sweep::{run_sweep, CancelToken, PointStatus, SweepOptions, SweepPoint, SweepReport};

// Re-export DSP types for convenience
pub use ampbench_dsp::{
    find_knees, harmonic_table, AnalysisResult, AnalyzerConfig, AnalyzerMode, CaptureSample,
    Harmonic, HarmonicAnalyzer, KneeResult, NumericCapability, ReferenceMode, WindowKind,
};

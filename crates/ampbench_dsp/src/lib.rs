//! Ampbench DSP - Signal Analysis Module
//!
//! This crate provides the signal-quality analysis for Ampbench, including:
//! - Dual-mode harmonic/THD analyzer (FFT-based, with a stub fallback for
//!   hosts without the numeric stack)
//! - SNR and noise-floor estimation via FFT bin exclusion
//! - Bandwidth knee detection over sparse response curves
//! - Amplitude KPIs (RMS, peak-to-peak)
//!
//! # Architecture
//!
//! Everything here is pure computation over borrowed captures: no hardware
//! access, no threads, no global state. The analysis strategy is fixed at
//! construction from an explicit [`NumericCapability`] descriptor, never
//! re-detected per call. Degenerate input degrades to NaN fields instead
//! of errors so a sweep can never be aborted by a single bad capture.

mod analyzer;
mod knee;
mod metrics;
mod sample;
mod spectrum;
mod window;

pub use analyzer::{
    harmonic_table, noise_floor_db, snr_db, AnalysisResult, AnalyzerConfig, AnalyzerMode,
    Harmonic, HarmonicAnalyzer, NumericCapability, DEFAULT_NHARM, STUB_F0_HZ,
};
pub use knee::{find_knees, KneeResult, ReferenceMode};
pub use metrics::{vpp, vrms};
pub use sample::CaptureSample;
pub use spectrum::{Spectrum, MIN_SAMPLES};
pub use window::WindowKind;

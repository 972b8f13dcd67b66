//! Example: run a full sweep against a synthetic amplifier.
//!
//! Demonstrates the programmatic path a GUI or CLI would take: build a
//! plan from a config, run the fail-soft sweep with an injected session,
//! then post-process the response curve for bandwidth knees and export
//! the records. No hardware required.

use ampbench_core::{
    find_knees, frequency_plan_json, run_sweep, sweep_report_csv, CancelToken, CaptureSample,
    FnSession, HarmonicAnalyzer, NumericCapability, ReferenceMode, SweepConfig, SweepOptions,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const TAU: f64 = 2.0 * std::f64::consts::PI;

/// Single-pole rolloff at both band edges plus 2% second harmonic
fn synthetic_amplifier(frequency_hz: f64) -> CaptureSample {
    // ~20 cycles per capture at any test frequency
    let fs = 100.0 * frequency_hz;
    let n = 2048;
    let gain = 1.0
        / ((1.0 + (40.0 / frequency_hz).powi(2)) * (1.0 + (frequency_hz / 10_000.0).powi(2)))
            .sqrt();
    let time: Vec<f64> = (0..n).map(|i| i as f64 / fs).collect();
    let volts: Vec<f64> = time
        .iter()
        .map(|t| {
            gain * ((TAU * frequency_hz * t).sin() + 0.02 * (TAU * 2.0 * frequency_hz * t).sin())
        })
        .collect();
    CaptureSample::from_waveform(time, volts)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = SweepConfig {
        points: 25,
        dwell_ms: 0,
        ..Default::default()
    };
    let plan = config.plan()?;
    info!(points = plan.frequencies().len(), "plan built");
    println!("{}", frequency_plan_json(&plan)?);

    let analyzer = HarmonicAnalyzer::with_defaults(NumericCapability::full());
    let mut session = FnSession::new(|_| Ok(()), |hz| Ok(synthetic_amplifier(hz)));

    let report = run_sweep(
        &plan,
        &mut session,
        &analyzer,
        &SweepOptions::from(&config),
        &CancelToken::new(),
    );
    print!("{}", sweep_report_csv(&report));

    let curve = report.response_curve();
    let (freqs, amps): (Vec<f64>, Vec<f64>) = curve.into_iter().unzip();
    let knees = find_knees(&freqs, &amps, ReferenceMode::Max, 3.0);
    println!(
        "-3 dB bandwidth: {:?} Hz .. {:?} Hz (ref {:.3})",
        knees.low_knee_hz, knees.high_knee_hz, knees.reference_amplitude
    );

    Ok(())
}

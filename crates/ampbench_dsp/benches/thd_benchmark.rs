//! Performance benchmarks for the analysis module
//!
//! Run with: cargo bench -p ampbench_dsp

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use ampbench_dsp::{
    find_knees, CaptureSample, HarmonicAnalyzer, NumericCapability, ReferenceMode,
};

const TAU: f64 = 2.0 * std::f64::consts::PI;

fn distorted_capture(n: usize) -> CaptureSample {
    let fs = 50_000.0;
    let time: Vec<f64> = (0..n).map(|i| i as f64 / fs).collect();
    let volts: Vec<f64> = time
        .iter()
        .map(|t| (TAU * 1000.0 * t).sin() + 0.1 * (TAU * 2000.0 * t).sin())
        .collect();
    CaptureSample::from_waveform(time, volts)
}

fn benchmark_thd_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("thd");

    // Typical scope record lengths
    for size in [1024, 2048, 4096, 16384] {
        let capture = distorted_capture(size);
        let analyzer = HarmonicAnalyzer::with_defaults(NumericCapability::full());

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("analyze_{}_samples", size), |b| {
            b.iter(|| analyzer.analyze(black_box(&capture), Some(1000.0)));
        });
    }

    group.finish();
}

fn benchmark_stub_analysis(c: &mut Criterion) {
    let capture = CaptureSample::from_amplitudes(
        (0..4096).map(|i| (i as f64 * 0.01).sin()).collect(),
        48_000.0,
    );
    let analyzer = HarmonicAnalyzer::with_defaults(NumericCapability::degraded());

    c.bench_function("stub_analyze_4096_samples", |b| {
        b.iter(|| analyzer.analyze(black_box(&capture), None));
    });
}

fn benchmark_knee_detection(c: &mut Criterion) {
    // Log-spaced response curve with rolloff at both ends
    let points = 61;
    let freqs: Vec<f64> = (0..points)
        .map(|i| 20.0 * (1000.0_f64).powf(i as f64 / (points - 1) as f64))
        .collect();
    let amps: Vec<f64> = freqs
        .iter()
        .map(|&f| 1.0 / ((1.0 + (50.0 / f).powi(2)) * (1.0 + (f / 8000.0).powi(2))).sqrt())
        .collect();

    c.bench_function("find_knees_61_points", |b| {
        b.iter(|| find_knees(black_box(&freqs), black_box(&amps), ReferenceMode::Max, 3.0));
    });
}

criterion_group!(
    benches,
    benchmark_thd_analysis,
    benchmark_stub_analysis,
    benchmark_knee_detection
);
criterion_main!(benches);

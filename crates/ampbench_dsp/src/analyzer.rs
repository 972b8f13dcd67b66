//! Harmonic / THD Analyzer
//!
//! Computes distortion metrics from a capture. Two mutually exclusive
//! strategies exist, selected once at construction from a capability
//! descriptor:
//!
//! - **Advanced**: windowed FFT, fundamental location, harmonic summation.
//! - **Stub**: fixed placeholder results so call sites stay functional on
//!   hosts without the numeric stack.
//!
//! The strategy is never re-detected per call and callers never inspect
//! argument shapes to pick a path; `analyze()` behavior is fixed by the
//! analyzer's construction-time mode.
//!
//! Degenerate input (short capture, silent capture) produces NaN fields,
//! not errors - sweep post-processing treats NaN as "undefined here".

use serde::{Deserialize, Serialize};

use crate::sample::CaptureSample;
use crate::spectrum::Spectrum;
use crate::window::WindowKind;

/// Default number of harmonics included in the THD sum
pub const DEFAULT_NHARM: usize = 10;

/// Fixed fundamental frequency reported by the stub strategy
pub const STUB_F0_HZ: f64 = 1000.0;

/// Declares which optional numeric support is present on this host
///
/// Passed explicitly into constructors; nothing in this crate reads
/// process-wide state to decide behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericCapability {
    /// Whether the FFT-based analysis path may be used
    pub fft_available: bool,
}

impl NumericCapability {
    /// Full numeric stack available
    pub fn full() -> Self {
        Self {
            fft_available: true,
        }
    }

    /// Degraded host: analyzer falls back to the stub strategy
    pub fn degraded() -> Self {
        Self {
            fft_available: false,
        }
    }
}

/// Analysis strategy, fixed at analyzer construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerMode {
    Advanced,
    Stub,
}

impl From<NumericCapability> for AnalyzerMode {
    fn from(capability: NumericCapability) -> Self {
        if capability.fft_available {
            AnalyzerMode::Advanced
        } else {
            AnalyzerMode::Stub
        }
    }
}

/// Tuning for the advanced strategy
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Number of harmonics summed into the THD ratio
    pub nharm: usize,

    /// Window applied before the FFT
    pub window: WindowKind,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            nharm: DEFAULT_NHARM,
            window: WindowKind::Hann,
        }
    }
}

/// One spectral component at an integer multiple of the fundamental
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Harmonic {
    /// Harmonic index (1 = fundamental, 2 = second harmonic, ...)
    pub k: u32,

    /// Bin center frequency in Hz
    pub freq_hz: f64,

    /// Linear magnitude
    pub mag: f64,
}

/// Result of one analyzer call
///
/// `NaN` in a numeric field means "undefined for this input"; the call
/// itself always succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Ratio of combined harmonic energy to fundamental magnitude
    pub thd_ratio: f64,

    /// Estimated fundamental frequency in Hz
    pub f0_estimate_hz: f64,

    /// Linear magnitude of the fundamental bin
    pub fundamental_amplitude: f64,

    /// Harmonic components above the fundamental (advanced mode only)
    pub harmonics: Option<Vec<Harmonic>>,
}

impl AnalysisResult {
    /// All-NaN result for input the analysis is undefined on
    pub fn degenerate() -> Self {
        Self {
            thd_ratio: f64::NAN,
            f0_estimate_hz: f64::NAN,
            fundamental_amplitude: f64::NAN,
            harmonics: None,
        }
    }

    /// THD as a percentage
    pub fn thd_percent(&self) -> f64 {
        self.thd_ratio * 100.0
    }
}

/// Dual-mode distortion analyzer
///
/// Cheap to clone; the FFT plan is built per call because capture lengths
/// vary between scope reads.
#[derive(Debug, Clone)]
pub struct HarmonicAnalyzer {
    mode: AnalyzerMode,
    config: AnalyzerConfig,
}

impl HarmonicAnalyzer {
    /// Create an analyzer whose strategy is fixed by `capability`
    pub fn new(capability: NumericCapability, config: AnalyzerConfig) -> Self {
        Self {
            mode: capability.into(),
            config,
        }
    }

    /// Analyzer with default harmonic count and window
    pub fn with_defaults(capability: NumericCapability) -> Self {
        Self::new(capability, AnalyzerConfig::default())
    }

    /// The strategy selected at construction
    pub fn mode(&self) -> AnalyzerMode {
        self.mode
    }

    pub fn config(&self) -> AnalyzerConfig {
        self.config
    }

    /// Analyze one capture
    ///
    /// `f0_hint` pins the fundamental search to the commanded test
    /// frequency; without it the dominant non-DC peak is used.
    pub fn analyze(&self, capture: &CaptureSample, f0_hint: Option<f64>) -> AnalysisResult {
        match self.mode {
            AnalyzerMode::Advanced => self.analyze_advanced(capture, f0_hint),
            AnalyzerMode::Stub => Self::analyze_stub(capture),
        }
    }

    fn analyze_advanced(&self, capture: &CaptureSample, f0_hint: Option<f64>) -> AnalysisResult {
        let Some(spectrum) = Spectrum::from_capture(capture, self.config.window) else {
            return AnalysisResult::degenerate();
        };

        let fundamental_bin = spectrum.fundamental_bin(f0_hint);
        let f0_estimate_hz = spectrum.frequency(fundamental_bin);
        let fundamental_amplitude = spectrum.magnitude(fundamental_bin);

        if fundamental_amplitude <= 0.0 {
            return AnalysisResult {
                thd_ratio: f64::NAN,
                f0_estimate_hz,
                fundamental_amplitude: 0.0,
                harmonics: None,
            };
        }

        let harmonics = collect_harmonics(&spectrum, fundamental_bin, self.config.nharm);
        let sum_sq: f64 = harmonics.iter().map(|h| h.mag * h.mag).sum();

        AnalysisResult {
            thd_ratio: sum_sq.sqrt() / fundamental_amplitude,
            f0_estimate_hz,
            fundamental_amplitude,
            harmonics: Some(harmonics),
        }
    }

    fn analyze_stub(capture: &CaptureSample) -> AnalysisResult {
        // Peak magnitude stands in for the fundamental; NaN on empty input
        let fundamental_amplitude = capture
            .volts()
            .iter()
            .map(|v| v.abs())
            .fold(f64::NAN, f64::max);

        AnalysisResult {
            thd_ratio: 0.0,
            f0_estimate_hz: STUB_F0_HZ,
            fundamental_amplitude,
            harmonics: None,
        }
    }
}

/// Harmonic bins above the fundamental, for the THD sum
///
/// Targets past the top of the one-sided spectrum terminate the scan;
/// out-of-range harmonics contribute nothing rather than clamping to the
/// Nyquist bin.
fn collect_harmonics(spectrum: &Spectrum, fundamental_bin: usize, nharm: usize) -> Vec<Harmonic> {
    let base_hz = spectrum.frequency(fundamental_bin);
    let mut out = Vec::new();
    for k in 2..=nharm.max(2) {
        let target = k as f64 * base_hz;
        if target > spectrum.top_frequency() {
            break;
        }
        let bin = spectrum.nearest_bin(target);
        if bin == 0 {
            continue;
        }
        out.push(Harmonic {
            k: k as u32,
            freq_hz: spectrum.frequency(bin),
            mag: spectrum.magnitude(bin),
        });
    }
    out
}

/// Full harmonic table including the fundamental row (k = 1)
///
/// Used by the tabular export; returns an empty table on short captures.
pub fn harmonic_table(
    capture: &CaptureSample,
    f0_hint: Option<f64>,
    nharm: usize,
    window: WindowKind,
) -> Vec<Harmonic> {
    let Some(spectrum) = Spectrum::from_capture(capture, window) else {
        return Vec::new();
    };
    let fundamental_bin = spectrum.fundamental_bin(f0_hint);
    let base_hz = spectrum.frequency(fundamental_bin);

    let mut out = Vec::new();
    for k in 1..=nharm.max(2) {
        let target = k as f64 * base_hz;
        if target > spectrum.top_frequency() {
            break;
        }
        let bin = spectrum.nearest_bin(target);
        out.push(Harmonic {
            k: k as u32,
            freq_hz: spectrum.frequency(bin),
            mag: spectrum.magnitude(bin),
        });
    }
    out
}

/// Signal-to-noise ratio in dB via FFT bin exclusion
///
/// Noise is the RMS of all bins except DC, the fundamental, and the first
/// `nharm` harmonics. Returns NaN on degenerate input and +inf when the
/// excluded-bin noise is exactly zero.
pub fn snr_db(
    capture: &CaptureSample,
    f0_hint: Option<f64>,
    nharm: usize,
    window: WindowKind,
) -> f64 {
    let Some(spectrum) = Spectrum::from_capture(capture, window) else {
        return f64::NAN;
    };
    let fundamental_bin = spectrum.fundamental_bin(f0_hint);
    let fundamental = spectrum.magnitude(fundamental_bin);
    if fundamental <= 0.0 {
        return f64::NAN;
    }
    let Some(noise) = noise_rms(&spectrum, fundamental_bin, nharm) else {
        return f64::NAN;
    };
    if noise <= 0.0 {
        return f64::INFINITY;
    }
    20.0 * (fundamental / noise).log10()
}

/// Noise floor in dB relative to unit magnitude, same bin exclusions as
/// [`snr_db`]; -inf when the residual noise is exactly zero
pub fn noise_floor_db(
    capture: &CaptureSample,
    f0_hint: Option<f64>,
    nharm: usize,
    window: WindowKind,
) -> f64 {
    let Some(spectrum) = Spectrum::from_capture(capture, window) else {
        return f64::NAN;
    };
    let fundamental_bin = spectrum.fundamental_bin(f0_hint);
    let Some(noise) = noise_rms(&spectrum, fundamental_bin, nharm) else {
        return f64::NAN;
    };
    if noise <= 0.0 {
        return f64::NEG_INFINITY;
    }
    20.0 * noise.log10()
}

/// RMS of the spectrum with DC, fundamental, and harmonic bins masked out
fn noise_rms(spectrum: &Spectrum, fundamental_bin: usize, nharm: usize) -> Option<f64> {
    let mut excluded = vec![false; spectrum.bins()];
    excluded[0] = true;
    excluded[fundamental_bin] = true;

    let base_hz = spectrum.frequency(fundamental_bin);
    for k in 2..=nharm.max(2) {
        let target = k as f64 * base_hz;
        if target > spectrum.top_frequency() {
            break;
        }
        let bin = spectrum.nearest_bin(target);
        if bin > 0 {
            excluded[bin] = true;
        }
    }

    let (sum_sq, count) = spectrum
        .magnitudes()
        .iter()
        .zip(&excluded)
        .filter(|(_, &masked)| !masked)
        .map(|(m, _)| m * m)
        .fold((0.0, 0usize), |(s, c), m2| (s + m2, c + 1));

    if count == 0 {
        None
    } else {
        Some((sum_sq / count as f64).sqrt())
    }
}

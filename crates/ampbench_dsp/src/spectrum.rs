//! One-Sided Magnitude Spectrum
//!
//! Windowed FFT over a capture, reduced to the positive-frequency
//! magnitudes the harmonic analysis works on. Capture lengths vary from
//! read to read, so the FFT is planned per call rather than cached for a
//! fixed size.

use rustfft::{num_complex::Complex, FftPlanner};

use crate::sample::CaptureSample;
use crate::window::WindowKind;

/// Minimum capture length for spectral analysis
///
/// Anything shorter degrades to NaN results rather than an error.
pub const MIN_SAMPLES: usize = 16;

/// Positive-frequency magnitude spectrum of a capture
#[derive(Debug, Clone)]
pub struct Spectrum {
    /// Magnitudes for bins 0..=n/2 (DC through Nyquist)
    mags: Vec<f64>,
    /// Frequency step between adjacent bins
    bin_hz: f64,
}

impl Spectrum {
    /// Compute the spectrum of a capture, or `None` for captures shorter
    /// than [`MIN_SAMPLES`]
    pub fn from_capture(capture: &CaptureSample, window: WindowKind) -> Option<Self> {
        let volts = capture.volts();
        let n = volts.len();
        if n < MIN_SAMPLES {
            return None;
        }

        let dt = capture.sample_interval();
        let windowed = window.apply(volts);

        let mut buffer: Vec<Complex<f64>> = windowed
            .iter()
            .map(|&v| Complex::new(v, 0.0))
            .collect();
        let fft = FftPlanner::new().plan_fft_forward(n);
        fft.process(&mut buffer);

        // One-sided spectrum: bins 0..=n/2 cover DC through Nyquist
        let half = n / 2;
        let mags = buffer[..=half].iter().map(|c| c.norm()).collect();

        Some(Self {
            mags,
            bin_hz: 1.0 / (n as f64 * dt),
        })
    }

    /// Number of one-sided bins
    pub fn bins(&self) -> usize {
        self.mags.len()
    }

    /// Magnitude of a single bin
    pub fn magnitude(&self, bin: usize) -> f64 {
        self.mags[bin]
    }

    /// All one-sided magnitudes, DC first
    pub fn magnitudes(&self) -> &[f64] {
        &self.mags
    }

    /// Frequency step between adjacent bins
    pub fn bin_hz(&self) -> f64 {
        self.bin_hz
    }

    /// Center frequency of a bin
    pub fn frequency(&self, bin: usize) -> f64 {
        bin as f64 * self.bin_hz
    }

    /// Frequency of the highest bin
    pub fn top_frequency(&self) -> f64 {
        self.frequency(self.bins() - 1)
    }

    /// Bin whose center frequency is nearest to `freq_hz`
    pub fn nearest_bin(&self, freq_hz: f64) -> usize {
        let bin = (freq_hz / self.bin_hz).round();
        if !bin.is_finite() || bin <= 0.0 {
            return 0;
        }
        (bin as usize).min(self.bins() - 1)
    }

    /// Bin of the dominant non-DC component
    pub fn peak_bin(&self) -> usize {
        let mut best = 1;
        for bin in 2..self.bins() {
            if self.mags[bin] > self.mags[best] {
                best = bin;
            }
        }
        best
    }

    /// Locate the fundamental bin from an optional frequency hint
    ///
    /// A usable hint resolves to its nearest bin; a missing hint, a
    /// non-positive hint, or a hint landing on DC falls back to the
    /// dominant spectral peak.
    pub fn fundamental_bin(&self, f0_hint: Option<f64>) -> usize {
        if let Some(f0) = f0_hint {
            if f0 > 0.0 {
                let bin = self.nearest_bin(f0);
                if bin > 0 {
                    return bin;
                }
            }
        }
        self.peak_bin()
    }
}

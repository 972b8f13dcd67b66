//! Window Functions
//!
//! Raised-cosine windows applied before the FFT to reduce spectral leakage.
//! Coefficients are computed per capture since capture lengths vary from
//! scope read to scope read.

use serde::{Deserialize, Serialize};

/// Window applied to voltage samples before spectral analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    /// Hann window - the default for THD work (good leakage suppression)
    #[default]
    Hann,
    /// Hamming window - slightly narrower main lobe, higher side lobes
    Hamming,
    /// No window (rectangular)
    Rectangular,
}

impl WindowKind {
    /// Coefficient for sample `n` of a window of length `size`
    ///
    /// Symmetric form: zero (or near-zero) at both edges, unity at center.
    pub fn coefficient(self, n: usize, size: usize) -> f64 {
        if size < 2 {
            return 1.0;
        }
        let x = 2.0 * std::f64::consts::PI * n as f64 / (size - 1) as f64;
        match self {
            WindowKind::Hann => 0.5 - 0.5 * x.cos(),
            WindowKind::Hamming => 0.54 - 0.46 * x.cos(),
            WindowKind::Rectangular => 1.0,
        }
    }

    /// Apply the window to a sample slice, returning the windowed copy
    pub fn apply(self, samples: &[f64]) -> Vec<f64> {
        let size = samples.len();
        samples
            .iter()
            .enumerate()
            .map(|(n, &s)| s * self.coefficient(n, size))
            .collect()
    }
}

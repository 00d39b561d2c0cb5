//! Parameter types for image operations.
//!
//! These structs describe *what* a filter or encoder should do, not *how*.
//! The [`filters`](super::filters) module reads them; the pixel work lives
//! there and in [`calculations`](super::calculations).
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 90). Clamped on construction.
//! - [`GaussianKernel`]: Square kernel size plus the sigma derived from it.
//! - [`CannyThresholds`]: Hysteresis thresholds for edge extraction.

use super::calculations::sigma_for_kernel_size;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Gaussian smoothing kernel: odd side length and standard deviation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianKernel {
    pub size: usize,
    pub sigma: f32,
}

impl GaussianKernel {
    /// Kernel of the given odd size with sigma computed from the size.
    pub fn from_size(size: usize) -> Self {
        Self {
            size,
            sigma: sigma_for_kernel_size(size),
        }
    }

    /// The 15×15 kernel used by the blur filter.
    pub fn blur() -> Self {
        Self::from_size(15)
    }

    pub fn radius(self) -> usize {
        self.size / 2
    }
}

/// Low/high hysteresis thresholds for Canny edge detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CannyThresholds {
    pub low: f32,
    pub high: f32,
}

impl Default for CannyThresholds {
    fn default() -> Self {
        Self {
            low: 100.0,
            high: 200.0,
        }
    }
}

//! Pure calculation functions for the filters.
//!
//! All functions here are pure and testable without any I/O or images.

/// Standard deviation for a Gaussian kernel of the given size.
///
/// Uses the usual rule for "sigma = auto": `0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
///
/// ```
/// # use snapqr::imaging::calculations::sigma_for_kernel_size;
/// assert!((sigma_for_kernel_size(15) - 2.6).abs() < 1e-5);
/// ```
pub fn sigma_for_kernel_size(size: usize) -> f32 {
    0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// One-dimensional Gaussian weights, normalized to sum to 1.
///
/// The full 2D kernel is the outer product of this vector with itself, so
/// filters apply it once horizontally and once vertically.
pub fn gaussian_weights(size: usize, sigma: f32) -> Vec<f32> {
    let center = (size / 2) as f32;
    let denom = 2.0 * sigma * sigma;
    let raw: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / denom).exp()
        })
        .collect();
    let sum: f32 = raw.iter().sum();
    raw.into_iter().map(|w| w / sum).collect()
}

/// Map a possibly out-of-range coordinate back into `0..len` by mirroring
/// around the edge pixel (`gfedcb|abcdefgh|gfedcba`).
pub fn reflect_101(pos: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    let period = 2 * last;
    let mut p = pos.rem_euclid(period);
    if p > last {
        p = period - p;
    }
    p as usize
}

/// BT.601 luma of an RGB triple in 14-bit fixed point, rounded.
///
/// Weights are 0.299, 0.587, 0.114 scaled by 2^14 (4899, 9617, 1868), which
/// sum to exactly 16384 so white stays 255.
pub fn luma_bt601(r: u8, g: u8, b: u8) -> u8 {
    const SHIFT: u32 = 14;
    let acc = r as u32 * 4899 + g as u32 * 9617 + b as u32 * 1868 + (1 << (SHIFT - 1));
    (acc >> SHIFT) as u8
}

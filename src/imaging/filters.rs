//! The closed set of filters a user can apply to the current image.
//!
//! | Kind | Output | Implementation |
//! |---|---|---|
//! | `none` | input, borrowed | — |
//! | `grayscale` | 1 channel | BT.601 luma, 14-bit fixed point |
//! | `blur` | same channels | 15×15 Gaussian via `imageproc::filter::separable_filter_equal`, reflect-101 border |
//! | `edge-detection` | 1 channel, 0/255 | `imageproc::edges::canny` (100 / 200) on luma |
//!
//! Every filter is a pure function of its input: the same image and kind
//! always produce byte-identical output. Filter names that do not map onto a
//! [`FilterKind`] are an error, never a silent identity.

use super::calculations::{gaussian_weights, luma_bt601, reflect_101};
use super::params::{CannyThresholds, GaussianKernel};
use super::raster::Image;
use crate::error::{PipelineError, Result};
use image::{GrayImage, ImageBuffer, Luma, Pixel, Rgb, RgbImage};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// A named image transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    None,
    Grayscale,
    Blur,
    EdgeDetection,
}

impl FilterKind {
    pub const ALL: [FilterKind; 4] = [
        FilterKind::None,
        FilterKind::Grayscale,
        FilterKind::Blur,
        FilterKind::EdgeDetection,
    ];

    /// Canonical lowercase name, as accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            FilterKind::None => "none",
            FilterKind::Grayscale => "grayscale",
            FilterKind::Blur => "blur",
            FilterKind::EdgeDetection => "edge-detection",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            FilterKind::None => "Keep the image as it is",
            FilterKind::Grayscale => "Reduce color to a single luminance channel",
            FilterKind::Blur => "Gaussian smoothing over a 15x15 neighbourhood",
            FilterKind::EdgeDetection => "Canny edges (thresholds 100/200) as a black and white map",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = PipelineError;

    /// Case-insensitive; spaces and underscores count as dashes, so
    /// `"Edge Detection"` and `"edge_detection"` both parse.
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '_' => '-',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        FilterKind::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| PipelineError::UnsupportedFilter(s.to_string()))
    }
}

/// Apply `kind` to `image`.
///
/// `None` hands back the borrowed input; callers must not mutate it in place
/// while the original is still referenced elsewhere.
pub fn apply(image: &Image, kind: FilterKind) -> Cow<'_, Image> {
    match kind {
        FilterKind::None => Cow::Borrowed(image),
        FilterKind::Grayscale => match image {
            Image::Gray(_) => Cow::Borrowed(image),
            Image::Color(rgb) => Cow::Owned(Image::Gray(grayscale(rgb))),
        },
        FilterKind::Blur => Cow::Owned(blur(image, GaussianKernel::blur())),
        FilterKind::EdgeDetection => {
            Cow::Owned(Image::Gray(edges(image, CannyThresholds::default())))
        }
    }
}

/// Parse `name` and apply it. Unknown names fail with
/// [`PipelineError::UnsupportedFilter`].
pub fn apply_named<'a>(image: &'a Image, name: &str) -> Result<Cow<'a, Image>> {
    let kind: FilterKind = name.parse()?;
    Ok(apply(image, kind))
}

fn grayscale(rgb: &RgbImage) -> GrayImage {
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        Luma([luma_bt601(r, g, b)])
    })
}

fn luma_of(image: &Image) -> Cow<'_, GrayImage> {
    match image {
        Image::Gray(gray) => Cow::Borrowed(gray),
        Image::Color(rgb) => Cow::Owned(grayscale(rgb)),
    }
}

fn blur(image: &Image, kernel: GaussianKernel) -> Image {
    let weights = gaussian_weights(kernel.size, kernel.sigma);
    match image {
        Image::Gray(gray) => {
            Image::Gray(gaussian_reflect::<Luma<u8>, Luma<f32>>(gray, &weights, kernel.radius()))
        }
        Image::Color(rgb) => {
            Image::Color(gaussian_reflect::<Rgb<u8>, Rgb<f32>>(rgb, &weights, kernel.radius()))
        }
    }
}

fn edges(image: &Image, thresholds: CannyThresholds) -> GrayImage {
    let gray = luma_of(image);
    imageproc::edges::canny(&gray, thresholds.low, thresholds.high)
}

/// Separable convolution with reflect-101 borders.
///
/// `imageproc` clamps at the image edge, so the source is first mirrored
/// into an `f32` buffer padded by `radius` on every side. Every output pixel
/// of the cropped centre then only sees mirrored samples, and rounding
/// happens once when converting back to `u8`.
fn gaussian_reflect<P, F>(
    src: &ImageBuffer<P, Vec<u8>>,
    weights: &[f32],
    radius: usize,
) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
    F: Pixel<Subpixel = f32>,
{
    let (width, height) = src.dimensions();
    if width == 0 || height == 0 {
        return src.clone();
    }
    let (w, h) = (width as usize, height as usize);
    let channels = P::CHANNEL_COUNT as usize;
    let (pw, ph) = (w + 2 * radius, h + 2 * radius);
    let input = src.as_raw();

    let mut padded = ImageBuffer::<F, Vec<f32>>::new(pw as u32, ph as u32);
    let padded_raw: &mut [f32] = &mut padded;
    for py in 0..ph {
        let sy = reflect_101(py as isize - radius as isize, h);
        for px in 0..pw {
            let sx = reflect_101(px as isize - radius as isize, w);
            let from = (sy * w + sx) * channels;
            let to = (py * pw + px) * channels;
            for c in 0..channels {
                padded_raw[to + c] = f32::from(input[from + c]);
            }
        }
    }

    let smoothed = imageproc::filter::separable_filter_equal(&padded, weights);
    let smoothed_raw = smoothed.as_raw();

    let mut out = ImageBuffer::<P, Vec<u8>>::new(width, height);
    let output: &mut [u8] = &mut out;
    for y in 0..h {
        let row = ((y + radius) * pw + radius) * channels;
        let len = w * channels;
        for (dst, value) in output[y * len..(y + 1) * len]
            .iter_mut()
            .zip(&smoothed_raw[row..row + len])
        {
            *dst = value.round().clamp(0.0, 255.0) as u8;
        }
    }

    out
}

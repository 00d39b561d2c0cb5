//! In-memory image representation shared by every pipeline stage.
//!
//! The pipeline only ever deals with 8-bit images that have either one
//! channel (grayscale, edge maps) or three (color). Anything the decoder hands
//! back (alpha, 16-bit depth, float) is normalised into one of those two
//! shapes on the way in, so filters never need to match on more than two
//! cases.

use crate::error::{PipelineError, Result};
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};

/// Encodings accepted from uploads and capture programs.
const ACCEPTED_FORMATS: &[ImageFormat] = &[ImageFormat::Jpeg, ImageFormat::Png];

/// An 8-bit grayscale or RGB raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Image {
    Gray(GrayImage),
    Color(RgbImage),
}

impl Image {
    pub fn width(&self) -> u32 {
        match self {
            Image::Gray(img) => img.width(),
            Image::Color(img) => img.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            Image::Gray(img) => img.height(),
            Image::Color(img) => img.height(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// 1 for grayscale, 3 for color.
    pub fn channels(&self) -> u8 {
        match self {
            Image::Gray(_) => 1,
            Image::Color(_) => 3,
        }
    }

    /// Raw interleaved samples, row-major.
    pub fn as_raw(&self) -> &[u8] {
        match self {
            Image::Gray(img) => img.as_raw(),
            Image::Color(img) => img.as_raw(),
        }
    }

    /// Normalise any decoded image into 8-bit gray or 8-bit RGB.
    ///
    /// Alpha is dropped, not composited.
    pub fn from_dynamic(img: DynamicImage) -> Self {
        match img {
            DynamicImage::ImageLuma8(gray) => Image::Gray(gray),
            DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA16(_) => Image::Gray(img.to_luma8()),
            DynamicImage::ImageRgb8(rgb) => Image::Color(rgb),
            other => Image::Color(other.to_rgb8()),
        }
    }

    pub fn to_dynamic(&self) -> DynamicImage {
        match self {
            Image::Gray(img) => DynamicImage::ImageLuma8(img.clone()),
            Image::Color(img) => DynamicImage::ImageRgb8(img.clone()),
        }
    }

    /// Decode JPEG or PNG bytes. The format is sniffed from the content.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let format = sniff_format(bytes)?;
        let decoded = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| PipelineError::Decode(e.to_string()))?;
        Ok(Self::from_dynamic(decoded))
    }
}

/// Identify the encoding of `bytes`, rejecting anything but JPEG and PNG.
pub fn sniff_format(bytes: &[u8]) -> Result<ImageFormat> {
    if bytes.is_empty() {
        return Err(PipelineError::Decode("no image data".into()));
    }
    let format = image::guess_format(bytes)
        .map_err(|_| PipelineError::Decode("unrecognised image data".into()))?;
    if ACCEPTED_FORMATS.contains(&format) {
        Ok(format)
    } else {
        Err(PipelineError::Decode(format!(
            "{} images are not accepted",
            format.extensions_str().first().copied().unwrap_or("unknown")
        )))
    }
}

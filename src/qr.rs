//! QR encoding of share URLs.
//!
//! [`encode`] turns a URL into a [`QrArtifact`]: a grayscale raster with each
//! module drawn as a square block of pixels and a white quiet zone around the
//! symbol. The symbol version is picked automatically by `qrcode` as the
//! smallest that fits the data at the configured error-correction level.
//!
//! Encoding is deterministic: the same URL and [`QrSettings`] always produce
//! the same pixels. The only failure is data that exceeds the capacity of the
//! largest symbol (version 40) at the chosen level.

use crate::error::{PipelineError, Result};
use image::{GrayImage, Luma};
use qrcode::{Color, EcLevel, QrCode, Version};
use serde::{Deserialize, Serialize};

/// Error-correction level, as written in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorCorrection {
    /// ~7% recovery
    L,
    /// ~15% recovery
    #[default]
    M,
    /// ~25% recovery
    Q,
    /// ~30% recovery
    H,
}

impl From<ErrorCorrection> for EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::L => EcLevel::L,
            ErrorCorrection::M => EcLevel::M,
            ErrorCorrection::Q => EcLevel::Q,
            ErrorCorrection::H => EcLevel::H,
        }
    }
}

/// How a QR symbol is encoded and rasterised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrSettings {
    pub error_correction: ErrorCorrection,
    /// Side length of one module, in pixels.
    pub module_pixels: u32,
    /// Width of the white border, in modules.
    pub quiet_zone: u32,
}

impl Default for QrSettings {
    fn default() -> Self {
        Self {
            error_correction: ErrorCorrection::M,
            module_pixels: 10,
            quiet_zone: 4,
        }
    }
}

/// An encoded URL, ready to be stored or displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct QrArtifact {
    pub url: String,
    /// Symbol version (1–40).
    pub version: i16,
    /// Modules per side, excluding the quiet zone.
    pub modules: u32,
    pub image: GrayImage,
}

/// Encode `url` as a QR raster.
pub fn encode(url: &str, settings: &QrSettings) -> Result<QrArtifact> {
    let code = QrCode::with_error_correction_level(url.as_bytes(), settings.error_correction.into())
        .map_err(|e| PipelineError::Encode {
            what: "QR code",
            message: format!("{e} ({} bytes of data)", url.len()),
        })?;

    let version = match code.version() {
        Version::Normal(v) | Version::Micro(v) => v,
    };
    let modules = code.width() as u32;
    let image = rasterize(&code.to_colors(), modules, settings);

    Ok(QrArtifact {
        url: url.to_string(),
        version,
        modules,
        image,
    })
}

/// Draw the module grid: dark modules black, everything else white.
fn rasterize(colors: &[Color], modules: u32, settings: &QrSettings) -> GrayImage {
    let scale = settings.module_pixels.max(1);
    let border = settings.quiet_zone * scale;
    let side = modules * scale + 2 * border;
    let mut img = GrayImage::from_pixel(side, side, Luma([255]));

    for (i, color) in colors.iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }
        let mx = i as u32 % modules;
        let my = i as u32 / modules;
        for dy in 0..scale {
            for dx in 0..scale {
                img.put_pixel(border + mx * scale + dx, border + my * scale + dy, Luma([0]));
            }
        }
    }

    img
}

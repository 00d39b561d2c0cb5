//! Shared test utilities for the snapqr test suite.
//!
//! Provides synthetic image builders, in-memory encoders, a scratch
//! [`Store`] and a QR reader wrapper.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let (_tmp, store) = temp_store();
//! let png = encode_png(&gradient_rgb(100, 100));
//! ```

use image::{ImageEncoder, Rgb, RgbImage};
use tempfile::TempDir;

use crate::imaging::Quality;
use crate::store::Store;

// =========================================================================
// Synthetic images
// =========================================================================

/// Smooth RGB gradient: red follows x, green follows y, blue constant.
pub fn gradient_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
    })
}

/// Black/white checkerboard with square cells of `cell` pixels.
pub fn checkerboard_rgb(width: u32, height: u32, cell: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    })
}

/// Left half black, right half white.
pub fn split_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    })
}

// =========================================================================
// Encoders
// =========================================================================

pub fn encode_png(img: &RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
    buf
}

pub fn encode_jpeg(img: &RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, 95)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
    buf
}

// =========================================================================
// Storage
// =========================================================================

/// A [`Store`] rooted in a fresh temp directory. Keep the `TempDir` alive for
/// as long as the store is used.
pub fn temp_store() -> (TempDir, Store) {
    let tmp = TempDir::new().unwrap();
    let store = Store::open(
        tmp.path().join("images"),
        tmp.path().join("qr_codes"),
        Quality::default(),
    )
    .unwrap();
    (tmp, store)
}

// =========================================================================
// QR reading
// =========================================================================

/// Decode the single QR symbol in a grayscale raster. Panics if none found.
pub fn read_qr(img: &image::GrayImage) -> String {
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        img.width() as usize,
        img.height() as usize,
        |x, y| img.get_pixel(x as u32, y as u32).0[0],
    );
    let grids = prepared.detect_grids();
    assert_eq!(grids.len(), 1, "expected exactly one QR symbol");
    let (_meta, content) = grids[0].decode().unwrap();
    content
}

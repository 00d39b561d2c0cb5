//! Filesystem persistence for images and QR codes.
//!
//! The pipeline stages never touch the disk themselves; the [`Store`] is the
//! collaborator that does. It owns two directories:
//!
//! ```text
//! static/
//! ├── images/      # captures, uploads, filter results (addressed by ImageReference)
//! └── qr_codes/    # QR artifacts as PNG
//! ```
//!
//! Both are created when the store is opened. Writes are plain
//! create-or-truncate: last write wins, and unique names keep two
//! operations from writing to the same file.
//!
//! | Content | Encoding |
//! |---|---|
//! | Capture / filter result | JPEG at the configured quality |
//! | Upload | original bytes, untouched |
//! | QR artifact | PNG |

use crate::error::{PipelineError, Result};
use crate::imaging::{Image, Quality};
use crate::naming::ImageReference;
use crate::qr::QrArtifact;
use image::ImageEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct Store {
    images_dir: PathBuf,
    qr_dir: PathBuf,
    jpeg_quality: Quality,
}

impl Store {
    /// Open a store, creating both output directories if absent.
    pub fn open(
        images_dir: impl Into<PathBuf>,
        qr_dir: impl Into<PathBuf>,
        jpeg_quality: Quality,
    ) -> Result<Self> {
        let images_dir = images_dir.into();
        let qr_dir = qr_dir.into();
        for dir in [&images_dir, &qr_dir] {
            fs::create_dir_all(dir).map_err(|e| PipelineError::storage(dir, e))?;
        }
        Ok(Self {
            images_dir,
            qr_dir,
            jpeg_quality,
        })
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    pub fn qr_dir(&self) -> &Path {
        &self.qr_dir
    }

    pub fn image_path(&self, reference: &ImageReference) -> PathBuf {
        self.images_dir.join(reference.as_str())
    }

    pub fn qr_path(&self, reference: &ImageReference) -> PathBuf {
        self.qr_dir.join(reference.as_str())
    }

    /// Encode `image` as JPEG and write it under `reference`.
    pub fn save_jpeg(&self, image: &Image, reference: &ImageReference) -> Result<PathBuf> {
        let bytes = encode_jpeg(image, self.jpeg_quality)?;
        let path = self.image_path(reference);
        write_file(&path, &bytes)?;
        Ok(path)
    }

    /// Write already-encoded image bytes under `reference`, unchanged.
    pub fn save_bytes(&self, bytes: &[u8], reference: &ImageReference) -> Result<PathBuf> {
        let path = self.image_path(reference);
        write_file(&path, bytes)?;
        Ok(path)
    }

    /// Encode a QR artifact as PNG and write it under `reference`.
    pub fn save_qr(&self, artifact: &QrArtifact, reference: &ImageReference) -> Result<PathBuf> {
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(
                artifact.image.as_raw(),
                artifact.image.width(),
                artifact.image.height(),
                image::ExtendedColorType::L8,
            )
            .map_err(|e| PipelineError::Encode {
                what: "QR PNG",
                message: e.to_string(),
            })?;
        let path = self.qr_path(reference);
        write_file(&path, &bytes)?;
        Ok(path)
    }

    /// Read and decode the image stored under `reference`.
    pub fn load_image(&self, reference: &ImageReference) -> Result<Image> {
        let path = self.image_path(reference);
        let bytes = fs::read(&path).map_err(|e| PipelineError::storage(&path, e))?;
        Image::decode(&bytes)
    }

    /// Copy a stored image out of the store.
    ///
    /// If `dest` is an existing directory the file keeps its stored name.
    /// Exporting onto the stored file itself is a no-op: copying a file over
    /// itself would truncate it.
    pub fn export(&self, reference: &ImageReference, dest: &Path) -> Result<PathBuf> {
        let source = self.image_path(reference);
        let source_real =
            fs::canonicalize(&source).map_err(|e| PipelineError::storage(&source, e))?;
        let target = if dest.is_dir() {
            dest.join(reference.as_str())
        } else {
            dest.to_path_buf()
        };
        if fs::canonicalize(&target).is_ok_and(|t| t == source_real) {
            debug!(path = %target.display(), "export target is the stored file");
            return Ok(target);
        }
        fs::copy(&source, &target).map_err(|e| PipelineError::storage(&target, e))?;
        debug!(from = %source.display(), to = %target.display(), "exported image");
        Ok(target)
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|e| PipelineError::storage(path, e))?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote file");
    Ok(())
}

fn encode_jpeg(image: &Image, quality: Quality) -> Result<Vec<u8>> {
    let color_type = match image {
        Image::Gray(_) => image::ExtendedColorType::L8,
        Image::Color(_) => image::ExtendedColorType::Rgb8,
    };
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.value())
        .write_image(image.as_raw(), image.width(), image.height(), color_type)
        .map_err(|e| PipelineError::Encode {
            what: "JPEG",
            message: e.to_string(),
        })?;
    Ok(bytes)
}

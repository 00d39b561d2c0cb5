//! The image pipeline: acquire → filter → name → share.
//!
//! [`Pipeline`] wires the pure stages to a [`Store`]. It holds no "current
//! image": every operation takes the reference to work on and returns the
//! reference it produced, and the caller threads it to the next step.
//!
//! | Operation | Reads | Writes |
//! |---|---|---|
//! | [`capture`](Pipeline::capture) | frame source | `captured_….jpg` |
//! | [`upload`](Pipeline::upload) | bytes | `uploaded_….{jpg,png}` (verbatim) |
//! | [`apply_filter`](Pipeline::apply_filter) | stored image | `filtered_….jpg` (nothing for `none`) |
//! | [`share`](Pipeline::share) | stored image name | `qr_….png` |
//!
//! A failing stage writes nothing.

use crate::acquire::{self, FrameSource};
use crate::error::{PipelineError, Result};
use crate::imaging::{self, FilterKind, Image};
use crate::naming::{ImageReference, Origin, fresh_reference};
use crate::qr::{self, QrSettings};
use crate::store::Store;
use serde::Serialize;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// A stored image and its shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stored {
    pub reference: ImageReference,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    /// Filter that produced this image, if any.
    pub filter: Option<&'static str>,
}

impl Stored {
    fn new(reference: ImageReference, path: PathBuf, image: &Image) -> Self {
        Self {
            reference,
            path,
            width: image.width(),
            height: image.height(),
            channels: image.channels(),
            filter: None,
        }
    }
}

/// A freshly acquired image, kept decoded so a filter can follow without a
/// round trip through the file.
#[derive(Debug, Clone)]
pub struct Acquired {
    pub stored: Stored,
    pub image: Image,
}

/// Result of sharing a stored image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shared {
    pub reference: ImageReference,
    pub url: String,
    pub qr_reference: ImageReference,
    pub qr_path: PathBuf,
    pub qr_version: i16,
    pub qr_modules: u32,
    pub qr_pixels: u32,
}

pub struct Pipeline {
    store: Store,
    base_url: String,
    qr: QrSettings,
}

impl Pipeline {
    pub fn new(store: Store, base_url: impl Into<String>, qr: QrSettings) -> Self {
        Self {
            store,
            base_url: base_url.into(),
            qr,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Grab one frame and store it as `captured_<ts>_<token>.jpg`.
    pub fn capture(&self, source: &mut dyn FrameSource) -> Result<Acquired> {
        let image = acquire::capture(source)?;
        let reference = fresh_reference(Origin::Captured, "jpg");
        let path = self.store.save_jpeg(&image, &reference)?;
        info!(reference = %reference, "stored capture");
        Ok(Acquired {
            stored: Stored::new(reference, path, &image),
            image,
        })
    }

    /// Validate uploaded bytes and store them unchanged as
    /// `uploaded_<ts>_<token>.<jpg|png>`.
    pub fn upload(&self, bytes: &[u8], file_name: Option<&str>) -> Result<Acquired> {
        let upload = acquire::upload(bytes, file_name)?;
        let reference = fresh_reference(Origin::Uploaded, upload.extension());
        let path = self.store.save_bytes(bytes, &reference)?;
        info!(reference = %reference, original = file_name.unwrap_or("-"), "stored upload");
        Ok(Acquired {
            stored: Stored::new(reference, path, &upload.image),
            image: upload.image,
        })
    }

    /// Read a file from disk and [`upload`](Self::upload) it under its own name.
    pub fn upload_file(&self, file: &Path) -> Result<Acquired> {
        let bytes = fs::read(file).map_err(|e| PipelineError::storage(file, e))?;
        let name = file.file_name().map(|n| n.to_string_lossy());
        self.upload(&bytes, name.as_deref())
    }

    /// Load the image stored under `reference` and filter it.
    pub fn apply_filter(&self, reference: &ImageReference, kind: FilterKind) -> Result<Stored> {
        let image = self.store.load_image(reference)?;
        self.filter_image(&image, reference, kind)
    }

    /// Filter an already decoded image that is stored under `reference`.
    ///
    /// `FilterKind::None` writes nothing and hands back `reference` itself.
    /// Anything else stores a new `filtered_<ts>_<token>.jpg`; the source
    /// file is left as it was.
    pub fn filter_image(
        &self,
        image: &Image,
        reference: &ImageReference,
        kind: FilterKind,
    ) -> Result<Stored> {
        match imaging::apply(image, kind) {
            Cow::Borrowed(unchanged) => {
                let mut stored = Stored::new(
                    reference.clone(),
                    self.store.image_path(reference),
                    unchanged,
                );
                if kind != FilterKind::None {
                    stored.filter = Some(kind.name());
                }
                Ok(stored)
            }
            Cow::Owned(filtered) => {
                let new_ref = fresh_reference(Origin::Filtered, "jpg");
                let path = self.store.save_jpeg(&filtered, &new_ref)?;
                info!(from = %reference, to = %new_ref, filter = kind.name(), "stored filter result");
                let mut stored = Stored::new(new_ref, path, &filtered);
                stored.filter = Some(kind.name());
                Ok(stored)
            }
        }
    }

    /// The public URL of a stored image.
    pub fn url_for(&self, reference: &ImageReference) -> String {
        share_url(&self.base_url, reference)
    }

    /// Build the share URL for `reference` and store its QR code as
    /// `qr_<ts>_<token>.png`.
    pub fn share(&self, reference: &ImageReference) -> Result<Shared> {
        let image_path = self.store.image_path(reference);
        if !image_path.is_file() {
            return Err(PipelineError::storage(
                image_path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no stored image with this name"),
            ));
        }

        let url = self.url_for(reference);
        let artifact = qr::encode(&url, &self.qr)?;
        let qr_reference = fresh_reference(Origin::Qr, "png");
        let qr_path = self.store.save_qr(&artifact, &qr_reference)?;
        info!(reference = %reference, qr = %qr_reference, %url, "stored QR code");

        Ok(Shared {
            reference: reference.clone(),
            url,
            qr_reference,
            qr_path,
            qr_version: artifact.version,
            qr_modules: artifact.modules,
            qr_pixels: artifact.image.width(),
        })
    }
}

/// `<base>/<name>`, without doubling a trailing slash on `base`.
pub fn share_url(base_url: &str, reference: &ImageReference) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquire::tests::FakeSource;
    use crate::naming::parse_reference;
    use crate::test_helpers::{encode_png, gradient_rgb, read_qr, temp_store};

    const BASE: &str = "http://example.com/images";

    fn pipeline() -> (tempfile::TempDir, Pipeline) {
        let (tmp, store) = temp_store();
        (tmp, Pipeline::new(store, BASE, QrSettings::default()))
    }

    fn file_count(dir: &std::path::Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn capture_stores_a_jpeg() {
        let (_tmp, pipeline) = pipeline();
        let mut source = FakeSource::with_frame(Image::Color(gradient_rgb(64, 48)));
        let acquired = pipeline.capture(&mut source).unwrap();

        let stored = &acquired.stored;
        assert!(stored.reference.as_str().starts_with("captured_"));
        assert_eq!(stored.reference.extension().as_deref(), Some("jpg"));
        assert_eq!((stored.width, stored.height, stored.channels), (64, 48, 3));
        assert!(stored.path.is_file());
        let reloaded = pipeline.store().load_image(&stored.reference).unwrap();
        assert_eq!(reloaded.dimensions(), (64, 48));
    }

    #[test]
    fn failed_capture_writes_nothing() {
        let (_tmp, pipeline) = pipeline();
        let mut source = FakeSource::failing(PipelineError::CaptureFailed("blank".into()));
        assert!(matches!(
            pipeline.capture(&mut source),
            Err(PipelineError::CaptureFailed(_))
        ));
        assert_eq!(file_count(pipeline.store().images_dir()), 0);
    }

    #[test]
    fn upload_stores_original_bytes() {
        let (_tmp, pipeline) = pipeline();
        let png = encode_png(&gradient_rgb(100, 100));
        let acquired = pipeline.upload(&png, Some("test.png")).unwrap();

        assert!(acquired.stored.reference.as_str().starts_with("uploaded_"));
        assert_eq!(acquired.stored.reference.extension().as_deref(), Some("png"));
        assert_eq!(fs::read(&acquired.stored.path).unwrap(), png);
        assert_eq!(acquired.image.dimensions(), (100, 100));
    }

    #[test]
    fn upload_file_uses_the_file_name() {
        let (tmp, pipeline) = pipeline();
        let file = tmp.path().join("holiday.png");
        let png = encode_png(&gradient_rgb(12, 12));
        fs::write(&file, &png).unwrap();

        let acquired = pipeline.upload_file(&file).unwrap();
        assert_eq!(acquired.stored.reference.extension().as_deref(), Some("png"));
        assert_eq!(fs::read(&acquired.stored.path).unwrap(), png);

        let gif = tmp.path().join("holiday.gif");
        fs::write(&gif, &png).unwrap();
        assert!(matches!(
            pipeline.upload_file(&gif),
            Err(PipelineError::Decode(_))
        ));
    }

    #[test]
    fn upload_file_missing_is_storage_error() {
        let (tmp, pipeline) = pipeline();
        let missing = tmp.path().join("nowhere.png");
        match pipeline.upload_file(&missing).unwrap_err() {
            PipelineError::Storage { path, .. } => assert_eq!(path, missing),
            other => panic!("expected storage error, got {other}"),
        }
        assert_eq!(file_count(pipeline.store().images_dir()), 0);
    }

    #[test]
    fn rejected_upload_writes_nothing() {
        let (_tmp, pipeline) = pipeline();
        let err = pipeline.upload(b"GIF89a...", Some("anim.gif")).unwrap_err();
        assert!(matches!(err, PipelineError::Decode(_)));
        assert_eq!(file_count(pipeline.store().images_dir()), 0);
    }

    #[test]
    fn none_filter_keeps_the_reference() {
        let (_tmp, pipeline) = pipeline();
        let png = encode_png(&gradient_rgb(20, 20));
        let acquired = pipeline.upload(&png, None).unwrap();

        let result = pipeline
            .apply_filter(&acquired.stored.reference, FilterKind::None)
            .unwrap();
        assert_eq!(result.reference, acquired.stored.reference);
        assert_eq!(result.filter, None);
        assert_eq!(file_count(pipeline.store().images_dir()), 1);
    }

    #[test]
    fn grayscale_filter_creates_a_new_reference() {
        let (_tmp, pipeline) = pipeline();
        let png = encode_png(&gradient_rgb(100, 100));
        let acquired = pipeline.upload(&png, Some("test.png")).unwrap();

        let filtered = pipeline
            .apply_filter(&acquired.stored.reference, FilterKind::Grayscale)
            .unwrap();
        assert_ne!(filtered.reference, acquired.stored.reference);
        assert!(filtered.reference.as_str().starts_with("filtered_"));
        assert_eq!(filtered.filter, Some("grayscale"));
        assert_eq!((filtered.width, filtered.height, filtered.channels), (100, 100, 1));

        // The original keeps its bytes.
        assert_eq!(fs::read(&acquired.stored.path).unwrap(), png);
        let reloaded = pipeline.store().load_image(&filtered.reference).unwrap();
        assert_eq!(reloaded.channels(), 1);
    }

    #[test]
    fn grayscale_of_gray_input_writes_nothing() {
        let (_tmp, pipeline) = pipeline();
        let png = encode_png(&gradient_rgb(30, 30));
        let acquired = pipeline.upload(&png, None).unwrap();
        let gray = pipeline
            .apply_filter(&acquired.stored.reference, FilterKind::Grayscale)
            .unwrap();

        let again = pipeline
            .apply_filter(&gray.reference, FilterKind::Grayscale)
            .unwrap();
        assert_eq!(again.reference, gray.reference);
        assert_eq!(file_count(pipeline.store().images_dir()), 2);
    }

    #[test]
    fn repeated_filters_never_overwrite() {
        let (_tmp, pipeline) = pipeline();
        let acquired = pipeline
            .upload(&encode_png(&gradient_rgb(32, 32)), None)
            .unwrap();
        let a = pipeline
            .filter_image(&acquired.image, &acquired.stored.reference, FilterKind::Blur)
            .unwrap();
        let b = pipeline
            .filter_image(&acquired.image, &acquired.stored.reference, FilterKind::Blur)
            .unwrap();
        assert_ne!(a.reference, b.reference);
        assert_eq!(fs::read(&a.path).unwrap(), fs::read(&b.path).unwrap());
        assert_eq!(file_count(pipeline.store().images_dir()), 3);
    }

    #[test]
    fn edge_detection_is_single_channel() {
        let (_tmp, pipeline) = pipeline();
        let acquired = pipeline
            .upload(&encode_png(&gradient_rgb(40, 40)), None)
            .unwrap();
        let edges = pipeline
            .filter_image(
                &acquired.image,
                &acquired.stored.reference,
                FilterKind::EdgeDetection,
            )
            .unwrap();
        assert_eq!(edges.channels, 1);
        assert_eq!(edges.filter, Some("edge-detection"));
    }

    #[test]
    fn filtering_a_missing_reference_is_storage_error() {
        let (_tmp, pipeline) = pipeline();
        let reference = ImageReference::parse("ghost.jpg").unwrap();
        let err = pipeline
            .apply_filter(&reference, FilterKind::Blur)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Storage { .. }));
    }

    #[test]
    fn share_url_does_not_double_slashes() {
        let r = ImageReference::parse("a.jpg").unwrap();
        assert_eq!(share_url("http://h/images", &r), "http://h/images/a.jpg");
        assert_eq!(share_url("http://h/images/", &r), "http://h/images/a.jpg");
    }

    #[test]
    fn share_writes_a_scannable_qr() {
        let (_tmp, pipeline) = pipeline();
        let acquired = pipeline
            .upload(&encode_png(&gradient_rgb(16, 16)), None)
            .unwrap();
        let shared = pipeline.share(&acquired.stored.reference).unwrap();

        assert_eq!(
            shared.url,
            format!("{BASE}/{}", acquired.stored.reference)
        );
        assert!(shared.qr_path.starts_with(pipeline.store().qr_dir()));
        let parsed = parse_reference(&shared.qr_reference).unwrap();
        assert_eq!(parsed.extension, "png");

        let qr_image = image::open(&shared.qr_path).unwrap().to_luma8();
        assert_eq!(qr_image.width(), shared.qr_pixels);
        assert_eq!(read_qr(&qr_image), shared.url);
    }

    #[test]
    fn sharing_twice_gives_distinct_qr_files() {
        let (_tmp, pipeline) = pipeline();
        let acquired = pipeline
            .upload(&encode_png(&gradient_rgb(16, 16)), None)
            .unwrap();
        let a = pipeline.share(&acquired.stored.reference).unwrap();
        let b = pipeline.share(&acquired.stored.reference).unwrap();
        assert_ne!(a.qr_reference, b.qr_reference);
        assert_eq!(a.url, b.url);
        assert_eq!(file_count(pipeline.store().qr_dir()), 2);
    }

    #[test]
    fn sharing_a_missing_reference_writes_nothing() {
        let (_tmp, pipeline) = pipeline();
        let reference = ImageReference::parse("ghost.jpg").unwrap();
        let err = pipeline.share(&reference).unwrap_err();
        assert!(matches!(err, PipelineError::Storage { .. }));
        assert_eq!(file_count(pipeline.store().qr_dir()), 0);
    }
}

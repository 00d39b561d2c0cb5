//! Source acquisition: camera capture and upload decoding.
//!
//! Capture goes through the [`FrameSource`] trait so the rest of the pipeline
//! never talks to hardware directly. Implementations:
//!
//! | Source | How it gets a frame |
//! |---|---|
//! | [`CommandSource`] | runs an external capture program (default `ffmpeg` over v4l2) and decodes its stdout |
//! | `NativeCamera` | opens the camera through `nokhwa` (cargo feature `camera`) |
//!
//! Uploads need no trait: they are just bytes plus an optional file name.
//!
//! Neither path persists anything. Storing the result is the caller's job.

mod command;
#[cfg(feature = "camera")]
mod native;

pub use command::CommandSource;
#[cfg(feature = "camera")]
pub use native::NativeCamera;

use crate::error::{PipelineError, Result};
use crate::imaging::Image;
use crate::imaging::raster::sniff_format;
use image::ImageFormat;
use std::path::Path;
use tracing::{debug, info};

/// Upload file extensions that are accepted.
pub const UPLOAD_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Something that can hand over a single frame on request.
///
/// `grab_frame` blocks until a frame arrives or the device gives up. Errors
/// must distinguish a missing/unopenable device
/// ([`PipelineError::DeviceUnavailable`]) from a device that opened but
/// produced nothing usable ([`PipelineError::CaptureFailed`]).
pub trait FrameSource {
    /// Short human-readable description, used in logs.
    fn describe(&self) -> String;

    /// Grab exactly one frame.
    fn grab_frame(&mut self) -> Result<Image>;
}

/// Capture one frame from `source`.
pub fn capture(source: &mut dyn FrameSource) -> Result<Image> {
    info!(source = %source.describe(), "capturing frame");
    let frame = source.grab_frame()?;
    debug!(
        width = frame.width(),
        height = frame.height(),
        channels = frame.channels(),
        "frame captured"
    );
    Ok(frame)
}

/// A decoded upload, with the encoding it arrived in.
#[derive(Debug, Clone)]
pub struct Upload {
    pub image: Image,
    pub format: ImageFormat,
}

impl Upload {
    /// Canonical extension for storing the original bytes.
    pub fn extension(&self) -> &'static str {
        match self.format {
            ImageFormat::Png => "png",
            _ => "jpg",
        }
    }
}

/// Decode uploaded bytes.
///
/// If `file_name` has an extension it must be one of [`UPLOAD_EXTENSIONS`];
/// the content itself must sniff as JPEG or PNG either way.
pub fn upload(bytes: &[u8], file_name: Option<&str>) -> Result<Upload> {
    if let Some(ext) = file_name
        .and_then(|name| Path::new(name).extension())
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        && !UPLOAD_EXTENSIONS.contains(&ext.as_str())
    {
        return Err(PipelineError::Decode(format!(
            "'.{ext}' files are not accepted (use .jpg, .jpeg or .png)"
        )));
    }
    let format = sniff_format(bytes)?;
    let image = Image::decode(bytes)?;
    debug!(
        name = file_name.unwrap_or("<unnamed>"),
        ?format,
        width = image.width(),
        height = image.height(),
        "upload decoded"
    );
    Ok(Upload { image, format })
}

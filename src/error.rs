//! Error taxonomy for the image pipeline.
//!
//! Every stage returns [`PipelineError`] and propagates it immediately. There
//! are no retries and no fallbacks: the user re-triggers the action. Each
//! variant renders a distinct message that says what went wrong and what to
//! check.

use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the pipeline.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// No camera present, or the device could not be opened.
    #[error("Camera unavailable: {0}")]
    DeviceUnavailable(String),

    /// The device opened but did not yield a usable frame.
    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    /// Bytes are not a JPEG or PNG image.
    #[error("Could not decode image (expected JPEG or PNG): {0}")]
    Decode(String),

    /// Filter name outside the supported set.
    #[error("Unsupported filter '{0}' (expected one of: none, grayscale, blur, edge-detection)")]
    UnsupportedFilter(String),

    /// Image or QR encoding failed.
    #[error("Failed to encode {what}: {message}")]
    Encode { what: &'static str, message: String },

    /// Reading or writing the output directories failed.
    #[error("Storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reference text that cannot name a stored file.
    #[error("Invalid image reference '{0}' (expected a bare file name of letters, digits, '.', '_' or '-')")]
    InvalidReference(String),
}

impl PipelineError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }
}

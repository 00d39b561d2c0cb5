//! # snapqr
//!
//! Capture or upload a photo, apply one of a few fixed filters, and get a QR
//! code that links to the result.
//!
//! # Architecture: Four-Stage Pipeline
//!
//! ```text
//! 1. Acquire   camera frame | uploaded bytes  →  Image + captured_/uploaded_ file
//! 2. Filter    Image + FilterKind             →  Image + filtered_ file (optional)
//! 3. Name      every new file                 →  <prefix>_<secs>_<uuid>.<ext>
//! 4. Share     ImageReference                 →  URL + qr_ PNG
//! ```
//!
//! Stages are plain functions from one value to the next. There is no
//! "current image" held anywhere: the caller gets an
//! [`ImageReference`](naming::ImageReference) back from each step and passes
//! it to the next. A filter never overwrites its input, so an old reference
//! keeps pointing at the bytes it was created for.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`acquire`] | Stage 1: `FrameSource` trait, external-command and native camera sources, upload decoding |
//! | [`imaging`] | Stage 2: the [`Image`](imaging::Image) type and the grayscale / blur / edge filters |
//! | [`naming`] | Stage 3: unique, URL-safe file names and their parser |
//! | [`qr`] | Stage 4: URL → QR raster |
//! | [`store`] | Filesystem persistence (images directory, QR directory) |
//! | [`pipeline`] | Ties the stages to a store and builds share URLs |
//! | [`config`] | `snapqr.toml` loading, merging over defaults, validation |
//! | [`error`] | `PipelineError` taxonomy |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`output`] | CLI output formatting and the `--json` report |
//!
//! # Design Decisions
//!
//! ## Camera Behind a Trait
//!
//! Capture goes through [`acquire::FrameSource`]. The default source runs an
//! external program (ffmpeg over v4l2) so the binary needs no native camera
//! libraries; a direct `nokhwa` source is available with the `camera`
//! feature. Tests use a scripted in-memory source.
//!
//! ## Unknown Filters Are Errors
//!
//! Filter names are parsed into a closed [`FilterKind`](imaging::FilterKind).
//! Anything outside it is rejected with
//! [`PipelineError::UnsupportedFilter`](error::PipelineError::UnsupportedFilter)
//! rather than silently passing the image through.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding and encoding use the `image` crate, edge detection uses
//! `imageproc`, and QR symbols come from `qrcode`. No system libraries are
//! needed for anything but native camera access.

pub mod acquire;
pub mod config;
pub mod error;
pub mod imaging;
pub mod logging;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod qr;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;

//! Image representation and filters. Pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** (JPEG, PNG) | `image::load_from_memory_with_format` |
//! | **Grayscale** | BT.601 fixed-point luma |
//! | **Blur** | separable 15×15 Gaussian |
//! | **Edge detection** | `imageproc::edges::canny` |
//!
//! The module is split into:
//! - **Raster**: the [`Image`] type every stage passes around
//! - **Calculations**: pure kernel/colour math (unit testable)
//! - **Parameters**: data structures describing filter settings
//! - **Filters**: [`FilterKind`] and [`apply`]

pub mod calculations;
pub mod filters;
mod params;
pub mod raster;

pub use filters::{FilterKind, apply, apply_named};
pub use params::{CannyThresholds, GaussianKernel, Quality};
pub use raster::Image;

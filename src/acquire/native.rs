//! Direct camera capture through `nokhwa`.
//!
//! Opens the camera, grabs a single RGB frame, and stops the stream again.
//! Only compiled with the `camera` feature.

use super::FrameSource;
use crate::error::{PipelineError, Result};
use crate::imaging::Image;
use nokhwa::Camera;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use tracing::warn;

pub struct NativeCamera {
    index: u32,
}

impl NativeCamera {
    pub fn new(index: u32) -> Self {
        Self { index }
    }
}

impl FrameSource for NativeCamera {
    fn describe(&self) -> String {
        format!("camera #{}", self.index)
    }

    fn grab_frame(&mut self) -> Result<Image> {
        let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(self.index), format)
            .map_err(|e| PipelineError::DeviceUnavailable(format!("camera #{}: {e}", self.index)))?;
        camera
            .open_stream()
            .map_err(|e| PipelineError::DeviceUnavailable(format!("camera #{}: {e}", self.index)))?;

        let frame = camera.frame();
        if let Err(e) = camera.stop_stream() {
            warn!("camera #{} stop stream failed: {e}", self.index);
        }

        let rgb = frame
            .and_then(|buffer| buffer.decode_image::<RgbFormat>())
            .map_err(|e| PipelineError::CaptureFailed(format!("camera #{}: {e}", self.index)))?;
        Ok(Image::Color(rgb))
    }
}

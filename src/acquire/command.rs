//! Frame capture through an external program.
//!
//! The program is expected to write a single JPEG or PNG frame to stdout.
//! The default configuration asks ffmpeg for one PNG frame from a v4l2
//! device:
//!
//! ```text
//! ffmpeg -hide_banner -loglevel error -f v4l2 -i /dev/video0 \
//!        -frames:v 1 -c:v png -f image2pipe -
//! ```
//!
//! `{device}` in any argument is replaced by the configured device path.
//!
//! | Situation | Error |
//! |---|---|
//! | device path missing | `DeviceUnavailable` |
//! | program cannot be started | `DeviceUnavailable` |
//! | program exits non-zero | `CaptureFailed` (with the tail of stderr) |
//! | empty or undecodable stdout | `CaptureFailed` |

use super::FrameSource;
use crate::error::{PipelineError, Result};
use crate::imaging::Image;
use std::path::PathBuf;
use tracing::{debug, warn};

const DEVICE_PLACEHOLDER: &str = "{device}";
const STDERR_TAIL: usize = 400;

/// Captures by running `program args…` and decoding what it prints.
#[derive(Debug, Clone)]
pub struct CommandSource {
    device: PathBuf,
    program: String,
    args: Vec<String>,
}

impl CommandSource {
    pub fn new(device: impl Into<PathBuf>, program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            device: device.into(),
            program: program.into(),
            args,
        }
    }

    /// Arguments with `{device}` substituted.
    pub fn resolved_args(&self) -> Vec<String> {
        let device = self.device.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace(DEVICE_PLACEHOLDER, &device))
            .collect()
    }
}

impl FrameSource for CommandSource {
    fn describe(&self) -> String {
        format!("{} via {}", self.device.display(), self.program)
    }

    fn grab_frame(&mut self) -> Result<Image> {
        if !self.device.exists() {
            return Err(PipelineError::DeviceUnavailable(format!(
                "no camera at {}",
                self.device.display()
            )));
        }

        let args = self.resolved_args();
        debug!(program = %self.program, ?args, "running capture command");
        let output = duct::cmd(self.program.as_str(), &args)
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()
            .map_err(|e| {
                PipelineError::DeviceUnavailable(format!("cannot run '{}': {e}", self.program))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail = tail_chars(stderr.trim(), STDERR_TAIL);
            warn!(status = %output.status, "capture command failed");
            return Err(PipelineError::CaptureFailed(format!(
                "'{}' exited with {}: {tail}",
                self.program, output.status
            )));
        }
        if output.stdout.is_empty() {
            return Err(PipelineError::CaptureFailed(format!(
                "'{}' produced no frame",
                self.program
            )));
        }

        Image::decode(&output.stdout).map_err(|e| {
            PipelineError::CaptureFailed(format!("frame from '{}' unreadable: {e}", self.program))
        })
    }
}

fn tail_chars(text: &str, max: usize) -> &str {
    match text.char_indices().rev().nth(max.saturating_sub(1)) {
        Some((idx, _)) if max > 0 => &text[idx..],
        _ => text,
    }
}

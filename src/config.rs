//! Application configuration.
//!
//! Handles loading and validating `snapqr.toml`. Every section falls back to
//! its defaults, so the file only needs the keys being changed. A missing
//! file simply means "all defaults"; command-line flags are applied on top
//! by the binary.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [storage]
//! images_dir = "static/images"     # Captures, uploads and filter results
//! qr_dir = "static/qr_codes"       # Generated QR codes
//!
//! [share]
//! base_url = "http://localhost:8000/images"  # Prefix for shared image URLs
//!
//! [output]
//! jpeg_quality = 90                # Quality for captured/filtered JPEGs (1-100)
//!
//! [qr]
//! error_correction = "M"           # L, M, Q or H
//! module_pixels = 10               # Pixels per QR module
//! quiet_zone = 4                   # White border, in modules
//!
//! [camera]
//! backend = "command"              # "command" or "native" (needs the camera feature)
//! device = "/dev/video0"
//! index = 0                        # Camera index for the native backend
//! program = "ffmpeg"
//! args = ["-hide_banner", "-loglevel", "error", "-f", "v4l2", "-i", "{device}",
//!         "-frames:v", "1", "-c:v", "png", "-f", "image2pipe", "-"]
//!
//! [logging]
//! level = "info"                   # trace, debug, info, warn, error
//! format = "pretty"                # pretty or json
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::qr::{ErrorCorrection, QrSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "snapqr.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `snapqr.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Output directories.
    pub storage: StorageConfig,
    /// How stored images are addressed from outside.
    pub share: ShareConfig,
    /// Encoding of stored images.
    pub output: OutputConfig,
    /// QR symbol and raster settings.
    pub qr: QrConfig,
    /// Frame source settings.
    pub camera: CameraConfig,
    /// Log level and format.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(ConfigError::Validation(
                "output.jpeg_quality must be 1-100".into(),
            ));
        }
        if !(1..=64).contains(&self.qr.module_pixels) {
            return Err(ConfigError::Validation(
                "qr.module_pixels must be 1-64".into(),
            ));
        }
        if self.qr.quiet_zone > 16 {
            return Err(ConfigError::Validation("qr.quiet_zone must be 0-16".into()));
        }
        let base = self.share.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "share.base_url must start with http:// or https:// (got '{base}')"
            )));
        }
        if self.storage.images_dir.as_os_str().is_empty() || self.storage.qr_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "storage.images_dir and storage.qr_dir must not be empty".into(),
            ));
        }
        if self.camera.backend == CameraBackend::Command && self.camera.program.trim().is_empty() {
            return Err(ConfigError::Validation(
                "camera.program must not be empty".into(),
            ));
        }
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {LOG_LEVELS:?}"
            )));
        }
        Ok(())
    }

    /// QR settings in the form the encoder takes.
    pub fn qr_settings(&self) -> QrSettings {
        QrSettings {
            error_correction: self.qr.error_correction,
            module_pixels: self.qr.module_pixels,
            quiet_zone: self.qr.quiet_zone,
        }
    }
}

/// Output directory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Where captures, uploads and filter results are written.
    pub images_dir: PathBuf,
    /// Where QR codes are written.
    pub qr_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from("static/images"),
            qr_dir: PathBuf::from("static/qr_codes"),
        }
    }
}

/// Share URL settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShareConfig {
    /// Stored file names are appended to this to form the shared URL.
    pub base_url: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/images".to_string(),
        }
    }
}

/// Stored image encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// JPEG quality for captured and filtered images (1 = worst, 100 = best).
    pub jpeg_quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { jpeg_quality: 90 }
    }
}

/// QR code settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QrConfig {
    pub error_correction: ErrorCorrection,
    /// Side length of one module, in pixels.
    pub module_pixels: u32,
    /// Width of the white border, in modules.
    pub quiet_zone: u32,
}

impl Default for QrConfig {
    fn default() -> Self {
        let settings = QrSettings::default();
        Self {
            error_correction: settings.error_correction,
            module_pixels: settings.module_pixels,
            quiet_zone: settings.quiet_zone,
        }
    }
}

/// Which frame source `capture` uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraBackend {
    /// Run an external capture program.
    #[default]
    Command,
    /// Open the camera directly (requires the `camera` cargo feature).
    Native,
}

/// Frame source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub backend: CameraBackend,
    /// Device node checked (and substituted for `{device}`) by the command backend.
    pub device: PathBuf,
    /// Camera index for the native backend.
    pub index: u32,
    /// Capture program for the command backend.
    pub program: String,
    /// Arguments for the capture program.
    pub args: Vec<String>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            backend: CameraBackend::Command,
            device: PathBuf::from("/dev/video0"),
            index: 0,
            program: "ffmpeg".to_string(),
            args: [
                "-hide_banner",
                "-loglevel",
                "error",
                "-f",
                "v4l2",
                "-i",
                "{device}",
                "-frames:v",
                "1",
                "-c:v",
                "png",
                "-f",
                "image2pipe",
                "-",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

// =============================================================================
// Config loading and validation
// =============================================================================

/// Load config from `path`.
///
/// A missing file means all defaults. Every section carries
/// `#[serde(default)]`, so a partial file only overrides the keys it names.
/// Unknown keys are rejected and the result is validated.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = match fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
        Err(e) => return Err(e.into()),
    };
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `snapqr.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# snapqr configuration
# ====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Storage
# ---------------------------------------------------------------------------
[storage]
# Captures, uploads and filter results. Created on startup if absent.
images_dir = "static/images"

# Generated QR codes (PNG). Created on startup if absent.
qr_dir = "static/qr_codes"

# ---------------------------------------------------------------------------
# Sharing
# ---------------------------------------------------------------------------
[share]
# Shared URLs are <base_url>/<stored file name>. Point this at wherever
# images_dir is served from. Overridden by --base-url / SNAPQR_BASE_URL.
base_url = "http://localhost:8000/images"

# ---------------------------------------------------------------------------
# Stored image encoding
# ---------------------------------------------------------------------------
[output]
# JPEG quality for captured and filtered images (1 = worst, 100 = best).
jpeg_quality = 90

# ---------------------------------------------------------------------------
# QR codes
# ---------------------------------------------------------------------------
[qr]
# Error correction: L (~7%), M (~15%), Q (~25%), H (~30%).
error_correction = "M"

# Pixels per QR module.
module_pixels = 10

# White border around the symbol, in modules (4 is the standard minimum).
quiet_zone = 4

# ---------------------------------------------------------------------------
# Camera
# ---------------------------------------------------------------------------
[camera]
# "command" runs the program below and reads one JPEG/PNG frame from its
# stdout. "native" opens the camera directly (build with --features camera).
backend = "command"

# Device node for the command backend; substituted for {device} in args.
device = "/dev/video0"

# Camera index for the native backend.
index = 0

program = "ffmpeg"
args = [
    "-hide_banner", "-loglevel", "error",
    "-f", "v4l2", "-i", "{device}",
    "-frames:v", "1", "-c:v", "png", "-f", "image2pipe", "-",
]

# ---------------------------------------------------------------------------
# Logging
# ---------------------------------------------------------------------------
[logging]
# trace, debug, info, warn or error. RUST_LOG takes precedence when set.
level = "info"

# "pretty" for humans, "json" for log collectors. Logs go to stderr.
format = "pretty"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = AppConfig::default();
        assert_eq!(config.storage.images_dir, PathBuf::from("static/images"));
        assert_eq!(config.storage.qr_dir, PathBuf::from("static/qr_codes"));
        assert_eq!(config.output.jpeg_quality, 90);
        assert_eq!(config.qr.error_correction, ErrorCorrection::M);
        assert_eq!(config.qr.module_pixels, 10);
        assert_eq!(config.qr.quiet_zone, 4);
        assert_eq!(config.camera.backend, CameraBackend::Command);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn default_config_is_valid() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[share]
base_url = "https://photos.example.com/images"
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.share.base_url, "https://photos.example.com/images");
        // Defaults preserved
        assert_eq!(config.output.jpeg_quality, 90);
        assert_eq!(config.camera.program, "ffmpeg");
    }

    #[test]
    fn parse_qr_and_camera_settings() {
        let toml = r#"
[qr]
error_correction = "H"
module_pixels = 6

[camera]
backend = "native"
index = 2
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.qr.error_correction, ErrorCorrection::H);
        assert_eq!(config.qr.module_pixels, 6);
        assert_eq!(config.qr.quiet_zone, 4);
        assert_eq!(config.camera.backend, CameraBackend::Native);
        assert_eq!(config.camera.index, 2);

        let settings = config.qr_settings();
        assert_eq!(settings.error_correction, ErrorCorrection::H);
        assert_eq!(settings.module_pixels, 6);
    }

    #[test]
    fn unknown_keys_rejected() {
        let toml = r#"
[output]
jpeg_qualty = 80
"#;
        assert!(toml::from_str::<AppConfig>(toml).is_err());
    }

    #[test]
    fn unknown_error_correction_rejected() {
        let toml = r#"
[qr]
error_correction = "X"
"#;
        assert!(toml::from_str::<AppConfig>(toml).is_err());
    }

    #[test]
    fn validate_rejects_bad_quality() {
        let mut config = AppConfig::default();
        config.output.jpeg_quality = 0;
        assert!(config.validate().is_err());
        config.output.jpeg_quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_base_url() {
        let mut config = AppConfig::default();
        config.share.base_url = "ftp://example.com".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn validate_rejects_bad_qr_geometry() {
        let mut config = AppConfig::default();
        config.qr.module_pixels = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.qr.quiet_zone = 40;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_program_for_command_backend() {
        let mut config = AppConfig::default();
        config.camera.program = "  ".into();
        assert!(config.validate().is_err());
        config.camera.backend = CameraBackend::Native;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_unknown_log_level() {
        let mut config = AppConfig::default();
        config.logging.level = "loud".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_file_keeps_other_sections() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "[qr]\nmodule_pixels = 4\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.qr.module_pixels, 4);
        assert_eq!(config.qr.quiet_zone, 4);
        assert_eq!(config.output.jpeg_quality, 90);
        assert_eq!(config.camera.program, "ffmpeg");
    }

    #[test]
    fn load_config_missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.output.jpeg_quality, 90);
    }

    #[test]
    fn load_config_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"
[storage]
images_dir = "out/img"

[logging]
format = "json"
"#,
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.storage.images_dir, PathBuf::from("out/img"));
        assert_eq!(config.storage.qr_dir, PathBuf::from("static/qr_codes"));
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn load_config_invalid_toml_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "this is [not valid").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_invalid_values_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "[output]\njpeg_quality = 0\n").unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let config: AppConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = AppConfig::default();
        assert_eq!(config.storage.images_dir, defaults.storage.images_dir);
        assert_eq!(config.share.base_url, defaults.share.base_url);
        assert_eq!(config.output.jpeg_quality, defaults.output.jpeg_quality);
        assert_eq!(config.qr.module_pixels, defaults.qr.module_pixels);
        assert_eq!(config.camera.args, defaults.camera.args);
        assert_eq!(config.logging.level, defaults.logging.level);
    }
}

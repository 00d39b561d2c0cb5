//! CLI output formatting.
//!
//! The primary line for every stored file is its reference, since that is
//! what the user passes to the next command. Everything else (where it came
//! from, shape, path on disk) is indented context underneath.
//!
//! ```text
//! filtered_1760600000_5f0c2b6e9d0e4c41a2c1d3f1a5b7e9c0.jpg
//!     Created: filtered at 2025-10-16 07:33:20 UTC
//!     Image: 640x480, grayscale
//!     Filter: grayscale
//!     Path: static/images/filtered_1760600000_5f0c2b6e9d0e4c41a2c1d3f1a5b7e9c0.jpg
//! Shared filtered_1760600000_5f0c2b6e9d0e4c41a2c1d3f1a5b7e9c0.jpg
//!     URL: http://localhost:8000/images/filtered_1760600000_5f0c….jpg
//!     QR: static/qr_codes/qr_1760600000_….png (version 5, 37 modules, 450px)
//! ```
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure.
//!
//! With `--json` a single [`Report`] is printed instead.

use crate::imaging::FilterKind;
use crate::naming::{ImageReference, Origin, parse_reference};
use crate::pipeline::{Shared, Stored};
use serde::Serialize;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn channel_label(channels: u8) -> &'static str {
    match channels {
        1 => "grayscale",
        _ => "color",
    }
}

fn origin_label(origin: Origin) -> &'static str {
    match origin {
        Origin::Captured => "captured",
        Origin::Uploaded => "uploaded",
        Origin::Filtered => "filtered",
        Origin::Qr => "QR code",
    }
}

/// `Created:` line for generated names; nothing for hand-named files.
fn created_line(reference: &ImageReference) -> Option<String> {
    let parsed = parse_reference(reference)?;
    Some(format!(
        "{}Created: {} at {}",
        indent(1),
        origin_label(parsed.origin),
        parsed.created.format("%Y-%m-%d %H:%M:%S UTC")
    ))
}

// ============================================================================
// Stored images
// ============================================================================

/// Format a stored (or reused) image.
pub fn format_stored(stored: &Stored) -> Vec<String> {
    let mut lines = vec![stored.reference.to_string()];
    lines.extend(created_line(&stored.reference));
    lines.push(format!(
        "{}Image: {}x{}, {}",
        indent(1),
        stored.width,
        stored.height,
        channel_label(stored.channels)
    ));
    if let Some(filter) = stored.filter {
        lines.push(format!("{}Filter: {}", indent(1), filter));
    }
    lines.push(format!("{}Path: {}", indent(1), stored.path.display()));
    lines
}

pub fn print_stored(stored: &Stored) {
    for line in format_stored(stored) {
        println!("{}", line);
    }
}

// ============================================================================
// Sharing
// ============================================================================

/// Format a share result: URL plus where the QR code was written.
pub fn format_shared(shared: &Shared) -> Vec<String> {
    vec![
        format!("Shared {}", shared.reference),
        format!("{}URL: {}", indent(1), shared.url),
        format!(
            "{}QR: {} (version {}, {} modules, {}px)",
            indent(1),
            shared.qr_path.display(),
            shared.qr_version,
            shared.qr_modules,
            shared.qr_pixels
        ),
    ]
}

pub fn print_shared(shared: &Shared) {
    for line in format_shared(shared) {
        println!("{}", line);
    }
}

// ============================================================================
// Export
// ============================================================================

pub fn format_exported(reference: &ImageReference, dest: &Path) -> Vec<String> {
    vec![format!("{} \u{2192} {}", reference, dest.display())]
}

pub fn print_exported(reference: &ImageReference, dest: &Path) {
    for line in format_exported(reference, dest) {
        println!("{}", line);
    }
}

// ============================================================================
// Filter list
// ============================================================================

/// One line per supported filter, names aligned.
pub fn format_filters() -> Vec<String> {
    let width = FilterKind::ALL
        .iter()
        .map(|k| k.name().len())
        .max()
        .unwrap_or(0);
    FilterKind::ALL
        .iter()
        .map(|k| format!("{:<width$}  {}", k.name(), k.description()))
        .collect()
}

pub fn print_filters() {
    for line in format_filters() {
        println!("{}", line);
    }
}

// ============================================================================
// JSON report
// ============================================================================

/// Everything one command produced, for `--json`.
#[derive(Debug, Default, Serialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Stored>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered: Option<Stored>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<Shared>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported: Option<std::path::PathBuf>,
}

impl Report {
    /// Human-readable lines for every part that is present.
    pub fn format_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(image) = &self.image {
            lines.extend(format_stored(image));
        }
        if let Some(filtered) = &self.filtered {
            lines.extend(format_stored(filtered));
        }
        if let Some(shared) = &self.shared {
            lines.extend(format_shared(shared));
        }
        lines
    }
}

pub fn format_json(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

pub fn print_report(report: &Report, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", format_json(report)?);
    } else {
        for line in report.format_lines() {
            println!("{}", line);
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

//! Reference naming for stored images and QR codes.
//!
//! Every image the pipeline produces (a capture, an upload, a filter result)
//! and every QR artifact gets a fresh name of the form:
//!
//! ```text
//! <prefix>_<unix-seconds>_<token>.<ext>
//! filtered_1760600000_5f0c2b6e9d0e4c41a2c1d3f1a5b7e9c0.jpg
//! ```
//!
//! The timestamp alone is not enough: two filters applied within the same
//! second would collide and the second would overwrite the first. The token
//! is a random v4 UUID in simple (hex) form, which makes names unique across
//! rapid successive calls.
//!
//! Names only ever contain `[a-z0-9_.]`, so they can be appended to a base URL
//! without escaping. [`ImageReference::parse`] applies the same rule to names
//! typed by a user.

use crate::error::{PipelineError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// What produced a stored file. Determines the name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Captured,
    Uploaded,
    Filtered,
    Qr,
}

impl Origin {
    pub fn prefix(self) -> &'static str {
        match self {
            Origin::Captured => "captured",
            Origin::Uploaded => "uploaded",
            Origin::Filtered => "filtered",
            Origin::Qr => "qr",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        [Origin::Captured, Origin::Uploaded, Origin::Filtered, Origin::Qr]
            .into_iter()
            .find(|o| o.prefix() == prefix)
    }
}

/// Opaque handle naming exactly one stored file.
///
/// A reference is just a bare file name; the [`Store`](crate::store::Store)
/// decides which directory it lives in. References are never mutated: a
/// filter produces a new reference and the old one keeps pointing at the
/// original bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ImageReference(String);

impl ImageReference {
    /// Validate user-supplied text as a reference.
    ///
    /// Accepts bare file names made of ASCII letters, digits, `.`, `_` and
    /// `-`, not starting with a dot.
    pub fn parse(name: &str) -> Result<Self> {
        let valid = !name.is_empty()
            && !name.starts_with('.')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if valid {
            Ok(Self(name.to_string()))
        } else {
            Err(PipelineError::InvalidReference(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File extension, lowercased, if any.
    pub fn extension(&self) -> Option<String> {
        self.0
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mint a new, unique reference for a file produced now.
pub fn fresh_reference(origin: Origin, extension: &str) -> ImageReference {
    fresh_reference_at(origin, extension, Utc::now())
}

/// Mint a new reference with an explicit timestamp.
pub fn fresh_reference_at(origin: Origin, extension: &str, at: DateTime<Utc>) -> ImageReference {
    ImageReference(format!(
        "{}_{}_{}.{}",
        origin.prefix(),
        at.timestamp(),
        Uuid::new_v4().simple(),
        extension
    ))
}

/// Result of parsing a generated name like `filtered_1760600000_<hex>.jpg`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReference {
    pub origin: Origin,
    pub created: DateTime<Utc>,
    pub token: String,
    pub extension: String,
}

/// Parse a reference produced by [`fresh_reference`].
///
/// Returns `None` for names that don't follow the convention (for example
/// files dropped into the images directory by hand).
pub fn parse_reference(reference: &ImageReference) -> Option<ParsedReference> {
    let (stem, extension) = reference.as_str().rsplit_once('.')?;
    let mut parts = stem.splitn(3, '_');
    let origin = Origin::from_prefix(parts.next()?)?;
    let secs: i64 = parts.next()?.parse().ok()?;
    let token = parts.next()?;
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(ParsedReference {
        origin,
        created: DateTime::from_timestamp(secs, 0)?,
        token: token.to_string(),
        extension: extension.to_string(),
    })
}

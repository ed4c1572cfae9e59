//! # Image Records
//!
//! An [`ImageRecord`] is one entry of the comparison: an opaque id, a display
//! name, the source URL and an optional overlay label. Callers describe images
//! with an [`ImageConfig`]; missing ids are generated and missing names are
//! derived from the URL.
//!
//! ## Example
//!
//! ```rust
//! use compare_core::image::{ImageConfig, ImageRecord};
//!
//! let record = ImageRecord::from_config(ImageConfig::new("https://cdn.example.com/shots/before%20fix.png")).unwrap();
//! assert_eq!(record.name, "before fix.png");
//! assert_eq!(record.display_label(), "before fix.png");
//! ```

use chrono::{DateTime, Utc};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::errors::{CompareError, CompareResult};

/// Name used when nothing usable can be pulled out of a URL
pub const FALLBACK_NAME: &str = "image";

/// A single image taking part in the comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// Unique within a collection
    pub id: String,

    /// Display name (derived from the URL when not supplied)
    pub name: String,

    /// Source locator; never fetched by the core
    pub url: String,

    /// Optional overlay text, falls back to `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Optional descriptive metadata, carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ImageMetadata>,
}

impl ImageRecord {
    /// Build a record from caller input.
    ///
    /// Empty `id` and `name` count as absent. The URL only has to be
    /// non-blank.
    pub fn from_config(config: ImageConfig) -> CompareResult<Self> {
        if config.url.trim().is_empty() {
            return Err(CompareError::invalid_input("url", config.url, "Image URL must not be empty"));
        }

        let id = config
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let name = config
            .name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| name_from_url(&config.url));

        Ok(ImageRecord {
            id,
            name,
            url: config.url,
            label: config.label,
            metadata: config.metadata,
        })
    }

    /// Text shown over the image: the label if set and non-empty, otherwise
    /// the name.
    pub fn display_label(&self) -> &str {
        self.label
            .as_deref()
            .filter(|label| !label.is_empty())
            .unwrap_or(&self.name)
    }
}

/// Caller-side description of an image to add.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    #[serde(default)]
    pub id: Option<String>,
    pub url: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub metadata: Option<ImageMetadata>,
}

impl ImageConfig {
    /// Config with just a URL; everything else is derived.
    pub fn new(url: impl Into<String>) -> Self {
        ImageConfig {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set an explicit id (builder pattern)
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set an overlay label (builder pattern)
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set an explicit display name (builder pattern)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach metadata (builder pattern)
    pub fn with_metadata(mut self, metadata: ImageMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Descriptive facts about an image, supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    /// Pixel width
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Pixel height
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Format name, e.g. "png"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Derive a display name from the last path segment of a URL.
///
/// Percent-escapes are decoded. Relative or unparsable URLs, empty final
/// segments and escapes that do not decode to UTF-8 all yield
/// [`FALLBACK_NAME`].
///
/// # Example
///
/// ```rust
/// use compare_core::image::name_from_url;
///
/// assert_eq!(name_from_url("https://x/y/pic.png"), "pic.png");
/// assert_eq!(name_from_url("https://x/y/"), "image");
/// assert_eq!(name_from_url("not a url"), "image");
/// ```
pub fn name_from_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return FALLBACK_NAME.to_string();
    };

    let segment = parsed.path().rsplit('/').next().unwrap_or_default();
    if segment.is_empty() {
        return FALLBACK_NAME.to_string();
    }

    match percent_decode_str(segment).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => FALLBACK_NAME.to_string(),
    }
}

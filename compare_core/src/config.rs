//! # Comparator Configuration
//!
//! Options recognized at construction time. The struct deserializes from the
//! same JSON object a host page would pass:
//!
//! ```json
//! {
//!   "images": [{ "url": "https://cdn.example.com/a.png", "label": "Before" }],
//!   "width": "100%",
//!   "height": 480,
//!   "showLabels": true
//! }
//! ```
//!
//! ## Example
//!
//! ```rust
//! use compare_core::config::{ComparatorConfig, Dimension};
//!
//! let config = ComparatorConfig::from_json(r#"{"height": "60%"}"#).unwrap();
//! assert_eq!(config.width, Dimension::Percent(100.0));
//! assert_eq!(config.height, Dimension::Percent(60.0));
//! assert!(config.show_labels);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{CompareError, CompareResult};
use crate::image::ImageConfig;

/// Default viewport height in host units
pub const DEFAULT_HEIGHT: f64 = 500.0;

/// A viewport size: absolute units or a percentage of the container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DimensionRepr", into = "DimensionRepr")]
pub enum Dimension {
    Units(f64),
    Percent(f64),
}

impl Dimension {
    fn checked(self) -> CompareResult<Self> {
        let value = match self {
            Dimension::Units(v) | Dimension::Percent(v) => v,
        };
        if !value.is_finite() || value < 0.0 {
            return Err(CompareError::invalid_input(
                "dimension",
                self.to_string(),
                "Dimension must be a finite, non-negative number",
            ));
        }
        Ok(self)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Units(v) => write!(f, "{}", v),
            Dimension::Percent(v) => write!(f, "{}%", v),
        }
    }
}

impl FromStr for Dimension {
    type Err = CompareError;

    /// Accepts `"640"`, `"640px"` and `"75%"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || CompareError::invalid_input("dimension", s, "Expected a number, \"<n>px\" or \"<n>%\"");

        let dimension = if let Some(number) = trimmed.strip_suffix('%') {
            Dimension::Percent(number.trim().parse().map_err(|_| invalid())?)
        } else {
            let number = trimmed.strip_suffix("px").unwrap_or(trimmed);
            Dimension::Units(number.trim().parse().map_err(|_| invalid())?)
        };
        dimension.checked()
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DimensionRepr {
    Number(f64),
    Text(String),
}

impl TryFrom<DimensionRepr> for Dimension {
    type Error = CompareError;

    fn try_from(repr: DimensionRepr) -> Result<Self, Self::Error> {
        match repr {
            DimensionRepr::Number(v) => Dimension::Units(v).checked(),
            DimensionRepr::Text(s) => s.parse(),
        }
    }
}

impl From<Dimension> for DimensionRepr {
    fn from(dimension: Dimension) -> Self {
        match dimension {
            Dimension::Units(v) => DimensionRepr::Number(v),
            Dimension::Percent(_) => DimensionRepr::Text(dimension.to_string()),
        }
    }
}

/// Construction-time configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComparatorConfig {
    /// Images present when the widget mounts
    pub images: Vec<ImageConfig>,
    pub width: Dimension,
    pub height: Dimension,
    /// Whether labels are shown at all
    pub show_labels: bool,
}

impl ComparatorConfig {
    /// Parse a host-supplied JSON config object.
    pub fn from_json(json: &str) -> CompareResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Seed images (builder pattern)
    pub fn with_images(mut self, images: Vec<ImageConfig>) -> Self {
        self.images = images;
        self
    }

    /// Viewport width (builder pattern)
    pub fn with_width(mut self, width: Dimension) -> Self {
        self.width = width;
        self
    }

    /// Viewport height (builder pattern)
    pub fn with_height(mut self, height: Dimension) -> Self {
        self.height = height;
        self
    }

    /// Label visibility (builder pattern)
    pub fn with_show_labels(mut self, show_labels: bool) -> Self {
        self.show_labels = show_labels;
        self
    }

    /// The display part of the config, without the seed list
    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            width: self.width,
            height: self.height,
            show_labels: self.show_labels,
        }
    }
}

impl Default for ComparatorConfig {
    fn default() -> Self {
        ComparatorConfig {
            images: Vec::new(),
            width: Dimension::Percent(100.0),
            height: Dimension::Units(DEFAULT_HEIGHT),
            show_labels: true,
        }
    }
}

/// Display options published alongside every state snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOptions {
    pub width: Dimension,
    pub height: Dimension,
    pub show_labels: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        ComparatorConfig::default().display_options()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ComparatorConfig::default();
        assert!(config.images.is_empty());
        assert_eq!(config.width, Dimension::Percent(100.0));
        assert_eq!(config.height, Dimension::Units(DEFAULT_HEIGHT));
        assert!(config.show_labels);
    }

    #[test]
    fn test_dimension_parsing() {
        assert_eq!("640".parse::<Dimension>().unwrap(), Dimension::Units(640.0));
        assert_eq!("640px".parse::<Dimension>().unwrap(), Dimension::Units(640.0));
        assert_eq!(" 75% ".parse::<Dimension>().unwrap(), Dimension::Percent(75.0));
        assert!("wide".parse::<Dimension>().is_err());
        assert!("-5%".parse::<Dimension>().is_err());
    }

    #[test]
    fn test_dimension_json_forms() {
        let number: Dimension = serde_json::from_str("480").unwrap();
        assert_eq!(number, Dimension::Units(480.0));
        let percent: Dimension = serde_json::from_str("\"50%\"").unwrap();
        assert_eq!(percent, Dimension::Percent(50.0));
        assert!(serde_json::from_str::<Dimension>("-1").is_err());

        assert_eq!(serde_json::to_string(&Dimension::Units(480.0)).unwrap(), "480.0");
        assert_eq!(serde_json::to_string(&Dimension::Percent(50.0)).unwrap(), "\"50%\"");
    }

    #[test]
    fn test_from_json_full_object() {
        let json = r#"{
            "images": [{"url": "https://x/a.png", "label": "A"}, {"url": "https://x/b.png"}],
            "width": 800,
            "height": "600px",
            "showLabels": false
        }"#;
        let config = ComparatorConfig::from_json(json).unwrap();
        assert_eq!(config.images.len(), 2);
        assert_eq!(config.width, Dimension::Units(800.0));
        assert_eq!(config.height, Dimension::Units(600.0));
        assert!(!config.show_labels);
    }

    #[test]
    fn test_from_json_error_maps_to_serialization_error() {
        let err = ComparatorConfig::from_json("{not json").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");

        let err = ComparatorConfig::from_json(r#"{"width": "huge"}"#).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_display_options() {
        let options = ComparatorConfig::default()
            .with_height(Dimension::Units(320.0))
            .with_show_labels(false)
            .display_options();
        assert_eq!(options.height, Dimension::Units(320.0));
        assert!(!options.show_labels);
        assert_eq!(options.width, Dimension::Percent(100.0));
    }
}

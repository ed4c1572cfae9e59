//! # Divider Geometry
//!
//! N compared images share one viewport, split by N-1 vertical dividers.
//! Divider positions are percentages of the viewport width.
//!
//! - Reflow: whenever N changes, dividers reset to `(k+1)/N*100`.
//! - Drag: only the dragged divider moves, clamped to stay at least
//!   [`MIN_GAP`] away from its neighbours and inside
//!   [`MIN_POSITION`]..=[`MAX_POSITION`].
//! - Clip: image `i` shows the band between divider `i-1` (or 0) and
//!   divider `i` (or 100).
//!
//! ## Example
//!
//! ```rust
//! use compare_core::geometry::DividerLayout;
//!
//! let mut layout = DividerLayout::new(4);
//! assert_eq!(layout.positions(), &[25.0, 50.0, 75.0]);
//!
//! // Divider 1 cannot get closer than 2% to divider 0
//! assert_eq!(layout.set_position(1, 10.0), Some(27.0));
//!
//! let clip = layout.clip(2).unwrap();
//! assert_eq!((clip.left, clip.right), (27.0, 75.0));
//! ```

use serde::{Deserialize, Serialize};

/// Minimum distance between neighbouring dividers, in percent
pub const MIN_GAP: f64 = 2.0;

/// Lowest position the first divider may be dragged to
pub const MIN_POSITION: f64 = 2.0;

/// Highest position the last divider may be dragged to
pub const MAX_POSITION: f64 = 98.0;

/// How the comparison view is laid out for a given image count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMode {
    /// Nothing to render
    Empty,
    /// One image, full viewport, no dividers
    Single,
    /// Two or more images split into bands
    Multi,
}

impl ViewMode {
    pub fn for_count(image_count: usize) -> Self {
        match image_count {
            0 => ViewMode::Empty,
            1 => ViewMode::Single,
            _ => ViewMode::Multi,
        }
    }
}

/// Visible horizontal band of one image, in percent of viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipRegion {
    pub left: f64,
    pub right: f64,
}

impl ClipRegion {
    /// Band width in percent
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Amount to cut from the right edge (CSS `inset` right value)
    pub fn inset_right(&self) -> f64 {
        100.0 - self.right
    }

    /// Amount to cut from the left edge (CSS `inset` left value)
    pub fn inset_left(&self) -> f64 {
        self.left
    }

    /// Horizontal midpoint of the band
    pub fn center(&self) -> f64 {
        (self.left + self.right) / 2.0
    }
}

/// Where an image's label sits within its band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LabelAnchor {
    /// Pinned to the left edge of the viewport
    Start,
    /// Pinned to the right edge of the viewport
    End,
    /// Centered at this percentage of the viewport width
    Center(f64),
}

/// Evenly spaced divider positions for `image_count` images.
///
/// Returns an empty list for fewer than two images.
pub fn evenly_spaced(image_count: usize) -> Vec<f64> {
    if image_count < 2 {
        return Vec::new();
    }
    (0..image_count - 1)
        .map(|k| ((k + 1) as f64 / image_count as f64) * 100.0)
        .collect()
}

/// Convert a cursor x coordinate into a percentage of the viewport width.
///
/// The result is clamped to `0..=100`. Returns `None` for a viewport with no
/// usable width.
pub fn cursor_percent(cursor_x: f64, viewport_left: f64, viewport_width: f64) -> Option<f64> {
    if viewport_width.is_nan() || viewport_width <= 0.0 || !cursor_x.is_finite() || !viewport_left.is_finite() {
        return None;
    }
    let percent = (cursor_x - viewport_left) / viewport_width * 100.0;
    Some(percent.max(0.0).min(100.0))
}

/// Divider positions for the images currently being compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividerLayout {
    image_count: usize,
    positions: Vec<f64>,
    #[serde(skip)]
    active: Option<usize>,
}

impl DividerLayout {
    /// Evenly spaced layout for `image_count` images
    pub fn new(image_count: usize) -> Self {
        DividerLayout {
            image_count,
            positions: evenly_spaced(image_count),
            active: None,
        }
    }

    /// Rebuild a layout from published positions.
    ///
    /// Falls back to even spacing when the list length does not match
    /// `image_count - 1`.
    pub fn from_positions(image_count: usize, positions: &[f64]) -> Self {
        if positions.len() != image_count.saturating_sub(1) {
            return DividerLayout::new(image_count);
        }
        DividerLayout {
            image_count,
            positions: positions.to_vec(),
            active: None,
        }
    }

    /// Number of images the layout was computed for
    pub fn image_count(&self) -> usize {
        self.image_count
    }

    /// Number of dividers (`image_count - 1`, or 0)
    pub fn divider_count(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn mode(&self) -> ViewMode {
        ViewMode::for_count(self.image_count)
    }

    /// Reset to evenly spaced dividers if the image count changed.
    ///
    /// Manual placement is discarded. Returns `true` when the layout was
    /// recomputed.
    pub fn reflow(&mut self, image_count: usize) -> bool {
        if image_count == self.image_count {
            return false;
        }
        *self = DividerLayout::new(image_count);
        true
    }

    /// Allowed range for divider `index`, or `None` if there is no such divider.
    ///
    /// When the neighbours sit closer than `2 * MIN_GAP` apart the lower
    /// bound can exceed the upper one; [`set_position`](Self::set_position)
    /// then settles on the lower bound.
    pub fn bounds(&self, index: usize) -> Option<(f64, f64)> {
        if index >= self.positions.len() {
            return None;
        }
        let min = if index > 0 {
            self.positions[index - 1] + MIN_GAP
        } else {
            MIN_POSITION
        };
        let max = if index + 1 < self.positions.len() {
            self.positions[index + 1] - MIN_GAP
        } else {
            MAX_POSITION
        };
        Some((min, max))
    }

    /// Move divider `index` towards `percent`, clamped between its neighbours.
    ///
    /// Only this divider changes. Returns the stored position, or `None` if
    /// `index` is not a divider or `percent` is NaN.
    pub fn set_position(&mut self, index: usize, percent: f64) -> Option<f64> {
        if percent.is_nan() {
            return None;
        }
        let (min, max) = self.bounds(index)?;
        // Not f64::clamp: min may exceed max for very dense layouts.
        let position = percent.min(max).max(min);
        self.positions[index] = position;
        Some(position)
    }

    /// Start dragging divider `index`. Ignored if there is no such divider.
    pub fn begin_drag(&mut self, index: usize) -> bool {
        if index >= self.positions.len() {
            return false;
        }
        self.active = Some(index);
        true
    }

    /// Apply a drag step to the active divider.
    pub fn drag_to(&mut self, percent: f64) -> Option<f64> {
        let index = self.active?;
        self.set_position(index, percent)
    }

    pub fn end_drag(&mut self) {
        self.active = None;
    }

    /// Divider currently being dragged
    pub fn active_divider(&self) -> Option<usize> {
        self.active
    }

    /// Visible band of image `index`, or `None` if out of range.
    pub fn clip(&self, index: usize) -> Option<ClipRegion> {
        if index >= self.image_count {
            return None;
        }
        let left = if index == 0 { 0.0 } else { self.positions[index - 1] };
        let right = if index + 1 == self.image_count {
            100.0
        } else {
            self.positions[index]
        };
        Some(ClipRegion { left, right })
    }

    /// Bands for every image, left to right
    pub fn clip_regions(&self) -> Vec<ClipRegion> {
        (0..self.image_count).filter_map(|i| self.clip(i)).collect()
    }

    /// Label placement for image `index`.
    pub fn label_anchor(&self, index: usize) -> Option<LabelAnchor> {
        let clip = self.clip(index)?;
        let anchor = if index == 0 {
            LabelAnchor::Start
        } else if index + 1 == self.image_count {
            LabelAnchor::End
        } else {
            LabelAnchor::Center(clip.center())
        };
        Some(anchor)
    }
}

impl Default for DividerLayout {
    fn default() -> Self {
        DividerLayout::new(0)
    }
}

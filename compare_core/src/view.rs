//! # View Model
//!
//! Pure render instructions for the presentation layer, derived from a
//! [`StateSnapshot`]. The renderer turns each band into a clip/inset on the
//! image and draws dividers at the listed positions; nothing here touches
//! pixels.

use serde::{Deserialize, Serialize};

use crate::geometry::{ClipRegion, DividerLayout, LabelAnchor, ViewMode};
use crate::store::StateSnapshot;

/// One image band, left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandView {
    pub image_id: String,
    pub url: String,
    /// `None` when labels are hidden
    pub label: Option<String>,
    pub clip: ClipRegion,
    /// CSS `inset(0 R% 0 L%)` left value
    pub inset_left: f64,
    /// CSS `inset(0 R% 0 L%)` right value
    pub inset_right: f64,
    pub label_anchor: LabelAnchor,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonView {
    pub mode: ViewMode,
    pub bands: Vec<BandView>,
    pub dividers: Vec<f64>,
}

impl ComparisonView {
    pub fn build(snapshot: &StateSnapshot) -> Self {
        let compared = snapshot.compared_images();
        let layout = DividerLayout::from_positions(compared.len(), &snapshot.slider_positions);
        let show_labels = snapshot.options.show_labels;

        let bands = compared
            .into_iter()
            .enumerate()
            .filter_map(|(index, image)| {
                let clip = layout.clip(index)?;
                let label_anchor = layout.label_anchor(index)?;
                Some(BandView {
                    label: show_labels.then(|| image.display_label().to_string()),
                    image_id: image.id,
                    url: image.url,
                    inset_left: clip.inset_left(),
                    inset_right: clip.inset_right(),
                    clip,
                    label_anchor,
                })
            })
            .collect();

        ComparisonView {
            mode: layout.mode(),
            bands,
            dividers: layout.positions().to_vec(),
        }
    }
}

//! # Image Collection & Selection
//!
//! [`ImageCollection`] is the ordered list of images (display order and band
//! order, left to right). [`SelectionSet`] is the ordered list of ids taking
//! part in the comparison view.
//!
//! Neither type knows about the other; the store keeps them consistent.
//!
//! ## Example
//!
//! ```rust
//! use compare_core::collection::ImageCollection;
//! use compare_core::image::{ImageConfig, ImageRecord};
//!
//! let mut images = ImageCollection::new();
//! for (id, url) in [("A", "https://x/a.png"), ("B", "https://x/b.png"), ("C", "https://x/c.png")] {
//!     images.push(ImageRecord::from_config(ImageConfig::new(url).with_id(id)).unwrap());
//! }
//!
//! // A move, not a swap
//! images.reorder(0, 2);
//! assert_eq!(images.ids(), vec!["B", "C", "A"]);
//! ```

use serde::{Deserialize, Serialize};

use crate::image::ImageRecord;

/// Ordered sequence of image records with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageCollection {
    records: Vec<ImageRecord>,
}

impl ImageCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        ImageCollection::default()
    }

    /// Number of images
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in collection order
    pub fn as_slice(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageRecord> {
        self.records.iter()
    }

    /// Ids in collection order
    pub fn ids(&self) -> Vec<String> {
        self.records.iter().map(|img| img.id.clone()).collect()
    }

    /// Get a record by id
    pub fn get(&self, id: &str) -> Option<&ImageRecord> {
        self.records.iter().find(|img| img.id == id)
    }

    /// Index of the record with this id
    pub fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|img| img.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.records.iter().any(|img| img.url == url)
    }

    /// Whether an insert of `record` would collide on id or URL.
    pub fn conflicts_with(&self, record: &ImageRecord) -> bool {
        self.records
            .iter()
            .any(|img| img.id == record.id || img.url == record.url)
    }

    /// Append a record.
    ///
    /// Returns `false` (and leaves the collection untouched) when the id is
    /// already present. URL uniqueness is the caller's policy, see
    /// [`conflicts_with`](Self::conflicts_with).
    pub fn push(&mut self, record: ImageRecord) -> bool {
        if self.contains_id(&record.id) {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Remove the record with this id, if any.
    pub fn remove(&mut self, id: &str) -> Option<ImageRecord> {
        let index = self.position(id)?;
        Some(self.records.remove(index))
    }

    /// Remove every record
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Move the element at `from` so it ends up at `to`.
    ///
    /// Intervening elements shift by one. Returns `false` without changing
    /// anything when `from == to` or either index is out of range.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.records.len();
        if from == to || from >= len || to >= len {
            return false;
        }
        let moved = self.records.remove(from);
        self.records.insert(to, moved);
        true
    }

    /// Replace the label of the record with this id.
    ///
    /// Returns `false` if no record matched.
    pub fn update_label(&mut self, id: &str, label: impl Into<String>) -> bool {
        match self.records.iter_mut().find(|img| img.id == id) {
            Some(img) => {
                img.label = Some(label.into());
                true
            }
            None => false,
        }
    }

    /// Records whose id is in `ids`, in collection order.
    pub fn filter_by_ids(&self, ids: &[String]) -> Vec<ImageRecord> {
        self.records
            .iter()
            .filter(|img| ids.iter().any(|id| *id == img.id))
            .cloned()
            .collect()
    }
}

impl<'a> IntoIterator for &'a ImageCollection {
    type Item = &'a ImageRecord;
    type IntoIter = std::slice::Iter<'a, ImageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Ordered, duplicate-free list of selected image ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet {
    ids: Vec<String>,
}

impl SelectionSet {
    /// Create an empty selection
    pub fn new() -> Self {
        SelectionSet::default()
    }

    /// Selection from a list, dropping repeated ids (first occurrence wins).
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = SelectionSet::new();
        for id in ids {
            let id = id.into();
            if !selection.contains(&id) {
                selection.ids.push(id);
            }
        }
        selection
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ids
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.ids.clone()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|selected| selected == id)
    }

    /// Remove `id` if selected, otherwise append it at the end.
    ///
    /// Returns `true` if the id is selected afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if let Some(index) = self.ids.iter().position(|selected| selected == id) {
            self.ids.remove(index);
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    /// Drop `id` from the selection. Returns `true` if it was selected.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|selected| selected != id);
        self.ids.len() != before
    }

    /// Keep only ids present in `collection`.
    pub fn prune(&mut self, collection: &ImageCollection) {
        self.ids.retain(|id| collection.contains_id(id));
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

/// Map an index in a filtered view back to the full collection.
///
/// The record at `index` of `filtered` is looked up in `full` by id. Returns
/// `None` when either lookup fails.
///
/// # Example
///
/// ```rust
/// use compare_core::collection::map_filtered_index_to_full_index;
/// use compare_core::image::{ImageConfig, ImageRecord};
///
/// let rec = |id: &str| ImageRecord::from_config(ImageConfig::new(format!("https://x/{id}.png")).with_id(id)).unwrap();
/// let full = vec![rec("A"), rec("B"), rec("C")];
/// let filtered = vec![rec("A"), rec("C")];
///
/// assert_eq!(map_filtered_index_to_full_index(&filtered, &full, 1), Some(2));
/// assert_eq!(map_filtered_index_to_full_index(&filtered, &full, 2), None);
/// ```
pub fn map_filtered_index_to_full_index(
    filtered: &[ImageRecord],
    full: &[ImageRecord],
    index: usize,
) -> Option<usize> {
    let record = filtered.get(index)?;
    full.iter().position(|img| img.id == record.id)
}

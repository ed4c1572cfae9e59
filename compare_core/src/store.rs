//! # Comparison State Store
//!
//! Single owner of one instance's image collection, selection and divider
//! layout. Every public mutation is one transaction:
//!
//! 1. apply the change,
//! 2. if collection membership changed, reset the selection to every image
//!    in collection order,
//! 3. reflow dividers if the number of compared images changed,
//! 4. queue notifications for what actually changed,
//! 5. publish a fresh snapshot to the registry (when attached).
//!
//! No-op requests (duplicate add, unknown id, invalid indices) skip all five
//! steps.
//!
//! ## Example
//!
//! ```rust
//! use compare_core::config::DisplayOptions;
//! use compare_core::image::ImageConfig;
//! use compare_core::store::ComparisonStore;
//!
//! let mut store = ComparisonStore::new(DisplayOptions::default());
//! store.add_image(ImageConfig::new("https://x/a.png").with_id("A")).unwrap();
//! store.add_image(ImageConfig::new("https://x/b.png").with_id("B")).unwrap();
//!
//! assert_eq!(store.selected_ids(), vec!["A", "B"]);
//! assert_eq!(store.dividers().positions(), &[50.0]);
//! ```

use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::collection::{map_filtered_index_to_full_index, ImageCollection, SelectionSet};
use crate::config::DisplayOptions;
use crate::errors::CompareResult;
use crate::events::{EventDispatcher, Notification};
use crate::geometry::{DividerLayout, ViewMode};
use crate::image::{ImageConfig, ImageRecord};
use crate::registry::{InstanceBinding, InstanceId, InstanceRegistry, StoreHandle};
use crate::session::ComparisonSession;

/// Immutable copy of an instance's state, valid until the next publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub images: Vec<ImageRecord>,
    pub selected_ids: Vec<String>,
    pub slider_positions: Vec<f64>,
    pub options: DisplayOptions,
    /// Increments once per committed mutation
    pub revision: u64,
    pub published_at: DateTime<Utc>,
}

impl StateSnapshot {
    /// Selected images in collection order
    pub fn compared_images(&self) -> Vec<ImageRecord> {
        self.images
            .iter()
            .filter(|img| self.selected_ids.contains(&img.id))
            .cloned()
            .collect()
    }

    pub fn mode(&self) -> ViewMode {
        ViewMode::for_count(self.selected_ids.len())
    }
}

/// Where a store publishes its snapshots.
#[derive(Debug, Clone)]
pub struct Publisher {
    registry: InstanceRegistry,
    instance_id: InstanceId,
    handle: StoreHandle,
    dispatcher: EventDispatcher,
}

impl Publisher {
    pub fn new(
        registry: InstanceRegistry,
        instance_id: InstanceId,
        handle: StoreHandle,
        dispatcher: EventDispatcher,
    ) -> Self {
        Publisher {
            registry,
            instance_id,
            handle,
            dispatcher,
        }
    }

    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }
}

/// State owner for one widget instance.
#[derive(Debug)]
pub struct ComparisonStore {
    images: ImageCollection,
    selection: SelectionSet,
    dividers: DividerLayout,
    options: DisplayOptions,
    revision: u64,
    outbox: Vec<Notification>,
    publisher: Option<Publisher>,
}

impl ComparisonStore {
    /// Empty store
    pub fn new(options: DisplayOptions) -> Self {
        ComparisonStore {
            images: ImageCollection::new(),
            selection: SelectionSet::new(),
            dividers: DividerLayout::default(),
            options,
            revision: 0,
            outbox: Vec::new(),
            publisher: None,
        }
    }

    /// Store seeded with initial images, all selected.
    ///
    /// Seeds follow the same dedupe rules as [`add_image`](Self::add_image)
    /// but do not queue `ImageAdded`. Blank URLs are skipped with a warning.
    /// A non-empty initial selection and divider list are queued as
    /// notifications.
    pub fn seeded(seeds: Vec<ImageConfig>, options: DisplayOptions) -> Self {
        let mut store = ComparisonStore::new(options);
        for config in seeds {
            match ImageRecord::from_config(config) {
                Ok(record) if store.images.conflicts_with(&record) => {
                    debug!(image_id = %record.id, url = %record.url, "skipping duplicate seed image");
                }
                Ok(record) => {
                    store.images.push(record);
                }
                Err(err) => warn!(code = err.error_code(), "skipping seed image: {}", err),
            }
        }

        store.selection = SelectionSet::from_ids(store.images.ids());
        store.dividers = DividerLayout::new(store.selection.len());
        if !store.selection.is_empty() {
            store.outbox.push(Notification::SelectionChanged(store.selection.to_vec()));
        }
        if store.dividers.divider_count() > 0 {
            store.outbox.push(Notification::SliderChanged(store.dividers.positions().to_vec()));
        }
        store
    }

    /// Attach the registry this store publishes to.
    pub fn attach(&mut self, publisher: Publisher) {
        self.publisher = Some(publisher);
    }

    /// Builder form of [`attach`](Self::attach)
    pub fn with_publisher(mut self, publisher: Publisher) -> Self {
        self.attach(publisher);
        self
    }

    /// Write the current snapshot into the registry, replacing the old one.
    pub fn publish(&self) {
        if let Some(publisher) = &self.publisher {
            publisher.registry.publish(
                publisher.instance_id,
                InstanceBinding {
                    snapshot: Rc::new(self.snapshot()),
                    store: publisher.handle.clone(),
                    dispatcher: publisher.dispatcher.clone(),
                },
            );
        }
    }

    /// Drain queued notifications, oldest first.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.outbox)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn images(&self) -> &ImageCollection {
        &self.images
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Selected ids in selection order
    pub fn selected_ids(&self) -> Vec<String> {
        self.selection.to_vec()
    }

    /// Images in the comparison view: selected ones, in collection order
    pub fn compared_images(&self) -> Vec<ImageRecord> {
        self.images.filter_by_ids(self.selection.as_slice())
    }

    pub fn dividers(&self) -> &DividerLayout {
        &self.dividers
    }

    pub fn options(&self) -> DisplayOptions {
        self.options
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            images: self.images.as_slice().to_vec(),
            selected_ids: self.selection.to_vec(),
            slider_positions: self.dividers.positions().to_vec(),
            options: self.options,
            revision: self.revision,
            published_at: Utc::now(),
        }
    }

    /// Session record for the current selection
    pub fn capture_session(&self, name: impl Into<String>) -> ComparisonSession {
        ComparisonSession::new(name, self.selection.to_vec())
    }

    // ------------------------------------------------------------------
    // Collection mutations
    // ------------------------------------------------------------------

    /// Append an image and select it.
    ///
    /// Returns `Ok(None)` when an image with the same id or URL already
    /// exists; that is not an error. A blank URL is.
    pub fn add_image(&mut self, config: ImageConfig) -> CompareResult<Option<ImageRecord>> {
        let record = ImageRecord::from_config(config)?;
        if self.images.conflicts_with(&record) {
            debug!(image_id = %record.id, url = %record.url, "ignoring duplicate image");
            return Ok(None);
        }

        let previous = self.selection.clone();
        self.images.push(record.clone());
        self.outbox.push(Notification::ImageAdded(record.clone()));
        self.commit(previous, true);
        Ok(Some(record))
    }

    /// Add each config in order; later duplicates are skipped independently.
    pub fn add_images(&mut self, configs: Vec<ImageConfig>) -> Vec<ImageRecord> {
        let mut added = Vec::new();
        for config in configs {
            match self.add_image(config) {
                Ok(Some(record)) => added.push(record),
                Ok(None) => {}
                Err(err) => warn!(code = err.error_code(), "rejected image: {}", err),
            }
        }
        added
    }

    /// Remove an image and drop it from the selection.
    ///
    /// Unknown ids are ignored and produce no notification.
    pub fn remove_image(&mut self, id: &str) -> bool {
        let previous = self.selection.clone();
        if self.images.remove(id).is_none() {
            debug!(image_id = id, "remove ignored, no such image");
            return false;
        }
        self.selection.remove(id);
        self.outbox.push(Notification::ImageRemoved(id.to_string()));
        self.commit(previous, true);
        true
    }

    /// Empty the collection and the selection. No per-image notifications.
    pub fn clear_images(&mut self) -> bool {
        if self.images.is_empty() && self.selection.is_empty() {
            return false;
        }
        let previous = self.selection.clone();
        self.images.clear();
        self.commit(previous, true);
        true
    }

    /// Replace the label of one image.
    pub fn update_image_label(&mut self, id: &str, label: impl Into<String>) -> bool {
        if !self.images.update_label(id, label) {
            debug!(image_id = id, "label update ignored, no such image");
            return false;
        }
        let previous = self.selection.clone();
        self.commit(previous, false);
        true
    }

    /// Move the image at `from` to `to` in the full collection.
    pub fn reorder_images(&mut self, from: usize, to: usize) -> bool {
        if !self.images.reorder(from, to) {
            debug!(from, to, len = self.images.len(), "reorder ignored");
            return false;
        }
        let previous = self.selection.clone();
        self.commit(previous, false);
        true
    }

    /// Reorder using indices into the compared (selected) view.
    ///
    /// Both indices are mapped to full-collection indices first; if either
    /// mapping fails the request is dropped.
    pub fn reorder_selected(&mut self, from: usize, to: usize) -> bool {
        let compared = self.compared_images();
        let full = self.images.as_slice();
        let mapped = map_filtered_index_to_full_index(&compared, full, from)
            .zip(map_filtered_index_to_full_index(&compared, full, to));
        match mapped {
            Some((full_from, full_to)) => self.reorder_images(full_from, full_to),
            None => {
                debug!(from, to, compared = compared.len(), "selected reorder dropped, no mapping");
                false
            }
        }
    }

    // ------------------------------------------------------------------
    // Selection mutations
    // ------------------------------------------------------------------

    /// Replace the selection with the known ids from `ids`, keeping their order.
    pub fn select_images<S: AsRef<str>>(&mut self, ids: &[S]) -> bool {
        let valid: Vec<&str> = ids
            .iter()
            .map(|id| id.as_ref())
            .filter(|id| self.images.contains_id(id))
            .collect();
        self.replace_selection(SelectionSet::from_ids(valid))
    }

    /// Select every image, in collection order
    pub fn select_all(&mut self) -> bool {
        let all = SelectionSet::from_ids(self.images.ids());
        self.replace_selection(all)
    }

    pub fn clear_selection(&mut self) -> bool {
        self.replace_selection(SelectionSet::new())
    }

    /// Deselect `id` if selected, otherwise append it to the selection.
    ///
    /// Ids not in the collection are ignored.
    pub fn toggle_image_selection(&mut self, id: &str) -> bool {
        if !self.images.contains_id(id) {
            debug!(image_id = id, "toggle ignored, no such image");
            return false;
        }
        let previous = self.selection.clone();
        self.selection.toggle(id);
        self.commit(previous, false);
        true
    }

    fn replace_selection(&mut self, selection: SelectionSet) -> bool {
        if selection == self.selection {
            return false;
        }
        let previous = std::mem::replace(&mut self.selection, selection);
        self.commit(previous, false);
        true
    }

    // ------------------------------------------------------------------
    // Dividers and display
    // ------------------------------------------------------------------

    /// Move divider `index` towards `percent` (clamped between neighbours).
    pub fn drag_divider(&mut self, index: usize, percent: f64) -> Option<f64> {
        let before = self.dividers.positions().get(index).copied();
        let position = self.dividers.set_position(index, percent)?;
        self.after_divider_move(before, position);
        Some(position)
    }

    /// Start a drag on divider `index`
    pub fn begin_divider_drag(&mut self, index: usize) -> bool {
        self.dividers.begin_drag(index)
    }

    /// Apply a drag step to the divider picked by [`begin_divider_drag`](Self::begin_divider_drag)
    pub fn drag_active_divider(&mut self, percent: f64) -> Option<f64> {
        let index = self.dividers.active_divider()?;
        self.drag_divider(index, percent)
    }

    pub fn end_divider_drag(&mut self) {
        self.dividers.end_drag();
    }

    fn after_divider_move(&mut self, before: Option<f64>, after: f64) {
        if before == Some(after) {
            return;
        }
        self.outbox
            .push(Notification::SliderChanged(self.dividers.positions().to_vec()));
        self.revision += 1;
        self.publish();
    }

    /// Replace the display options and publish.
    pub fn set_display_options(&mut self, options: DisplayOptions) -> bool {
        if options == self.options {
            return false;
        }
        self.options = options;
        self.revision += 1;
        self.publish();
        true
    }

    // ------------------------------------------------------------------
    // Transaction tail
    // ------------------------------------------------------------------

    fn commit(&mut self, previous_selection: SelectionSet, membership_changed: bool) {
        if membership_changed {
            // Auto-select-all whenever images are added or removed
            self.selection = SelectionSet::from_ids(self.images.ids());
        }
        debug_assert!(self
            .selection
            .as_slice()
            .iter()
            .all(|id| self.images.contains_id(id)));

        if self.selection != previous_selection {
            self.outbox
                .push(Notification::SelectionChanged(self.selection.to_vec()));
        }

        let previous_positions = self.dividers.positions().to_vec();
        if self.dividers.reflow(self.selection.len()) && self.dividers.positions() != previous_positions.as_slice() {
            self.outbox
                .push(Notification::SliderChanged(self.dividers.positions().to_vec()));
        }

        self.revision += 1;
        self.publish();
    }
}

//! # Imperative API
//!
//! [`ImagesComparator`] is what a host page holds after embedding the widget.
//! Construction mounts the widget into a container and publishes the first
//! snapshot. Every later call goes through the [`InstanceRegistry`] by
//! instance id, so the API keeps working the same way whether the caller
//! holds the comparator or only its id.
//!
//! Calls made after [`unmount`](ImagesComparator::unmount) do nothing and log
//! a warning.
//!
//! ## Example
//!
//! ```rust
//! use compare_core::comparator::ImagesComparator;
//! use compare_core::config::ComparatorConfig;
//! use compare_core::events::ComparatorEvents;
//! use compare_core::image::ImageConfig;
//! use compare_core::registry::InstanceRegistry;
//!
//! let registry = InstanceRegistry::new();
//! let host = |container_id: &str| container_id == "viewer";
//!
//! let mut comparator = ImagesComparator::new(
//!     &host,
//!     &registry,
//!     "viewer",
//!     ComparatorConfig::default(),
//!     ComparatorEvents::new(),
//! )
//! .unwrap();
//!
//! comparator.add_image(ImageConfig::new("https://cdn.example.com/before.png"));
//! comparator.add_image(ImageConfig::new("https://cdn.example.com/after.png"));
//! assert_eq!(comparator.get_images().len(), 2);
//! assert_eq!(comparator.get_slider_positions(), vec![50.0]);
//!
//! comparator.unmount();
//! assert!(comparator.get_images().is_empty());
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::config::{ComparatorConfig, DisplayOptions};
use crate::errors::{CompareError, CompareResult};
use crate::events::{ComparatorEvents, EventDispatcher};
use crate::image::{ImageConfig, ImageRecord};
use crate::registry::{InstanceId, InstanceRegistry, SharedStore, StoreHandle};
use crate::session::ComparisonSession;
use crate::store::{ComparisonStore, Publisher, StateSnapshot};
use crate::view::ComparisonView;

/// Something that can tell whether a mount target exists.
pub trait MountHost {
    fn has_container(&self, container_id: &str) -> bool;
}

impl MountHost for [&str] {
    fn has_container(&self, container_id: &str) -> bool {
        self.iter().any(|candidate| *candidate == container_id)
    }
}

impl<F> MountHost for F
where
    F: Fn(&str) -> bool,
{
    fn has_container(&self, container_id: &str) -> bool {
        self(container_id)
    }
}

/// A mounted comparison widget.
///
/// Dropping the comparator unmounts it.
#[derive(Debug)]
pub struct ImagesComparator {
    instance_id: InstanceId,
    container_id: String,
    registry: InstanceRegistry,
    /// The mounted tree; `None` once unmounted
    store: Option<SharedStore>,
}

impl ImagesComparator {
    /// Mount a new widget into `container_id`.
    ///
    /// # Errors
    ///
    /// [`CompareError::ContainerNotFound`] if `host` has no such container.
    pub fn new<H>(
        host: &H,
        registry: &InstanceRegistry,
        container_id: &str,
        config: ComparatorConfig,
        events: ComparatorEvents,
    ) -> CompareResult<Self>
    where
        H: MountHost + ?Sized,
    {
        if !host.has_container(container_id) {
            return Err(CompareError::container_not_found(container_id));
        }

        let instance_id = InstanceId::new();
        let options = config.display_options();
        let dispatcher = EventDispatcher::new(events);
        let store = Rc::new_cyclic(|weak| {
            let publisher = Publisher::new(
                registry.clone(),
                instance_id,
                StoreHandle::new(weak.clone()),
                dispatcher.clone(),
            );
            RefCell::new(ComparisonStore::seeded(config.images, options).with_publisher(publisher))
        });

        let notifications = {
            let mut store = store.borrow_mut();
            store.publish();
            store.take_notifications()
        };
        info!(%instance_id, container_id, "comparator mounted");
        dispatcher.dispatch(notifications);

        Ok(ImagesComparator {
            instance_id,
            container_id: container_id.to_string(),
            registry: registry.clone(),
            store: Some(store),
        })
    }

    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// Whether a live binding exists for this instance
    pub fn is_mounted(&self) -> bool {
        self.store.is_some() && self.registry.contains(&self.instance_id)
    }

    /// Tear the widget down and delete its binding. Idempotent.
    pub fn unmount(&mut self) {
        if let Some(store) = self.store.take() {
            self.registry.remove(&self.instance_id);
            drop(store);
            info!(instance_id = %self.instance_id, "comparator unmounted");
        }
    }

    fn mutate<R>(&self, operation: &str, f: impl FnOnce(&mut ComparisonStore) -> R) -> Option<R> {
        self.registry.with_store(&self.instance_id, operation, f)
    }

    fn read(&self, operation: &str) -> Option<Rc<StateSnapshot>> {
        let snapshot = self.registry.snapshot(&self.instance_id);
        if snapshot.is_none() {
            debug!(instance_id = %self.instance_id, operation, "no snapshot, comparator not mounted");
        }
        snapshot
    }

    // ------------------------------------------------------------------
    // Images
    // ------------------------------------------------------------------

    /// Add an image. Returns the new record, or `None` if it was a duplicate,
    /// was rejected, or the widget is not mounted.
    pub fn add_image(&self, config: ImageConfig) -> Option<ImageRecord> {
        match self.mutate("add_image", |store| store.add_image(config))? {
            Ok(added) => added,
            Err(err) => {
                warn!(instance_id = %self.instance_id, code = err.error_code(), "add_image rejected: {}", err);
                None
            }
        }
    }

    /// Add several images in order. Returns the ones actually added.
    pub fn add_images(&self, configs: Vec<ImageConfig>) -> Vec<ImageRecord> {
        self.mutate("add_images", |store| store.add_images(configs))
            .unwrap_or_default()
    }

    pub fn remove_image(&self, id: &str) -> bool {
        self.mutate("remove_image", |store| store.remove_image(id))
            .unwrap_or(false)
    }

    pub fn clear_images(&self) -> bool {
        self.mutate("clear_images", |store| store.clear_images())
            .unwrap_or(false)
    }

    pub fn update_image_label(&self, id: &str, label: &str) -> bool {
        self.mutate("update_image_label", |store| store.update_image_label(id, label))
            .unwrap_or(false)
    }

    /// Move an image within the full collection
    pub fn reorder_images(&self, from: usize, to: usize) -> bool {
        self.mutate("reorder_images", |store| store.reorder_images(from, to))
            .unwrap_or(false)
    }

    /// Move an image using indices into the compared view
    pub fn reorder_selected(&self, from: usize, to: usize) -> bool {
        self.mutate("reorder_selected", |store| store.reorder_selected(from, to))
            .unwrap_or(false)
    }

    /// All images as of the last publish; empty when not mounted
    pub fn get_images(&self) -> Vec<ImageRecord> {
        self.read("get_images")
            .map(|snapshot| snapshot.images.clone())
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn select_images<S: AsRef<str>>(&self, ids: &[S]) -> bool {
        self.mutate("select_images", |store| store.select_images(ids))
            .unwrap_or(false)
    }

    pub fn select_all(&self) -> bool {
        self.mutate("select_all", |store| store.select_all())
            .unwrap_or(false)
    }

    pub fn clear_selection(&self) -> bool {
        self.mutate("clear_selection", |store| store.clear_selection())
            .unwrap_or(false)
    }

    pub fn toggle_image_selection(&self, id: &str) -> bool {
        self.mutate("toggle_image_selection", |store| store.toggle_image_selection(id))
            .unwrap_or(false)
    }

    /// Selected ids in selection order; empty when not mounted
    pub fn get_selected_ids(&self) -> Vec<String> {
        self.read("get_selected_ids")
            .map(|snapshot| snapshot.selected_ids.clone())
            .unwrap_or_default()
    }

    /// Images in the comparison view, in collection order
    pub fn get_selected_images(&self) -> Vec<ImageRecord> {
        self.read("get_selected_images")
            .map(|snapshot| snapshot.compared_images())
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Dividers, display, derived views
    // ------------------------------------------------------------------

    /// Drag divider `index` to `percent` of the viewport width.
    pub fn drag_divider(&self, index: usize, percent: f64) -> Option<f64> {
        self.mutate("drag_divider", |store| store.drag_divider(index, percent))
            .flatten()
    }

    pub fn get_slider_positions(&self) -> Vec<f64> {
        self.read("get_slider_positions")
            .map(|snapshot| snapshot.slider_positions.clone())
            .unwrap_or_default()
    }

    pub fn set_display_options(&self, options: DisplayOptions) -> bool {
        self.mutate("set_display_options", |store| store.set_display_options(options))
            .unwrap_or(false)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Option<Rc<StateSnapshot>> {
        self.read("snapshot")
    }

    /// Render instructions for the current snapshot
    pub fn view(&self) -> Option<ComparisonView> {
        self.read("view").map(|snapshot| ComparisonView::build(&snapshot))
    }

    /// Session record of the current selection
    pub fn capture_session(&self, name: &str) -> Option<ComparisonSession> {
        self.read("capture_session")
            .map(|snapshot| ComparisonSession::new(name, snapshot.selected_ids.clone()))
    }
}

impl Drop for ImagesComparator {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn mount(registry: &InstanceRegistry, config: ComparatorConfig) -> ImagesComparator {
        ImagesComparator::new(&["viewer", "sidebar"][..], registry, "viewer", config, ComparatorEvents::new()).unwrap()
    }

    #[test]
    fn test_missing_container_is_fatal() {
        let registry = InstanceRegistry::new();
        let err = ImagesComparator::new(
            &["viewer"][..],
            &registry,
            "nowhere",
            ComparatorConfig::default(),
            ComparatorEvents::new(),
        )
        .unwrap_err();
        assert_eq!(err, CompareError::container_not_found("nowhere"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_closure_host() {
        let registry = InstanceRegistry::new();
        let containers: HashSet<String> = ["root".to_string()].into_iter().collect();
        let host = |id: &str| containers.contains(id);
        let comparator =
            ImagesComparator::new(&host, &registry, "root", ComparatorConfig::default(), ComparatorEvents::new()).unwrap();
        assert_eq!(comparator.container_id(), "root");
        assert!(comparator.is_mounted());
    }

    #[test]
    fn test_mount_publishes_immediately() {
        let registry = InstanceRegistry::new();
        let config = ComparatorConfig::default().with_images(vec![
            ImageConfig::new("https://x/a.png").with_id("A"),
            ImageConfig::new("https://x/b.png").with_id("B"),
        ]);
        let comparator = mount(&registry, config);
        assert!(comparator.is_mounted());
        assert_eq!(comparator.get_selected_ids(), vec!["A", "B"]);
        assert_eq!(comparator.get_slider_positions(), vec![50.0]);
    }

    #[test]
    fn test_unmount_removes_binding() {
        let registry = InstanceRegistry::new();
        let mut comparator = mount(&registry, ComparatorConfig::default());
        comparator.add_image(ImageConfig::new("https://x/a.png"));
        comparator.unmount();
        comparator.unmount();

        assert!(!comparator.is_mounted());
        assert!(registry.is_empty());
        assert!(comparator.get_images().is_empty());
        assert!(comparator.add_image(ImageConfig::new("https://x/b.png")).is_none());
        assert!(!comparator.select_all());
        assert!(comparator.snapshot().is_none());
    }

    #[test]
    fn test_drop_unmounts() {
        let registry = InstanceRegistry::new();
        {
            let _comparator = mount(&registry, ComparatorConfig::default());
            assert_eq!(registry.len(), 1);
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_read_after_write() {
        let registry = InstanceRegistry::new();
        let comparator = mount(&registry, ComparatorConfig::default());
        let added = comparator
            .add_image(ImageConfig::new("https://x/y/pic.png"))
            .unwrap();
        assert_eq!(added.name, "pic.png");
        assert_eq!(comparator.get_images(), vec![added.clone()]);
        assert_eq!(comparator.get_selected_ids(), vec![added.id]);
    }

    #[test]
    fn test_view_from_bridge() {
        let registry = InstanceRegistry::new();
        let comparator = mount(&registry, ComparatorConfig::default());
        comparator.add_images(vec![ImageConfig::new("https://x/a.png"), ImageConfig::new("https://x/b.png")]);
        assert_eq!(comparator.drag_divider(0, 70.0), Some(70.0));
        let view = comparator.view().unwrap();
        assert_eq!(view.dividers, vec![70.0]);
        assert_eq!(view.bands[1].inset_left, 70.0);
    }
}

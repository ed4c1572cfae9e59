//! # Instance Registry
//!
//! Maps an [`InstanceId`] to the most recently published [`InstanceBinding`]
//! of a mounted widget. External callers holding only an instance id read
//! state and drive mutations through it.
//!
//! ## Ownership
//!
//! - Exactly one writer per key: the owning instance's
//!   [`ComparisonStore`], which replaces the whole binding on every commit.
//! - The registry never owns a store. Bindings hold a weak handle, so an
//!   unmounted widget can never be mutated through a stale entry.
//! - Bindings are snapshots. Readers re-fetch after each mutation.
//!
//! The registry is an explicit value handed to every comparator that should
//! share it; there is no process-wide instance map.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::CompareError;
use crate::events::EventDispatcher;
use crate::store::{ComparisonStore, StateSnapshot};

/// Opaque per-mount identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(Uuid);

impl InstanceId {
    /// Fresh random id
    pub fn new() -> Self {
        InstanceId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        InstanceId::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A store owned by a mounted widget.
pub type SharedStore = Rc<RefCell<ComparisonStore>>;

/// Non-owning handle to a mounted widget's store.
#[derive(Clone, Default)]
pub struct StoreHandle(Weak<RefCell<ComparisonStore>>);

impl StoreHandle {
    pub fn new(store: Weak<RefCell<ComparisonStore>>) -> Self {
        StoreHandle(store)
    }

    /// Handle to an existing store
    pub fn from_shared(store: &SharedStore) -> Self {
        StoreHandle(Rc::downgrade(store))
    }

    /// The store, if the widget is still mounted
    pub fn upgrade(&self) -> Option<SharedStore> {
        self.0.upgrade()
    }
}

impl fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StoreHandle")
            .field(&if self.0.strong_count() > 0 { "live" } else { "dropped" })
            .finish()
    }
}

/// Everything an external caller needs to read and drive one instance.
#[derive(Debug, Clone)]
pub struct InstanceBinding {
    /// State as of the last committed mutation
    pub snapshot: Rc<StateSnapshot>,
    /// Mutators: the live store behind the snapshot
    pub store: StoreHandle,
    /// The instance's callbacks and pending-notification queue
    pub dispatcher: EventDispatcher,
}

/// Registry of live instance bindings.
///
/// Cloning shares the same map.
#[derive(Debug, Clone, Default)]
pub struct InstanceRegistry {
    bindings: Rc<RefCell<HashMap<InstanceId, InstanceBinding>>>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        InstanceRegistry::default()
    }

    /// Replace the binding for `instance_id`.
    pub fn publish(&self, instance_id: InstanceId, binding: InstanceBinding) {
        debug!(%instance_id, revision = binding.snapshot.revision, "publishing snapshot");
        self.bindings.borrow_mut().insert(instance_id, binding);
    }

    /// Current binding, cloned out so no borrow outlives the call
    pub fn lookup(&self, instance_id: &InstanceId) -> Option<InstanceBinding> {
        self.bindings.borrow().get(instance_id).cloned()
    }

    /// Latest published snapshot
    pub fn snapshot(&self, instance_id: &InstanceId) -> Option<Rc<StateSnapshot>> {
        self.bindings
            .borrow()
            .get(instance_id)
            .map(|binding| Rc::clone(&binding.snapshot))
    }

    /// Delete the binding. Returns `true` if one existed.
    pub fn remove(&self, instance_id: &InstanceId) -> bool {
        self.bindings.borrow_mut().remove(instance_id).is_some()
    }

    pub fn contains(&self, instance_id: &InstanceId) -> bool {
        self.bindings.borrow().contains_key(instance_id)
    }

    pub fn len(&self) -> usize {
        self.bindings.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.borrow().is_empty()
    }

    /// Ids of every bound instance, sorted
    pub fn instance_ids(&self) -> Vec<InstanceId> {
        let mut ids: Vec<_> = self.bindings.borrow().keys().copied().collect();
        ids.sort();
        ids
    }

    /// Run a mutation against the instance's store, then dispatch whatever
    /// notifications it queued.
    ///
    /// Returns `None` after logging a warning when the instance has no live
    /// binding. Callbacks run after the store borrow is released. When called
    /// from inside a callback, the new notifications join the instance queue
    /// and are delivered by the outermost call.
    pub fn with_store<R>(
        &self,
        instance_id: &InstanceId,
        operation: &str,
        f: impl FnOnce(&mut ComparisonStore) -> R,
    ) -> Option<R> {
        let Some(binding) = self.lookup(instance_id) else {
            report_not_mounted(instance_id, operation);
            return None;
        };
        let Some(store) = binding.store.upgrade() else {
            report_not_mounted(instance_id, operation);
            return None;
        };

        let (result, notifications) = {
            let mut store = store.borrow_mut();
            let result = f(&mut store);
            (result, store.take_notifications())
        };
        binding.dispatcher.dispatch(notifications);
        Some(result)
    }
}

fn report_not_mounted(instance_id: &InstanceId, operation: &str) {
    let err = CompareError::not_mounted(instance_id.to_string(), operation);
    warn!(%instance_id, operation, code = err.error_code(), "{}", err);
}

//! # Event Callbacks
//!
//! Caller-supplied, fire-and-forget callbacks. The store never invokes them
//! while it is mid-mutation: it queues [`Notification`]s and the owner
//! dispatches them once the store borrow is released, so a callback may call
//! straight back into the comparator.
//!
//! Each instance owns one [`EventDispatcher`]. Notifications raised by a
//! nested call (a callback mutating the comparator) join the back of the
//! same queue, and only the outermost dispatch drains it. Hosts therefore see
//! every event in commit order and the last one always matches current state.
//!
//! ## Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use compare_core::events::{ComparatorEvents, Notification};
//!
//! let removed = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&removed);
//! let events = ComparatorEvents::new().on_image_remove(move |id| sink.borrow_mut().push(id.to_string()));
//!
//! events.dispatch(vec![Notification::ImageRemoved("B".to_string())]);
//! assert_eq!(*removed.borrow(), vec!["B".to_string()]);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::image::ImageRecord;

type ImageAddFn = Rc<dyn Fn(&ImageRecord)>;
type ImageRemoveFn = Rc<dyn Fn(&str)>;
type SelectionChangeFn = Rc<dyn Fn(&[String])>;
type SliderChangeFn = Rc<dyn Fn(&[f64])>;

/// A state change waiting to be reported to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    ImageAdded(ImageRecord),
    ImageRemoved(String),
    SelectionChanged(Vec<String>),
    SliderChanged(Vec<f64>),
}

/// Callback table for one widget instance.
///
/// Cloning shares the callbacks.
#[derive(Clone, Default)]
pub struct ComparatorEvents {
    image_add: Option<ImageAddFn>,
    image_remove: Option<ImageRemoveFn>,
    selection_change: Option<SelectionChangeFn>,
    slider_change: Option<SliderChangeFn>,
}

impl ComparatorEvents {
    /// Empty table, no callbacks
    pub fn new() -> Self {
        ComparatorEvents::default()
    }

    pub fn on_image_add(mut self, f: impl Fn(&ImageRecord) + 'static) -> Self {
        self.image_add = Some(Rc::new(f));
        self
    }

    pub fn on_image_remove(mut self, f: impl Fn(&str) + 'static) -> Self {
        self.image_remove = Some(Rc::new(f));
        self
    }

    pub fn on_selection_change(mut self, f: impl Fn(&[String]) + 'static) -> Self {
        self.selection_change = Some(Rc::new(f));
        self
    }

    pub fn on_slider_change(mut self, f: impl Fn(&[f64]) + 'static) -> Self {
        self.slider_change = Some(Rc::new(f));
        self
    }

    /// Invoke the matching callback for one notification.
    pub fn emit(&self, notification: &Notification) {
        match notification {
            Notification::ImageAdded(record) => {
                if let Some(f) = &self.image_add {
                    f(record);
                }
            }
            Notification::ImageRemoved(id) => {
                if let Some(f) = &self.image_remove {
                    f(id.as_str());
                }
            }
            Notification::SelectionChanged(ids) => {
                if let Some(f) = &self.selection_change {
                    f(ids.as_slice());
                }
            }
            Notification::SliderChanged(positions) => {
                if let Some(f) = &self.slider_change {
                    f(positions.as_slice());
                }
            }
        }
    }

    /// Invoke callbacks for each notification, in order.
    pub fn dispatch(&self, notifications: impl IntoIterator<Item = Notification>) {
        for notification in notifications {
            self.emit(&notification);
        }
    }
}

impl fmt::Debug for ComparatorEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComparatorEvents")
            .field("on_image_add", &self.image_add.is_some())
            .field("on_image_remove", &self.image_remove.is_some())
            .field("on_selection_change", &self.selection_change.is_some())
            .field("on_slider_change", &self.slider_change.is_some())
            .finish()
    }
}

/// Per-instance FIFO of pending notifications.
///
/// Cloning shares the queue and the callbacks.
#[derive(Debug, Clone, Default)]
pub struct EventDispatcher {
    events: ComparatorEvents,
    pending: Rc<RefCell<VecDeque<Notification>>>,
    /// Non-zero while a flush is running further up the stack
    depth: Rc<Cell<u32>>,
}

/// Resets the flush depth even if a callback panics.
struct FlushGuard<'a> {
    depth: &'a Cell<u32>,
}

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

impl EventDispatcher {
    pub fn new(events: ComparatorEvents) -> Self {
        EventDispatcher {
            events,
            pending: Rc::new(RefCell::new(VecDeque::new())),
            depth: Rc::new(Cell::new(0)),
        }
    }

    pub fn events(&self) -> &ComparatorEvents {
        &self.events
    }

    /// Number of notifications waiting to be delivered
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Queue `notifications` and, unless a flush is already running, deliver
    /// everything queued in FIFO order.
    pub fn dispatch(&self, notifications: impl IntoIterator<Item = Notification>) {
        self.pending.borrow_mut().extend(notifications);
        if self.depth.get() > 0 {
            return;
        }

        self.depth.set(self.depth.get() + 1);
        let _guard = FlushGuard { depth: &self.depth };
        loop {
            // Borrow released before the callback runs
            let next = self.pending.borrow_mut().pop_front();
            let Some(notification) = next else {
                break;
            };
            self.events.emit(&notification);
        }
    }
}

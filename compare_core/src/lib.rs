//! # compare_core - Multi-Image Slider Comparison Engine
//!
//! `compare_core` is the state-and-geometry heart of a slider comparison
//! widget: N images overlaid in one viewport, split by N-1 draggable
//! dividers into clipped horizontal bands. It owns the image list, the
//! selection, the divider positions and the per-instance bridge a host page
//! uses to drive the widget. Painting pixels and capturing pointer events
//! belong to the presentation layer.
//!
//! ## Design Philosophy
//!
//! - **Single-threaded**: state lives behind `Rc<RefCell<_>>`, every
//!   operation is a synchronous transaction
//! - **Forgiving API**: duplicates, unknown ids and calls on unmounted
//!   instances are no-ops, never panics
//! - **JSON-First**: records, config and snapshots implement Serialize/Deserialize
//! - **Explicit registry**: instances are looked up in an
//!   [`InstanceRegistry`] passed in by the host, not a global
//!
//! ## Quick Start
//!
//! ```rust
//! use compare_core::{ComparatorConfig, ComparatorEvents, ImageConfig, ImagesComparator, InstanceRegistry};
//!
//! let registry = InstanceRegistry::new();
//! let config = ComparatorConfig::default().with_images(vec![
//!     ImageConfig::new("https://cdn.example.com/a.png").with_id("A"),
//!     ImageConfig::new("https://cdn.example.com/b.png").with_id("B"),
//!     ImageConfig::new("https://cdn.example.com/c.png").with_id("C"),
//! ]);
//! let comparator = ImagesComparator::new(
//!     &["viewer"][..],
//!     &registry,
//!     "viewer",
//!     config,
//!     ComparatorEvents::new(),
//! )
//! .unwrap();
//!
//! comparator.select_images(&["A", "C"]);
//! assert_eq!(comparator.get_slider_positions(), vec![50.0]);
//! ```
//!
//! ## Modules
//!
//! - [`image`] - Image records, caller configs, URL name derivation
//! - [`collection`] - Ordered image collection and selection set
//! - [`geometry`] - Divider positions, drag clamping, clip regions
//! - [`store`] - Transactional state store and snapshots
//! - [`registry`] - Instance registry and bindings
//! - [`comparator`] - Imperative API for host pages
//! - [`config`] - Construction options
//! - [`events`] - Host callbacks
//! - [`view`] - Render instructions derived from a snapshot
//! - [`session`] - In-memory comparison sessions
//! - [`errors`] - Structured error types

pub mod collection;
pub mod comparator;
pub mod config;
pub mod errors;
pub mod events;
pub mod geometry;
pub mod image;
pub mod registry;
pub mod session;
pub mod store;
pub mod view;

// Re-export commonly used types at crate root for convenience
pub use comparator::{ImagesComparator, MountHost};
pub use config::{ComparatorConfig, Dimension, DisplayOptions};
pub use errors::{CompareError, CompareResult};
pub use events::{ComparatorEvents, EventDispatcher, Notification};
pub use geometry::{ClipRegion, DividerLayout, ViewMode};
pub use image::{ImageConfig, ImageRecord};
pub use registry::{InstanceId, InstanceRegistry};
pub use store::{ComparisonStore, StateSnapshot};

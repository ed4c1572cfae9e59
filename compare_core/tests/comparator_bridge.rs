//! End-to-end scenarios through the imperative API: event ordering, the
//! not-mounted diagnostic, read-after-write through the registry, and
//! isolation between instances sharing one registry.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use compare_core::{
    ComparatorConfig, ComparatorEvents, ImageConfig, ImagesComparator, InstanceRegistry, ViewMode,
};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Added(String),
    Removed(String),
    Selection(Vec<String>),
    Slider(Vec<f64>),
}

fn recording_events() -> (ComparatorEvents, Rc<RefCell<Vec<Event>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let (add, remove, select, slide) = (Rc::clone(&log), Rc::clone(&log), Rc::clone(&log), Rc::clone(&log));
    let events = ComparatorEvents::new()
        .on_image_add(move |img| add.borrow_mut().push(Event::Added(img.id.clone())))
        .on_image_remove(move |id| remove.borrow_mut().push(Event::Removed(id.to_string())))
        .on_selection_change(move |ids| select.borrow_mut().push(Event::Selection(ids.to_vec())))
        .on_slider_change(move |p| slide.borrow_mut().push(Event::Slider(p.to_vec())));
    (events, log)
}

fn abc_config() -> ComparatorConfig {
    ComparatorConfig::default().with_images(vec![
        ImageConfig::new("https://cdn.example.com/a.png").with_id("A"),
        ImageConfig::new("https://cdn.example.com/b.png").with_id("B"),
        ImageConfig::new("https://cdn.example.com/c.png").with_id("C"),
    ])
}

fn mount(registry: &InstanceRegistry, config: ComparatorConfig, events: ComparatorEvents) -> ImagesComparator {
    ImagesComparator::new(&["viewer"][..], registry, "viewer", config, events).expect("container exists")
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn mount_reports_initial_selection_and_dividers() {
    let registry = InstanceRegistry::new();
    let (events, log) = recording_events();
    let _comparator = mount(&registry, abc_config(), events);

    let expected = vec![
        Event::Selection(ids(&["A", "B", "C"])),
        Event::Slider(vec![(1.0 / 3.0) * 100.0, (2.0 / 3.0) * 100.0]),
    ];
    assert_eq!(*log.borrow(), expected);
}

#[test]
fn remove_image_fires_once_each() {
    let registry = InstanceRegistry::new();
    let (events, log) = recording_events();
    let comparator = mount(&registry, abc_config(), events);
    log.borrow_mut().clear();

    assert!(comparator.remove_image("B"));
    assert_eq!(comparator.get_selected_ids(), ids(&["A", "C"]));

    let log = log.borrow();
    let removed: Vec<_> = log.iter().filter(|e| matches!(e, Event::Removed(_))).collect();
    let selections: Vec<_> = log.iter().filter(|e| matches!(e, Event::Selection(_))).collect();
    assert_eq!(removed, vec![&Event::Removed("B".to_string())]);
    assert_eq!(selections, vec![&Event::Selection(ids(&["A", "C"]))]);
}

#[test]
fn removing_unknown_id_stays_silent() {
    let registry = InstanceRegistry::new();
    let (events, log) = recording_events();
    let comparator = mount(&registry, abc_config(), events);
    log.borrow_mut().clear();

    assert!(!comparator.remove_image("Z"));
    assert!(log.borrow().is_empty());
}

#[test]
fn select_then_reorder_follows_collection_order() {
    let registry = InstanceRegistry::new();
    let comparator = mount(&registry, abc_config(), ComparatorEvents::new());

    assert!(comparator.select_images(&["A", "C"]));
    let compared = |c: &ImagesComparator| -> Vec<String> {
        c.get_selected_images().into_iter().map(|img| img.id).collect()
    };
    assert_eq!(compared(&comparator), ids(&["A", "C"]));

    let images = comparator.get_images();
    let from = images.iter().position(|img| img.id == "A").unwrap();
    let to = images.iter().position(|img| img.id == "C").unwrap();
    assert!(comparator.reorder_images(from, to));

    assert_eq!(compared(&comparator), ids(&["C", "A"]));
    assert_eq!(comparator.get_selected_ids(), ids(&["A", "C"]));
}

#[test]
fn duplicate_url_is_added_once() {
    let registry = InstanceRegistry::new();
    let (events, log) = recording_events();
    let comparator = mount(&registry, ComparatorConfig::default(), events);

    assert!(comparator.add_image(ImageConfig::new("https://x/y/pic.png")).is_some());
    assert!(comparator.add_image(ImageConfig::new("https://x/y/pic.png")).is_none());

    let images = comparator.get_images();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].name, "pic.png");
    let adds = log.borrow().iter().filter(|e| matches!(e, Event::Added(_))).count();
    assert_eq!(adds, 1);
}

#[test]
fn add_images_skips_later_duplicates() {
    let registry = InstanceRegistry::new();
    let comparator = mount(&registry, ComparatorConfig::default(), ComparatorEvents::new());

    let added = comparator.add_images(vec![
        ImageConfig::new("https://x/1.png").with_id("one"),
        ImageConfig::new("https://x/2.png").with_id("two"),
        ImageConfig::new("https://x/1.png").with_id("three"),
        ImageConfig::new("https://x/3.png").with_id("two"),
    ]);
    assert_eq!(added.len(), 2);
    assert_eq!(comparator.get_selected_ids(), ids(&["one", "two"]));
}

#[test]
fn clear_images_sends_no_per_image_removals() {
    let registry = InstanceRegistry::new();
    let (events, log) = recording_events();
    let comparator = mount(&registry, abc_config(), events);
    log.borrow_mut().clear();

    assert!(comparator.clear_images());
    assert!(comparator.get_images().is_empty());
    assert!(comparator.get_selected_ids().is_empty());
    assert!(!log.borrow().iter().any(|e| matches!(e, Event::Removed(_))));
    assert_eq!(comparator.view().unwrap().mode, ViewMode::Empty);
}

#[test]
fn update_label_changes_only_the_label() {
    let registry = InstanceRegistry::new();
    let comparator = mount(&registry, abc_config(), ComparatorEvents::new());
    let before = comparator.get_images();

    assert!(comparator.update_image_label("B", "Reference"));
    let after = comparator.get_images();
    assert_eq!(after[1].label.as_deref(), Some("Reference"));
    assert_eq!(after[1].name, before[1].name);
    assert_eq!(after[1].url, before[1].url);
    assert_eq!(after[0], before[0]);
}

#[test]
fn divider_drag_reports_positions() {
    let registry = InstanceRegistry::new();
    let (events, log) = recording_events();
    let comparator = mount(&registry, abc_config(), events);
    log.borrow_mut().clear();

    // Divider 1 cannot pass below divider 0 + 2
    let stored = comparator.drag_divider(1, 0.0).unwrap();
    assert!((stored - ((1.0 / 3.0) * 100.0 + 2.0)).abs() < 1e-9);
    assert_eq!(comparator.get_slider_positions()[1], stored);
    assert_eq!(log.borrow().len(), 1);
    assert!(comparator.drag_divider(2, 50.0).is_none());
}

#[test]
fn instances_do_not_interfere() {
    let registry = InstanceRegistry::new();
    let first = mount(&registry, abc_config(), ComparatorEvents::new());
    let mut second = mount(&registry, ComparatorConfig::default(), ComparatorEvents::new());
    assert_ne!(first.instance_id(), second.instance_id());

    second.add_image(ImageConfig::new("https://cdn.example.com/a.png").with_id("A"));
    assert!(first.remove_image("B"));

    assert_eq!(first.get_images().len(), 2);
    assert_eq!(second.get_images().len(), 1);

    second.unmount();
    assert!(first.is_mounted());
    assert_eq!(registry.len(), 1);
}

#[test]
fn callbacks_may_call_back_into_the_comparator() {
    let registry = InstanceRegistry::new();
    let slot: Rc<RefCell<Option<Rc<ImagesComparator>>>> = Rc::new(RefCell::new(None));
    let inner = Rc::clone(&slot);
    let (recorded, log) = recording_events();
    let events = recorded.on_image_add({
        let log = Rc::clone(&log);
        move |img| {
            log.borrow_mut().push(Event::Added(img.id.clone()));
            if img.id == "A" {
                if let Some(comparator) = inner.borrow().as_ref() {
                    comparator.add_image(ImageConfig::new("https://cdn.example.com/follow-up.png").with_id("F"));
                }
            }
        }
    });

    let comparator = Rc::new(mount(&registry, ComparatorConfig::default(), events));
    *slot.borrow_mut() = Some(Rc::clone(&comparator));

    comparator.add_image(ImageConfig::new("https://cdn.example.com/a.png").with_id("A"));
    let image_ids: Vec<_> = comparator.get_images().into_iter().map(|img| img.id).collect();
    assert_eq!(image_ids, vec!["A", "F"]);

    // Events arrive in commit order, so the last report matches current state
    let log = log.borrow();
    let selections: Vec<&Vec<String>> = log
        .iter()
        .filter_map(|e| match e {
            Event::Selection(selected) => Some(selected),
            _ => None,
        })
        .collect();
    assert_eq!(selections, vec![&ids(&["A"]), &ids(&["A", "F"])]);
    assert_eq!(selections.last().map(|selected| (*selected).clone()), Some(comparator.get_selected_ids()));

    let last_slider = log.iter().rev().find_map(|e| match e {
        Event::Slider(positions) => Some(positions.clone()),
        _ => None,
    });
    assert_eq!(last_slider, Some(comparator.get_slider_positions()));

    let added: Vec<_> = log
        .iter()
        .filter_map(|e| match e {
            Event::Added(id) => Some(id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(added, vec!["A", "F"]);
    drop(log);

    // Break the cycle so the comparator unmounts
    slot.borrow_mut().take();
}

#[derive(Debug, Default)]
struct CapturedWarnings {
    messages: Vec<String>,
}

struct WarningCapture {
    state: Arc<Mutex<CapturedWarnings>>,
}

impl<S> Layer<S> for WarningCapture
where
    S: Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != tracing::Level::WARN {
            return;
        }

        #[derive(Default)]
        struct MessageVisitor {
            message: String,
        }

        impl tracing::field::Visit for MessageVisitor {
            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.message = format!("{:?}", value);
                }
            }
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.state
            .lock()
            .expect("warning capture lock")
            .messages
            .push(visitor.message);
    }
}

#[test]
fn calls_after_unmount_warn_and_do_nothing() {
    let state = Arc::new(Mutex::new(CapturedWarnings::default()));
    let subscriber = tracing_subscriber::registry().with(WarningCapture {
        state: Arc::clone(&state),
    });
    let _guard = tracing::subscriber::set_default(subscriber);
    tracing::callsite::rebuild_interest_cache();

    let registry = InstanceRegistry::new();
    let mut comparator = mount(&registry, abc_config(), ComparatorEvents::new());
    comparator.unmount();

    assert!(comparator.add_image(ImageConfig::new("https://cdn.example.com/d.png")).is_none());
    assert!(!comparator.remove_image("A"));
    assert!(comparator.get_images().is_empty());
    assert!(comparator.get_selected_ids().is_empty());

    tracing::callsite::rebuild_interest_cache();
    let captured = state.lock().expect("warning capture lock");
    assert_eq!(
        captured.messages.len(),
        2,
        "expected one warning per mutator, got {:?}",
        captured.messages
    );
    assert!(captured.messages.iter().all(|m| m.contains("not mounted")));
}

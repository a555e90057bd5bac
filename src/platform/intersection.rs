//! Viewport-intersection primitive.
//!
//! Providers notify a single subscriber over an mpsc channel whenever an
//! observed element enters or leaves the observation region. Delivery is
//! asynchronous from the subscriber's point of view: entries queue up
//! until the subscriber drains its receiver.

use crate::dom::ElementId;
use crate::layout::Rect;
use crate::Viewport;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// One intersection change for an observed element
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry {
    pub target: ElementId,
    pub is_intersecting: bool,
    /// Target box at the time of the change, if it has one
    pub bounds: Option<Rect>,
}

pub trait IntersectionObserver: Send + Sync {
    /// Start watching `target`. An element without a layout box never
    /// intersects.
    fn observe(&self, target: ElementId, bounds: Option<Rect>);

    /// Stop watching `target`. Unknown targets are ignored.
    fn unobserve(&self, target: ElementId);

    fn is_observing(&self, target: ElementId) -> bool;

    /// Open the notification channel. A later call replaces the earlier
    /// subscriber, whose receiver then sees no further entries.
    fn subscribe(&self) -> Receiver<IntersectionEntry>;
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct Target {
    bounds: Option<Rect>,
    intersecting: bool,
}

struct RootState {
    viewport: Viewport,
    scroll_y: i32,
    root_margin: u32,
    observers: Vec<Weak<ViewportObserver>>,
}

impl RootState {
    fn rect(&self) -> Rect {
        Rect::new(0, self.scroll_y, self.viewport.width, self.viewport.height).expand(self.root_margin)
    }
}

/// Scroll position and viewport size shared by every [`ViewportObserver`]
/// created from it.
///
/// Observers are independent, like separate browser observers on one
/// page: each has its own targets and its own subscriber. Scrolling or
/// resizing the root re-evaluates all of them.
pub struct ViewportRoot {
    state: Mutex<RootState>,
}

impl ViewportRoot {
    pub fn new(viewport: Viewport, root_margin: u32) -> Arc<Self> {
        Arc::new(ViewportRoot {
            state: Mutex::new(RootState {
                viewport,
                scroll_y: 0,
                root_margin,
                observers: Vec::new(),
            }),
        })
    }

    /// Create a new observer bound to this root.
    pub fn observer(self: &Arc<Self>) -> Arc<ViewportObserver> {
        let observer = Arc::new(ViewportObserver {
            root: Arc::clone(self),
            state: Mutex::new(ObserverState {
                targets: BTreeMap::new(),
                sender: None,
            }),
        });
        lock(&self.state).observers.push(Arc::downgrade(&observer));
        observer
    }

    pub fn scroll_to(&self, y: i32) {
        self.update(|s| s.scroll_y = y);
    }

    pub fn scroll_y(&self) -> i32 {
        lock(&self.state).scroll_y
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.update(|s| s.viewport = viewport);
    }

    /// Targets observed across all live observers
    pub fn observed_count(&self) -> usize {
        self.live_observers().iter().map(|o| o.observed_count()).sum()
    }

    fn rect(&self) -> Rect {
        lock(&self.state).rect()
    }

    fn live_observers(&self) -> Vec<Arc<ViewportObserver>> {
        let mut s = lock(&self.state);
        s.observers.retain(|w| w.strong_count() > 0);
        s.observers.iter().filter_map(Weak::upgrade).collect()
    }

    fn update(&self, change: impl FnOnce(&mut RootState)) {
        let rect = {
            let mut s = lock(&self.state);
            change(&mut *s);
            s.rect()
        };
        // root lock released before any observer lock is taken
        for observer in self.live_observers() {
            observer.reevaluate(rect);
        }
    }
}

struct ObserverState {
    targets: BTreeMap<ElementId, Target>,
    sender: Option<Sender<IntersectionEntry>>,
}

impl ObserverState {
    fn send(&self, entry: IntersectionEntry) {
        if let Some(tx) = &self.sender {
            // a dropped receiver just means nobody is listening any more
            let _ = tx.send(entry);
        }
    }
}

/// Geometry-backed provider: observed boxes are tested against the
/// scrolled viewport of its [`ViewportRoot`], grown by the root margin.
///
/// Like the browser primitive, observing a target queues an initial entry
/// with its current state; after that, entries are queued only when the
/// state flips as the root scrolls or resizes.
pub struct ViewportObserver {
    root: Arc<ViewportRoot>,
    state: Mutex<ObserverState>,
}

impl ViewportObserver {
    pub fn root(&self) -> Arc<ViewportRoot> {
        Arc::clone(&self.root)
    }

    pub fn observed_count(&self) -> usize {
        lock(&self.state).targets.len()
    }

    fn reevaluate(&self, root: Rect) {
        let mut s = lock(&self.state);
        let mut changed = Vec::new();
        for (id, t) in s.targets.iter_mut() {
            let now = t.bounds.map(|b| root.intersects(&b)).unwrap_or(false);
            if now != t.intersecting {
                t.intersecting = now;
                changed.push(IntersectionEntry {
                    target: *id,
                    is_intersecting: now,
                    bounds: t.bounds,
                });
            }
        }
        for entry in changed {
            s.send(entry);
        }
    }
}

impl IntersectionObserver for ViewportObserver {
    fn observe(&self, target: ElementId, bounds: Option<Rect>) {
        let root = self.root.rect();
        let intersecting = bounds.map(|b| root.intersects(&b)).unwrap_or(false);
        let mut s = lock(&self.state);
        s.targets.insert(target, Target { bounds, intersecting });
        s.send(IntersectionEntry {
            target,
            is_intersecting: intersecting,
            bounds,
        });
    }

    fn unobserve(&self, target: ElementId) {
        lock(&self.state).targets.remove(&target);
    }

    fn is_observing(&self, target: ElementId) -> bool {
        lock(&self.state).targets.contains_key(&target)
    }

    fn subscribe(&self) -> Receiver<IntersectionEntry> {
        let (tx, rx) = channel();
        lock(&self.state).sender = Some(tx);
        rx
    }
}

struct ManualState {
    observed: BTreeMap<ElementId, Option<Rect>>,
    history: BTreeSet<ElementId>,
    sender: Option<Sender<IntersectionEntry>>,
}

/// Provider driven by hand, for deterministic tests.
pub struct ManualIntersectionObserver {
    state: Mutex<ManualState>,
}

impl ManualIntersectionObserver {
    pub fn new() -> Self {
        ManualIntersectionObserver {
            state: Mutex::new(ManualState {
                observed: BTreeMap::new(),
                history: BTreeSet::new(),
                sender: None,
            }),
        }
    }

    /// Queue an entering entry for `target`. Returns false, sending
    /// nothing, when `target` is not observed.
    pub fn trigger(&self, target: ElementId) -> bool {
        self.emit(target, true)
    }

    /// Queue a leaving entry for `target`.
    pub fn trigger_exit(&self, target: ElementId) -> bool {
        self.emit(target, false)
    }

    /// Queue an entry even for an unobserved target, as a misbehaving
    /// platform might.
    pub fn force(&self, entry: IntersectionEntry) {
        let s = lock(&self.state);
        if let Some(tx) = &s.sender {
            let _ = tx.send(entry);
        }
    }

    /// Whether `target` was ever passed to `observe`
    pub fn was_observed(&self, target: ElementId) -> bool {
        lock(&self.state).history.contains(&target)
    }

    fn emit(&self, target: ElementId, is_intersecting: bool) -> bool {
        let s = lock(&self.state);
        let Some(bounds) = s.observed.get(&target).copied() else {
            return false;
        };
        if let Some(tx) = &s.sender {
            let _ = tx.send(IntersectionEntry {
                target,
                is_intersecting,
                bounds,
            });
        }
        true
    }
}

impl Default for ManualIntersectionObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl IntersectionObserver for ManualIntersectionObserver {
    fn observe(&self, target: ElementId, bounds: Option<Rect>) {
        let mut s = lock(&self.state);
        s.observed.insert(target, bounds);
        s.history.insert(target);
    }

    fn unobserve(&self, target: ElementId) {
        lock(&self.state).observed.remove(&target);
    }

    fn is_observing(&self, target: ElementId) -> bool {
        lock(&self.state).observed.contains_key(&target)
    }

    fn subscribe(&self) -> Receiver<IntersectionEntry> {
        let (tx, rx) = channel();
        lock(&self.state).sender = Some(tx);
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &Receiver<IntersectionEntry>) -> Vec<IntersectionEntry> {
        rx.try_iter().collect()
    }

    #[test]
    fn viewport_observer_reports_initial_state_then_changes() {
        let obs = ViewportRoot::new(Viewport { width: 100, height: 100 }, 0).observer();
        let rx = obs.subscribe();

        obs.observe(ElementId(1), Some(Rect::new(0, 10, 50, 50)));
        obs.observe(ElementId(2), Some(Rect::new(0, 300, 50, 50)));
        obs.observe(ElementId(3), None);
        let initial = drain(&rx);
        assert_eq!(initial.len(), 3);
        assert!(initial[0].is_intersecting);
        assert!(!initial[1].is_intersecting);
        assert!(!initial[2].is_intersecting);

        obs.root().scroll_to(250);
        let changes = drain(&rx);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].target, ElementId(1));
        assert!(!changes[0].is_intersecting);
        assert_eq!(changes[1].target, ElementId(2));
        assert!(changes[1].is_intersecting);

        // no flip, no entry
        obs.root().scroll_to(260);
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn root_margin_extends_the_region() {
        let obs = ViewportRoot::new(Viewport { width: 100, height: 100 }, 50).observer();
        let rx = obs.subscribe();
        obs.observe(ElementId(0), Some(Rect::new(0, 140, 10, 10)));
        assert!(drain(&rx)[0].is_intersecting);
    }

    #[test]
    fn unobserved_targets_stay_silent() {
        let obs = ViewportRoot::new(Viewport { width: 100, height: 100 }, 0).observer();
        let rx = obs.subscribe();
        obs.observe(ElementId(4), Some(Rect::new(0, 500, 10, 10)));
        obs.unobserve(ElementId(4));
        drain(&rx);
        obs.root().scroll_to(480);
        assert!(drain(&rx).is_empty());
        assert!(!obs.is_observing(ElementId(4)));
    }

    #[test]
    fn manual_observer_only_triggers_observed_targets() {
        let obs = ManualIntersectionObserver::new();
        let rx = obs.subscribe();
        assert!(!obs.trigger(ElementId(7)));
        obs.observe(ElementId(7), None);
        assert!(obs.trigger(ElementId(7)));
        obs.unobserve(ElementId(7));
        assert!(!obs.trigger(ElementId(7)));
        assert!(obs.was_observed(ElementId(7)));
        assert_eq!(drain(&rx).len(), 1);
    }

    #[test]
    fn observers_on_one_root_are_independent() {
        let root = ViewportRoot::new(Viewport { width: 100, height: 100 }, 0);
        let a = root.observer();
        let b = root.observer();
        let rx_a = a.subscribe();
        let rx_b = b.subscribe();

        // same id, different documents
        a.observe(ElementId(3), Some(Rect::new(0, 400, 10, 10)));
        b.observe(ElementId(3), Some(Rect::new(0, 900, 10, 10)));
        drain(&rx_a);
        drain(&rx_b);

        b.unobserve(ElementId(3));
        assert!(a.is_observing(ElementId(3)));
        assert_eq!(root.observed_count(), 1);

        root.scroll_to(350);
        assert_eq!(drain(&rx_a).len(), 1);
        assert!(drain(&rx_b).is_empty());
        assert_eq!(root.scroll_y(), 350);
    }

    #[test]
    fn dropped_observers_leave_the_root() {
        let root = ViewportRoot::new(Viewport::default(), 0);
        let a = root.observer();
        a.observe(ElementId(0), None);
        drop(a);
        assert_eq!(root.observed_count(), 0);
        root.scroll_to(10);
    }
}

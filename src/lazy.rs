//! Lazy-load controller.
//!
//! The controller scans a document once, on activation, for elements
//! carrying the pending-source attribute and hands each one to an
//! [`IntersectionObserver`]. When an element first intersects, its pending
//! source becomes its live `src`, the marker class is dropped and the
//! element is unobserved. Each element moves through
//! `Unobserved -> Observed -> Loaded` and never back.
//!
//! Without an observer the controller does nothing and every image keeps
//! whatever source the page gave it, i.e. images load eagerly.
//!
//! ```
//! use luxeimg::dom::Document;
//! use luxeimg::lazy::{LazyLoadController, LoadState};
//! use luxeimg::platform::{IntersectionObserver, ManualIntersectionObserver};
//! use luxeimg::LazyLoadConfig;
//! use std::sync::Arc;
//!
//! let mut doc = Document::parse_html(r#"<img class="lazy" data-src="/images/optimized/hero.webp">"#).unwrap();
//! let observer = Arc::new(ManualIntersectionObserver::new());
//! let shared: Arc<dyn IntersectionObserver> = observer.clone();
//! let mut controller = LazyLoadController::new(LazyLoadConfig::default(), Some(shared));
//!
//! assert_eq!(controller.activate(&doc), 1);
//! let img = doc.elements_with_attr("data-src")[0];
//! observer.trigger(img);
//! assert_eq!(controller.process(&mut doc), vec![img]);
//! assert_eq!(doc.get(img).unwrap().attr("src"), Some("/images/optimized/hero.webp"));
//! assert_eq!(controller.state(img), LoadState::Loaded);
//! ```

use crate::dom::{Document, Element, ElementId};
use crate::platform::{IntersectionEntry, IntersectionObserver, PlatformApi};
use crate::LazyLoadConfig;
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Unobserved,
    Observed,
    /// Terminal
    Loaded,
}

pub struct LazyLoadController {
    config: LazyLoadConfig,
    observer: Option<Arc<dyn IntersectionObserver>>,
    events: Option<Receiver<IntersectionEntry>>,
    states: BTreeMap<ElementId, LoadState>,
    activated: bool,
}

impl LazyLoadController {
    pub fn new(config: LazyLoadConfig, observer: Option<Arc<dyn IntersectionObserver>>) -> Self {
        Self {
            config,
            observer,
            events: None,
            states: BTreeMap::new(),
            activated: false,
        }
    }

    /// Use whatever intersection primitive `platform` offers, if any.
    pub fn from_platform(config: LazyLoadConfig, platform: &dyn PlatformApi) -> Self {
        Self::new(config, platform.intersection_observer())
    }

    pub fn config(&self) -> &LazyLoadConfig {
        &self.config
    }

    /// Whether an intersection primitive was provided
    pub fn is_supported(&self) -> bool {
        self.observer.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.activated
    }

    /// Scan `doc` for pending elements and start observing them. Returns
    /// how many are now observed.
    ///
    /// Runs once: later calls do not re-scan, so elements the page adds
    /// afterwards are left alone. Any element carrying the attribute is
    /// observed, but one without a layout box (see
    /// [`crate::layout::layout_document`]) never intersects a geometry-backed
    /// observer and so stays pending.
    pub fn activate(&mut self, doc: &Document) -> usize {
        if self.activated {
            warn!("lazy loading already active; ignoring repeated activation");
            return 0;
        }
        self.activated = true;

        let Some(observer) = &self.observer else {
            debug!("no intersection observer available; images load eagerly");
            return 0;
        };

        // subscribe before observing so initial entries are not lost
        self.events = Some(observer.subscribe());

        let pending = doc.elements_with_attr(&self.config.pending_attribute);
        for &id in &pending {
            let bounds = doc.get(id).and_then(Element::bounds);
            observer.observe(id, bounds);
            self.states.insert(id, LoadState::Observed);
        }
        debug!("observing {} lazy element(s)", pending.len());
        pending.len()
    }

    /// Drain queued intersection entries and react to each. Returns the
    /// elements loaded by this call, in delivery order.
    pub fn process(&mut self, doc: &mut Document) -> Vec<ElementId> {
        let entries: Vec<IntersectionEntry> = match &self.events {
            Some(rx) => rx.try_iter().collect(),
            None => return Vec::new(),
        };

        entries
            .iter()
            .filter(|entry| self.handle_entry(doc, entry))
            .map(|entry| entry.target)
            .collect()
    }

    /// React to a single entry. Returns true when it loaded the element.
    ///
    /// Leaving entries and entries for elements that are not currently
    /// observed are ignored. If the page removed the element, or its
    /// pending attribute, the element is dropped from observation instead.
    pub fn handle_entry(&mut self, doc: &mut Document, entry: &IntersectionEntry) -> bool {
        if !entry.is_intersecting || self.state(entry.target) != LoadState::Observed {
            return false;
        }

        let id = entry.target;
        let pending = doc
            .get(id)
            .and_then(|el| el.attr(&self.config.pending_attribute))
            .map(str::to_string);

        let (Some(src), Some(el)) = (pending, doc.get_mut(id)) else {
            debug!("lazy element {} is gone; no longer observing it", id);
            self.release(id);
            self.states.remove(&id);
            return false;
        };

        el.set_attr("src", src);
        el.remove_class(&self.config.marker_class);
        self.release(id);
        self.states.insert(id, LoadState::Loaded);
        debug!("loaded lazy element {}", id);
        true
    }

    pub fn state(&self, id: ElementId) -> LoadState {
        self.states.get(&id).copied().unwrap_or(LoadState::Unobserved)
    }

    /// Elements still waiting to intersect
    pub fn observed_count(&self) -> usize {
        self.count(LoadState::Observed)
    }

    pub fn loaded_count(&self) -> usize {
        self.count(LoadState::Loaded)
    }

    /// Per-element states, in document order
    pub fn states(&self) -> impl Iterator<Item = (ElementId, LoadState)> + '_ {
        self.states.iter().map(|(id, s)| (*id, *s))
    }

    fn count(&self, state: LoadState) -> usize {
        self.states.values().filter(|s| **s == state).count()
    }

    fn release(&self, id: ElementId) {
        if let Some(observer) = &self.observer {
            observer.unobserve(id);
        }
    }
}

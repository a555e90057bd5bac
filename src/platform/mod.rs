//! Platform API surface: the viewport-intersection primitive
//!
//! A platform may or may not offer intersection observation. Consumers ask
//! the platform for a provider and must cope with `None`.

pub mod intersection;

pub use intersection::{
    IntersectionEntry, IntersectionObserver, ManualIntersectionObserver, ViewportObserver, ViewportRoot,
};

use crate::Viewport;
use std::sync::Arc;

pub trait PlatformApi: Send + Sync {
    /// `None` when the runtime has no intersection primitive
    fn intersection_observer(&self) -> Option<Arc<dyn IntersectionObserver>>;
}

/// A platform without intersection observation.
pub struct NoopPlatform;

impl NoopPlatform {
    pub fn new() -> Self {
        NoopPlatform
    }
}

impl Default for NoopPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformApi for NoopPlatform {
    fn intersection_observer(&self) -> Option<Arc<dyn IntersectionObserver>> {
        None
    }
}

/// Platform backed by a shared [`ViewportRoot`]. Every call to
/// `intersection_observer` hands out a fresh [`ViewportObserver`] on that
/// root; the host keeps the root through [`root`](Self::root) to scroll and
/// resize.
pub struct ViewportPlatform {
    root: Arc<ViewportRoot>,
}

impl ViewportPlatform {
    pub fn new(viewport: Viewport, root_margin: u32) -> Self {
        ViewportPlatform {
            root: ViewportRoot::new(viewport, root_margin),
        }
    }

    pub fn root(&self) -> Arc<ViewportRoot> {
        Arc::clone(&self.root)
    }
}

impl PlatformApi for ViewportPlatform {
    fn intersection_observer(&self) -> Option<Arc<dyn IntersectionObserver>> {
        let observer: Arc<dyn IntersectionObserver> = self.root.observer();
        Some(observer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementId;

    #[test]
    fn noop_platform_has_no_observer() {
        assert!(NoopPlatform::new().intersection_observer().is_none());
    }

    #[test]
    fn viewport_platform_hands_out_separate_observers() {
        let p = ViewportPlatform::new(Viewport::default(), 0);
        let a = p.intersection_observer().expect("observer available");
        let b = p.intersection_observer().expect("observer available");
        a.observe(ElementId(0), None);
        assert!(!b.is_observing(ElementId(0)));
        assert_eq!(p.root().observed_count(), 1);
    }
}

//! Visibility tracking: decides when a deferred image starts loading.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::LazyLoadConfig;
use crate::lazy::coordinator::ImageLoadCoordinator;
use crate::lazy::intersection::{IntersectionEntry, IntersectionObserver};
use crate::lazy::state::ImageRegistry;
use crate::page::{Document, Element, Selector, Viewport};

pub struct VisibilityTracker {
    document: Document,
    selector: Selector,
    config: Arc<LazyLoadConfig>,
    /// `None` when the platform has no intersection primitive.
    observer: Option<IntersectionObserver>,
    registry: Arc<ImageRegistry>,
    coordinator: Arc<ImageLoadCoordinator>,
    torn_down: AtomicBool,
}

impl VisibilityTracker {
    pub fn new(
        document: Document,
        selector: Selector,
        config: Arc<LazyLoadConfig>,
        observer: Option<IntersectionObserver>,
        registry: Arc<ImageRegistry>,
        coordinator: Arc<ImageLoadCoordinator>,
    ) -> Self {
        Self {
            document,
            selector,
            config,
            observer,
            registry,
            coordinator,
            torn_down: AtomicBool::new(false),
        }
    }

    /// True when images are loaded eagerly instead of on visibility.
    pub fn is_fallback(&self) -> bool {
        self.observer.is_none()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::Acquire)
    }

    /// Matching elements that have not reached a terminal state.
    pub fn candidates(&self) -> Vec<Element> {
        self.document
            .query_selector_all(&self.selector)
            .into_iter()
            .filter(|e| !e.has_class(&self.config.loaded_class) && !e.has_class(&self.config.error_class))
            .collect()
    }

    /// Start tracking every untracked candidate. Returns how many were
    /// newly tracked (or, in fallback mode, how many loads started).
    pub fn observe(&self) -> usize {
        if self.is_torn_down() {
            return 0;
        }

        let Some(observer) = &self.observer else {
            return self.coordinator.load_all_images(self.candidates()).len();
        };

        let mut added = 0;
        for element in self.candidates() {
            if !self.registry.observe(&element) {
                continue;
            }
            if element.src().is_none() {
                element.set_src(&self.config.placeholder_src);
            }
            element.add_class(&self.config.loading_class);
            observer.observe(&element);
            added += 1;
        }

        if added > 0 {
            tracing::debug!(added, tracked = observer.len(), "Observing deferred images");
        }
        added
    }

    /// Re-scan the document, e.g. after new content was inserted.
    pub fn refresh(&self) -> usize {
        self.observe()
    }

    /// Check visibility against `viewport` and hand off visible images.
    pub fn update(&self, viewport: &Viewport) -> usize {
        if self.is_torn_down() {
            return 0;
        }
        match &self.observer {
            Some(observer) => self.handle_entries(observer.take_records(viewport)),
            None => 0,
        }
    }

    /// Hand off every entry that meets the threshold and is still tracked.
    /// Tracking stops before the hand-off, so each element is handed off
    /// once per observation cycle.
    pub fn handle_entries(&self, entries: Vec<IntersectionEntry>) -> usize {
        let Some(observer) = &self.observer else {
            return 0;
        };
        if self.is_torn_down() {
            return 0;
        }

        let mut handed_off = 0;
        for entry in entries {
            if !entry.meets(observer.threshold()) || !observer.unobserve(&entry.target) {
                continue;
            }
            tracing::trace!(
                element = %entry.target.id(),
                ratio = entry.intersection_ratio,
                "Deferred image became visible"
            );
            self.coordinator.load_image(entry.target);
            handed_off += 1;
        }
        handed_off
    }

    pub fn is_tracking(&self, element: &Element) -> bool {
        self.observer.as_ref().is_some_and(|o| o.is_observing(element))
    }

    pub fn tracked_count(&self) -> usize {
        self.observer.as_ref().map_or(0, IntersectionObserver::len)
    }

    /// Stop all visibility tracking. Idempotent.
    pub fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(observer) = &self.observer {
            observer.disconnect();
        }
        tracing::debug!("Visibility tracking stopped");
    }
}

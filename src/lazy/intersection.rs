//! Viewport intersection primitive.
//!
//! Computes, for each observed element, how much of its bounds falls inside
//! the viewport grown by the root margin.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::page::geometry::{Rect, RootMargin, Viewport};
use crate::page::Element;

#[derive(Debug, Clone)]
pub struct IntersectionEntry {
    pub target: Element,
    pub is_intersecting: bool,
    /// Visible fraction of the target's area, 0.0..=1.0.
    pub intersection_ratio: f64,
}

impl IntersectionEntry {
    fn compute(target: &Element, root: &Rect) -> Self {
        let bounds = target.bounds();
        let (is_intersecting, intersection_ratio) = match bounds.intersection(root) {
            None => (false, 0.0),
            Some(_) if bounds.area() == 0.0 => (true, 1.0),
            Some(overlap) => (true, (overlap.area() / bounds.area()).min(1.0)),
        };
        Self {
            target: target.clone(),
            is_intersecting,
            intersection_ratio,
        }
    }

    pub fn meets(&self, threshold: f64) -> bool {
        self.is_intersecting && self.intersection_ratio >= threshold
    }
}

pub struct IntersectionObserver {
    root_margin: RootMargin,
    threshold: f64,
    targets: Mutex<Vec<Element>>,
}

impl IntersectionObserver {
    pub fn new(root_margin: RootMargin, threshold: f64) -> Self {
        Self {
            root_margin,
            threshold,
            targets: Mutex::new(Vec::new()),
        }
    }

    fn targets(&self) -> MutexGuard<'_, Vec<Element>> {
        self.targets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns false if `element` was already observed.
    pub fn observe(&self, element: &Element) -> bool {
        let mut targets = self.targets();
        if targets.contains(element) {
            return false;
        }
        targets.push(element.clone());
        true
    }

    /// Returns false if `element` was not observed.
    pub fn unobserve(&self, element: &Element) -> bool {
        let mut targets = self.targets();
        let before = targets.len();
        targets.retain(|t| t != element);
        targets.len() != before
    }

    pub fn disconnect(&self) {
        self.targets().clear();
    }

    pub fn is_observing(&self, element: &Element) -> bool {
        self.targets().contains(element)
    }

    pub fn len(&self) -> usize {
        self.targets().len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets().is_empty()
    }

    /// One entry per observed element, in observation order.
    pub fn take_records(&self, viewport: &Viewport) -> Vec<IntersectionEntry> {
        let root = viewport.rect().expand(&self.root_margin);
        self.targets()
            .iter()
            .map(|target| IntersectionEntry::compute(target, &root))
            .collect()
    }
}

//! Per-image lifecycle state.
//!
//! # State Transitions
//! ```text
//! Pending --observe()--> Observed --visible--> Loading
//! Loading --preload success--> Loaded (terminal)
//! Loading --preload failure & retries remain--> Loading (after backoff)
//! Loading --preload failure & retries exhausted--> Failed (terminal)
//! ```
//!
//! Terminal images leave the registry; their outcome stays visible on the
//! element through the loaded/error class.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::page::{Element, ElementId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageState {
    Pending,
    Observed,
    Loading,
    Loaded,
    Failed,
}

impl ImageState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ImageState::Loaded | ImageState::Failed)
    }
}

/// A deferred image being tracked.
#[derive(Debug, Clone)]
pub struct DeferredImage {
    pub element: Element,
    /// Real source, from `data-src`.
    pub target_source: Option<String>,
    pub state: ImageState,
    pub retry_count: u32,
}

impl DeferredImage {
    pub fn discover(element: &Element) -> Self {
        Self {
            element: element.clone(),
            target_source: element.dataset("src").filter(|s| !s.is_empty()),
            state: ImageState::Pending,
            retry_count: 0,
        }
    }
}

/// Images that are observed or loading, keyed by element.
#[derive(Debug, Default)]
pub struct ImageRegistry {
    entries: DashMap<ElementId, DeferredImage>,
}

impl ImageRegistry {
    /// Start tracking `element` as Observed. Returns false if it is already
    /// observed or loading.
    pub fn observe(&self, element: &Element) -> bool {
        match self.entries.entry(element.id()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                let mut image = DeferredImage::discover(element);
                image.state = ImageState::Observed;
                slot.insert(image);
                true
            }
        }
    }

    /// Move `element` to Loading. Returns false if a load is already in
    /// flight, so each element has at most one.
    pub fn begin_loading(&self, element: &Element) -> bool {
        match self.entries.entry(element.id()) {
            Entry::Occupied(mut slot) => {
                let image = slot.get_mut();
                if image.state == ImageState::Loading {
                    return false;
                }
                image.state = ImageState::Loading;
                image.target_source = element.dataset("src").filter(|s| !s.is_empty());
                true
            }
            Entry::Vacant(slot) => {
                let mut image = DeferredImage::discover(element);
                image.state = ImageState::Loading;
                slot.insert(image);
                true
            }
        }
    }

    pub fn set_retry_count(&self, id: ElementId, retry_count: u32) {
        if let Some(mut image) = self.entries.get_mut(&id) {
            image.retry_count = retry_count;
        }
    }

    /// Stop tracking `id`, returning its last snapshot.
    pub fn finish(&self, id: ElementId) -> Option<DeferredImage> {
        self.entries.remove(&id).map(|(_, image)| image)
    }

    pub fn state(&self, id: ElementId) -> Option<ImageState> {
        self.entries.get(&id).map(|image| image.state)
    }

    pub fn snapshot(&self, id: ElementId) -> Option<DeferredImage> {
        self.entries.get(&id).map(|image| image.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Lazy image loading subsystem.
//!
//! # Data Flow
//! ```text
//! initial scan ─┐
//! watcher.rs ───┴→ tracker.rs (placeholder, loading class, observe)
//!     → intersection.rs (bounds vs. viewport + root margin)
//!     → coordinator.rs (preload, linear backoff retries via ledger.rs)
//!     → events.rs (ImageEvent::Loaded / ImageEvent::Error)
//! ```
//!
//! Without an intersection primitive every candidate is loaded eagerly.
//! All background work runs on the ambient Tokio runtime and stops when the
//! loader is destroyed or dropped.

pub mod coordinator;
pub mod events;
pub mod fetch;
pub mod intersection;
pub mod ledger;
pub mod state;
pub mod tracker;
pub mod watcher;

use std::sync::Arc;

use thiserror::Error;

use crate::config::LazyLoadConfig;
use crate::lifecycle::Shutdown;
use crate::page::geometry::{GeometryError, RootMargin};
use crate::page::selector::SelectorError;
use crate::page::{Document, Element, Selector, Viewport};

pub use coordinator::{ImageLoadCoordinator, LoadOutcome};
pub use events::{EventBus, ImageEvent, ImageEventSink, LogEvents};
pub use fetch::{FetchError, HttpImageFetcher, ImageFetcher};
pub use intersection::{IntersectionEntry, IntersectionObserver};
pub use ledger::RetryLedger;
pub use state::{DeferredImage, ImageRegistry, ImageState};
pub use tracker::VisibilityTracker;
pub use watcher::DomWatcher;

#[derive(Debug, Error)]
pub enum LazyLoadError {
    #[error("invalid selector: {0}")]
    Selector(#[from] SelectorError),

    #[error("invalid root margin: {0}")]
    RootMargin(#[from] GeometryError),

    #[error("threshold {0} is outside 0.0..=1.0")]
    Threshold(f64),

    #[error("invalid base url: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// What the hosting platform offers, resolved once when a loader is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformCapabilities {
    pub intersection_observer: bool,
    pub mutation_observer: bool,
}

impl PlatformCapabilities {
    /// No visibility primitive: load everything immediately.
    pub const fn eager() -> Self {
        Self {
            intersection_observer: false,
            mutation_observer: false,
        }
    }
}

impl Default for PlatformCapabilities {
    fn default() -> Self {
        Self {
            intersection_observer: true,
            mutation_observer: true,
        }
    }
}

pub struct LazyLoaderBuilder {
    document: Document,
    config: LazyLoadConfig,
    capabilities: PlatformCapabilities,
    fetcher: Option<Arc<dyn ImageFetcher>>,
    events: Option<Arc<dyn ImageEventSink>>,
    ledger: Option<Arc<RetryLedger>>,
}

impl LazyLoaderBuilder {
    pub fn config(mut self, config: LazyLoadConfig) -> Self {
        self.config = config;
        self
    }

    pub fn capabilities(mut self, capabilities: PlatformCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Defaults to [`HttpImageFetcher`] built from the config.
    pub fn fetcher(mut self, fetcher: Arc<dyn ImageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Defaults to [`LogEvents`].
    pub fn events(mut self, events: Arc<dyn ImageEventSink>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn ledger(mut self, ledger: Arc<RetryLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Build the loader and run the initial scan. Must be called from
    /// within a Tokio runtime.
    pub fn build(self) -> Result<LazyLoader, LazyLoadError> {
        let selector: Selector = self.config.selector.parse()?;
        let root_margin: RootMargin = self.config.root_margin.parse()?;
        if !(0.0..=1.0).contains(&self.config.threshold) {
            return Err(LazyLoadError::Threshold(self.config.threshold));
        }

        let fetcher: Arc<dyn ImageFetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpImageFetcher::from_config(&self.config)?),
        };
        let events = self.events.unwrap_or_else(|| Arc::new(LogEvents));
        let ledger = self.ledger.unwrap_or_default();
        let config = Arc::new(self.config);
        let shutdown = Shutdown::new();
        let registry = Arc::new(ImageRegistry::default());

        let coordinator = Arc::new(ImageLoadCoordinator::new(
            Arc::clone(&config),
            fetcher,
            events,
            ledger,
            Arc::clone(&registry),
            shutdown.subscribe(),
        ));

        let observer = self
            .capabilities
            .intersection_observer
            .then(|| IntersectionObserver::new(root_margin, config.threshold));

        let tracker = Arc::new(VisibilityTracker::new(
            self.document.clone(),
            selector.clone(),
            Arc::clone(&config),
            observer,
            Arc::clone(&registry),
            Arc::clone(&coordinator),
        ));

        // Subscribe before the first scan so no insertion slips between them.
        let watcher = self.capabilities.mutation_observer.then(|| {
            DomWatcher::spawn(
                self.document.subscribe_mutations(),
                selector,
                Arc::clone(&tracker),
                shutdown.subscribe(),
            )
        });

        let initial = tracker.observe();
        tracing::info!(
            selector = %config.selector,
            fallback = tracker.is_fallback(),
            watching_mutations = watcher.is_some(),
            initial,
            "Lazy loader initialised"
        );

        Ok(LazyLoader {
            tracker,
            coordinator,
            registry,
            config,
            watcher,
            shutdown,
        })
    }
}

/// Visibility tracker, load coordinator and DOM watcher wired together.
pub struct LazyLoader {
    tracker: Arc<VisibilityTracker>,
    coordinator: Arc<ImageLoadCoordinator>,
    registry: Arc<ImageRegistry>,
    config: Arc<LazyLoadConfig>,
    watcher: Option<DomWatcher>,
    shutdown: Shutdown,
}

impl LazyLoader {
    pub fn builder(document: Document) -> LazyLoaderBuilder {
        LazyLoaderBuilder {
            document,
            config: LazyLoadConfig::default(),
            capabilities: PlatformCapabilities::default(),
            fetcher: None,
            events: None,
            ledger: None,
        }
    }

    pub fn tracker(&self) -> &Arc<VisibilityTracker> {
        &self.tracker
    }

    pub fn coordinator(&self) -> &Arc<ImageLoadCoordinator> {
        &self.coordinator
    }

    pub fn is_fallback(&self) -> bool {
        self.tracker.is_fallback()
    }

    pub fn is_watching_mutations(&self) -> bool {
        self.watcher.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// The viewport moved or resized.
    pub fn update_viewport(&self, viewport: &Viewport) -> usize {
        self.tracker.update(viewport)
    }

    pub fn refresh(&self) -> usize {
        self.tracker.refresh()
    }

    /// Current lifecycle state of `element`. Images that left the registry
    /// report their terminal state from the element's classes.
    pub fn state_of(&self, element: &Element) -> ImageState {
        if let Some(state) = self.registry.state(element.id()) {
            return state;
        }
        if element.has_class(&self.config.loaded_class) {
            ImageState::Loaded
        } else if element.has_class(&self.config.error_class) {
            ImageState::Failed
        } else {
            ImageState::Pending
        }
    }

    /// Stop tracking, stop the DOM watcher and abandon pending loads.
    /// Idempotent.
    pub fn destroy(&self) {
        if self.shutdown.is_triggered() {
            return;
        }
        self.tracker.teardown();
        self.shutdown.trigger();
        tracing::info!("Lazy loader destroyed");
    }
}

impl Drop for LazyLoader {
    fn drop(&mut self) {
        self.destroy();
    }
}

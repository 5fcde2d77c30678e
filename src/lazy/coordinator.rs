//! Image load coordination: preload, retry with linear backoff, and
//! terminal events.
//!
//! Each hand-off spawns one task that owns the attempt loop for that
//! element, so an element's transitions are strictly sequential. Tasks
//! stop at the next suspension point once shutdown is triggered.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::LazyLoadConfig;
use crate::lazy::events::{ImageEvent, ImageEventSink};
use crate::lazy::fetch::{FetchError, ImageFetcher};
use crate::lazy::ledger::RetryLedger;
use crate::lazy::state::ImageRegistry;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::page::Element;
use crate::resilience::backoff::linear_backoff;

/// How a load task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Failed,
    /// Shutdown interrupted the task before it settled.
    Abandoned,
}

pub struct ImageLoadCoordinator {
    config: Arc<LazyLoadConfig>,
    fetcher: Arc<dyn ImageFetcher>,
    events: Arc<dyn ImageEventSink>,
    ledger: Arc<RetryLedger>,
    registry: Arc<ImageRegistry>,
    shutdown: ShutdownSignal,
}

impl ImageLoadCoordinator {
    pub fn new(
        config: Arc<LazyLoadConfig>,
        fetcher: Arc<dyn ImageFetcher>,
        events: Arc<dyn ImageEventSink>,
        ledger: Arc<RetryLedger>,
        registry: Arc<ImageRegistry>,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            config,
            fetcher,
            events,
            ledger,
            registry,
            shutdown,
        }
    }

    pub fn ledger(&self) -> &Arc<RetryLedger> {
        &self.ledger
    }

    /// Start loading `element`'s `data-src` in the background.
    ///
    /// Returns `None` without doing anything when the element has no
    /// target source, already has a load in flight, or shutdown has begun.
    /// Must be called from within a Tokio runtime.
    pub fn load_image(self: &Arc<Self>, element: Element) -> Option<JoinHandle<LoadOutcome>> {
        let Some(source) = element.dataset("src").filter(|s| !s.is_empty()) else {
            tracing::debug!(element = %element.id(), "No data-src, skipping");
            // Forget it so a later observe pass can pick it up again.
            self.registry.finish(element.id());
            return None;
        };

        if self.shutdown.is_triggered() {
            return None;
        }

        if !self.registry.begin_loading(&element) {
            tracing::debug!(element = %element.id(), src = %source, "Load already in flight");
            return None;
        }

        let this = Arc::clone(self);
        Some(tokio::spawn(async move { this.run(element, source).await }))
    }

    /// Fallback path: start a load for every candidate at once.
    pub fn load_all_images<I>(self: &Arc<Self>, candidates: I) -> Vec<JoinHandle<LoadOutcome>>
    where
        I: IntoIterator<Item = Element>,
    {
        candidates
            .into_iter()
            .filter_map(|element| self.load_image(element))
            .collect()
    }

    async fn run(self: Arc<Self>, element: Element, source: String) -> LoadOutcome {
        let mut shutdown = self.shutdown.clone();
        // Owned by this task; other elements with the same source keep their own.
        let mut retry = 0;

        loop {
            let attempt = tokio::select! {
                result = self.fetcher.preload(&source) => result,
                _ = shutdown.recv() => return self.abandon(&element, &source),
            };

            let cause = match attempt {
                Ok(()) => return self.complete(&element, &source),
                Err(cause) => cause,
            };

            if retry >= self.config.max_retries {
                return self.fail(&element, &source, cause);
            }

            retry += 1;
            self.ledger.record(&source, retry);
            self.registry.set_retry_count(element.id(), retry);
            let delay = linear_backoff(retry, self.config.retry_base_ms);
            metrics::record_image_retry();
            tracing::warn!(
                src = %source,
                retry,
                max_retries = self.config.max_retries,
                delay = ?delay,
                error = %cause,
                "Image preload failed, retrying"
            );

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.recv() => return self.abandon(&element, &source),
            }
        }
    }

    fn complete(&self, element: &Element, source: &str) -> LoadOutcome {
        element.set_src(source);
        element.remove_class(&self.config.loading_class);
        element.add_class(&self.config.loaded_class);
        self.registry.finish(element.id());
        self.ledger.clear(source);

        metrics::record_image_load("loaded");
        tracing::debug!(element = %element.id(), src = %source, "Image loaded");
        self.events.emit(ImageEvent::Loaded {
            element: element.clone(),
            source: source.to_string(),
        });
        LoadOutcome::Loaded
    }

    fn fail(&self, element: &Element, source: &str, cause: FetchError) -> LoadOutcome {
        element.remove_class(&self.config.loading_class);
        element.add_class(&self.config.error_class);
        self.registry.finish(element.id());
        self.ledger.clear(source);

        metrics::record_image_load("failed");
        tracing::debug!(element = %element.id(), src = %source, error = %cause, "Image retries exhausted");
        self.events.emit(ImageEvent::Error {
            element: element.clone(),
            source: source.to_string(),
            cause,
        });
        LoadOutcome::Failed
    }

    fn abandon(&self, element: &Element, source: &str) -> LoadOutcome {
        self.registry.finish(element.id());
        self.ledger.clear(source);

        metrics::record_image_load("abandoned");
        tracing::debug!(element = %element.id(), src = %source, "Image load abandoned on shutdown");
        LoadOutcome::Abandoned
    }
}

//! Watches the document for inserted deferred images.

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::lazy::tracker::VisibilityTracker;
use crate::lifecycle::ShutdownSignal;
use crate::page::{MutationRecord, Selector};

/// Background task that refreshes the tracker whenever matching elements
/// are added to the page. It never touches image state itself.
pub struct DomWatcher {
    task: JoinHandle<()>,
}

impl DomWatcher {
    pub fn spawn(
        mutations: broadcast::Receiver<MutationRecord>,
        selector: Selector,
        tracker: Arc<VisibilityTracker>,
        shutdown: ShutdownSignal,
    ) -> Self {
        let task = tokio::spawn(run(mutations, selector, tracker, shutdown));
        Self { task }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// True if any added subtree, root included, holds a matching element.
pub fn wants_refresh(record: &MutationRecord, selector: &Selector) -> bool {
    record.added.iter().any(|node| selector.matches_subtree(node))
}

async fn run(
    mut mutations: broadcast::Receiver<MutationRecord>,
    selector: Selector,
    tracker: Arc<VisibilityTracker>,
    mut shutdown: ShutdownSignal,
) {
    loop {
        tokio::select! {
            received = mutations.recv() => match received {
                Ok(record) => {
                    if wants_refresh(&record, &selector) {
                        let added = tracker.refresh();
                        tracing::debug!(added, "New deferred images inserted");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Mutation feed lagged, rescanning");
                    tracker.refresh();
                }
                Err(RecvError::Closed) => break,
            },
            _ = shutdown.recv() => break,
        }
    }
    tracing::debug!("DOM watcher stopped");
}

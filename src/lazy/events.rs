//! Lifecycle events emitted by the coordinator.

use tokio::sync::broadcast;

use crate::lazy::fetch::FetchError;
use crate::page::Element;

const EVENT_CAPACITY: usize = 256;

/// Terminal outcome of a deferred image.
#[derive(Debug, Clone)]
pub enum ImageEvent {
    Loaded {
        element: Element,
        source: String,
    },
    Error {
        element: Element,
        source: String,
        cause: FetchError,
    },
}

impl ImageEvent {
    pub fn element(&self) -> &Element {
        match self {
            ImageEvent::Loaded { element, .. } | ImageEvent::Error { element, .. } => element,
        }
    }

    pub fn source(&self) -> &str {
        match self {
            ImageEvent::Loaded { source, .. } | ImageEvent::Error { source, .. } => source,
        }
    }
}

/// Destination for image events.
pub trait ImageEventSink: Send + Sync {
    fn emit(&self, event: ImageEvent);
}

/// Fan-out of image events to any number of subscribers.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ImageEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ImageEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageEventSink for EventBus {
    fn emit(&self, event: ImageEvent) {
        // Events with no listener are dropped.
        let _ = self.tx.send(event);
    }
}

/// Logs every event; the default sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEvents;

impl ImageEventSink for LogEvents {
    fn emit(&self, event: ImageEvent) {
        match &event {
            ImageEvent::Loaded { source, .. } => {
                tracing::info!(src = %source, "Image loaded successfully");
            }
            ImageEvent::Error { source, cause, .. } => {
                tracing::error!(src = %source, error = %cause, "Image failed to load");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_subscriber_receives_events() {
        let bus = EventBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        let element = Element::new("img");
        bus.emit(ImageEvent::Loaded {
            element: element.clone(),
            source: "a.jpg".into(),
        });

        for rx in [&mut a, &mut b] {
            let event = rx.recv().await.unwrap();
            assert_eq!(event.element(), &element);
            assert_eq!(event.source(), "a.jpg");
        }
    }

    #[test]
    fn test_emit_without_subscribers() {
        EventBus::new().emit(ImageEvent::Loaded {
            element: Element::new("img"),
            source: "a.jpg".into(),
        });
        LogEvents.emit(ImageEvent::Error {
            element: Element::new("img"),
            source: "b.jpg".into(),
            cause: FetchError::NotAnImage { url: "b.jpg".into() },
        });
    }
}

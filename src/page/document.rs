//! The page tree and its mutation feed.

use tokio::sync::broadcast;

use crate::page::element::Element;
use crate::page::selector::Selector;

const MUTATION_CAPACITY: usize = 256;

/// Insertions and removals under one parent.
#[derive(Debug, Clone)]
pub struct MutationRecord {
    pub target: Element,
    pub added: Vec<Element>,
    pub removed: Vec<Element>,
}

/// A page rooted at `body`.
///
/// Tree changes made through the document are broadcast to every
/// subscriber of [`Document::subscribe_mutations`].
#[derive(Clone)]
pub struct Document {
    body: Element,
    mutations: broadcast::Sender<MutationRecord>,
}

impl Document {
    pub fn new() -> Self {
        let (mutations, _) = broadcast::channel(MUTATION_CAPACITY);
        Self {
            body: Element::new("body"),
            mutations,
        }
    }

    pub fn body(&self) -> &Element {
        &self.body
    }

    /// Matching elements under `body`, in document order.
    pub fn query_selector_all(&self, selector: &Selector) -> Vec<Element> {
        selector.select_in(&self.body)
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
        self.body
            .subtree()
            .into_iter()
            .find(|e| e.attr("id").as_deref() == Some(id))
    }

    pub fn append_child(&self, parent: &Element, child: Element) {
        parent.append_child(child.clone());
        self.notify(MutationRecord {
            target: parent.clone(),
            added: vec![child],
            removed: Vec::new(),
        });
    }

    pub fn remove_child(&self, parent: &Element, child: &Element) -> Option<Element> {
        let removed = parent.remove_child(child)?;
        self.notify(MutationRecord {
            target: parent.clone(),
            added: Vec::new(),
            removed: vec![removed.clone()],
        });
        Some(removed)
    }

    pub fn subscribe_mutations(&self) -> broadcast::Receiver<MutationRecord> {
        self.mutations.subscribe()
    }

    fn notify(&self, record: MutationRecord) {
        // No subscribers is fine; nobody is watching yet.
        let _ = self.mutations.send(record);
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mutations_are_broadcast() {
        let doc = Document::new();
        let mut rx = doc.subscribe_mutations();

        let gallery = Element::new("div").with_attr("id", "gallery");
        doc.append_child(doc.body(), gallery.clone());
        let img = Element::new("img").with_class("lazy-image");
        doc.append_child(&gallery, img.clone());

        let first = rx.recv().await.unwrap();
        assert_eq!(first.target, *doc.body());
        assert_eq!(first.added, vec![gallery.clone()]);

        let second = rx.recv().await.unwrap();
        assert_eq!(second.added, vec![img.clone()]);

        let selector: Selector = ".lazy-image".parse().unwrap();
        assert_eq!(doc.query_selector_all(&selector), vec![img.clone()]);
        assert_eq!(doc.get_element_by_id("gallery"), Some(gallery.clone()));

        doc.remove_child(&gallery, &img);
        let third = rx.recv().await.unwrap();
        assert_eq!(third.removed, vec![img]);
        assert!(doc.query_selector_all(&selector).is_empty());
    }
}

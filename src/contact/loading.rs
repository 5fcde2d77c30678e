//! Busy state for forms that are submitting.

use dashmap::DashSet;

use crate::page::{Document, Element};

pub const LOADING_CLASS: &str = "is-loading";

/// Tracks which forms have a submission in flight and mirrors that onto
/// the form element (`is-loading` class, `aria-busy`) when a document is
/// attached.
#[derive(Default)]
pub struct LoadingStateManager {
    document: Option<Document>,
    loading: DashSet<String>,
}

impl LoadingStateManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: Document) -> Self {
        Self {
            document: Some(document),
            loading: DashSet::new(),
        }
    }

    fn element(&self, form_id: &str) -> Option<Element> {
        self.document.as_ref()?.get_element_by_id(form_id)
    }

    /// Mark `form_id` busy. Returns false if it already was.
    pub fn try_start(&self, form_id: &str) -> bool {
        if !self.loading.insert(form_id.to_string()) {
            return false;
        }
        if let Some(element) = self.element(form_id) {
            element.add_class(LOADING_CLASS);
            element.set_attr("aria-busy", "true");
        }
        true
    }

    pub fn stop_loading(&self, form_id: &str) {
        self.loading.remove(form_id);
        if let Some(element) = self.element(form_id) {
            element.remove_class(LOADING_CLASS);
            element.set_attr("aria-busy", "false");
        }
    }

    pub fn is_loading(&self, form_id: &str) -> bool {
        self.loading.contains(form_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_start_rejected() {
        let manager = LoadingStateManager::new();
        assert!(manager.try_start("contactForm"));
        assert!(!manager.try_start("contactForm"));
        assert!(manager.try_start("newsletter"));

        manager.stop_loading("contactForm");
        assert!(!manager.is_loading("contactForm"));
        assert!(manager.try_start("contactForm"));
    }

    #[test]
    fn test_form_element_reflects_state() {
        let doc = Document::new();
        let form = Element::new("form").with_attr("id", "contactForm");
        doc.append_child(doc.body(), form.clone());
        let manager = LoadingStateManager::with_document(doc);

        manager.try_start("contactForm");
        assert!(form.has_class(LOADING_CLASS));
        assert_eq!(form.attr("aria-busy").as_deref(), Some("true"));

        manager.stop_loading("contactForm");
        assert!(!form.has_class(LOADING_CLASS));
        assert_eq!(form.attr("aria-busy").as_deref(), Some("false"));
    }
}

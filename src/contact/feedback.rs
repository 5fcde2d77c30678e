//! Per-field feedback on a form in the page.
//!
//! Fields are the `input` and `textarea` elements under the form that carry
//! a `name`; their current value is the `value` attribute.

use crate::contact::form::{
    RawSubmission, ERR_EMAIL_INVALID, ERR_MESSAGE_REQUIRED, ERR_MESSAGE_TOO_LONG,
    ERR_NAME_REQUIRED, ERR_PROJECT_REQUIRED,
};
use crate::contact::response::ContactResponse;
use crate::page::{Document, Element};

pub const INVALID_CLASS: &str = "is-invalid";
pub const VALID_CLASS: &str = "is-valid";

/// Field a validation message refers to.
fn field_for_error(error: &str) -> Option<&'static str> {
    match error {
        ERR_NAME_REQUIRED => Some("name"),
        ERR_EMAIL_INVALID => Some("email"),
        ERR_PROJECT_REQUIRED => Some("project"),
        ERR_MESSAGE_REQUIRED | ERR_MESSAGE_TOO_LONG => Some("message"),
        _ => None,
    }
}

pub struct FormFeedback {
    document: Document,
}

impl FormFeedback {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn fields(&self, form_id: &str) -> Vec<(String, Element)> {
        let Some(form) = self.document.get_element_by_id(form_id) else {
            return Vec::new();
        };
        form.subtree()
            .into_iter()
            .filter(|e| matches!(e.tag(), "input" | "textarea"))
            .filter_map(|e| e.attr("name").map(|name| (name, e)))
            .collect()
    }

    /// Current field values of `form_id`, or `None` if there is no such form.
    pub fn read(&self, form_id: &str) -> Option<RawSubmission> {
        self.document.get_element_by_id(form_id)?;
        let mut raw = RawSubmission::default();
        for (name, field) in self.fields(form_id) {
            raw.set_field(&name, field.attr("value").unwrap_or_default());
        }
        Some(raw)
    }

    /// Flag the fields named by `response`'s errors invalid and the rest
    /// valid. Errors that name no field (delivery, network) leave the fields
    /// untouched. Returns the number of invalid fields.
    pub fn apply(&self, form_id: &str, response: &ContactResponse) -> usize {
        let invalid: Vec<&str> = response
            .errors
            .iter()
            .filter_map(|e| field_for_error(e))
            .collect();
        if invalid.is_empty() {
            return 0;
        }

        let mut flagged = 0;
        for (name, field) in self.fields(form_id) {
            if invalid.contains(&name.as_str()) {
                field.remove_class(VALID_CLASS);
                field.add_class(INVALID_CLASS);
                flagged += 1;
            } else {
                field.remove_class(INVALID_CLASS);
                field.add_class(VALID_CLASS);
            }
        }
        flagged
    }

    /// Clear every field value and validity class.
    pub fn reset(&self, form_id: &str) {
        for (_, field) in self.fields(form_id) {
            field.set_attr("value", "");
            field.remove_class(INVALID_CLASS);
            field.remove_class(VALID_CLASS);
        }
    }
}

//! Contact form fields: sanitization and validation.

use serde::{Deserialize, Serialize};

pub const ERR_NAME_REQUIRED: &str = "Name is required";
pub const ERR_EMAIL_INVALID: &str = "Valid email is required";
pub const ERR_PROJECT_REQUIRED: &str = "Project description is required";
pub const ERR_MESSAGE_REQUIRED: &str = "Message is required";
pub const ERR_MESSAGE_TOO_LONG: &str = "Message is too long";

/// Fields exactly as posted. Missing fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawSubmission {
    pub name: String,
    pub email: String,
    pub project: String,
    pub message: String,
}

impl RawSubmission {
    /// Assign a field by its form name. Unknown names are ignored.
    pub fn set_field(&mut self, name: &str, value: String) {
        match name {
            "name" => self.name = value,
            "email" => self.email = value,
            "project" => self.project = value,
            "message" => self.message = value,
            _ => {}
        }
    }

    pub fn sanitize(&self) -> ContactSubmission {
        ContactSubmission {
            name: clean_text(&self.name),
            email: filter_email(&self.email),
            project: clean_text(&self.project),
            message: clean_text(&self.message),
        }
    }
}

/// Trimmed, tag-free fields. HTML escaping happens when the mail is composed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub project: String,
    pub message: String,
}

impl ContactSubmission {
    /// Every problem with the submission, in field order.
    pub fn validate(&self, max_message_length: usize) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.name.is_empty() {
            errors.push(ERR_NAME_REQUIRED.to_string());
        }
        if !is_valid_email(&self.email) {
            errors.push(ERR_EMAIL_INVALID.to_string());
        }
        if self.project.is_empty() {
            errors.push(ERR_PROJECT_REQUIRED.to_string());
        }
        if self.message.is_empty() {
            errors.push(ERR_MESSAGE_REQUIRED.to_string());
        } else if self.message.chars().count() > max_message_length {
            errors.push(ERR_MESSAGE_TOO_LONG.to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn clean_text(input: &str) -> String {
    strip_tags(input.trim()).trim().to_string()
}

/// Remove HTML tags and comments. A `<` not followed by a tag-like
/// character is kept as text.
pub fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        let opens_tag = c == '<'
            && chars
                .peek()
                .is_some_and(|&n| n.is_ascii_alphabetic() || matches!(n, '/' | '!' | '?'));
        if !opens_tag {
            out.push(c);
            continue;
        }

        let mut quote: Option<char> = None;
        for t in chars.by_ref() {
            match (quote, t) {
                (Some(q), t) if t == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(t),
                (None, '>') => break,
                (None, _) => {}
            }
        }
    }
    out
}

/// Escape the five HTML-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Keep only characters that may appear in an email address.
pub fn filter_email(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-=?^_`{|}~@.[]".contains(*c))
        .collect()
}

/// Structural email check: `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > 254 {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    is_valid_local_part(local) && is_valid_domain(domain)
}

fn is_valid_local_part(local: &str) -> bool {
    (1..=64).contains(&local.len())
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~.".contains(c))
}

fn is_valid_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            (1..=63).contains(&label.len())
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

//! A small CSS selector matcher.
//!
//! Supports comma-separated lists of compound selectors built from an
//! optional type (`img` or `*`), `#id`, `.class` and `[attr]` parts.
//! Combinators are not supported.

use std::fmt;
use std::iter::Peekable;
use std::str::{Chars, FromStr};

use thiserror::Error;

use crate::page::element::Element;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("expected a name after {0:?} in {1:?}")]
    MissingName(char, String),

    #[error("unsupported character {0:?} in {1:?}")]
    Unsupported(char, String),

    #[error("unterminated attribute selector in {0:?}")]
    UnterminatedAttribute(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<String>,
}

impl Compound {
    fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if !element.tag().eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.attr("id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|c| element.has_class(c))
            && self.attributes.iter().all(|a| element.attr(a).is_some())
    }
}

/// Parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Compound>,
}

impl Selector {
    /// True if `element` matches any alternative in the list.
    pub fn matches(&self, element: &Element) -> bool {
        self.alternatives.iter().any(|c| c.matches(element))
    }

    /// `element` and its descendants that match, in document order.
    pub fn select_in(&self, element: &Element) -> Vec<Element> {
        element
            .subtree()
            .into_iter()
            .filter(|e| self.matches(e))
            .collect()
    }

    /// True if anything in `element`'s subtree (itself included) matches.
    pub fn matches_subtree(&self, element: &Element) -> bool {
        element.subtree().iter().any(|e| self.matches(e))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn take_name(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if !is_name_char(c) {
            break;
        }
        name.push(c);
        chars.next();
    }
    name
}

fn parse_compound(part: &str, source: &str) -> Result<Compound, SelectorError> {
    let mut compound = Compound::default();
    let mut chars = part.chars().peekable();

    match chars.peek() {
        Some('*') => {
            chars.next();
        }
        Some(&c) if is_name_char(c) => {
            compound.tag = Some(take_name(&mut chars));
        }
        _ => {}
    }

    while let Some(c) = chars.next() {
        match c {
            '.' | '#' => {
                let name = take_name(&mut chars);
                if name.is_empty() {
                    return Err(SelectorError::MissingName(c, source.to_string()));
                }
                if c == '.' {
                    compound.classes.push(name);
                } else {
                    compound.id = Some(name);
                }
            }
            '[' => {
                let name = take_name(&mut chars);
                if name.is_empty() {
                    return Err(SelectorError::MissingName(c, source.to_string()));
                }
                if chars.next() != Some(']') {
                    return Err(SelectorError::UnterminatedAttribute(source.to_string()));
                }
                compound.attributes.push(name);
            }
            other => return Err(SelectorError::Unsupported(other, source.to_string())),
        }
    }

    Ok(compound)
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let alternatives = s
            .split(',')
            .map(str::trim)
            .map(|part| {
                if part.is_empty() {
                    Err(SelectorError::Empty)
                } else {
                    parse_compound(part, s)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            source: s.trim().to_string(),
            alternatives,
        })
    }
}

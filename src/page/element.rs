//! Shared element handles.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::page::geometry::Rect;

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique element identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Default)]
struct ElementData {
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    bounds: Rect,
    children: Vec<Element>,
}

struct ElementNode {
    id: ElementId,
    tag: String,
    data: Mutex<ElementData>,
}

/// A cheaply cloneable handle to a page element.
///
/// Clones refer to the same element; equality is identity.
#[derive(Clone)]
pub struct Element(Arc<ElementNode>);

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        let id = ElementId(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed));
        Self(Arc::new(ElementNode {
            id,
            tag: tag.into(),
            data: Mutex::new(ElementData::default()),
        }))
    }

    pub fn with_class(self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_attr(self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_bounds(self, bounds: Rect) -> Self {
        self.set_bounds(bounds);
        self
    }

    fn data(&self) -> MutexGuard<'_, ElementData> {
        self.0.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> ElementId {
        self.0.id
    }

    pub fn tag(&self) -> &str {
        &self.0.tag
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.data().classes.iter().any(|c| c == class)
    }

    /// Adds `class` unless already present.
    pub fn add_class(&self, class: &str) {
        let mut data = self.data();
        if !data.classes.iter().any(|c| c == class) {
            data.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&self, class: &str) {
        self.data().classes.retain(|c| c != class);
    }

    pub fn classes(&self) -> Vec<String> {
        self.data().classes.clone()
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        self.data().attributes.get(name).cloned()
    }

    pub fn set_attr(&self, name: &str, value: &str) {
        self.data().attributes.insert(name.to_string(), value.to_string());
    }

    pub fn remove_attr(&self, name: &str) -> Option<String> {
        self.data().attributes.remove(name)
    }

    /// Displayed source, if one is assigned and non-empty.
    pub fn src(&self) -> Option<String> {
        self.attr("src").filter(|s| !s.is_empty())
    }

    pub fn set_src(&self, src: &str) {
        self.set_attr("src", src);
    }

    /// Reads a `data-*` attribute.
    pub fn dataset(&self, key: &str) -> Option<String> {
        self.attr(&format!("data-{key}"))
    }

    pub fn bounds(&self) -> Rect {
        self.data().bounds
    }

    pub fn set_bounds(&self, bounds: Rect) {
        self.data().bounds = bounds;
    }

    /// Appends without notifying any document; use
    /// [`Document::append_child`](crate::page::Document::append_child) for
    /// attached elements.
    pub fn append_child(&self, child: Element) {
        self.data().children.push(child);
    }

    /// Removes a direct child, returning it if it was present.
    pub fn remove_child(&self, child: &Element) -> Option<Element> {
        let mut data = self.data();
        let index = data.children.iter().position(|c| c == child)?;
        Some(data.children.remove(index))
    }

    pub fn children(&self) -> Vec<Element> {
        self.data().children.clone()
    }

    /// This element followed by all descendants, depth-first in document order.
    pub fn subtree(&self) -> Vec<Element> {
        let mut out = Vec::new();
        let mut stack = vec![self.clone()];
        while let Some(element) = stack.pop() {
            let children = element.children();
            out.push(element);
            stack.extend(children.into_iter().rev());
        }
        out
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Element {}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data();
        f.debug_struct("Element")
            .field("id", &self.0.id)
            .field("tag", &self.0.tag)
            .field("classes", &data.classes)
            .field("attributes", &data.attributes)
            .finish()
    }
}

//! Minimal mutable document model for the host page.
//!
//! `scraper` gives us a read-only tree; the lazy-load controller needs to
//! rewrite attributes, so parsed elements are copied into a flat,
//! document-ordered arena. Removing an element leaves its slot vacant so
//! ids handed out earlier never point at a different element.

use crate::layout::Rect;
use crate::{Error, Result};
use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Index of an element in its [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ElementId(pub usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    bounds: Option<Rect>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            bounds: None,
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Removes every occurrence of `class`. Returns whether any was present.
    pub fn remove_class(&mut self, class: &str) -> bool {
        if !self.has_class(class) {
            return false;
        }
        let kept = self.classes().filter(|c| *c != class).collect::<Vec<_>>().join(" ");
        if kept.is_empty() {
            self.attributes.remove("class");
        } else {
            self.attributes.insert("class".to_string(), kept);
        }
        true
    }

    /// Layout box, once [`crate::layout::layout_document`] has run
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
    }
}

/// Flat, document-ordered element store
#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: Vec<Option<Element>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse HTML and collect every element in document order.
    pub fn parse_html(html: &str) -> Result<Self> {
        let parsed = Html::parse_document(html);
        let all = Selector::parse("*").map_err(|e| Error::ParseError(format!("{:?}", e)))?;
        let mut doc = Document::new();
        for node in parsed.select(&all) {
            let value = node.value();
            let mut el = Element::new(value.name());
            for (name, v) in value.attrs() {
                el.set_attr(name, v);
            }
            doc.insert(el);
        }
        Ok(doc)
    }

    /// Append an element, as the host page does when it grows the DOM.
    pub fn insert(&mut self, element: Element) -> ElementId {
        self.elements.push(Some(element));
        ElementId(self.elements.len() - 1)
    }

    /// Detach an element; its id stays vacant.
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        self.elements.get_mut(id.0).and_then(Option::take)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (ElementId(i), e)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ElementId, &mut Element)> {
        self.elements
            .iter_mut()
            .enumerate()
            .filter_map(|(i, e)| e.as_mut().map(|e| (ElementId(i), e)))
    }

    /// Ids of live elements carrying attribute `name`, in document order
    pub fn elements_with_attr(&self, name: &str) -> Vec<ElementId> {
        self.iter()
            .filter(|(_, e)| e.attr(name).is_some())
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of live elements
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! # Element Model
//!
//! The tree node shared by the authority and the render surface.
//!
//! Children are owned by their parent. `parent` is a back-reference used
//! for lookup only; it is rewritten whenever the tree is restructured and
//! never treated as ownership.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::id::IdGenerator;

/// Opaque, globally unique element identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,

    pub tag: String,

    /// Insertion order preserved, duplicates are not removed
    #[serde(default)]
    pub classes: Vec<String>,

    /// Direct text payload (leaf elements only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    #[serde(default)]
    pub children: Vec<Element>,

    /// Id of the structural parent, `None` for page roots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ElementId>,
}

impl Element {
    pub fn new(id: impl Into<ElementId>, tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag: tag.into(),
            classes: Vec::new(),
            content: None,
            attributes: BTreeMap::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn category(&self) -> ElementCategory {
        category(&self.tag)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether in-place text editing may replace this element's content.
    ///
    /// Editing text on an element with children would destroy them, and
    /// void tags have no text at all.
    pub fn accepts_text_edit(&self) -> bool {
        self.is_leaf() && !is_void_tag(&self.tag)
    }

    pub fn can_have_children(&self) -> bool {
        !is_void_tag(&self.tag)
    }

    /// Visit this element and all descendants in pre-order
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Element)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Copy of this subtree with every id replaced by a fresh one.
    ///
    /// Parent back-references inside the copy are rewritten to the new ids;
    /// the copy's own `parent` is left untouched for the caller to place.
    pub fn clone_with_fresh_ids(&self, ids: &mut IdGenerator) -> Element {
        let id = ids.next_id();
        let children = self
            .children
            .iter()
            .map(|child| {
                let mut copy = child.clone_with_fresh_ids(ids);
                copy.parent = Some(id.clone());
                copy
            })
            .collect();

        Element {
            id,
            tag: self.tag.clone(),
            classes: self.classes.clone(),
            content: self.content.clone(),
            attributes: self.attributes.clone(),
            children,
            parent: self.parent.clone(),
        }
    }
}

/// Coarse element classification derived from the tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementCategory {
    Layout,
    Form,
    Media,
    Text,
    Other,
}

/// Classify a tag. Always derived, never stored on the element.
pub fn category(tag: &str) -> ElementCategory {
    match tag.to_ascii_lowercase().as_str() {
        "div" | "section" | "header" | "footer" | "main" | "nav" | "aside" | "article"
        | "ul" | "ol" | "li" | "table" | "thead" | "tbody" | "tr" | "td" | "th" | "figure" => {
            ElementCategory::Layout
        }
        "form" | "input" | "button" | "select" | "option" | "textarea" | "label" | "fieldset"
        | "legend" => ElementCategory::Form,
        "img" | "video" | "audio" | "picture" | "source" | "svg" | "canvas" | "iframe" => {
            ElementCategory::Media
        }
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "span" | "a" | "strong" | "em" | "b"
        | "i" | "small" | "blockquote" | "code" | "pre" | "figcaption" => ElementCategory::Text,
        _ => ElementCategory::Other,
    }
}

/// Tags that take neither children nor text
pub fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag.to_ascii_lowercase().as_str(),
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_is_derived_from_tag() {
        assert_eq!(category("div"), ElementCategory::Layout);
        assert_eq!(category("BUTTON"), ElementCategory::Form);
        assert_eq!(category("img"), ElementCategory::Media);
        assert_eq!(category("h2"), ElementCategory::Text);
        assert_eq!(category("my-widget"), ElementCategory::Other);

        let mut elem = Element::new("a", "div");
        assert_eq!(elem.category(), ElementCategory::Layout);
        elem.tag = "p".to_string();
        assert_eq!(elem.category(), ElementCategory::Text);
    }

    #[test]
    fn test_text_edit_requires_leaf() {
        let leaf = Element::new("t", "p").with_content("hi");
        assert!(leaf.accepts_text_edit());

        let parent = Element::new("p", "div").with_child(Element::new("c", "span"));
        assert!(!parent.accepts_text_edit());

        let image = Element::new("i", "img");
        assert!(!image.accepts_text_edit());
        assert!(!image.can_have_children());
    }

    #[test]
    fn test_serialized_shape() {
        let elem = Element::new("card", "div")
            .with_class("card")
            .with_child(Element::new("title", "h1").with_content("Hello"));

        let json = serde_json::to_value(&elem).unwrap();
        assert_eq!(json["id"], "card");
        assert_eq!(json["classes"][0], "card");
        assert_eq!(json["children"][0]["content"], "Hello");
        assert!(json.get("attributes").is_none());

        let back: Element = serde_json::from_value(json).unwrap();
        assert_eq!(back, elem);
    }

    #[test]
    fn test_clone_with_fresh_ids_rewrites_parents() {
        let mut ids = IdGenerator::from_seed("test");
        let elem = Element::new("root", "div")
            .with_child(Element::new("child", "span").with_content("x"));

        let copy = elem.clone_with_fresh_ids(&mut ids);
        assert_ne!(copy.id, elem.id);
        assert_ne!(copy.children[0].id, elem.children[0].id);
        assert_eq!(copy.children[0].parent.as_ref(), Some(&copy.id));
        assert_eq!(copy.children[0].content.as_deref(), Some("x"));
    }

    #[test]
    fn test_walk_is_pre_order() {
        let tree = Element::new("a", "div")
            .with_child(Element::new("b", "div").with_child(Element::new("c", "span")))
            .with_child(Element::new("d", "span"));

        let mut seen = Vec::new();
        tree.walk(&mut |e| seen.push(e.id.as_str().to_string()));
        assert_eq!(seen, vec!["a", "b", "c", "d"]);
    }
}

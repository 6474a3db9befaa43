//! Rendered node tree held by the surface

use canvas_protocol::{Element, ElementId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Highlight drawn around a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outline {
    #[default]
    None,
    Hovered,
    Selected,
}

impl Outline {
    /// Selection wins over hover on the same node
    pub fn resolve(selected: bool, hovered: bool) -> Self {
        if selected {
            Outline::Selected
        } else if hovered {
            Outline::Hovered
        } else {
            Outline::None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outline::None => "none",
            Outline::Hovered => "hovered",
            Outline::Selected => "selected",
        }
    }
}

/// One rendered element, keyed by the element id it was built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedNode {
    pub id: ElementId,
    pub tag: String,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub text: Option<String>,
    pub children: Vec<RenderedNode>,
    pub parent: Option<ElementId>,
    pub outline: Outline,
}

impl RenderedNode {
    pub fn from_element(element: &Element) -> Self {
        Self {
            id: element.id.clone(),
            tag: element.tag.clone(),
            classes: element.classes.clone(),
            attributes: element.attributes.clone(),
            text: element.content.clone(),
            children: element.children.iter().map(RenderedNode::from_element).collect(),
            parent: element.parent.clone(),
            outline: Outline::None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a RenderedNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

pub fn find_node<'a>(nodes: &'a [RenderedNode], id: &ElementId) -> Option<&'a RenderedNode> {
    for node in nodes {
        if &node.id == id {
            return Some(node);
        }
        if let Some(found) = find_node(&node.children, id) {
            return Some(found);
        }
    }
    None
}

pub fn find_node_mut<'a>(
    nodes: &'a mut [RenderedNode],
    id: &ElementId,
) -> Option<&'a mut RenderedNode> {
    for node in nodes {
        if &node.id == id {
            return Some(node);
        }
        if let Some(found) = find_node_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

pub fn count_nodes(nodes: &[RenderedNode]) -> usize {
    nodes.iter().map(|n| 1 + count_nodes(&n.children)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_from_elements() {
        let element = Element::new("a", "div")
            .with_class("stack")
            .with_child(Element::new("b", "p").with_content("hi"));
        let node = RenderedNode::from_element(&element);

        assert_eq!(node.classes, vec!["stack".to_string()]);
        assert!(!node.is_leaf());
        assert_eq!(node.children[0].text(), "hi");
        assert_eq!(count_nodes(std::slice::from_ref(&node)), 2);
    }

    #[test]
    fn test_find_nested() {
        let nodes = vec![RenderedNode::from_element(
            &Element::new("a", "div").with_child(Element::new("b", "p")),
        )];
        assert!(find_node(&nodes, &ElementId::new("b")).is_some());
        assert!(find_node(&nodes, &ElementId::new("z")).is_none());
    }

    #[test]
    fn test_selection_wins_over_hover() {
        assert_eq!(Outline::resolve(true, true), Outline::Selected);
        assert_eq!(Outline::resolve(false, true), Outline::Hovered);
        assert_eq!(Outline::resolve(false, false), Outline::None);
    }
}

//! # Selection Manager
//!
//! Selection and hover refer to elements by id only. Elements are resolved
//! against the live tree on every read, so a structural change can never
//! leave the manager holding a copy of a stale element.
//!
//! The first selected id is the *primary* selection; property panels and the
//! targeted content sync follow it.

use canvas_protocol::{Element, ElementId};

use crate::tree;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionState {
    None,
    Single(ElementId),
    Multi(Vec<ElementId>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Vec<ElementId>,
    hovered: Option<ElementId>,
    /// Where a shift-click range starts
    anchor: Option<ElementId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with exactly one element, or clear it
    pub fn select(&mut self, id: Option<ElementId>) {
        self.selected.clear();
        if let Some(id) = id {
            self.selected.push(id.clone());
            self.anchor = Some(id);
        } else {
            self.anchor = None;
        }
    }

    /// Add or remove one element from a multi-selection.
    ///
    /// Removing the primary promotes the next remaining member.
    pub fn toggle(&mut self, id: ElementId) {
        if let Some(pos) = self.selected.iter().position(|s| s == &id) {
            self.selected.remove(pos);
            if self.anchor.as_ref() == Some(&id) {
                self.anchor = self.selected.first().cloned();
            }
        } else {
            self.selected.push(id.clone());
            self.anchor = Some(id);
        }
    }

    /// Select the contiguous pre-order slice between two ids, inclusive.
    ///
    /// Endpoint order does not matter. No-op unless both ids resolve.
    pub fn select_range(&mut self, roots: &[Element], anchor: &ElementId, target: &ElementId) {
        let order = tree::flatten(roots);
        let (Some(a), Some(b)) = (
            order.iter().position(|id| id == anchor),
            order.iter().position(|id| id == target),
        ) else {
            return;
        };

        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        self.selected = order[start..=end].to_vec();
        self.anchor = Some(anchor.clone());
    }

    /// Shift-click: range from the current anchor to `target`. Without an
    /// anchor this behaves like a plain select.
    pub fn extend_to(&mut self, roots: &[Element], target: &ElementId) {
        match self.anchor.clone() {
            Some(anchor) if tree::contains(roots, &anchor) => {
                self.select_range(roots, &anchor, target);
            }
            _ => {
                if tree::contains(roots, target) {
                    self.select(Some(target.clone()));
                }
            }
        }
    }

    pub fn hover(&mut self, id: Option<ElementId>) {
        self.hovered = id;
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.anchor = None;
    }

    /// Drop every reference that no longer resolves in `roots`.
    ///
    /// Returns true when anything changed.
    pub fn retain_existing(&mut self, roots: &[Element]) -> bool {
        let ids = tree::flatten(roots);
        let before = self.clone();

        self.selected.retain(|id| ids.contains(id));
        if self.hovered.as_ref().is_some_and(|h| !ids.contains(h)) {
            self.hovered = None;
        }
        if self.anchor.as_ref().is_some_and(|a| !ids.contains(a)) {
            self.anchor = self.selected.first().cloned();
        }

        *self != before
    }

    pub fn selected_ids(&self) -> &[ElementId] {
        &self.selected
    }

    pub fn primary(&self) -> Option<&ElementId> {
        self.selected.first()
    }

    pub fn hovered(&self) -> Option<&ElementId> {
        self.hovered.as_ref()
    }

    pub fn anchor(&self) -> Option<&ElementId> {
        self.anchor.as_ref()
    }

    pub fn is_selected(&self, id: &ElementId) -> bool {
        self.selected.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn state(&self) -> SelectionState {
        match self.selected.as_slice() {
            [] => SelectionState::None,
            [only] => SelectionState::Single(only.clone()),
            many => SelectionState::Multi(many.to_vec()),
        }
    }

    /// Live-resolve the selected elements in selection order
    pub fn selected_elements<'a>(&self, roots: &'a [Element]) -> Vec<&'a Element> {
        self.selected
            .iter()
            .filter_map(|id| tree::find(roots, id))
            .collect()
    }

    pub fn primary_element<'a>(&self, roots: &'a [Element]) -> Option<&'a Element> {
        self.primary().and_then(|id| tree::find(roots, id))
    }

    pub fn hovered_element<'a>(&self, roots: &'a [Element]) -> Option<&'a Element> {
        self.hovered.as_ref().and_then(|id| tree::find(roots, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::tests::sample_tree;

    fn id(s: &str) -> ElementId {
        ElementId::new(s)
    }

    fn range_tree() -> Vec<Element> {
        // [A, B, C, D]: B and C are A's children, D is a root sibling
        tree::recompute_parents(&[
            Element::new("A", "div")
                .with_child(Element::new("B", "p"))
                .with_child(Element::new("C", "p")),
            Element::new("D", "div"),
        ])
    }

    #[test]
    fn test_select_and_clear() {
        let mut sel = Selection::new();
        sel.select(Some(id("A")));
        assert_eq!(sel.state(), SelectionState::Single(id("A")));

        sel.select(None);
        assert_eq!(sel.state(), SelectionState::None);
    }

    #[test]
    fn test_toggle_promotes_next_primary() {
        let mut sel = Selection::new();
        sel.select(Some(id("A")));
        sel.toggle(id("B"));
        sel.toggle(id("C"));
        assert_eq!(sel.state(), SelectionState::Multi(vec![id("A"), id("B"), id("C")]));

        sel.toggle(id("A"));
        assert_eq!(sel.primary(), Some(&id("B")));
        assert_eq!(sel.selected_ids(), &[id("B"), id("C")]);
    }

    #[test]
    fn test_range_in_either_direction() {
        let roots = range_tree();
        let mut sel = Selection::new();

        sel.select_range(&roots, &id("B"), &id("D"));
        assert_eq!(sel.selected_ids(), &[id("B"), id("C"), id("D")]);

        sel.select_range(&roots, &id("D"), &id("B"));
        assert_eq!(sel.selected_ids(), &[id("B"), id("C"), id("D")]);
    }

    #[test]
    fn test_range_with_missing_endpoint_is_noop() {
        let roots = range_tree();
        let mut sel = Selection::new();
        sel.select(Some(id("A")));

        sel.select_range(&roots, &id("B"), &id("ghost"));
        assert_eq!(sel.selected_ids(), &[id("A")]);
    }

    #[test]
    fn test_extend_from_anchor() {
        let roots = range_tree();
        let mut sel = Selection::new();
        sel.select(Some(id("C")));
        sel.extend_to(&roots, &id("A"));
        assert_eq!(sel.selected_ids(), &[id("A"), id("B"), id("C")]);
    }

    #[test]
    fn test_hover_independent_of_selection() {
        let mut sel = Selection::new();
        sel.select(Some(id("A")));
        sel.hover(Some(id("A")));
        assert!(sel.is_selected(&id("A")));
        assert_eq!(sel.hovered(), Some(&id("A")));

        sel.select(None);
        assert_eq!(sel.hovered(), Some(&id("A")));
    }

    #[test]
    fn test_retain_existing_drops_removed_ids() {
        let roots = sample_tree();
        let mut sel = Selection::new();
        sel.select(Some(id("C1")));
        sel.toggle(id("B"));
        sel.hover(Some(id("C")));

        let pruned = tree::remove(&roots, &id("C"));
        assert!(sel.retain_existing(&pruned));
        assert_eq!(sel.selected_ids(), &[id("B")]);
        assert_eq!(sel.hovered(), None);
        assert!(!sel.retain_existing(&pruned));
    }

    #[test]
    fn test_elements_are_resolved_live() {
        let roots = sample_tree();
        let mut sel = Selection::new();
        sel.select(Some(id("B")));
        assert_eq!(sel.primary_element(&roots).unwrap().content.as_deref(), Some("b"));

        let updated = tree::update_element(&roots, &id("B"), |e| e.content = Some("fresh".into()));
        assert_eq!(
            sel.primary_element(&updated).unwrap().content.as_deref(),
            Some("fresh")
        );
    }
}

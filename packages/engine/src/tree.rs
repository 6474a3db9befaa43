//! # Tree Store
//!
//! Pure structural operations over a page's root sequence.
//!
//! Every operation takes the current roots by reference and returns a new
//! sequence; the input is never touched. Callers commit the result to the
//! owning page and re-resolve selection against it.
//!
//! ## Semantics
//!
//! ### Not found
//! - Operating on an id that does not resolve returns an unchanged copy
//!
//! ### Move
//! - Remove then insert, followed by a full parent recomputation
//! - Moving into self or into any descendant is rejected
//! - `position` indexes the destination children *after* removal
//!
//! ### Remove
//! - Excises the element and its whole subtree

use canvas_protocol::{Element, ElementId, IdGenerator};

/// Depth-first search in declaration order, stopping at the first match
pub fn find<'a>(roots: &'a [Element], id: &ElementId) -> Option<&'a Element> {
    for elem in roots {
        if &elem.id == id {
            return Some(elem);
        }
        if let Some(found) = find(&elem.children, id) {
            return Some(found);
        }
    }
    None
}

pub fn contains(roots: &[Element], id: &ElementId) -> bool {
    find(roots, id).is_some()
}

/// Parent id and index within the parent's children (or within the roots)
pub fn position_of(roots: &[Element], id: &ElementId) -> Option<(Option<ElementId>, usize)> {
    fn search(
        list: &[Element],
        parent: Option<&ElementId>,
        id: &ElementId,
    ) -> Option<(Option<ElementId>, usize)> {
        if let Some(index) = list.iter().position(|e| &e.id == id) {
            return Some((parent.cloned(), index));
        }
        for elem in list {
            if let Some(found) = search(&elem.children, Some(&elem.id), id) {
                return Some(found);
            }
        }
        None
    }

    search(roots, None, id)
}

/// Ids from the root down to `id`, inclusive
pub fn find_path(roots: &[Element], id: &ElementId) -> Option<Vec<ElementId>> {
    for elem in roots {
        if &elem.id == id {
            return Some(vec![elem.id.clone()]);
        }
        if let Some(mut path) = find_path(&elem.children, id) {
            path.insert(0, elem.id.clone());
            return Some(path);
        }
    }
    None
}

/// True when `candidate` sits somewhere inside the subtree rooted at `ancestor`
/// (`ancestor` itself excluded)
pub fn is_descendant(roots: &[Element], ancestor: &ElementId, candidate: &ElementId) -> bool {
    find(roots, ancestor)
        .map(|root| contains(&root.children, candidate))
        .unwrap_or(false)
}

/// Pre-order ids: parent before children, siblings in declared order
pub fn flatten(roots: &[Element]) -> Vec<ElementId> {
    let mut ids = Vec::new();
    for root in roots {
        root.walk(&mut |e| ids.push(e.id.clone()));
    }
    ids
}

pub fn count(roots: &[Element]) -> usize {
    roots.iter().map(|e| 1 + count(&e.children)).sum()
}

pub fn remove(roots: &[Element], id: &ElementId) -> Vec<Element> {
    let mut out = roots.to_vec();
    take_from(&mut out, id);
    out
}

/// Insert `element` under `parent_id` (or at root when `None`).
///
/// `position` defaults to append and is clamped to the child count. An
/// unresolved parent leaves the tree unchanged.
pub fn insert(
    roots: &[Element],
    element: Element,
    parent_id: Option<&ElementId>,
    position: Option<usize>,
) -> Vec<Element> {
    let mut out = roots.to_vec();
    insert_into(&mut out, element, parent_id, position);
    out
}

/// Relocate an element. Rejected (unchanged copy) when the element or the
/// destination parent is missing, or when the destination lies inside the
/// moved subtree.
pub fn move_element(
    roots: &[Element],
    id: &ElementId,
    new_parent_id: Option<&ElementId>,
    position: Option<usize>,
) -> Vec<Element> {
    if !can_move(roots, id, new_parent_id) {
        return roots.to_vec();
    }

    let mut out = roots.to_vec();
    let Some(element) = take_from(&mut out, id) else {
        return roots.to_vec();
    };
    if !insert_into(&mut out, element, new_parent_id, position) {
        return roots.to_vec();
    }
    assign_parents(&mut out, None);
    out
}

/// Whether `move_element` would change the tree
pub fn can_move(roots: &[Element], id: &ElementId, new_parent_id: Option<&ElementId>) -> bool {
    if !contains(roots, id) {
        return false;
    }
    match new_parent_id {
        None => true,
        Some(parent) => {
            parent != id && contains(roots, parent) && !is_descendant(roots, id, parent)
        }
    }
}

/// Rewrite every back-reference to match actual placement
pub fn recompute_parents(roots: &[Element]) -> Vec<Element> {
    let mut out = roots.to_vec();
    assign_parents(&mut out, None);
    out
}

/// Copy of the tree with `update` applied to one element
pub fn update_element(
    roots: &[Element],
    id: &ElementId,
    update: impl FnOnce(&mut Element),
) -> Vec<Element> {
    let mut out = roots.to_vec();
    if let Some(elem) = find_mut(&mut out, id) {
        update(elem);
    }
    out
}

/// Copy an element's subtree with fresh ids and place it right after the
/// original. Returns the new tree and the id of the copy.
pub fn duplicate(
    roots: &[Element],
    id: &ElementId,
    ids: &mut IdGenerator,
) -> (Vec<Element>, Option<ElementId>) {
    let (Some(source), Some((parent, index))) = (find(roots, id), position_of(roots, id)) else {
        return (roots.to_vec(), None);
    };

    let copy = source.clone_with_fresh_ids(ids);
    let copy_id = copy.id.clone();
    let out = insert(roots, copy, parent.as_ref(), Some(index + 1));
    (out, Some(copy_id))
}

/// All ids in the subtree rooted at `id`, including `id`
pub fn subtree_ids(roots: &[Element], id: &ElementId) -> Vec<ElementId> {
    find(roots, id)
        .map(|elem| flatten(std::slice::from_ref(elem)))
        .unwrap_or_default()
}

pub(crate) fn find_mut<'a>(roots: &'a mut [Element], id: &ElementId) -> Option<&'a mut Element> {
    for elem in roots.iter_mut() {
        if &elem.id == id {
            return Some(elem);
        }
        if let Some(found) = find_mut(&mut elem.children, id) {
            return Some(found);
        }
    }
    None
}

fn take_from(list: &mut Vec<Element>, id: &ElementId) -> Option<Element> {
    if let Some(pos) = list.iter().position(|e| &e.id == id) {
        return Some(list.remove(pos));
    }

    for elem in list.iter_mut() {
        if let Some(removed) = take_from(&mut elem.children, id) {
            return Some(removed);
        }
    }

    None
}

fn insert_into(
    roots: &mut Vec<Element>,
    mut element: Element,
    parent_id: Option<&ElementId>,
    position: Option<usize>,
) -> bool {
    element.parent = parent_id.cloned();
    let own_id = element.id.clone();
    assign_parents(&mut element.children, Some(&own_id));

    let siblings = match parent_id {
        None => roots,
        Some(parent_id) => match find_mut(roots, parent_id) {
            Some(parent) => &mut parent.children,
            None => return false,
        },
    };

    let index = position.unwrap_or(siblings.len()).min(siblings.len());
    siblings.insert(index, element);
    true
}

fn assign_parents(list: &mut [Element], parent: Option<&ElementId>) {
    for elem in list.iter_mut() {
        elem.parent = parent.cloned();
        let id = elem.id.clone();
        assign_parents(&mut elem.children, Some(&id));
    }
}

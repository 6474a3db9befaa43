//! # Tree Mutations
//!
//! High-level semantic operations on a page's element tree.
//!
//! ## Design Principles
//!
//! 1. **Intent-preserving**: Each mutation represents one user action
//! 2. **Validated**: Structural guards run before anything is applied
//! 3. **Pure**: `apply` returns a new root sequence, the input is untouched
//!
//! ## Mutation Semantics
//!
//! ### MoveElement
//! - Fails if the destination parent is missing
//! - Fails if the destination is the element itself or one of its descendants
//!
//! ### UpdateContent
//! - Atomic replacement of the text payload
//! - Only leaf, non-void elements; editing a parent would destroy its children
//!
//! ### RemoveElement
//! - Removes the element and all descendants
//!
//! The engine treats every `MutationError` as a silent no-op; the error only
//! exists so the reason can be logged and tested.

use canvas_protocol::{Element, ElementId, IdGenerator};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::history::HistoryMode;
use crate::tree;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all_fields = "camelCase")]
pub enum Mutation {
    /// Insert a new element (with its subtree)
    AddElement {
        element: Element,
        #[serde(default)]
        parent_id: Option<ElementId>,
        #[serde(default)]
        position: Option<usize>,
    },

    /// Delete an element and everything under it
    RemoveElement { element_id: ElementId },

    /// Relocate an element; `None` parent means page root
    MoveElement {
        element_id: ElementId,
        #[serde(default)]
        new_parent_id: Option<ElementId>,
        #[serde(default)]
        position: Option<usize>,
    },

    /// Replace the text payload of a leaf element
    UpdateContent { element_id: ElementId, content: String },

    SetAttribute {
        element_id: ElementId,
        name: String,
        value: String,
    },

    RemoveAttribute { element_id: ElementId, name: String },

    SetClasses {
        element_id: ElementId,
        classes: Vec<String>,
    },

    AddClass { element_id: ElementId, class: String },

    RemoveClass { element_id: ElementId, class: String },

    /// Copy a subtree with fresh ids right after the original
    DuplicateElement { element_id: ElementId },

    /// Swap out the whole root sequence (template load, import)
    ReplaceElements { elements: Vec<Element> },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    #[error("Parent not found: {0}")]
    ParentNotFound(ElementId),

    #[error("Would create cycle")]
    CycleDetected,

    #[error("Element {0} cannot have children")]
    CannotHaveChildren(ElementId),

    #[error("Element {0} has children; its text cannot be edited directly")]
    NotTextEditable(ElementId),

    #[error("Element id already in use: {0}")]
    DuplicateId(ElementId),
}

/// Result of applying a mutation
#[derive(Debug, Clone)]
pub struct MutationResult {
    /// The new root sequence
    pub elements: Vec<Element>,

    /// Id of an element created by the mutation (add, duplicate)
    pub created: Option<ElementId>,
}

impl Mutation {
    /// How this mutation is recorded in history
    pub fn history_mode(&self) -> HistoryMode {
        match self {
            Mutation::UpdateContent { .. } | Mutation::SetAttribute { .. } => {
                HistoryMode::Debounced
            }
            _ => HistoryMode::Immediate,
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::AddElement { .. } => "AddElement",
            Mutation::RemoveElement { .. } => "RemoveElement",
            Mutation::MoveElement { .. } => "MoveElement",
            Mutation::UpdateContent { .. } => "UpdateContent",
            Mutation::SetAttribute { .. } => "SetAttribute",
            Mutation::RemoveAttribute { .. } => "RemoveAttribute",
            Mutation::SetClasses { .. } => "SetClasses",
            Mutation::AddClass { .. } => "AddClass",
            Mutation::RemoveClass { .. } => "RemoveClass",
            Mutation::DuplicateElement { .. } => "DuplicateElement",
            Mutation::ReplaceElements { .. } => "ReplaceElements",
        }
    }

    /// Apply mutation to a root sequence with validation
    pub fn apply(
        &self,
        roots: &[Element],
        ids: &mut IdGenerator,
    ) -> Result<MutationResult, MutationError> {
        self.validate(roots)?;

        let plain = |elements: Vec<Element>| MutationResult {
            elements,
            created: None,
        };

        let result = match self {
            Mutation::AddElement {
                element,
                parent_id,
                position,
            } => MutationResult {
                elements: tree::insert(roots, element.clone(), parent_id.as_ref(), *position),
                created: Some(element.id.clone()),
            },

            Mutation::RemoveElement { element_id } => plain(tree::remove(roots, element_id)),

            Mutation::MoveElement {
                element_id,
                new_parent_id,
                position,
            } => plain(tree::move_element(
                roots,
                element_id,
                new_parent_id.as_ref(),
                *position,
            )),

            Mutation::UpdateContent {
                element_id,
                content,
            } => plain(tree::update_element(roots, element_id, |e| {
                e.content = Some(content.clone());
            })),

            Mutation::SetAttribute {
                element_id,
                name,
                value,
            } => plain(tree::update_element(roots, element_id, |e| {
                e.attributes.insert(name.clone(), value.clone());
            })),

            Mutation::RemoveAttribute { element_id, name } => {
                plain(tree::update_element(roots, element_id, |e| {
                    e.attributes.remove(name);
                }))
            }

            Mutation::SetClasses {
                element_id,
                classes,
            } => plain(tree::update_element(roots, element_id, |e| {
                e.classes = classes.clone();
            })),

            Mutation::AddClass { element_id, class } => {
                plain(tree::update_element(roots, element_id, |e| {
                    e.classes.push(class.clone());
                }))
            }

            Mutation::RemoveClass { element_id, class } => {
                plain(tree::update_element(roots, element_id, |e| {
                    e.classes.retain(|c| c != class);
                }))
            }

            Mutation::DuplicateElement { element_id } => {
                let (elements, created) = tree::duplicate(roots, element_id, ids);
                MutationResult { elements, created }
            }

            Mutation::ReplaceElements { elements } => {
                plain(tree::recompute_parents(elements))
            }
        };

        Ok(result)
    }

    /// Validate without applying
    pub fn validate(&self, roots: &[Element]) -> Result<(), MutationError> {
        match self {
            Mutation::AddElement {
                element,
                parent_id,
                ..
            } => {
                if let Some(parent_id) = parent_id {
                    let parent = tree::find(roots, parent_id)
                        .ok_or_else(|| MutationError::ParentNotFound(parent_id.clone()))?;
                    if !parent.can_have_children() {
                        return Err(MutationError::CannotHaveChildren(parent_id.clone()));
                    }
                }

                let mut clash = None;
                element.walk(&mut |e| {
                    if clash.is_none() && tree::contains(roots, &e.id) {
                        clash = Some(e.id.clone());
                    }
                });
                match clash {
                    Some(id) => Err(MutationError::DuplicateId(id)),
                    None => Ok(()),
                }
            }

            Mutation::MoveElement {
                element_id,
                new_parent_id,
                ..
            } => {
                require(roots, element_id)?;

                if let Some(parent_id) = new_parent_id {
                    let parent = tree::find(roots, parent_id)
                        .ok_or_else(|| MutationError::ParentNotFound(parent_id.clone()))?;
                    if !parent.can_have_children() {
                        return Err(MutationError::CannotHaveChildren(parent_id.clone()));
                    }
                    if parent_id == element_id || tree::is_descendant(roots, element_id, parent_id)
                    {
                        return Err(MutationError::CycleDetected);
                    }
                }

                Ok(())
            }

            Mutation::UpdateContent { element_id, .. } => {
                let elem = require(roots, element_id)?;
                if elem.accepts_text_edit() {
                    Ok(())
                } else {
                    Err(MutationError::NotTextEditable(element_id.clone()))
                }
            }

            Mutation::RemoveElement { element_id }
            | Mutation::SetAttribute { element_id, .. }
            | Mutation::RemoveAttribute { element_id, .. }
            | Mutation::SetClasses { element_id, .. }
            | Mutation::AddClass { element_id, .. }
            | Mutation::RemoveClass { element_id, .. }
            | Mutation::DuplicateElement { element_id } => {
                require(roots, element_id)?;
                Ok(())
            }

            Mutation::ReplaceElements { elements } => {
                let mut seen = std::collections::HashSet::new();
                for id in tree::flatten(elements) {
                    if !seen.insert(id.clone()) {
                        return Err(MutationError::DuplicateId(id));
                    }
                }
                Ok(())
            }
        }
    }
}

fn require<'a>(roots: &'a [Element], id: &ElementId) -> Result<&'a Element, MutationError> {
    tree::find(roots, id).ok_or_else(|| MutationError::ElementNotFound(id.clone()))
}

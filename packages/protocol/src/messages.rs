//! # Protocol Messages
//!
//! Both directions use the envelope `{ "type": "...", "data": { ... } }`.
//! Message kinds are closed enums so an unhandled kind is a compile error
//! on the receiving side rather than a silently ignored string.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::element::{Element, ElementId};

/// Global styling configuration forwarded to the render surface verbatim
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleConfig(pub serde_json::Map<String, serde_json::Value>);

impl StyleConfig {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }
}

/// Authority → render surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum AuthorityMessage {
    /// Entire element tree of the current page
    FullSync {
        elements: Vec<Element>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style_config: Option<StyleConfig>,
    },

    /// Replace the text of one leaf element
    ContentUpdate {
        element_id: ElementId,
        content: String,
    },

    /// Replace the attribute map of one element
    AttributeUpdate {
        element_id: ElementId,
        attributes: BTreeMap<String, String>,
    },

    SelectElement { element_id: Option<ElementId> },

    HoverElement { element_id: Option<ElementId> },

    StyleConfig { config: StyleConfig },
}

impl AuthorityMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            AuthorityMessage::FullSync { .. } => "full-sync",
            AuthorityMessage::ContentUpdate { .. } => "content-update",
            AuthorityMessage::AttributeUpdate { .. } => "attribute-update",
            AuthorityMessage::SelectElement { .. } => "select-element",
            AuthorityMessage::HoverElement { .. } => "hover-element",
            AuthorityMessage::StyleConfig { .. } => "style-config",
        }
    }
}

/// Render surface → authority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum SurfaceMessage {
    /// Surface booted and is waiting for its first full sync
    Ready,

    ElementSelected { element_id: ElementId },

    ElementHovered { element_id: ElementId },

    ElementUnhovered,

    /// Text edited directly on a rendered node
    ElementContentChanged {
        element_id: ElementId,
        content: String,
    },
}

impl SurfaceMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            SurfaceMessage::Ready => "ready",
            SurfaceMessage::ElementSelected { .. } => "element-selected",
            SurfaceMessage::ElementHovered { .. } => "element-hovered",
            SurfaceMessage::ElementUnhovered => "element-unhovered",
            SurfaceMessage::ElementContentChanged { .. } => "element-content-changed",
        }
    }
}

//! # Render Surface
//!
//! The sandboxed side of the preview protocol. It keeps a rendered copy of
//! the current page, draws selection and hover outlines, and turns user
//! interaction into `SurfaceMessage`s for the authority.
//!
//! ## Reconciliation
//!
//! A full sync rebuilds every node from the incoming elements, then puts
//! back what the rebuild would otherwise lose:
//!
//! - outlines, for ids that still exist
//! - focus and caret, when the focused element is still an editable leaf;
//!   the offset is clamped to the new text
//!
//! A content update touches one leaf only and is skipped when the text is
//! already equal, so an echo of what the user just typed is a no-op.

use canvas_protocol::{
    decode, encode, is_void_tag, AuthorityMessage, Element, ElementId, Frame, StyleConfig,
    SurfaceMessage,
};
use std::collections::BTreeMap;

use crate::caret::{byte_index, char_len, Caret};
use crate::dom::{count_nodes, find_node, find_node_mut, Outline, RenderedNode};
use crate::error::PreviewError;
use crate::html;

/// What the surface currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceView {
    /// Booted, waiting for the first full sync
    Loading,
    /// Synced with a page that has no elements; a placeholder is shown
    Empty,
    Tree,
}

#[derive(Debug)]
pub struct RenderSurface {
    origin: String,
    view: SurfaceView,
    nodes: Vec<RenderedNode>,
    selected: Option<ElementId>,
    hovered: Option<ElementId>,
    caret: Option<Caret>,
    style: StyleConfig,
    outbox: Vec<SurfaceMessage>,
}

impl RenderSurface {
    /// `origin` is both stamped on outgoing frames and required on incoming ones
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            view: SurfaceView::Loading,
            nodes: Vec::new(),
            selected: None,
            hovered: None,
            caret: None,
            style: StyleConfig::default(),
            outbox: Vec::new(),
        }
    }

    /// Start (or restart) the surface and announce it to the authority
    pub fn boot(&mut self) {
        self.view = SurfaceView::Loading;
        self.nodes.clear();
        self.selected = None;
        self.hovered = None;
        self.caret = None;
        self.outbox.push(SurfaceMessage::Ready);
        tracing::info!("Render surface booted");
    }

    pub fn view(&self) -> SurfaceView {
        self.view
    }

    pub fn nodes(&self) -> &[RenderedNode] {
        &self.nodes
    }

    pub fn node(&self, id: &ElementId) -> Option<&RenderedNode> {
        find_node(&self.nodes, id)
    }

    pub fn node_count(&self) -> usize {
        count_nodes(&self.nodes)
    }

    pub fn outline_of(&self, id: &ElementId) -> Outline {
        self.node(id).map(|n| n.outline).unwrap_or_default()
    }

    pub fn selected(&self) -> Option<&ElementId> {
        self.selected.as_ref()
    }

    pub fn hovered(&self) -> Option<&ElementId> {
        self.hovered.as_ref()
    }

    pub fn caret(&self) -> Option<&Caret> {
        self.caret.as_ref()
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    // ------------------------------------------------------------------
    // Authority → surface
    // ------------------------------------------------------------------

    /// Decode a frame and apply it. Untrusted or malformed frames are
    /// dropped without touching the surface.
    pub fn receive(&mut self, frame: &Frame) -> Result<(), PreviewError> {
        match decode::<AuthorityMessage>(frame, &self.origin) {
            Ok(message) => {
                self.apply(message);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(origin = %frame.origin, error = %e, "Dropping frame");
                Err(e.into())
            }
        }
    }

    pub fn apply(&mut self, message: AuthorityMessage) {
        tracing::debug!(kind = message.kind(), "Authority message");

        match message {
            AuthorityMessage::FullSync {
                elements,
                style_config,
            } => {
                if let Some(config) = style_config {
                    self.style = config;
                }
                self.full_sync(&elements);
            }
            AuthorityMessage::ContentUpdate {
                element_id,
                content,
            } => self.update_content(&element_id, content),
            AuthorityMessage::AttributeUpdate {
                element_id,
                attributes,
            } => self.update_attributes(&element_id, attributes),
            AuthorityMessage::SelectElement { element_id } => self.set_selected(element_id),
            AuthorityMessage::HoverElement { element_id } => self.set_hovered(element_id),
            AuthorityMessage::StyleConfig { config } => self.style = config,
        }
    }

    fn full_sync(&mut self, elements: &[Element]) {
        self.nodes = elements.iter().map(RenderedNode::from_element).collect();
        self.view = if self.nodes.is_empty() {
            SurfaceView::Empty
        } else {
            SurfaceView::Tree
        };

        if self.selected.as_ref().is_some_and(|id| self.node(id).is_none()) {
            self.selected = None;
        }
        if self.hovered.as_ref().is_some_and(|id| self.node(id).is_none()) {
            self.hovered = None;
        }
        for id in [self.selected.clone(), self.hovered.clone()].into_iter().flatten() {
            self.refresh_outline(&id);
        }

        if let Some(mut caret) = self.caret.take() {
            let text = self
                .node(&caret.element_id)
                .filter(|node| is_editable(node))
                .map(|node| node.text().to_string());
            match text {
                Some(text) => {
                    caret.clamp_to(&text);
                    self.caret = Some(caret);
                }
                None => tracing::debug!(element_id = %caret.element_id, "Focused node gone, blurring"),
            }
        }
    }

    fn update_content(&mut self, id: &ElementId, content: String) {
        let Some(node) = find_node_mut(&mut self.nodes, id) else {
            tracing::debug!(element_id = %id, "Content update for unknown node");
            return;
        };
        if !node.is_leaf() {
            tracing::debug!(element_id = %id, "Content update skipped, node has children");
            return;
        }
        if node.text() == content {
            return;
        }

        let text_len = char_len(&content);
        node.text = Some(content);

        if let Some(caret) = self.caret.as_mut().filter(|c| &c.element_id == id) {
            caret.offset = caret.offset.min(text_len);
        }
    }

    fn update_attributes(&mut self, id: &ElementId, attributes: BTreeMap<String, String>) {
        match find_node_mut(&mut self.nodes, id) {
            Some(node) => node.attributes = attributes,
            None => tracing::debug!(element_id = %id, "Attribute update for unknown node"),
        }
    }

    fn set_selected(&mut self, id: Option<ElementId>) {
        let id = id.filter(|id| self.node(id).is_some());
        if let Some(previous) = std::mem::replace(&mut self.selected, id.clone()) {
            self.refresh_outline(&previous);
        }
        if let Some(id) = id {
            self.refresh_outline(&id);
        }
    }

    fn set_hovered(&mut self, id: Option<ElementId>) {
        let id = id.filter(|id| self.node(id).is_some());
        if let Some(previous) = std::mem::replace(&mut self.hovered, id.clone()) {
            self.refresh_outline(&previous);
        }
        if let Some(id) = id {
            self.refresh_outline(&id);
        }
    }

    fn refresh_outline(&mut self, id: &ElementId) {
        let outline = Outline::resolve(
            self.selected.as_ref() == Some(id),
            self.hovered.as_ref() == Some(id),
        );
        if let Some(node) = find_node_mut(&mut self.nodes, id) {
            node.outline = outline;
        }
    }

    // ------------------------------------------------------------------
    // User interaction
    // ------------------------------------------------------------------

    pub fn click(&mut self, id: &ElementId) -> Result<(), PreviewError> {
        self.require(id)?;
        self.outbox.push(SurfaceMessage::ElementSelected {
            element_id: id.clone(),
        });
        Ok(())
    }

    pub fn pointer_enter(&mut self, id: &ElementId) -> Result<(), PreviewError> {
        self.require(id)?;
        self.outbox.push(SurfaceMessage::ElementHovered {
            element_id: id.clone(),
        });
        Ok(())
    }

    pub fn pointer_leave(&mut self) {
        self.outbox.push(SurfaceMessage::ElementUnhovered);
    }

    /// Put the caret into an editable leaf
    pub fn focus(&mut self, id: &ElementId, offset: usize) -> Result<(), PreviewError> {
        let node = self.require(id)?;
        if !is_editable(node) {
            return Err(PreviewError::NotEditable(id.clone()));
        }
        let mut caret = Caret::new(id.clone(), offset);
        caret.clamp_to(node.text());
        self.caret = Some(caret);
        Ok(())
    }

    pub fn blur(&mut self) {
        self.caret = None;
    }

    /// The user replaced the whole text of a leaf in place
    pub fn input(
        &mut self,
        id: &ElementId,
        content: impl Into<String>,
    ) -> Result<(), PreviewError> {
        let content = content.into();
        let node = find_node_mut(&mut self.nodes, id)
            .ok_or_else(|| PreviewError::UnknownElement(id.clone()))?;
        if !is_editable(node) {
            return Err(PreviewError::NotEditable(id.clone()));
        }

        let text_len = char_len(&content);
        node.text = Some(content.clone());
        if let Some(caret) = self.caret.as_mut().filter(|c| &c.element_id == id) {
            caret.offset = caret.offset.min(text_len);
        }

        self.outbox.push(SurfaceMessage::ElementContentChanged {
            element_id: id.clone(),
            content,
        });
        Ok(())
    }

    /// Type `text` at the caret of the focused leaf
    pub fn type_text(&mut self, text: &str) -> Result<(), PreviewError> {
        let caret = self.caret.clone().ok_or(PreviewError::NoFocus)?;
        let mut content = self
            .node(&caret.element_id)
            .ok_or_else(|| PreviewError::UnknownElement(caret.element_id.clone()))?
            .text()
            .to_string();
        content.insert_str(byte_index(&content, caret.offset), text);

        self.input(&caret.element_id, content)?;
        if let Some(c) = self.caret.as_mut() {
            c.offset = caret.offset + char_len(text);
        }
        Ok(())
    }

    fn require(&self, id: &ElementId) -> Result<&RenderedNode, PreviewError> {
        self.node(id)
            .ok_or_else(|| PreviewError::UnknownElement(id.clone()))
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    pub fn take_outgoing(&mut self) -> Vec<SurfaceMessage> {
        std::mem::take(&mut self.outbox)
    }

    pub fn take_outgoing_frames(&mut self) -> Vec<Frame> {
        let origin = self.origin.clone();
        self.take_outgoing()
            .into_iter()
            .filter_map(|msg| match encode(&origin, &msg) {
                Ok(frame) => Some(frame),
                Err(e) => {
                    tracing::warn!(kind = msg.kind(), error = %e, "Failed to encode message");
                    None
                }
            })
            .collect()
    }

    pub fn to_html(&self) -> String {
        html::render(self)
    }
}

fn is_editable(node: &RenderedNode) -> bool {
    node.is_leaf() && !is_void_tag(&node.tag)
}

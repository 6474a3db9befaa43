//! # Sync Authority
//!
//! The authority half of the preview protocol. It never touches the render
//! surface directly: it queues `AuthorityMessage`s in an outbox which the
//! host drains and posts over a port.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized ──ready──▶ Synced ──ready (surface reloaded)──▶ Synced
//!                            │
//!                            ├─ tree changed here     → full-sync
//!                            ├─ selection / hover     → select-element / hover-element
//!                            └─ selected leaf changed → content-update / attribute-update
//! ```
//!
//! Targeted updates follow the primary selection only and are sent when
//! the same element was already observed with different values. Elements
//! with children never get a content update: replacing their text would
//! wipe the rendered children.
//!
//! After the surface reports an in-place text edit the element enters an
//! echo-suppression window; no content update for it leaves the authority
//! until the window closes, so the authority cannot fight the user's
//! keystrokes. A full sync sent while a window is open may carry text the
//! surface has already typed past, so when such a window closes the
//! element's settled content is sent once more.

use canvas_protocol::{encode, AuthorityMessage, Element, ElementId, Frame, StyleConfig};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::selection::Selection;
use crate::tree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Surface has not reported `ready` yet; nothing is sent
    Uninitialized,
    Synced,
}

/// Last observed values of the primary selected element
#[derive(Debug, Clone, PartialEq)]
struct Observed {
    id: ElementId,
    content: Option<String>,
    attributes: BTreeMap<String, String>,
}

impl Observed {
    fn of(element: &Element) -> Self {
        Self {
            id: element.id.clone(),
            content: element.content.clone(),
            attributes: element.attributes.clone(),
        }
    }
}

#[derive(Debug)]
pub struct SyncAuthority {
    state: SyncState,
    origin: String,
    style_config: Option<StyleConfig>,
    echo_window: Duration,
    outbox: Vec<AuthorityMessage>,
    sent_selection: Option<ElementId>,
    sent_hover: Option<ElementId>,
    observed: Option<Observed>,
    suppressed: HashMap<ElementId, Instant>,
    /// Suppressed ids that a full sync went out for during their window
    resynced: HashSet<ElementId>,
}

impl SyncAuthority {
    pub fn new(origin: impl Into<String>, echo_window: Duration) -> Self {
        Self {
            state: SyncState::Uninitialized,
            origin: origin.into(),
            style_config: None,
            echo_window,
            outbox: Vec::new(),
            sent_selection: None,
            sent_hover: None,
            observed: None,
            suppressed: HashMap::new(),
            resynced: HashSet::new(),
        }
    }

    pub fn with_style_config(mut self, config: Option<StyleConfig>) -> Self {
        self.style_config = config;
        self
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Surface booted (or rebooted): send everything it needs from scratch
    pub fn on_ready(&mut self, roots: &[Element], selection: &Selection) {
        if self.state == SyncState::Synced {
            tracing::info!("Render surface reloaded, resyncing");
        }
        self.state = SyncState::Synced;
        self.push_full_sync(roots);

        self.sent_selection = selection.primary().cloned();
        self.outbox.push(AuthorityMessage::SelectElement {
            element_id: self.sent_selection.clone(),
        });
        self.sent_hover = selection.hovered().cloned();
        self.outbox.push(AuthorityMessage::HoverElement {
            element_id: self.sent_hover.clone(),
        });

        // First observation of the current selection must not echo
        self.observed = selection.primary_element(roots).map(Observed::of);
    }

    /// The authoritative tree changed on this side
    pub fn tree_changed(&mut self, roots: &[Element]) {
        if self.state == SyncState::Synced {
            self.push_full_sync(roots);
        }
    }

    /// Compare current selection, hover and selected element against what
    /// the surface last heard about, queueing whatever differs.
    pub fn observe(&mut self, roots: &[Element], selection: &Selection, now: Instant) {
        if self.state != SyncState::Synced {
            return;
        }

        let primary = selection.primary().cloned();
        if primary != self.sent_selection {
            self.sent_selection = primary.clone();
            self.outbox.push(AuthorityMessage::SelectElement {
                element_id: primary,
            });
        }

        let hovered = selection.hovered().cloned();
        if hovered != self.sent_hover {
            self.sent_hover = hovered.clone();
            self.outbox.push(AuthorityMessage::HoverElement {
                element_id: hovered,
            });
        }

        let current = selection.primary_element(roots);
        if let (Some(element), Some(previous)) = (current, self.observed.as_ref()) {
            if previous.id == element.id && element.is_leaf() {
                if self.is_suppressed(&element.id, now) {
                    tracing::debug!(element_id = %element.id, "Holding back content update during echo window");
                } else {
                    if previous.content != element.content {
                        self.outbox.push(AuthorityMessage::ContentUpdate {
                            element_id: element.id.clone(),
                            content: element.content.clone().unwrap_or_default(),
                        });
                    }
                    if previous.attributes != element.attributes {
                        self.outbox.push(AuthorityMessage::AttributeUpdate {
                            element_id: element.id.clone(),
                            attributes: element.attributes.clone(),
                        });
                    }
                }
            }
        }

        self.observed = current.map(Observed::of);
    }

    /// The surface edited `id` in place; open its echo-suppression window
    pub fn note_surface_edit(&mut self, id: &ElementId, now: Instant) {
        self.suppressed.insert(id.clone(), now + self.echo_window);
    }

    pub fn is_suppressed(&self, id: &ElementId, now: Instant) -> bool {
        self.suppressed.get(id).is_some_and(|until| *until > now)
    }

    /// Close elapsed suppression windows. Elements that were overwritten
    /// by a full sync during their window get their current content again.
    pub fn expire(&mut self, roots: &[Element], now: Instant) {
        let mut closed = Vec::new();
        self.suppressed.retain(|id, until| {
            let open = *until > now;
            if !open {
                closed.push(id.clone());
            }
            open
        });

        for id in closed {
            if !self.resynced.remove(&id) || self.state != SyncState::Synced {
                continue;
            }
            match tree::find(roots, &id) {
                Some(element) if element.is_leaf() => {
                    tracing::debug!(element_id = %id, "Echo window closed after resync, restating content");
                    self.outbox.push(AuthorityMessage::ContentUpdate {
                        element_id: id,
                        content: element.content.clone().unwrap_or_default(),
                    });
                }
                _ => {}
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.suppressed.values().min().copied()
    }

    /// Replace the global style configuration and forward it
    pub fn set_style_config(&mut self, config: StyleConfig) {
        self.style_config = Some(config.clone());
        if self.state == SyncState::Synced {
            self.outbox.push(AuthorityMessage::StyleConfig { config });
        }
    }

    /// Queue a full sync regardless of what changed (recovery)
    pub fn force_full_sync(&mut self, roots: &[Element]) {
        self.tree_changed(roots);
    }

    /// Surface is gone; wait for the next `ready`
    pub fn reset(&mut self) {
        self.state = SyncState::Uninitialized;
        self.outbox.clear();
        self.sent_selection = None;
        self.sent_hover = None;
        self.observed = None;
        self.suppressed.clear();
        self.resynced.clear();
    }

    pub fn take_outgoing(&mut self) -> Vec<AuthorityMessage> {
        std::mem::take(&mut self.outbox)
    }

    /// Drain the outbox as frames stamped with this authority's origin
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

    fn push_full_sync(&mut self, roots: &[Element]) {
        self.resynced.extend(self.suppressed.keys().cloned());
        self.outbox.push(AuthorityMessage::FullSync {
            elements: roots.to_vec(),
            style_config: self.style_config.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ElementId {
        ElementId::new(s)
    }

    fn roots() -> Vec<Element> {
        tree::recompute_parents(&[
            Element::new("P", "div")
                .with_child(Element::new("c1", "span").with_content("one"))
                .with_child(Element::new("c2", "span").with_content("two")),
            Element::new("L", "p").with_content("hello"),
        ])
    }

    fn synced(roots: &[Element], selection: &Selection) -> SyncAuthority {
        let mut sync = SyncAuthority::new("o", Duration::from_millis(100));
        sync.on_ready(roots, selection);
        sync.take_outgoing();
        sync
    }

    fn set_content(roots: &[Element], target: &str, content: &str) -> Vec<Element> {
        tree::update_element(roots, &id(target), |e| e.content = Some(content.into()))
    }

    #[test]
    fn test_nothing_sent_before_ready() {
        let roots = roots();
        let mut sync = SyncAuthority::new("o", Duration::from_millis(100));
        let mut selection = Selection::new();
        selection.select(Some(id("L")));

        sync.tree_changed(&roots);
        sync.observe(&roots, &selection, Instant::now());
        assert!(sync.take_outgoing().is_empty());
        assert_eq!(sync.state(), SyncState::Uninitialized);
    }

    #[test]
    fn test_ready_sends_full_sync_first() {
        let roots = roots();
        let mut sync = SyncAuthority::new("o", Duration::from_millis(100));
        sync.on_ready(&roots, &Selection::new());

        let out = sync.take_outgoing();
        assert!(matches!(
            &out[0],
            AuthorityMessage::FullSync { elements, .. } if elements.len() == 2
        ));
        assert_eq!(sync.state(), SyncState::Synced);
    }

    #[test]
    fn test_switching_selection_sends_no_content_update() {
        let roots = roots();
        let mut selection = Selection::new();
        selection.select(Some(id("c1")));
        let mut sync = synced(&roots, &selection);

        selection.select(Some(id("L")));
        sync.observe(&roots, &selection, Instant::now());
        assert_eq!(
            sync.take_outgoing(),
            vec![AuthorityMessage::SelectElement {
                element_id: Some(id("L"))
            }]
        );
    }

    #[test]
    fn test_content_change_on_selected_leaf() {
        let roots = roots();
        let mut selection = Selection::new();
        selection.select(Some(id("L")));
        let mut sync = synced(&roots, &selection);

        let roots = set_content(&roots, "L", "hello world");
        sync.observe(&roots, &selection, Instant::now());
        assert_eq!(
            sync.take_outgoing(),
            vec![AuthorityMessage::ContentUpdate {
                element_id: id("L"),
                content: "hello world".into()
            }]
        );
    }

    #[test]
    fn test_parent_with_children_never_gets_content_update() {
        let roots = roots();
        let mut selection = Selection::new();
        selection.select(Some(id("P")));
        let mut sync = synced(&roots, &selection);

        let roots = set_content(&roots, "P", "clobber");
        sync.observe(&roots, &selection, Instant::now());
        assert!(sync.take_outgoing().is_empty());
    }

    #[test]
    fn test_attribute_change_on_selected_leaf() {
        let roots = roots();
        let mut selection = Selection::new();
        selection.select(Some(id("L")));
        let mut sync = synced(&roots, &selection);

        let roots = tree::update_element(&roots, &id("L"), |e| {
            e.attributes.insert("title".into(), "greeting".into());
        });
        sync.observe(&roots, &selection, Instant::now());
        let out = sync.take_outgoing();
        assert!(matches!(
            &out[..],
            [AuthorityMessage::AttributeUpdate { element_id, attributes }]
                if element_id == &id("L") && attributes["title"] == "greeting"
        ));
    }

    #[test]
    fn test_echo_window_holds_back_updates() {
        let roots = roots();
        let mut selection = Selection::new();
        selection.select(Some(id("L")));
        let mut sync = synced(&roots, &selection);
        let t0 = Instant::now();

        sync.note_surface_edit(&id("L"), t0);
        let roots = set_content(&roots, "L", "typed");
        sync.observe(&roots, &selection, t0 + Duration::from_millis(10));
        assert!(sync.take_outgoing().is_empty());

        // after the window the settled value is not replayed
        sync.expire(&roots, t0 + Duration::from_millis(150));
        sync.observe(&roots, &selection, t0 + Duration::from_millis(150));
        assert!(sync.take_outgoing().is_empty());
        assert_eq!(sync.next_deadline(), None);
    }

    #[test]
    fn test_resync_during_echo_window_restates_content() {
        let roots = roots();
        let mut selection = Selection::new();
        selection.select(Some(id("L")));
        let mut sync = synced(&roots, &selection);
        let t0 = Instant::now();

        sync.note_surface_edit(&id("L"), t0);
        let roots = set_content(&roots, "L", "typed");
        sync.tree_changed(&roots);
        let roots = set_content(&roots, "L", "typed more");
        sync.observe(&roots, &selection, t0 + Duration::from_millis(20));
        assert!(matches!(&sync.take_outgoing()[..], [AuthorityMessage::FullSync { .. }]));

        sync.expire(&roots, t0 + Duration::from_millis(50));
        assert!(sync.take_outgoing().is_empty());

        sync.expire(&roots, t0 + Duration::from_millis(150));
        assert_eq!(
            sync.take_outgoing(),
            vec![AuthorityMessage::ContentUpdate {
                element_id: id("L"),
                content: "typed more".into()
            }]
        );

        // only once per window
        sync.expire(&roots, t0 + Duration::from_millis(300));
        assert!(sync.take_outgoing().is_empty());
    }

    #[test]
    fn test_hover_propagation() {
        let roots = roots();
        let mut selection = Selection::new();
        let mut sync = synced(&roots, &selection);

        selection.hover(Some(id("c2")));
        sync.observe(&roots, &selection, Instant::now());
        selection.hover(None);
        sync.observe(&roots, &selection, Instant::now());

        assert_eq!(
            sync.take_outgoing(),
            vec![
                AuthorityMessage::HoverElement {
                    element_id: Some(id("c2"))
                },
                AuthorityMessage::HoverElement { element_id: None },
            ]
        );
    }

    #[test]
    fn test_frames_carry_origin() {
        let roots = roots();
        let mut sync = SyncAuthority::new("canvas://test", Duration::from_millis(100));
        sync.on_ready(&roots, &Selection::new());
        let frames = sync.take_outgoing_frames();
        assert_eq!(frames.len(), 3);
        assert!(frames.iter().all(|f| f.origin == "canvas://test"));
    }

    #[test]
    fn test_reset_waits_for_next_ready() {
        let roots = roots();
        let mut sync = synced(&roots, &Selection::new());
        sync.reset();
        sync.tree_changed(&roots);
        assert!(sync.take_outgoing().is_empty());
    }
}

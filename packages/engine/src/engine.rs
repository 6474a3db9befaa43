//! # Document Engine
//!
//! The one object a host talks to. It owns the page registry, one history
//! per page, the selection, the debounce timer and the sync authority, and
//! keeps them consistent:
//!
//! ```text
//! mutator ──▶ Mutation::apply ──▶ commit to current page
//!                                   ├─▶ selection.retain_existing
//!                                   ├─▶ history (immediate | debounced)
//!                                   └─▶ sync (full-sync, then observe)
//! ```
//!
//! Time never advances on its own: the host calls [`DocumentEngine::poll`]
//! at or after [`DocumentEngine::next_deadline`] to fire the debounce and
//! close echo-suppression windows.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use canvas_protocol::{
    decode, AuthorityMessage, Element, ElementId, Frame, IdGenerator, StyleConfig, SurfaceMessage,
};

use crate::config::EngineConfig;
use crate::errors::EngineError;
use crate::history::{History, HistoryMode};
use crate::markup::{MarkupExporter, MarkupImporter};
use crate::mutations::{Mutation, MutationResult};
use crate::pages::{Page, PageId, PageRegistry, RegistrySnapshot};
use crate::selection::Selection;
use crate::store::PageStore;
use crate::sync::{SyncAuthority, SyncState};
use crate::timer::{Clock, DebounceTimer, SystemClock};
use crate::tree;

/// Which side produced a tree change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeOrigin {
    Authority,
    /// In-place edit reported by the render surface; never echoed as a full sync
    Surface,
}

pub struct DocumentEngine {
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    registry: PageRegistry,
    histories: HashMap<PageId, History>,
    pending_capture: DebounceTimer<PageId>,
    selection: Selection,
    sync: SyncAuthority,
    ids: IdGenerator,
    disposed: bool,
}

impl DocumentEngine {
    pub fn new(config: EngineConfig) -> Self {
        let sync = SyncAuthority::new(config.origin.clone(), config.echo_suppression())
            .with_style_config(config.style_config.clone());
        let mut engine = Self {
            clock: Arc::new(SystemClock),
            registry: PageRegistry::new(),
            histories: HashMap::new(),
            pending_capture: DebounceTimer::new(config.debounce()),
            selection: Selection::new(),
            sync,
            ids: IdGenerator::new("canvas"),
            disposed: false,
            config,
        };
        engine.reset_histories();
        engine
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replace the registry. Every page starts a fresh history.
    pub fn with_registry(mut self, registry: PageRegistry) -> Self {
        self.registry = registry;
        self.selection = Selection::new();
        self.pending_capture.cancel();
        self.reset_histories();
        self
    }

    /// Build an engine over whatever `store` holds; load failures fall back
    /// to a single empty default page.
    pub fn load(config: EngineConfig, store: &dyn PageStore) -> Self {
        Self::new(config).with_registry(PageRegistry::load_or_default(store))
    }

    fn reset_histories(&mut self) {
        let capacity = self.config.history_capacity;
        self.histories = self
            .registry
            .pages()
            .iter()
            .map(|page| {
                (
                    page.id.clone(),
                    History::new(capacity, page.elements.clone()),
                )
            })
            .collect();
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Root elements of the current page
    pub fn elements(&self) -> &[Element] {
        &self.registry.current().elements
    }

    pub fn find(&self, id: &ElementId) -> Option<&Element> {
        tree::find(self.elements(), id)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_elements(&self) -> Vec<&Element> {
        self.selection.selected_elements(self.elements())
    }

    pub fn hovered_element(&self) -> Option<&Element> {
        self.selection.hovered_element(self.elements())
    }

    pub fn registry(&self) -> &PageRegistry {
        &self.registry
    }

    pub fn current_page(&self) -> &Page {
        self.registry.current()
    }

    /// History of the current page
    pub fn history(&self) -> Option<&History> {
        self.histories.get(self.registry.current_id())
    }

    pub fn can_undo(&self) -> bool {
        self.history().is_some_and(History::can_undo)
    }

    pub fn can_redo(&self) -> bool {
        self.history().is_some_and(History::can_redo)
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync.state()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Mint an id that no element created by this engine has used
    pub fn next_id(&mut self) -> ElementId {
        self.ids.next_id()
    }

    // ------------------------------------------------------------------
    // Tree operations
    // ------------------------------------------------------------------

    /// Insert `element`; returns its id when the insert happened
    pub fn add_element(
        &mut self,
        element: Element,
        parent_id: Option<&ElementId>,
        position: Option<usize>,
    ) -> Option<ElementId> {
        self.run(
            Mutation::AddElement {
                element,
                parent_id: parent_id.cloned(),
                position,
            },
            ChangeOrigin::Authority,
        )
        .ok()
        .and_then(|result| result.created)
    }

    pub fn remove_element(&mut self, id: &ElementId) -> bool {
        self.apply(Mutation::RemoveElement {
            element_id: id.clone(),
        })
    }

    pub fn move_element(
        &mut self,
        id: &ElementId,
        new_parent_id: Option<&ElementId>,
        position: Option<usize>,
    ) -> bool {
        self.apply(Mutation::MoveElement {
            element_id: id.clone(),
            new_parent_id: new_parent_id.cloned(),
            position,
        })
    }

    pub fn update_content(&mut self, id: &ElementId, content: impl Into<String>) -> bool {
        self.apply(Mutation::UpdateContent {
            element_id: id.clone(),
            content: content.into(),
        })
    }

    pub fn set_attribute(
        &mut self,
        id: &ElementId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> bool {
        self.apply(Mutation::SetAttribute {
            element_id: id.clone(),
            name: name.into(),
            value: value.into(),
        })
    }

    pub fn remove_attribute(&mut self, id: &ElementId, name: impl Into<String>) -> bool {
        self.apply(Mutation::RemoveAttribute {
            element_id: id.clone(),
            name: name.into(),
        })
    }

    pub fn set_classes(&mut self, id: &ElementId, classes: Vec<String>) -> bool {
        self.apply(Mutation::SetClasses {
            element_id: id.clone(),
            classes,
        })
    }

    pub fn add_class(&mut self, id: &ElementId, class: impl Into<String>) -> bool {
        self.apply(Mutation::AddClass {
            element_id: id.clone(),
            class: class.into(),
        })
    }

    pub fn remove_class(&mut self, id: &ElementId, class: impl Into<String>) -> bool {
        self.apply(Mutation::RemoveClass {
            element_id: id.clone(),
            class: class.into(),
        })
    }

    /// Deep-copy an element next to the original; returns the copy's id
    pub fn duplicate_element(&mut self, id: &ElementId) -> Option<ElementId> {
        self.run(
            Mutation::DuplicateElement {
                element_id: id.clone(),
            },
            ChangeOrigin::Authority,
        )
        .ok()
        .and_then(|result| result.created)
    }

    /// Apply a mutation; rejected mutations are logged no-ops
    pub fn apply(&mut self, mutation: Mutation) -> bool {
        self.try_apply(mutation).is_ok()
    }

    /// Like [`apply`](Self::apply) but reports why a mutation was rejected
    pub fn try_apply(&mut self, mutation: Mutation) -> Result<MutationResult, EngineError> {
        self.run(mutation, ChangeOrigin::Authority)
    }

    /// Parse `markup` with `importer` and insert the resulting elements under
    /// `parent_id`, in order, as one history entry. Imported ids are replaced
    /// with fresh ones. Returns the ids of the inserted roots.
    pub fn insert_markup<I: MarkupImporter>(
        &mut self,
        importer: &I,
        markup: &str,
        parent_id: Option<&ElementId>,
        position: Option<usize>,
    ) -> Vec<ElementId> {
        if self.disposed {
            return Vec::new();
        }

        let imported = match importer.import(markup) {
            Ok(elements) => elements,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to import markup");
                return Vec::new();
            }
        };
        if imported.is_empty() {
            return Vec::new();
        }

        if let Some(parent_id) = parent_id {
            match tree::find(self.elements(), parent_id) {
                Some(parent) if parent.can_have_children() => {}
                _ => {
                    tracing::debug!(parent_id = %parent_id, "Markup insert target cannot take children");
                    return Vec::new();
                }
            }
        }

        let mut elements = self.elements().to_vec();
        let mut inserted = Vec::with_capacity(imported.len());
        for (offset, element) in imported.iter().enumerate() {
            let fresh = element.clone_with_fresh_ids(&mut self.ids);
            inserted.push(fresh.id.clone());
            elements = tree::insert(&elements, fresh, parent_id, position.map(|p| p + offset));
        }

        self.commit(elements, HistoryMode::Immediate, ChangeOrigin::Authority);
        inserted
    }

    /// Render the current page with `exporter`
    pub fn export_markup<E: MarkupExporter>(&self, exporter: &E) -> String {
        exporter.export(self.elements())
    }

    fn run(
        &mut self,
        mutation: Mutation,
        origin: ChangeOrigin,
    ) -> Result<MutationResult, EngineError> {
        if self.disposed {
            tracing::debug!(mutation = mutation.name(), "Ignoring mutation on disposed engine");
            return Err(EngineError::Disposed);
        }

        let result = match mutation.apply(&self.registry.current().elements, &mut self.ids) {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!(mutation = mutation.name(), error = %e, "Mutation rejected");
                return Err(e.into());
            }
        };

        if result.elements.as_slice() == self.elements() {
            tracing::debug!(mutation = mutation.name(), "Mutation left the tree unchanged");
            return Ok(result);
        }

        self.commit(result.elements.clone(), mutation.history_mode(), origin);
        Ok(result)
    }

    fn commit(&mut self, elements: Vec<Element>, mode: HistoryMode, origin: ChangeOrigin) {
        let page_id = self.registry.current_id().clone();

        // Text typed before a structural change gets its own entry
        if mode == HistoryMode::Immediate {
            self.flush_pending();
        }

        self.registry.current_mut().set_elements(elements);
        self.selection
            .retain_existing(&self.registry.current().elements);
        self.record(page_id, mode);

        if origin == ChangeOrigin::Authority {
            self.sync.tree_changed(&self.registry.current().elements);
        }
        self.observe();
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    fn record(&mut self, page_id: PageId, mode: HistoryMode) {
        match mode {
            HistoryMode::Immediate => self.capture(&page_id),
            HistoryMode::Debounced => {
                let now = self.clock.now();
                if let Some(displaced) = self.pending_capture.arm(page_id, now) {
                    self.capture(&displaced);
                }
            }
        }
    }

    fn capture(&mut self, page_id: &PageId) {
        let Some(page) = self.registry.get(page_id) else {
            return;
        };
        let snapshot = page.elements.clone();
        let capacity = self.config.history_capacity;
        self.histories
            .entry(page_id.clone())
            .or_insert_with(|| History::new(capacity, Vec::new()))
            .push(snapshot);
    }

    /// Capture a pending debounced edit right away
    fn flush_pending(&mut self) {
        if let Some(page_id) = self.pending_capture.cancel() {
            self.capture(&page_id);
        }
    }

    pub fn undo(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.flush_pending();

        let snapshot = self
            .histories
            .get_mut(self.registry.current_id())
            .and_then(|history| history.undo().cloned());
        match snapshot {
            Some(elements) => {
                self.restore(elements);
                true
            }
            None => {
                tracing::debug!("Nothing to undo");
                false
            }
        }
    }

    pub fn redo(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.flush_pending();

        let snapshot = self
            .histories
            .get_mut(self.registry.current_id())
            .and_then(|history| history.redo().cloned());
        match snapshot {
            Some(elements) => {
                self.restore(elements);
                true
            }
            None => {
                tracing::debug!("Nothing to redo");
                false
            }
        }
    }

    fn restore(&mut self, elements: Vec<Element>) {
        self.registry.current_mut().set_elements(elements);
        self.selection.clear();
        self.selection
            .retain_existing(&self.registry.current().elements);
        self.sync.tree_changed(&self.registry.current().elements);
        self.observe();
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Select exactly one element, or clear with `None`
    pub fn select(&mut self, id: Option<ElementId>) {
        if self.disposed {
            return;
        }
        if let Some(id) = &id {
            if !tree::contains(self.elements(), id) {
                tracing::debug!(element_id = %id, "Select ignored, element not found");
                return;
            }
        }
        self.selection.select(id);
        self.observe();
    }

    pub fn toggle_selection(&mut self, id: &ElementId) {
        if self.disposed || !tree::contains(self.elements(), id) {
            return;
        }
        self.selection.toggle(id.clone());
        self.observe();
    }

    pub fn select_range(&mut self, anchor: &ElementId, target: &ElementId) {
        if self.disposed {
            return;
        }
        self.selection
            .select_range(&self.registry.current().elements, anchor, target);
        self.observe();
    }

    /// Range from the current anchor to `target`
    pub fn extend_selection(&mut self, target: &ElementId) {
        if self.disposed {
            return;
        }
        self.selection
            .extend_to(&self.registry.current().elements, target);
        self.observe();
    }

    pub fn clear_selection(&mut self) {
        if self.disposed {
            return;
        }
        self.selection.clear();
        self.observe();
    }

    pub fn hover(&mut self, id: Option<ElementId>) {
        if self.disposed {
            return;
        }
        if let Some(id) = &id {
            if !tree::contains(self.elements(), id) {
                tracing::debug!(element_id = %id, "Hover ignored, element not found");
                return;
            }
        }
        self.selection.hover(id);
        self.observe();
    }

    // ------------------------------------------------------------------
    // Pages
    // ------------------------------------------------------------------

    pub fn create_page(&mut self, name: impl Into<String>) -> Option<PageId> {
        if self.disposed {
            return None;
        }
        let id = self.registry.create_page(name);
        self.histories.insert(
            id.clone(),
            History::new(self.config.history_capacity, Vec::new()),
        );
        tracing::info!(page_id = %id, "Page created");
        Some(id)
    }

    pub fn rename_page(&mut self, id: &PageId, name: impl Into<String>) -> bool {
        !self.disposed && self.registry.rename_page(id, name)
    }

    /// Delete a page (never the default one). Deleting the current page
    /// shows the default page.
    pub fn delete_page(&mut self, id: &PageId) -> bool {
        if self.disposed {
            return false;
        }
        self.flush_pending();

        let was_current = self.registry.current_id() == id;
        if !self.registry.delete_page(id) {
            tracing::debug!(page_id = %id, "Page not deleted");
            return false;
        }
        self.histories.remove(id);
        tracing::info!(page_id = %id, "Page deleted");

        if was_current {
            self.page_changed();
        }
        true
    }

    pub fn switch_page(&mut self, id: &PageId) -> bool {
        if self.disposed {
            return false;
        }
        if self.registry.current_id() == id {
            return true;
        }

        self.flush_pending();
        if !self.registry.switch_page(id) {
            tracing::debug!(page_id = %id, "Switch ignored, page not found");
            return false;
        }
        self.page_changed();
        true
    }

    fn page_changed(&mut self) {
        self.selection = Selection::new();
        self.sync.tree_changed(&self.registry.current().elements);
        self.observe();
    }

    // ------------------------------------------------------------------
    // Sync
    // ------------------------------------------------------------------

    /// Decode and handle a frame from the render surface. Frames from any
    /// other origin, or that fail to parse, are dropped.
    pub fn handle_frame(&mut self, frame: &Frame) -> bool {
        match decode::<SurfaceMessage>(frame, &self.config.origin) {
            Ok(message) => {
                self.handle_message(message);
                true
            }
            Err(e) => {
                tracing::warn!(origin = %frame.origin, error = %e, "Dropping frame");
                false
            }
        }
    }

    pub fn handle_message(&mut self, message: SurfaceMessage) {
        if self.disposed {
            return;
        }
        tracing::debug!(kind = message.kind(), "Surface message");

        match message {
            SurfaceMessage::Ready => {
                self.sync
                    .on_ready(&self.registry.current().elements, &self.selection);
            }
            SurfaceMessage::ElementSelected { element_id } => self.select(Some(element_id)),
            SurfaceMessage::ElementHovered { element_id } => self.hover(Some(element_id)),
            SurfaceMessage::ElementUnhovered => self.hover(None),
            SurfaceMessage::ElementContentChanged {
                element_id,
                content,
            } => self.apply_surface_edit(element_id, content),
        }
    }

    fn apply_surface_edit(&mut self, element_id: ElementId, content: String) {
        let now = self.clock.now();
        self.sync.note_surface_edit(&element_id, now);

        let mutation = Mutation::UpdateContent {
            element_id,
            content,
        };
        if self.run(mutation, ChangeOrigin::Surface).is_err() {
            // The surface edited something the tree does not allow; put it back
            self.sync
                .force_full_sync(&self.registry.current().elements);
        }
    }

    fn observe(&mut self) {
        let now = self.clock.now();
        self.sync
            .observe(&self.registry.current().elements, &self.selection, now);
    }

    pub fn set_style_config(&mut self, config: StyleConfig) {
        if self.disposed {
            return;
        }
        self.config.style_config = Some(config.clone());
        self.sync.set_style_config(config);
    }

    /// Fire whatever timers are due
    pub fn poll(&mut self) {
        if self.disposed {
            return;
        }
        let now = self.clock.now();
        if let Some(page_id) = self.pending_capture.take_expired(now) {
            tracing::debug!(page_id = %page_id, "Debounced history capture");
            self.capture(&page_id);
        }
        self.sync.expire(&self.registry.current().elements, now);
    }

    /// When `poll` next has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        [self.pending_capture.deadline(), self.sync.next_deadline()]
            .into_iter()
            .flatten()
            .min()
    }

    pub fn take_outgoing(&mut self) -> Vec<AuthorityMessage> {
        self.sync.take_outgoing()
    }

    pub fn take_outgoing_frames(&mut self) -> Vec<Frame> {
        self.sync.take_outgoing_frames()
    }

    // ------------------------------------------------------------------
    // Persistence and lifecycle
    // ------------------------------------------------------------------

    pub fn snapshot(&self) -> RegistrySnapshot {
        self.registry.snapshot()
    }

    pub fn save(&self, store: &dyn PageStore) -> Result<(), EngineError> {
        store.save(&self.snapshot())
    }

    /// Flush any pending history capture, stop timers and detach from the
    /// surface. Mutators are no-ops afterwards.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.flush_pending();
        self.sync.reset();
        self.disposed = true;
        tracing::info!("Engine disposed");
    }
}

impl Default for DocumentEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualClock;
    use std::time::Duration;

    fn id(s: &str) -> ElementId {
        ElementId::new(s)
    }

    fn engine_with(clock: &ManualClock) -> DocumentEngine {
        let mut engine = DocumentEngine::new(EngineConfig::default()).with_clock(clock.clone());
        engine.add_element(Element::new("root", "div"), None, None);
        engine.add_element(
            Element::new("title", "h1").with_content("Hello"),
            Some(&id("root")),
            None,
        );
        engine
    }

    #[test]
    fn test_starts_with_default_page() {
        let engine = DocumentEngine::default();
        assert!(engine.elements().is_empty());
        assert!(engine.current_page().id.is_default());
        assert!(!engine.can_undo());
        assert_eq!(engine.sync_state(), SyncState::Uninitialized);
    }

    #[test]
    fn test_immediate_mutations_push_history() {
        let clock = ManualClock::new();
        let engine = engine_with(&clock);
        assert_eq!(engine.history().map(History::len), Some(3));
        assert!(engine.can_undo());
    }

    #[test]
    fn test_debounced_edits_coalesce() {
        let clock = ManualClock::new();
        let mut engine = engine_with(&clock);
        let before = engine.history().map(History::len);

        for text in ["H", "He", "Hel", "Hell", "Hello!"] {
            engine.update_content(&id("title"), text);
            clock.advance(Duration::from_millis(100));
            engine.poll();
        }
        assert_eq!(engine.history().map(History::len), before);

        clock.advance(Duration::from_millis(500));
        engine.poll();
        assert_eq!(engine.history().map(History::len), before.map(|n| n + 1));
    }

    #[test]
    fn test_structural_change_flushes_pending_text() {
        let clock = ManualClock::new();
        let mut engine = engine_with(&clock);
        let before = engine.history().map(History::len).unwrap_or_default();

        engine.update_content(&id("title"), "Typed");
        engine.add_element(Element::new("p1", "p"), Some(&id("root")), None);
        assert_eq!(engine.history().map(History::len), Some(before + 2));
        assert!(engine.next_deadline().is_none());

        engine.undo();
        assert!(engine.find(&id("p1")).is_none());
        assert_eq!(
            engine.find(&id("title")).and_then(|e| e.content.as_deref()),
            Some("Typed")
        );
    }

    #[test]
    fn test_undo_clears_selection() {
        let clock = ManualClock::new();
        let mut engine = engine_with(&clock);
        engine.select(Some(id("title")));
        assert!(engine.undo());
        assert!(engine.selection().is_empty());
        assert!(engine.find(&id("title")).is_none());
        assert!(engine.redo());
        assert!(engine.find(&id("title")).is_some());
    }

    #[test]
    fn test_remove_clears_selection_and_hover() {
        let clock = ManualClock::new();
        let mut engine = engine_with(&clock);
        engine.select(Some(id("title")));
        engine.hover(Some(id("title")));

        engine.remove_element(&id("root"));
        assert!(engine.selection().is_empty());
        assert!(engine.hovered_element().is_none());
    }

    #[test]
    fn test_select_missing_element_is_noop() {
        let clock = ManualClock::new();
        let mut engine = engine_with(&clock);
        engine.select(Some(id("title")));
        engine.select(Some(id("ghost")));
        assert_eq!(engine.selection().primary(), Some(&id("title")));
    }

    #[test]
    fn test_rejected_mutation_reports_reason() {
        let clock = ManualClock::new();
        let mut engine = engine_with(&clock);
        let err = engine
            .try_apply(Mutation::MoveElement {
                element_id: id("root"),
                new_parent_id: Some(id("title")),
                position: None,
            })
            .unwrap_err();
        assert!(matches!(err, EngineError::Mutation(_)));
    }

    #[test]
    fn test_pages_keep_separate_history() {
        let clock = ManualClock::new();
        let mut engine = engine_with(&clock);
        let about = engine.create_page("About").unwrap();

        assert!(engine.switch_page(&about));
        assert!(engine.elements().is_empty());
        assert!(!engine.can_undo());

        engine.add_element(Element::new("hero", "section"), None, None);
        assert!(engine.can_undo());

        assert!(engine.switch_page(&PageId::default_page()));
        assert!(engine.find(&id("root")).is_some());

        assert!(engine.delete_page(&about));
        assert!(!engine.delete_page(&PageId::default_page()));
    }

    #[test]
    fn test_delete_current_page_shows_default() {
        let clock = ManualClock::new();
        let mut engine = engine_with(&clock);
        let about = engine.create_page("About").unwrap();
        engine.switch_page(&about);

        assert!(engine.delete_page(&about));
        assert!(engine.current_page().id.is_default());
        assert!(engine.find(&id("root")).is_some());
    }

    #[test]
    fn test_dispose_flushes_and_stops() {
        let clock = ManualClock::new();
        let mut engine = engine_with(&clock);
        let before = engine.history().map(History::len).unwrap_or_default();

        engine.update_content(&id("title"), "Bye");
        engine.dispose();
        assert_eq!(engine.history().map(History::len), Some(before + 1));
        assert!(engine.next_deadline().is_none());

        assert!(!engine.remove_element(&id("root")));
        assert!(matches!(
            engine.try_apply(Mutation::RemoveElement {
                element_id: id("root")
            }),
            Err(EngineError::Disposed)
        ));
        assert!(engine.find(&id("root")).is_some());
    }

    struct LineImporter;

    impl MarkupImporter for LineImporter {
        type Error = String;

        fn import(&self, markup: &str) -> Result<Vec<Element>, String> {
            if markup.is_empty() {
                return Err("empty markup".to_string());
            }
            Ok(markup
                .lines()
                .map(|line| Element::new("tmp", "p").with_content(line))
                .collect())
        }
    }

    #[test]
    fn test_insert_markup_is_one_entry() {
        let clock = ManualClock::new();
        let mut engine = engine_with(&clock);
        let before = engine.history().map(History::len).unwrap_or_default();

        let ids = engine.insert_markup(&LineImporter, "one\ntwo", Some(&id("root")), Some(0));
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);

        let root = engine.find(&id("root")).unwrap();
        assert_eq!(root.children[0].content.as_deref(), Some("one"));
        assert_eq!(root.children[1].content.as_deref(), Some("two"));
        assert_eq!(engine.history().map(History::len), Some(before + 1));

        assert!(engine.insert_markup(&LineImporter, "", None, None).is_empty());
        assert!(engine
            .insert_markup(&LineImporter, "x", Some(&id("ghost")), None)
            .is_empty());
    }

    #[test]
    fn test_next_deadline_tracks_debounce() {
        let clock = ManualClock::new();
        let mut engine = engine_with(&clock);
        assert!(engine.next_deadline().is_none());

        engine.set_attribute(&id("title"), "title", "greeting");
        assert_eq!(
            engine.next_deadline(),
            Some(clock.now() + Duration::from_millis(500))
        );
    }
}

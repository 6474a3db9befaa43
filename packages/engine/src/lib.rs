//! # Canvas Engine
//!
//! Document engine for the visual builder: the canonical element tree of
//! every page, selection, per-page undo/redo, and the authority side of the
//! preview sync protocol.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ host: side panel, keyboard, persistence     │
//! └─────────────────────────────────────────────┘
//!                     ↓ mutators / undo / pages
//! ┌─────────────────────────────────────────────┐
//! │ engine: DocumentEngine                      │
//! │  - tree: pure structural operations         │
//! │  - mutations: validated edits               │
//! │  - history: bounded snapshots + debounce    │
//! │  - selection: ids, re-resolved on change    │
//! │  - sync: outbox for the render surface      │
//! └─────────────────────────────────────────────┘
//!                     ↕ frames over a port
//! ┌─────────────────────────────────────────────┐
//! │ preview: RenderSurface                      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The tree is the source of truth**: the surface is a projection that
//!    can always be rebuilt from a full sync
//! 2. **Silent no-ops**: missing ids and guard violations never panic or
//!    surface errors to the UI
//! 3. **Never fight the user**: in-place text edits are not echoed back
//!    while the user is typing
//!
//! ## Usage
//!
//! ```rust,ignore
//! use canvas_engine::{DocumentEngine, EngineConfig};
//! use canvas_protocol::Element;
//!
//! let mut engine = DocumentEngine::new(EngineConfig::default());
//! let id = engine.next_id();
//! engine.add_element(Element::new(id.clone(), "p").with_content("Hi"), None, None);
//! engine.select(Some(id));
//!
//! for frame in engine.take_outgoing_frames() {
//!     port.post(frame)?;
//! }
//! ```

mod config;
mod engine;
mod errors;
mod history;
mod markup;
mod mutations;
mod pages;
mod selection;
mod store;
mod sync;
mod timer;
pub mod tree;

pub use config::{EngineConfig, DEFAULT_CONFIG_NAME, DEFAULT_ORIGIN};
pub use engine::DocumentEngine;
pub use errors::EngineError;
pub use history::{History, HistoryMode, Snapshot};
pub use markup::{MarkupExporter, MarkupImporter};
pub use mutations::{Mutation, MutationError, MutationResult};
pub use pages::{Page, PageId, PageRegistry, RegistrySnapshot, DEFAULT_PAGE_ID, DEFAULT_PAGE_NAME};
pub use selection::{Selection, SelectionState};
pub use store::{JsonFileStore, MemoryStore, PageStore};
pub use sync::{SyncAuthority, SyncState};
pub use timer::{Clock, DebounceTimer, ManualClock, SystemClock};

// Re-export protocol types for convenience
pub use canvas_protocol::{AuthorityMessage, Element, ElementId, Frame, StyleConfig, SurfaceMessage};

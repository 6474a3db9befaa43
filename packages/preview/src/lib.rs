//! # Canvas Preview
//!
//! The render surface: an isolated rendering of the current page that only
//! talks to the engine through frames.
//!
//! ```text
//! engine ──full-sync / content-update / select-element ...──▶ RenderSurface
//! engine ◀──ready / element-selected / element-content-changed── RenderSurface
//! ```
//!
//! The surface never owns the document. Clicks and hovers are reported and
//! only drawn once the authority echoes the new selection back; typed text
//! is applied locally and reported so the caret never jumps.

mod caret;
mod dom;
mod error;
mod html;
mod surface;

pub use caret::Caret;
pub use dom::{Outline, RenderedNode};
pub use error::PreviewError;
pub use html::EMPTY_PLACEHOLDER;
pub use surface::{RenderSurface, SurfaceView};

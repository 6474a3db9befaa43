//! # Canvas Protocol
//!
//! Shared vocabulary between the authority (the process that owns the
//! element tree) and the sandboxed render surface.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ engine: canonical tree, history, selection  │
//! └─────────────────────────────────────────────┘
//!        ↓ AuthorityMessage        ↑ SurfaceMessage
//! ┌─────────────────────────────────────────────┐
//! │ protocol: Frame { origin, payload }         │
//! │  - JSON envelope `{ type, data }`           │
//! │  - trusted-origin check on decode           │
//! │  - in-order async ports                     │
//! └─────────────────────────────────────────────┘
//!        ↓                         ↑
//! ┌─────────────────────────────────────────────┐
//! │ preview: rendered nodes, caret, outlines    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Nothing in this crate holds shared mutable state: the only way the two
//! parties interact is by posting frames to each other.

pub mod element;
mod error;
mod frame;
pub mod id;
pub mod messages;
pub mod port;

pub use element::{category, is_void_tag, Element, ElementCategory, ElementId};
pub use error::ProtocolError;
pub use frame::{decode, encode, Frame};
pub use id::IdGenerator;
pub use messages::{AuthorityMessage, StyleConfig, SurfaceMessage};
pub use port::{channel, PortReceiver, PortSender};

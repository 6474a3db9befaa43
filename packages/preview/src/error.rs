use canvas_protocol::{ElementId, ProtocolError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("No rendered node for element: {0}")]
    UnknownElement(ElementId),

    #[error("Element is not editable in place: {0}")]
    NotEditable(ElementId),

    #[error("Nothing is focused")]
    NoFocus,
}

//! # Frames
//!
//! A frame is what actually crosses the boundary between the two execution
//! contexts: the sender's origin plus a JSON payload. Receivers decode with
//! the origin they trust; anything else is dropped before it is parsed.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::ProtocolError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub origin: String,
    pub payload: String,
}

impl Frame {
    pub fn new(origin: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            payload: payload.into(),
        }
    }
}

/// Serialize a message into a frame stamped with the sender's origin
pub fn encode<M: Serialize>(origin: &str, message: &M) -> Result<Frame, ProtocolError> {
    let payload = serde_json::to_string(message).map_err(ProtocolError::Encode)?;
    Ok(Frame::new(origin, payload))
}

/// Decode a frame, rejecting it unless it comes from `trusted_origin`
pub fn decode<M: DeserializeOwned>(
    frame: &Frame,
    trusted_origin: &str,
) -> Result<M, ProtocolError> {
    if frame.origin != trusted_origin {
        return Err(ProtocolError::UntrustedOrigin(frame.origin.clone()));
    }

    serde_json::from_str(&frame.payload).map_err(ProtocolError::Malformed)
}

//! Error types for the wire protocol

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Frame from untrusted origin: {0}")]
    UntrustedOrigin(String),

    #[error("Malformed payload: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("Failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Port closed")]
    Closed,
}

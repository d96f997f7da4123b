//! Error types for the protocol layer.
//!
//! Each crate in Tradedesk defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in the shape of a document,
//! not in networking or in session bookkeeping.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, or a
    /// backend that answered with an HTML error page.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A document parsed but a field the client depends on is absent
    /// or empty, e.g. a login response without `access_token`.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// The document is invalid for some other reason.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

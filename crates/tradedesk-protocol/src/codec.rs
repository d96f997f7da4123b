//! Codec trait and the JSON implementation.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The transport layer doesn't care HOW bodies are serialized; it just
//! needs something that implements [`Codec`]. The API speaks JSON, so
//! [`JsonCodec`] is the one implementation.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds
///
/// - `Send + Sync` → one codec is shared by every request the client
///   makes, possibly from different Tokio worker threads.
/// - `'static` → it owns everything it needs.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// Decodes a response body without ever failing.
    ///
    /// Backends don't always answer with JSON (proxies return HTML, some
    /// errors are plain text), and the caller still wants *something* to
    /// show. The rules:
    ///
    /// - empty (or whitespace-only) body → `null`
    /// - valid JSON → the parsed value
    /// - anything else → the raw text as a JSON string
    fn decode_lenient(&self, data: &[u8]) -> Value {
        let text = String::from_utf8_lossy(data);
        if text.trim().is_empty() {
            return Value::Null;
        }
        match self.decode::<Value>(data) {
            Ok(value) => value,
            Err(_) => Value::String(text.into_owned()),
        }
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use tradedesk_protocol::{Codec, JsonCodec, TokenResponse};
///
/// let codec = JsonCodec;
/// let resp: TokenResponse = codec
///     .decode(br#"{"access_token":"abc","token_type":"bearer"}"#)
///     .unwrap();
/// assert_eq!(resp.into_token().unwrap(), "abc");
///
/// assert_eq!(codec.decode_lenient(b"Bad Gateway"), "Bad Gateway");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_lenient_empty_body_is_null() {
        assert_eq!(JsonCodec.decode_lenient(b""), Value::Null);
        assert_eq!(JsonCodec.decode_lenient(b"  \n"), Value::Null);
    }

    #[test]
    fn test_decode_lenient_json_body_is_parsed() {
        let value = JsonCodec.decode_lenient(br#"{"detail":"nope"}"#);
        assert_eq!(value, json!({ "detail": "nope" }));
    }

    #[test]
    fn test_decode_lenient_text_body_is_string() {
        let value = JsonCodec.decode_lenient(b"<html>502</html>");
        assert_eq!(value, json!("<html>502</html>"));
    }

    #[test]
    fn test_decode_type_mismatch_returns_decode_error() {
        let result: Result<Vec<u32>, _> = JsonCodec.decode(br#"{"a":1}"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}

//! Unified error type for Tradedesk.

use tradedesk_guard::GuardError;
use tradedesk_protocol::ProtocolError;
use tradedesk_session::{SessionError, StoreError};
use tradedesk_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `tradedesk` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TradedeskError {
    /// An HTTP-level error (unreachable host, non-2xx, bad URL).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A wire-format error (encode, decode, missing field).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (bad credentials, busy, not logged in).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The token store failed outside of a session operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A route guard lost its session.
    #[error(transparent)]
    Guard(#[from] GuardError),

    /// A configuration value is missing or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl TradedeskError {
    /// The HTTP status behind this error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            TradedeskError::Transport(TransportError::Api(api)) => Some(api.status),
            TradedeskError::Session(
                SessionError::AuthFailure { status, .. } | SessionError::Backend { status, .. },
            ) => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tradedesk_transport::ApiError;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::InvalidUrl("::".into());
        let tradedesk_err: TradedeskError = err.into();
        assert!(matches!(tradedesk_err, TradedeskError::Transport(_)));
        assert!(tradedesk_err.to_string().contains("::"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let tradedesk_err: TradedeskError = err.into();
        assert!(matches!(tradedesk_err, TradedeskError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error_keeps_message() {
        let err = SessionError::AuthFailure {
            status: 401,
            message: "Incorrect email or password".into(),
        };
        let tradedesk_err: TradedeskError = err.into();
        assert_eq!(tradedesk_err.to_string(), "Incorrect email or password");
        assert_eq!(tradedesk_err.status(), Some(401));
    }

    #[test]
    fn test_status_from_session_backend_error() {
        let err = SessionError::Backend {
            status: 503,
            message: "upstream down".into(),
        };
        let tradedesk_err: TradedeskError = err.into();
        assert_eq!(tradedesk_err.status(), Some(503));
    }

    #[test]
    fn test_from_store_error() {
        let err = StoreError::Corrupt("not json".into());
        let tradedesk_err: TradedeskError = err.into();
        assert!(matches!(tradedesk_err, TradedeskError::Store(_)));
        assert_eq!(tradedesk_err.status(), None);
    }

    #[test]
    fn test_status_from_api_error() {
        let api = ApiError::from_response(404, json!({ "detail": "Not found" }), "Request failed");
        let tradedesk_err: TradedeskError = TransportError::Api(api).into();
        assert_eq!(tradedesk_err.status(), Some(404));
    }
}

//! Error types for the session layer.

use tradedesk_protocol::ProtocolError;
use tradedesk_transport::TransportError;

/// Errors from reading or writing the persisted token.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The storage medium failed (permissions, disk full, ...).
    #[error("token storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The stored document exists but isn't what we wrote.
    #[error("token storage is corrupt: {0}")]
    Corrupt(String),
}

/// Errors that can occur during session management.
///
/// The first five variants are the categories a login form displays.
/// `restore()` never returns any of them: there, every failure just
/// means "nobody is logged in".
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Malformed or missing credentials, caught before any request.
    #[error("{0}")]
    Validation(String),

    /// The backend rejected the credentials or the token.
    /// `message` is the backend's own wording when it gave one.
    #[error("{message}")]
    AuthFailure { status: u16, message: String },

    /// The backend answered with an error that says nothing about the
    /// credentials or token (5xx, 404, validation errors, ...).
    #[error("{message}")]
    Backend { status: u16, message: String },

    /// No response from the backend at all.
    #[error("network failure: {0}")]
    Network(String),

    /// A 2xx response without the fields the client depends on,
    /// e.g. a login response with no `access_token`.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// The token couldn't be persisted or read.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// Another login is still in flight.
    #[error("a login is already in progress")]
    Busy,

    /// `logout()` ran while this operation was in flight; its result
    /// was discarded.
    #[error("cancelled by logout")]
    Cancelled,

    /// The operation needs a logged-in user.
    #[error("not authenticated")]
    NotAuthenticated,
}

impl SessionError {
    /// Builds the error for a login response that carried no token.
    pub fn no_token() -> Self {
        SessionError::ProtocolViolation("no token returned from login".into())
    }
}

impl From<TransportError> for SessionError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Api(api) if api.is_auth_rejection() => SessionError::AuthFailure {
                status: api.status,
                message: api.message,
            },
            TransportError::Api(api) => SessionError::Backend {
                status: api.status,
                message: api.message,
            },
            TransportError::Protocol(ProtocolError::MissingField("access_token")) => {
                SessionError::no_token()
            }
            TransportError::Protocol(e) => SessionError::ProtocolViolation(e.to_string()),
            e @ (TransportError::Network(_)
            | TransportError::InvalidUrl(_)
            | TransportError::Client(_)) => SessionError::Network(e.to_string()),
        }
    }
}

impl From<ProtocolError> for SessionError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::MissingField("access_token") => SessionError::no_token(),
            ProtocolError::InvalidMessage(msg) => SessionError::Validation(msg),
            other => SessionError::ProtocolViolation(other.to_string()),
        }
    }
}

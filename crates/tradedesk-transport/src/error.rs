use serde_json::Value;
use tradedesk_protocol::ProtocolError;

/// A non-2xx response from the backend.
///
/// Carries everything a screen needs to show the failure: a
/// human-readable message, the HTTP status, and the parsed body.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    /// The backend's `detail` field when it sent one, otherwise
    /// `"<label>: <status>"` (e.g. `Request failed: 500`).
    pub message: String,
    /// HTTP status code.
    pub status: u16,
    /// The response body, decoded leniently (JSON, text, or `null`).
    pub body: Value,
}

impl ApiError {
    /// Builds an error from a failed response.
    ///
    /// `label` is the fallback prefix used when the body has no
    /// `detail`: `"Request failed"` for ordinary calls, `"Login failed"`
    /// for the login endpoint.
    pub fn from_response(status: u16, body: Value, label: &str) -> Self {
        let message = match body.get("detail") {
            Some(Value::String(detail)) => detail.clone(),
            Some(Value::Null) | None => format!("{label}: {status}"),
            // FastAPI validation errors send a list here.
            Some(other) => other.to_string(),
        };
        Self {
            message,
            status,
            body,
        }
    }

    /// `true` for 401/403: the backend rejected who we are, not what we
    /// asked for.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self.status, 401 | 403)
    }
}

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request never produced a response (DNS, refused, timeout, TLS).
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A 2xx body didn't have the expected shape, or a request body
    /// couldn't be encoded.
    #[error("invalid payload: {0}")]
    Protocol(#[from] ProtocolError),

    /// The configured base URL isn't a valid absolute URL.
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),

    /// The underlying HTTP client couldn't be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

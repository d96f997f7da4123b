//! HTTP implementation of the request helper, using `reqwest`.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tradedesk_protocol::{Codec, JsonCodec};

use crate::{ApiError, Method, TransportError};

/// Timeout applied to every request unless the caller picks another one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const REQUEST_FAILED: &str = "Request failed";
const LOGIN_FAILED: &str = "Login failed";

/// A thin JSON client bound to one API root (e.g. `http://host/api`).
///
/// Cloning is cheap: `reqwest::Client` is an `Arc` around a connection
/// pool, so every clone shares the same pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    codec: JsonCodec,
}

impl ApiClient {
    /// Creates a client for the given API root with [`DEFAULT_TIMEOUT`].
    ///
    /// # Errors
    /// [`TransportError::InvalidUrl`] if `base_url` isn't an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a client with an explicit per-request timeout.
    ///
    /// # Errors
    /// [`TransportError::InvalidUrl`] for a bad root,
    /// [`TransportError::Client`] if reqwest can't build its client.
    pub fn with_timeout(
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        reqwest::Url::parse(base_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{base_url}: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            codec: JsonCodec,
        })
    }

    /// The API root this client prefixes every path with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `path` onto the API root, inserting a `/` if the path lacks one.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// The generic request helper.
    ///
    /// Sends `body` as JSON, attaches `Authorization: Bearer <token>` when
    /// a token is given, and returns the response body decoded leniently
    /// (see [`Codec::decode_lenient`]).
    ///
    /// # Errors
    /// - [`TransportError::Network`] if no response arrived
    /// - [`TransportError::Api`] for any non-2xx status, with the
    ///   backend's `detail` as message
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Value, TransportError> {
        self.execute(method, path, body, token, REQUEST_FAILED).await
    }

    /// Like [`request`](Self::request), then deserializes the body into `T`.
    ///
    /// # Errors
    /// Everything `request` returns, plus [`TransportError::Protocol`] if
    /// a 2xx body doesn't match `T`.
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<T, TransportError> {
        let value = self.request(method, path, body, token).await?;
        decode_value(value)
    }

    /// `POST`s credentials to the login endpoint.
    ///
    /// Never attaches a bearer token, and labels failures
    /// `Login failed: <status>` when the backend gives no `detail`.
    ///
    /// # Errors
    /// Same as [`request_as`](Self::request_as).
    pub async fn login<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T, TransportError> {
        let value = self
            .execute(Method::Post, path, Some(body), None, LOGIN_FAILED)
            .await?;
        decode_value(value)
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
        failure_label: &str,
    ) -> Result<Value, TransportError> {
        let url = self.url(path);

        let mut builder = self
            .http
            .request(method.to_reqwest(), &url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.body(self.codec.encode(body)?);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::debug!(%method, path, error = %e, "request did not complete");
            TransportError::Network(e)
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(TransportError::Network)?;
        let value = self.codec.decode_lenient(&bytes);

        tracing::debug!(%method, path, status = status.as_u16(), "request completed");

        if !status.is_success() {
            return Err(ApiError::from_response(status.as_u16(), value, failure_label).into());
        }
        Ok(value)
    }
}

fn decode_value<T: DeserializeOwned>(value: Value) -> Result<T, TransportError> {
    serde_json::from_value(value)
        .map_err(|e| TransportError::Protocol(tradedesk_protocol::ProtocolError::Decode(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_relative_base_url() {
        let result = ApiClient::new("/api");
        assert!(matches!(result, Err(TransportError::InvalidUrl(_))));
    }

    #[test]
    fn test_url_joins_with_single_slash() {
        let client = ApiClient::new("http://127.0.0.1:8000/api/").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8000/api");
        assert_eq!(client.url("/auth/me"), "http://127.0.0.1:8000/api/auth/me");
        assert_eq!(client.url("products"), "http://127.0.0.1:8000/api/products");
    }

    #[test]
    fn test_decode_value_shape_mismatch_is_protocol_error() {
        let result: Result<Vec<u8>, _> = decode_value(serde_json::json!({ "a": 1 }));
        assert!(matches!(result, Err(TransportError::Protocol(_))));
    }
}

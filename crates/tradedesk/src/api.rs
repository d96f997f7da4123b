//! Authenticated API calls for everything outside the session itself.
//!
//! Feature code (orders, stock, invoices, ...) never handles tokens. It
//! calls [`AuthorizedApi`], which reads the current token from the
//! session manager on every request.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tradedesk_session::{AuthBackend, SessionManager, TokenStore};
use tradedesk_transport::{ApiClient, Method, TransportError};

/// The generic request helper, fed by the session's token.
///
/// Cheap to clone: the client and the manager are both shared.
pub struct AuthorizedApi<B: AuthBackend, S: TokenStore> {
    client: ApiClient,
    session: Arc<SessionManager<B, S>>,
}

impl<B: AuthBackend, S: TokenStore> Clone for AuthorizedApi<B, S> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            session: Arc::clone(&self.session),
        }
    }
}

impl<B: AuthBackend, S: TokenStore> AuthorizedApi<B, S> {
    pub fn new(client: ApiClient, session: Arc<SessionManager<B, S>>) -> Self {
        Self { client, session }
    }

    /// Sends one request with whatever token the session holds right now.
    ///
    /// Anonymous sessions send no `Authorization` header; the backend
    /// decides whether the route needs one.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        let token = self.session.token();
        self.client
            .request(method, path, body, token.as_deref())
            .await
    }

    /// Like [`request`](Self::request), decoding the body into `T`.
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, TransportError> {
        let token = self.session.token();
        self.client
            .request_as(method, path, body, token.as_deref())
            .await
    }

    pub async fn get(&self, path: &str) -> Result<Value, TransportError> {
        self.request(Method::Get, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        self.request(Method::Post, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        self.request(Method::Put, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        self.request(Method::Patch, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, TransportError> {
        self.request(Method::Delete, path, None).await
    }
}

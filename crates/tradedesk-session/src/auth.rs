//! The backend the session authenticates against.
//!
//! The session manager doesn't speak HTTP itself. It calls an
//! [`AuthBackend`]: "exchange these credentials for a token", "who does
//! this token belong to". [`RestBackend`] is the real implementation on
//! top of [`ApiClient`]; tests plug in a scripted fake.

use std::sync::Arc;

use tradedesk_protocol::{ChangePasswordRequest, Credentials, ProtocolError, TokenResponse, User};
use tradedesk_transport::{ApiClient, Method};

use crate::{SessionConfig, SessionError};

/// Exchanges credentials for tokens and tokens for identities.
///
/// # Trait bounds
///
/// - `Send + Sync` → one backend is shared by the manager across tasks.
/// - `'static` → it lives as long as the application.
///
/// # Example
///
/// ```rust
/// use tradedesk_protocol::{Credentials, Role, User, UserId};
/// use tradedesk_session::{AuthBackend, SessionError};
///
/// /// Accepts one hard-coded account. Only for demos!
/// struct DemoBackend;
///
/// impl AuthBackend for DemoBackend {
///     async fn login(&self, credentials: &Credentials) -> Result<String, SessionError> {
///         if credentials.email() == "demo@example.com" {
///             Ok("demo-token".into())
///         } else {
///             Err(SessionError::AuthFailure {
///                 status: 401,
///                 message: "Incorrect email or password".into(),
///             })
///         }
///     }
///
///     async fn identity(&self, token: &str) -> Result<User, SessionError> {
///         if token != "demo-token" {
///             return Err(SessionError::AuthFailure { status: 401, message: "bad token".into() });
///         }
///         Ok(User {
///             id: UserId(1),
///             name: "Demo".into(),
///             email: "demo@example.com".into(),
///             role: Role::Staff,
///             active: true,
///             phone: None,
///             address: None,
///             profile_pic: None,
///             extra: Default::default(),
///         })
///     }
///
///     async fn change_password(&self, _: &str, _: &str, _: &str) -> Result<(), SessionError> {
///         Ok(())
///     }
/// }
/// ```
pub trait AuthBackend: Send + Sync + 'static {
    /// Submits credentials and returns the bearer token.
    ///
    /// # Returns
    /// - `Ok(token)`: a non-empty token
    /// - `Err(SessionError::AuthFailure)`: credentials rejected
    /// - `Err(SessionError::ProtocolViolation)`: 2xx without a token
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl std::future::Future<Output = Result<String, SessionError>> + Send;

    /// Resolves a token to the user it belongs to.
    ///
    /// # Returns
    /// - `Ok(User)`: the token is valid
    /// - `Err(SessionError::AuthFailure)`: invalid or expired token
    fn identity(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<User, SessionError>> + Send;

    /// Changes the password of the user `token` belongs to.
    fn change_password(
        &self,
        token: &str,
        old_password: &str,
        new_password: &str,
    ) -> impl std::future::Future<Output = Result<(), SessionError>> + Send;
}

impl<T: AuthBackend> AuthBackend for Arc<T> {
    async fn login(&self, credentials: &Credentials) -> Result<String, SessionError> {
        (**self).login(credentials).await
    }

    async fn identity(&self, token: &str) -> Result<User, SessionError> {
        (**self).identity(token).await
    }

    async fn change_password(
        &self,
        token: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), SessionError> {
        (**self).change_password(token, old_password, new_password).await
    }
}

// ---------------------------------------------------------------------------
// RestBackend
// ---------------------------------------------------------------------------

/// [`AuthBackend`] over the REST API.
///
/// - login: `POST {login_path}` with `{email, password}`
/// - identity: `GET {identity_path}` with `Authorization: Bearer <token>`
///
/// A 401 or 403 is an [`SessionError::AuthFailure`]; any other non-2xx is
/// a [`SessionError::Backend`]. Both carry the backend's `detail` message.
#[derive(Debug, Clone)]
pub struct RestBackend {
    client: ApiClient,
    config: SessionConfig,
}

impl RestBackend {
    pub fn new(client: ApiClient, config: SessionConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

impl AuthBackend for RestBackend {
    async fn login(&self, credentials: &Credentials) -> Result<String, SessionError> {
        let body = serde_json::to_value(credentials.as_request()).map_err(ProtocolError::Encode)?;
        let response: TokenResponse = self.client.login(&self.config.login_path, &body).await?;
        Ok(response.into_token()?)
    }

    async fn identity(&self, token: &str) -> Result<User, SessionError> {
        let user: Option<User> = self
            .client
            .request_as(Method::Get, &self.config.identity_path, None, Some(token))
            .await?;
        user.ok_or_else(|| {
            SessionError::ProtocolViolation("identity endpoint returned no user".into())
        })
    }

    async fn change_password(
        &self,
        token: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), SessionError> {
        let request = ChangePasswordRequest {
            old_password,
            new_password,
        };
        let body = serde_json::to_value(&request).map_err(ProtocolError::Encode)?;
        self.client
            .request(
                Method::Post,
                &self.config.change_password_path,
                Some(&body),
                Some(token),
            )
            .await?;
        Ok(())
    }
}

//! `Tradedesk` builder and application context.
//!
//! This is the entry point for an application using Tradedesk. It ties
//! together all the layers: config → transport → session → guard.

use std::sync::Arc;

use tokio::sync::watch;
use tradedesk_guard::{GuardDecision, RouteGuard};
use tradedesk_session::{
    FileTokenStore, RestBackend, Session, SessionConfig, SessionManager, SessionState, TokenStore,
};
use tradedesk_transport::ApiClient;

use crate::{AuthorizedApi, ClientConfig, TradedeskError};

/// The session manager every Tradedesk application runs: REST backend,
/// pluggable token store.
pub type RestSessionManager<S> = SessionManager<RestBackend, S>;

/// Builder for configuring a Tradedesk application context.
///
/// # Example
///
/// ```rust,no_run
/// use tradedesk::prelude::*;
///
/// # async fn run() -> Result<(), TradedeskError> {
/// let app = Tradedesk::builder()
///     .config(ClientConfig::from_env()?)
///     .build()?;
/// app.start().await;
/// # Ok(())
/// # }
/// ```
pub struct TradedeskBuilder {
    config: ClientConfig,
    session_config: SessionConfig,
}

impl TradedeskBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            session_config: SessionConfig::default(),
        }
    }

    /// Sets where the backend lives and where the token is kept.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the session routes.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Builds the context with a [`FileTokenStore`] at `config.token_path`.
    pub fn build(self) -> Result<Tradedesk<FileTokenStore>, TradedeskError> {
        let store = FileTokenStore::new(self.config.token_path.clone());
        self.build_with_store(store)
    }

    /// Builds the context with a caller-supplied token store.
    ///
    /// # Errors
    /// [`TradedeskError::Transport`] if the API URL is malformed or the
    /// HTTP client can't be created.
    pub fn build_with_store<S: TokenStore>(
        self,
        store: S,
    ) -> Result<Tradedesk<S>, TradedeskError> {
        let client = ApiClient::with_timeout(&self.config.api_url(), self.config.timeout())?;
        let backend = RestBackend::new(client.clone(), self.session_config);
        let session = Arc::new(SessionManager::new(backend, store));
        let api = AuthorizedApi::new(client, Arc::clone(&session));

        tracing::debug!(api_url = %self.config.api_url(), "tradedesk context built");
        Ok(Tradedesk {
            config: self.config,
            session,
            api,
        })
    }
}

impl Default for TradedeskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-scoped context: one session manager and the API helper
/// bound to it.
///
/// Create one at startup and pass it (or clones of its parts) to whatever
/// needs it. There is no global instance.
pub struct Tradedesk<S: TokenStore = FileTokenStore> {
    config: ClientConfig,
    session: Arc<RestSessionManager<S>>,
    api: AuthorizedApi<RestBackend, S>,
}

impl Tradedesk<FileTokenStore> {
    /// Creates a new builder.
    pub fn builder() -> TradedeskBuilder {
        TradedeskBuilder::new()
    }

    /// Builds a context entirely from environment variables.
    pub fn from_env() -> Result<Self, TradedeskError> {
        TradedeskBuilder::new().config(ClientConfig::from_env()?).build()
    }
}

impl<S: TokenStore> Tradedesk<S> {
    /// Restores the persisted session. Call once before rendering anything
    /// guarded.
    pub async fn start(&self) -> SessionState {
        let state = self.session.restore().await;
        tracing::info!(%state, "session ready");
        state
    }

    pub fn session(&self) -> &Arc<RestSessionManager<S>> {
        &self.session
    }

    pub fn api(&self) -> &AuthorizedApi<RestBackend, S> {
        &self.api
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    /// Asks `guard` about the current snapshot.
    pub fn check(&self, guard: &RouteGuard) -> GuardDecision {
        guard.check(&self.session.snapshot())
    }

    /// Waits for the session to settle, then asks `guard`.
    pub async fn settle(&self, guard: &RouteGuard) -> Result<GuardDecision, TradedeskError> {
        let mut rx = self.session.subscribe();
        Ok(guard.settle(&mut rx).await?)
    }
}

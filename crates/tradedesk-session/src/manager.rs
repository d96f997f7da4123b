//! The session manager: single source of truth for who is logged in.
//!
//! It is responsible for:
//! - Restoring a persisted session at process start
//! - Logging in (credentials → token → user) and persisting the token
//! - Logging out (dropping the token everywhere)
//! - Publishing every state change to any number of readers
//!
//! # Concurrency note
//!
//! There is exactly one writer, the manager, and many readers. State lives
//! in a `tokio::sync::watch` channel: readers take snapshots or subscribe
//! for changes, and never block the writer.
//!
//! Async operations are serialized by `op_lock`. `login` refuses to queue
//! behind another operation and fails fast with [`SessionError::Busy`];
//! `restore` and `refresh` wait their turn. `logout` is synchronous and
//! takes effect immediately, so it bumps a generation counter instead:
//! any async operation that started before the logout discards its result
//! when it finishes.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, watch};
use tradedesk_protocol::{Credentials, User};

use crate::{AuthBackend, Session, SessionError, SessionState, TokenStore};

/// Owns the authentication token and the current user.
///
/// Create one per application at startup and share it (usually behind an
/// `Arc`) with everything that needs to know who is logged in.
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ restore() ──→ [Authenticated] ──logout()──→ [Anonymous]
///               │               ↑                           │
///               └──→ [Anonymous]┴─────────login()───────────┘
/// ```
pub struct SessionManager<B: AuthBackend, S: TokenStore> {
    backend: B,
    store: S,

    /// The current snapshot. `watch::Sender` is the single write handle.
    state: watch::Sender<Session>,

    /// Serializes restore/login/refresh/change_password.
    op_lock: Mutex<()>,

    /// Bumped by every `logout()`.
    generation: AtomicU64,
}

impl<B: AuthBackend, S: TokenStore> SessionManager<B, S> {
    /// Creates a manager in the `Uninitialized` state.
    ///
    /// Nothing is read from `store` until [`restore`](Self::restore).
    pub fn new(backend: B, store: S) -> Self {
        let (state, _) = watch::channel(Session::uninitialized());
        Self {
            backend,
            store,
            state,
            op_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    // =====================================================================
    // Readers
    // =====================================================================

    /// A copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// A receiver that observes every future state change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// The bearer token other API calls should attach, if any.
    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().current_user.clone()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().state
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // =====================================================================
    // restore()
    // =====================================================================

    /// Restores the persisted session. Call once at process start.
    ///
    /// - No persisted token → `Anonymous` without touching the network.
    /// - Token present → `Restoring`, then one identity request:
    ///   success → `Authenticated`; any failure → the persisted token is
    ///   deleted and the session settles `Anonymous`.
    ///
    /// Failures are never returned: a stale session just means the user
    /// sees the login page. Once the manager has left `Uninitialized`,
    /// further calls do nothing and return the current state.
    pub async fn restore(&self) -> SessionState {
        let _op = self.op_lock.lock().await;

        if self.state() != SessionState::Uninitialized {
            tracing::debug!(state = %self.state(), "restore skipped, session already settled");
            return self.state();
        }
        let generation = self.generation.load(Ordering::SeqCst);

        let persisted = match self.store.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "persisted token unreadable, discarding");
                self.discard_persisted();
                None
            }
        };

        let Some(token) = persisted else {
            tracing::info!("no persisted session");
            self.publish(Session::anonymous(None));
            return SessionState::Anonymous;
        };

        self.publish(Session::restoring(token.clone()));

        let outcome = self.backend.identity(&token).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!("restore superseded by logout");
            return self.state();
        }

        match outcome {
            Ok(user) => {
                tracing::info!(user_id = %user.id, role = %user.role, "session restored");
                self.publish(Session::authenticated(token, user));
                SessionState::Authenticated
            }
            Err(e) => {
                tracing::debug!(error = %e, "persisted token rejected, clearing session");
                self.discard_persisted();
                self.publish(Session::anonymous(None));
                SessionState::Anonymous
            }
        }
    }

    // =====================================================================
    // login()
    // =====================================================================

    /// Logs in with an email and password and returns the resolved user.
    ///
    /// Allowed from any settled state, including `Authenticated`: a
    /// successful login replaces the previous session.
    ///
    /// # Errors
    /// - [`SessionError::Busy`]: another operation is in flight; the
    ///   session is left untouched
    /// - [`SessionError::Validation`]: empty email or password
    /// - [`SessionError::AuthFailure`]: wrong credentials, or the fresh
    ///   token was rejected by the identity endpoint
    /// - [`SessionError::Backend`]: the backend failed for another reason
    /// - [`SessionError::Network`] / [`SessionError::ProtocolViolation`]
    /// - [`SessionError::Storage`]: the token couldn't be persisted
    /// - [`SessionError::Cancelled`]: `logout()` ran meanwhile
    ///
    /// On every error except `Busy` the session ends fully cleared:
    /// no token in memory, none in storage, no user.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let Ok(_op) = self.op_lock.try_lock() else {
            tracing::debug!("login rejected, another session operation is in flight");
            return Err(SessionError::Busy);
        };
        let generation = self.generation.load(Ordering::SeqCst);
        self.state.send_modify(|session| session.last_error = None);

        let outcome = self.authenticate(email, password).await;
        let superseded = self.generation.load(Ordering::SeqCst) != generation;

        match outcome {
            Ok((token, user)) if !superseded => {
                tracing::info!(user_id = %user.id, role = %user.role, "logged in");
                self.publish(Session::authenticated(token, user.clone()));
                Ok(user)
            }
            Ok(_) => {
                tracing::info!("login completed after logout, discarding");
                self.discard_persisted();
                Err(SessionError::Cancelled)
            }
            Err(e) => {
                tracing::info!(error = %e, "login failed");
                self.discard_persisted();
                self.publish(Session::anonymous(Some(e.to_string())));
                Err(e)
            }
        }
    }

    /// Credentials → persisted token → user. Touches storage but not
    /// the published state.
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(String, User), SessionError> {
        let credentials = Credentials::new(email, password)?;
        let token = self.backend.login(&credentials).await?;
        self.store.save(&token)?;
        let user = self.backend.identity(&token).await?;
        Ok((token, user))
    }

    // =====================================================================
    // logout()
    // =====================================================================

    /// Drops the session. Synchronous, never fails, no network.
    ///
    /// Storage errors while deleting the persisted token are logged and
    /// swallowed. Calling it twice is the same as calling it once.
    pub fn logout(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.discard_persisted();
        if self.state() != SessionState::Anonymous {
            tracing::info!("logged out");
        }
        self.publish(Session::anonymous(None));
    }

    // =====================================================================
    // refresh() / change_password()
    // =====================================================================

    /// Re-reads the current user from the identity endpoint.
    ///
    /// Used after profile edits. If the backend now rejects the token the
    /// session is cleared (the same quiet logout `restore` does) and the
    /// `AuthFailure` is returned; network trouble or a backend outage
    /// leaves the session as it was.
    ///
    /// # Errors
    /// [`SessionError::NotAuthenticated`] when nobody is logged in, plus
    /// whatever the backend returns.
    pub async fn refresh(&self) -> Result<User, SessionError> {
        let _op = self.op_lock.lock().await;
        let token = self.authenticated_token()?;
        let generation = self.generation.load(Ordering::SeqCst);

        let outcome = self.backend.identity(&token).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            return Err(SessionError::Cancelled);
        }

        match outcome {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, "current user refreshed");
                let fresh = user.clone();
                self.state
                    .send_modify(|session| session.current_user = Some(fresh));
                Ok(user)
            }
            Err(e @ SessionError::AuthFailure { .. }) => {
                tracing::info!(error = %e, "token no longer accepted, clearing session");
                self.discard_persisted();
                self.publish(Session::anonymous(None));
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Changes the logged-in user's password. The session is unchanged
    /// either way.
    ///
    /// # Errors
    /// [`SessionError::NotAuthenticated`], [`SessionError::Validation`] for
    /// an empty new password, or the backend's rejection.
    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), SessionError> {
        let _op = self.op_lock.lock().await;
        let token = self.authenticated_token()?;
        if new_password.is_empty() {
            return Err(SessionError::Validation("new password is required".into()));
        }

        self.backend
            .change_password(&token, old_password, new_password)
            .await?;
        tracing::info!("password changed");
        Ok(())
    }

    // =====================================================================
    // Internals
    // =====================================================================

    fn authenticated_token(&self) -> Result<String, SessionError> {
        let session = self.state.borrow();
        match (&session.state, &session.token) {
            (SessionState::Authenticated, Some(token)) => Ok(token.clone()),
            _ => Err(SessionError::NotAuthenticated),
        }
    }

    fn publish(&self, session: Session) {
        self.state.send_replace(session);
    }

    fn discard_persisted(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to delete persisted token");
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

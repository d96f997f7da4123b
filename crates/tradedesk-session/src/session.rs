//! Session types: what the client knows about who is logged in.
//!
//! A [`Session`] is a snapshot. The [`SessionManager`](crate::SessionManager)
//! publishes a new one on every state change; views read snapshots and
//! never mutate them.

use std::fmt;

use tradedesk_protocol::User;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Backend routes the session talks to, relative to the API root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// `POST` target for credentials. Default: `/auth/login`.
    pub login_path: String,

    /// `GET` target returning the current user. Default: `/auth/me`.
    pub identity_path: String,

    /// `POST` target for password changes. Default: `/auth/change-password`.
    pub change_password_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            login_path: "/auth/login".to_string(),
            identity_path: "/auth/me".to_string(),
            change_password_path: "/auth/change-password".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Where the session is in its lifecycle.
///
/// ```text
///                   ┌──(valid token)──→ Authenticated ←──(login)──┐
/// Uninitialized ──→ Restoring                │                    │
///       │           └──(invalid token)─→ Anonymous ──────────────┘
///       └──(no token)──────────────────────↗     ↖──(logout / failed login)
/// ```
///
/// There is no terminal state: after restore the session cycles between
/// `Authenticated` and `Anonymous` for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Process just started; `restore()` hasn't run.
    Uninitialized,

    /// A persisted token was found and is being validated.
    Restoring,

    /// Token validated; `current_user` is populated.
    Authenticated,

    /// Nobody is logged in.
    Anonymous,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Restoring => "restoring",
            SessionState::Authenticated => "authenticated",
            SessionState::Anonymous => "anonymous",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One snapshot of the authentication state.
///
/// Invariants upheld by the manager:
/// - `current_user` is `Some` only in `Authenticated`, and then `token`
///   is `Some` too and was validated against the identity endpoint.
/// - In `Restoring`, `token` holds the provisionally accepted persisted
///   token and `current_user` is `None`.
/// - In `Anonymous` and `Uninitialized`, both are `None`.
#[derive(Clone, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub current_user: Option<User>,
    pub state: SessionState,

    /// Message of the most recent failed login, for the login form.
    /// Cleared when the next login starts.
    pub last_error: Option<String>,
}

impl Session {
    pub(crate) fn uninitialized() -> Self {
        Self {
            token: None,
            current_user: None,
            state: SessionState::Uninitialized,
            last_error: None,
        }
    }

    pub(crate) fn restoring(token: String) -> Self {
        Self {
            token: Some(token),
            current_user: None,
            state: SessionState::Restoring,
            last_error: None,
        }
    }

    pub(crate) fn authenticated(token: String, user: User) -> Self {
        Self {
            token: Some(token),
            current_user: Some(user),
            state: SessionState::Authenticated,
            last_error: None,
        }
    }

    pub(crate) fn anonymous(last_error: Option<String>) -> Self {
        Self {
            token: None,
            current_user: None,
            state: SessionState::Anonymous,
            last_error,
        }
    }

    /// `true` until the initial restore pass has settled.
    ///
    /// Route guards must not render protected content while this holds.
    pub fn is_loading(&self) -> bool {
        matches!(
            self.state,
            SessionState::Uninitialized | SessionState::Restoring
        )
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }
}

/// Hand-written so the token never ends up in a log line.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("current_user", &self.current_user)
            .field("state", &self.state)
            .field("last_error", &self.last_error)
            .finish()
    }
}

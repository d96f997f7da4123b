//! The route guard: may this route render for this session?

use tokio::sync::watch;
use tradedesk_protocol::{Role, User};
use tradedesk_session::Session;

use crate::{GuardError, landing_path};

/// The login page every guard sends anonymous visitors to by default.
pub const DEFAULT_REDIRECT: &str = "/login";

/// What a protected route should do for the current session.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    /// The initial restore hasn't settled. Render a placeholder, never
    /// the protected content.
    Loading,

    /// Navigate to `to`, replacing the current history entry.
    Redirect { to: String },

    /// Deactivated account: show the inactive notice instead of the page.
    Inactive(User),

    /// The role isn't admitted and has no other page to go to: its own
    /// dashboard is this route, or the role is unrecognised. Show an
    /// access-denied page.
    Forbidden(User),

    /// Render the route for this user.
    Allow(User),
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow(_))
    }
}

/// Per-route access policy.
///
/// ```rust
/// use tradedesk_guard::RouteGuard;
/// use tradedesk_protocol::Role;
///
/// // The accounts pages: accountants and admins only.
/// let guard = RouteGuard::new().allow_roles([Role::Accountant, Role::Admin]);
/// ```
///
/// Decisions are pure functions of a [`Session`] snapshot, so one guard
/// can be shared by any number of views.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    redirect_to: String,

    /// The path this guard protects, when known.
    route: Option<String>,

    /// `None` admits every authenticated role.
    allowed: Option<Vec<Role>>,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteGuard {
    /// A guard that admits any logged-in user and sends everyone else to
    /// [`DEFAULT_REDIRECT`].
    pub fn new() -> Self {
        Self {
            redirect_to: DEFAULT_REDIRECT.to_string(),
            route: None,
            allowed: None,
        }
    }

    /// Sets where unauthenticated visitors are sent.
    pub fn redirect_to(mut self, path: impl Into<String>) -> Self {
        self.redirect_to = path.into();
        self
    }

    /// Records the path this guard protects, so a role gate never
    /// redirects a user to the page they are being turned away from.
    pub fn at(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    /// Restricts the route to `roles`. Logged-in users with any other role
    /// are sent to their own dashboard.
    pub fn allow_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.allowed = Some(roles.into_iter().collect());
        self
    }

    pub fn redirect_target(&self) -> &str {
        &self.redirect_to
    }

    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    /// Decides for one snapshot.
    ///
    /// Checked in order:
    /// 1. still loading → [`GuardDecision::Loading`]
    /// 2. nobody logged in → redirect to the login page
    /// 3. account inactive → [`GuardDecision::Inactive`]
    /// 4. role not admitted → redirect to the user's own dashboard, or
    ///    [`GuardDecision::Forbidden`] when that dashboard is this route or
    ///    the role is [`Role::Unknown`]
    /// 5. otherwise → [`GuardDecision::Allow`]
    pub fn check(&self, session: &Session) -> GuardDecision {
        if session.is_loading() {
            return GuardDecision::Loading;
        }

        let user = match (&session.current_user, session.is_authenticated()) {
            (Some(user), true) => user,
            _ => {
                return GuardDecision::Redirect {
                    to: self.redirect_to.clone(),
                };
            }
        };

        if !user.is_active() {
            return GuardDecision::Inactive(user.clone());
        }

        if let Some(allowed) = &self.allowed {
            if !allowed.contains(&user.role) {
                let landing = landing_path(user.role);
                if user.role == Role::Unknown || self.route.as_deref() == Some(landing) {
                    return GuardDecision::Forbidden(user.clone());
                }
                return GuardDecision::Redirect {
                    to: landing.to_string(),
                };
            }
        }

        GuardDecision::Allow(user.clone())
    }

    /// Waits until the session has settled, then decides.
    ///
    /// Use this from async code instead of polling [`check`](Self::check):
    /// it never returns [`GuardDecision::Loading`].
    ///
    /// # Errors
    /// [`GuardError::SessionClosed`] if the manager is dropped while the
    /// session is still loading.
    pub async fn settle(
        &self,
        session: &mut watch::Receiver<Session>,
    ) -> Result<GuardDecision, GuardError> {
        let settled = session
            .wait_for(|s| !s.is_loading())
            .await
            .map_err(|_| GuardError::SessionClosed)?
            .clone();

        let decision = self.check(&settled);
        tracing::debug!(state = %settled.state, ?decision, "route guard settled");
        Ok(decision)
    }
}

// =========================================================================
// Tests
// =========================================================================

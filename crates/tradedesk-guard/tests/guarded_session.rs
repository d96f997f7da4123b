//! Integration tests: a route guard watching a live session manager.
//!
//! The backend is a small in-memory fake whose identity call can be held
//! open, so the tests can observe the guard while restore is in flight.

use std::sync::Arc;

use tokio::sync::Notify;
use tradedesk_guard::{GuardDecision, Landing, RouteGuard, landing_for};
use tradedesk_protocol::{Credentials, Role, User, UserId};
use tradedesk_session::{AuthBackend, MemoryTokenStore, SessionError, SessionManager};

// =========================================================================
// Fake backend: one account, optional gate on identity.
// =========================================================================

struct OneAccount {
    user: User,
    identity_gate: Option<Arc<Notify>>,
}

impl OneAccount {
    fn new(role: Role, active: bool) -> Self {
        Self {
            user: User {
                id: UserId(42),
                name: "Kiran".into(),
                email: "kiran@example.com".into(),
                role,
                active,
                phone: None,
                address: None,
                profile_pic: None,
                extra: Default::default(),
            },
            identity_gate: None,
        }
    }

    fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.identity_gate = Some(gate);
        self
    }
}

impl AuthBackend for OneAccount {
    async fn login(&self, credentials: &Credentials) -> Result<String, SessionError> {
        if credentials.email() == self.user.email {
            Ok("tok-42".into())
        } else {
            Err(SessionError::AuthFailure {
                status: 401,
                message: "Incorrect email or password".into(),
            })
        }
    }

    async fn identity(&self, token: &str) -> Result<User, SessionError> {
        if let Some(gate) = &self.identity_gate {
            gate.notified().await;
        }
        if token == "tok-42" {
            Ok(self.user.clone())
        } else {
            Err(SessionError::AuthFailure {
                status: 401,
                message: "Could not validate credentials".into(),
            })
        }
    }

    async fn change_password(&self, _: &str, _: &str, _: &str) -> Result<(), SessionError> {
        Ok(())
    }
}

type Manager = SessionManager<OneAccount, MemoryTokenStore>;

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_guard_never_allows_while_restore_in_flight() {
    let gate = Arc::new(Notify::new());
    let manager: Arc<Manager> = Arc::new(SessionManager::new(
        OneAccount::new(Role::Staff, true).gated(gate.clone()),
        MemoryTokenStore::with_token("tok-42"),
    ));
    let guard = RouteGuard::new();
    let mut rx = manager.subscribe();

    let restoring = tokio::spawn({
        let manager = manager.clone();
        async move { manager.restore().await }
    });

    // Wait until restore has published `Restoring`, then look.
    rx.wait_for(|s| s.token.is_some()).await.unwrap();
    assert_eq!(guard.check(&manager.snapshot()), GuardDecision::Loading);

    gate.notify_one();
    let decision = guard.settle(&mut rx).await.unwrap();
    restoring.await.unwrap();

    assert!(decision.is_allowed());
}

#[tokio::test]
async fn test_guard_redirects_after_restore_rejects_token() {
    let manager: Manager = SessionManager::new(
        OneAccount::new(Role::Staff, true),
        MemoryTokenStore::with_token("stale"),
    );
    let mut rx = manager.subscribe();

    manager.restore().await;
    let decision = RouteGuard::new().settle(&mut rx).await.unwrap();

    assert_eq!(
        decision,
        GuardDecision::Redirect {
            to: "/login".into()
        }
    );
}

#[tokio::test]
async fn test_guard_follows_login_and_logout() {
    let manager: Manager = SessionManager::new(
        OneAccount::new(Role::Accountant, true),
        MemoryTokenStore::new(),
    );
    let guard = RouteGuard::new().allow_roles([Role::Accountant]);
    manager.restore().await;

    assert!(!guard.check(&manager.snapshot()).is_allowed());

    let user = manager
        .login("kiran@example.com", "secret")
        .await
        .expect("login should succeed");
    assert_eq!(landing_for(&user), Landing::Dashboard("/accountant/dashboard"));
    assert!(guard.check(&manager.snapshot()).is_allowed());

    manager.logout();
    assert_eq!(
        guard.check(&manager.snapshot()),
        GuardDecision::Redirect {
            to: "/login".into()
        }
    );
}

#[tokio::test]
async fn test_guard_inactive_account_after_login() {
    let manager: Manager = SessionManager::new(
        OneAccount::new(Role::Vendor, false),
        MemoryTokenStore::new(),
    );
    manager.restore().await;

    let user = manager.login("kiran@example.com", "secret").await.unwrap();

    assert_eq!(landing_for(&user), Landing::InactiveNotice);
    assert!(matches!(
        RouteGuard::new().check(&manager.snapshot()),
        GuardDecision::Inactive(_)
    ));
}

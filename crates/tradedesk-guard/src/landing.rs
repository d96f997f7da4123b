//! Where each role lands after logging in.

use std::fmt;

use tradedesk_protocol::{Role, User};

/// The dashboard route for `role`.
///
/// `master_admin` owns the bare `/dashboard`; every other role has a
/// dashboard under its own prefix. Roles this client doesn't know fall
/// back to `/dashboard` and let the backend decide what they may see.
pub fn landing_path(role: Role) -> &'static str {
    match role {
        Role::MasterAdmin => "/dashboard",
        Role::Admin => "/admin/dashboard",
        Role::Accountant => "/accountant/dashboard",
        Role::Vendor => "/vendor/dashboard",
        Role::Staff => "/staff/dashboard",
        Role::Driver => "/driver/dashboard",
        Role::Security => "/security/dashboard",
        Role::Unknown => "/dashboard",
    }
}

/// The post-login destination of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    /// Navigate to this dashboard.
    Dashboard(&'static str),

    /// The account is deactivated: show the notice, navigate nowhere.
    InactiveNotice,
}

impl fmt::Display for Landing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Landing::Dashboard(path) => f.write_str(path),
            Landing::InactiveNotice => f.write_str("account inactive"),
        }
    }
}

/// Decides where `user` goes right after logging in.
pub fn landing_for(user: &User) -> Landing {
    if user.is_active() {
        Landing::Dashboard(landing_path(user.role))
    } else {
        Landing::InactiveNotice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradedesk_protocol::UserId;

    fn user(role: Role, active: bool) -> User {
        User {
            id: UserId(3),
            name: "Ravi".into(),
            email: "ravi@example.com".into(),
            role,
            active,
            phone: None,
            address: None,
            profile_pic: None,
            extra: Default::default(),
        }
    }

    #[test]
    fn test_landing_path_every_role_has_a_dashboard() {
        for role in Role::ALL {
            assert!(landing_path(role).ends_with("/dashboard"), "{role}");
        }
    }

    #[test]
    fn test_landing_path_prefixes_match_role() {
        assert_eq!(landing_path(Role::MasterAdmin), "/dashboard");
        assert_eq!(landing_path(Role::Admin), "/admin/dashboard");
        assert_eq!(landing_path(Role::Accountant), "/accountant/dashboard");
        assert_eq!(landing_path(Role::Vendor), "/vendor/dashboard");
        assert_eq!(landing_path(Role::Staff), "/staff/dashboard");
        assert_eq!(landing_path(Role::Driver), "/driver/dashboard");
        assert_eq!(landing_path(Role::Security), "/security/dashboard");
    }

    #[test]
    fn test_landing_path_unknown_role_falls_back() {
        assert_eq!(landing_path(Role::Unknown), "/dashboard");
    }

    #[test]
    fn test_landing_for_active_user_goes_to_dashboard() {
        assert_eq!(
            landing_for(&user(Role::Driver, true)),
            Landing::Dashboard("/driver/dashboard")
        );
    }

    #[test]
    fn test_landing_for_inactive_user_gets_notice() {
        assert_eq!(
            landing_for(&user(Role::Admin, false)),
            Landing::InactiveNotice
        );
    }
}

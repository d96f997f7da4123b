//! Core wire types for the Tradedesk REST API.
//!
//! Every type here is a JSON document that crosses the HTTP boundary:
//! the login request and its token response, the user record returned by
//! the identity endpoint, and the password-change request.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A backend user's numeric primary key.
///
/// Newtype over `u64` so a user id can't be confused with any other
/// integer. `#[serde(transparent)]` keeps it a bare number in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// The role a user holds. It decides which dashboards are reachable.
///
/// Roles are owned by the backend; the client only reads them. Any role
/// string this client doesn't know deserializes to [`Role::Unknown`]
/// instead of failing the whole identity response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    MasterAdmin,
    Admin,
    Accountant,
    Vendor,
    Staff,
    Driver,
    Security,
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Every role the backend currently issues, in privilege order.
    pub const ALL: [Role; 7] = [
        Role::MasterAdmin,
        Role::Admin,
        Role::Accountant,
        Role::Vendor,
        Role::Staff,
        Role::Driver,
        Role::Security,
    ];

    /// The wire spelling of this role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::MasterAdmin => "master_admin",
            Role::Admin => "admin",
            Role::Accountant => "accountant",
            Role::Vendor => "vendor",
            Role::Staff => "staff",
            Role::Driver => "driver",
            Role::Security => "security",
            Role::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| ProtocolError::InvalidMessage(format!("unknown role `{s}`")))
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

fn default_active() -> bool {
    true
}

/// The user record returned by the identity endpoint (`GET /auth/me`).
///
/// The session holds a cached copy of this. Fields the client doesn't
/// model explicitly (aadhaar documents, profile counters, ...) are kept
/// in `extra` so nothing the backend sent is lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,

    /// Inactive accounts can log in but must not reach a dashboard.
    /// Missing means active.
    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,

    /// Any other fields of the backend's user document.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl User {
    /// Returns `true` unless the backend flagged the account inactive.
    pub fn is_active(&self) -> bool {
        self.active
    }
}

// ---------------------------------------------------------------------------
// Credentials and login
// ---------------------------------------------------------------------------

/// A transient email/password pair, the only input to a login.
///
/// Not `Serialize`: credentials never go anywhere except
/// into a [`LoginRequest`]. `Debug` is hand-written so the password can't
/// leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Builds credentials from raw form input.
    ///
    /// The email is trimmed and lowercased; the password is taken as-is.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] if either field is empty
    /// (after trimming, for the email).
    pub fn new(email: &str, password: &str) -> Result<Self, ProtocolError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(ProtocolError::InvalidMessage("email is required".into()));
        }
        if password.is_empty() {
            return Err(ProtocolError::InvalidMessage(
                "password is required".into(),
            ));
        }
        Ok(Self {
            email,
            password: password.to_string(),
        })
    }

    /// The normalized email address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Borrows these credentials as the login request body.
    pub fn as_request(&self) -> LoginRequest<'_> {
        LoginRequest {
            email: &self.email,
            password: &self.password,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /auth/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response of `POST /auth/login`.
///
/// Both fields are optional at the serde level so that a 2xx response
/// missing the token still parses; [`TokenResponse::into_token`] is where
/// that absence becomes an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// Extracts the bearer token.
    ///
    /// # Errors
    /// Returns [`ProtocolError::MissingField`] if `access_token` is absent
    /// or empty.
    pub fn into_token(self) -> Result<String, ProtocolError> {
        match self.access_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(ProtocolError::MissingField("access_token")),
        }
    }
}

/// Body of `POST /auth/change-password`.
#[derive(Debug, Serialize)]
pub struct ChangePasswordRequest<'a> {
    pub old_password: &'a str,
    pub new_password: &'a str,
}

// =========================================================================
// Tests
// =========================================================================

//! Route guarding for Tradedesk.
//!
//! Views never look at the session directly to decide whether they may
//! render. They ask a [`RouteGuard`], which turns a session snapshot into
//! one of four answers: wait, go elsewhere, show the "account inactive"
//! notice, or go ahead.
//!
//! # Key types
//!
//! - [`RouteGuard`]: per-route policy (redirect target, allowed roles)
//! - [`GuardDecision`]: what the route should do right now
//! - [`Landing`]: where a user goes right after logging in
//! - [`landing_path`]: the dashboard route of each role

mod error;
mod guard;
mod landing;

pub use error::GuardError;
pub use guard::{DEFAULT_REDIRECT, GuardDecision, RouteGuard};
pub use landing::{Landing, landing_for, landing_path};

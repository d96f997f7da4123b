//! Client-side session management for Tradedesk.
//!
//! This crate owns "who is logged in" for the whole application:
//!
//! 1. **Authentication**: exchanging credentials for a bearer token
//!    ([`AuthBackend`] trait, [`RestBackend`] over HTTP)
//! 2. **Persistence**: keeping the token across restarts ([`TokenStore`])
//! 3. **State**: one authoritative [`Session`] published to any number of
//!    readers ([`SessionManager`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Guard Layer (above)      ← reads sessions to decide what may render
//!     ↕
//! Session Layer (this crate)  ← token, current user, lifecycle state
//!     ↕
//! Transport Layer (below)  ← HTTP requests with bearer auth
//! ```

#![allow(async_fn_in_trait)]

mod auth;
mod error;
mod manager;
mod session;
mod store;

pub use auth::{AuthBackend, RestBackend};
pub use error::{SessionError, StoreError};
pub use manager::SessionManager;
pub use session::{Session, SessionConfig, SessionState};
pub use store::{FileTokenStore, MemoryTokenStore, TOKEN_KEY, TokenStore};

//! # Tradedesk
//!
//! Client session layer for the Tradedesk distribution admin.
//!
//! Tradedesk owns the one thing every screen of a multi-role admin
//! depends on: who is logged in. It restores a persisted session at
//! startup, logs users in and out, keeps the bearer token on disk, and
//! tells every protected route whether it may render.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tradedesk::prelude::*;
//!
//! # async fn run() -> Result<(), TradedeskError> {
//! tradedesk::init_tracing();
//!
//! let app = Tradedesk::from_env()?;
//! app.start().await;
//!
//! if !app.session().is_authenticated() {
//!     app.session().login("owner@example.com", "secret").await?;
//! }
//!
//! match app.check(&RouteGuard::new()) {
//!     GuardDecision::Allow(user) => println!("hello {}", user.name),
//!     other => println!("{other:?}"),
//! }
//!
//! let orders = app.api().get("/orders").await?;
//! # let _ = orders;
//! # Ok(())
//! # }
//! ```

mod api;
mod app;
mod config;
mod error;
mod telemetry;

pub use api::AuthorizedApi;
pub use app::{RestSessionManager, Tradedesk, TradedeskBuilder};
pub use config::{
    ClientConfig, DEFAULT_API_BASE, DEFAULT_API_HOST, DEFAULT_TOKEN_PATH, ENV_API_BASE,
    ENV_API_HOST, ENV_HTTP_TIMEOUT, ENV_TOKEN_PATH,
};
pub use error::TradedeskError;
pub use telemetry::init_tracing;

pub use tradedesk_guard as guard;
pub use tradedesk_protocol as protocol;
pub use tradedesk_session as session;
pub use tradedesk_transport as transport;

/// Everything a typical application needs, in one import.
pub mod prelude {
    pub use crate::{AuthorizedApi, ClientConfig, Tradedesk, TradedeskBuilder, TradedeskError};
    pub use tradedesk_guard::{GuardDecision, Landing, RouteGuard, landing_for, landing_path};
    pub use tradedesk_protocol::{Role, User, UserId};
    pub use tradedesk_session::{
        FileTokenStore, MemoryTokenStore, Session, SessionError, SessionManager, SessionState,
        TokenStore,
    };
    pub use tradedesk_transport::{ApiError, Method, TransportError};
}

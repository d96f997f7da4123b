//! Wire protocol for the Tradedesk REST API.
//!
//! This crate defines the "language" the client and the backend speak:
//!
//! - **Types** ([`User`], [`Role`], [`Credentials`], [`TokenResponse`], etc.):
//!   the JSON documents that travel over HTTP.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those documents are
//!   converted to/from bytes, including the lenient body decoding the
//!   generic request helper relies on.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (HTTP bodies) and session
//! (who is logged in). It doesn't know about requests or tokens on disk:
//! it only knows how to serialize and deserialize documents.
//!
//! ```text
//! Transport (bytes) → Protocol (User, TokenResponse) → Session (current user)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ChangePasswordRequest, Credentials, LoginRequest, Role, TokenResponse,
    User, UserId,
};

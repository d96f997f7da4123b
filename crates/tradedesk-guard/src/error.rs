//! Error types for the guard layer.

/// Errors that can occur while waiting on a session.
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    /// The session manager was dropped before the session settled.
    /// Nothing will ever publish another snapshot to this receiver.
    #[error("session manager is gone")]
    SessionClosed,
}

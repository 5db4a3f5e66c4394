//! Error types for session creation, completion, and lookup.

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::util::SessionId;

/// Errors produced by [`SessionManager`](super::SessionManager).
#[derive(Debug, Error)]
pub enum SessionError {
    /// No pending session exists for this ID (already completed, swept, or never created).
    #[error("session not found: {0}")]
    NotFound(SessionId),

    /// The caller's wait was cancelled before a reply arrived.
    #[error("session {0} cancelled")]
    Cancelled(SessionId),

    /// The caller's wait exceeded the session's timeout.
    #[error("session {0} timed out")]
    Timeout(SessionId),
}

impl SessionError {
    /// Whether the caller might get a different outcome by calling again with a fresh session.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

//! Error types for message routing failures.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::util::ActorId;

/// Errors produced while delivering a message through the [`Router`](super::Router).
#[derive(Debug, Error)]
pub enum RouterError {
    /// No actor is registered under this ID.
    #[error("actor not found: {0}")]
    ActorNotFound(ActorId),

    /// The actor's mailbox receiver has been dropped.
    #[error("mailbox closed for actor: {0}")]
    MailboxClosed(ActorId),

    /// The actor's bounded mailbox rejected the message under backpressure.
    #[error("mailbox full for actor: {0}")]
    MailboxFull(ActorId),

    /// An actor ID is already registered; a second `spawn` tried to reuse it.
    #[error("duplicate actor registration: {0}")]
    DuplicateRegistration(ActorId),
}

impl RouterError {
    /// Whether retrying delivery later might succeed (the mailbox was merely full).
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::MailboxFull(_))
    }
}

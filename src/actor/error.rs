//! Error types for actor control operations (`start`, `stop`, `send`, `call`).

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::router::RouterError;
use crate::session::SessionError;

/// Errors produced by [`ActorRef`](super::ActorRef) operations.
#[derive(Debug, Error)]
pub enum ActorError {
    /// `start()` was called on an actor that had already started.
    #[error("actor already started")]
    AlreadyStarted,

    /// `send`/`call` on an actor that is stopping or stopped.
    #[error("actor is not running")]
    NotRunning,

    /// The actor's mailbox is at capacity.
    #[error("actor mailbox is full")]
    MailboxFull,

    /// The actor's mailbox receiver has been dropped.
    #[error("actor mailbox is closed")]
    MailboxClosed,

    /// `call()` exceeded its deadline before a reply arrived.
    #[error("call timed out waiting for a reply")]
    Timeout,

    /// `call()`'s caller-supplied cancellation fired before a reply arrived.
    #[error("call was cancelled")]
    Cancelled,

    /// The handler returned an error for a sessioned call.
    #[error("remote handler returned an error: {0}")]
    Remote(String),

    /// A session-layer failure not otherwise covered above.
    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

impl ActorError {
    /// Whether retrying the same operation might succeed without intervention.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::MailboxFull | Self::Timeout)
    }
}

impl From<RouterError> for ActorError {
    fn from(err: RouterError) -> Self {
        match err {
            RouterError::MailboxFull(_) => Self::MailboxFull,
            RouterError::MailboxClosed(_) => Self::MailboxClosed,
            RouterError::ActorNotFound(_) => Self::NotRunning,
            RouterError::DuplicateRegistration(_) => Self::NotRunning,
        }
    }
}

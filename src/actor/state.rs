//! Actor lifecycle state and the snapshot returned by `stats()`.

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};

/// Where an actor is in its run loop.
///
/// An actor starts `Idle`, toggles to `Running` for the duration of each
/// handler invocation and back to `Idle` between messages, then moves
/// through `Stopping` to `Stopped` exactly once, on `stop()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorState {
    /// Constructed but not yet started, or started and waiting for the next message.
    Idle,
    /// A handler invocation is in flight.
    Running,
    /// `stop()` has been called; draining the mailbox before terminating.
    Stopping,
    /// The actor has terminated and will not process further messages.
    Stopped,
}

impl Default for ActorState {
    fn default() -> Self {
        Self::Idle
    }
}

impl ActorState {
    /// Whether `send`/`call` should be rejected for an actor in this state.
    pub fn rejects_new_work(&self) -> bool {
        matches!(self, Self::Stopping | Self::Stopped)
    }
}

/// Point-in-time snapshot of an actor's runtime state, returned by `stats()`.
#[derive(Debug, Clone)]
pub struct ActorStats {
    /// Current lifecycle state.
    pub state: ActorState,
    /// Number of messages whose handler has completed (success or error).
    pub processed: u64,
    /// Number of messages currently buffered in the mailbox.
    pub mailbox_len: usize,
    /// When `start()` was called, if it has been.
    pub started_at: Option<DateTime<Utc>>,
    /// When the most recent handler invocation began, if any.
    pub last_active_at: Option<DateTime<Utc>>,
}

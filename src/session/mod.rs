//! Request/response correlation for sessioned calls.
//!
//! A [`SessionManager`] allocates monotonic [`SessionId`](crate::util::SessionId)s,
//! holds a single-slot `oneshot` reply channel per pending call, and sweeps
//! entries whose caller-supplied timeout has elapsed. A session is delivered
//! exactly once: `complete` and the sweeper both remove the map entry
//! atomically with their action, so a late sweep can never race a live reply.

mod error;
mod manager;
mod types;

pub use error::SessionError;
pub use manager::{SessionManager, DEFAULT_SWEEP_INTERVAL};
pub use types::Session;

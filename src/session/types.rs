//! The [`Session`] record tracked between a call and its reply.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};

// Layer 3: Internal module imports
use crate::util::{ActorId, SessionId};

/// A single in-flight request/response correlation.
#[derive(Debug, Clone)]
pub struct Session {
    /// Correlation ID attached to the request and echoed by the reply.
    pub id: SessionId,
    /// The actor that issued the call.
    pub source: ActorId,
    /// The actor expected to reply.
    pub target: ActorId,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// How long the caller is willing to wait.
    pub timeout: Duration,
}

impl Session {
    /// Whether `created_at + timeout` has elapsed as of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(self.timeout) {
            Ok(timeout) => now - self.created_at >= timeout,
            Err(_) => false,
        }
    }
}

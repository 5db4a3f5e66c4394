//! Identifier types for actors, handles, sessions, and nodes.

// Layer 1: Standard library imports
use std::fmt::{self, Display};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
// (none)

/// Unique identifier for an actor, scoped to the local node.
///
/// Allocated from a monotonic per-node counter rather than a UUID: the spec
/// requires a compact 32-bit identifier so it can be embedded (together with
/// the node ID) inside a [`HandleId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u32);

static NEXT_ACTOR_ID: AtomicU32 = AtomicU32::new(1);

impl ActorId {
    /// Allocate the next actor ID from the process-wide counter.
    pub fn next() -> Self {
        Self(NEXT_ACTOR_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap an existing raw value (used when decoding wire messages).
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// The raw numeric value.
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor-{}", self.0)
    }
}

/// A node's position in the cluster (0..=255). Encoded in the top 8 bits of
/// every [`HandleId`](crate::handle::HandleId) allocated on that node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u8);

impl NodeId {
    /// Construct from a raw byte.
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// The raw byte value.
    pub const fn as_u8(&self) -> u8 {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a [`Message`](crate::message::Message).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(u64);

static NEXT_MESSAGE_ID: AtomicU64 = AtomicU64::new(1);

impl MessageId {
    /// Allocate the next message ID.
    pub fn next() -> Self {
        Self(NEXT_MESSAGE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap an existing raw value.
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// The raw numeric value.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

/// Correlation ID for a request/response call. 0 means fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(u32);

impl SessionId {
    /// The sentinel value meaning "no session" (fire-and-forget).
    pub const NONE: SessionId = SessionId(0);

    /// Wrap an existing raw value.
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// The raw numeric value.
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// True if this is the fire-and-forget sentinel.
    pub const fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::NONE
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

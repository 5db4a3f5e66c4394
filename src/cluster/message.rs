//! Wire types exchanged between cluster nodes: one [`ClusterMessage`] per frame.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::util::{duration_serde, NodeId};

static NEXT_CLUSTER_MESSAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Default time-to-live for a cluster message before it is dropped unrouted.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// Header key marking a message as fire-and-forget (no reply expected).
pub const HEADER_FIRE_FORGET: &str = "fire_forget";

/// Discriminator for [`ClusterMessage::message_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterMessageType {
    /// Handshake: sent by a joiner, replied to by the accepting seed.
    Join,
    /// Periodic liveness signal.
    Heartbeat,
    /// Graceful departure notice.
    Leave,
    /// Full service-registry snapshot, for eventual convergence.
    Sync,
    /// Request to invoke a remote service.
    ActorCall,
    /// Reply to a previous `ActorCall`.
    ActorReply,
}

/// One frame of the cluster wire protocol.
///
/// `to` empty means broadcast. `payload` is opaque bytes (typically a
/// `serde_json`-encoded inner value specific to `message_type`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterMessage {
    /// Globally-unique (per sending node) message identifier.
    pub id: String,
    /// What kind of message this is.
    pub message_type: ClusterMessageType,
    /// Sending node.
    pub from: NodeId,
    /// Receiving node, or `None` for a broadcast.
    pub to: Option<NodeId>,
    /// Opaque payload, shape determined by `message_type`.
    pub payload: Vec<u8>,
    /// Protocol-level flags (e.g. [`HEADER_FIRE_FORGET`]).
    pub headers: HashMap<String, String>,
    /// Free-form application metadata.
    pub metadata: HashMap<String, String>,
    /// When this message was created.
    pub timestamp: DateTime<Utc>,
    /// How long this message remains valid in transit.
    #[serde(with = "duration_serde")]
    pub ttl: Duration,
    /// Number of hops taken so far (for future multi-hop relaying).
    pub hops: u32,
    /// Node IDs this message has passed through.
    pub path: Vec<NodeId>,
}

impl ClusterMessage {
    /// Build a message with default TTL, zero hops, and an empty path.
    pub fn new(message_type: ClusterMessageType, from: NodeId, to: Option<NodeId>, payload: Vec<u8>) -> Self {
        let counter = NEXT_CLUSTER_MESSAGE_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            id: format!("msg-{from}-{counter}"),
            message_type,
            from,
            to,
            payload,
            headers: HashMap::new(),
            metadata: HashMap::new(),
            timestamp: Utc::now(),
            ttl: DEFAULT_TTL,
            hops: 0,
            path: Vec::new(),
        }
    }

    /// Mark this message as fire-and-forget (no `ActorReply` expected).
    pub fn with_fire_forget(mut self) -> Self {
        self.headers.insert(HEADER_FIRE_FORGET.to_string(), "true".to_string());
        self
    }

    /// Whether this message carries the fire-and-forget header.
    pub fn is_fire_and_forget(&self) -> bool {
        self.headers.get(HEADER_FIRE_FORGET).map(String::as_str) == Some("true")
    }

    /// Whether `self` has exceeded its TTL relative to `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        chrono::Duration::from_std(self.ttl)
            .map(|ttl| now.signed_duration_since(self.timestamp) > ttl)
            .unwrap_or(false)
    }

    /// Whether `to` is unset (broadcast to all known active peers).
    pub fn is_broadcast(&self) -> bool {
        self.to.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_message_is_not_fire_and_forget_by_default() {
        let message = ClusterMessage::new(ClusterMessageType::Heartbeat, NodeId::new(0), None, Vec::new());
        assert!(!message.is_fire_and_forget());
        assert!(message.is_broadcast());
    }

    #[test]
    fn fire_forget_sets_header() {
        let message = ClusterMessage::new(ClusterMessageType::ActorCall, NodeId::new(0), Some(NodeId::new(1)), Vec::new())
            .with_fire_forget();
        assert!(message.is_fire_and_forget());
        assert!(!message.is_broadcast());
    }

    #[test]
    fn expiry_check() {
        let mut message = ClusterMessage::new(ClusterMessageType::Join, NodeId::new(0), None, Vec::new());
        message.ttl = Duration::from_millis(0);
        message.timestamp = Utc::now() - chrono::Duration::seconds(1);
        assert!(message.is_expired(Utc::now()));
    }

    #[test]
    fn message_ids_are_unique() {
        let a = ClusterMessage::new(ClusterMessageType::Heartbeat, NodeId::new(0), None, Vec::new());
        let b = ClusterMessage::new(ClusterMessageType::Heartbeat, NodeId::new(0), None, Vec::new());
        assert_ne!(a.id, b.id);
    }
}

//! Mailbox backpressure priority, derived from a message's type tag.

use serde::{Deserialize, Serialize};

use super::MessageType;

/// Priority used to select a [`BackpressureStrategy`](crate::mailbox::BackpressureStrategy)
/// when a mailbox is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MessagePriority {
    /// Best-effort traffic; safe to drop under pressure.
    Low,
    /// Ordinary request/response/text traffic.
    Normal,
    /// System control messages (shutdown, cluster heartbeats).
    High,
    /// Error responses: must reach the waiting caller to avoid a leaked session.
    Critical,
}

impl MessagePriority {
    /// Default priority for a given message type.
    pub const fn for_type(message_type: MessageType) -> Self {
        match message_type {
            MessageType::Text | MessageType::Request | MessageType::Response => Self::Normal,
            MessageType::Multicast => Self::Low,
            MessageType::System => Self::High,
            MessageType::Error => Self::Critical,
        }
    }
}

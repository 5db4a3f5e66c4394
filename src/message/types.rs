//! The concrete `Message` struct and its type tag.

// Layer 1: Standard library imports
use std::fmt;

// Layer 2: Third-party crate imports
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::util::{ActorId, MessageId, SessionId};

/// Discriminator for a [`Message`]'s payload and dispatch behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Plain text/opaque payload, no reply expected unless a session is set.
    Text,
    /// A request that expects a `Response` carrying the same session.
    Request,
    /// A reply to a prior `Request`; carries the originating session.
    Response,
    /// Runtime-internal control message (e.g. shutdown notification).
    System,
    /// A structured error delivered in place of a `Response`.
    Error,
    /// Delivered to every subscriber of a pool rather than a single actor.
    Multicast,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Text => "text",
            Self::Request => "request",
            Self::Response => "response",
            Self::System => "system",
            Self::Error => "error",
            Self::Multicast => "multicast",
        };
        write!(f, "{s}")
    }
}

/// The single concrete message type carried through mailboxes, the router,
/// and the cluster wire protocol.
///
/// A response always carries the `session` of its originating request
/// (invariant from §3 DATA MODEL).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Globally-unique-enough identifier for tracing/logging.
    pub id: MessageId,
    /// What kind of message this is.
    pub message_type: MessageType,
    /// Sending actor.
    pub source: ActorId,
    /// Receiving actor.
    pub target: ActorId,
    /// Correlation ID; `SessionId::NONE` means fire-and-forget.
    pub session: SessionId,
    /// Opaque payload bytes; actors interpret them according to `message_type`.
    pub payload: Bytes,
    /// Creation timestamp (UTC).
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Build a new message with a fresh ID and the current timestamp.
    pub fn new(
        message_type: MessageType,
        source: ActorId,
        target: ActorId,
        session: SessionId,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            id: MessageId::next(),
            message_type,
            source,
            target,
            session,
            payload: payload.into(),
            timestamp: Utc::now(),
        }
    }

    /// Build the response counterpart to this message, swapping source/target
    /// and preserving the session per the response invariant.
    pub fn respond(&self, payload: impl Into<Bytes>) -> Self {
        Self {
            id: MessageId::next(),
            message_type: MessageType::Response,
            source: self.target,
            target: self.source,
            session: self.session,
            payload: payload.into(),
            timestamp: Utc::now(),
        }
    }

    /// Build an error response counterpart to this message.
    pub fn respond_error(&self, payload: impl Into<Bytes>) -> Self {
        Self {
            id: MessageId::next(),
            message_type: MessageType::Error,
            source: self.target,
            target: self.source,
            session: self.session,
            payload: payload.into(),
            timestamp: Utc::now(),
        }
    }

    /// Fire-and-forget messages carry no session.
    pub fn is_fire_and_forget(&self) -> bool {
        self.session.is_none()
    }
}

//! Core mailbox traits and supporting types for actor message queuing.
//!
//! This module provides the foundational traits and types for the mailbox system:
//! - [`MailboxReceiver`]: trait for receiving messages from a mailbox
//! - [`MailboxSender`]: trait for sending messages to a mailbox
//! - [`MailboxCapacity`]: capacity configuration (bounded/unbounded)
//! - [`MailboxError`]: comprehensive error types
//!
//! # Design Principles
//!
//! - Every actor in this runtime consumes the same concrete [`Message`], so these
//!   traits carry no generic message-type parameter; only the metrics recorder varies.
//! - **Async support**: full async/await integration with tokio.
//! - **Metrics tracking**: built-in monitoring for observability.

// Layer 1: Standard library imports
use std::error::Error;

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use crate::message::Message;

/// Mailbox receiver interface.
///
/// The receiver is owned by a single actor and is responsible for processing
/// incoming messages from the queue.
///
/// # Ownership
///
/// Unlike [`MailboxSender`] which is `Clone`, the receiver is NOT cloneable
/// and is owned exclusively by one actor, following the actor model pattern.
#[async_trait]
pub trait MailboxReceiver: Send + Sync {
    /// Error type for mailbox operations
    type Error: Error + Send + Sync + 'static;

    /// Receive the next message from the mailbox (async)
    ///
    /// Returns None if the mailbox is closed and empty.
    async fn recv(&mut self) -> Option<Message>;

    /// Try to receive a message without blocking
    ///
    /// Returns `TryRecvError::Empty` if no messages are available.
    /// Returns `TryRecvError::Closed` if the mailbox is closed.
    fn try_recv(&mut self) -> Result<Message, TryRecvError>;

    /// Get the mailbox capacity configuration
    fn capacity(&self) -> MailboxCapacity;

    /// Get the current number of messages in the mailbox
    ///
    /// Note: This is an approximation based on sent/received counters.
    fn len(&self) -> usize;

    /// Check if the mailbox is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sender interface for mailboxes with backpressure support.
///
/// The sender is cloneable and can be shared across multiple producers
/// delivering to a single mailbox.
#[async_trait]
pub trait MailboxSender: Send + Sync + Clone {
    /// Error type for send operations
    type Error: Error + Send + Sync + 'static;

    /// Send a message (async, may block with backpressure)
    ///
    /// Behavior depends on the backpressure strategy:
    /// - `Block`: wait for space to become available
    /// - `Drop`: drop the incoming message if full
    /// - `Error`: return an error immediately if full
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` if the mailbox is closed or send fails.
    async fn send(&self, message: Message) -> Result<(), Self::Error>;

    /// Try to send a message without blocking
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` if the mailbox is full or closed.
    fn try_send(&self, message: Message) -> Result<(), Self::Error>;
}

/// Mailbox capacity configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxCapacity {
    /// Bounded mailbox with maximum capacity
    Bounded(usize),

    /// Unbounded mailbox (no capacity limit)
    Unbounded,
}

/// Mailbox error types
#[derive(Debug, thiserror::Error)]
pub enum MailboxError {
    /// Mailbox is full (bounded mailboxes only)
    #[error("Mailbox is full (capacity: {capacity})")]
    Full { capacity: usize },

    /// Mailbox is closed (receiver dropped)
    #[error("Mailbox is closed")]
    Closed,

    /// Backpressure strategy was applied
    #[error("Backpressure applied: {strategy:?}")]
    BackpressureApplied {
        strategy: crate::mailbox::BackpressureStrategy,
    },
}

/// Try receive error types
#[derive(Debug, thiserror::Error)]
pub enum TryRecvError {
    /// Mailbox is empty (no messages available)
    #[error("Mailbox is empty")]
    Empty,

    /// Mailbox is closed (receiver dropped)
    #[error("Mailbox is closed")]
    Closed,
}

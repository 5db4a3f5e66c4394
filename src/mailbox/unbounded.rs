//! Unbounded mailbox implementation with unlimited capacity.
//!
//! This module provides an unbounded mailbox that can grow without limit,
//! using tokio's unbounded channel. This is suitable for actors that need
//! to handle bursts of messages without backpressure.
//!
//! # Warning
//!
//! An unbounded mailbox can grow without limit if the consuming actor
//! cannot keep up with incoming messages. Use with caution and prefer
//! bounded mailboxes with appropriate backpressure strategies.
//!
//! # Use Cases
//!
//! - System actors that must never block message delivery
//! - High-priority control plane actors
//! - Actors with known finite message sources

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use tokio::sync::mpsc;

// Layer 3: Internal module imports
use super::metrics::{AtomicMetrics, MetricsRecorder};
use super::traits::{MailboxCapacity, MailboxError, MailboxReceiver, MailboxSender, TryRecvError};
use crate::message::Message;

/// Unbounded mailbox with unlimited capacity.
///
/// # Memory Safety
///
/// While the mailbox itself is unbounded, system memory is finite. Monitor
/// mailbox metrics to detect potential memory issues.
pub struct UnboundedMailbox<R: MetricsRecorder = AtomicMetrics> {
    receiver: mpsc::UnboundedReceiver<Message>,
    pub metrics: Arc<R>,
}

/// Sender for unbounded mailbox.
///
/// The sender can send messages without ever blocking or failing due to
/// capacity limits. Clone the sender to share it across multiple tasks.
#[derive(Clone)]
pub struct UnboundedMailboxSender<R: MetricsRecorder = AtomicMetrics> {
    sender: mpsc::UnboundedSender<Message>,
    pub metrics: Arc<R>,
}

impl<R: MetricsRecorder> UnboundedMailbox<R> {
    /// Create a new unbounded mailbox with a custom metrics recorder.
    pub fn with_metrics(metrics: R) -> (Self, UnboundedMailboxSender<R>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let metrics = Arc::new(metrics);

        let mailbox = Self {
            receiver,
            metrics: Arc::clone(&metrics),
        };

        let sender = UnboundedMailboxSender { sender, metrics };

        (mailbox, sender)
    }
}

// Convenience constructor for AtomicMetrics (common case)
impl UnboundedMailbox<AtomicMetrics> {
    /// Create a new unbounded mailbox with `AtomicMetrics`.
    pub fn new() -> (Self, UnboundedMailboxSender<AtomicMetrics>) {
        Self::with_metrics(AtomicMetrics::new())
    }
}

#[async_trait]
impl<R: MetricsRecorder> MailboxReceiver for UnboundedMailbox<R> {
    type Error = MailboxError;

    async fn recv(&mut self) -> Option<Message> {
        let message = self.receiver.recv().await?;
        self.metrics.record_received();
        self.metrics.update_last_message(chrono::Utc::now());
        Some(message)
    }

    fn try_recv(&mut self) -> Result<Message, TryRecvError> {
        match self.receiver.try_recv() {
            Ok(message) => {
                self.metrics.record_received();
                self.metrics.update_last_message(chrono::Utc::now());
                Ok(message)
            }
            Err(mpsc::error::TryRecvError::Empty) => Err(TryRecvError::Empty),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(TryRecvError::Closed),
        }
    }

    fn capacity(&self) -> MailboxCapacity {
        MailboxCapacity::Unbounded
    }

    fn len(&self) -> usize {
        // Unbounded channels don't report an accurate length; approximate via metrics.
        self.metrics.in_flight() as usize
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<R: MetricsRecorder + Clone> MailboxSender for UnboundedMailboxSender<R> {
    type Error = MailboxError;

    async fn send(&self, message: Message) -> Result<(), Self::Error> {
        self.sender.send(message).map_err(|_| MailboxError::Closed)?;
        self.metrics.record_sent();
        Ok(())
    }

    fn try_send(&self, message: Message) -> Result<(), Self::Error> {
        self.sender.send(message).map_err(|_| MailboxError::Closed)?;
        self.metrics.record_sent();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::message::MessageType;
    use crate::util::{ActorId, SessionId};

    fn test_message(tag: &str) -> Message {
        Message::new(
            MessageType::Text,
            ActorId::next(),
            ActorId::next(),
            SessionId::NONE,
            tag.to_string(),
        )
    }

    #[tokio::test]
    async fn test_unbounded_mailbox_new() {
        let (mailbox, _sender) = UnboundedMailbox::new();
        assert_eq!(mailbox.capacity(), MailboxCapacity::Unbounded);
        assert_eq!(mailbox.len(), 0);
        assert!(mailbox.is_empty());
    }

    #[tokio::test]
    async fn test_unbounded_send_and_recv() {
        let (mut mailbox, sender) = UnboundedMailbox::new();
        sender.send(test_message("test")).await.unwrap();

        let received = mailbox.recv().await.unwrap();
        assert_eq!(received.payload, bytes::Bytes::from("test"));
    }

    #[tokio::test]
    async fn test_unbounded_try_send() {
        let (mut mailbox, sender) = UnboundedMailbox::new();
        sender.try_send(test_message("test")).unwrap();

        let received = mailbox.try_recv().unwrap();
        assert_eq!(received.payload, bytes::Bytes::from("test"));
    }

    #[tokio::test]
    async fn test_unbounded_try_recv_empty() {
        let (mut mailbox, _sender) = UnboundedMailbox::new();

        match mailbox.try_recv() {
            Err(TryRecvError::Empty) => {}
            _ => panic!("Expected Empty error"),
        }
    }

    #[tokio::test]
    async fn test_unbounded_multiple_messages() {
        let (mut mailbox, sender) = UnboundedMailbox::new();

        for i in 0..1000 {
            sender.send(test_message(&format!("msg_{i}"))).await.unwrap();
        }

        for i in 0..1000 {
            let received = mailbox.recv().await.unwrap();
            assert_eq!(received.payload, bytes::Bytes::from(format!("msg_{i}")));
        }
    }

    #[tokio::test]
    async fn test_unbounded_sender_clone() {
        let (mut mailbox, sender) = UnboundedMailbox::new();
        let sender2 = sender.clone();

        sender.send(test_message("from_sender1")).await.unwrap();
        sender2.send(test_message("from_sender2")).await.unwrap();

        assert!(mailbox.recv().await.is_some());
        assert!(mailbox.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_unbounded_metrics() {
        let (mut mailbox, sender) = UnboundedMailbox::new();

        for i in 0..5 {
            sender.send(test_message(&format!("msg_{i}"))).await.unwrap();
        }

        assert_eq!(mailbox.metrics.sent_count(), 5);
        assert_eq!(mailbox.metrics.received_count(), 0);

        for _ in 0..3 {
            mailbox.recv().await.unwrap();
        }

        assert_eq!(mailbox.metrics.received_count(), 3);
    }

    #[tokio::test]
    async fn test_unbounded_closed_mailbox() {
        let (mut mailbox, sender) = UnboundedMailbox::new();
        drop(sender);

        let result = mailbox.recv().await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_unbounded_closed_sender() {
        let (mailbox, sender) = UnboundedMailbox::new();
        drop(mailbox);

        let result = sender.send(test_message("test")).await;
        assert!(matches!(result, Err(MailboxError::Closed)));
    }

    #[tokio::test]
    async fn test_unbounded_capacity_reporting() {
        let (mailbox, _sender) = UnboundedMailbox::new();
        assert_eq!(mailbox.capacity(), MailboxCapacity::Unbounded);
    }

    #[tokio::test]
    async fn test_unbounded_high_volume() {
        let (mut mailbox, sender) = UnboundedMailbox::new();

        for i in 0..10_000 {
            sender.send(test_message(&format!("msg_{i}"))).await.unwrap();
        }

        for i in 0..10_000 {
            let received = mailbox.recv().await.unwrap();
            assert_eq!(received.payload, bytes::Bytes::from(format!("msg_{i}")));
        }
    }
}

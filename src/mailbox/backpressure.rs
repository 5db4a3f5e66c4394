//! Backpressure strategies for handling full mailboxes.
//!
//! This module provides backpressure handling strategies for bounded mailboxes,
//! allowing fine-grained control over message delivery behavior when mailboxes
//! reach capacity.

// Layer 1: Standard library imports
use std::fmt;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

// Layer 3: Internal module imports
use super::traits::MailboxError;
use crate::message::{Message, MessagePriority};

/// Backpressure strategies for handling full mailboxes.
///
/// When a bounded mailbox reaches capacity, the backpressure strategy
/// determines how the system handles additional incoming messages.
///
/// # Strategy Selection
///
/// Different strategies are appropriate for different scenarios:
/// - **Block**: Critical messages that must be delivered (may cause sender delays)
/// - **Drop**: Low priority messages where silent failure is acceptable
/// - **Error**: Request/response patterns where sender needs immediate feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BackpressureStrategy {
    /// Block sender until space becomes available (async wait).
    ///
    /// Use for critical messages that must be delivered. May cause
    /// sender delays if receiver is slow.
    Block,

    /// Drop the incoming message when mailbox is full.
    ///
    /// Use for low-priority messages or scenarios where silent message
    /// dropping is acceptable (e.g., best-effort delivery, logging, metrics).
    Drop,

    /// Return an error to the sender immediately.
    ///
    /// Use for request/response patterns where the sender needs to know
    /// immediately if delivery failed (e.g., API calls, synchronous operations).
    #[default]
    Error,
}

impl fmt::Display for BackpressureStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Block => write!(f, "Block"),
            Self::Drop => write!(f, "Drop"),
            Self::Error => write!(f, "Error"),
        }
    }
}

impl BackpressureStrategy {
    /// Apply the backpressure strategy to send a message.
    ///
    /// # Errors
    ///
    /// Returns `MailboxError::Full` if strategy is Error and mailbox is full.
    /// Returns `MailboxError::Closed` if the receiver is closed.
    pub async fn apply(
        &self,
        sender: &mpsc::Sender<Message>,
        message: Message,
    ) -> Result<(), MailboxError> {
        match self {
            Self::Block => {
                sender
                    .send(message)
                    .await
                    .map_err(|_| MailboxError::Closed)?;
                Ok(())
            }

            Self::Drop => match sender.try_send(message) {
                Ok(()) => Ok(()),
                Err(mpsc::error::TrySendError::Full(_)) => Ok(()),
                Err(mpsc::error::TrySendError::Closed(_)) => Err(MailboxError::Closed),
            },

            Self::Error => sender.try_send(message).map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => MailboxError::Full {
                    capacity: sender.max_capacity(),
                },
                mpsc::error::TrySendError::Closed(_) => MailboxError::Closed,
            }),
        }
    }

    /// Select appropriate backpressure strategy based on message priority.
    ///
    /// # Strategy Mapping
    ///
    /// - Critical → Block (must be delivered)
    /// - High → Block (important messages)
    /// - Normal → Error (sender should handle failure)
    /// - Low → Drop (can be safely discarded)
    pub fn for_priority(priority: MessagePriority) -> Self {
        match priority {
            MessagePriority::Critical => Self::Block,
            MessagePriority::High => Self::Block,
            MessagePriority::Normal => Self::Error,
            MessagePriority::Low => Self::Drop,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::message::MessageType;
    use crate::util::{ActorId, SessionId};

    fn test_message() -> Message {
        Message::new(
            MessageType::Text,
            ActorId::next(),
            ActorId::next(),
            SessionId::NONE,
            "payload",
        )
    }

    #[test]
    fn test_backpressure_strategy_default() {
        assert_eq!(BackpressureStrategy::default(), BackpressureStrategy::Error);
    }

    #[test]
    fn test_backpressure_strategy_display() {
        assert_eq!(BackpressureStrategy::Block.to_string(), "Block");
        assert_eq!(BackpressureStrategy::Drop.to_string(), "Drop");
        assert_eq!(BackpressureStrategy::Error.to_string(), "Error");
    }

    #[test]
    fn test_strategy_for_priority_critical() {
        assert_eq!(
            BackpressureStrategy::for_priority(MessagePriority::Critical),
            BackpressureStrategy::Block
        );
    }

    #[test]
    fn test_strategy_for_priority_high() {
        assert_eq!(
            BackpressureStrategy::for_priority(MessagePriority::High),
            BackpressureStrategy::Block
        );
    }

    #[test]
    fn test_strategy_for_priority_normal() {
        assert_eq!(
            BackpressureStrategy::for_priority(MessagePriority::Normal),
            BackpressureStrategy::Error
        );
    }

    #[test]
    fn test_strategy_for_priority_low() {
        assert_eq!(
            BackpressureStrategy::for_priority(MessagePriority::Low),
            BackpressureStrategy::Drop
        );
    }

    #[tokio::test]
    async fn test_apply_block_strategy() {
        let (sender, mut receiver) = mpsc::channel::<Message>(2);

        BackpressureStrategy::Block
            .apply(&sender, test_message())
            .await
            .unwrap();

        assert!(receiver.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_apply_block_strategy_waits() {
        use std::time::Duration;
        use tokio::time::sleep;

        let (sender, mut receiver) = mpsc::channel::<Message>(1);

        sender.try_send(test_message()).unwrap();

        let sender_clone = sender.clone();
        let handle = tokio::spawn(async move {
            BackpressureStrategy::Block
                .apply(&sender_clone, test_message())
                .await
        });

        sleep(Duration::from_millis(10)).await;
        receiver.recv().await.unwrap();
        handle.await.unwrap().unwrap();
        assert!(receiver.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_apply_error_strategy_full() {
        let (sender, _receiver) = mpsc::channel::<Message>(1);
        sender.try_send(test_message()).unwrap();

        let result = BackpressureStrategy::Error.apply(&sender, test_message()).await;
        assert!(matches!(result, Err(MailboxError::Full { .. })));
    }

    #[tokio::test]
    async fn test_apply_error_strategy_success() {
        let (sender, mut receiver) = mpsc::channel::<Message>(2);
        BackpressureStrategy::Error
            .apply(&sender, test_message())
            .await
            .unwrap();
        assert!(receiver.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_apply_drop_strategy() {
        let (sender, mut receiver) = mpsc::channel::<Message>(1);
        sender.try_send(test_message()).unwrap();

        BackpressureStrategy::Drop
            .apply(&sender, test_message())
            .await
            .unwrap();

        assert!(receiver.recv().await.is_some());
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_apply_closed_channel() {
        let (sender, receiver) = mpsc::channel::<Message>(1);
        drop(receiver);

        for strategy in [
            BackpressureStrategy::Block,
            BackpressureStrategy::Error,
            BackpressureStrategy::Drop,
        ] {
            let result = strategy.apply(&sender, test_message()).await;
            assert!(matches!(result, Err(MailboxError::Closed)));
        }
    }

    #[test]
    fn test_strategy_equality() {
        assert_eq!(BackpressureStrategy::Block, BackpressureStrategy::Block);
        assert_ne!(BackpressureStrategy::Block, BackpressureStrategy::Error);
    }
}

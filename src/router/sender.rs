//! A uniform handle for delivering to either mailbox flavor a spawned actor chose.

// Layer 3: Internal module imports
use super::error::RouterError;
use crate::mailbox::{
    AtomicMetrics, BoundedMailboxSender, MailboxError, MailboxSender, UnboundedMailboxSender,
};
use crate::message::Message;

/// Delivery endpoint registered in the [`Router`](super::Router) for one actor.
///
/// An enum rather than a trait object: every actor chooses bounded or unbounded
/// mailboxes at spawn time, and the router only ever needs to forward a message,
/// so a closed two-variant enum is cheaper and monomorphization-friendly.
#[derive(Clone)]
pub enum RouterSender {
    /// Backed by a capacity-limited mailbox with a backpressure strategy.
    Bounded(BoundedMailboxSender<AtomicMetrics>),
    /// Backed by an unbounded mailbox.
    Unbounded(UnboundedMailboxSender<AtomicMetrics>),
}

impl RouterSender {
    /// Deliver `message`, applying whatever backpressure strategy the mailbox carries.
    pub async fn deliver(&self, message: Message) -> Result<(), RouterError> {
        let target = message.target;
        let result = match self {
            Self::Bounded(sender) => sender.send(message).await,
            Self::Unbounded(sender) => sender.send(message).await,
        };
        result.map_err(|err| map_mailbox_error(target, err))
    }

    /// Deliver without waiting; fails immediately if the mailbox is full.
    pub fn try_deliver(&self, message: Message) -> Result<(), RouterError> {
        let target = message.target;
        let result = match self {
            Self::Bounded(sender) => sender.try_send(message),
            Self::Unbounded(sender) => sender.try_send(message),
        };
        result.map_err(|err| map_mailbox_error(target, err))
    }
}

fn map_mailbox_error(actor_id: crate::util::ActorId, err: MailboxError) -> RouterError {
    match err {
        MailboxError::Full { .. } => RouterError::MailboxFull(actor_id),
        MailboxError::Closed => RouterError::MailboxClosed(actor_id),
        MailboxError::BackpressureApplied { .. } => RouterError::MailboxFull(actor_id),
    }
}

impl From<BoundedMailboxSender<AtomicMetrics>> for RouterSender {
    fn from(sender: BoundedMailboxSender<AtomicMetrics>) -> Self {
        Self::Bounded(sender)
    }
}

impl From<UnboundedMailboxSender<AtomicMetrics>> for RouterSender {
    fn from(sender: UnboundedMailboxSender<AtomicMetrics>) -> Self {
        Self::Unbounded(sender)
    }
}

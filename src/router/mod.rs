//! Lock-free routing table mapping [`ActorId`] to a live mailbox.
//!
//! Generalized from a per-message-type actor registry into a single table
//! keyed by the runtime's one concrete [`ActorId`]: every actor, regardless of
//! what it does, is reachable by routing the same [`Message`] struct to its
//! mailbox sender.

mod error;
mod sender;

pub use error::RouterError;
pub use sender::RouterSender;

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use dashmap::DashMap;

// Layer 3: Internal module imports
use crate::message::Message;
use crate::util::ActorId;

/// Concurrent `ActorId -> RouterSender` table.
///
/// Cheap to clone: all clones share the same underlying `DashMap` via `Arc`.
#[derive(Clone, Default)]
pub struct Router {
    table: Arc<DashMap<ActorId, RouterSender>>,
}

impl Router {
    /// Create an empty router.
    pub fn new() -> Self {
        Self {
            table: Arc::new(DashMap::new()),
        }
    }

    /// Register a newly spawned actor's mailbox sender.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::DuplicateRegistration`] if `actor_id` is already routed.
    pub fn register(&self, actor_id: ActorId, sender: impl Into<RouterSender>) -> Result<(), RouterError> {
        if self.table.contains_key(&actor_id) {
            return Err(RouterError::DuplicateRegistration(actor_id));
        }
        self.table.insert(actor_id, sender.into());
        Ok(())
    }

    /// Remove an actor's routing entry, typically once it has stopped.
    pub fn unregister(&self, actor_id: ActorId) {
        self.table.remove(&actor_id);
    }

    /// Deliver `message` to `message.target`'s mailbox, awaiting backpressure if configured.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::ActorNotFound`] if the target is not registered, or an
    /// error from the underlying mailbox send.
    pub async fn deliver(&self, message: Message) -> Result<(), RouterError> {
        let sender = self
            .table
            .get(&message.target)
            .map(|entry| entry.value().clone())
            .ok_or(RouterError::ActorNotFound(message.target))?;
        sender.deliver(message).await
    }

    /// Deliver without waiting; fails immediately under backpressure.
    pub fn try_deliver(&self, message: Message) -> Result<(), RouterError> {
        let sender = self
            .table
            .get(&message.target)
            .map(|entry| entry.value().clone())
            .ok_or(RouterError::ActorNotFound(message.target))?;
        sender.try_deliver(message)
    }

    /// Whether an actor ID currently has a routing entry.
    pub fn contains(&self, actor_id: ActorId) -> bool {
        self.table.contains_key(&actor_id)
    }

    /// Number of actors currently routable.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the router has no registered actors.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mailbox::UnboundedMailbox;
    use crate::message::MessageType;
    use crate::util::SessionId;

    fn test_message(target: ActorId) -> Message {
        Message::new(
            MessageType::Text,
            ActorId::next(),
            target,
            SessionId::NONE,
            "hi",
        )
    }

    #[tokio::test]
    async fn register_and_deliver() {
        let router = Router::new();
        let (mut mailbox, sender) = UnboundedMailbox::new();
        let actor_id = ActorId::next();

        router.register(actor_id, sender).unwrap();
        router.deliver(test_message(actor_id)).await.unwrap();

        let received = mailbox.recv().await.unwrap();
        assert_eq!(received.target, actor_id);
    }

    #[tokio::test]
    async fn deliver_to_unknown_actor_fails() {
        let router = Router::new();
        let result = router.deliver(test_message(ActorId::next())).await;
        assert!(matches!(result, Err(RouterError::ActorNotFound(_))));
    }

    #[tokio::test]
    async fn duplicate_registration_rejected() {
        let router = Router::new();
        let (_m1, s1) = UnboundedMailbox::new();
        let (_m2, s2) = UnboundedMailbox::new();
        let actor_id = ActorId::next();

        router.register(actor_id, s1).unwrap();
        let result = router.register(actor_id, s2);
        assert!(matches!(result, Err(RouterError::DuplicateRegistration(_))));
    }

    #[tokio::test]
    async fn unregister_removes_route() {
        let router = Router::new();
        let (_mailbox, sender) = UnboundedMailbox::new();
        let actor_id = ActorId::next();

        router.register(actor_id, sender).unwrap();
        assert!(router.contains(actor_id));

        router.unregister(actor_id);
        assert!(!router.contains(actor_id));

        let result = router.deliver(test_message(actor_id)).await;
        assert!(matches!(result, Err(RouterError::ActorNotFound(_))));
    }

    #[tokio::test]
    async fn router_clone_shares_table() {
        let router = Router::new();
        let clone = router.clone();
        let (_mailbox, sender) = UnboundedMailbox::new();

        router.register(ActorId::next(), sender).unwrap();
        assert_eq!(clone.len(), 1);
    }
}

//! Per-actor handle into the router, given to every handler invocation.

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};

// Layer 3: Internal module imports
use crate::message::{Message, MessageType};
use crate::router::{Router, RouterError};
use crate::util::{ActorId, NodeId, SessionId};

/// Read-only view into routing, handed to [`Actor::handle`](super::Actor::handle)
/// so a handler can address other actors without holding a full [`ActorRef`](super::ActorRef).
pub struct ActorContext {
    actor_id: ActorId,
    node_id: NodeId,
    router: Router,
    created_at: DateTime<Utc>,
}

impl ActorContext {
    /// Build a context for the actor identified by `actor_id`.
    pub fn new(actor_id: ActorId, node_id: NodeId, router: Router) -> Self {
        Self {
            actor_id,
            node_id,
            router,
            created_at: Utc::now(),
        }
    }

    /// This actor's ID.
    pub fn actor_id(&self) -> ActorId {
        self.actor_id
    }

    /// The node this actor runs on.
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// When this context (and therefore the actor's task) was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Send a fire-and-forget message to another local actor.
    pub async fn send(
        &self,
        target: ActorId,
        message_type: MessageType,
        payload: impl Into<bytes::Bytes>,
    ) -> Result<(), RouterError> {
        let message = Message::new(message_type, self.actor_id, target, SessionId::NONE, payload);
        self.router.deliver(message).await
    }
}

//! The core `Actor` trait every handler implements.

// Layer 1: Standard library imports
use std::error::Error;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use bytes::Bytes;

// Layer 3: Internal module imports
use super::context::ActorContext;
use crate::message::Message;

/// A sequential message handler.
///
/// Unlike a generic-per-message-type design, every `Actor` handles the same
/// concrete [`Message`] and returns an opaque reply payload: the runtime, not
/// the trait, decides whether that payload is delivered anywhere (only
/// sessioned messages get a reply).
///
/// # Examples
///
/// ```rust
/// use orbit_rt::actor::{Actor, ActorContext};
/// use orbit_rt::message::Message;
/// use async_trait::async_trait;
/// use bytes::Bytes;
/// use std::fmt;
///
/// struct Counter { value: i64 }
///
/// #[derive(Debug)]
/// struct CounterError;
///
/// impl fmt::Display for CounterError {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "counter error")
///     }
/// }
/// impl std::error::Error for CounterError {}
///
/// #[async_trait]
/// impl Actor for Counter {
///     type Error = CounterError;
///
///     async fn handle(&mut self, message: Message, _ctx: &ActorContext) -> Result<Bytes, Self::Error> {
///         self.value += 1;
///         Ok(Bytes::copy_from_slice(&message.payload))
///     }
/// }
/// ```
#[async_trait]
pub trait Actor: Send + 'static {
    /// The error type returned by handler and lifecycle methods.
    type Error: Error + Send + Sync + 'static;

    /// Process one dequeued message and produce a reply payload.
    ///
    /// The reply is only delivered if `message` carried a non-`NONE` session;
    /// for fire-and-forget messages the returned payload is discarded.
    async fn handle(&mut self, message: Message, ctx: &ActorContext) -> Result<Bytes, Self::Error>;

    /// Called once, immediately after `start()`, before any message is dequeued.
    ///
    /// An error here prevents the actor from entering its consume loop at all.
    async fn on_start(&mut self, _ctx: &ActorContext) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called once, after the mailbox has been drained, before the task exits.
    async fn on_stop(&mut self, _ctx: &ActorContext) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageType;
    use crate::router::Router;
    use crate::util::{ActorId, NodeId, SessionId};
    use std::fmt;

    #[derive(Debug)]
    struct EchoError;

    impl fmt::Display for EchoError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "echo error")
        }
    }
    impl Error for EchoError {}

    struct Echo {
        handled: u32,
    }

    #[async_trait]
    impl Actor for Echo {
        type Error = EchoError;

        async fn handle(&mut self, message: Message, _ctx: &ActorContext) -> Result<Bytes, Self::Error> {
            self.handled += 1;
            Ok(message.payload)
        }
    }

    #[tokio::test]
    async fn default_lifecycle_hooks_are_noops() {
        let mut actor = Echo { handled: 0 };
        let ctx = ActorContext::new(ActorId::next(), NodeId::new(0), Router::new());

        assert!(actor.on_start(&ctx).await.is_ok());

        let message = Message::new(
            MessageType::Text,
            ActorId::next(),
            ctx.actor_id(),
            SessionId::NONE,
            "ping",
        );
        let reply = actor.handle(message, &ctx).await.unwrap();
        assert_eq!(reply.as_ref(), b"ping");
        assert_eq!(actor.handled, 1);

        assert!(actor.on_stop(&ctx).await.is_ok());
    }
}

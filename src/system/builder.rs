//! Fluent spawn configuration, mirroring [`SystemConfig::builder`]'s pattern
//! one level down: per-actor options instead of system-wide ones.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 3: Internal module imports
use super::actor_system::ActorSystem;
use super::errors::SystemError;
use crate::actor::{Actor, ActorRef, DEFAULT_HANDLER_TIMEOUT};
use crate::mailbox::BackpressureStrategy;

/// Per-actor spawn configuration. `ActorSystem::new_actor`/`new_service` take
/// this directly; [`ActorSpawnBuilder`] exists for the fluent call site.
#[derive(Debug, Clone)]
pub struct SpawnOptions {
    /// Bounded mailbox capacity. `None` uses [`super::SystemConfig::default_mailbox_capacity`].
    pub mailbox_capacity: Option<usize>,
    /// Backpressure applied once the mailbox reaches capacity.
    pub backpressure: BackpressureStrategy,
    /// Per-message handler timeout for this actor.
    pub handler_timeout: Duration,
}

impl Default for SpawnOptions {
    fn default() -> Self {
        Self {
            mailbox_capacity: None,
            backpressure: BackpressureStrategy::Error,
            handler_timeout: DEFAULT_HANDLER_TIMEOUT,
        }
    }
}

/// Fluent builder for spawning an actor or a named service onto an [`ActorSystem`].
///
/// ```rust,ignore
/// let address = system.spawn()
///     .with_mailbox_capacity(500)
///     .spawn(my_actor)
///     .await?;
/// ```
pub struct ActorSpawnBuilder<'a> {
    system: &'a ActorSystem,
    options: SpawnOptions,
}

impl<'a> ActorSpawnBuilder<'a> {
    pub(crate) fn new(system: &'a ActorSystem) -> Self {
        Self {
            system,
            options: SpawnOptions::default(),
        }
    }

    /// Override the bounded mailbox capacity for this actor.
    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.options.mailbox_capacity = Some(capacity);
        self
    }

    /// Override the backpressure strategy for this actor's mailbox.
    pub fn with_backpressure(mut self, strategy: BackpressureStrategy) -> Self {
        self.options.backpressure = strategy;
        self
    }

    /// Override the per-message handler timeout for this actor.
    pub fn with_handler_timeout(mut self, timeout: Duration) -> Self {
        self.options.handler_timeout = timeout;
        self
    }

    /// Spawn `actor` unnamed: routable by [`crate::util::ActorId`] only.
    pub async fn spawn<A: Actor>(self, actor: A) -> Result<ActorRef, SystemError> {
        self.system.new_actor(actor, self.options).await
    }

    /// Spawn `actor` as a named service, registering it in the handle
    /// registry and the service registry under `name`.
    pub async fn spawn_service<A: Actor>(self, name: impl Into<String>, actor: A) -> Result<ActorRef, SystemError> {
        self.system.new_service(name, actor, self.options).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::actor::ActorContext;
    use crate::message::Message;
    use crate::system::SystemConfig;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::fmt;

    #[derive(Debug)]
    struct EchoError;
    impl fmt::Display for EchoError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "echo error")
        }
    }
    impl std::error::Error for EchoError {}

    struct Echo;

    #[async_trait]
    impl Actor for Echo {
        type Error = EchoError;

        async fn handle(&mut self, message: Message, _ctx: &ActorContext) -> Result<Bytes, Self::Error> {
            Ok(message.payload)
        }
    }

    #[tokio::test]
    async fn builder_spawns_with_overrides() {
        let system = ActorSystem::new(SystemConfig::default());
        let actor_ref = system
            .spawn()
            .with_mailbox_capacity(16)
            .with_handler_timeout(Duration::from_secs(5))
            .spawn(Echo)
            .await
            .unwrap();
        assert_eq!(system.actor_count(), 1);
        actor_ref.stop().await;
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn builder_spawns_named_service() {
        let system = ActorSystem::new(SystemConfig::default());
        let _actor_ref = system.spawn().spawn_service("echo", Echo).await.unwrap();
        assert!(system.get_service("echo").is_some());
        system.shutdown().await.unwrap();
    }
}

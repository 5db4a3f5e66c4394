//! Composition root: wires the router, handle registry, session manager,
//! service registry, load balancer, and (optionally) the cluster manager
//! into a single handle.

// Layer 1: Standard library imports
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::info;

// Layer 3: Internal module imports
use super::builder::{ActorSpawnBuilder, SpawnOptions};
use super::config::SystemConfig;
use super::errors::SystemError;
use crate::actor::{Actor, ActorMailbox, ActorRef};
use crate::cluster::ClusterManager;
use crate::handle::{Handle, HandleRegistry};
use crate::mailbox::BoundedMailbox;
use crate::message::{Message, MessageType};
use crate::router::{Router, RouterSender};
use crate::service::{LoadBalanceStrategy, LoadBalancer, ServiceInfo, ServiceQuery, ServiceRegistry, ServiceStatus};
use crate::session::SessionManager;
use crate::util::{ActorId, NodeId, SessionId};

/// Lifecycle state of an [`ActorSystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SystemState {
    /// `new_actor`/`new_service` are accepted.
    Accepting,
    /// `shutdown` is in progress; new-actor requests are rejected.
    Stopping,
    /// Every actor has stopped and background tasks have been cancelled.
    Stopped,
}

struct Inner {
    node_id: NodeId,
    config: SystemConfig,
    router: Router,
    handles: HandleRegistry,
    sessions: SessionManager,
    services: ServiceRegistry,
    load_balancer: LoadBalancer,
    cluster: Option<ClusterManager>,
    actors: DashMap<ActorId, ActorRef>,
    state: RwLock<SystemState>,
    background_cancel: CancellationToken,
}

/// Composition of the mailbox actor runtime, routing, handles, sessions, and
/// service discovery (§4.F), optionally extended with cluster membership and
/// remote calls when [`SystemConfig::cluster`] is set.
///
/// Cheap to clone: every component is itself an `Arc`-backed shared handle.
#[derive(Clone)]
pub struct ActorSystem {
    inner: Arc<Inner>,
}

impl ActorSystem {
    /// Build a system from `config`. Spawns the session sweeper and service
    /// health sweeper immediately; does not bind or dial anything for a
    /// configured cluster until [`ActorSystem::start`].
    pub fn new(config: SystemConfig) -> Self {
        let node_id = config
            .cluster
            .as_ref()
            .map(|cluster| cluster.node_id)
            .unwrap_or_else(|| NodeId::new(0));

        let sessions = SessionManager::new();
        let services = ServiceRegistry::new();
        let background_cancel = CancellationToken::new();

        sessions.spawn_sweeper(crate::session::DEFAULT_SWEEP_INTERVAL, background_cancel.clone());
        services.spawn_health_sweeper(Duration::from_secs(30), background_cancel.clone());

        let cluster = config.cluster.clone().map(ClusterManager::new);

        Self {
            inner: Arc::new(Inner {
                node_id,
                config,
                router: Router::new(),
                handles: HandleRegistry::new(node_id),
                sessions,
                services,
                load_balancer: LoadBalancer::new(),
                cluster,
                actors: DashMap::new(),
                state: RwLock::new(SystemState::Accepting),
                background_cancel,
            }),
        }
    }

    /// This node's identity.
    pub fn node_id(&self) -> NodeId {
        self.inner.node_id
    }

    /// The system configuration this instance was built from.
    pub fn config(&self) -> &SystemConfig {
        &self.inner.config
    }

    /// If cluster-enabled, bind the transport, start background membership
    /// loops, and join any configured seeds.
    ///
    /// A no-op returning `Ok(())` for a single-node system.
    pub async fn start(&self) -> Result<(), SystemError> {
        if let Some(cluster) = &self.inner.cluster {
            cluster.start().await?;
        }
        Ok(())
    }

    /// The cluster manager, if this system is cluster-enabled.
    pub fn cluster(&self) -> Option<&ClusterManager> {
        self.inner.cluster.as_ref()
    }

    /// Number of actors currently spawned (named and unnamed).
    pub fn actor_count(&self) -> usize {
        self.inner.actors.len()
    }

    /// Whether `shutdown` has been called.
    pub fn is_shutting_down(&self) -> bool {
        !matches!(*self.inner.state.read(), SystemState::Accepting)
    }

    /// Begin building a spawn request.
    ///
    /// ```rust,ignore
    /// let actor_ref = system.spawn().with_mailbox_capacity(500).spawn(my_actor).await?;
    /// ```
    pub fn spawn(&self) -> ActorSpawnBuilder<'_> {
        ActorSpawnBuilder::new(self)
    }

    fn check_accepting(&self) -> Result<(), SystemError> {
        if !matches!(*self.inner.state.read(), SystemState::Accepting) {
            return Err(SystemError::ShuttingDown);
        }
        Ok(())
    }

    fn check_actor_limit(&self) -> Result<(), SystemError> {
        if self.inner.config.max_actors == 0 {
            return Ok(());
        }
        let current = self.actor_count();
        if current >= self.inner.config.max_actors {
            return Err(SystemError::ActorLimitExceeded {
                current,
                max: self.inner.config.max_actors,
            });
        }
        Ok(())
    }

    fn build_mailbox(&self, options: &SpawnOptions) -> (ActorMailbox, RouterSender) {
        let capacity = options
            .mailbox_capacity
            .unwrap_or(self.inner.config.default_mailbox_capacity);
        let (mailbox, sender) = BoundedMailbox::with_backpressure(capacity, options.backpressure);
        (ActorMailbox::Bounded(mailbox), RouterSender::from(sender))
    }

    /// Allocate an actor ID, register it in the router and handle registry
    /// unnamed, and start it.
    pub async fn new_actor<A: Actor>(&self, actor: A, options: SpawnOptions) -> Result<ActorRef, SystemError> {
        self.check_accepting()?;
        self.check_actor_limit()?;

        let actor_id = ActorId::next();
        let (mailbox, sender) = self.build_mailbox(&options);

        self.inner.router.register(actor_id, sender.clone())?;
        if let Err(error) = self.inner.handles.allocate(actor_id, None) {
            self.inner.router.unregister(actor_id);
            return Err(error.into());
        }

        let actor_ref = ActorRef::spawn(
            actor,
            actor_id,
            self.inner.node_id,
            mailbox,
            sender,
            self.inner.router.clone(),
            self.inner.sessions.clone(),
            options.handler_timeout,
        );
        actor_ref.start()?;
        self.inner.actors.insert(actor_id, actor_ref.clone());
        info!(%actor_id, "actor spawned");
        Ok(actor_ref)
    }

    /// Like [`ActorSystem::new_actor`], but registered under a unique `name`
    /// in the handle registry and the service registry. Rolls back the
    /// router/handle registration if the name is already taken in either
    /// registry.
    pub async fn new_service<A: Actor>(
        &self,
        name: impl Into<String>,
        actor: A,
        options: SpawnOptions,
    ) -> Result<ActorRef, SystemError> {
        self.check_accepting()?;
        self.check_actor_limit()?;

        let name = name.into();
        let actor_id = ActorId::next();
        let (mailbox, sender) = self.build_mailbox(&options);

        self.inner.router.register(actor_id, sender.clone())?;

        let handle = match self.inner.handles.allocate(actor_id, Some(name.clone())) {
            Ok(handle) => handle,
            Err(error) => {
                self.inner.router.unregister(actor_id);
                return Err(error.into());
            }
        };

        if let Err(error) = self
            .inner
            .services
            .register(ServiceInfo::new(name.clone(), actor_id, self.inner.node_id))
        {
            self.inner.router.unregister(actor_id);
            let _ = self.inner.handles.release(handle.handle_id());
            return Err(error.into());
        }

        let actor_ref = ActorRef::spawn(
            actor,
            actor_id,
            self.inner.node_id,
            mailbox,
            sender,
            self.inner.router.clone(),
            self.inner.sessions.clone(),
            options.handler_timeout,
        );
        actor_ref.start()?;
        self.inner.actors.insert(actor_id, actor_ref.clone());
        info!(%actor_id, %name, "service spawned");
        Ok(actor_ref)
    }

    /// A handle to a spawned actor, by ID.
    pub fn get_actor(&self, actor_id: ActorId) -> Option<ActorRef> {
        self.inner.actors.get(&actor_id).map(|entry| entry.value().clone())
    }

    /// The registered handle for a named service.
    pub fn get_service(&self, name: &str) -> Option<Handle> {
        self.inner.handles.get_by_name(name)
    }

    /// Every registered service instance.
    pub fn list_services(&self) -> Vec<ServiceInfo> {
        self.inner.services.list()
    }

    /// Instances matching `query` (unfiltered by load balancing).
    pub fn discover_services(&self, query: &ServiceQuery) -> Vec<ServiceInfo> {
        self.inner.services.discover(query)
    }

    /// Resolve one healthy instance of `name` via the active load-balancing strategy.
    ///
    /// # Errors
    ///
    /// Returns [`crate::service::ServiceError::NoHealthy`] if no healthy candidate exists.
    pub fn discover_service(&self, name: &str) -> Result<ServiceInfo, SystemError> {
        let query = ServiceQuery {
            name: Some(name.to_string()),
            ..Default::default()
        };
        let candidates = self.inner.services.discover(&query);
        self.inner
            .load_balancer
            .select(name, &candidates)
            .map_err(SystemError::from)
    }

    /// Update a registered service's health status.
    pub fn update_service_health(&self, name: &str, status: ServiceStatus) -> Result<(), SystemError> {
        self.inner.services.update_status(name, status).map_err(SystemError::from)
    }

    /// Change the active load-balancing strategy used by [`ActorSystem::discover_service`].
    pub fn set_load_balance_strategy(&self, strategy: LoadBalanceStrategy) {
        self.inner.load_balancer.set_strategy(strategy);
    }

    /// Send a fire-and-forget message from `from` to `to`.
    pub async fn send(
        &self,
        from: ActorId,
        to: ActorId,
        message_type: MessageType,
        data: impl Into<bytes::Bytes>,
    ) -> Result<(), SystemError> {
        let message = Message::new(message_type, from, to, SessionId::NONE, data);
        self.inner.router.deliver(message).await.map_err(SystemError::from)
    }

    /// Send a fire-and-forget message by resolving both endpoints through the handle registry.
    pub async fn send_by_name(
        &self,
        from_name: &str,
        to_name: &str,
        message_type: MessageType,
        data: impl Into<bytes::Bytes>,
    ) -> Result<(), SystemError> {
        let from = self.inner.handles.resolve(from_name)?.actor_id();
        let to = self.inner.handles.resolve(to_name)?.actor_id();
        self.send(from, to, message_type, data).await
    }

    /// Send a sessioned call from `from` to `to` and await its reply.
    pub async fn call(
        &self,
        from: ActorId,
        to: ActorId,
        message_type: MessageType,
        data: impl Into<bytes::Bytes>,
        timeout: Duration,
    ) -> Result<bytes::Bytes, SystemError> {
        let target = self
            .get_actor(to)
            .ok_or(crate::router::RouterError::ActorNotFound(to))?;
        let message = Message::new(message_type, from, to, SessionId::NONE, data);
        target
            .call(message, timeout, CancellationToken::new())
            .await
            .map_err(SystemError::from)
    }

    /// Like [`ActorSystem::call`], resolving both endpoints through the handle registry.
    pub async fn call_by_name(
        &self,
        from_name: &str,
        to_name: &str,
        message_type: MessageType,
        data: impl Into<bytes::Bytes>,
        timeout: Duration,
    ) -> Result<bytes::Bytes, SystemError> {
        let from = self.inner.handles.resolve(from_name)?.actor_id();
        let to = self.inner.handles.resolve(to_name)?.actor_id();
        self.call(from, to, message_type, data, timeout).await
    }

    /// Transition to stopping, stop every actor, cancel background tasks, and
    /// (if cluster-enabled) leave the cluster. Idempotent: a call after the
    /// first returns immediately.
    pub async fn shutdown(&self) -> Result<(), SystemError> {
        {
            let mut state = self.inner.state.write();
            if !matches!(*state, SystemState::Accepting) {
                return Ok(());
            }
            *state = SystemState::Stopping;
        }

        let shutdown_timeout = self.inner.config.shutdown_timeout;
        let result = timeout(shutdown_timeout, self.stop_all_actors()).await;

        self.inner.background_cancel.cancel();
        if let Some(cluster) = &self.inner.cluster {
            cluster.leave().await;
        }

        *self.inner.state.write() = SystemState::Stopped;

        match result {
            Ok(()) => Ok(()),
            Err(_) => Err(SystemError::ShutdownTimeout(shutdown_timeout)),
        }
    }

    async fn stop_all_actors(&self) {
        let actor_ids: Vec<ActorId> = self.inner.actors.iter().map(|entry| *entry.key()).collect();
        for actor_id in actor_ids {
            if let Some((_, actor_ref)) = self.inner.actors.remove(&actor_id) {
                actor_ref.stop().await;
                self.inner.router.unregister(actor_id);
            }
        }
    }
}

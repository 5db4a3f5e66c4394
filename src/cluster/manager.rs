//! Composes transport, membership, remote calls, and the service registry
//! into the single entry point the actor system drives.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

// Layer 3: Internal module imports
use super::bridge::ClusterBridge;
use super::config::ClusterConfig;
use super::error::ClusterError;
use super::membership::{BroadcastEventSink, ClusterEvent, ClusterHealth, Membership, NodeInfo};
use super::message::{ClusterMessage, ClusterMessageType};
use super::registry::{ClusterRegistry, ServiceInstance};
use super::remote_service::{RemoteCallHandler, RemoteServiceDispatch};
use super::transport::{Transport, TransportHandler};
use crate::util::NodeId;

struct Inner {
    config: ClusterConfig,
    transport: Transport,
    membership: Membership,
    dispatch: Arc<RemoteServiceDispatch>,
    registry: ClusterRegistry,
    bridge: ClusterBridge,
    sink: Arc<BroadcastEventSink>,
    cancel: CancellationToken,
}

/// The cluster extension's single entry point: join/leave, health, remote
/// calls by name, and the local-service registration that makes this node's
/// services reachable from the rest of the cluster.
#[derive(Clone)]
pub struct ClusterManager {
    inner: Arc<Inner>,
}

impl ClusterManager {
    /// Build a manager for `config`. Does not bind, dial, or spawn anything
    /// until [`ClusterManager::start`].
    pub fn new(config: ClusterConfig) -> Self {
        let sink = Arc::new(BroadcastEventSink::new());
        let membership = Membership::new(config.clone(), sink.clone());
        let transport = Transport::new(config.clone());
        let dispatch = Arc::new(RemoteServiceDispatch::new(config.node_id, transport.clone()));
        let registry = ClusterRegistry::new();
        let bridge = ClusterBridge::new(registry.clone(), dispatch.clone());

        Self {
            inner: Arc::new(Inner {
                config,
                transport,
                membership,
                dispatch,
                registry,
                bridge,
                sink,
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// This node's identity.
    pub fn local_node_id(&self) -> NodeId {
        self.inner.config.node_id
    }

    /// Bind the transport, start background loops, and dial any configured
    /// seed nodes (§4.H join protocol).
    pub async fn start(&self) -> Result<(), ClusterError> {
        self.inner
            .transport
            .set_message_handler(Arc::new(self.clone()) as Arc<dyn TransportHandler>);
        self.inner.transport.start(self.inner.cancel.clone()).await?;

        self.inner.membership.spawn_failure_detector(self.inner.cancel.clone());
        self.spawn_heartbeat_loop();
        self.inner.registry.spawn_sync_loop(
            self.inner.config.push_pull_interval,
            self.inner.cancel.clone(),
            {
                let manager = self.clone();
                move |snapshot| manager.broadcast_sync(snapshot)
            },
        );

        for seed in self.inner.config.seed_nodes.clone() {
            match self.inner.transport.connect(&seed).await {
                Ok(peer_id) => {
                    self.inner.membership.record_heartbeat(peer_id, Some(seed.clone()));
                    info!(%seed, %peer_id, "joined cluster via seed");
                }
                Err(error) => warn!(%seed, %error, "failed to connect to seed node"),
            }
        }
        self.inner.membership.activate_local();
        Ok(())
    }

    /// Begin a graceful departure: stop background loops and notify peers.
    pub async fn leave(&self) {
        self.inner.membership.begin_leave();
        let leave = ClusterMessage::new(ClusterMessageType::Leave, self.local_node_id(), None, Vec::new());
        self.inner.transport.broadcast(leave).await;
        self.inner.membership.finalize_left();
        self.inner.cancel.cancel();
        self.inner.transport.stop();
    }

    /// Aggregated cluster health.
    pub fn health(&self) -> ClusterHealth {
        self.inner.membership.health()
    }

    /// Subscribe to membership change events.
    pub fn watch_events(&self) -> broadcast::Receiver<ClusterEvent> {
        self.inner.sink.subscribe()
    }

    /// Make a locally-hosted service reachable from other nodes under `service_id`.
    pub fn register_local_service(&self, service_id: impl Into<String>, handler: Arc<dyn RemoteCallHandler>) {
        let service_id = service_id.into();
        self.inner.dispatch.register(&service_id, handler);
        self.inner.registry.register_service(ServiceInstance {
            name: service_id,
            node_id: self.local_node_id(),
            tags: Vec::new(),
        });
    }

    /// Stop advertising a locally-hosted service.
    pub fn unregister_local_service(&self, service_id: &str) {
        self.inner.dispatch.unregister(service_id);
        self.inner.registry.unregister_service(service_id, self.local_node_id());
    }

    /// Call `method` on `service_id` wherever it is hosted in the cluster, waiting for a reply.
    pub async fn call_service(&self, service_id: &str, method: &str, args: Vec<u8>) -> Result<Vec<u8>, ClusterError> {
        self.inner.bridge.call_by_name(service_id, method, args).await
    }

    /// Send `service_id`/`method` a fire-and-forget call.
    pub async fn send_service(&self, service_id: &str, method: &str, args: Vec<u8>) -> Result<(), ClusterError> {
        self.inner.bridge.send_by_name(service_id, method, args).await
    }

    /// Instances of `service_id` known anywhere in the cluster.
    pub fn discover_service(&self, service_id: &str) -> Vec<ServiceInstance> {
        self.inner.registry.discover_service(service_id)
    }

    fn spawn_heartbeat_loop(&self) {
        let manager = self.clone();
        let interval = self.inner.config.heartbeat_interval;
        let cancel = self.inner.cancel.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let heartbeat = ClusterMessage::new(
                            ClusterMessageType::Heartbeat,
                            manager.local_node_id(),
                            None,
                            Vec::new(),
                        );
                        manager.inner.transport.broadcast(heartbeat).await;
                    }
                }
            }
        });
    }

    fn broadcast_sync(&self, snapshot: std::collections::HashMap<String, Vec<ServiceInstance>>) {
        let manager = self.clone();
        tokio::spawn(async move {
            let payload = match serde_json::to_vec(&snapshot.into_iter().collect::<Vec<_>>()) {
                Ok(bytes) => bytes,
                Err(error) => {
                    warn!(%error, "failed to encode registry sync snapshot");
                    return;
                }
            };
            let message = ClusterMessage::new(ClusterMessageType::Sync, manager.local_node_id(), None, payload);
            manager.inner.transport.broadcast(message).await;
        });
    }
}

#[async_trait]
impl TransportHandler for ClusterManager {
    async fn on_message(&self, from: NodeId, message: ClusterMessage) {
        match message.message_type {
            ClusterMessageType::Heartbeat => {
                self.inner.membership.record_heartbeat(from, None);
            }
            ClusterMessageType::Leave => {
                self.inner.membership.remove_peer_as_left(from);
                self.inner.registry.remove_node(from);
            }
            ClusterMessageType::Sync => {
                match serde_json::from_slice::<Vec<(String, Vec<ServiceInstance>)>>(&message.payload) {
                    Ok(entries) => self.inner.registry.merge_snapshot(entries.into_iter().collect()),
                    Err(error) => warn!(%error, "failed to decode registry sync snapshot"),
                }
            }
            ClusterMessageType::ActorCall | ClusterMessageType::ActorReply => {
                self.inner.dispatch.dispatch_inbound(message).await;
            }
            ClusterMessageType::Join => {}
        }
    }

    async fn on_connected(&self, node_id: NodeId) {
        self.inner.membership.record_heartbeat(node_id, None);
    }

    async fn on_disconnected(&self, node_id: NodeId, reason: String) {
        warn!(%node_id, %reason, "cluster connection lost");
        self.inner.dispatch.cancel_pending_for(node_id);
    }

    fn join_snapshot(&self) -> Vec<u8> {
        serde_json::to_vec(&self.inner.membership.snapshot()).unwrap_or_default()
    }

    async fn on_join_snapshot(&self, peer_id: NodeId, snapshot: Vec<u8>) {
        if snapshot.is_empty() {
            return;
        }
        match serde_json::from_slice::<Vec<NodeInfo>>(&snapshot) {
            Ok(nodes) => self.inner.membership.merge_snapshot(nodes),
            Err(error) => warn!(%peer_id, %error, "failed to decode join snapshot"),
        }
    }
}

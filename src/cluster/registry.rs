//! Cluster-wide service registry: which nodes host which named services.
//!
//! Distinct from [`crate::service::ServiceRegistry`], which tracks local
//! actor-backed services on this node only. This registry tracks, per
//! service name, the set of `(node, remote identifier)` instances known
//! anywhere in the cluster, converging via periodic full-snapshot sync.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

// Layer 3: Internal module imports
use crate::util::NodeId;

/// Default bounded capacity for a [`ClusterRegistry::watch`] subscription.
pub const DEFAULT_WATCH_CAPACITY: usize = 32;

/// One remote service instance known to the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInstance {
    /// Service name, e.g. `"worker-3"`.
    pub name: String,
    /// Hosting node.
    pub node_id: NodeId,
    /// Tags attached at registration (mirrors [`crate::service::ServiceInfo::tags`]).
    pub tags: Vec<String>,
}

/// Kind of change published by [`ClusterRegistry::watch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterServiceEventKind {
    /// A service instance registered.
    Registered,
    /// A service instance unregistered.
    Unregistered,
}

/// A cluster-wide service registry change.
#[derive(Debug, Clone)]
pub struct ClusterServiceEvent {
    /// What changed.
    pub kind: ClusterServiceEventKind,
    /// The affected instance.
    pub instance: ServiceInstance,
    /// When the change was applied.
    pub timestamp: DateTime<Utc>,
}

/// Cluster-wide, eventually-consistent map from service name to hosting instances.
///
/// Cheap to clone: backed by `Arc`-wrapped maps, matching
/// [`crate::service::ServiceRegistry`]'s shared-handle convention.
#[derive(Clone)]
pub struct ClusterRegistry {
    instances: Arc<DashMap<String, Vec<ServiceInstance>>>,
    watchers: Arc<DashMap<String, Vec<mpsc::Sender<ClusterServiceEvent>>>>,
}

impl ClusterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            instances: Arc::new(DashMap::new()),
            watchers: Arc::new(DashMap::new()),
        }
    }

    /// Register or update (by node) one instance of `name`.
    pub fn register_service(&self, instance: ServiceInstance) {
        let mut entry = self.instances.entry(instance.name.clone()).or_default();
        if let Some(existing) = entry.iter_mut().find(|existing| existing.node_id == instance.node_id) {
            *existing = instance.clone();
        } else {
            entry.push(instance.clone());
        }
        drop(entry);
        self.publish(instance.name.clone(), ClusterServiceEventKind::Registered, instance);
    }

    /// Remove the instance of `name` hosted on `node_id`, if any.
    pub fn unregister_service(&self, name: &str, node_id: NodeId) {
        let removed = self.instances.get_mut(name).and_then(|mut entry| {
            let position = entry.iter().position(|instance| instance.node_id == node_id)?;
            Some(entry.remove(position))
        });
        if let Some(instance) = removed {
            self.publish(name.to_string(), ClusterServiceEventKind::Unregistered, instance);
        }
    }

    /// Remove every instance hosted on `node_id` (used when a node is declared failed).
    pub fn remove_node(&self, node_id: NodeId) {
        let names: Vec<String> = self.instances.iter().map(|entry| entry.key().clone()).collect();
        for name in names {
            self.unregister_service(&name, node_id);
        }
    }

    /// Snapshot the instances currently registered for `name`.
    pub fn discover_service(&self, name: &str) -> Vec<ServiceInstance> {
        self.instances.get(name).map(|entry| entry.clone()).unwrap_or_default()
    }

    /// A full snapshot of every name to its instances, used for push/pull sync.
    pub fn full_snapshot(&self) -> HashMap<String, Vec<ServiceInstance>> {
        self.instances
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Merge a remote node's snapshot into the local table (last-writer-wins per node).
    pub fn merge_snapshot(&self, snapshot: HashMap<String, Vec<ServiceInstance>>) {
        for (name, instances) in snapshot {
            for instance in instances {
                self.register_service(instance);
            }
            let _ = name;
        }
    }

    /// Subscribe to registration/unregistration events for `name`.
    ///
    /// The channel closes when `cancel` is cancelled; the caller is expected to
    /// drop its receiving end at that point.
    pub fn watch(&self, name: impl Into<String>, cancel: CancellationToken) -> mpsc::Receiver<ClusterServiceEvent> {
        let name = name.into();
        let (tx, rx) = mpsc::channel(DEFAULT_WATCH_CAPACITY);
        self.watchers.entry(name.clone()).or_default().push(tx);
        tokio::spawn(async move {
            cancel.cancelled().await;
            debug!(%name, "registry watch cancelled");
        });
        rx
    }

    fn publish(&self, name: String, kind: ClusterServiceEventKind, instance: ServiceInstance) {
        if let Some(mut senders) = self.watchers.get_mut(&name) {
            let event = ClusterServiceEvent {
                kind,
                instance,
                timestamp: Utc::now(),
            };
            senders.retain(|tx| tx.try_send(event.clone()).is_ok() || !tx.is_closed());
        }
    }

    /// Spawn the periodic full-snapshot broadcast loop (§4.J push/pull sync).
    ///
    /// `publish` is invoked on every tick with the current [`ClusterRegistry::full_snapshot`];
    /// the caller wires it to the transport broadcast.
    pub fn spawn_sync_loop<F>(
        &self,
        interval: std::time::Duration,
        cancel: CancellationToken,
        publish: F,
    ) -> tokio::task::JoinHandle<()>
    where
        F: Fn(HashMap<String, Vec<ServiceInstance>>) + Send + Sync + 'static,
    {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        publish(registry.full_snapshot());
                    }
                }
            }
        })
    }
}

impl Default for ClusterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn instance(name: &str, node: u8) -> ServiceInstance {
        ServiceInstance {
            name: name.to_string(),
            node_id: NodeId::new(node),
            tags: Vec::new(),
        }
    }

    #[test]
    fn register_and_discover() {
        let registry = ClusterRegistry::new();
        registry.register_service(instance("worker", 1));
        registry.register_service(instance("worker", 2));
        assert_eq!(registry.discover_service("worker").len(), 2);
    }

    #[test]
    fn re_register_same_node_updates_in_place() {
        let registry = ClusterRegistry::new();
        registry.register_service(instance("worker", 1));
        let mut updated = instance("worker", 1);
        updated.tags.push("role:leader".to_string());
        registry.register_service(updated);
        let instances = registry.discover_service("worker");
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].tags, vec!["role:leader".to_string()]);
    }

    #[test]
    fn unregister_removes_only_that_node() {
        let registry = ClusterRegistry::new();
        registry.register_service(instance("worker", 1));
        registry.register_service(instance("worker", 2));
        registry.unregister_service("worker", NodeId::new(1));
        let instances = registry.discover_service("worker");
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].node_id, NodeId::new(2));
    }

    #[test]
    fn remove_node_clears_all_its_services() {
        let registry = ClusterRegistry::new();
        registry.register_service(instance("worker", 1));
        registry.register_service(instance("scheduler", 1));
        registry.remove_node(NodeId::new(1));
        assert!(registry.discover_service("worker").is_empty());
        assert!(registry.discover_service("scheduler").is_empty());
    }

    #[test]
    fn merge_snapshot_adds_remote_instances() {
        let registry = ClusterRegistry::new();
        let mut snapshot = HashMap::new();
        snapshot.insert("worker".to_string(), vec![instance("worker", 9)]);
        registry.merge_snapshot(snapshot);
        assert_eq!(registry.discover_service("worker").len(), 1);
    }
}

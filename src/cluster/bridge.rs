//! Routes a call addressed by service name to whichever node hosts it.

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use dashmap::DashMap;

// Layer 3: Internal module imports
use super::error::ClusterError;
use super::registry::ClusterRegistry;
use super::remote_service::RemoteServiceDispatch;

/// Bridges [`ClusterRegistry`] name lookups to [`RemoteServiceDispatch`] calls.
///
/// Remote instances carry no local health metrics, so this performs its own
/// round-robin rotation across cluster-registry candidates rather than
/// sharing [`crate::service::LoadBalancer`], which assumes locally-observed
/// [`crate::service::ServiceMetrics`].
pub struct ClusterBridge {
    registry: ClusterRegistry,
    dispatch: Arc<RemoteServiceDispatch>,
    counters: DashMap<String, AtomicUsize>,
}

impl ClusterBridge {
    /// Build a bridge over `registry` and `dispatch`.
    pub fn new(registry: ClusterRegistry, dispatch: Arc<RemoteServiceDispatch>) -> Self {
        Self {
            registry,
            dispatch,
            counters: DashMap::new(),
        }
    }

    /// Invoke `method` on `name`, round-robining across every cluster-wide
    /// instance, and wait for the remote reply.
    pub async fn call_by_name(&self, name: &str, method: &str, args: Vec<u8>) -> Result<Vec<u8>, ClusterError> {
        let node_id = self.pick_instance(name)?;
        self.dispatch.call(node_id, name, method, args).await
    }

    /// Send `name`/`method` a fire-and-forget call with no reply expected.
    pub async fn send_by_name(&self, name: &str, method: &str, args: Vec<u8>) -> Result<(), ClusterError> {
        let node_id = self.pick_instance(name)?;
        self.dispatch.send(node_id, name, method, args).await
    }

    fn pick_instance(&self, name: &str) -> Result<crate::util::NodeId, ClusterError> {
        let instances = self.registry.discover_service(name);
        if instances.is_empty() {
            return Err(ClusterError::ServiceNotFound(name.to_string()));
        }
        let counter = self.counters.entry(name.to_string()).or_insert_with(|| AtomicUsize::new(0));
        let index = counter.fetch_add(1, Ordering::Relaxed) % instances.len();
        Ok(instances[index].node_id)
    }
}

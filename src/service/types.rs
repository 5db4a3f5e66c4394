//! Service registration records and discovery queries.

// Layer 1: Standard library imports
use std::collections::{HashMap, HashSet};
use std::time::Duration;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use serde::Serialize;

// Layer 3: Internal module imports
use crate::util::{ActorId, NodeId};

/// Health of a registered service instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceStatus {
    /// Passing health checks; eligible for discovery by default.
    Healthy,
    /// Failing health checks; excluded from [`LoadBalancer`](super::LoadBalancer) selection.
    Unhealthy,
    /// Registered but not yet health-checked.
    Unknown,
}

/// Rolling counters a caller reports back to the registry for a service
/// instance, consulted by [`super::LoadBalanceStrategy::LeastConnections`]
/// and [`super::LoadBalanceStrategy::WeightedRoundRobin`].
#[derive(Debug, Clone)]
pub struct ServiceMetrics {
    /// Requests dispatched to this instance since registration.
    pub total_requests: u64,
    /// Of those, the number that ended in an error.
    pub failed_requests: u64,
    /// In-flight calls currently outstanding against this instance.
    pub active_connections: u64,
    /// Exponentially-averaged handler latency, in milliseconds.
    pub avg_response_time_ms: f64,
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self {
            total_requests: 0,
            failed_requests: 0,
            active_connections: 0,
            avg_response_time_ms: 1.0,
        }
    }
}

/// One registered service instance.
///
/// The registry keys entries by [`ServiceInfo::name`], which is unique per
/// instance (e.g. `"worker-3"`); `tags` is how multiple instances of the same
/// logical service (e.g. `"role:worker"`) are grouped for discovery.
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    /// Unique registration key.
    pub name: String,
    /// The actor backing this service instance.
    pub actor_id: ActorId,
    /// The node the actor runs on.
    pub node_id: NodeId,
    /// Free-form grouping labels (e.g. `"role:worker"`, `"region:us"`).
    pub tags: HashSet<String>,
    /// Free-form key/value metadata (version strings, build ids, ...).
    pub metadata: HashMap<String, String>,
    /// Current health.
    pub status: ServiceStatus,
    /// How often the health sweeper should refresh this instance.
    pub health_check_interval: Duration,
    /// When this instance was registered.
    pub registered_at: DateTime<Utc>,
    /// When this instance's health was last refreshed.
    pub last_health_check: DateTime<Utc>,
}

impl ServiceInfo {
    /// Build a new, healthy-by-default registration for `actor_id` on `node_id`.
    pub fn new(name: impl Into<String>, actor_id: ActorId, node_id: NodeId) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            actor_id,
            node_id,
            tags: HashSet::new(),
            metadata: HashMap::new(),
            status: ServiceStatus::Unknown,
            health_check_interval: Duration::from_secs(30),
            registered_at: now,
            last_health_check: now,
        }
    }

    /// Builder-style tag attachment.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Builder-style metadata attachment.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Filter used by [`super::ServiceRegistry::discover`].
///
/// An empty query (the `Default`) matches every registered instance.
#[derive(Debug, Clone, Default)]
pub struct ServiceQuery {
    /// Exact-match on [`ServiceInfo::name`], if set.
    pub name: Option<String>,
    /// Every tag here must be present on the candidate.
    pub tags: HashSet<String>,
    /// If non-empty, the candidate's status must be one of these.
    pub statuses: HashSet<ServiceStatus>,
    /// Every key/value pair here must be present in the candidate's metadata.
    pub metadata: HashMap<String, String>,
    /// Restrict to instances on this node.
    pub node_id: Option<NodeId>,
    /// Cap the number of matches returned by `discover`.
    pub limit: Option<usize>,
}

impl ServiceQuery {
    /// Whether `info` satisfies every constraint set on this query.
    pub fn matches(&self, info: &ServiceInfo) -> bool {
        if let Some(name) = &self.name {
            if name != &info.name {
                return false;
            }
        }
        if let Some(node_id) = self.node_id {
            if node_id != info.node_id {
                return false;
            }
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&info.status) {
            return false;
        }
        if !self.tags.is_subset(&info.tags) {
            return false;
        }
        self.metadata
            .iter()
            .all(|(key, value)| info.metadata.get(key) == Some(value))
    }
}

/// Kind of change a [`super::ServiceRegistry::watch`] subscriber is notified of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ServiceEventKind {
    /// A new instance was registered.
    Registered,
    /// An instance was removed.
    Unregistered,
    /// `update_status` changed an instance's health.
    StatusChanged,
    /// `update_metadata` changed an instance's metadata.
    MetadataChanged,
}

/// A change notification broadcast to every [`super::ServiceRegistry::watch`] subscriber.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceEvent {
    /// What changed.
    pub kind: ServiceEventKind,
    /// The affected instance's registration key.
    pub name: String,
    /// When the change was applied.
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_matches_on_tags_and_status() {
        let info = ServiceInfo::new("worker-1", ActorId::next(), NodeId::new(0))
            .with_tag("role:worker")
            .with_metadata("version", "1.2.0");
        let mut info = info;
        info.status = ServiceStatus::Healthy;

        let query = ServiceQuery {
            tags: HashSet::from(["role:worker".to_string()]),
            statuses: HashSet::from([ServiceStatus::Healthy]),
            ..Default::default()
        };
        assert!(query.matches(&info));

        let query = ServiceQuery {
            tags: HashSet::from(["role:scheduler".to_string()]),
            ..Default::default()
        };
        assert!(!query.matches(&info));
    }

    #[test]
    fn empty_query_matches_everything() {
        let info = ServiceInfo::new("worker-1", ActorId::next(), NodeId::new(0));
        assert!(ServiceQuery::default().matches(&info));
    }

    #[test]
    fn query_metadata_requires_exact_value() {
        let info = ServiceInfo::new("worker-1", ActorId::next(), NodeId::new(0))
            .with_metadata("version", "1.2.0");
        let query = ServiceQuery {
            metadata: HashMap::from([("version".to_string(), "1.3.0".to_string())]),
            ..Default::default()
        };
        assert!(!query.matches(&info));
    }
}

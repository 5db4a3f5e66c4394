//! Node state, failure detection, and deterministic leader election.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

// Layer 3: Internal module imports
use super::config::ClusterConfig;
use crate::util::NodeId;

/// Default capacity of a [`BroadcastEventSink`]'s channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// A node's position in the membership state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    /// Dialing or awaiting a join reply.
    Joining,
    /// Participating normally.
    Active,
    /// Heartbeat overdue; not yet declared failed.
    Suspected,
    /// Heartbeat overdue past the second detection window.
    Failed,
    /// Broadcasting a graceful leave.
    Leaving,
    /// Finished leaving.
    Left,
}

/// One node's entry in the membership table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfo {
    /// This node's identity.
    pub node_id: NodeId,
    /// `host:port` the transport dials to reach it.
    pub address: String,
    /// Current state.
    pub state: NodeState,
    /// Last time a heartbeat (or the initial join) was recorded for it.
    pub last_seen: DateTime<Utc>,
}

impl NodeInfo {
    /// A freshly-joining node entry.
    pub fn new(node_id: NodeId, address: impl Into<String>) -> Self {
        Self {
            node_id,
            address: address.into(),
            state: NodeState::Joining,
            last_seen: Utc::now(),
        }
    }
}

/// Kind of change published on a [`ClusterEventSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClusterEventKind {
    /// A node completed its join handshake.
    NodeJoined,
    /// A node left gracefully.
    NodeLeft,
    /// A node was declared failed after exceeding the suspicion window.
    NodeFailed,
    /// A previously-suspected node sent a heartbeat again.
    NodeRecovered,
    /// The deterministic leader-election rule picked a new winner.
    LeaderElected,
    /// Reserved: declared but never emitted (§9 Open Questions).
    PartitionDetected,
    /// Reserved: declared but never emitted (§9 Open Questions).
    PartitionHealed,
}

/// A membership change notification.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterEvent {
    /// What changed.
    pub kind: ClusterEventKind,
    /// The node the change concerns (the new leader, for `LeaderElected`).
    pub node_id: NodeId,
    /// When the change was applied.
    pub timestamp: DateTime<Utc>,
    /// Free-form event payload (e.g. an error message for a failed connection).
    pub data: HashMap<String, String>,
}

impl ClusterEvent {
    fn new(kind: ClusterEventKind, node_id: NodeId) -> Self {
        Self {
            kind,
            node_id,
            timestamp: Utc::now(),
            data: HashMap::new(),
        }
    }
}

/// Where [`Membership`] and the background loops publish state changes.
///
/// Injected at construction so nodes and loops never hold a back-pointer into
/// their containing [`super::manager::ClusterManager`] (breaks the cyclic
/// graph the source used; generalizes the teacher's `MessageBroker<M>`
/// dependency-injection pattern to the cluster layer).
pub trait ClusterEventSink: Send + Sync {
    /// Publish one event. Must not block or panic the caller.
    fn emit(&self, event: ClusterEvent);
}

type Listener = Arc<dyn Fn(&ClusterEvent) + Send + Sync>;

/// Default [`ClusterEventSink`]: a bounded broadcast channel plus a listener
/// registry where each listener invocation is failure-isolated.
pub struct BroadcastEventSink {
    tx: broadcast::Sender<ClusterEvent>,
    listeners: RwLock<Vec<Listener>>,
}

impl BroadcastEventSink {
    /// Build a sink with the default channel capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Build a sink whose channel buffers `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Subscribe to the event channel. Lagging subscribers drop events, per §5.
    pub fn subscribe(&self) -> broadcast::Receiver<ClusterEvent> {
        self.tx.subscribe()
    }

    /// Register a synchronous listener, invoked (isolated from panics) on every event.
    pub fn add_listener(&self, listener: Listener) {
        self.listeners.write().push(listener);
    }
}

impl Default for BroadcastEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterEventSink for BroadcastEventSink {
    fn emit(&self, event: ClusterEvent) {
        let _ = self.tx.send(event.clone());
        for listener in self.listeners.read().iter() {
            let listener = Arc::clone(listener);
            let event = event.clone();
            if catch_unwind(AssertUnwindSafe(|| listener(&event))).is_err() {
                warn!("cluster event listener panicked");
            }
        }
    }
}

/// Aggregated health, matching the `health(ctx)` data named in §6's lifecycle interface.
#[derive(Debug, Clone, Default)]
pub struct ClusterHealth {
    /// Nodes the local node knows about, including itself.
    pub total_nodes: usize,
    /// Nodes currently active.
    pub active_nodes: usize,
    /// Nodes currently suspected.
    pub suspected_nodes: usize,
    /// Nodes declared failed.
    pub failed_nodes: usize,
    /// Whether a leader is currently elected.
    pub has_leader: bool,
    /// The current leader, if any.
    pub leader_id: Option<NodeId>,
    /// Reserved; fixed at 1 (§9 Open Questions: partition detection unimplemented).
    pub partition_count: u32,
}

impl ClusterHealth {
    /// Single node: active with a leader. Multi-node: leader plus an active majority.
    pub fn is_healthy(&self) -> bool {
        if !self.has_leader {
            return false;
        }
        if self.total_nodes <= 1 {
            self.active_nodes >= 1
        } else {
            self.active_nodes * 2 > self.total_nodes
        }
    }
}

struct Inner {
    local: RwLock<NodeInfo>,
    peers: DashMap<NodeId, NodeInfo>,
    leader: RwLock<Option<NodeId>>,
    config: ClusterConfig,
    sink: Arc<dyn ClusterEventSink>,
}

/// The local node's view of cluster membership.
///
/// Cheap to clone: all state is shared via `Arc`.
#[derive(Clone)]
pub struct Membership {
    inner: Arc<Inner>,
}

impl Membership {
    /// Build membership state for the local node described by `config`, joining as `Joining`.
    pub fn new(config: ClusterConfig, sink: Arc<dyn ClusterEventSink>) -> Self {
        let address = format!("{}:{}", config.bind_address, config.bind_port);
        let local = NodeInfo::new(config.node_id, address);
        Self {
            inner: Arc::new(Inner {
                local: RwLock::new(local),
                peers: DashMap::new(),
                leader: RwLock::new(None),
                config,
                sink,
            }),
        }
    }

    /// The local node's identity.
    pub fn local_node_id(&self) -> NodeId {
        self.inner.local.read().node_id
    }

    /// The configuration this membership view was built from.
    pub fn config(&self) -> &ClusterConfig {
        &self.inner.config
    }

    /// A snapshot of this node's full `NodeInfo` list (local plus every known peer),
    /// used as the payload of a join reply (§4.H).
    pub fn snapshot(&self) -> Vec<NodeInfo> {
        let mut nodes = vec![self.inner.local.read().clone()];
        nodes.extend(self.inner.peers.iter().map(|entry| entry.value().clone()));
        nodes
    }

    /// Mark the local node active. If no seeds are configured, elect self as leader;
    /// otherwise the caller (the manager) is expected to follow up with [`Membership::merge_snapshot`]
    /// once a seed's join reply arrives.
    pub fn activate_local(&self) {
        self.inner.local.write().state = NodeState::Active;
        if self.inner.config.seed_nodes.is_empty() {
            self.elect_self();
        } else {
            self.reevaluate_leader();
        }
    }

    fn elect_self(&self) {
        let local_id = self.local_node_id();
        let mut leader = self.inner.leader.write();
        if *leader != Some(local_id) {
            *leader = Some(local_id);
            drop(leader);
            info!(node_id = %local_id, "elected self as leader");
            self.inner
                .sink
                .emit(ClusterEvent::new(ClusterEventKind::LeaderElected, local_id));
        }
    }

    /// Merge a seed's `NodeInfo` snapshot into the local table, then go active (§4.H join protocol).
    pub fn merge_snapshot(&self, nodes: Vec<NodeInfo>) {
        let local_id = self.local_node_id();
        for node in nodes {
            if node.node_id != local_id {
                self.inner.peers.insert(node.node_id, node);
            }
        }
        self.inner.local.write().state = NodeState::Active;
        self.reevaluate_leader();
    }

    /// Record a heartbeat (or join) from `node_id`, reviving it from `Suspected` if needed.
    pub fn record_heartbeat(&self, node_id: NodeId, address: Option<String>) {
        if node_id == self.local_node_id() {
            return;
        }
        let now = Utc::now();
        let mut was_suspected = false;
        let mut just_joined = false;
        self.inner
            .peers
            .entry(node_id)
            .and_modify(|entry| {
                was_suspected = entry.state == NodeState::Suspected;
                entry.state = NodeState::Active;
                entry.last_seen = now;
                if let Some(addr) = &address {
                    entry.address = addr.clone();
                }
            })
            .or_insert_with(|| {
                just_joined = true;
                let mut info = NodeInfo::new(node_id, address.clone().unwrap_or_default());
                info.state = NodeState::Active;
                info.last_seen = now;
                info
            });

        if just_joined {
            info!(node_id = %node_id, "node joined");
            self.inner.sink.emit(ClusterEvent::new(ClusterEventKind::NodeJoined, node_id));
        } else if was_suspected {
            info!(node_id = %node_id, "node recovered");
            self.inner
                .sink
                .emit(ClusterEvent::new(ClusterEventKind::NodeRecovered, node_id));
        }
        self.reevaluate_leader();
    }

    /// Compare every peer's `last_seen` against the configured suspicion windows,
    /// moving `active -> suspected -> failed` as deadlines pass. Returns how many
    /// peers changed state.
    pub fn sweep_failure_detection(&self) -> usize {
        let now = Utc::now();
        let suspect_after = self
            .inner
            .config
            .suspicion_timeout
            .mul_f64(f64::from(self.inner.config.suspicion_multiplier));
        let fail_after = suspect_after + suspect_after;

        let mut to_suspect = Vec::new();
        let mut to_fail = Vec::new();
        for entry in self.inner.peers.iter() {
            let elapsed = now
                .signed_duration_since(entry.last_seen)
                .to_std()
                .unwrap_or(Duration::ZERO);
            match entry.state {
                NodeState::Active if elapsed >= suspect_after => to_suspect.push(*entry.key()),
                NodeState::Suspected if elapsed >= fail_after => to_fail.push(*entry.key()),
                _ => {}
            }
        }

        for node_id in &to_suspect {
            if let Some(mut entry) = self.inner.peers.get_mut(node_id) {
                entry.state = NodeState::Suspected;
            }
            warn!(node_id = %node_id, "node suspected");
        }
        for node_id in &to_fail {
            if let Some(mut entry) = self.inner.peers.get_mut(node_id) {
                entry.state = NodeState::Failed;
            }
            info!(node_id = %node_id, "node failed");
            self.inner
                .sink
                .emit(ClusterEvent::new(ClusterEventKind::NodeFailed, *node_id));
        }
        if !to_fail.is_empty() {
            self.reevaluate_leader();
        }
        to_suspect.len() + to_fail.len()
    }

    fn reevaluate_leader(&self) {
        let local_id = self.local_node_id();
        let local_active = self.inner.local.read().state == NodeState::Active;
        let mut candidates: Vec<NodeId> = self
            .inner
            .peers
            .iter()
            .filter(|entry| entry.state == NodeState::Active)
            .map(|entry| *entry.key())
            .collect();
        if local_active {
            candidates.push(local_id);
        }
        let winner = candidates.into_iter().min();

        let mut leader = self.inner.leader.write();
        if *leader != winner {
            *leader = winner;
            drop(leader);
            if let Some(node_id) = winner {
                info!(node_id = %node_id, "leader elected");
                self.inner
                    .sink
                    .emit(ClusterEvent::new(ClusterEventKind::LeaderElected, node_id));
            }
        }
    }

    /// Whether the local node is the elected leader.
    pub fn is_leader(&self) -> bool {
        *self.inner.leader.read() == Some(self.local_node_id())
    }

    /// The currently-elected leader, if any.
    pub fn leader(&self) -> Option<NodeId> {
        *self.inner.leader.read()
    }

    /// Node IDs currently active (excluding the local node).
    pub fn active_peer_ids(&self) -> Vec<NodeId> {
        self.inner
            .peers
            .iter()
            .filter(|entry| entry.state == NodeState::Active)
            .map(|entry| *entry.key())
            .collect()
    }

    /// Look up one peer's address for dialing (§4.G: resolve through the membership table).
    pub fn peer_address(&self, node_id: NodeId) -> Option<String> {
        self.inner.peers.get(&node_id).map(|entry| entry.address.clone())
    }

    /// Begin a graceful departure: mark the local node `Leaving`.
    pub fn begin_leave(&self) {
        self.inner.local.write().state = NodeState::Leaving;
    }

    /// Finalize a graceful departure: mark the local node `Left` and emit `NodeLeft`.
    pub fn finalize_left(&self) {
        self.inner.local.write().state = NodeState::Left;
        let local_id = self.local_node_id();
        info!(node_id = %local_id, "node left");
        self.inner.sink.emit(ClusterEvent::new(ClusterEventKind::NodeLeft, local_id));
    }

    /// Remove a peer that announced a graceful leave.
    pub fn remove_peer_as_left(&self, node_id: NodeId) {
        self.inner.peers.remove(&node_id);
        info!(node_id = %node_id, "node left");
        self.inner.sink.emit(ClusterEvent::new(ClusterEventKind::NodeLeft, node_id));
        self.reevaluate_leader();
    }

    /// Aggregated health snapshot.
    pub fn health(&self) -> ClusterHealth {
        let local_state = self.inner.local.read().state;
        let mut active = usize::from(local_state == NodeState::Active);
        let mut suspected = 0;
        let mut failed = 0;
        for entry in self.inner.peers.iter() {
            match entry.state {
                NodeState::Active => active += 1,
                NodeState::Suspected => suspected += 1,
                NodeState::Failed => failed += 1,
                _ => {}
            }
        }
        let leader_id = self.leader();
        ClusterHealth {
            total_nodes: 1 + self.inner.peers.len(),
            active_nodes: active,
            suspected_nodes: suspected,
            failed_nodes: failed,
            has_leader: leader_id.is_some(),
            leader_id,
            partition_count: 1,
        }
    }

    /// Spawn the background failure-detection loop, ticking at `suspicion_timeout`.
    pub fn spawn_failure_detector(&self, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        let membership = self.clone();
        let tick = self.inner.config.suspicion_timeout;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(tick);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("failure detector stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        membership.sweep_failure_detection();
                    }
                }
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn membership(node_id: u8, seeds: Vec<String>) -> (Membership, Arc<BroadcastEventSink>) {
        let sink = Arc::new(BroadcastEventSink::new());
        let config = ClusterConfig::builder()
            .with_node_id(NodeId::new(node_id))
            .with_seed_nodes(seeds)
            .build()
            .unwrap();
        (Membership::new(config, sink.clone()), sink)
    }

    #[test]
    fn single_node_elects_self_leader() {
        let (membership, _sink) = membership(0, Vec::new());
        membership.activate_local();
        assert!(membership.is_leader());
        assert!(membership.health().is_healthy());
    }

    #[test]
    fn lowest_node_id_wins_leadership() {
        let (membership, _sink) = membership(5, vec!["seed:1".to_string()]);
        membership.activate_local();
        membership.record_heartbeat(NodeId::new(1), Some("127.0.0.1:1".to_string()));
        assert_eq!(membership.leader(), Some(NodeId::new(1)));
        assert!(!membership.is_leader());
    }

    #[test]
    fn heartbeat_revives_suspected_peer() {
        let (membership, sink) = membership(0, vec!["seed:1".to_string()]);
        membership.activate_local();
        membership.record_heartbeat(NodeId::new(1), None);
        let mut rx = sink.subscribe();
        let _ = rx.try_recv();

        if let Some(mut entry) = membership.inner.peers.get_mut(&NodeId::new(1)) {
            entry.state = NodeState::Suspected;
            entry.last_seen = Utc::now() - chrono::Duration::seconds(60);
        }
        membership.record_heartbeat(NodeId::new(1), None);
        let event = rx.try_recv().unwrap();
        assert_eq!(event.kind, ClusterEventKind::NodeRecovered);
    }

    #[test]
    fn failure_detection_marks_stale_peer_suspected_then_failed() {
        let (membership, _sink) = membership(0, vec!["seed:1".to_string()]);
        membership.activate_local();
        membership.record_heartbeat(NodeId::new(1), None);
        if let Some(mut entry) = membership.inner.peers.get_mut(&NodeId::new(1)) {
            entry.last_seen = Utc::now() - chrono::Duration::seconds(20);
        }
        let changed = membership.sweep_failure_detection();
        assert_eq!(changed, 1);
        assert_eq!(
            membership.inner.peers.get(&NodeId::new(1)).unwrap().state,
            NodeState::Suspected
        );

        if let Some(mut entry) = membership.inner.peers.get_mut(&NodeId::new(1)) {
            entry.last_seen = Utc::now() - chrono::Duration::seconds(60);
        }
        let changed = membership.sweep_failure_detection();
        assert_eq!(changed, 1);
        assert_eq!(
            membership.inner.peers.get(&NodeId::new(1)).unwrap().state,
            NodeState::Failed
        );
    }

    #[test]
    fn multi_node_health_requires_active_majority() {
        let (membership, _sink) = membership(0, vec!["seed:1".to_string()]);
        membership.activate_local();
        membership.record_heartbeat(NodeId::new(1), None);
        membership.record_heartbeat(NodeId::new(2), None);
        assert!(membership.health().is_healthy());
    }
}

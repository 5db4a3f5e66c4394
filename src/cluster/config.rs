//! Cluster-wide configuration, mirroring [`crate::system::SystemConfig`]'s
//! builder/`validate()` pattern.
//!
//! Reading these values from a file or environment is the excluded
//! collaborator's job (§6); this crate owns the struct, its defaults, its
//! builder, and `validate()`.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::time::Duration;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::util::{duration_serde, NodeId};

/// Default cluster name.
pub const DEFAULT_CLUSTER_NAME: &str = "orbit-cluster";
/// Default bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
/// Default bind port (matches the teacher's gossip-protocol heritage).
pub const DEFAULT_BIND_PORT: u16 = 7946;
/// Default heartbeat cadence.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(1);
/// Default leader-election deadline.
pub const DEFAULT_ELECTION_TIMEOUT: Duration = Duration::from_secs(10);
/// Default time allotted for a join handshake to complete.
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(30);
/// Default time allotted for a graceful leave to complete.
pub const DEFAULT_LEAVE_TIMEOUT: Duration = Duration::from_secs(10);
/// Default window a peer may go quiet before being suspected.
pub const DEFAULT_SUSPICION_TIMEOUT: Duration = Duration::from_secs(5);
/// Multiplier applied to `suspicion_timeout` for each detection window.
pub const DEFAULT_SUSPICION_MULTIPLIER: u32 = 3;
/// Default per-send timeout on the transport.
pub const DEFAULT_MESSAGE_TIMEOUT: Duration = Duration::from_secs(10);
/// Default maximum frame payload size.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 1024 * 1024;
/// Default outbound send-queue capacity per connection.
pub const DEFAULT_SEND_QUEUE_CAPACITY: usize = 100;
/// Default gossip fanout.
pub const DEFAULT_GOSSIP_FANOUT: usize = 3;
/// Default gossip cadence.
pub const DEFAULT_GOSSIP_INTERVAL: Duration = Duration::from_millis(200);
/// Default full-snapshot sync cadence.
pub const DEFAULT_PUSH_PULL_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for one node's participation in a cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// This node's identity within the cluster (see [`crate::handle::HandleId`]'s
    /// node-in-top-byte encoding for why this is a `NodeId`, not the
    /// collaborator-facing `node.id` hex string).
    pub node_id: NodeId,
    /// Address this node's transport listens on.
    pub bind_address: String,
    /// Port this node's transport listens on.
    pub bind_port: u16,
    /// Human-readable cluster name.
    pub cluster_name: String,
    /// `host:port` pairs used to bootstrap membership.
    pub seed_nodes: Vec<String>,
    /// Heartbeat cadence.
    #[serde(with = "duration_serde")]
    pub heartbeat_interval: Duration,
    /// Leader-election deadline.
    #[serde(with = "duration_serde")]
    pub election_timeout: Duration,
    /// Join handshake deadline.
    #[serde(with = "duration_serde")]
    pub join_timeout: Duration,
    /// Graceful-leave deadline.
    #[serde(with = "duration_serde")]
    pub leave_timeout: Duration,
    /// Quiet window before a peer is suspected.
    #[serde(with = "duration_serde")]
    pub suspicion_timeout: Duration,
    /// Multiplier applied to `suspicion_timeout` per detection window.
    pub suspicion_multiplier: u32,
    /// Per-send timeout on the transport.
    #[serde(with = "duration_serde")]
    pub message_timeout: Duration,
    /// Maximum frame payload size, in bytes.
    pub max_message_size: usize,
    /// Bounded outbound send-queue capacity per connection.
    pub send_queue_capacity: usize,
    /// Whether to compress frame payloads (reserved).
    pub compression: bool,
    /// Whether to encrypt connections (reserved).
    pub encryption: bool,
    /// Gossip fanout.
    pub gossip_fanout: usize,
    /// Gossip cadence.
    #[serde(with = "duration_serde")]
    pub gossip_interval: Duration,
    /// Full-snapshot sync cadence.
    #[serde(with = "duration_serde")]
    pub push_pull_interval: Duration,
    /// Application-specific metadata attached to this node's identity.
    pub metadata: HashMap<String, String>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            node_id: NodeId::new(0),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            bind_port: DEFAULT_BIND_PORT,
            cluster_name: DEFAULT_CLUSTER_NAME.to_string(),
            seed_nodes: Vec::new(),
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            election_timeout: DEFAULT_ELECTION_TIMEOUT,
            join_timeout: DEFAULT_JOIN_TIMEOUT,
            leave_timeout: DEFAULT_LEAVE_TIMEOUT,
            suspicion_timeout: DEFAULT_SUSPICION_TIMEOUT,
            suspicion_multiplier: DEFAULT_SUSPICION_MULTIPLIER,
            message_timeout: DEFAULT_MESSAGE_TIMEOUT,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            send_queue_capacity: DEFAULT_SEND_QUEUE_CAPACITY,
            compression: false,
            encryption: false,
            gossip_fanout: DEFAULT_GOSSIP_FANOUT,
            gossip_interval: DEFAULT_GOSSIP_INTERVAL,
            push_pull_interval: DEFAULT_PUSH_PULL_INTERVAL,
            metadata: HashMap::new(),
        }
    }
}

impl ClusterConfig {
    /// Start building a configuration from defaults.
    pub fn builder() -> ClusterConfigBuilder {
        ClusterConfigBuilder::default()
    }

    /// Reject configurations the runtime cannot safely start with.
    pub fn validate(&self) -> Result<(), String> {
        if self.bind_address.is_empty() {
            return Err("bind_address must not be empty".to_string());
        }
        if self.max_message_size == 0 {
            return Err("max_message_size must be > 0".to_string());
        }
        if self.suspicion_multiplier == 0 {
            return Err("suspicion_multiplier must be > 0".to_string());
        }
        if self.heartbeat_interval.is_zero() {
            return Err("heartbeat_interval must be > 0".to_string());
        }
        if self.suspicion_timeout.is_zero() {
            return Err("suspicion_timeout must be > 0".to_string());
        }
        if self.gossip_fanout == 0 {
            return Err("gossip_fanout must be > 0".to_string());
        }
        Ok(())
    }
}

/// Fluent builder for [`ClusterConfig`].
#[derive(Debug, Default)]
pub struct ClusterConfigBuilder {
    config: ClusterConfig,
}

impl ClusterConfigBuilder {
    /// Set the local node's identity.
    pub fn with_node_id(mut self, node_id: NodeId) -> Self {
        self.config.node_id = node_id;
        self
    }

    /// Set the bind address and port.
    pub fn with_bind(mut self, address: impl Into<String>, port: u16) -> Self {
        self.config.bind_address = address.into();
        self.config.bind_port = port;
        self
    }

    /// Set the cluster name.
    pub fn with_cluster_name(mut self, name: impl Into<String>) -> Self {
        self.config.cluster_name = name.into();
        self
    }

    /// Set the seed nodes used to bootstrap membership.
    pub fn with_seed_nodes(mut self, seeds: Vec<String>) -> Self {
        self.config.seed_nodes = seeds;
        self
    }

    /// Set the heartbeat cadence.
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.config.heartbeat_interval = interval;
        self
    }

    /// Set the suspicion window and multiplier together.
    pub fn with_suspicion(mut self, timeout: Duration, multiplier: u32) -> Self {
        self.config.suspicion_timeout = timeout;
        self.config.suspicion_multiplier = multiplier;
        self
    }

    /// Set the per-send transport timeout.
    pub fn with_message_timeout(mut self, timeout: Duration) -> Self {
        self.config.message_timeout = timeout;
        self
    }

    /// Attach application metadata.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.metadata.insert(key.into(), value.into());
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<ClusterConfig, String> {
        self.config.validate()?;
        Ok(self.config)
    }
}

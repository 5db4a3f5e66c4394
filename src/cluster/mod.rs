//! Cluster extension: multi-node membership, failure detection, leader
//! election, and remote service calls layered on top of the single-node
//! actor runtime.
//!
//! Absent from [`crate::system::SystemConfig`] (no cluster config configured),
//! a system runs single-node with none of this wired in. Everything here is
//! additive: a single-node deployment never touches the network.

pub mod bridge;
pub mod config;
pub mod error;
pub mod manager;
pub mod membership;
pub mod message;
pub mod registry;
pub mod remote_service;
pub mod transport;

pub use bridge::ClusterBridge;
pub use config::ClusterConfig;
pub use error::{ClusterError, DEFAULT_CALL_TIMEOUT};
pub use manager::ClusterManager;
pub use membership::{
    BroadcastEventSink, ClusterEvent, ClusterEventKind, ClusterEventSink, ClusterHealth, Membership, NodeInfo,
    NodeState,
};
pub use message::{ClusterMessage, ClusterMessageType};
pub use registry::{ClusterRegistry, ClusterServiceEvent, ClusterServiceEventKind, ServiceInstance};
pub use remote_service::{RemoteCallHandler, RemoteServiceDispatch};
pub use transport::{Transport, TransportHandler, TransportStatistics};

//! Convenient re-exports for building on the actor runtime.
//!
//! ```rust
//! use orbit_rt::prelude::*;
//! ```

// Core actor runtime
pub use crate::actor::{Actor, ActorContext, ActorError, ActorRef, ActorState, ActorStats};
pub use crate::message::{Message, MessagePriority, MessageType};

// Mailbox
pub use crate::mailbox::{
    BackpressureStrategy, BoundedMailbox, BoundedMailboxSender, MailboxReceiver, MailboxSender,
    UnboundedMailbox, UnboundedMailboxSender,
};

// Routing, addressing, sessions, services
pub use crate::handle::{Handle, HandleId, HandleRegistry};
pub use crate::router::Router;
pub use crate::service::{
    LoadBalanceStrategy, LoadBalancer, ServiceInfo, ServiceQuery, ServiceRegistry, ServiceStatus,
};
pub use crate::session::Session;

// Cluster extension
pub use crate::cluster::{ClusterConfig, ClusterEvent, ClusterManager, NodeInfo, NodeState};

// Composition root
pub use crate::system::{ActorSpawnBuilder, ActorSystem, SpawnOptions, SystemConfig};

// Monitoring
pub use crate::monitoring::{
    ActorEvent, EventSeverity, InMemoryMonitor, MailboxEvent, Monitor, MonitoringConfig,
    MonitoringEvent, NoopMonitor,
};

// Identifiers
pub use crate::util::{ActorId, MessageId, NodeId, SessionId};

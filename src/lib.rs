//! # orbit-rt — a distributed actor runtime
//!
//! A mailbox-based actor runtime: actors run as sequential message consumers
//! addressed through a lock-free router, with request/response sessions for
//! call-style messaging and a service registry for named, load-balanced
//! discovery. The optional [`cluster`] extension adds multi-node membership,
//! failure detection, leader election, and remote call routing on top of the
//! same [`ActorSystem`] handle.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use orbit_rt::prelude::*;
//! use async_trait::async_trait;
//! use bytes::Bytes;
//!
//! struct Counter {
//!     count: u64,
//! }
//!
//! #[async_trait]
//! impl Actor for Counter {
//!     async fn handle(&mut self, ctx: &ActorContext, message: Message) -> Result<Bytes, ActorError> {
//!         self.count += 1;
//!         let _ = &ctx;
//!         Ok(message.payload)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let system = ActorSystem::new(SystemConfig::default());
//!     let actor_ref = system
//!         .new_service("counter", Counter { count: 0 }, SpawnOptions::default())
//!         .await?;
//!
//!     system
//!         .call(
//!             ActorId::next(),
//!             actor_ref.actor_id(),
//!             MessageType::Request,
//!             Bytes::new(),
//!             std::time::Duration::from_secs(1),
//!         )
//!         .await?;
//!
//!     system.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! ## Core actor runtime
//! - [`message`] - the concrete [`message::Message`] routed between every actor
//! - [`mailbox`] - bounded/unbounded queuing with backpressure
//! - [`router`] - lock-free `ActorId -> mailbox sender` routing table
//! - [`actor`] - the [`actor::Actor`] trait, lifecycle, and [`actor::ActorRef`] handle
//! - [`handle`] - named/numeric addressing over actors
//! - [`session`] - request/response correlation for sessioned calls
//! - [`service`] - named service registration, discovery, and load balancing
//!
//! ## Cluster extension
//! - [`cluster`] - multi-node membership, failure detection, leader election,
//!   remote call routing, and registry replication
//!
//! ## Composition and observability
//! - [`system`] - [`system::ActorSystem`], the composed runtime handle
//! - [`monitoring`] - event tracking for actor, mailbox, cluster, and service changes
//! - [`util`] - identifiers ([`util::ActorId`], [`util::NodeId`], [`util::SessionId`])

pub mod actor;
pub mod cluster;
pub mod handle;
pub mod mailbox;
pub mod message;
pub mod monitoring;
pub mod prelude;
pub mod router;
pub mod service;
pub mod session;
pub mod system;
pub mod util;

pub use actor::{Actor, ActorContext, ActorError, ActorMailbox, ActorRef, ActorState, ActorStats};
pub use cluster::{
    BroadcastEventSink, ClusterBridge, ClusterConfig, ClusterError, ClusterEvent, ClusterEventKind,
    ClusterEventSink, ClusterHealth, ClusterManager, ClusterMessage, ClusterMessageType,
    ClusterRegistry, Membership, NodeInfo, NodeState, RemoteCallHandler, ServiceInstance,
    Transport, TransportHandler,
};
pub use handle::{Handle, HandleError, HandleId, HandleRegistry};
pub use mailbox::{
    BackpressureStrategy, BoundedMailbox, BoundedMailboxSender, MailboxReceiver, MailboxSender,
    UnboundedMailbox, UnboundedMailboxSender,
};
pub use message::{Message, MessagePriority, MessageType};
pub use monitoring::{
    ActorEvent, ActorEventKind, EventSeverity, InMemoryMonitor, MailboxEvent, MailboxEventKind,
    Monitor, MonitoringConfig, MonitoringError, MonitoringEvent, MonitoringSnapshot, NoopMonitor,
    SystemEvent, SystemEventKind,
};
pub use router::{Router, RouterError, RouterSender};
pub use service::{
    LoadBalanceStrategy, LoadBalancer, ServiceError, ServiceEvent, ServiceEventKind, ServiceInfo,
    ServiceMetrics, ServiceQuery, ServiceRegistry, ServiceStatus,
};
pub use session::{Session, SessionError, SessionManager};
pub use system::{ActorSpawnBuilder, ActorSystem, SpawnOptions, SystemConfig, SystemError};
pub use util::{ActorId, MessageId, NodeId, SessionId};

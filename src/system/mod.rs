//! Composition root: [`ActorSystem`] wires routing, handles, sessions, and
//! service discovery into one handle, optionally extended with cluster
//! membership when [`SystemConfig::cluster`] is set.
//!
//! # Components
//!
//! - [`SystemConfig`] / [`config::SystemConfigBuilder`] - system-wide configuration
//! - [`ActorSystem`] - the composed runtime: `new_actor`/`new_service`/`send`/`call`/`shutdown`
//! - [`ActorSpawnBuilder`] / [`SpawnOptions`] - fluent per-actor spawn configuration
//! - [`SystemError`] - composes every sub-component's error type

mod actor_system;
mod builder;
pub mod config;
pub mod errors;

// Re-exports
pub use actor_system::ActorSystem;
pub use builder::{ActorSpawnBuilder, SpawnOptions};
pub use config::{
    SystemConfig, DEFAULT_ENABLE_METRICS, DEFAULT_MAILBOX_CAPACITY, DEFAULT_MAX_ACTORS,
    DEFAULT_SHUTDOWN_TIMEOUT, DEFAULT_SPAWN_TIMEOUT,
};
pub use errors::SystemError;

//! The concrete message type routed between actors, locally and across the cluster.
//!
//! Unlike a per-actor generic payload, every actor in this runtime consumes the
//! same [`Message`] struct: a type tag plus opaque bytes. This lets the
//! [`Router`](crate::router::Router) and [`HandleRegistry`](crate::handle::HandleRegistry)
//! address arbitrary, heterogeneous actors without reflection — actors decode
//! their own payload by tag.

mod priority;
mod types;

pub use priority::MessagePriority;
pub use types::{Message, MessageType};

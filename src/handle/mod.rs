//! Handle addressing: a compact, resolvable reference to an actor.
//!
//! A [`Handle`] binds an [`ActorId`](crate::util::ActorId) to a wire-compact
//! [`HandleId`] and, optionally, a human-readable name. The [`HandleRegistry`]
//! is the per-node authority for allocating and resolving these references;
//! cluster code extends it with remote entries via
//! [`HandleRegistry::register_remote`].

mod error;
mod id;
mod registry;

pub use error::HandleError;
pub use id::{HandleId, MAX_COUNTER};
pub use registry::{Handle, HandleRegistry};

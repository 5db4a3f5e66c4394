//! Mailbox actors: sequential message consumers addressed through the [`crate::router`].
//!
//! # Components
//!
//! - [`Actor`] - the trait a handler implements
//! - [`ActorContext`] - routing handle passed to every `handle()` call
//! - [`ActorRef`] - non-generic control handle returned by [`ActorRef::spawn`]
//! - [`ActorState`] / [`ActorStats`] - lifecycle state and the snapshot `stats()` returns
//! - [`ActorError`] - errors from `start`/`stop`/`send`/`call`
//!
//! # Lifecycle
//!
//! `ActorRef::spawn` puts the actor's task on the runtime immediately, but the
//! task waits for `start()` before dequeuing its first message. Each dequeued
//! message runs under a per-actor handler timeout; sessioned messages get a
//! reply (success or error) delivered through the shared [`crate::session::SessionManager`]
//! even if the handler times out or errors. `stop()` cancels the loop, drains
//! the mailbox (failing any still-sessioned messages), and runs `on_stop`.

mod context;
mod error;
mod runtime;
mod state;
mod traits;

pub use context::ActorContext;
pub use error::ActorError;
pub use runtime::{ActorMailbox, ActorRef, DEFAULT_CALL_TIMEOUT, DEFAULT_HANDLER_TIMEOUT};
pub use state::{ActorState, ActorStats};
pub use traits::Actor;

//! Allocates and resolves [`Handle`]s for actors local to this node.

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use dashmap::DashMap;

// Layer 3: Internal module imports
use super::error::HandleError;
use super::id::{HandleId, MAX_COUNTER};
use crate::util::{ActorId, NodeId};

/// A named, addressable reference to a live actor.
///
/// `name` is optional: most actors are reachable only by [`HandleId`] or
/// [`ActorId`], and only services worth discovering by a human-readable key
/// register one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handle {
    handle_id: HandleId,
    actor_id: ActorId,
    name: Option<String>,
    node_id: NodeId,
    is_local: bool,
}

impl Handle {
    /// The compact node+counter identifier.
    pub fn handle_id(&self) -> HandleId {
        self.handle_id
    }

    /// The actor this handle addresses.
    pub fn actor_id(&self) -> ActorId {
        self.actor_id
    }

    /// The optional registered name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The node that owns the underlying actor.
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Whether the actor lives on this node.
    pub fn is_local(&self) -> bool {
        self.is_local
    }
}

/// Per-node table of live handles, addressable by ID, owning actor, or name.
///
/// Allocation is lock-free (`DashMap` + an atomic counter); `register` is the
/// only call that can fail under contention, and only on a name collision or
/// counter exhaustion.
pub struct HandleRegistry {
    local_node_id: NodeId,
    counter: AtomicU32,
    by_id: Arc<DashMap<HandleId, Handle>>,
    by_actor: Arc<DashMap<ActorId, HandleId>>,
    by_name: Arc<DashMap<String, HandleId>>,
}

impl HandleRegistry {
    /// Create a registry that allocates handles tagged with `local_node_id`.
    pub fn new(local_node_id: NodeId) -> Self {
        Self {
            local_node_id,
            counter: AtomicU32::new(0),
            by_id: Arc::new(DashMap::new()),
            by_actor: Arc::new(DashMap::new()),
            by_name: Arc::new(DashMap::new()),
        }
    }

    fn next_counter(&self) -> Result<u32, HandleError> {
        let value = self.counter.fetch_add(1, Ordering::Relaxed);
        if value > MAX_COUNTER {
            return Err(HandleError::CounterExhausted);
        }
        Ok(value)
    }

    /// Allocate a handle for `actor_id`, optionally under `name`.
    ///
    /// Returns the existing handle if `actor_id` is already registered,
    /// rather than minting a second, orphaned `HandleId` for it.
    ///
    /// # Errors
    ///
    /// Returns [`HandleError::NameAlreadyTaken`] if `name` is already bound,
    /// or [`HandleError::CounterExhausted`] if the per-node counter has
    /// wrapped past its 24-bit range.
    pub fn allocate(&self, actor_id: ActorId, name: Option<String>) -> Result<Handle, HandleError> {
        if let Some(existing) = self.get_by_actor(actor_id) {
            return Ok(existing);
        }

        if let Some(ref name) = name {
            if self.by_name.contains_key(name) {
                return Err(HandleError::NameAlreadyTaken(name.clone()));
            }
        }

        let counter = self.next_counter()?;
        let handle_id = HandleId::new(self.local_node_id, counter);
        let handle = Handle {
            handle_id,
            actor_id,
            name: name.clone(),
            node_id: self.local_node_id,
            is_local: true,
        };

        self.by_id.insert(handle_id, handle.clone());
        self.by_actor.insert(actor_id, handle_id);
        if let Some(name) = name {
            self.by_name.insert(name, handle_id);
        }

        Ok(handle)
    }

    /// Register a handle describing an actor owned by a remote node.
    pub fn register_remote(&self, handle: Handle) -> Result<(), HandleError> {
        if let Some(name) = handle.name() {
            if self.by_name.contains_key(name) {
                return Err(HandleError::NameAlreadyTaken(name.to_string()));
            }
        }
        if let Some(name) = handle.name.clone() {
            self.by_name.insert(name, handle.handle_id);
        }
        self.by_actor.insert(handle.actor_id, handle.handle_id);
        self.by_id.insert(handle.handle_id, handle);
        Ok(())
    }

    /// Look up a handle by its compact ID.
    pub fn get_by_id(&self, handle_id: HandleId) -> Option<Handle> {
        self.by_id.get(&handle_id).map(|entry| entry.value().clone())
    }

    /// Look up the handle registered for an actor.
    pub fn get_by_actor(&self, actor_id: ActorId) -> Option<Handle> {
        let handle_id = *self.by_actor.get(&actor_id)?;
        self.get_by_id(handle_id)
    }

    /// Look up a handle by its registered name.
    pub fn get_by_name(&self, name: &str) -> Option<Handle> {
        let handle_id = *self.by_name.get(name)?;
        self.get_by_id(handle_id)
    }

    /// Alias for [`get_by_name`](Self::get_by_name), returning an error instead of `None`.
    pub fn resolve(&self, name: &str) -> Result<Handle, HandleError> {
        self.get_by_name(name)
            .ok_or_else(|| HandleError::NameNotFound(name.to_string()))
    }

    /// Remove a handle and every index entry pointing at it.
    pub fn release(&self, handle_id: HandleId) -> Result<(), HandleError> {
        let (_, handle) = self
            .by_id
            .remove(&handle_id)
            .ok_or(HandleError::HandleNotFound(handle_id))?;
        self.by_actor.remove(&handle.actor_id);
        if let Some(name) = handle.name() {
            self.by_name.remove(name);
        }
        Ok(())
    }

    /// All currently registered handles.
    pub fn list(&self) -> Vec<Handle> {
        self.by_id.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Number of registered handles.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the registry holds no handles.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

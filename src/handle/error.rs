//! Error types for handle allocation and lookup failures.

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use super::id::HandleId;
use crate::util::ActorId;

/// Errors produced by [`HandleRegistry`](super::HandleRegistry).
#[derive(Debug, Error)]
pub enum HandleError {
    /// A name was requested that is already bound to a live handle on this node.
    #[error("handle name already registered: {0}")]
    NameAlreadyTaken(String),

    /// The per-node 24-bit counter has been exhausted without a free slot.
    #[error("handle counter space exhausted for this node")]
    CounterExhausted,

    /// No handle exists for the given ID.
    #[error("handle not found: {0}")]
    HandleNotFound(HandleId),

    /// No handle is registered for the given actor.
    #[error("no handle registered for actor: {0}")]
    ActorNotFound(ActorId),

    /// No handle is registered under the given name.
    #[error("no handle registered for name: {0}")]
    NameNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert!(HandleError::NameAlreadyTaken("a".into()).to_string().contains('a'));
        assert!(HandleError::CounterExhausted.to_string().contains("exhausted"));
    }
}

//! The 32-bit handle identifier: top 8 bits are the owning node, low 24 bits
//! are a per-node monotonic counter.

// Layer 1: Standard library imports
use std::fmt;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::util::NodeId;

/// Largest value the 24-bit counter can hold before it must wrap.
pub const MAX_COUNTER: u32 = 0x00FF_FFFF;

/// Encodes `(node_id, counter)` into a single `u32` for wire-compact addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleId(u32);

impl HandleId {
    /// Build a handle ID from a node ID and a 24-bit counter value.
    ///
    /// `counter` is masked to 24 bits; callers are expected to keep it within
    /// [`MAX_COUNTER`] themselves ([`HandleRegistry`](super::HandleRegistry) does).
    pub const fn new(node_id: NodeId, counter: u32) -> Self {
        let node_bits = (node_id.as_u8() as u32) << 24;
        Self(node_bits | (counter & MAX_COUNTER))
    }

    /// Wrap a raw value decoded from the wire.
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// The raw `u32` representation.
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// The node that allocated this handle.
    pub const fn node_id(&self) -> NodeId {
        NodeId::new((self.0 >> 24) as u8)
    }

    /// The per-node counter component.
    pub const fn counter(&self) -> u32 {
        self.0 & MAX_COUNTER
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handle-{}-{}", self.node_id(), self.counter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_node_in_top_byte() {
        let id = HandleId::new(NodeId::new(3), 42);
        assert_eq!(id.node_id(), NodeId::new(3));
        assert_eq!(id.counter(), 42);
    }

    #[test]
    fn counter_masked_to_24_bits() {
        let id = HandleId::new(NodeId::new(0), MAX_COUNTER + 1);
        assert_eq!(id.counter(), 0);
    }

    #[test]
    fn display_format() {
        let id = HandleId::new(NodeId::new(1), 5);
        assert_eq!(id.to_string(), "handle-1-5");
    }

    #[test]
    fn raw_roundtrip() {
        let id = HandleId::new(NodeId::new(2), 100);
        let raw = id.as_u32();
        assert_eq!(HandleId::from_raw(raw), id);
    }
}

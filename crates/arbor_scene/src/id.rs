//! Typed handles for scene entities.
//!
//! Handles are the identity of a node or attachment. Two handles compare
//! equal if and only if they refer to the same entity, which is what the
//! resolver relies on when it talks about "the same reference".

use core::fmt;

use serde::Serialize;

/// Unique identifier for a node in a [`Scene`](crate::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Creates a new node ID.
    #[must_use]
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

/// Unique identifier for an attachment bound to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AttachmentId(pub(crate) usize);

impl AttachmentId {
    /// Creates a new attachment ID.
    #[must_use]
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attachment_{}", self.0)
    }
}

/// Allocator for node and attachment IDs.
///
/// IDs are never reused within one scene, so a stale handle to a despawned
/// node can never alias a node created later.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next_node_id: usize,
    next_attachment_id: usize,
}

impl IdAllocator {
    /// Creates a new ID allocator starting at 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next unique node ID.
    pub fn allocate_node_id(&mut self) -> NodeId {
        let id = self.next_node_id;
        self.next_node_id += 1;
        NodeId::new(id)
    }

    /// Allocates the next unique attachment ID.
    pub fn allocate_attachment_id(&mut self) -> AttachmentId {
        let id = self.next_attachment_id;
        self.next_attachment_id += 1;
        AttachmentId::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_is_monotonic() {
        let mut allocator = IdAllocator::new();
        assert_eq!(allocator.allocate_node_id(), NodeId(0));
        assert_eq!(allocator.allocate_node_id(), NodeId(1));
        assert_eq!(allocator.allocate_attachment_id(), AttachmentId(0));
        assert_eq!(allocator.allocate_node_id(), NodeId(2));
        assert_eq!(allocator.allocate_attachment_id(), AttachmentId(1));
    }

    #[test]
    fn display_formats() {
        assert_eq!(NodeId::new(3).to_string(), "node_3");
        assert_eq!(AttachmentId::new(7).to_string(), "attachment_7");
    }
}

//! Entity identification types for OneRingDB
//!
//! Provides strongly-typed identifiers for nodes and edges.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Internal numeric ID for efficient storage and lookup
pub type InternalId = u64;

/// Trait for all entity identifiers
pub trait EntityId: Clone + Copy + Eq + Ord + std::hash::Hash + fmt::Debug + fmt::Display {
    /// Create from internal numeric ID
    fn from_internal(id: InternalId) -> Self;

    /// Get the internal numeric representation
    fn as_internal(&self) -> InternalId;
}

/// Identifier for a node in the graph
///
/// Ids are issued in creation order, so ordering by id is ordering by insertion.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(InternalId);

impl EntityId for NodeId {
    fn from_internal(id: InternalId) -> Self {
        Self(id)
    }

    fn as_internal(&self) -> InternalId {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Identifier for an edge in the graph
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(InternalId);

impl EntityId for EdgeId {
    fn from_internal(id: InternalId) -> Self {
        Self(id)
    }

    fn as_internal(&self) -> InternalId {
        self.0
    }
}

impl fmt::Debug for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EdgeId({})", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Identifier generator for sequential IDs within a store
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next_node_id: InternalId,
    next_edge_id: InternalId,
}

impl IdGenerator {
    /// Create a new ID generator
    pub fn new() -> Self {
        Self {
            next_node_id: 1,
            next_edge_id: 1,
        }
    }

    /// Generate the next node ID
    pub fn next_node_id(&mut self) -> NodeId {
        let id = self.next_node_id;
        self.next_node_id += 1;
        NodeId::from_internal(id)
    }

    /// Generate the next edge ID
    pub fn next_edge_id(&mut self) -> EdgeId {
        let id = self.next_edge_id;
        self.next_edge_id += 1;
        EdgeId::from_internal(id)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

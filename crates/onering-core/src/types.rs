//! Core graph types for OneRingDB
//!
//! Defines the fundamental building blocks: nodes, edges, class labels, and directions.

use crate::id::{EdgeId, NodeId};
use crate::property::{Properties, PropertyValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Class given to nodes and edges created without one
pub const DEFAULT_CLASS: &str = "default";

/// Class name reserved by `READ (:Hubs)` for hub-flagged nodes
pub const HUBS_CLASS: &str = "Hubs";

/// The class label of a node or edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    /// Create a new label
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    /// Get the label name
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for Label {
    fn default() -> Self {
        Self::new(DEFAULT_CLASS)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of an edge traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Follow edges from source to target (->)
    #[default]
    Outgoing,
    /// Follow edges from target to source (<-)
    Incoming,
    /// Ignore edge direction (--)
    Both,
}

/// A node in the property graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier
    pub id: NodeId,

    /// Display name, not required to be unique
    pub name: String,

    /// Class label
    pub class: Label,

    /// Properties of this node
    pub properties: Properties,

    /// Nodes joined to this one by at least one edge, in either direction
    pub neighbours: BTreeSet<NodeId>,

    /// Set by the clustering collaborator
    pub hub: bool,
}

impl Node {
    /// Create a node with no neighbours
    pub fn new<N: Into<String>, L: Into<Label>>(
        id: NodeId,
        name: N,
        class: L,
        properties: Properties,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            class: class.into(),
            properties,
            neighbours: BTreeSet::new(),
            hub: false,
        }
    }

    /// Check if node has a class by name
    pub fn has_class(&self, class: &str) -> bool {
        self.class.name() == class
    }

    /// Get a property
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Check whether `other` is in the adjacency set
    pub fn is_neighbour(&self, other: NodeId) -> bool {
        self.neighbours.contains(&other)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Node(name={}, class={}, id={}, properties={}, neighbours=[",
            self.name, self.class, self.id, self.properties
        )?;
        for (i, id) in self.neighbours.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", id)?;
        }
        write!(f, "])")
    }
}

/// A directed edge between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier
    pub id: EdgeId,

    /// Source node ID
    pub source: NodeId,

    /// Target node ID
    pub target: NodeId,

    /// Class label
    pub class: Label,

    /// Properties of this edge
    pub properties: Properties,
}

impl Edge {
    /// Create a new edge
    pub fn new<L: Into<Label>>(
        id: EdgeId,
        source: NodeId,
        target: NodeId,
        class: L,
        properties: Properties,
    ) -> Self {
        Self {
            id,
            source,
            target,
            class: class.into(),
            properties,
        }
    }

    /// Check if edge has a class by name
    pub fn has_class(&self, class: &str) -> bool {
        self.class.name() == class
    }

    /// Get the node ID at the other end of the edge
    pub fn other(&self, node_id: NodeId) -> Option<NodeId> {
        if self.source == node_id {
            Some(self.target)
        } else if self.target == node_id {
            Some(self.source)
        } else {
            None
        }
    }

    /// Check if this edge touches a node
    pub fn connects(&self, node_id: NodeId) -> bool {
        self.source == node_id || self.target == node_id
    }

    /// Check if this edge joins two specific nodes, in either direction
    pub fn connects_nodes(&self, a: NodeId, b: NodeId) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Edge(id={}, {} -[{}]-> {}, properties={})",
            self.id, self.source, self.class, self.target, self.properties
        )
    }
}

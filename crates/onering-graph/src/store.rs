//! In-memory graph store

use crate::update::{EdgeUpdate, NodeUpdate};
use onering_core::filter::accepts;
use onering_core::{
    Edge, EdgeId, Error, IdGenerator, Label, Node, NodeId, Properties, PropertyChange,
    PropertyFilter, Result,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::ops::Bound;
use tracing::{debug, info};

type EndpointKey = (String, String);

/// Owns every node and edge and keeps the lookup indices in step with them.
///
/// Indices:
/// - id -> node and id -> edge (authoritative)
/// - name -> node ids in insertion order (names may repeat)
/// - (source name, target name) -> edge id, one slot per ordered pair; a later
///   edge between the same names takes the slot
///
/// Every edge's endpoints are present in the node index, and each node's
/// `neighbours` set is exactly the nodes joined to it by at least one edge.
#[derive(Debug, Default)]
pub struct GraphStore {
    id_gen: IdGenerator,
    nodes: BTreeMap<NodeId, Node>,
    edges: BTreeMap<EdgeId, Edge>,
    names: BTreeMap<String, Vec<NodeId>>,
    endpoints: HashMap<EndpointKey, EdgeId>,
    incidence: HashMap<NodeId, BTreeSet<EdgeId>>,
}

impl GraphStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns true if the store holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ========== Node Operations ==========

    /// Create a node. `None` for the class gives it the default class.
    pub fn create_node<N: Into<String>>(
        &mut self,
        name: N,
        class: Option<&str>,
        properties: Properties,
    ) -> NodeId {
        let id = self.id_gen.next_node_id();
        let class = class.map(Label::new).unwrap_or_default();
        let node = Node::new(id, name, class, properties);

        self.names.entry(node.name.clone()).or_default().push(id);
        debug!("Created node {:?} ({}:{})", id, node.name, node.class);
        self.nodes.insert(id, node);
        id
    }

    /// Get a node by ID
    pub fn get_node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(&id)
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))
    }

    /// Get the first node inserted under `name`
    pub fn get_node_by_name(&self, name: &str) -> Result<&Node> {
        self.names
            .get(name)
            .and_then(|ids| ids.first())
            .and_then(|id| self.nodes.get(id))
            .ok_or_else(|| Error::NodeNotFound(name.to_string()))
    }

    /// Get every node whose name starts with `prefix`, in insertion order
    pub fn get_nodes_by_name_prefix(&self, prefix: &str) -> Result<Vec<&Node>> {
        let mut ids: Vec<NodeId> = self
            .names
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(name, _)| name.starts_with(prefix))
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();

        if ids.is_empty() {
            return Err(Error::NodeNotFound(format!("{}*", prefix)));
        }

        ids.sort();
        Ok(ids.iter().filter_map(|id| self.nodes.get(id)).collect())
    }

    /// Get the name of a node
    pub fn node_name(&self, id: NodeId) -> Result<&str> {
        self.get_node(id).map(|node| node.name.as_str())
    }

    /// Get all nodes, in creation order
    pub fn get_all_nodes(&self, filter: Option<&PropertyFilter>) -> Vec<&Node> {
        self.nodes
            .values()
            .filter(|node| accepts(filter, &node.properties))
            .collect()
    }

    /// Get all nodes of a class
    pub fn get_nodes_by_class(&self, class: &str, filter: Option<&PropertyFilter>) -> Vec<&Node> {
        self.nodes
            .values()
            .filter(|node| node.has_class(class) && accepts(filter, &node.properties))
            .collect()
    }

    /// Get all hub-flagged nodes
    pub fn get_nodes_by_hub(&self, filter: Option<&PropertyFilter>) -> Vec<&Node> {
        self.nodes
            .values()
            .filter(|node| node.hub && accepts(filter, &node.properties))
            .collect()
    }

    /// Set or clear the hub flag on a node
    pub fn set_hub(&mut self, id: NodeId, hub: bool) -> Result<()> {
        let node = self.node_mut(id)?;
        node.hub = hub;
        Ok(())
    }

    /// Apply a field-scoped update to a node
    pub fn update_node(&mut self, id: NodeId, update: NodeUpdate) -> Result<()> {
        match update {
            NodeUpdate::Name(name) => self.rename_node(id, name),
            NodeUpdate::Class(class) => {
                let node = self.node_mut(id)?;
                info!("Node {} class: {} -> {}", node.name, node.class, class);
                node.class = class;
                Ok(())
            }
            NodeUpdate::Properties(properties) => {
                let node = self.node_mut(id)?;
                let changes = node.properties.merge(properties);
                log_changes(&format!("Node {}", node.name), &changes);
                Ok(())
            }
        }
    }

    fn rename_node(&mut self, id: NodeId, name: String) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.name == name {
            return Ok(());
        }
        let old_name = std::mem::replace(&mut node.name, name.clone());

        self.unindex_name(&old_name, id);
        self.names.entry(name.clone()).or_default().push(id);

        let mut stale_keys = BTreeSet::new();
        let mut fresh_keys = BTreeSet::new();
        for edge_id in self.incident_edge_ids(id) {
            let Some(edge) = self.edges.get(&edge_id) else {
                continue;
            };
            let new_key = self.endpoint_key(edge)?;
            let old_key = (
                if edge.source == id { old_name.clone() } else { new_key.0.clone() },
                if edge.target == id { old_name.clone() } else { new_key.1.clone() },
            );
            stale_keys.insert(old_key);
            fresh_keys.insert(new_key);
        }
        for key in stale_keys.into_iter().chain(fresh_keys) {
            self.restore_slot(key);
        }

        info!("Node {:?} renamed: {} -> {}", id, old_name, name);
        Ok(())
    }

    /// Delete a node and every edge touching it
    pub fn delete_node(&mut self, id: NodeId) -> Result<Node> {
        if !self.nodes.contains_key(&id) {
            return Err(Error::NodeNotFound(id.to_string()));
        }

        for edge_id in self.incident_edge_ids(id) {
            self.delete_edge(edge_id)?;
        }

        let node = self
            .nodes
            .remove(&id)
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))?;
        self.unindex_name(&node.name, id);
        self.incidence.remove(&id);

        debug!("Deleted node {:?} ({})", id, node.name);
        Ok(node)
    }

    // ========== Edge Operations ==========

    /// Create an edge between two existing nodes
    pub fn create_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        class: Option<&str>,
        properties: Properties,
    ) -> Result<EdgeId> {
        self.require_endpoint(source)?;
        self.require_endpoint(target)?;

        let id = self.id_gen.next_edge_id();
        let class = class.map(Label::new).unwrap_or_default();
        let edge = Edge::new(id, source, target, class, properties);
        let key = self.endpoint_key(&edge)?;

        self.incidence.entry(source).or_default().insert(id);
        self.incidence.entry(target).or_default().insert(id);
        self.link_neighbours(source, target);

        debug!("Created edge {:?} {} -[{}]-> {}", id, key.0, edge.class, key.1);
        self.endpoints.insert(key, id);
        self.edges.insert(id, edge);
        Ok(id)
    }

    /// Get an edge by ID
    pub fn get_edge(&self, id: EdgeId) -> Result<&Edge> {
        self.edges
            .get(&id)
            .ok_or_else(|| Error::EdgeNotFound(id.to_string()))
    }

    /// Resolve an edge through the (source name, target name) slot
    pub fn get_edge_by_nodes_names(&self, source: &str, target: &str) -> Result<&Edge> {
        self.endpoints
            .get(&(source.to_string(), target.to_string()))
            .and_then(|id| self.edges.get(id))
            .ok_or_else(|| Error::EdgeNotFound(format!("{} -> {}", source, target)))
    }

    /// First edge of `class` whose endpoints are currently named `source` and `target`
    pub fn get_edge_by_class_and_nodes_names(
        &self,
        class: &str,
        source: &str,
        target: &str,
    ) -> Result<&Edge> {
        self.edges
            .values()
            .find(|edge| {
                edge.has_class(class)
                    && self.node_name(edge.source).is_ok_and(|name| name == source)
                    && self.node_name(edge.target).is_ok_and(|name| name == target)
            })
            .ok_or_else(|| {
                Error::EdgeNotFound(format!("{} -[{}]-> {}", source, class, target))
            })
    }

    /// Get all edges, in creation order
    pub fn get_all_edges(&self, filter: Option<&PropertyFilter>) -> Vec<&Edge> {
        self.edges
            .values()
            .filter(|edge| accepts(filter, &edge.properties))
            .collect()
    }

    /// Get all edges of a class
    pub fn get_edges_by_class(&self, class: &str, filter: Option<&PropertyFilter>) -> Vec<&Edge> {
        self.edges
            .values()
            .filter(|edge| edge.has_class(class) && accepts(filter, &edge.properties))
            .collect()
    }

    /// Edges with `id` as source or target
    pub fn get_incident_edges(&self, id: NodeId) -> Vec<&Edge> {
        self.incident_edge_ids(id)
            .iter()
            .filter_map(|edge_id| self.edges.get(edge_id))
            .collect()
    }

    /// Apply a field-scoped update to an edge
    pub fn update_edge(&mut self, id: EdgeId, update: EdgeUpdate) -> Result<()> {
        match update {
            EdgeUpdate::Source(node) => self.move_endpoint(id, node, true),
            EdgeUpdate::Target(node) => self.move_endpoint(id, node, false),
            EdgeUpdate::Class(class) => {
                let edge = self.edge_mut(id)?;
                info!("Edge {:?} class: {} -> {}", id, edge.class, class);
                edge.class = class;
                Ok(())
            }
            EdgeUpdate::Properties(properties) => {
                let edge = self.edge_mut(id)?;
                let changes = edge.properties.merge(properties);
                log_changes(&format!("Edge {:?}", id), &changes);
                Ok(())
            }
        }
    }

    fn move_endpoint(&mut self, id: EdgeId, node: NodeId, is_source: bool) -> Result<()> {
        self.require_endpoint(node)?;
        let edge = self.get_edge(id)?;
        let old_key = self.endpoint_key(edge)?;
        let (old_source, old_target) = (edge.source, edge.target);

        let edge = self.edge_mut(id)?;
        let stale = if is_source {
            std::mem::replace(&mut edge.source, node)
        } else {
            std::mem::replace(&mut edge.target, node)
        };
        if stale == node {
            return Ok(());
        }
        let still_touches_stale = edge.connects(stale);

        if self.endpoints.get(&old_key) == Some(&id) {
            self.restore_slot(old_key);
        }
        let new_key = self.endpoint_key(self.get_edge(id)?)?;
        self.endpoints.insert(new_key, id);

        if !still_touches_stale {
            if let Some(edges) = self.incidence.get_mut(&stale) {
                edges.remove(&id);
            }
        }
        self.incidence.entry(node).or_default().insert(id);

        self.refresh_adjacency(old_source, old_target);
        let edge = self.get_edge(id)?;
        let (source, target) = (edge.source, edge.target);
        self.refresh_adjacency(source, target);

        info!(
            "Edge {:?} {}: {:?} -> {:?}",
            id,
            if is_source { "source" } else { "target" },
            stale,
            node
        );
        Ok(())
    }

    /// Delete an edge
    pub fn delete_edge(&mut self, id: EdgeId) -> Result<Edge> {
        let key = self.endpoint_key(self.get_edge(id)?)?;
        let edge = self
            .edges
            .remove(&id)
            .ok_or_else(|| Error::EdgeNotFound(id.to_string()))?;

        if self.endpoints.get(&key) == Some(&id) {
            self.restore_slot(key.clone());
        }
        for endpoint in [edge.source, edge.target] {
            if let Some(edges) = self.incidence.get_mut(&endpoint) {
                edges.remove(&id);
            }
        }
        self.refresh_adjacency(edge.source, edge.target);

        debug!("Deleted edge {:?} {} -[{}]-> {}", id, key.0, edge.class, key.1);
        Ok(edge)
    }

    /// Render an edge with its endpoint names
    pub fn describe_edge(&self, edge: &Edge) -> Result<String> {
        let (source, target) = self.endpoint_key(edge)?;
        Ok(if edge.properties.is_empty() {
            format!("{} -[{}]-> {}", source, edge.class, target)
        } else {
            format!("{} -[{}]-> {} {}", source, edge.class, target, edge.properties)
        })
    }

    // ========== Internal Helpers ==========

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))
    }

    fn edge_mut(&mut self, id: EdgeId) -> Result<&mut Edge> {
        self.edges
            .get_mut(&id)
            .ok_or_else(|| Error::EdgeNotFound(id.to_string()))
    }

    fn require_endpoint(&self, id: NodeId) -> Result<()> {
        if self.nodes.contains_key(&id) {
            Ok(())
        } else {
            Err(Error::InvalidReference(format!(
                "edge endpoint {:?} does not exist",
                id
            )))
        }
    }

    pub(crate) fn endpoint_key(&self, edge: &Edge) -> Result<EndpointKey> {
        Ok((
            self.node_name(edge.source)?.to_string(),
            self.node_name(edge.target)?.to_string(),
        ))
    }

    /// Whether an edge is registered under this ordered pair of names
    pub fn has_endpoint_pair(&self, source: &str, target: &str) -> bool {
        self.endpoints
            .contains_key(&(source.to_string(), target.to_string()))
    }

    fn incident_edge_ids(&self, id: NodeId) -> Vec<EdgeId> {
        self.incidence
            .get(&id)
            .map(|edges| edges.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Point `key` at the newest edge whose endpoints are currently named
    /// `key`, or clear the slot when there is none
    fn restore_slot(&mut self, key: EndpointKey) {
        let newest = self
            .names
            .get(&key.0)
            .into_iter()
            .flatten()
            .filter_map(|node_id| self.incidence.get(node_id))
            .flatten()
            .filter_map(|edge_id| self.edges.get(edge_id))
            .filter(|edge| {
                self.node_name(edge.source).is_ok_and(|name| name == key.0)
                    && self.node_name(edge.target).is_ok_and(|name| name == key.1)
            })
            .map(|edge| edge.id)
            .max();

        match newest {
            Some(edge_id) => {
                self.endpoints.insert(key, edge_id);
            }
            None => {
                self.endpoints.remove(&key);
            }
        }
    }

    fn unindex_name(&mut self, name: &str, id: NodeId) {
        if let Some(ids) = self.names.get_mut(name) {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                self.names.remove(name);
            }
        }
    }

    fn link_neighbours(&mut self, a: NodeId, b: NodeId) {
        if let Some(node) = self.nodes.get_mut(&a) {
            node.neighbours.insert(b);
        }
        if let Some(node) = self.nodes.get_mut(&b) {
            node.neighbours.insert(a);
        }
    }

    /// Recompute whether `a` and `b` are still joined by any edge
    fn refresh_adjacency(&mut self, a: NodeId, b: NodeId) {
        let joined = self.incidence.get(&a).is_some_and(|edges| {
            edges
                .iter()
                .filter_map(|id| self.edges.get(id))
                .any(|edge| edge.connects_nodes(a, b))
        });

        if joined {
            self.link_neighbours(a, b);
        } else {
            if let Some(node) = self.nodes.get_mut(&a) {
                node.neighbours.remove(&b);
            }
            if let Some(node) = self.nodes.get_mut(&b) {
                node.neighbours.remove(&a);
            }
        }
    }
}

fn log_changes(entity: &str, changes: &[PropertyChange]) {
    for change in changes {
        match &change.old {
            Some(old) => info!("{} property {}: {} -> {}", entity, change.key, old, change.new),
            None => info!("{} property {}: (unset) -> {}", entity, change.key, change.new),
        }
    }
}

impl fmt::Display for GraphStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GraphStore(nodes={}, edges={})",
            self.nodes.len(),
            self.edges.len()
        )
    }
}

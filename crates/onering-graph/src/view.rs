//! Read-only views handed to the visualization layer

use crate::store::GraphStore;
use onering_core::{EdgeId, NodeId, Properties, Result};
use serde::Serialize;

/// A node as the renderer sees it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub id: NodeId,
    pub name: String,
    pub class: String,
    pub properties: Properties,
    pub hub: bool,
}

/// An edge with its endpoints resolved to names
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeView {
    pub id: EdgeId,
    pub source: String,
    pub target: String,
    pub class: String,
    pub properties: Properties,
}

impl GraphStore {
    /// Every node, in creation order
    pub fn node_views(&self) -> Vec<NodeView> {
        self.get_all_nodes(None)
            .into_iter()
            .map(|node| NodeView {
                id: node.id,
                name: node.name.clone(),
                class: node.class.name().to_string(),
                properties: node.properties.clone(),
                hub: node.hub,
            })
            .collect()
    }

    /// Every edge, in creation order
    pub fn edge_views(&self) -> Result<Vec<EdgeView>> {
        self.get_all_edges(None)
            .into_iter()
            .map(|edge| {
                let (source, target) = self.endpoint_key(edge)?;
                Ok(EdgeView {
                    id: edge.id,
                    source,
                    target,
                    class: edge.class.name().to_string(),
                    properties: edge.properties.clone(),
                })
            })
            .collect()
    }

    /// One `Source --CLASS--> Target` line per edge
    pub fn linearise(&self) -> Result<Vec<String>> {
        Ok(self
            .edge_views()?
            .into_iter()
            .map(|edge| format!("{} --{}--> {}", edge.source, edge.class, edge.target))
            .collect())
    }
}

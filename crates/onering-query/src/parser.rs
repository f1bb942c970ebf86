//! ORQL parser
//!
//! Turns a validated statement into a [`Command`] bound to store identifiers.
//! Names resolve against the current store: nodes by first exact match, edge
//! endpoint pairs through the (source name, target name) index.
//!
//! UPDATE applies its brace block here, as a property merge, before the
//! command reaches the executor; any `WHERE` pairs travel with the command and
//! are merged as a second pass at execution time.

use crate::grammar::{EdgePattern, NodePattern, PathSearch, Statement, Target, parse_statement};
use crate::session::DisplayFlag;
use onering_core::{EdgeId, Error, HUBS_CLASS, NodeId, Properties, PropertyFilter, Result};
use onering_graph::{EdgeUpdate, FieldValue, GraphStore, NodeUpdate};
use serde::Serialize;
use tracing::{debug, warn};

/// The only field an ORQL UPDATE writes
const PROPERTIES_FIELD: &str = "properties";

/// Which nodes a READ selects
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NodeSelection {
    All,
    Class(String),
    Hubs,
    Node(NodeId),
}

/// Which edges a READ selects
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EdgeSelection {
    All,
    Class(String),
    Edge(EdgeId),
}

/// A resolved ORQL command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Command {
    CreateNode {
        name: String,
        class: Option<String>,
        properties: Properties,
    },
    CreateEdge {
        source: NodeId,
        target: NodeId,
        class: Option<String>,
        properties: Properties,
    },
    ReadNodes {
        selection: NodeSelection,
        filter: Option<PropertyFilter>,
    },
    ReadEdges {
        selection: EdgeSelection,
        filter: Option<PropertyFilter>,
    },
    UpdateNode {
        id: NodeId,
        /// Keys already merged from the brace block
        applied: usize,
        /// `WHERE` pairs still to merge
        pending: Option<Properties>,
    },
    UpdateEdge {
        id: EdgeId,
        applied: usize,
        pending: Option<Properties>,
    },
    DeleteNode(NodeId),
    DeleteEdges(Vec<EdgeId>),
    Link {
        source: NodeId,
        target: NodeId,
        search: PathSearch,
    },
    Display {
        flag: DisplayFlag,
        enabled: bool,
    },
}

/// Validate and resolve one ORQL line
pub fn parse_line(line: &str, store: &mut GraphStore) -> Result<Command> {
    let statement = parse_statement(line)?;
    debug!("Parsed statement {:?}", statement);
    resolve(statement, store)
}

/// Resolve a statement against the store
pub fn resolve(statement: Statement, store: &mut GraphStore) -> Result<Command> {
    match statement {
        Statement::Create(Target::Node(node)) => Ok(Command::CreateNode {
            name: required(node.name, "node name")?,
            class: node.class,
            properties: node.properties.unwrap_or_default(),
        }),
        Statement::Create(Target::Edge(edge)) => {
            let (source, target) = required(edge.endpoints, "edge endpoints")?;
            Ok(Command::CreateEdge {
                source: store.get_node_by_name(&source)?.id,
                target: store.get_node_by_name(&target)?.id,
                class: edge.class,
                properties: edge.properties.unwrap_or_default(),
            })
        }

        Statement::Read {
            target: Target::Node(node),
            condition,
        } => {
            let selection = match (node.name, node.class) {
                (Some(name), _) => NodeSelection::Node(store.get_node_by_name(&name)?.id),
                (None, Some(class)) if class == HUBS_CLASS => NodeSelection::Hubs,
                (None, Some(class)) => NodeSelection::Class(class),
                (None, None) => NodeSelection::All,
            };
            Ok(Command::ReadNodes {
                selection,
                filter: condition,
            })
        }
        Statement::Read {
            target: Target::Edge(edge),
            condition,
        } => {
            let selection = match (edge.endpoints, edge.class) {
                (Some((source, target)), _) => {
                    EdgeSelection::Edge(store.get_edge_by_nodes_names(&source, &target)?.id)
                }
                (None, Some(class)) => EdgeSelection::Class(class),
                (None, None) => EdgeSelection::All,
            };
            Ok(Command::ReadEdges {
                selection,
                filter: condition,
            })
        }

        Statement::Update {
            target: Target::Node(node),
            condition,
        } => resolve_node_update(node, condition, store),
        Statement::Update {
            target: Target::Edge(edge),
            condition,
        } => resolve_edge_update(edge, condition, store),

        Statement::Delete(Target::Node(node)) => {
            let name = required(node.name, "node name")?;
            Ok(Command::DeleteNode(store.get_node_by_name(&name)?.id))
        }
        Statement::Delete(Target::Edge(edge)) => match (edge.endpoints, edge.class) {
            (Some((source, target)), _) => Ok(Command::DeleteEdges(vec![
                store.get_edge_by_nodes_names(&source, &target)?.id,
            ])),
            (None, Some(class)) => Ok(Command::DeleteEdges(
                store
                    .get_edges_by_class(&class, None)
                    .iter()
                    .map(|edge| edge.id)
                    .collect(),
            )),
            (None, None) => Err(Error::Validation(
                "DELETE needs edge endpoints or a class".to_string(),
            )),
        },

        Statement::Link {
            source,
            target,
            search,
        } => Ok(Command::Link {
            source: store.get_node_by_name(&source)?.id,
            target: store.get_node_by_name(&target)?.id,
            search,
        }),

        Statement::Display { flag, enabled } => Ok(Command::Display { flag, enabled }),
    }
}

fn resolve_node_update(
    node: NodePattern,
    condition: Option<Properties>,
    store: &mut GraphStore,
) -> Result<Command> {
    let name = required(node.name, "node name")?;
    let found = store.get_node_by_name(&name)?;
    if let Some(class) = node.class.as_deref().filter(|class| !found.has_class(class)) {
        warn!(
            "UPDATE names {} with class {}, but it is {}; updating by name",
            name, class, found.class
        );
    }
    let id = found.id;

    let properties = node.properties.unwrap_or_default();
    let applied = properties.len();
    store.update_node(id, node_properties_update(properties)?)?;

    Ok(Command::UpdateNode {
        id,
        applied,
        pending: condition,
    })
}

fn resolve_edge_update(
    edge: EdgePattern,
    condition: Option<Properties>,
    store: &mut GraphStore,
) -> Result<Command> {
    let (source, target) = required(edge.endpoints, "edge endpoints")?;
    let id = match &edge.class {
        Some(class) => store.get_edge_by_class_and_nodes_names(class, &source, &target)?,
        None => store.get_edge_by_nodes_names(&source, &target)?,
    }
    .id;

    let properties = edge.properties.unwrap_or_default();
    let applied = properties.len();
    store.update_edge(id, edge_properties_update(properties)?)?;

    Ok(Command::UpdateEdge {
        id,
        applied,
        pending: condition,
    })
}

/// Node update for a property merge, built through the field validation
pub(crate) fn node_properties_update(properties: Properties) -> Result<NodeUpdate> {
    NodeUpdate::from_field(PROPERTIES_FIELD, FieldValue::Properties(properties))
}

/// Edge counterpart of [`node_properties_update`]
pub(crate) fn edge_properties_update(properties: Properties) -> Result<EdgeUpdate> {
    EdgeUpdate::from_field(PROPERTIES_FIELD, FieldValue::Properties(properties))
}

fn required<T>(value: Option<T>, what: &str) -> Result<T> {
    value.ok_or_else(|| Error::Validation(format!("missing {}", what)))
}

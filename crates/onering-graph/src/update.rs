//! Field-scoped updates for nodes and edges

use onering_core::{Error, Label, NodeId, Properties, Result};

/// A value supplied for a named field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Node(NodeId),
    Properties(Properties),
}

/// A single change to a node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeUpdate {
    /// Rename; rewrites the name index and every endpoint key touching the node
    Name(String),
    Class(Label),
    /// Merge into the existing map
    Properties(Properties),
}

impl NodeUpdate {
    /// Build an update from a field name. Names are matched case-insensitively and
    /// `property` is accepted for `properties`.
    pub fn from_field(field: &str, value: FieldValue) -> Result<Self> {
        match (field.to_ascii_lowercase().as_str(), value) {
            ("name", FieldValue::Text(name)) => Ok(NodeUpdate::Name(name)),
            ("class", FieldValue::Text(class)) => Ok(NodeUpdate::Class(Label::new(class))),
            ("properties" | "property", FieldValue::Properties(props)) => {
                Ok(NodeUpdate::Properties(props))
            }
            ("name" | "class" | "properties" | "property", value) => Err(Error::Validation(
                format!("node field '{}' cannot take {:?}", field, value),
            )),
            _ => Err(Error::Validation(format!(
                "unknown node field '{}', expected name, class or properties",
                field
            ))),
        }
    }
}

/// A single change to an edge
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeUpdate {
    Source(NodeId),
    Target(NodeId),
    Class(Label),
    /// Merge into the existing map
    Properties(Properties),
}

impl EdgeUpdate {
    /// Build an update from a field name, matched like [`NodeUpdate::from_field`]
    pub fn from_field(field: &str, value: FieldValue) -> Result<Self> {
        match (field.to_ascii_lowercase().as_str(), value) {
            ("source", FieldValue::Node(id)) => Ok(EdgeUpdate::Source(id)),
            ("target", FieldValue::Node(id)) => Ok(EdgeUpdate::Target(id)),
            ("class", FieldValue::Text(class)) => Ok(EdgeUpdate::Class(Label::new(class))),
            ("properties" | "property", FieldValue::Properties(props)) => {
                Ok(EdgeUpdate::Properties(props))
            }
            ("source" | "target" | "class" | "properties" | "property", value) => Err(
                Error::Validation(format!("edge field '{}' cannot take {:?}", field, value)),
            ),
            _ => Err(Error::Validation(format!(
                "unknown edge field '{}', expected source, target, class or properties",
                field
            ))),
        }
    }
}

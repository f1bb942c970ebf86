//! Bulk loading from the JSON dataset format
//!
//! ```json
//! {
//!   "nodes": { "Frodo": "Hobbit", "The Shire": "Location" },
//!   "relationships": [["Frodo", "The Shire", "LIVES_IN", {"status": "home"}]]
//! }
//! ```

use crate::store::GraphStore;
use onering_core::{Error, Properties, PropertyValue, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::info;

/// A relationship entry: source name, target name, class, properties
pub type Relationship = (String, String, String, Map<String, Value>);

/// A dataset document. Node entries keep their document order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub nodes: Map<String, Value>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

/// Counts reported after a load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub nodes_created: usize,
    pub edges_created: usize,
}

impl Dataset {
    /// Parse a dataset from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a dataset file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Create every node in document order, then every relationship in listed
    /// order. Endpoint names resolve to the first node with that name.
    pub fn load_into(&self, store: &mut GraphStore) -> Result<LoadSummary> {
        let mut summary = LoadSummary::default();

        for (name, class) in &self.nodes {
            let class = class.as_str().ok_or_else(|| {
                Error::Deserialization(format!("class of node '{}' must be a string", name))
            })?;
            store.create_node(name.as_str(), Some(class), Properties::new());
            summary.nodes_created += 1;
        }

        for (source, target, class, properties) in &self.relationships {
            let source = store.get_node_by_name(source)?.id;
            let target = store.get_node_by_name(target)?.id;
            let properties: Properties = properties
                .iter()
                .map(|(key, value)| (key.clone(), PropertyValue::from(value.clone())))
                .collect();
            store.create_edge(source, target, Some(class), properties)?;
            summary.edges_created += 1;
        }

        info!(
            "Loaded dataset: {} nodes, {} edges",
            summary.nodes_created, summary.edges_created
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "nodes": {"Frodo": "Hobbit", "Sam": "Hobbit", "The Shire": "Location"},
        "relationships": [
            ["Frodo", "Sam", "FRIENDS_WITH", {"loyalty": "unbreakable"}],
            ["Sam", "The Shire", "LIVES_IN", {"status": "home", "years": 38, "native": true}]
        ]
    }"#;

    #[test]
    fn test_load_sample() {
        let dataset = Dataset::from_json_str(SAMPLE).unwrap();
        let mut store = GraphStore::new();
        let summary = dataset.load_into(&mut store).unwrap();

        assert_eq!(
            summary,
            LoadSummary {
                nodes_created: 3,
                edges_created: 2
            }
        );

        let names: Vec<&str> = store.get_all_nodes(None).iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Frodo", "Sam", "The Shire"]);

        let lives = store.get_edge_by_nodes_names("Sam", "The Shire").unwrap();
        assert_eq!(lives.class.name(), "LIVES_IN");
        assert_eq!(lives.properties.get("years"), Some(&PropertyValue::Integer(38)));
        assert_eq!(lives.properties.get("native"), Some(&PropertyValue::Boolean(true)));
    }

    #[test]
    fn test_unknown_endpoint() {
        let dataset = Dataset::from_json_str(
            r#"{
                "nodes": {"Frodo": "Hobbit"},
                "relationships": [["Frodo", "Sauron", "FEARS", {}]]
            }"#,
        )
        .unwrap();
        let mut store = GraphStore::new();
        let err = dataset.load_into(&mut store).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.node_count(), 1);
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(
            Dataset::from_json_str("{\"nodes\": [1, 2]}"),
            Err(Error::Deserialization(_))
        ));

        let dataset = Dataset::from_json_str(r#"{"nodes": {"Frodo": 3}}"#).unwrap();
        assert!(dataset.load_into(&mut GraphStore::new()).is_err());
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let dataset = Dataset::from_path(file.path()).unwrap();
        assert_eq!(dataset.nodes.len(), 3);
        assert_eq!(dataset.relationships.len(), 2);

        assert!(matches!(
            Dataset::from_path("/definitely/not/here.json"),
            Err(Error::Io(_))
        ));
    }
}

//! OneRingDB - in-memory graph store with the ORQL query language
//!
//! This is the main library crate that re-exports all OneRingDB components.

pub use onering_core as core;
pub use onering_engine as engine;
pub use onering_graph as graph;
pub use onering_query as query;

// Re-export commonly used types
pub use onering_core::{
    Direction, Edge, EdgeId, Error, Node, NodeId, Properties, PropertyFilter, PropertyValue,
    Result,
};

pub use onering_engine::{Engine, EngineConfig, init_logging};
pub use onering_graph::{Dataset, EdgeView, GraphStore, NodeView, PathBounds};
pub use onering_query::{
    BatchOutcome, DisplayFlags, ExecutorOptions, QueryExecutor, QueryResult, ResultRows,
};

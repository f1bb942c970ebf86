//! OneRingDB Graph Store
//!
//! The in-memory store and the algorithms that run over it.
//!
//! # Overview
//!
//! - `store` - nodes, edges and their synchronized indices
//! - `update` - field-scoped node and edge updates
//! - `pathfinding` - shortest path and bounded all-simple-paths search
//! - `dataset` - bulk loading from JSON
//! - `view` - read-only node/edge views for visualization

pub mod dataset;
pub mod pathfinding;
pub mod store;
pub mod update;
pub mod view;

pub use dataset::{Dataset, LoadSummary};
pub use pathfinding::{AdjacencyView, PathBounds, all_simple_paths, shortest_path};
pub use store::GraphStore;
pub use update::{EdgeUpdate, FieldValue, NodeUpdate};
pub use view::{EdgeView, NodeView};

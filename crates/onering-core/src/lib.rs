//! OneRingDB Core Library
//!
//! This crate provides the fundamental types and error handling shared by the
//! OneRingDB graph store and the ORQL query pipeline.
//!
//! # Modules
//!
//! - `types` - Nodes, edges, class labels and traversal directions
//! - `property` - Scalar property values, property maps and literal coercion
//! - `filter` - Conjunctive and disjunctive property filters
//! - `error` - Error types and result aliases
//! - `id` - Entity identification and generation

pub mod error;
pub mod filter;
pub mod id;
pub mod property;
pub mod types;

pub use error::{Error, Result};
pub use filter::PropertyFilter;
pub use id::{EdgeId, EntityId, IdGenerator, NodeId};
pub use property::{Properties, PropertyChange, PropertyValue};
pub use types::{DEFAULT_CLASS, Direction, Edge, HUBS_CLASS, Label, Node};

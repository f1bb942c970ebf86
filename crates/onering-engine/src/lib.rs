//! OneRingDB Engine
//!
//! Ties the graph store and the ORQL executor together for embedding hosts.
//!
//! # Features
//!
//! - Owned store plus session display flags
//! - Dataset bulk load at startup
//! - JSON configuration
//! - `tracing` subscriber setup

pub mod config;
pub mod engine;
pub mod logging;

pub use config::EngineConfig;
pub use engine::Engine;
pub use logging::init_logging;

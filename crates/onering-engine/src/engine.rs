//! Embedding handle
//!
//! An [`Engine`] owns one graph store together with the session display flags
//! and the executor settings. Hosts run ORQL batches through it and read the
//! store back for presentation.

use crate::config::EngineConfig;
use onering_core::Result;
use onering_graph::{Dataset, GraphStore, LoadSummary};
use onering_query::{BatchOutcome, DisplayFlags, QueryExecutor};
use std::path::Path;
use tracing::info;

/// OneRingDB engine
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    store: GraphStore,
    flags: DisplayFlags,
    executor: QueryExecutor,
}

impl Engine {
    /// Create an engine, loading the configured dataset if there is one
    pub fn new(config: EngineConfig) -> Result<Self> {
        let executor = QueryExecutor::new(config.executor_options());
        let mut engine = Self {
            config,
            store: GraphStore::new(),
            flags: DisplayFlags::new(),
            executor,
        };

        if let Some(path) = engine.config.dataset.clone() {
            engine.load_dataset(&path)?;
        }

        info!(
            "OneRingDB v{} ready: {}",
            Self::version(),
            engine.store
        );
        Ok(engine)
    }

    /// Create an empty engine with default settings
    pub fn in_memory() -> Self {
        Self {
            config: EngineConfig::default(),
            store: GraphStore::new(),
            flags: DisplayFlags::new(),
            executor: QueryExecutor::default(),
        }
    }

    /// Bulk-load a dataset file into the store
    pub fn load_dataset<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadSummary> {
        info!("Loading dataset from {:?}", path.as_ref());
        Dataset::from_path(path)?.load_into(&mut self.store)
    }

    /// Execute a batch of ORQL lines
    pub fn execute(&mut self, batch: &str) -> Result<BatchOutcome> {
        self.executor
            .execute(batch, &mut self.store, &mut self.flags)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Mutable store access for collaborators such as clustering, which
    /// write hub flags directly
    pub fn store_mut(&mut self) -> &mut GraphStore {
        &mut self.store
    }

    pub fn flags(&self) -> &DisplayFlags {
        &self.flags
    }

    /// Get the engine version
    pub fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

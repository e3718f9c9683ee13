//! Recommendation engine
//!
//! Serves recommendations from an immutable graph snapshot. Requests clone an
//! `Arc` to the current snapshot and run without further locking; reloading
//! swaps the `Arc`, so in-flight requests finish on the graphs they started
//! with.

use crate::errors::{RecommendError, Result};
use crate::graph::cooccurrence::GraphSet;
use crate::graph::persist::{self, GraphFormat};
use crate::types::{EntityId, Granularity, RecommendConfig};
use crate::variants::{self, Algorithm, AlgorithmKind, Recommendation};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

/// Atomically replaceable reference to the active graph set
#[derive(Debug, Default)]
pub struct SnapshotHandle {
    current: RwLock<Option<Arc<GraphSet>>>,
}

impl SnapshotHandle {
    /// Create an empty handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle with an initial graph set
    pub fn with_graphs(graphs: GraphSet) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(graphs))),
        }
    }

    /// The active snapshot, if any
    pub fn load(&self) -> Option<Arc<GraphSet>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Install a new graph set, returning the previous snapshot
    pub fn swap(&self, graphs: GraphSet) -> Option<Arc<GraphSet>> {
        let next = Arc::new(graphs);
        let nodes = next.sentence.num_nodes;
        let previous = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(next);
        tracing::info!(nodes, replaced = previous.is_some(), "swapped graph snapshot");
        previous
    }

    /// Remove the active snapshot
    pub fn clear(&self) -> Option<Arc<GraphSet>> {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn is_loaded(&self) -> bool {
        self.load().is_some()
    }
}

/// One recommendation request against the engine
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRequest {
    /// Resolved seed entity ids, in priority order
    pub seeds: Vec<EntityId>,
    pub granularity: Granularity,
    pub algorithm: Algorithm,
    /// Overrides the configured `top_k`
    pub top_k: Option<usize>,
}

impl RecommendationRequest {
    pub fn new(seeds: Vec<EntityId>, algorithm: Algorithm) -> Self {
        Self {
            seeds,
            granularity: Granularity::default(),
            algorithm,
            top_k: None,
        }
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }
}

/// Runs the algorithm suite over the active snapshot
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    snapshot: Arc<SnapshotHandle>,
    config: RecommendConfig,
}

impl RecommendationEngine {
    /// Create an engine with no graphs loaded
    pub fn new(config: RecommendConfig) -> Result<Self> {
        Self::with_snapshot(Arc::new(SnapshotHandle::new()), config)
    }

    /// Create an engine sharing an existing snapshot handle
    pub fn with_snapshot(snapshot: Arc<SnapshotHandle>, config: RecommendConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { snapshot, config })
    }

    pub fn config(&self) -> &RecommendConfig {
        &self.config
    }

    /// Shared snapshot handle (clone it to reload from elsewhere)
    pub fn snapshot(&self) -> &Arc<SnapshotHandle> {
        &self.snapshot
    }

    /// Install a freshly built graph set
    pub fn load_graphs(&self, graphs: GraphSet) {
        self.snapshot.swap(graphs);
    }

    /// Load a persisted graph set directory and install it
    pub fn load_from_dir(&self, dir: &Path, format: GraphFormat) -> Result<()> {
        let graphs = persist::load_graph_set(dir, format)?;
        self.load_graphs(graphs);
        Ok(())
    }

    /// An algorithm with this engine's configured parameters
    pub fn algorithm(&self, kind: AlgorithmKind) -> Algorithm {
        Algorithm::from_kind(kind, &self.config)
    }

    /// Run one request
    pub fn recommend(&self, request: &RecommendationRequest) -> Result<Recommendation> {
        let graphs = self
            .snapshot
            .load()
            .ok_or_else(|| RecommendError::graph_not_loaded(request.granularity.as_str()))?;
        let graph = graphs.get(request.granularity);
        let top_k = request.top_k.unwrap_or(self.config.top_k);

        let recommendation =
            variants::recommend(graph, &request.seeds, &request.algorithm, top_k)?;
        tracing::debug!(
            algorithm = %recommendation.algorithm,
            granularity = %request.granularity,
            seeds = request.seeds.len(),
            results = recommendation.entities().len(),
            complete = recommendation.complete,
            "served recommendation"
        );
        Ok(recommendation)
    }
}

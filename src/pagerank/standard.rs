//! Standard (uniform teleport) PageRank

use super::{power_iterate, PageRankResult};
use crate::graph::csr::CsrGraph;

/// PageRank with a uniform teleport vector
#[derive(Debug, Clone)]
pub struct StandardPageRank {
    damping: f64,
    max_iterations: usize,
    threshold: f64,
}

impl Default for StandardPageRank {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardPageRank {
    pub fn new() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 100,
            threshold: 1e-6,
        }
    }

    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Run PageRank on a graph
    pub fn run(&self, graph: &CsrGraph) -> PageRankResult {
        let n = graph.num_nodes;
        let uniform = vec![1.0 / n.max(1) as f64; n];
        power_iterate(
            graph,
            &uniform,
            self.damping,
            self.max_iterations,
            self.threshold,
        )
    }
}

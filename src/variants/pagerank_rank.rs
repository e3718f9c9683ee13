//! Personalized PageRank ranking
//!
//! Restarts on the seed set and ranks every other reachable node by its
//! stationary score. Hitting the iteration cap is not an error: the
//! best-effort scores are returned with `complete == false`.

use super::{rank_scores, AlgorithmKind, Recommendation, Recommender};
use crate::errors::Result;
use crate::graph::csr::CsrGraph;
use crate::pagerank::personalized::{seed_personalization, PersonalizedPageRank};
use crate::pagerank::PageRankResult;

/// PageRank recommender
#[derive(Debug, Clone, PartialEq)]
pub struct PageRankRecommender {
    pub damping: f64,
    pub max_iterations: usize,
    pub threshold: f64,
}

impl Default for PageRankRecommender {
    fn default() -> Self {
        Self::new()
    }
}

impl PageRankRecommender {
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

    /// Raw PageRank scores restarting on `seeds`
    pub fn run(&self, graph: &CsrGraph, seeds: &[u32]) -> PageRankResult {
        PersonalizedPageRank::new()
            .with_damping(self.damping)
            .with_max_iterations(self.max_iterations)
            .with_threshold(self.threshold)
            .with_personalization(seed_personalization(seeds, graph.num_nodes))
            .run(graph)
    }
}

impl Recommender for PageRankRecommender {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::PageRank
    }

    fn recommend(&self, graph: &CsrGraph, seeds: &[u32], top_k: usize) -> Result<Recommendation> {
        let pagerank = self.run(graph, seeds);
        let scores = pagerank
            .scores
            .iter()
            .enumerate()
            .map(|(node, &score)| (node as u32, score));
        let ranked = rank_scores(graph, scores, seeds, top_k);

        let mut recommendation = Recommendation::ranked(self.kind(), ranked);
        recommendation.complete = pagerank.converged;
        recommendation.iterations = pagerank.iterations;
        Ok(recommendation)
    }
}

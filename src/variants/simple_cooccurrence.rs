//! Simple co-occurrence ranking
//!
//! Score of a candidate = sum of its edge weights to every seed. Only direct
//! neighbors of the seed set can score.

use super::{rank_scores, AlgorithmKind, Recommendation, Recommender};
use crate::errors::Result;
use crate::graph::csr::CsrGraph;
use rustc_hash::FxHashMap;

/// Neighbors ranked by summed co-occurrence with the seeds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimpleCooccurrence;

impl SimpleCooccurrence {
    /// Summed edge weight to the seeds, per neighbor
    pub fn scores(&self, graph: &CsrGraph, seeds: &[u32]) -> FxHashMap<u32, f64> {
        let mut scores: FxHashMap<u32, f64> = FxHashMap::default();
        for &seed in seeds {
            for (neighbor, weight) in graph.neighbors(seed) {
                *scores.entry(neighbor).or_insert(0.0) += weight as f64;
            }
        }
        scores
    }
}

impl Recommender for SimpleCooccurrence {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::SimpleCooccurrence
    }

    fn recommend(&self, graph: &CsrGraph, seeds: &[u32], top_k: usize) -> Result<Recommendation> {
        let ranked = rank_scores(graph, self.scores(graph, seeds), seeds, top_k);
        Ok(Recommendation::ranked(self.kind(), ranked))
    }
}

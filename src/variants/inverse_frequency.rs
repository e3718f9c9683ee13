//! Inverse frequency ranking
//!
//! Discounts popular hubs: a candidate's summed edge weight to the seeds is
//! divided by its degree, so a node that co-occurs with everything ranks below
//! a specific companion with the same raw count.

use super::{rank_scores, AlgorithmKind, Recommendation, Recommender};
use crate::errors::Result;
use crate::graph::csr::CsrGraph;
use rustc_hash::FxHashMap;

/// `score(n) = sum over seeds of weight(seed, n) / degree(n)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InverseFrequency;

impl InverseFrequency {
    pub fn scores(&self, graph: &CsrGraph, seeds: &[u32]) -> FxHashMap<u32, f64> {
        let mut scores: FxHashMap<u32, f64> = FxHashMap::default();
        for &seed in seeds {
            for (neighbor, weight) in graph.neighbors(seed) {
                // Neighbors always have degree >= 1
                let degree = graph.degree(neighbor) as f64;
                *scores.entry(neighbor).or_insert(0.0) += weight as f64 / degree;
            }
        }
        scores
    }
}

impl Recommender for InverseFrequency {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::InverseFrequency
    }

    fn recommend(&self, graph: &CsrGraph, seeds: &[u32], top_k: usize) -> Result<Recommendation> {
        let ranked = rank_scores(graph, self.scores(graph, seeds), seeds, top_k);
        Ok(Recommendation::ranked(self.kind(), ranked))
    }
}

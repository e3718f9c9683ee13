//! Weighted random walk
//!
//! Starts at a uniformly chosen seed and moves `length` times, each time to a
//! neighbor drawn with probability proportional to edge weight. A dead end
//! stops the walk early.

use super::walk::{seeded_rng, step_candidates, uniform_choice, weighted_choice, WalkPath};
use super::{AlgorithmKind, Recommendation, Recommender};
use crate::errors::{RecommendError, Result};
use crate::graph::csr::CsrGraph;
use rand::Rng;

/// Random walk recommender
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomWalk {
    /// Number of steps (the path holds up to `length + 1` nodes)
    pub length: usize,
    /// Prefer unvisited neighbors when any exist
    pub avoid_revisits: bool,
    /// Fixed generator seed for reproducible walks
    pub rng_seed: Option<u64>,
}

impl Default for RandomWalk {
    fn default() -> Self {
        Self {
            length: 5,
            avoid_revisits: false,
            rng_seed: None,
        }
    }
}

impl RandomWalk {
    pub fn new(length: usize) -> Self {
        Self {
            length,
            ..Self::default()
        }
    }

    pub fn with_avoid_revisits(mut self, avoid: bool) -> Self {
        self.avoid_revisits = avoid;
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Walk from `start` with an injected generator.
    ///
    /// Returns the path and whether all `length` steps were taken.
    pub fn walk_from<R: Rng + ?Sized>(
        &self,
        graph: &CsrGraph,
        start: u32,
        rng: &mut R,
    ) -> (WalkPath, bool) {
        let mut path = WalkPath::starting_at(graph, start);
        let mut visited = vec![false; graph.num_nodes];
        visited[start as usize] = true;

        let mut current = start;
        for _ in 0..self.length {
            let candidates = step_candidates(graph, current, &visited, self.avoid_revisits);
            let Some(next) = weighted_choice(&candidates, rng) else {
                return (path, false);
            };
            path.push(graph, next, false);
            visited[next as usize] = true;
            current = next;
        }
        (path, true)
    }
}

impl Recommender for RandomWalk {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::RandomWalk
    }

    fn recommend(&self, graph: &CsrGraph, seeds: &[u32], _top_k: usize) -> Result<Recommendation> {
        let mut rng = seeded_rng(self.rng_seed);
        let start = uniform_choice(seeds, &mut rng)
            .ok_or_else(|| RecommendError::invalid_request("random walks need a seed entity"))?;
        let (path, complete) = self.walk_from(graph, start, &mut rng);
        Ok(Recommendation::path(self.kind(), path, complete))
    }
}

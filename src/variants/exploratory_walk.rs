//! Exploratory walk
//!
//! A weighted random walk that, before each step, teleports with probability
//! `teleport_probability` to a uniformly drawn non-isolated node. Teleported
//! steps are marked as detours in the path.

use super::walk::{
    seeded_rng, step_candidates, teleport_targets, uniform_choice, weighted_choice, WalkPath,
};
use super::{AlgorithmKind, Recommendation, Recommender};
use crate::errors::{RecommendError, Result};
use crate::graph::csr::CsrGraph;
use rand::Rng;

/// Random walk with teleportation
#[derive(Debug, Clone, PartialEq)]
pub struct ExploratoryWalk {
    pub length: usize,
    /// Chance of teleporting before each step
    pub teleport_probability: f64,
    pub avoid_revisits: bool,
    pub rng_seed: Option<u64>,
}

impl Default for ExploratoryWalk {
    fn default() -> Self {
        Self {
            length: 5,
            teleport_probability: 0.1,
            avoid_revisits: false,
            rng_seed: None,
        }
    }
}

impl ExploratoryWalk {
    pub fn new(length: usize, teleport_probability: f64) -> Self {
        Self {
            length,
            teleport_probability,
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

    fn teleport<R: Rng + ?Sized>(
        &self,
        graph: &CsrGraph,
        current: u32,
        visited: &[bool],
        rng: &mut R,
    ) -> Option<u32> {
        let targets = teleport_targets(graph, &[current]);
        if self.avoid_revisits {
            let fresh: Vec<u32> = targets
                .iter()
                .copied()
                .filter(|&v| !visited[v as usize])
                .collect();
            if let Some(target) = uniform_choice(&fresh, rng) {
                return Some(target);
            }
        }
        uniform_choice(&targets, rng)
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
            if rng.gen::<f64>() < self.teleport_probability {
                if let Some(target) = self.teleport(graph, current, &visited, rng) {
                    path.push(graph, target, true);
                    visited[target as usize] = true;
                    current = target;
                    continue;
                }
            }

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

impl Recommender for ExploratoryWalk {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::ExploratoryWalk
    }

    fn recommend(&self, graph: &CsrGraph, seeds: &[u32], _top_k: usize) -> Result<Recommendation> {
        let mut rng = seeded_rng(self.rng_seed);
        let start = uniform_choice(seeds, &mut rng).ok_or_else(|| {
            RecommendError::invalid_request("exploratory walks need a seed entity")
        })?;
        let (path, complete) = self.walk_from(graph, start, &mut rng);
        Ok(Recommendation::path(self.kind(), path, complete))
    }
}

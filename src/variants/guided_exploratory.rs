//! Guided exploratory walk
//!
//! A guided walk that takes random detours. Before each step it teleports with
//! probability `teleport_probability` to a uniformly drawn node (never the start
//! or the target); otherwise it takes the next shortest-path step toward the
//! target. When stranded where the target is unreachable, it is forced to
//! teleport back into the target's component.
//!
//! The walk ends at the target or after `max_steps` steps. Running out of steps
//! yields the partial path with `complete == false`, not an error.

use super::walk::{
    distances_to, greedy_step, seeded_rng, teleport_targets, uniform_choice, WalkPath,
};
use super::{guided_endpoints, AlgorithmKind, Recommendation, Recommender};
use crate::errors::{RecommendError, Result};
use crate::graph::csr::CsrGraph;
use crate::types::EntityId;
use rand::Rng;

/// Guided walk with teleportation and a step budget
#[derive(Debug, Clone, PartialEq)]
pub struct GuidedExploratory {
    /// Explicit target; the second seed is used when absent
    pub target: Option<EntityId>,
    pub max_steps: usize,
    pub teleport_probability: f64,
    pub rng_seed: Option<u64>,
}

impl Default for GuidedExploratory {
    fn default() -> Self {
        Self {
            target: None,
            max_steps: 15,
            teleport_probability: 0.1,
            rng_seed: None,
        }
    }
}

impl GuidedExploratory {
    pub fn new(max_steps: usize, teleport_probability: f64) -> Self {
        Self {
            max_steps,
            teleport_probability,
            ..Self::default()
        }
    }

    pub fn with_target(mut self, target: impl Into<EntityId>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Walk from `start` toward `target` with an injected generator.
    ///
    /// Returns the path and whether the target was reached.
    pub fn walk_between<R: Rng + ?Sized>(
        &self,
        graph: &CsrGraph,
        start: u32,
        target: u32,
        rng: &mut R,
    ) -> Result<(WalkPath, bool)> {
        let distances = distances_to(graph, target);
        if !distances[start as usize].is_finite() {
            return Err(RecommendError::no_path(
                graph.entity(start),
                graph.entity(target),
            ));
        }

        let mut path = WalkPath::starting_at(graph, start);
        let mut current = start;
        for _ in 0..self.max_steps {
            if current == target {
                break;
            }

            let detours = teleport_targets(graph, &[current, start, target]);
            if rng.gen::<f64>() < self.teleport_probability {
                if let Some(next) = uniform_choice(&detours, rng) {
                    path.push(graph, next, true);
                    current = next;
                    continue;
                }
            }

            if let Some(next) = greedy_step(graph, current, &distances) {
                path.push(graph, next, false);
                current = next;
                continue;
            }

            // Stranded outside the target's component
            let reachable: Vec<u32> = detours
                .into_iter()
                .filter(|&v| distances[v as usize].is_finite())
                .collect();
            match uniform_choice(&reachable, rng) {
                Some(next) => {
                    path.push(graph, next, true);
                    current = next;
                }
                None => break,
            }
        }

        let reached = current == target;
        Ok((path, reached))
    }
}

impl Recommender for GuidedExploratory {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::GuidedExploratory
    }

    fn recommend(&self, graph: &CsrGraph, seeds: &[u32], _top_k: usize) -> Result<Recommendation> {
        let (start, target) = guided_endpoints(graph, seeds, self.target.as_deref())?;
        let mut rng = seeded_rng(self.rng_seed);
        let (path, reached) = self.walk_between(graph, start, target, &mut rng)?;
        Ok(Recommendation::path(self.kind(), path, reached))
    }
}

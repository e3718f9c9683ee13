//! Guided walk
//!
//! Walks from a start entity to a target entity along a weighted shortest
//! path (edge cost `1 / weight`): each step goes to the neighbor minimizing
//! edge cost plus remaining distance to the target. Remaining distance strictly
//! decreases, so the walk reaches the target in at most `n - 1` steps.

use super::walk::{distances_to, greedy_step, WalkPath};
use super::{guided_endpoints, AlgorithmKind, Recommendation, Recommender};
use crate::errors::{RecommendError, Result};
use crate::graph::csr::CsrGraph;
use crate::types::EntityId;

/// Deterministic start-to-target walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuidedWalk {
    /// Explicit target; the second seed is used when absent
    pub target: Option<EntityId>,
}

impl GuidedWalk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target: impl Into<EntityId>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Path from `start` to `target`, or `NoPath` if they are disconnected
    pub fn walk_between(&self, graph: &CsrGraph, start: u32, target: u32) -> Result<WalkPath> {
        let distances = distances_to(graph, target);
        if !distances[start as usize].is_finite() {
            return Err(RecommendError::no_path(
                graph.entity(start),
                graph.entity(target),
            ));
        }

        let mut path = WalkPath::starting_at(graph, start);
        let mut current = start;
        // A shortest path visits each node at most once.
        for _ in 0..graph.num_nodes {
            if current == target {
                return Ok(path);
            }
            let Some(next) = greedy_step(graph, current, &distances) else {
                break;
            };
            path.push(graph, next, false);
            current = next;
        }
        if current == target {
            Ok(path)
        } else {
            Err(RecommendError::no_path(graph.entity(start), graph.entity(target)))
        }
    }
}

impl Recommender for GuidedWalk {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::GuidedWalk
    }

    fn recommend(&self, graph: &CsrGraph, seeds: &[u32], _top_k: usize) -> Result<Recommendation> {
        let (start, target) = guided_endpoints(graph, seeds, self.target.as_deref())?;
        let path = self.walk_between(graph, start, target)?;
        Ok(Recommendation::path(self.kind(), path, true))
    }
}

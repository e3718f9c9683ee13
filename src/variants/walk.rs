//! Shared walk machinery: paths, weighted neighbor choice, teleport targets
//! and distances to a target node.

use crate::graph::csr::CsrGraph;
use crate::types::EntityId;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// One visited node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkStep {
    pub entity: EntityId,
    /// Reached by teleportation rather than along an edge (a "detour")
    pub teleported: bool,
}

/// Ordered list of visited nodes, starting node first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkPath {
    pub steps: Vec<WalkStep>,
}

impl WalkPath {
    pub(crate) fn starting_at(graph: &CsrGraph, node: u32) -> Self {
        Self {
            steps: vec![WalkStep {
                entity: graph.entity(node).to_string(),
                teleported: false,
            }],
        }
    }

    pub(crate) fn push(&mut self, graph: &CsrGraph, node: u32, teleported: bool) {
        self.steps.push(WalkStep {
            entity: graph.entity(node).to_string(),
            teleported,
        });
    }

    /// Number of visited nodes (steps taken + 1)
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.entity.as_str())
    }

    pub fn first(&self) -> Option<&str> {
        self.steps.first().map(|s| s.entity.as_str())
    }

    pub fn last(&self) -> Option<&str> {
        self.steps.last().map(|s| s.entity.as_str())
    }

    /// Entities reached by teleportation
    pub fn detours(&self) -> impl Iterator<Item = &str> {
        self.steps
            .iter()
            .filter(|s| s.teleported)
            .map(|s| s.entity.as_str())
    }
}

/// Generator for one walk: fixed seed when given, entropy otherwise
pub(crate) fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Pick among `(node, weight)` candidates with probability proportional to weight
pub(crate) fn weighted_choice<R: Rng + ?Sized>(
    candidates: &[(u32, u32)],
    rng: &mut R,
) -> Option<u32> {
    let dist = WeightedIndex::new(candidates.iter().map(|&(_, w)| w)).ok()?;
    Some(candidates[dist.sample(rng)].0)
}

/// Pick uniformly from a slice
pub(crate) fn uniform_choice<R: Rng + ?Sized>(candidates: &[u32], rng: &mut R) -> Option<u32> {
    if candidates.is_empty() {
        None
    } else {
        Some(candidates[rng.gen_range(0..candidates.len())])
    }
}

/// Neighbors to choose from: unvisited ones when `avoid_revisits` and any exist,
/// otherwise all of them
pub(crate) fn step_candidates(
    graph: &CsrGraph,
    node: u32,
    visited: &[bool],
    avoid_revisits: bool,
) -> Vec<(u32, u32)> {
    let all: Vec<(u32, u32)> = graph.neighbors(node).collect();
    if avoid_revisits {
        let fresh: Vec<(u32, u32)> = all
            .iter()
            .copied()
            .filter(|&(u, _)| !visited[u as usize])
            .collect();
        if !fresh.is_empty() {
            return fresh;
        }
    }
    all
}

/// Non-isolated nodes other than `exclude`, ascending
pub(crate) fn teleport_targets(graph: &CsrGraph, exclude: &[u32]) -> Vec<u32> {
    (0..graph.num_nodes as u32)
        .filter(|&v| !graph.is_isolated(v) && !exclude.contains(&v))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Frontier {
    cost: f64,
    node: u32,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on cost, then node index
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Weighted shortest-path distance from every node to `target`.
///
/// Edge cost is `1 / weight`, so frequently co-occurring pairs are close.
/// Unreachable nodes get `f64::INFINITY`.
pub(crate) fn distances_to(graph: &CsrGraph, target: u32) -> Vec<f64> {
    let mut dist = vec![f64::INFINITY; graph.num_nodes];
    let mut heap = BinaryHeap::new();
    dist[target as usize] = 0.0;
    heap.push(Frontier {
        cost: 0.0,
        node: target,
    });

    while let Some(Frontier { cost, node }) = heap.pop() {
        if cost > dist[node as usize] {
            continue;
        }
        for (next, weight) in graph.neighbors(node) {
            let candidate = cost + 1.0 / weight as f64;
            if candidate < dist[next as usize] {
                dist[next as usize] = candidate;
                heap.push(Frontier {
                    cost: candidate,
                    node: next,
                });
            }
        }
    }
    dist
}

/// Next node on a shortest path from `node` to the target: the neighbor
/// minimizing edge cost plus remaining distance, ties broken by node index.
/// `None` when no neighbor can reach the target.
pub(crate) fn greedy_step(graph: &CsrGraph, node: u32, distances: &[f64]) -> Option<u32> {
    graph
        .neighbors(node)
        .filter(|&(u, _)| distances[u as usize].is_finite())
        .map(|(u, w)| (u, 1.0 / w as f64 + distances[u as usize]))
        .min_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)))
        .map(|(u, _)| u)
}

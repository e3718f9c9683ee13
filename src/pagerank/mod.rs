//! PageRank over co-occurrence graphs
//!
//! Power-method PageRank on the weighted, undirected CSR graph. Transition
//! probabilities are proportional to edge weights. Mass that would leave a
//! dangling (isolated) node is redistributed through the teleport vector, so
//! scores always sum to 1.

use crate::graph::csr::CsrGraph;

pub mod personalized;
pub mod standard;

/// Result of a PageRank run
#[derive(Debug, Clone, PartialEq)]
pub struct PageRankResult {
    /// Score per node index
    pub scores: Vec<f64>,
    /// Number of iterations performed
    pub iterations: usize,
    /// L1 change of the last iteration
    pub delta: f64,
    /// Whether `delta` fell below the threshold before the iteration cap
    pub converged: bool,
}

impl PageRankResult {
    /// Score of a node (0 for out-of-range indices)
    pub fn score(&self, node: u32) -> f64 {
        self.scores.get(node as usize).copied().unwrap_or(0.0)
    }
}

/// Shared power iteration: `r' = d * W r + (d * dangling(r) + 1 - d) * p`
pub(crate) fn power_iterate(
    graph: &CsrGraph,
    teleport: &[f64],
    damping: f64,
    max_iterations: usize,
    threshold: f64,
) -> PageRankResult {
    let n = graph.num_nodes;
    if n == 0 {
        return PageRankResult {
            scores: Vec::new(),
            iterations: 0,
            delta: 0.0,
            converged: true,
        };
    }

    let dangling = graph.dangling_nodes();
    let mut scores = teleport.to_vec();
    let mut next = vec![0.0; n];
    let mut delta = f64::INFINITY;
    let mut iterations = 0;

    while iterations < max_iterations {
        iterations += 1;

        let dangling_mass: f64 = dangling.iter().map(|&v| scores[v as usize]).sum();
        let base = damping * dangling_mass + (1.0 - damping);
        for (slot, p) in next.iter_mut().zip(teleport) {
            *slot = base * p;
        }

        for v in 0..n as u32 {
            let total = graph.node_total_weight(v);
            if total == 0 {
                continue;
            }
            let share = damping * scores[v as usize] / total as f64;
            for (u, w) in graph.neighbors(v) {
                next[u as usize] += share * w as f64;
            }
        }

        delta = scores
            .iter()
            .zip(&next)
            .map(|(a, b)| (a - b).abs())
            .sum();
        std::mem::swap(&mut scores, &mut next);

        if delta < threshold {
            return PageRankResult {
                scores,
                iterations,
                delta,
                converged: true,
            };
        }
    }

    tracing::warn!(
        iterations,
        delta,
        "PageRank hit the iteration cap before converging"
    );
    PageRankResult {
        scores,
        iterations,
        delta,
        converged: false,
    }
}

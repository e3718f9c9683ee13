//! Personalized PageRank
//!
//! Restarts on a caller-supplied distribution instead of the uniform one. The
//! recommendation engine restarts on the seed set, so scores measure how close
//! every other node sits to the seeds in the random-walk sense.

use super::{power_iterate, PageRankResult};
use crate::graph::csr::CsrGraph;

/// PageRank with a personalization (restart) vector
#[derive(Debug, Clone)]
pub struct PersonalizedPageRank {
    damping: f64,
    max_iterations: usize,
    threshold: f64,
    personalization: Option<Vec<f64>>,
}

impl Default for PersonalizedPageRank {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonalizedPageRank {
    pub fn new() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 100,
            threshold: 1e-6,
            personalization: None,
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

    /// Set the restart distribution (normalized before use)
    pub fn with_personalization(mut self, personalization: Vec<f64>) -> Self {
        self.personalization = Some(personalization);
        self
    }

    /// Run personalized PageRank on a graph
    pub fn run(&self, graph: &CsrGraph) -> PageRankResult {
        let teleport = normalize(self.personalization.as_deref(), graph.num_nodes);
        power_iterate(
            graph,
            &teleport,
            self.damping,
            self.max_iterations,
            self.threshold,
        )
    }
}

/// Normalize a personalization vector to sum 1.
///
/// Falls back to uniform when the vector is missing, has the wrong length, or
/// carries no positive mass.
fn normalize(personalization: Option<&[f64]>, n: usize) -> Vec<f64> {
    let uniform = || vec![1.0 / n.max(1) as f64; n];
    let Some(values) = personalization else {
        return uniform();
    };
    if values.len() != n {
        return uniform();
    }
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    if total <= 0.0 {
        return uniform();
    }
    values
        .iter()
        .map(|&v| if v > 0.0 { v / total } else { 0.0 })
        .collect()
}

/// Uniform restart mass over the given seed nodes
pub fn seed_personalization(seeds: &[u32], num_nodes: usize) -> Vec<f64> {
    let mut personalization = vec![0.0; num_nodes];
    for &seed in seeds {
        if let Some(slot) = personalization.get_mut(seed as usize) {
            *slot = 1.0;
        }
    }
    personalization
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphBuilder;
    use crate::types::Granularity;

    fn path_graph() -> CsrGraph {
        // a - b - c - d, plus an isolated node
        let mut builder = GraphBuilder::with_nodes(["z"]);
        builder.increment_pair("a", "b", 1);
        builder.increment_pair("b", "c", 1);
        builder.increment_pair("c", "d", 1);
        CsrGraph::from_builder(&builder, Granularity::Sentence)
    }

    #[test]
    fn test_scores_sum_to_one() {
        let graph = path_graph();
        let a = graph.node_index("a").unwrap();
        let result = PersonalizedPageRank::new()
            .with_personalization(seed_personalization(&[a], graph.num_nodes))
            .run(&graph);
        assert!(result.converged);
        assert!((result.scores.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(result.scores.iter().all(|s| *s >= 0.0));
    }

    #[test]
    fn test_closer_nodes_score_higher() {
        let graph = path_graph();
        let idx = |id: &str| graph.node_index(id).unwrap();
        let result = PersonalizedPageRank::new()
            .with_personalization(seed_personalization(&[idx("a")], graph.num_nodes))
            .run(&graph);
        assert!(result.score(idx("b")) > result.score(idx("c")));
        assert!(result.score(idx("c")) > result.score(idx("d")));
        assert_eq!(result.score(idx("z")), 0.0);
    }

    #[test]
    fn test_iteration_cap_reports_not_converged() {
        let graph = path_graph();
        let a = graph.node_index("a").unwrap();
        let result = PersonalizedPageRank::new()
            .with_max_iterations(2)
            .with_threshold(1e-15)
            .with_personalization(seed_personalization(&[a], graph.num_nodes))
            .run(&graph);
        assert!(!result.converged);
        assert_eq!(result.iterations, 2);
        assert!((result.scores.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_bad_personalization_falls_back_to_uniform() {
        assert_eq!(normalize(Some(&[0.0, 0.0]), 2), vec![0.5, 0.5]);
        assert_eq!(normalize(Some(&[1.0]), 2), vec![0.5, 0.5]);
        assert_eq!(normalize(Some(&[3.0, 1.0]), 2), vec![0.75, 0.25]);
    }
}

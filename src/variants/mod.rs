//! Recommendation algorithms
//!
//! This module provides the seven recommendation algorithms:
//! - SimpleCooccurrence: neighbors ranked by summed edge weight to the seeds
//! - PageRankRecommender: personalized PageRank restarting on the seed set
//! - InverseFrequency: co-occurrence weight discounted by neighbor degree
//! - RandomWalk: weighted random walk from a seed
//! - GuidedWalk: path from one entity to another along decreasing distance
//! - ExploratoryWalk: random walk with teleportation
//! - GuidedExploratory: guided walk with teleportation and a step budget
//!
//! Ranked algorithms never return seed entities. Walks return the visited path.

pub mod exploratory_walk;
pub mod guided_exploratory;
pub mod guided_walk;
pub mod inverse_frequency;
pub mod pagerank_rank;
pub mod random_walk;
pub mod simple_cooccurrence;
pub mod walk;

use crate::errors::{RecommendError, Result};
use crate::graph::csr::CsrGraph;
use crate::types::{EntityId, RecommendConfig, ScoredEntity};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use exploratory_walk::ExploratoryWalk;
pub use guided_exploratory::GuidedExploratory;
pub use guided_walk::GuidedWalk;
pub use inverse_frequency::InverseFrequency;
pub use pagerank_rank::PageRankRecommender;
pub use random_walk::RandomWalk;
pub use simple_cooccurrence::SimpleCooccurrence;
pub use walk::{WalkPath, WalkStep};

// ============================================================================
// Algorithm names
// ============================================================================

/// Name of one of the seven algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmKind {
    SimpleCooccurrence,
    PageRank,
    InverseFrequency,
    RandomWalk,
    GuidedWalk,
    ExploratoryWalk,
    GuidedExploratory,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 7] = [
        AlgorithmKind::SimpleCooccurrence,
        AlgorithmKind::PageRank,
        AlgorithmKind::InverseFrequency,
        AlgorithmKind::RandomWalk,
        AlgorithmKind::GuidedWalk,
        AlgorithmKind::ExploratoryWalk,
        AlgorithmKind::GuidedExploratory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlgorithmKind::SimpleCooccurrence => "simple_cooccurrence",
            AlgorithmKind::PageRank => "pagerank",
            AlgorithmKind::InverseFrequency => "inverse_frequency",
            AlgorithmKind::RandomWalk => "random_walk",
            AlgorithmKind::GuidedWalk => "guided_walk",
            AlgorithmKind::ExploratoryWalk => "exploratory_walk",
            AlgorithmKind::GuidedExploratory => "guided_exploratory",
        }
    }

    /// Whether the algorithm needs a start and a target entity
    pub fn is_guided(&self) -> bool {
        matches!(
            self,
            AlgorithmKind::GuidedWalk | AlgorithmKind::GuidedExploratory
        )
    }

    /// Whether the algorithm returns a path rather than a ranking
    pub fn is_walk(&self) -> bool {
        matches!(
            self,
            AlgorithmKind::RandomWalk
                | AlgorithmKind::GuidedWalk
                | AlgorithmKind::ExploratoryWalk
                | AlgorithmKind::GuidedExploratory
        )
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AlgorithmKind {
    type Err = RecommendError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "simple" | "simple_cooccurrence" | "cooccurrence" => {
                Ok(AlgorithmKind::SimpleCooccurrence)
            }
            "pagerank" | "page_rank" | "personalized_pagerank" => Ok(AlgorithmKind::PageRank),
            "inverse_frequency" | "inverse" | "idf" => Ok(AlgorithmKind::InverseFrequency),
            "random_walk" | "random" => Ok(AlgorithmKind::RandomWalk),
            "guided_walk" | "guided" => Ok(AlgorithmKind::GuidedWalk),
            "exploratory_walk" | "exploratory" => Ok(AlgorithmKind::ExploratoryWalk),
            "guided_exploratory" | "guided_exploratory_walk" => {
                Ok(AlgorithmKind::GuidedExploratory)
            }
            other => Err(RecommendError::invalid_request(format!(
                "unknown algorithm '{other}'"
            ))),
        }
    }
}

// ============================================================================
// Results
// ============================================================================

/// Ranked list or visited path
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum RecommendationOutput {
    Ranked(Vec<ScoredEntity>),
    Path(WalkPath),
}

/// Outcome of one algorithm run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub algorithm: AlgorithmKind,
    pub output: RecommendationOutput,
    /// False when PageRank hit its iteration cap, a guided exploratory walk ran
    /// out of steps, or a walk stopped early at a dead end
    pub complete: bool,
    /// PageRank iterations, or walk steps taken
    pub iterations: usize,
}

impl Recommendation {
    pub(crate) fn ranked(algorithm: AlgorithmKind, items: Vec<ScoredEntity>) -> Self {
        Self {
            algorithm,
            output: RecommendationOutput::Ranked(items),
            complete: true,
            iterations: 0,
        }
    }

    pub(crate) fn path(algorithm: AlgorithmKind, path: WalkPath, complete: bool) -> Self {
        let iterations = path.len().saturating_sub(1);
        Self {
            algorithm,
            output: RecommendationOutput::Path(path),
            complete,
            iterations,
        }
    }

    /// Recommended entity ids in output order
    pub fn entities(&self) -> Vec<&str> {
        match &self.output {
            RecommendationOutput::Ranked(items) => {
                items.iter().map(|s| s.entity.as_str()).collect()
            }
            RecommendationOutput::Path(path) => path.entities().collect(),
        }
    }

    pub fn ranked_items(&self) -> Option<&[ScoredEntity]> {
        match &self.output {
            RecommendationOutput::Ranked(items) => Some(items),
            RecommendationOutput::Path(_) => None,
        }
    }

    pub fn walk_path(&self) -> Option<&WalkPath> {
        match &self.output {
            RecommendationOutput::Path(path) => Some(path),
            RecommendationOutput::Ranked(_) => None,
        }
    }
}

// ============================================================================
// Recommender trait and dispatch
// ============================================================================

/// One recommendation algorithm.
///
/// `seeds` are validated, deduplicated node indices of `graph`, in request
/// order. Implementations must not mutate shared state; randomized algorithms
/// own their generator per call.
pub trait Recommender {
    fn kind(&self) -> AlgorithmKind;

    fn recommend(&self, graph: &CsrGraph, seeds: &[u32], top_k: usize) -> Result<Recommendation>;
}

/// An algorithm together with its parameters
#[derive(Debug, Clone, PartialEq)]
pub enum Algorithm {
    SimpleCooccurrence(SimpleCooccurrence),
    PageRank(PageRankRecommender),
    InverseFrequency(InverseFrequency),
    RandomWalk(RandomWalk),
    GuidedWalk(GuidedWalk),
    ExploratoryWalk(ExploratoryWalk),
    GuidedExploratory(GuidedExploratory),
}

impl Algorithm {
    /// Build an algorithm with parameters taken from a config
    pub fn from_kind(kind: AlgorithmKind, config: &RecommendConfig) -> Self {
        match kind {
            AlgorithmKind::SimpleCooccurrence => Algorithm::SimpleCooccurrence(SimpleCooccurrence),
            AlgorithmKind::PageRank => Algorithm::PageRank(
                PageRankRecommender::new()
                    .with_damping(config.damping)
                    .with_max_iterations(config.max_iterations)
                    .with_threshold(config.convergence_threshold),
            ),
            AlgorithmKind::InverseFrequency => Algorithm::InverseFrequency(InverseFrequency),
            AlgorithmKind::RandomWalk => Algorithm::RandomWalk(RandomWalk {
                length: config.walk_length,
                avoid_revisits: config.avoid_revisits,
                rng_seed: config.rng_seed,
            }),
            AlgorithmKind::GuidedWalk => Algorithm::GuidedWalk(GuidedWalk::new()),
            AlgorithmKind::ExploratoryWalk => Algorithm::ExploratoryWalk(ExploratoryWalk {
                length: config.walk_length,
                teleport_probability: config.teleport_probability,
                avoid_revisits: config.avoid_revisits,
                rng_seed: config.rng_seed,
            }),
            AlgorithmKind::GuidedExploratory => Algorithm::GuidedExploratory(GuidedExploratory {
                target: None,
                max_steps: config.max_steps,
                teleport_probability: config.teleport_probability,
                rng_seed: config.rng_seed,
            }),
        }
    }

    /// Set the target of a guided algorithm (no-op for the others)
    pub fn with_target(mut self, target: impl Into<EntityId>) -> Self {
        match &mut self {
            Algorithm::GuidedWalk(walk) => walk.target = Some(target.into()),
            Algorithm::GuidedExploratory(walk) => walk.target = Some(target.into()),
            _ => {}
        }
        self
    }

    fn recommender(&self) -> &dyn Recommender {
        match self {
            Algorithm::SimpleCooccurrence(a) => a,
            Algorithm::PageRank(a) => a,
            Algorithm::InverseFrequency(a) => a,
            Algorithm::RandomWalk(a) => a,
            Algorithm::GuidedWalk(a) => a,
            Algorithm::ExploratoryWalk(a) => a,
            Algorithm::GuidedExploratory(a) => a,
        }
    }

    pub fn kind(&self) -> AlgorithmKind {
        self.recommender().kind()
    }
}

/// Run an algorithm for a set of seed entity ids.
///
/// Seeds are deduplicated in order; every seed must be a node of `graph`.
pub fn recommend(
    graph: &CsrGraph,
    seeds: &[EntityId],
    algorithm: &Algorithm,
    top_k: usize,
) -> Result<Recommendation> {
    let mut nodes: Vec<u32> = Vec::with_capacity(seeds.len());
    for seed in seeds {
        let node = graph.node_index(seed).ok_or_else(|| {
            RecommendError::invalid_seed(seed.as_str(), graph.granularity().as_str())
        })?;
        if !nodes.contains(&node) {
            nodes.push(node);
        }
    }
    if nodes.is_empty() {
        return Err(RecommendError::invalid_request("at least one seed entity is required"));
    }

    algorithm.recommender().recommend(graph, &nodes, top_k)
}

/// Resolve the start and target of a guided algorithm.
///
/// The start is the first seed; the target is the explicit target if given,
/// otherwise the second seed.
pub(crate) fn guided_endpoints(
    graph: &CsrGraph,
    seeds: &[u32],
    target: Option<&str>,
) -> Result<(u32, u32)> {
    let start = *seeds
        .first()
        .ok_or_else(|| RecommendError::invalid_request("guided walks need a start entity"))?;
    let end = match target {
        Some(id) => graph
            .node_index(id)
            .ok_or_else(|| RecommendError::invalid_seed(id, graph.granularity().as_str()))?,
        None => *seeds.get(1).ok_or_else(|| {
            RecommendError::invalid_request("guided walks need a target entity or a second seed")
        })?,
    };
    Ok((start, end))
}

/// Ranked output from per-node scores, excluding seeds and non-positive scores
pub(crate) fn rank_scores(
    graph: &CsrGraph,
    scores: impl IntoIterator<Item = (u32, f64)>,
    seeds: &[u32],
    top_k: usize,
) -> Vec<ScoredEntity> {
    let scored = scores
        .into_iter()
        .filter(|(node, score)| *score > 0.0 && !seeds.contains(node))
        .map(|(node, score)| ScoredEntity::new(graph.entity(node), score))
        .collect();
    crate::types::rank_and_truncate(scored, top_k)
}

#[cfg(test)]
pub(crate) mod test_graphs {
    use crate::graph::builder::GraphBuilder;
    use crate::graph::csr::CsrGraph;
    use crate::types::Granularity;

    /// haleem - pista_house (5), haleem - charminar (2), charminar - chowmahalla (1),
    /// pista_house - irani_chai (1), golconda - qutb_shahi (3), isolated lonely
    pub fn hyderabad() -> CsrGraph {
        let mut builder = GraphBuilder::with_nodes(["lonely"]);
        builder.increment_pair("haleem", "pista_house", 5);
        builder.increment_pair("haleem", "charminar", 2);
        builder.increment_pair("charminar", "chowmahalla", 1);
        builder.increment_pair("pista_house", "irani_chai", 1);
        builder.increment_pair("golconda", "qutb_shahi", 3);
        CsrGraph::from_builder(&builder, Granularity::Sentence)
    }
}

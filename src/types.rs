//! Core types for cooccur_rec
//!
//! This module defines the fundamental data structures used throughout the library,
//! including entities, mention lists, granularities, scored results, and configuration.

use crate::errors::{RecommendError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable string key of a registered entity
pub type EntityId = String;

// ============================================================================
// Entity
// ============================================================================

/// Kind of cultural entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Food,
    Place,
    Monument,
}

impl EntityType {
    /// All entity types, in registry order
    pub const ALL: [EntityType; 3] = [EntityType::Food, EntityType::Place, EntityType::Monument];

    /// Lowercase name of this type
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Food => "food",
            EntityType::Place => "place",
            EntityType::Monument => "monument",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = RecommendError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "food" | "foods" | "dish" => Ok(EntityType::Food),
            "place" | "places" | "restaurant" | "restaurants" => Ok(EntityType::Place),
            "monument" | "monuments" | "heritage" => Ok(EntityType::Monument),
            other => Err(RecommendError::invalid_config(format!(
                "unknown entity type '{other}'"
            ))),
        }
    }
}

/// A registered cultural entity (food, place, or monument)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable key used as the graph node id
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// Entity kind
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Alternative surface forms
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl Entity {
    /// Create a new entity without aliases
    pub fn new(id: impl Into<String>, name: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            entity_type,
            aliases: Vec::new(),
        }
    }

    /// Builder method: add aliases
    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases.extend(aliases.iter().map(|a| a.to_string()));
        self
    }

    /// The display name followed by every alias
    pub fn surface_forms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

// ============================================================================
// Granularity
// ============================================================================

/// Scope level used to group mentions into co-occurrence edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// Same sentence index
    #[default]
    Sentence,
    /// Same paragraph index
    Paragraph,
    /// Same document
    Page,
}

impl Granularity {
    /// All granularities, finest first
    pub const ALL: [Granularity; 3] = [
        Granularity::Sentence,
        Granularity::Paragraph,
        Granularity::Page,
    ];

    /// Lowercase name of this granularity
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Sentence => "sentence",
            Granularity::Paragraph => "paragraph",
            Granularity::Page => "page",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Granularity {
    type Err = RecommendError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "sentence" | "sent" => Ok(Granularity::Sentence),
            "paragraph" | "para" => Ok(Granularity::Paragraph),
            "page" | "document" | "doc" => Ok(Granularity::Page),
            other => Err(RecommendError::invalid_request(format!(
                "unknown network granularity '{other}'"
            ))),
        }
    }
}

// ============================================================================
// Mentions
// ============================================================================

/// One recognized entity mention inside a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    /// Registry id of the mentioned entity
    pub entity_id: EntityId,
    /// Sentence index within the document
    pub sentence_idx: usize,
    /// Paragraph index within the document
    pub paragraph_idx: usize,
}

impl Mention {
    /// Create a new mention
    pub fn new(entity_id: impl Into<String>, sentence_idx: usize, paragraph_idx: usize) -> Self {
        Self {
            entity_id: entity_id.into(),
            sentence_idx,
            paragraph_idx,
        }
    }
}

/// The mention list extracted from one scraped source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Source identifier (URL, file name, ...)
    #[serde(default)]
    pub id: String,
    /// Mentions in document order
    pub mentions: Vec<Mention>,
}

impl Document {
    /// Create a document from its mentions
    pub fn new(id: impl Into<String>, mentions: Vec<Mention>) -> Self {
        Self {
            id: id.into(),
            mentions,
        }
    }

    /// Create a single-paragraph document where every entity sits in sentence `sentence_idx`
    pub fn from_sentence(id: impl Into<String>, sentence_idx: usize, entities: &[&str]) -> Self {
        Self::new(
            id,
            entities
                .iter()
                .map(|e| Mention::new(*e, sentence_idx, 0))
                .collect(),
        )
    }
}

// ============================================================================
// Scored results
// ============================================================================

/// An entity with its recommendation score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEntity {
    /// Entity id
    pub entity: EntityId,
    /// Algorithm-specific score (higher is better)
    pub score: f64,
}

impl ScoredEntity {
    /// Create a new scored entity
    pub fn new(entity: impl Into<String>, score: f64) -> Self {
        Self {
            entity: entity.into(),
            score,
        }
    }

    /// Stable comparator for deterministic ranking.
    ///
    /// 1. **Score** descending
    /// 2. **Entity id** ascending
    ///
    /// Scores are compared exactly with [`f64::total_cmp`], so the ordering is
    /// total and transitive; only bit-equal scores fall back to the id.
    pub fn stable_cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.entity.cmp(&other.entity))
    }
}

/// Sort scored entities with [`ScoredEntity::stable_cmp`] and keep the best `top_k` (0 = all)
pub fn rank_and_truncate(mut scored: Vec<ScoredEntity>, top_k: usize) -> Vec<ScoredEntity> {
    scored.sort_by(|a, b| a.stable_cmp(b));
    if top_k > 0 {
        scored.truncate(top_k);
    }
    scored
}

// ============================================================================
// Configuration
// ============================================================================

/// Engine-wide defaults for the recommendation algorithms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendConfig {
    /// Damping factor for personalized PageRank (typically 0.85)
    pub damping: f64,
    /// Maximum power-method iterations for PageRank
    pub max_iterations: usize,
    /// Convergence threshold (stop when L1 delta < threshold)
    pub convergence_threshold: f64,
    /// Number of ranked results to return (0 = all)
    pub top_k: usize,
    /// Number of steps for random and exploratory walks
    pub walk_length: usize,
    /// Step budget for guided walks
    pub max_steps: usize,
    /// Teleportation probability for exploratory walks
    pub teleport_probability: f64,
    /// Prefer unvisited neighbors during walks
    #[serde(default)]
    pub avoid_revisits: bool,
    /// Fixed seed for walk randomness (None = entropy)
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 100,
            convergence_threshold: 1e-6,
            top_k: 10,
            walk_length: 5,
            max_steps: 15,
            teleport_probability: 0.1,
            avoid_revisits: false,
            rng_seed: None,
        }
    }
}

impl RecommendConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(RecommendError::invalid_config(format!(
                "damping must be between 0 and 1, got {}",
                self.damping
            )));
        }

        if self.max_iterations == 0 {
            return Err(RecommendError::invalid_config("max_iterations must be > 0"));
        }

        if self.convergence_threshold <= 0.0 {
            return Err(RecommendError::invalid_config(
                "convergence_threshold must be > 0",
            ));
        }

        if !(0.0..=1.0).contains(&self.teleport_probability) {
            return Err(RecommendError::invalid_config(format!(
                "teleport_probability must be between 0 and 1, got {}",
                self.teleport_probability
            )));
        }

        if self.max_steps == 0 {
            return Err(RecommendError::invalid_config("max_steps must be > 0"));
        }

        Ok(())
    }

    /// Builder method: set damping factor
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Builder method: set max iterations
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Builder method: set convergence threshold
    pub fn with_convergence_threshold(mut self, threshold: f64) -> Self {
        self.convergence_threshold = threshold;
        self
    }

    /// Builder method: set top K results to return
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Builder method: set walk length
    pub fn with_walk_length(mut self, walk_length: usize) -> Self {
        self.walk_length = walk_length;
        self
    }

    /// Builder method: set guided walk step budget
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Builder method: set teleportation probability
    pub fn with_teleport_probability(mut self, probability: f64) -> Self {
        self.teleport_probability = probability;
        self
    }

    /// Builder method: prefer unvisited neighbors during walks
    pub fn with_avoid_revisits(mut self, avoid: bool) -> Self {
        self.avoid_revisits = avoid;
        self
    }

    /// Builder method: fix the walk RNG seed
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

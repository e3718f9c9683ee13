//! # cooccur_rec
//!
//! Co-occurrence graph recommendations for cultural entities (foods, places,
//! monuments).
//!
//! Scraped documents are reduced to entity mention lists; entities mentioned
//! together in a sentence, paragraph or page are linked in three weighted
//! graphs. At serving time a user utterance is resolved to seed entities and
//! one of seven graph algorithms produces a ranked list or a walk.
//!
//! ## Features
//!
//! - **Deterministic graphs**: integer weights, document order never matters
//! - **Seven algorithms**: co-occurrence, personalized PageRank, inverse
//!   frequency, and four random / guided walks with reproducible seeding
//! - **Persistence**: compact binary and GraphML
//! - **Hot reload**: immutable snapshots swapped atomically

pub mod analysis;
pub mod engine;
pub mod errors;
pub mod explain;
pub mod graph;
pub mod nlp;
pub mod pagerank;
pub mod registry;
pub mod resolver;
pub mod service;
pub mod types;
pub mod variants;

// Re-export commonly used types
pub use errors::{RecommendError, Result};
pub use types::{
    Document, Entity, EntityId, EntityType, Granularity, Mention, RecommendConfig, ScoredEntity,
};

// Re-export main functionality
pub use analysis::{NetworkAnalyzer, NetworkStats};
pub use engine::{RecommendationEngine, RecommendationRequest, SnapshotHandle};
pub use explain::{Explainer, ListExplainer};
pub use graph::{
    build_graphs, builder::GraphBuilder, cooccurrence::CooccurrenceGraphBuilder, csr::CsrGraph,
    GraphFormat, GraphSet,
};
pub use nlp::{gazetteer::GazetteerExtractor, tokenizer::Tokenizer, MentionExtractor};
pub use pagerank::{
    personalized::PersonalizedPageRank, standard::StandardPageRank, PageRankResult,
};
pub use registry::EntityRegistry;
pub use resolver::{ResolverConfig, SeedResolver};
pub use service::{RecommendationService, ServeRequest, ServeResponse};
pub use variants::{
    recommend, Algorithm, AlgorithmKind, Recommendation, RecommendationOutput, Recommender,
    WalkPath, WalkStep,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

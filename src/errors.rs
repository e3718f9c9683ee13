//! Error types for cooccur_rec
//!
//! This module defines the error types used throughout the library.
//! Conditions that make a requested result meaningless (no seeds, no path,
//! no graph) are surfaced as typed failures; local, recoverable conditions
//! such as a single unknown mention are logged and skipped by the caller.

use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, RecommendError>;

/// Main error type for cooccur_rec
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecommendError {
    /// A mention referenced an entity id that is not in the registry.
    /// Graph construction skips these with a warning.
    #[error("Unknown entity: {id}")]
    UnknownEntity { id: String },

    /// The seed resolver could not match any entity in the user text
    #[error("No seed entities found in: {text:?}")]
    NoSeedEntities { text: String },

    /// The engine was invoked before any graph was loaded
    #[error("Graph not loaded: {granularity}")]
    GraphNotLoaded { granularity: String },

    /// A seed id is absent from the active graph's node set
    #[error("Invalid seed: {id} is not a node of the {granularity} graph")]
    InvalidSeed { id: String, granularity: String },

    /// Guided algorithms with endpoints in different connected components
    #[error("No path between {from} and {to}")]
    NoPath { from: String, to: String },

    /// Configuration validation failed
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A request is malformed (unknown algorithm, missing target, ...)
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Graph or registry (de)serialization failed
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// The text-generation collaborator failed
    #[error("Explanation failed: {message}")]
    Explanation { message: String },
}

impl RecommendError {
    /// Create an unknown entity error
    pub fn unknown_entity(id: impl Into<String>) -> Self {
        Self::UnknownEntity { id: id.into() }
    }

    /// Create a no seed entities error
    pub fn no_seed_entities(text: impl Into<String>) -> Self {
        Self::NoSeedEntities { text: text.into() }
    }

    /// Create a graph not loaded error
    pub fn graph_not_loaded(granularity: impl Into<String>) -> Self {
        Self::GraphNotLoaded {
            granularity: granularity.into(),
        }
    }

    /// Create an invalid seed error
    pub fn invalid_seed(id: impl Into<String>, granularity: impl Into<String>) -> Self {
        Self::InvalidSeed {
            id: id.into(),
            granularity: granularity.into(),
        }
    }

    /// Create a no path error
    pub fn no_path(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::NoPath {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create an explanation error
    pub fn explanation(message: impl Into<String>) -> Self {
        Self::Explanation {
            message: message.into(),
        }
    }

    /// Check if this error only invalidates a single mention
    /// (the surrounding operation can continue)
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::UnknownEntity { .. })
    }

    /// Check if this error should be reported back to the requester
    /// rather than treated as a startup or programming fault
    pub fn is_request_fatal(&self) -> bool {
        matches!(
            self,
            Self::NoSeedEntities { .. }
                | Self::InvalidSeed { .. }
                | Self::NoPath { .. }
                | Self::InvalidRequest { .. }
        )
    }
}

impl From<serde_json::Error> for RecommendError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<bincode::Error> for RecommendError {
    fn from(err: bincode::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<quick_xml::Error> for RecommendError {
    fn from(err: quick_xml::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<std::fmt::Error> for RecommendError {
    fn from(err: std::fmt::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<std::io::Error> for RecommendError {
    fn from(err: std::io::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

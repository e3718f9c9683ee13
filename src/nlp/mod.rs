//! Text processing
//!
//! - [`tokenizer`]: paragraph / sentence / word segmentation
//! - [`gazetteer`]: registry-backed mention extraction

pub mod gazetteer;
pub mod tokenizer;

use crate::types::EntityId;

/// Detects entity mentions in free text.
///
/// Returned strings are surface forms as they should be matched against the
/// registry, in text order.
pub trait MentionExtractor: Send + Sync {
    fn extract_mentions(&self, text: &str) -> Vec<String>;
}

/// A recognized mention with its resolved entity and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedMention {
    pub entity_id: EntityId,
    /// Normalized surface form that matched
    pub surface: String,
    pub paragraph_idx: usize,
    pub sentence_idx: usize,
}

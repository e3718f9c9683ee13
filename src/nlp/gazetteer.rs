//! Gazetteer mention extraction
//!
//! Scans word n-grams of each sentence against the registry's names and
//! aliases, longest match first, never overlapping. Used both for seed
//! detection in user utterances and to annotate raw documents into mention
//! lists for graph construction.
//!
//! For seed detection, runs of capitalized words that match nothing exactly
//! are also reported as candidates, so misspelled names ("Pista Hous") still
//! reach the resolver's substring and fuzzy tiers. A lone capitalized word at
//! the start of a sentence is not a candidate.

use super::tokenizer::{SentenceWords, Tokenizer};
use super::{LocatedMention, MentionExtractor};
use crate::registry::EntityRegistry;
use crate::types::{Document, EntityId, Mention};
use std::sync::Arc;

/// Shortest capitalized candidate, in characters
const MIN_CANDIDATE_CHARS: usize = 3;

/// One scanned span of a sentence
#[derive(Debug, Clone, PartialEq, Eq)]
enum Span {
    Hit(LocatedMention),
    /// Capitalized run with no exact registry match
    Candidate(String),
}

/// Registry-backed mention extractor
#[derive(Debug, Clone)]
pub struct GazetteerExtractor {
    registry: Arc<EntityRegistry>,
    tokenizer: Tokenizer,
    max_ngram: usize,
}

impl GazetteerExtractor {
    /// Create an extractor; n-grams are capped at the longest registered surface form
    pub fn new(registry: Arc<EntityRegistry>) -> Self {
        let max_ngram = registry.max_surface_words().max(1);
        Self {
            registry,
            tokenizer: Tokenizer::new(),
            max_ngram,
        }
    }

    /// Cap the n-gram length
    pub fn with_max_ngram(mut self, max_ngram: usize) -> Self {
        self.max_ngram = max_ngram.max(1);
        self
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Every registry mention in a text, with paragraph and sentence indices
    pub fn locate(&self, text: &str) -> Vec<LocatedMention> {
        self.scan(text)
            .into_iter()
            .filter_map(|span| match span {
                Span::Hit(mention) => Some(mention),
                Span::Candidate(_) => None,
            })
            .collect()
    }

    /// Capitalized runs that matched nothing exactly, in text order
    pub fn candidates(&self, text: &str) -> Vec<String> {
        self.scan(text)
            .into_iter()
            .filter_map(|span| match span {
                Span::Candidate(surface) => Some(surface),
                Span::Hit(_) => None,
            })
            .collect()
    }

    fn scan(&self, text: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        for sentence in self.tokenizer.tokenize(text) {
            let words = &sentence.words;
            let mut i = 0;
            while i < words.len() {
                if let Some((n, surface, entity_id)) = self.exact_at(words, i) {
                    spans.push(Span::Hit(LocatedMention {
                        entity_id,
                        surface,
                        paragraph_idx: sentence.paragraph_idx,
                        sentence_idx: sentence.sentence_idx,
                    }));
                    i += n;
                    continue;
                }
                if !sentence.capitalized[i] {
                    i += 1;
                    continue;
                }

                let end = self.capitalized_run_end(&sentence, i);
                let surface = words[i..end].join(" ");
                let lone_initial = i == 0 && end == 1;
                if !lone_initial && surface.chars().count() >= MIN_CANDIDATE_CHARS {
                    spans.push(Span::Candidate(surface));
                }
                i = end;
            }
        }
        spans
    }

    /// Longest exact registry match starting at word `i`
    fn exact_at(&self, words: &[String], i: usize) -> Option<(usize, String, EntityId)> {
        let longest = self.max_ngram.min(words.len() - i);
        (1..=longest).rev().find_map(|n| {
            let surface = words[i..i + n].join(" ");
            self.registry
                .lookup_exact(&surface)
                .map(|entity| (n, surface, entity.id.clone()))
        })
    }

    /// End of the capitalized run starting at `i`, stopping before an exact match
    fn capitalized_run_end(&self, sentence: &SentenceWords, i: usize) -> usize {
        let words = &sentence.words;
        let mut end = i + 1;
        while end < words.len()
            && end - i < self.max_ngram
            && sentence.capitalized[end]
            && self.exact_at(words, end).is_none()
        {
            end += 1;
        }
        end
    }

    /// Turn raw document text into a mention list
    pub fn annotate(&self, doc_id: &str, text: &str) -> Document {
        let mentions = self
            .locate(text)
            .into_iter()
            .map(|m| Mention::new(m.entity_id, m.sentence_idx, m.paragraph_idx))
            .collect();
        Document::new(doc_id, mentions)
    }
}

impl MentionExtractor for GazetteerExtractor {
    fn extract_mentions(&self, text: &str) -> Vec<String> {
        self.scan(text)
            .into_iter()
            .map(|span| match span {
                Span::Hit(mention) => mention.surface,
                Span::Candidate(surface) => surface,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Entity, EntityType};

    fn extractor() -> GazetteerExtractor {
        let registry = EntityRegistry::from_entities([
            Entity::new("haleem", "Haleem", EntityType::Food),
            Entity::new("pista_house", "Pista House", EntityType::Place),
            Entity::new("charminar", "Charminar", EntityType::Monument)
                .with_aliases(&["Char Minar"]),
            Entity::new("house", "House", EntityType::Place),
            Entity::new("irani_chai", "Irani Chai", EntityType::Food),
        ])
        .unwrap();
        GazetteerExtractor::new(Arc::new(registry))
    }

    #[test]
    fn test_longest_match_wins() {
        let mentions = extractor().extract_mentions("Had haleem at Pista House");
        assert_eq!(mentions, vec!["haleem", "pista house"]);
    }

    #[test]
    fn test_alias_and_punctuation() {
        let located = extractor().locate("Walked to the Char-Minar, then irani chai!");
        let ids: Vec<&str> = located.iter().map(|m| m.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["charminar", "irani_chai"]);
    }

    #[test]
    fn test_annotate_indices() {
        let text = "Haleem at Pista House. Charminar at night.\n\nIrani chai and haleem.";
        let doc = extractor().annotate("blog-1", text);
        assert_eq!(doc.id, "blog-1");
        assert_eq!(
            doc.mentions,
            vec![
                Mention::new("haleem", 0, 0),
                Mention::new("pista_house", 0, 0),
                Mention::new("charminar", 1, 0),
                Mention::new("irani_chai", 2, 1),
                Mention::new("haleem", 2, 1),
            ]
        );
    }

    #[test]
    fn test_capitalized_candidates() {
        let extractor = extractor();
        let text = "Had haleem at Pista Hous near Charminaar. Golconda Fort later";
        assert_eq!(
            extractor.extract_mentions(text),
            vec!["haleem", "pista hous", "charminaar", "golconda fort"]
        );
        assert_eq!(
            extractor.candidates(text),
            vec!["pista hous", "charminaar", "golconda fort"]
        );
        // candidates never become document mentions
        let doc = extractor.annotate("blog-2", text);
        assert_eq!(doc.mentions, vec![Mention::new("haleem", 0, 0)]);
    }

    #[test]
    fn test_candidate_run_stops_at_exact_match() {
        let mentions = extractor().extract_mentions("We met Ravi Haleem Stall owners");
        assert_eq!(mentions, vec!["ravi", "haleem", "stall"]);
    }

    #[test]
    fn test_no_mentions() {
        assert!(extractor().extract_mentions("Nothing to see here.").is_empty());
    }
}

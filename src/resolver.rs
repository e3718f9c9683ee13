//! Seed resolution
//!
//! Maps a user utterance to the set of registry entities it mentions. Mention
//! detection is delegated to a [`MentionExtractor`]; each mention is then
//! matched against registry names and aliases in three tiers: exact
//! (case-insensitive), substring, then Jaro-Winkler fuzzy.

use crate::errors::{RecommendError, Result};
use crate::nlp::gazetteer::GazetteerExtractor;
use crate::nlp::MentionExtractor;
use crate::registry::EntityRegistry;
use crate::types::{Entity, EntityId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Seed resolver settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Minimum Jaro-Winkler similarity for a fuzzy match
    pub fuzzy_threshold: f64,
    /// Minimum characters on both sides of a substring match
    pub min_substring_len: usize,
    /// Longest n-gram the default extractor scans
    pub max_ngram: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.88,
            min_substring_len: 3,
            max_ngram: 5,
        }
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            return Err(RecommendError::invalid_config(format!(
                "fuzzy_threshold must be between 0 and 1, got {}",
                self.fuzzy_threshold
            )));
        }
        if self.max_ngram == 0 {
            return Err(RecommendError::invalid_config("max_ngram must be > 0"));
        }
        Ok(())
    }

    pub fn with_fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }

    pub fn with_min_substring_len(mut self, len: usize) -> Self {
        self.min_substring_len = len;
        self
    }

    pub fn with_max_ngram(mut self, max_ngram: usize) -> Self {
        self.max_ngram = max_ngram;
        self
    }
}

/// How a mention was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Substring,
    Fuzzy,
}

/// Resolves utterances to seed entity ids
pub struct SeedResolver {
    registry: Arc<EntityRegistry>,
    extractor: Box<dyn MentionExtractor>,
    config: ResolverConfig,
}

impl std::fmt::Debug for SeedResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedResolver")
            .field("entities", &self.registry.len())
            .field("config", &self.config)
            .finish()
    }
}

impl SeedResolver {
    /// Resolver using the registry-backed gazetteer extractor
    pub fn new(registry: Arc<EntityRegistry>, config: ResolverConfig) -> Result<Self> {
        let extractor =
            GazetteerExtractor::new(Arc::clone(&registry)).with_max_ngram(config.max_ngram);
        Self::with_extractor(registry, Box::new(extractor), config)
    }

    /// Resolver using an external mention extractor
    pub fn with_extractor(
        registry: Arc<EntityRegistry>,
        extractor: Box<dyn MentionExtractor>,
        config: ResolverConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            registry,
            extractor,
            config,
        })
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Match one mention against the registry
    pub fn match_mention(&self, mention: &str) -> Option<(&Entity, MatchKind)> {
        if let Some(entity) = self.registry.lookup_exact(mention) {
            return Some((entity, MatchKind::Exact));
        }
        if let Some(entity) = self
            .registry
            .lookup_substring(mention, self.config.min_substring_len)
        {
            return Some((entity, MatchKind::Substring));
        }
        self.registry
            .lookup_fuzzy(mention, self.config.fuzzy_threshold)
            .map(|(entity, _)| (entity, MatchKind::Fuzzy))
    }

    /// Resolve an utterance to distinct entity ids in mention order.
    ///
    /// Fails with `NoSeedEntities` when nothing matches.
    pub fn resolve(&self, text: &str) -> Result<Vec<EntityId>> {
        let mut seeds: Vec<EntityId> = Vec::new();
        for mention in self.extractor.extract_mentions(text) {
            match self.match_mention(&mention) {
                Some((entity, kind)) => {
                    if !seeds.contains(&entity.id) {
                        tracing::debug!(
                            mention = %mention,
                            entity = %entity.id,
                            ?kind,
                            "resolved mention"
                        );
                        seeds.push(entity.id.clone());
                    }
                }
                None => tracing::debug!(mention = %mention, "mention did not match any entity"),
            }
        }

        if seeds.is_empty() {
            return Err(RecommendError::no_seed_entities(text));
        }
        Ok(seeds)
    }

    /// Resolve an explicit entity reference (id, name or alias)
    pub fn resolve_entity(&self, reference: &str) -> Result<EntityId> {
        if let Some(entity) = self.registry.get(reference) {
            return Ok(entity.id.clone());
        }
        self.match_mention(reference)
            .map(|(entity, _)| entity.id.clone())
            .ok_or_else(|| RecommendError::unknown_entity(reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntityType;

    fn registry() -> Arc<EntityRegistry> {
        Arc::new(
            EntityRegistry::from_entities([
                Entity::new("haleem", "Haleem", EntityType::Food),
                Entity::new("pista_house", "Pista House", EntityType::Place),
                Entity::new("hyderabadi_biryani", "Hyderabadi Biryani", EntityType::Food)
                    .with_aliases(&["Biryani"]),
                Entity::new("charminar", "Charminar", EntityType::Monument),
            ])
            .unwrap(),
        )
    }

    /// Splits on commas, standing in for an external NER service
    struct CommaExtractor;

    impl MentionExtractor for CommaExtractor {
        fn extract_mentions(&self, text: &str) -> Vec<String> {
            text.split(',').map(|s| s.trim().to_string()).collect()
        }
    }

    #[test]
    fn test_resolve_utterance() {
        let resolver = SeedResolver::new(registry(), ResolverConfig::default()).unwrap();
        assert_eq!(
            resolver.resolve("Had haleem at Pista House").unwrap(),
            vec!["haleem", "pista_house"]
        );
    }

    #[test]
    fn test_resolve_misspelled_names() {
        let resolver = SeedResolver::new(registry(), ResolverConfig::default()).unwrap();
        assert_eq!(
            resolver.resolve("Had haleem at Pista Hous").unwrap(),
            vec!["haleem", "pista_house"]
        );
        assert_eq!(
            resolver.resolve("Loved the Charminer at night").unwrap(),
            vec!["charminar"]
        );
    }

    #[test]
    fn test_no_entities() {
        let resolver = SeedResolver::new(registry(), ResolverConfig::default()).unwrap();
        let err = resolver.resolve("What a lovely day").unwrap_err();
        assert!(matches!(err, RecommendError::NoSeedEntities { .. }));
    }

    #[test]
    fn test_duplicates_collapse() {
        let resolver = SeedResolver::new(registry(), ResolverConfig::default()).unwrap();
        assert_eq!(
            resolver.resolve("Biryani, more biryani, and Hyderabadi Biryani").unwrap(),
            vec!["hyderabadi_biryani"]
        );
    }

    #[test]
    fn test_substring_and_fuzzy_tiers() {
        let resolver = SeedResolver::with_extractor(
            registry(),
            Box::new(CommaExtractor),
            ResolverConfig::default(),
        )
        .unwrap();

        let (entity, kind) = resolver.match_mention("the Pista House").unwrap();
        assert_eq!(entity.id, "pista_house");
        assert_eq!(kind, MatchKind::Substring);

        let (entity, kind) = resolver.match_mention("Charminer").unwrap();
        assert_eq!(entity.id, "charminar");
        assert_eq!(kind, MatchKind::Fuzzy);

        assert_eq!(
            resolver.resolve("the Pista House, Charminer").unwrap(),
            vec!["pista_house", "charminar"]
        );
    }

    #[test]
    fn test_resolve_entity_reference() {
        let resolver = SeedResolver::new(registry(), ResolverConfig::default()).unwrap();
        assert_eq!(resolver.resolve_entity("charminar").unwrap(), "charminar");
        assert_eq!(resolver.resolve_entity("Pista House").unwrap(), "pista_house");
        assert!(resolver.resolve_entity("Golconda").is_err());
    }

    #[test]
    fn test_config_validation() {
        let config = ResolverConfig::default().with_fuzzy_threshold(1.5);
        assert!(SeedResolver::new(registry(), config).is_err());
    }

    #[test]
    fn test_config_partial_json() {
        let config: ResolverConfig = serde_json::from_str(r#"{"fuzzy_threshold": 0.9}"#).unwrap();
        assert_eq!(config.fuzzy_threshold, 0.9);
        assert_eq!(config.min_substring_len, 3);
        assert_eq!(config.max_ngram, 5);
    }
}

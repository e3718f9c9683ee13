//! Entity registry
//!
//! Canonical set of known entities with type and alias metadata. Every graph
//! node id must resolve here. The registry also owns the normalized surface-form
//! index that the seed resolver and the gazetteer extractor match against.

use crate::errors::{RecommendError, Result};
use crate::types::{Entity, EntityId, EntityType};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Normalize a surface form for matching.
///
/// Lowercases, replaces every non-alphanumeric character with a space and
/// collapses whitespace, so `"Pathar-ka Gosht!"` becomes `"pathar ka gosht"`.
pub fn normalize_surface(s: &str) -> String {
    let stripped: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .flat_map(char::to_lowercase)
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Derive a stable entity id from a display name (`"Pista House"` → `"pista_house"`)
pub fn slugify(name: &str) -> String {
    normalize_surface(name).replace(' ', "_")
}

/// On-disk registry layout.
///
/// Either fully specified entities, or bare names grouped by type (ids are
/// derived with [`slugify`]), or both.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    entities: Vec<Entity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    food: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    place: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    monument: Vec<String>,
}

/// The canonical set of known entities
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    /// Entities in registration order
    entities: Vec<Entity>,
    /// Maps entity id -> index into `entities`
    by_id: FxHashMap<EntityId, usize>,
    /// Maps normalized name/alias -> entity indices
    surface_index: FxHashMap<String, Vec<usize>>,
    /// Longest surface form, in words
    max_surface_words: usize,
}

impl EntityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of entities
    pub fn from_entities(entities: impl IntoIterator<Item = Entity>) -> Result<Self> {
        let mut registry = Self::new();
        for entity in entities {
            registry.register(entity)?;
        }
        Ok(registry)
    }

    /// Register a new entity. Ids must be unique.
    pub fn register(&mut self, entity: Entity) -> Result<()> {
        if entity.id.is_empty() {
            return Err(RecommendError::invalid_config("entity id must not be empty"));
        }
        if self.by_id.contains_key(&entity.id) {
            return Err(RecommendError::invalid_config(format!(
                "duplicate entity id '{}'",
                entity.id
            )));
        }

        let idx = self.entities.len();
        for form in entity.surface_forms() {
            let normalized = normalize_surface(form);
            if normalized.is_empty() {
                continue;
            }
            self.max_surface_words = self
                .max_surface_words
                .max(normalized.split(' ').count());
            let slot = self.surface_index.entry(normalized).or_default();
            if !slot.contains(&idx) {
                slot.push(idx);
            }
        }
        self.by_id.insert(entity.id.clone(), idx);
        self.entities.push(entity);
        Ok(())
    }

    /// Register an entity by display name, deriving its id
    pub fn register_name(&mut self, name: &str, entity_type: EntityType) -> Result<EntityId> {
        let id = slugify(name);
        self.register(Entity::new(id.clone(), name, entity_type))?;
        Ok(id)
    }

    /// Get an entity by id
    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.by_id.get(id).map(|&idx| &self.entities[idx])
    }

    /// Check whether an id is registered
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Fail with [`RecommendError::UnknownEntity`] if the id is not registered
    pub fn require(&self, id: &str) -> Result<&Entity> {
        self.get(id)
            .ok_or_else(|| RecommendError::unknown_entity(id))
    }

    /// Number of registered entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate over entities in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Iterate over entity ids in registration order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().map(|e| e.id.as_str())
    }

    /// Entities of one type
    pub fn by_type(&self, entity_type: EntityType) -> impl Iterator<Item = &Entity> {
        self.entities
            .iter()
            .filter(move |e| e.entity_type == entity_type)
    }

    /// Longest registered surface form, in words
    pub fn max_surface_words(&self) -> usize {
        self.max_surface_words
    }

    /// Case-insensitive exact match of a mention against names and aliases.
    ///
    /// When several entities share a surface form, the first registered wins.
    pub fn lookup_exact(&self, mention: &str) -> Option<&Entity> {
        let normalized = normalize_surface(mention);
        self.surface_index
            .get(&normalized)
            .and_then(|indices| indices.first())
            .map(|&idx| &self.entities[idx])
    }

    /// Substring match in either direction.
    ///
    /// A surface form matches if it contains the mention or the mention contains it,
    /// both sides having at least `min_len` characters. Among matches the longest
    /// surface form wins, then the smallest entity id.
    pub fn lookup_substring(&self, mention: &str, min_len: usize) -> Option<&Entity> {
        let normalized = normalize_surface(mention);
        if normalized.chars().count() < min_len {
            return None;
        }

        let mut best: Option<(usize, &Entity)> = None;
        for (surface, indices) in &self.surface_index {
            if surface.chars().count() < min_len {
                continue;
            }
            if !(surface.contains(&normalized) || contains_words(&normalized, surface)) {
                continue;
            }
            let len = surface.chars().count();
            for &idx in indices {
                let entity = &self.entities[idx];
                let better = match best {
                    None => true,
                    Some((best_len, best_entity)) => {
                        len > best_len || (len == best_len && entity.id < best_entity.id)
                    }
                };
                if better {
                    best = Some((len, entity));
                }
            }
        }
        best.map(|(_, entity)| entity)
    }

    /// Fuzzy match using Jaro-Winkler similarity against every surface form.
    ///
    /// Returns the best entity scoring at least `threshold`, with its score.
    pub fn lookup_fuzzy(&self, mention: &str, threshold: f64) -> Option<(&Entity, f64)> {
        let normalized = normalize_surface(mention);
        if normalized.is_empty() {
            return None;
        }

        let mut best: Option<(f64, &Entity)> = None;
        for (surface, indices) in &self.surface_index {
            let score = strsim::jaro_winkler(&normalized, surface);
            if score < threshold {
                continue;
            }
            for &idx in indices {
                let entity = &self.entities[idx];
                let better = match best {
                    None => true,
                    Some((best_score, best_entity)) => {
                        score > best_score || (score == best_score && entity.id < best_entity.id)
                    }
                };
                if better {
                    best = Some((score, entity));
                }
            }
        }
        best.map(|(score, entity)| (entity, score))
    }

    /// Load a registry from its JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: RegistryDocument = serde_json::from_str(json)?;
        let mut registry = Self::from_entities(doc.entities)?;
        for (names, entity_type) in [
            (doc.food, EntityType::Food),
            (doc.place, EntityType::Place),
            (doc.monument, EntityType::Monument),
        ] {
            for name in names {
                // Grouped name lists repeat items across categories; keep the first.
                if registry.contains(&slugify(&name)) {
                    continue;
                }
                registry.register_name(&name, entity_type)?;
            }
        }
        Ok(registry)
    }

    /// Serialize the registry to JSON
    pub fn to_json(&self) -> Result<String> {
        let doc = RegistryDocument {
            entities: self.entities.clone(),
            ..RegistryDocument::default()
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }
}

/// Whole-word containment: `"had haleem"` contains `"haleem"` but not `"lee"`.
fn contains_words(haystack: &str, needle: &str) -> bool {
    let hay: Vec<&str> = haystack.split(' ').collect();
    let words: Vec<&str> = needle.split(' ').collect();
    !words.is_empty() && hay.windows(words.len()).any(|w| w == words.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_registry() -> EntityRegistry {
        EntityRegistry::from_entities(vec![
            Entity::new("haleem", "Haleem", EntityType::Food),
            Entity::new("hyderabadi_biryani", "Hyderabadi Biryani", EntityType::Food)
                .with_aliases(&["Biryani", "Dum Biryani"]),
            Entity::new("pista_house", "Pista House", EntityType::Place),
            Entity::new("charminar", "Charminar", EntityType::Monument)
                .with_aliases(&["Char Minar"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_normalize_surface() {
        assert_eq!(normalize_surface("  Pathar-ka  Gosht! "), "pathar ka gosht");
        assert_eq!(normalize_surface("Ohri's"), "ohri s");
        assert_eq!(slugify("Pista House"), "pista_house");
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut registry = sample_registry();
        let err = registry
            .register(Entity::new("haleem", "Haleem Again", EntityType::Food))
            .unwrap_err();
        assert!(matches!(err, RecommendError::InvalidConfig { .. }));
    }

    #[test]
    fn test_lookup_exact_case_insensitive() {
        let registry = sample_registry();
        assert_eq!(registry.lookup_exact("HALEEM").unwrap().id, "haleem");
        assert_eq!(registry.lookup_exact("char minar").unwrap().id, "charminar");
        assert!(registry.lookup_exact("nihari").is_none());
    }

    #[test]
    fn test_lookup_substring() {
        let registry = sample_registry();
        // Mention contained in a surface form
        assert_eq!(registry.lookup_substring("pista", 3).unwrap().id, "pista_house");
        // Surface form contained in a mention
        assert_eq!(
            registry.lookup_substring("the famous dum biryani", 3).unwrap().id,
            "hyderabadi_biryani"
        );
        // Too short
        assert!(registry.lookup_substring("pi", 3).is_none());
    }

    #[test]
    fn test_lookup_fuzzy() {
        let registry = sample_registry();
        let (entity, score) = registry.lookup_fuzzy("Charminaar", 0.88).unwrap();
        assert_eq!(entity.id, "charminar");
        assert!(score >= 0.88);
        assert!(registry.lookup_fuzzy("golconda", 0.88).is_none());
    }

    #[test]
    fn test_require_unknown() {
        let registry = sample_registry();
        assert!(registry.require("haleem").is_ok());
        assert_eq!(
            registry.require("nihari").unwrap_err(),
            RecommendError::unknown_entity("nihari")
        );
    }

    #[test]
    fn test_json_grouped_names() {
        let json = r#"{
            "food": ["Haleem", "Irani Chai"],
            "place": ["Pista House", "Cafe Niloufer"],
            "monument": ["Charminar"]
        }"#;
        let registry = EntityRegistry::from_json(json).unwrap();
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.get("irani_chai").unwrap().entity_type, EntityType::Food);
        assert_eq!(registry.by_type(EntityType::Place).count(), 2);
        assert_eq!(registry.max_surface_words(), 2);
    }

    #[test]
    fn test_json_roundtrip() {
        let registry = sample_registry();
        let json = registry.to_json().unwrap();
        let back = EntityRegistry::from_json(&json).unwrap();
        assert_eq!(back.len(), registry.len());
        assert_eq!(back.get("charminar"), registry.get("charminar"));
    }
}

//! Serving facade
//!
//! Glues the seed resolver, the engine and an optional explainer behind one
//! request/response pair that mirrors a JSON API: an utterance, an algorithm
//! name and optional parameter overrides in; seeds, the recommendation and an
//! optional explanation out.

use crate::engine::{RecommendationEngine, RecommendationRequest};
use crate::errors::{RecommendError, Result};
use crate::explain::{ExplanationContext, Explainer};
use crate::resolver::SeedResolver;
use crate::types::{EntityId, Granularity};
use crate::variants::{Algorithm, AlgorithmKind, Recommendation};
use serde::{Deserialize, Serialize};

fn default_algorithm() -> String {
    AlgorithmKind::SimpleCooccurrence.as_str().to_string()
}

fn default_explain() -> bool {
    true
}

/// One serving request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServeRequest {
    /// User utterance
    #[serde(default)]
    pub text: String,
    /// Algorithm name
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    /// Network granularity (sentence when absent)
    #[serde(default)]
    pub granularity: Option<String>,
    /// Explicit start of a guided walk
    #[serde(default)]
    pub start_entity: Option<String>,
    /// Explicit target of a guided walk
    #[serde(default)]
    pub end_entity: Option<String>,
    #[serde(default)]
    pub walk_length: Option<usize>,
    #[serde(default)]
    pub max_steps: Option<usize>,
    #[serde(default)]
    pub teleport_probability: Option<f64>,
    #[serde(default)]
    pub damping: Option<f64>,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub rng_seed: Option<u64>,
    /// Ask for a natural-language explanation
    #[serde(default = "default_explain")]
    pub explain: bool,
}

impl ServeRequest {
    pub fn new(text: impl Into<String>, algorithm: AlgorithmKind) -> Self {
        Self {
            text: text.into(),
            algorithm: algorithm.as_str().to_string(),
            granularity: None,
            start_entity: None,
            end_entity: None,
            walk_length: None,
            max_steps: None,
            teleport_probability: None,
            damping: None,
            top_k: None,
            rng_seed: None,
            explain: true,
        }
    }
}

/// One serving response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServeResponse {
    pub text: String,
    /// Seed entity ids the request resolved to
    pub entities: Vec<EntityId>,
    pub granularity: Granularity,
    pub recommendation: Recommendation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Resolver + engine + optional explainer
pub struct RecommendationService {
    resolver: SeedResolver,
    engine: RecommendationEngine,
    explainer: Option<Box<dyn Explainer>>,
}

impl std::fmt::Debug for RecommendationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationService")
            .field("resolver", &self.resolver)
            .field("engine", &self.engine)
            .field("explainer", &self.explainer.is_some())
            .finish()
    }
}

impl RecommendationService {
    pub fn new(resolver: SeedResolver, engine: RecommendationEngine) -> Self {
        Self {
            resolver,
            engine,
            explainer: None,
        }
    }

    pub fn with_explainer(mut self, explainer: Box<dyn Explainer>) -> Self {
        self.explainer = Some(explainer);
        self
    }

    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    pub fn resolver(&self) -> &SeedResolver {
        &self.resolver
    }

    /// Handle one request end to end
    pub fn handle(&self, request: &ServeRequest) -> Result<ServeResponse> {
        let kind: AlgorithmKind = request.algorithm.parse()?;
        let granularity = match &request.granularity {
            Some(name) => name.parse()?,
            None => Granularity::default(),
        };
        let mut algorithm = self.algorithm_for(kind, request)?;
        let (seeds, target) = self.seeds_for(kind, request)?;
        if let Some(target) = target {
            algorithm = algorithm.with_target(target);
        }

        let mut engine_request = RecommendationRequest::new(seeds.clone(), algorithm)
            .with_granularity(granularity);
        engine_request.top_k = request.top_k;
        let recommendation = self.engine.recommend(&engine_request)?;

        let explanation = if request.explain {
            self.explain(&request.text, &seeds, &recommendation)
        } else {
            None
        };

        Ok(ServeResponse {
            text: request.text.clone(),
            entities: seeds,
            granularity,
            recommendation,
            explanation,
        })
    }

    /// Engine defaults with the request's overrides applied
    fn algorithm_for(&self, kind: AlgorithmKind, request: &ServeRequest) -> Result<Algorithm> {
        let mut config = self.engine.config().clone();
        if let Some(length) = request.walk_length {
            config.walk_length = length;
        }
        if let Some(steps) = request.max_steps {
            config.max_steps = steps;
        }
        if let Some(p) = request.teleport_probability {
            config.teleport_probability = p;
        }
        if let Some(d) = request.damping {
            config.damping = d;
        }
        if let Some(seed) = request.rng_seed {
            config.rng_seed = Some(seed);
        }
        config
            .validate()
            .map_err(|err| RecommendError::invalid_request(err.to_string()))?;
        Ok(Algorithm::from_kind(kind, &config))
    }

    /// Seeds and optional guided target.
    ///
    /// Guided kinds take an explicit start and/or end; a missing start comes
    /// from the utterance, and an explicit start without an end is followed by
    /// the utterance seeds.
    fn seeds_for(
        &self,
        kind: AlgorithmKind,
        request: &ServeRequest,
    ) -> Result<(Vec<EntityId>, Option<EntityId>)> {
        if !kind.is_guided() {
            return Ok((self.resolver.resolve(&request.text)?, None));
        }

        let endpoint = |reference: &str| {
            self.resolver.resolve_entity(reference).map_err(|_| {
                RecommendError::invalid_request(format!("unknown location '{reference}'"))
            })
        };
        let target = request.end_entity.as_deref().map(&endpoint).transpose()?;
        let seeds = match &request.start_entity {
            Some(start) => {
                let mut seeds = vec![endpoint(start)?];
                if target.is_none() {
                    seeds.extend(self.resolver.resolve(&request.text)?);
                }
                seeds
            }
            None => self.resolver.resolve(&request.text)?,
        };
        Ok((seeds, target))
    }

    fn explain(
        &self,
        utterance: &str,
        seeds: &[EntityId],
        recommendation: &Recommendation,
    ) -> Option<String> {
        let explainer = self.explainer.as_ref()?;
        let context = ExplanationContext {
            utterance,
            seeds,
            recommendation,
            registry: self.resolver.registry(),
        };
        match explainer.explain(&context) {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "explanation failed, returning recommendation without it"
                );
                None
            }
        }
    }
}

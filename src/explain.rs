//! Natural-language explanations
//!
//! An [`Explainer`] turns a recommendation into a short text for the user. A
//! generative collaborator can implement the trait; [`ListExplainer`] is the
//! deterministic fallback. Explanations are optional: callers treat a failure
//! as "no explanation", never as a failed request.

use crate::errors::Result;
use crate::registry::EntityRegistry;
use crate::types::EntityId;
use crate::variants::{Recommendation, RecommendationOutput};

/// What the user was doing when they asked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtteranceKind {
    /// Asked for a route between two entities
    Route,
    /// Asked a question or requested suggestions
    Question,
    /// Shared an experience
    Experience,
}

impl UtteranceKind {
    const QUESTION_CUES: [&'static str; 10] = [
        "?", "what", "where", "how", "which", "recommend", "suggest", "looking for", "need", "want",
    ];

    /// Classify an utterance
    pub fn classify(utterance: &str, is_route: bool) -> Self {
        if is_route {
            return UtteranceKind::Route;
        }
        let lower = utterance.to_lowercase();
        if Self::QUESTION_CUES.iter().any(|cue| lower.contains(cue)) {
            UtteranceKind::Question
        } else {
            UtteranceKind::Experience
        }
    }
}

/// Everything an explainer may look at
#[derive(Debug, Clone, Copy)]
pub struct ExplanationContext<'a> {
    pub utterance: &'a str,
    pub seeds: &'a [EntityId],
    pub recommendation: &'a Recommendation,
    pub registry: &'a EntityRegistry,
}

impl<'a> ExplanationContext<'a> {
    pub fn kind(&self) -> UtteranceKind {
        let is_route = self.recommendation.algorithm.is_guided();
        UtteranceKind::classify(self.utterance, is_route)
    }

    /// Display name of an entity id (the id itself when unregistered)
    pub fn display_name(&self, id: &'a str) -> &'a str {
        self.registry
            .get(id)
            .map(|entity| entity.name.as_str())
            .unwrap_or(id)
    }
}

/// Turns recommendations into text
pub trait Explainer: Send + Sync {
    fn explain(&self, context: &ExplanationContext<'_>) -> Result<String>;
}

/// Deterministic explainer listing results in their original order
#[derive(Debug, Clone, Copy, Default)]
pub struct ListExplainer;

impl Explainer for ListExplainer {
    fn explain(&self, context: &ExplanationContext<'_>) -> Result<String> {
        let seeds = context
            .seeds
            .iter()
            .map(|id| context.display_name(id))
            .collect::<Vec<_>>()
            .join(", ");

        let text = match &context.recommendation.output {
            RecommendationOutput::Ranked(items) if items.is_empty() => {
                format!("No recommendations found for {seeds}.")
            }
            RecommendationOutput::Ranked(items) => {
                let names = items
                    .iter()
                    .map(|item| context.display_name(&item.entity))
                    .collect::<Vec<_>>()
                    .join(", ");
                match context.kind() {
                    UtteranceKind::Experience => format!("Since you enjoyed {seeds}, try {names}."),
                    _ => format!("For {seeds}: {names}."),
                }
            }
            RecommendationOutput::Path(path) => {
                let stops = path
                    .steps
                    .iter()
                    .map(|step| {
                        let name = context.display_name(&step.entity);
                        if step.teleported {
                            format!("{name} (detour)")
                        } else {
                            name.to_string()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" → ");
                let from = path.first().map(|id| context.display_name(id)).unwrap_or_default();
                let to = path.last().map(|id| context.display_name(id)).unwrap_or_default();
                if context.recommendation.complete {
                    format!("{from} → {to}: {stops}.")
                } else {
                    format!("Starting from {from}: {stops}.")
                }
            }
        };
        Ok(text)
    }
}

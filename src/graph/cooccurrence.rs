//! Multi-granularity co-occurrence graph construction
//!
//! Turns per-document mention lists into three weighted graphs: entities that
//! share a sentence, a paragraph, or a document are pairwise connected, and each
//! scope instance adds one to the weight of every pair it contains.
//!
//! Per-document pair counting is independent work and runs in parallel; the
//! partial counts are merged afterwards. Because the merge only adds integers
//! the result does not depend on document order.

use crate::errors::RecommendError;
use crate::graph::builder::{count_scope_pairs, GraphBuilder, PairCounts};
use crate::graph::csr::CsrGraph;
use crate::registry::EntityRegistry;
use crate::types::{Document, Granularity};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// Below this many documents, sequential counting is faster
const PARALLEL_THRESHOLD: usize = 64;

/// The three co-occurrence graphs over one shared node set
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSet {
    pub sentence: CsrGraph,
    pub paragraph: CsrGraph,
    pub page: CsrGraph,
}

impl GraphSet {
    /// Get the graph for a granularity
    pub fn get(&self, granularity: Granularity) -> &CsrGraph {
        match granularity {
            Granularity::Sentence => &self.sentence,
            Granularity::Paragraph => &self.paragraph,
            Granularity::Page => &self.page,
        }
    }

    /// Iterate over `(granularity, graph)` pairs, finest first
    pub fn iter(&self) -> impl Iterator<Item = (Granularity, &CsrGraph)> {
        Granularity::ALL.into_iter().map(move |g| (g, self.get(g)))
    }
}

/// Counters collected during a build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Documents processed
    pub documents: usize,
    /// Mentions accepted into the graphs
    pub mentions: usize,
    /// Mentions skipped because their entity id is unknown
    pub skipped_mentions: usize,
    /// Distinct unknown ids, ascending
    pub unknown_entities: Vec<String>,
}

/// Result of a build with its report
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub graphs: GraphSet,
    pub report: BuildReport,
}

/// Pair counts of one document at every granularity
#[derive(Debug, Default)]
struct DocumentCounts {
    sentence: PairCounts,
    paragraph: PairCounts,
    page: PairCounts,
    mentions: usize,
    unknown: Vec<String>,
}

/// Builds sentence, paragraph and page graphs from mention lists
#[derive(Debug, Clone, Copy)]
pub struct CooccurrenceGraphBuilder<'a> {
    registry: &'a EntityRegistry,
    parallel: bool,
}

impl<'a> CooccurrenceGraphBuilder<'a> {
    /// Create a builder over a registry
    pub fn new(registry: &'a EntityRegistry) -> Self {
        Self {
            registry,
            parallel: true,
        }
    }

    /// Enable or disable parallel per-document counting
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Build the three graphs
    pub fn build(&self, documents: &[Document]) -> GraphSet {
        self.build_with_report(documents).graphs
    }

    /// Build the three graphs and report skipped mentions
    pub fn build_with_report(&self, documents: &[Document]) -> BuildOutput {
        let parallel = self.parallel && documents.len() >= PARALLEL_THRESHOLD;
        let partials: Vec<DocumentCounts> = if parallel {
            documents
                .par_iter()
                .map(|doc| self.count_document(doc))
                .collect()
        } else {
            documents.iter().map(|doc| self.count_document(doc)).collect()
        };

        // Every registry entity is a node of every graph.
        let mut sentence = GraphBuilder::with_nodes(self.registry.ids());
        let mut paragraph = GraphBuilder::with_nodes(self.registry.ids());
        let mut page = GraphBuilder::with_nodes(self.registry.ids());

        let mut report = BuildReport {
            documents: documents.len(),
            ..BuildReport::default()
        };
        let mut unknown = BTreeSet::new();

        for partial in &partials {
            sentence.merge_counts(&partial.sentence);
            paragraph.merge_counts(&partial.paragraph);
            page.merge_counts(&partial.page);
            report.mentions += partial.mentions;
            report.skipped_mentions += partial.unknown.len();
            unknown.extend(partial.unknown.iter().cloned());
        }
        report.unknown_entities = unknown.into_iter().collect();

        let graphs = GraphSet {
            sentence: CsrGraph::from_builder(&sentence, Granularity::Sentence),
            paragraph: CsrGraph::from_builder(&paragraph, Granularity::Paragraph),
            page: CsrGraph::from_builder(&page, Granularity::Page),
        };

        for (granularity, graph) in graphs.iter() {
            tracing::debug!(
                granularity = %granularity,
                nodes = graph.num_nodes,
                edges = graph.num_edges(),
                "built co-occurrence graph"
            );
        }

        BuildOutput { graphs, report }
    }

    fn count_document(&self, doc: &Document) -> DocumentCounts {
        let mut counts = DocumentCounts::default();

        // Scope instance -> distinct entity ids
        let mut sentences: BTreeMap<(usize, usize), BTreeSet<&str>> = BTreeMap::new();
        let mut paragraphs: BTreeMap<usize, BTreeSet<&str>> = BTreeMap::new();
        let mut page: BTreeSet<&str> = BTreeSet::new();

        for mention in &doc.mentions {
            if let Err(err) = self.registry.require(&mention.entity_id) {
                tracing::warn!(document = %doc.id, error = %err, "skipping mention");
                if let RecommendError::UnknownEntity { id } = err {
                    counts.unknown.push(id);
                }
                continue;
            }
            counts.mentions += 1;

            let id = mention.entity_id.as_str();
            // Sentence indices are keyed together with their paragraph so that
            // per-paragraph sentence numbering cannot merge unrelated sentences.
            sentences
                .entry((mention.paragraph_idx, mention.sentence_idx))
                .or_default()
                .insert(id);
            paragraphs.entry(mention.paragraph_idx).or_default().insert(id);
            page.insert(id);
        }

        for scope in sentences.values() {
            let ids: Vec<&str> = scope.iter().copied().collect();
            count_scope_pairs(&ids, &mut counts.sentence);
        }
        for scope in paragraphs.values() {
            let ids: Vec<&str> = scope.iter().copied().collect();
            count_scope_pairs(&ids, &mut counts.paragraph);
        }
        let ids: Vec<&str> = page.iter().copied().collect();
        count_scope_pairs(&ids, &mut counts.page);

        counts
    }
}

/// Build the three graphs from mention lists (see [`CooccurrenceGraphBuilder`])
pub fn build_graphs(documents: &[Document], registry: &EntityRegistry) -> GraphSet {
    CooccurrenceGraphBuilder::new(registry).build(documents)
}

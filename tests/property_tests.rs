//! Property-based tests using proptest

use cooccur_rec::graph::persist;
use cooccur_rec::pagerank::personalized::seed_personalization;
use cooccur_rec::variants::{GuidedWalk, RandomWalk};
use cooccur_rec::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

const NUM_ENTITIES: usize = 8;

fn entity_id(i: usize) -> String {
    format!("e{i}")
}

fn registry() -> EntityRegistry {
    EntityRegistry::from_entities(
        (0..NUM_ENTITIES)
            .map(|i| Entity::new(entity_id(i), format!("Entity {i}"), EntityType::Place)),
    )
    .unwrap()
}

/// Documents as (entity, sentence, paragraph) mention triples
fn documents() -> impl Strategy<Value = Vec<Document>> {
    prop::collection::vec(
        prop::collection::vec((0..NUM_ENTITIES, 0usize..4, 0usize..2), 0..10),
        0..8,
    )
    .prop_map(|docs| {
        docs.into_iter()
            .enumerate()
            .map(|(d, mentions)| {
                Document::new(
                    format!("doc-{d}"),
                    mentions
                        .into_iter()
                        .map(|(e, s, p)| Mention::new(entity_id(e), s, p))
                        .collect(),
                )
            })
            .collect()
    })
}

/// A random weighted graph over `NUM_ENTITIES` nodes
fn graphs() -> impl Strategy<Value = CsrGraph> {
    prop::collection::vec((0..NUM_ENTITIES, 0..NUM_ENTITIES, 1u32..6), 0..20).prop_map(|edges| {
        let mut builder = GraphBuilder::with_capacity(NUM_ENTITIES);
        for i in 0..NUM_ENTITIES {
            builder.get_or_create_node(&entity_id(i));
        }
        for (a, b, w) in edges {
            builder.increment_edge(a as u32, b as u32, w);
        }
        CsrGraph::from_builder(&builder, Granularity::Sentence)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn test_document_order_irrelevant(docs in documents()) {
        let registry = registry();
        let forward = build_graphs(&docs, &registry);
        let mut reversed_docs = docs.clone();
        reversed_docs.reverse();
        let reversed = build_graphs(&reversed_docs, &registry);
        prop_assert_eq!(forward, reversed);
    }

    #[test]
    fn test_weights_positive_without_self_loops(docs in documents()) {
        let graphs = build_graphs(&docs, &registry());
        for (_, graph) in graphs.iter() {
            prop_assert_eq!(graph.num_nodes, NUM_ENTITIES);
            for (a, b, weight) in graph.edges() {
                prop_assert!(a != b);
                prop_assert!(weight > 0);
                prop_assert_eq!(graph.edge_weight(b, a), Some(weight));
            }
        }
    }

    #[test]
    fn test_page_weight_counts_documents(
        docs in documents(),
        a in 0..NUM_ENTITIES,
        b in 0..NUM_ENTITIES,
    ) {
        prop_assume!(a != b);
        let graphs = build_graphs(&docs, &registry());
        let (id_a, id_b) = (entity_id(a), entity_id(b));
        let expected = docs
            .iter()
            .filter(|doc| {
                doc.mentions.iter().any(|m| m.entity_id == id_a)
                    && doc.mentions.iter().any(|m| m.entity_id == id_b)
            })
            .count() as u32;
        let actual = graphs.page.edge_weight_between(&id_a, &id_b).unwrap_or(0);
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn test_pagerank_is_distribution(graph in graphs(), seed in 0..NUM_ENTITIES as u32) {
        let result = PersonalizedPageRank::new()
            .with_max_iterations(200)
            .with_personalization(seed_personalization(&[seed], graph.num_nodes))
            .run(&graph);

        let sum: f64 = result.scores.iter().sum();
        prop_assert!((sum - 1.0).abs() < 1e-6, "Scores sum to {} instead of 1", sum);
        prop_assert!(result.scores.iter().all(|&s| s >= 0.0));
    }

    #[test]
    fn test_ranked_output_strictly_ordered(
        graph in graphs(),
        seed in 0..NUM_ENTITIES,
        kind_idx in 0usize..3,
    ) {
        let kind = [
            AlgorithmKind::SimpleCooccurrence,
            AlgorithmKind::PageRank,
            AlgorithmKind::InverseFrequency,
        ][kind_idx];
        let algorithm = Algorithm::from_kind(kind, &RecommendConfig::default());
        let seed_id = entity_id(seed);
        let result = recommend(&graph, &[seed_id.clone()], &algorithm, 0).unwrap();
        let items = result.ranked_items().unwrap();

        prop_assert!(items.iter().all(|item| item.entity != seed_id && item.score > 0.0));
        for pair in items.windows(2) {
            prop_assert!(
                pair[0].score > pair[1].score
                    || (pair[0].score == pair[1].score && pair[0].entity < pair[1].entity)
            );
        }
    }

    #[test]
    fn test_random_walk_follows_edges(
        graph in graphs(),
        start in 0..NUM_ENTITIES as u32,
        length in 0usize..12,
        rng_seed: u64,
    ) {
        let mut rng = StdRng::seed_from_u64(rng_seed);
        let (path, complete) = RandomWalk::new(length).walk_from(&graph, start, &mut rng);

        prop_assert!(path.len() <= length + 1);
        prop_assert_eq!(complete, path.len() == length + 1);
        prop_assert_eq!(path.first(), Some(graph.entity(start)));
        for pair in path.steps.windows(2) {
            prop_assert!(graph.edge_weight_between(&pair[0].entity, &pair[1].entity).is_some());
        }
        // Only isolated nodes are dead ends when revisits are allowed
        if !graph.is_isolated(start) {
            prop_assert!(complete);
        }
    }

    #[test]
    fn test_random_walk_reproducible(
        graph in graphs(),
        start in 0..NUM_ENTITIES as u32,
        rng_seed: u64,
    ) {
        let walk = RandomWalk::new(6);
        let first = walk.walk_from(&graph, start, &mut StdRng::seed_from_u64(rng_seed));
        let second = walk.walk_from(&graph, start, &mut StdRng::seed_from_u64(rng_seed));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_guided_walk_endpoints(
        graph in graphs(),
        start in 0..NUM_ENTITIES as u32,
        target in 0..NUM_ENTITIES as u32,
    ) {
        match GuidedWalk::new().walk_between(&graph, start, target) {
            Ok(path) => {
                prop_assert_eq!(path.first(), Some(graph.entity(start)));
                prop_assert_eq!(path.last(), Some(graph.entity(target)));
                prop_assert!(path.len() <= graph.num_nodes);
                prop_assert_eq!(path.detours().count(), 0);
                for pair in path.steps.windows(2) {
                    let (a, b) = (&pair[0].entity, &pair[1].entity);
                    prop_assert!(graph.edge_weight_between(a, b).is_some());
                }
            }
            Err(err) => {
                prop_assert!(
                    matches!(err, RecommendError::NoPath { .. }),
                    "unexpected error {}",
                    err
                );
                prop_assert!(start != target);
            }
        }
    }

    #[test]
    fn test_persisted_graph_unchanged(graph in graphs()) {
        for format in [GraphFormat::Binary, GraphFormat::GraphMl] {
            let bytes = persist::save(&graph, format).unwrap();
            let loaded = persist::load(&bytes, format).unwrap();
            prop_assert_eq!(&loaded, &graph);
        }
    }
}

//! Integration tests for cooccur_rec

use cooccur_rec::graph::persist;
use cooccur_rec::*;
use std::sync::Arc;

/// Sample scraped blog posts
const BLOG_POSTS: [&str; 3] = [
    r#"Started the morning with haleem at Pista House. The haleem was rich and slow cooked.

After breakfast we walked to Charminar. Chowmahalla Palace is a short walk from Charminar."#,
    r#"Pista House is famous for haleem during Ramzan. Irani chai at Nimrah Cafe, right next to Charminar, is a must.

Golconda Fort at sunset was the highlight. The Qutb Shahi Tombs are close to Golconda Fort."#,
    r#"Hyderabadi biryani at Paradise. Later, Irani chai and Osmania biscuits at Nimrah Cafe."#,
];

fn registry() -> Arc<EntityRegistry> {
    Arc::new(
        EntityRegistry::from_entities([
            Entity::new("haleem", "Haleem", EntityType::Food),
            Entity::new("hyderabadi_biryani", "Hyderabadi Biryani", EntityType::Food)
                .with_aliases(&["Biryani"]),
            Entity::new("irani_chai", "Irani Chai", EntityType::Food),
            Entity::new("osmania_biscuits", "Osmania Biscuits", EntityType::Food),
            Entity::new("pista_house", "Pista House", EntityType::Place),
            Entity::new("nimrah_cafe", "Nimrah Cafe", EntityType::Place),
            Entity::new("paradise", "Paradise", EntityType::Place),
            Entity::new("charminar", "Charminar", EntityType::Monument),
            Entity::new("chowmahalla_palace", "Chowmahalla Palace", EntityType::Monument),
            Entity::new("golconda_fort", "Golconda Fort", EntityType::Monument),
            Entity::new("qutb_shahi_tombs", "Qutb Shahi Tombs", EntityType::Monument),
            Entity::new("salar_jung_museum", "Salar Jung Museum", EntityType::Monument),
        ])
        .unwrap(),
    )
}

fn annotated_documents(registry: &Arc<EntityRegistry>) -> Vec<Document> {
    let gazetteer = GazetteerExtractor::new(Arc::clone(registry));
    BLOG_POSTS
        .iter()
        .enumerate()
        .map(|(i, text)| gazetteer.annotate(&format!("post-{i}"), text))
        .collect()
}

#[test]
fn test_full_pipeline() {
    let registry = registry();
    let docs = annotated_documents(&registry);
    assert!(docs.iter().all(|doc| !doc.mentions.is_empty()));

    let graphs = build_graphs(&docs, &registry);

    // Every registry entity is a node at every granularity
    for (_, graph) in graphs.iter() {
        assert_eq!(graph.num_nodes, registry.len());
    }
    // Never mentioned
    assert!(graphs.page.is_isolated(graphs.page.node_index("salar_jung_museum").unwrap()));

    // haleem + pista_house share a sentence in posts 0 and 1
    assert_eq!(graphs.sentence.edge_weight_between("haleem", "pista_house"), Some(2));
    // charminar + chowmahalla_palace share a sentence only in post 0
    assert_eq!(
        graphs.sentence.edge_weight_between("charminar", "chowmahalla_palace"),
        Some(1)
    );
    // haleem + charminar never share a sentence, but share pages 0 and 1
    assert_eq!(graphs.sentence.edge_weight_between("haleem", "charminar"), None);
    assert_eq!(graphs.page.edge_weight_between("haleem", "charminar"), Some(2));

    let engine = RecommendationEngine::new(RecommendConfig::default().with_rng_seed(7)).unwrap();
    engine.load_graphs(graphs);
    let resolver = SeedResolver::new(Arc::clone(&registry), ResolverConfig::default()).unwrap();
    let service =
        RecommendationService::new(resolver, engine).with_explainer(Box::new(ListExplainer));

    // At sentence level the two seeds only co-occur with each other
    let mut request =
        ServeRequest::new("Had haleem at Pista House", AlgorithmKind::SimpleCooccurrence);
    request.granularity = Some("paragraph".into());
    let response = service.handle(&request).unwrap();
    assert_eq!(response.entities, vec!["haleem", "pista_house"]);
    let recommended = response.recommendation.entities();
    assert!(!recommended.is_empty());
    assert!(!recommended.contains(&"haleem"));
    assert!(!recommended.contains(&"pista_house"));
    assert!(response.explanation.unwrap().starts_with("Since you enjoyed Haleem, Pista House"));
}

#[test]
fn test_single_sentence_scenario() {
    let registry = EntityRegistry::from_entities([
        Entity::new("a", "A", EntityType::Food),
        Entity::new("b", "B", EntityType::Place),
        Entity::new("c", "C", EntityType::Monument),
    ])
    .unwrap();
    let docs = vec![Document::from_sentence("doc", 1, &["a", "b", "c"])];
    let graphs = build_graphs(&docs, &registry);

    assert_eq!(graphs.sentence.num_edges(), 3);
    for (x, y) in [("a", "b"), ("a", "c"), ("b", "c")] {
        assert_eq!(graphs.sentence.edge_weight_between(x, y), Some(1));
    }

    let algorithm =
        Algorithm::from_kind(AlgorithmKind::SimpleCooccurrence, &RecommendConfig::default());
    let result = recommend(&graphs.sentence, &["a".to_string()], &algorithm, 10).unwrap();
    let items = result.ranked_items().unwrap();
    assert_eq!(items, &[ScoredEntity::new("b", 1.0), ScoredEntity::new("c", 1.0)]);
}

#[test]
fn test_resolver_scenario() {
    let resolver = SeedResolver::new(registry(), ResolverConfig::default()).unwrap();
    assert_eq!(
        resolver.resolve("Had haleem at Pista House").unwrap(),
        vec!["haleem", "pista_house"]
    );
    assert!(matches!(
        resolver.resolve("Nothing to see here").unwrap_err(),
        RecommendError::NoSeedEntities { .. }
    ));
}

#[test]
fn test_persist_and_reload_both_formats() {
    let registry = registry();
    let graphs = build_graphs(&annotated_documents(&registry), &registry);

    for format in [GraphFormat::Binary, GraphFormat::GraphMl] {
        let dir = tempfile::tempdir().unwrap();
        persist::save_graph_set(&graphs, dir.path(), format).unwrap();
        for granularity in Granularity::ALL {
            let file = dir.path().join(persist::graph_file_name(granularity, format));
            assert!(file.exists(), "missing {}", file.display());
        }

        let loaded = persist::load_graph_set(dir.path(), format).unwrap();
        assert_eq!(loaded, graphs);

        let engine = RecommendationEngine::new(RecommendConfig::default()).unwrap();
        engine.load_from_dir(dir.path(), format).unwrap();
        let request = RecommendationRequest::new(
            vec!["haleem".into()],
            engine.algorithm(AlgorithmKind::PageRank),
        )
        .with_granularity(Granularity::Page);
        let recommendation = engine.recommend(&request).unwrap();
        assert!(recommendation.complete);
        assert!(!recommendation.entities().is_empty());
    }
}

#[test]
fn test_every_algorithm_serves() {
    let registry = registry();
    let graphs = build_graphs(&annotated_documents(&registry), &registry);
    let engine = RecommendationEngine::new(RecommendConfig::default().with_rng_seed(42)).unwrap();
    engine.load_graphs(graphs);

    for kind in AlgorithmKind::ALL {
        let seeds = if kind.is_guided() {
            vec!["haleem".to_string(), "chowmahalla_palace".to_string()]
        } else {
            vec!["haleem".to_string()]
        };
        let request = RecommendationRequest::new(seeds, engine.algorithm(kind))
            .with_granularity(Granularity::Page);
        let recommendation = engine.recommend(&request).unwrap();
        assert_eq!(recommendation.algorithm, kind);

        if kind.is_walk() {
            let path = recommendation.walk_path().unwrap();
            assert_eq!(path.first(), Some("haleem"));
            if kind.is_guided() && recommendation.complete {
                assert_eq!(path.last(), Some("chowmahalla_palace"));
            }
        } else {
            let items = recommendation.ranked_items().unwrap();
            assert!(items.iter().all(|item| item.entity != "haleem"));
            assert!(items.windows(2).all(|w| {
                w[0].score > w[1].score || (w[0].score == w[1].score && w[0].entity < w[1].entity)
            }));
        }
    }
}

#[test]
fn test_walk_reproducible_with_seed() {
    let registry = registry();
    let graphs = build_graphs(&annotated_documents(&registry), &registry);
    let config = RecommendConfig::default().with_walk_length(3).with_rng_seed(2024);

    let algorithm = Algorithm::from_kind(AlgorithmKind::RandomWalk, &config);
    let seeds = vec!["haleem".to_string()];
    let first = recommend(&graphs.page, &seeds, &algorithm, 0).unwrap();
    let second = recommend(&graphs.page, &seeds, &algorithm, 0).unwrap();
    assert_eq!(first, second);
    // The page graph has no dead end reachable from haleem
    assert_eq!(first.walk_path().unwrap().len(), 4);
}

#[test]
fn test_hot_swap_keeps_old_snapshot_alive() {
    let registry = registry();
    let engine = RecommendationEngine::new(RecommendConfig::default()).unwrap();
    engine.load_graphs(build_graphs(&annotated_documents(&registry), &registry));

    let held = engine.snapshot().load().unwrap();
    let empty = build_graphs(&[], &registry);
    let previous = engine.snapshot().swap(empty).unwrap();
    assert!(Arc::ptr_eq(&held, &previous));

    // The in-flight snapshot still sees the old edges
    assert!(held.sentence.num_edges() > 0);
    let request = RecommendationRequest::new(
        vec!["haleem".into()],
        engine.algorithm(AlgorithmKind::SimpleCooccurrence),
    );
    assert!(engine.recommend(&request).unwrap().entities().is_empty());
}

#[test]
fn test_unknown_seed_for_granularity() {
    let registry = registry();
    let engine = RecommendationEngine::new(RecommendConfig::default()).unwrap();
    engine.load_graphs(build_graphs(&annotated_documents(&registry), &registry));
    let request = RecommendationRequest::new(
        vec!["falooda".into()],
        engine.algorithm(AlgorithmKind::InverseFrequency),
    );
    assert!(matches!(
        engine.recommend(&request).unwrap_err(),
        RecommendError::InvalidSeed { .. }
    ));
}

#[test]
fn test_network_analysis() {
    let registry = registry();
    let graphs = build_graphs(&annotated_documents(&registry), &registry);
    let stats = NetworkAnalyzer::new().analyze(&graphs.page);

    assert_eq!(stats.num_nodes, registry.len());
    assert_eq!(stats.num_edges, graphs.page.num_edges());
    // salar_jung_museum is on its own
    assert!(stats.connected_components.iter().any(|c| c == &vec!["salar_jung_museum".to_string()]));
    assert!(stats.density > 0.0 && stats.density <= 1.0);
    let json = serde_json::to_string(&stats).unwrap();
    assert!(json.contains("betweenness_centrality"));
    assert!(json.contains("eigenvector_centrality"));
    assert!((stats.pagerank.values().sum::<f64>() - 1.0).abs() < 1e-6);
}

#[test]
fn test_request_json_roundtrip() {
    let registry = registry();
    let engine = RecommendationEngine::new(RecommendConfig::default()).unwrap();
    engine.load_graphs(build_graphs(&annotated_documents(&registry), &registry));
    let resolver = SeedResolver::new(registry, ResolverConfig::default()).unwrap();
    let service = RecommendationService::new(resolver, engine);

    let request: ServeRequest = serde_json::from_str(
        r#"{"text": "Where can I get haleem?", "algorithm": "pagerank", "top_k": 2, "explain": false}"#,
    )
    .unwrap();
    let response = service.handle(&request).unwrap();
    assert!(response.explanation.is_none());
    assert!(response.recommendation.entities().len() <= 2);

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["entities"][0], "haleem");
    assert_eq!(json["recommendation"]["output"]["kind"], "ranked");
}

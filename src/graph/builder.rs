//! Graph builder with efficient edge handling
//!
//! This module provides a mutable graph builder that uses FxHashMap
//! for O(1) edge lookups during construction. Edge weights are integer
//! co-occurrence counts.

use rustc_hash::FxHashMap;

/// Partial edge-weight map keyed by an ordered `(a, b)` id pair with `a < b`
pub type PairCounts = FxHashMap<(String, String), u32>;

/// A node in the graph builder
#[derive(Debug, Clone)]
pub struct BuilderNode {
    /// The entity id for this node
    pub entity: String,
    /// Adjacency list: target node ID -> co-occurrence count
    pub edges: FxHashMap<u32, u32>,
}

impl BuilderNode {
    /// Create a new node
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            edges: FxHashMap::default(),
        }
    }
}

/// A mutable graph builder optimized for incremental construction
#[derive(Debug)]
pub struct GraphBuilder {
    /// Maps entity id -> node ID
    entity_to_id: FxHashMap<String, u32>,
    /// Node storage
    nodes: Vec<BuilderNode>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Create a new empty graph builder
    pub fn new() -> Self {
        Self {
            entity_to_id: FxHashMap::default(),
            nodes: Vec::new(),
        }
    }

    /// Create a graph builder with pre-allocated capacity
    pub fn with_capacity(node_capacity: usize) -> Self {
        Self {
            entity_to_id: FxHashMap::with_capacity_and_hasher(node_capacity, Default::default()),
            nodes: Vec::with_capacity(node_capacity),
        }
    }

    /// Create a builder whose node set is exactly `entities` (no edges yet)
    pub fn with_nodes<'a>(entities: impl IntoIterator<Item = &'a str>) -> Self {
        let mut builder = Self::new();
        for entity in entities {
            builder.get_or_create_node(entity);
        }
        builder
    }

    /// Get or create a node for the given entity, returning its ID
    pub fn get_or_create_node(&mut self, entity: &str) -> u32 {
        if let Some(&id) = self.entity_to_id.get(entity) {
            return id;
        }

        let id = self.nodes.len() as u32;
        self.entity_to_id.insert(entity.to_string(), id);
        self.nodes.push(BuilderNode::new(entity));
        id
    }

    /// Increment the edge weight between two nodes
    ///
    /// If the edge doesn't exist, it's created with the given weight.
    /// If it exists, the weight is added to the existing weight.
    /// Zero weights and self-loops are ignored.
    pub fn increment_edge(&mut self, from: u32, to: u32, weight: u32) {
        if from == to || weight == 0 {
            return;
        }

        // Add edge in both directions (undirected graph)
        if let Some(node) = self.nodes.get_mut(from as usize) {
            *node.edges.entry(to).or_insert(0) += weight;
        }
        if let Some(node) = self.nodes.get_mut(to as usize) {
            *node.edges.entry(from).or_insert(0) += weight;
        }
    }

    /// Add a pair count by entity id, creating nodes as needed
    pub fn increment_pair(&mut self, a: &str, b: &str, weight: u32) {
        let id_a = self.get_or_create_node(a);
        let id_b = self.get_or_create_node(b);
        self.increment_edge(id_a, id_b, weight);
    }

    /// Merge a partial pair-count map into this builder
    pub fn merge_counts(&mut self, counts: &PairCounts) {
        for ((a, b), &weight) in counts {
            self.increment_pair(a, b, weight);
        }
    }

    /// Get the number of nodes in the graph
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the total number of edges (counting each undirected edge once)
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum::<usize>() / 2
    }

    /// Get a node by ID
    pub fn get_node(&self, id: u32) -> Option<&BuilderNode> {
        self.nodes.get(id as usize)
    }

    /// Get a node ID by entity id
    pub fn get_node_id(&self, entity: &str) -> Option<u32> {
        self.entity_to_id.get(entity).copied()
    }

    /// Get the entity id for a node ID
    pub fn get_entity(&self, id: u32) -> Option<&str> {
        self.nodes.get(id as usize).map(|n| n.entity.as_str())
    }

    /// Weight of the edge between two entities, if present
    pub fn edge_weight(&self, a: &str, b: &str) -> Option<u32> {
        let id_a = self.get_node_id(a)?;
        let id_b = self.get_node_id(b)?;
        self.nodes[id_a as usize].edges.get(&id_b).copied()
    }

    /// Iterate over all nodes
    pub fn nodes(&self) -> impl Iterator<Item = (u32, &BuilderNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (i as u32, n))
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Add one co-occurrence for every unordered pair of distinct ids in `scope`.
///
/// `scope` must already be deduplicated so that repeated mentions inside one
/// scope instance contribute a single count.
pub fn count_scope_pairs(scope: &[&str], counts: &mut PairCounts) {
    for i in 0..scope.len() {
        for j in (i + 1)..scope.len() {
            let (a, b) = if scope[i] <= scope[j] {
                (scope[i], scope[j])
            } else {
                (scope[j], scope[i])
            };
            if a != b {
                *counts.entry((a.to_string(), b.to_string())).or_insert(0) += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_builder_basic() {
        let mut builder = GraphBuilder::new();

        let id_a = builder.get_or_create_node("haleem");
        let id_b = builder.get_or_create_node("pista_house");
        let id_c = builder.get_or_create_node("haleem"); // duplicate

        assert_eq!(id_a, id_c);
        assert_ne!(id_a, id_b);
        assert_eq!(builder.node_count(), 2);
    }

    #[test]
    fn test_edge_incrementing() {
        let mut builder = GraphBuilder::new();

        let id_a = builder.get_or_create_node("haleem");
        let id_b = builder.get_or_create_node("pista_house");

        builder.increment_edge(id_a, id_b, 1);
        builder.increment_edge(id_a, id_b, 1);

        // Should have weight 2 in both directions
        assert_eq!(builder.get_node(id_a).unwrap().edges.get(&id_b), Some(&2));
        assert_eq!(builder.get_node(id_b).unwrap().edges.get(&id_a), Some(&2));
        assert_eq!(builder.edge_count(), 1);
    }

    #[test]
    fn test_self_loops_prevented() {
        let mut builder = GraphBuilder::new();
        let id_a = builder.get_or_create_node("charminar");

        builder.increment_edge(id_a, id_a, 1);

        let node = builder.get_node(id_a).unwrap();
        assert!(node.edges.is_empty());
    }

    #[test]
    fn test_zero_weight_ignored() {
        let mut builder = GraphBuilder::new();
        builder.increment_pair("a", "b", 0);
        assert_eq!(builder.edge_count(), 0);
        assert_eq!(builder.edge_weight("a", "b"), None);
    }

    #[test]
    fn test_with_nodes_keeps_isolated() {
        let builder = GraphBuilder::with_nodes(["a", "b", "c"]);
        assert_eq!(builder.node_count(), 3);
        assert_eq!(builder.edge_count(), 0);
    }

    #[test]
    fn test_count_scope_pairs_orders_keys() {
        let mut counts = PairCounts::default();
        count_scope_pairs(&["c", "a", "b"], &mut counts);
        assert_eq!(counts.len(), 3);
        assert_eq!(counts.get(&("a".to_string(), "c".to_string())), Some(&1));
        assert!(counts.get(&("c".to_string(), "a".to_string())).is_none());
    }

    #[test]
    fn test_merge_counts_accumulates() {
        let mut first = PairCounts::default();
        count_scope_pairs(&["a", "b"], &mut first);
        let mut builder = GraphBuilder::new();
        builder.merge_counts(&first);
        builder.merge_counts(&first);
        assert_eq!(builder.edge_weight("a", "b"), Some(2));
        assert_eq!(builder.edge_weight("b", "a"), Some(2));
    }
}

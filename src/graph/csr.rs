//! Compressed sparse row graph
//!
//! Immutable, read-optimized form of a co-occurrence graph. Nodes are stored in
//! ascending entity-id order and every adjacency row is sorted by node index, so
//! iteration order is deterministic regardless of how the graph was built.

use crate::errors::{RecommendError, Result};
use crate::graph::builder::GraphBuilder;
use crate::types::Granularity;
use rustc_hash::FxHashMap;

/// An undirected weighted graph in CSR layout
#[derive(Debug, Clone, PartialEq)]
pub struct CsrGraph {
    /// Number of nodes
    pub num_nodes: usize,
    /// Scope level this graph was built at
    granularity: Granularity,
    /// Entity id per node, ascending
    entities: Vec<String>,
    /// Entity id -> node index
    index: FxHashMap<String, u32>,
    /// Row offsets into `col_idx`/`weights` (len = num_nodes + 1)
    row_ptr: Vec<usize>,
    /// Neighbor node indices
    col_idx: Vec<u32>,
    /// Edge weights aligned with `col_idx`
    weights: Vec<u32>,
    /// Sum of incident edge weights per node
    node_weight: Vec<u64>,
}

impl CsrGraph {
    /// Freeze a builder into CSR form
    pub fn from_builder(builder: &GraphBuilder, granularity: Granularity) -> Self {
        let mut order: Vec<(u32, &str)> = builder
            .nodes()
            .map(|(id, node)| (id, node.entity.as_str()))
            .collect();
        order.sort_by(|a, b| a.1.cmp(b.1));

        let mut remap = vec![0u32; order.len()];
        for (new_idx, (old_id, _)) in order.iter().enumerate() {
            remap[*old_id as usize] = new_idx as u32;
        }

        let num_nodes = order.len();
        let mut entities = Vec::with_capacity(num_nodes);
        let mut index = FxHashMap::with_capacity_and_hasher(num_nodes, Default::default());
        let mut row_ptr = Vec::with_capacity(num_nodes + 1);
        let mut col_idx = Vec::new();
        let mut weights = Vec::new();
        let mut node_weight = Vec::with_capacity(num_nodes);

        row_ptr.push(0);
        for (new_idx, (old_id, entity)) in order.iter().enumerate() {
            entities.push(entity.to_string());
            index.insert(entity.to_string(), new_idx as u32);

            let mut row: Vec<(u32, u32)> = builder
                .get_node(*old_id)
                .map(|node| {
                    node.edges
                        .iter()
                        .map(|(&target, &w)| (remap[target as usize], w))
                        .collect()
                })
                .unwrap_or_default();
            row.sort_unstable_by_key(|&(target, _)| target);

            node_weight.push(row.iter().map(|&(_, w)| w as u64).sum());
            for (target, w) in row {
                col_idx.push(target);
                weights.push(w);
            }
            row_ptr.push(col_idx.len());
        }

        Self {
            num_nodes,
            granularity,
            entities,
            index,
            row_ptr,
            col_idx,
            weights,
            node_weight,
        }
    }

    /// Build a graph from an explicit node list and edge list.
    ///
    /// Every edge endpoint must be a listed node, weights must be positive,
    /// self-loops and duplicate edges are rejected.
    pub fn from_edges(
        granularity: Granularity,
        nodes: impl IntoIterator<Item = String>,
        edges: &[(String, String, u32)],
    ) -> Result<Self> {
        let node_list: Vec<String> = nodes.into_iter().collect();
        let mut builder = GraphBuilder::with_capacity(node_list.len());
        for node in &node_list {
            builder.get_or_create_node(node);
        }
        if builder.node_count() != node_list.len() {
            return Err(RecommendError::serialization("duplicate node id in graph"));
        }

        for (a, b, weight) in edges {
            let (Some(id_a), Some(id_b)) = (builder.get_node_id(a), builder.get_node_id(b)) else {
                return Err(RecommendError::serialization(format!(
                    "edge ({a}, {b}) references an unknown node"
                )));
            };
            if id_a == id_b {
                return Err(RecommendError::serialization(format!("self-loop on {a}")));
            }
            if *weight == 0 {
                return Err(RecommendError::serialization(format!(
                    "edge ({a}, {b}) has non-positive weight"
                )));
            }
            if builder.edge_weight(a, b).is_some() {
                return Err(RecommendError::serialization(format!(
                    "duplicate edge ({a}, {b})"
                )));
            }
            builder.increment_edge(id_a, id_b, *weight);
        }

        Ok(Self::from_builder(&builder, granularity))
    }

    /// Scope level this graph was built at
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Number of undirected edges
    pub fn num_edges(&self) -> usize {
        self.col_idx.len() / 2
    }

    /// Check if the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.num_nodes == 0
    }

    /// Node index of an entity id
    pub fn node_index(&self, entity: &str) -> Option<u32> {
        self.index.get(entity).copied()
    }

    /// Check whether an entity id is a node
    pub fn contains(&self, entity: &str) -> bool {
        self.index.contains_key(entity)
    }

    /// Entity id of a node index
    pub fn entity(&self, node: u32) -> &str {
        &self.entities[node as usize]
    }

    /// All entity ids, ascending
    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    /// Neighbors of a node with their edge weights, ascending by node index
    pub fn neighbors(&self, node: u32) -> impl Iterator<Item = (u32, u32)> + '_ {
        let start = self.row_ptr[node as usize];
        let end = self.row_ptr[node as usize + 1];
        self.col_idx[start..end]
            .iter()
            .copied()
            .zip(self.weights[start..end].iter().copied())
    }

    /// Number of distinct neighbors
    pub fn degree(&self, node: u32) -> usize {
        self.row_ptr[node as usize + 1] - self.row_ptr[node as usize]
    }

    /// Sum of incident edge weights
    pub fn node_total_weight(&self, node: u32) -> u64 {
        self.node_weight[node as usize]
    }

    /// Check whether a node has no incident edges
    pub fn is_isolated(&self, node: u32) -> bool {
        self.degree(node) == 0
    }

    /// Nodes with no incident edges
    pub fn dangling_nodes(&self) -> Vec<u32> {
        (0..self.num_nodes as u32)
            .filter(|&n| self.is_isolated(n))
            .collect()
    }

    /// Weight of the edge between two node indices
    pub fn edge_weight(&self, a: u32, b: u32) -> Option<u32> {
        let start = self.row_ptr[a as usize];
        let end = self.row_ptr[a as usize + 1];
        self.col_idx[start..end]
            .binary_search(&b)
            .ok()
            .map(|pos| self.weights[start + pos])
    }

    /// Weight of the edge between two entity ids
    pub fn edge_weight_between(&self, a: &str, b: &str) -> Option<u32> {
        self.edge_weight(self.node_index(a)?, self.node_index(b)?)
    }

    /// Each undirected edge once, as `(a, b, weight)` with `a < b`
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32, u32)> + '_ {
        (0..self.num_nodes as u32).flat_map(move |a| {
            self.neighbors(a)
                .filter(move |&(b, _)| a < b)
                .map(move |(b, w)| (a, b, w))
        })
    }

    /// Sum of all edge weights (each undirected edge once)
    pub fn total_weight(&self) -> u64 {
        self.node_weight.iter().sum::<u64>() / 2
    }
}

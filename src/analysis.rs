//! Network analysis
//!
//! Structural statistics over a co-occurrence graph. Everything here is
//! read-only and total: an empty graph produces degenerate values rather than
//! an error.
//!
//! Degree centrality uses weighted strength (sum of incident co-occurrence
//! counts). Path-based measures (betweenness, closeness, diameter) and
//! clustering are computed on the unweighted topology. Eigenvector centrality
//! and the global PageRank follow the co-occurrence weights.

use crate::graph::csr::CsrGraph;
use crate::pagerank::standard::StandardPageRank;
use crate::types::EntityId;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

/// Structural statistics of one graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkStats {
    pub num_nodes: usize,
    pub num_edges: usize,
    /// `2m / (n (n - 1))`, 0 for fewer than two nodes
    pub density: f64,
    /// Mean unweighted degree
    pub average_degree: f64,
    /// Mean local clustering coefficient over all nodes
    pub average_clustering: f64,
    /// Weighted strength / (n - 1)
    pub degree_centrality: BTreeMap<EntityId, f64>,
    pub betweenness_centrality: BTreeMap<EntityId, f64>,
    pub closeness_centrality: BTreeMap<EntityId, f64>,
    pub clustering_coefficients: BTreeMap<EntityId, f64>,
    /// Unit-length principal eigenvector of the weighted adjacency matrix
    pub eigenvector_centrality: BTreeMap<EntityId, f64>,
    /// Uniform-teleport PageRank, summing to 1
    pub pagerank: BTreeMap<EntityId, f64>,
    /// Components, largest first; members ascending
    pub connected_components: Vec<Vec<EntityId>>,
    /// Longest shortest path (hops) inside the largest component
    pub diameter: usize,
    /// Mean shortest path length (hops) inside the largest component
    pub average_path_length: f64,
}

impl NetworkStats {
    fn empty() -> Self {
        Self {
            num_nodes: 0,
            num_edges: 0,
            density: 0.0,
            average_degree: 0.0,
            average_clustering: 0.0,
            degree_centrality: BTreeMap::new(),
            betweenness_centrality: BTreeMap::new(),
            closeness_centrality: BTreeMap::new(),
            clustering_coefficients: BTreeMap::new(),
            eigenvector_centrality: BTreeMap::new(),
            pagerank: BTreeMap::new(),
            connected_components: Vec::new(),
            diameter: 0,
            average_path_length: 0.0,
        }
    }

    /// Number of connected components
    pub fn component_count(&self) -> usize {
        self.connected_components.len()
    }
}

/// Computes [`NetworkStats`]
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkAnalyzer;

impl NetworkAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Compute every statistic for a graph
    pub fn analyze(&self, graph: &CsrGraph) -> NetworkStats {
        let n = graph.num_nodes;
        if n == 0 {
            return NetworkStats::empty();
        }

        let m = graph.num_edges();
        let density = if n > 1 {
            2.0 * m as f64 / (n as f64 * (n as f64 - 1.0))
        } else {
            0.0
        };
        let average_degree = 2.0 * m as f64 / n as f64;

        let clustering = clustering_coefficients(graph);
        let average_clustering = clustering.iter().sum::<f64>() / n as f64;

        let components = connected_components(graph);
        let (diameter, average_path_length) = components
            .first()
            .map(|largest| path_lengths(graph, largest))
            .unwrap_or((0, 0.0));

        let named = |values: Vec<f64>| -> BTreeMap<EntityId, f64> {
            values
                .into_iter()
                .enumerate()
                .map(|(i, v)| (graph.entity(i as u32).to_string(), v))
                .collect()
        };

        let stats = NetworkStats {
            num_nodes: n,
            num_edges: m,
            density,
            average_degree,
            average_clustering,
            degree_centrality: named(degree_centrality(graph)),
            betweenness_centrality: named(betweenness_centrality(graph)),
            closeness_centrality: named(closeness_centrality(graph)),
            clustering_coefficients: named(clustering),
            eigenvector_centrality: named(eigenvector_centrality(graph)),
            pagerank: named(StandardPageRank::new().run(graph).scores),
            connected_components: components
                .iter()
                .map(|c| c.iter().map(|&v| graph.entity(v).to_string()).collect())
                .collect(),
            diameter,
            average_path_length,
        };

        tracing::debug!(
            granularity = %graph.granularity(),
            nodes = stats.num_nodes,
            edges = stats.num_edges,
            components = stats.component_count(),
            "analyzed network"
        );
        stats
    }
}

/// Analyze a graph with the default analyzer
pub fn analyze(graph: &CsrGraph) -> NetworkStats {
    NetworkAnalyzer::new().analyze(graph)
}

/// The `n` highest-valued nodes of a centrality map, ties broken by id
pub fn top_nodes(values: &BTreeMap<EntityId, f64>, n: usize) -> Vec<(EntityId, f64)> {
    let mut ranked: Vec<(EntityId, f64)> = values.iter().map(|(k, v)| (k.clone(), *v)).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(n);
    ranked
}

/// Weighted degree (strength) of every node
pub fn weighted_degrees(graph: &CsrGraph) -> BTreeMap<EntityId, u64> {
    (0..graph.num_nodes as u32)
        .map(|v| (graph.entity(v).to_string(), graph.node_total_weight(v)))
        .collect()
}

fn degree_centrality(graph: &CsrGraph) -> Vec<f64> {
    let n = graph.num_nodes;
    let scale = if n > 1 { 1.0 / (n as f64 - 1.0) } else { 1.0 };
    (0..n as u32)
        .map(|v| graph.node_total_weight(v) as f64 * scale)
        .collect()
}

/// Local clustering: closed triangles over possible neighbor pairs
fn clustering_coefficients(graph: &CsrGraph) -> Vec<f64> {
    (0..graph.num_nodes as u32)
        .map(|v| {
            let neighbors: Vec<u32> = graph.neighbors(v).map(|(u, _)| u).collect();
            let k = neighbors.len();
            if k < 2 {
                return 0.0;
            }
            let mut links = 0usize;
            for (i, &a) in neighbors.iter().enumerate() {
                for &b in &neighbors[i + 1..] {
                    if graph.edge_weight(a, b).is_some() {
                        links += 1;
                    }
                }
            }
            2.0 * links as f64 / (k * (k - 1)) as f64
        })
        .collect()
}

/// Hop distances from `source`; `usize::MAX` marks unreachable nodes
fn bfs_distances(graph: &CsrGraph, source: u32) -> Vec<usize> {
    let mut dist = vec![usize::MAX; graph.num_nodes];
    let mut queue = VecDeque::new();
    dist[source as usize] = 0;
    queue.push_back(source);
    while let Some(v) = queue.pop_front() {
        let next = dist[v as usize] + 1;
        for (u, _) in graph.neighbors(v) {
            if dist[u as usize] == usize::MAX {
                dist[u as usize] = next;
                queue.push_back(u);
            }
        }
    }
    dist
}

/// Components as sorted node lists, largest first (ties: smallest first member)
fn connected_components(graph: &CsrGraph) -> Vec<Vec<u32>> {
    let mut seen = vec![false; graph.num_nodes];
    let mut components = Vec::new();
    for start in 0..graph.num_nodes as u32 {
        if seen[start as usize] {
            continue;
        }
        let mut component = vec![start];
        seen[start as usize] = true;
        let mut cursor = 0;
        while cursor < component.len() {
            let v = component[cursor];
            cursor += 1;
            for (u, _) in graph.neighbors(v) {
                if !seen[u as usize] {
                    seen[u as usize] = true;
                    component.push(u);
                }
            }
        }
        component.sort_unstable();
        components.push(component);
    }
    components.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));
    components
}

/// Diameter and mean shortest path length inside one component
fn path_lengths(graph: &CsrGraph, component: &[u32]) -> (usize, f64) {
    let size = component.len();
    if size < 2 {
        return (0, 0.0);
    }
    let mut diameter = 0;
    let mut total = 0usize;
    for &source in component {
        let dist = bfs_distances(graph, source);
        for &target in component {
            let d = dist[target as usize];
            total += d;
            diameter = diameter.max(d);
        }
    }
    (diameter, total as f64 / (size * (size - 1)) as f64)
}

/// Closeness with the Wasserman-Faust correction for disconnected graphs:
/// `(r / (n - 1)) * (r / sum_dist)` where `r` is the number of reachable nodes.
fn closeness_centrality(graph: &CsrGraph) -> Vec<f64> {
    let n = graph.num_nodes;
    (0..n as u32)
        .map(|v| {
            let dist = bfs_distances(graph, v);
            let (reachable, sum) = dist
                .iter()
                .filter(|&&d| d != usize::MAX && d > 0)
                .fold((0usize, 0usize), |(r, s), &d| (r + 1, s + d));
            if sum == 0 || n < 2 {
                return 0.0;
            }
            let r = reachable as f64;
            (r / sum as f64) * (r / (n as f64 - 1.0))
        })
        .collect()
}

/// Power iteration on `A + I`, normalized to unit length each round.
///
/// The shift keeps bipartite graphs (stars, paths) from oscillating without
/// changing the eigenvectors. Stops once the L1 change falls below
/// `n * 1e-6`; after 1000 rounds the last iterate is returned as is.
fn eigenvector_centrality(graph: &CsrGraph) -> Vec<f64> {
    const MAX_ITERATIONS: usize = 1000;
    const TOLERANCE: f64 = 1e-6;

    let n = graph.num_nodes;
    if n == 0 {
        return Vec::new();
    }
    let mut x = vec![1.0 / n as f64; n];
    let mut next = vec![0.0; n];

    for iteration in 1..=MAX_ITERATIONS {
        next.copy_from_slice(&x);
        for v in 0..n as u32 {
            for (u, w) in graph.neighbors(v) {
                next[u as usize] += x[v as usize] * w as f64;
            }
        }
        let norm = next.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            next.iter_mut().for_each(|v| *v /= norm);
        }

        let delta: f64 = x.iter().zip(&next).map(|(a, b)| (a - b).abs()).sum();
        std::mem::swap(&mut x, &mut next);
        if delta < n as f64 * TOLERANCE {
            return x;
        }
        if iteration == MAX_ITERATIONS {
            tracing::debug!(
                granularity = %graph.granularity(),
                delta,
                "eigenvector centrality did not converge, keeping last iterate"
            );
        }
    }
    x
}

/// Brandes' algorithm on the unweighted topology, normalized by
/// `2 / ((n - 1)(n - 2))` for an undirected graph.
fn betweenness_centrality(graph: &CsrGraph) -> Vec<f64> {
    let n = graph.num_nodes;
    let mut centrality = vec![0.0; n];

    let mut stack = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<u32>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0f64; n];
    let mut dist = vec![-1i64; n];
    let mut delta = vec![0.0f64; n];
    let mut queue = VecDeque::new();

    for s in 0..n as u32 {
        stack.clear();
        for preds in predecessors.iter_mut() {
            preds.clear();
        }
        sigma.iter_mut().for_each(|x| *x = 0.0);
        dist.iter_mut().for_each(|x| *x = -1);
        delta.iter_mut().for_each(|x| *x = 0.0);

        sigma[s as usize] = 1.0;
        dist[s as usize] = 0;
        queue.push_back(s);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            let dv = dist[v as usize];
            for (w, _) in graph.neighbors(v) {
                let wi = w as usize;
                if dist[wi] < 0 {
                    dist[wi] = dv + 1;
                    queue.push_back(w);
                }
                if dist[wi] == dv + 1 {
                    sigma[wi] += sigma[v as usize];
                    predecessors[wi].push(v);
                }
            }
        }

        while let Some(w) = stack.pop() {
            let wi = w as usize;
            for &v in &predecessors[wi] {
                let vi = v as usize;
                delta[vi] += sigma[vi] / sigma[wi] * (1.0 + delta[wi]);
            }
            if w != s {
                centrality[wi] += delta[wi];
            }
        }
    }

    // Each undirected path was counted from both ends.
    let scale = if n > 2 {
        1.0 / ((n as f64 - 1.0) * (n as f64 - 2.0))
    } else {
        0.0
    };
    centrality.iter_mut().for_each(|c| *c *= scale);
    centrality
}

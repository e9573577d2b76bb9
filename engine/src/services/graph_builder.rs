//! Graph layer: builds the dependency multigraph and computes centrality
//! (`spec.md` §4.3).

use crate::models::graph::{DependencyEdge, DependencyGraph, DependencyNode, EdgeKind, NodeKind};
use petgraph::algo::tarjan_scc;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphScope {
    File,
    Module,
    Function,
}

pub fn build_graph(nodes: Vec<DependencyNode>, edges: Vec<DependencyEdge>) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for node in nodes {
        graph.add_node(node);
    }
    for edge in edges {
        graph.add_edge(&edge.from, &edge.to, edge.kind);
    }
    graph
}

/// Power-iteration PageRank, damping 0.85, teleporting dangling mass
/// uniformly, deterministic via sorted-by-id node order (`spec.md` §4.3).
pub fn pagerank(graph: &DependencyGraph) -> FxHashMap<String, f64> {
    const DAMPING: f64 = 0.85;
    const MAX_ITER: usize = 100;
    const EPSILON: f64 = 1e-6;

    let order = graph.nodes_sorted();
    let n = order.len();
    if n == 0 {
        return FxHashMap::default();
    }

    let pos_of: FxHashMap<NodeIndex, usize> =
        order.iter().enumerate().map(|(i, idx)| (*idx, i)).collect();

    let mut rank = vec![1.0 / n as f64; n];

    for _ in 0..MAX_ITER {
        let dangling_mass: f64 = order
            .iter()
            .enumerate()
            .filter(|(_, idx)| graph.out_degree(**idx) == 0)
            .map(|(i, _)| rank[i])
            .sum();

        let mut next = vec![(1.0 - DAMPING) / n as f64; n];
        for pos in 0..n {
            let idx = order[pos];
            let out_deg = graph.out_degree(idx) as f64;
            if out_deg == 0.0 {
                continue;
            }
            let contribution = DAMPING * rank[pos] / out_deg;
            for edge in graph.inner().edges_directed(idx, Direction::Outgoing) {
                if let Some(&target_pos) = pos_of.get(&edge.target()) {
                    next[target_pos] += contribution;
                }
            }
        }
        // Redistribute dangling mass uniformly (teleport to all nodes).
        let dangling_share = DAMPING * dangling_mass / n as f64;
        for v in next.iter_mut() {
            *v += dangling_share;
        }

        let delta: f64 = rank.iter().zip(&next).map(|(a, b)| (a - b).abs()).sum();
        rank = next;
        if delta < EPSILON {
            break;
        }
    }

    order
        .into_iter()
        .enumerate()
        .map(|(pos, idx)| (graph.node(idx).id.clone(), rank[pos]))
        .collect()
}

/// Tarjan's algorithm; components of size >= 2 are cyclic-dependency
/// smells (`spec.md` §4.3).
pub fn strongly_connected_components(graph: &DependencyGraph) -> Vec<Vec<String>> {
    tarjan_scc(graph.inner())
        .into_iter()
        .map(|comp| comp.into_iter().map(|idx| graph.node(idx).id.clone()).collect())
        .collect()
}

#[derive(Debug, Clone)]
pub struct NodeCentrality {
    pub id: String,
    pub kind: NodeKind,
    pub in_degree: usize,
    pub out_degree: usize,
    pub pagerank: f64,
}

pub fn centrality(graph: &DependencyGraph) -> Vec<NodeCentrality> {
    let ranks = pagerank(graph);
    graph
        .nodes_sorted()
        .into_iter()
        .map(|idx| {
            let node = graph.node(idx);
            NodeCentrality {
                id: node.id.clone(),
                kind: node.kind,
                in_degree: graph.in_degree(idx),
                out_degree: graph.out_degree(idx),
                pagerank: *ranks.get(&node.id).unwrap_or(&0.0),
            }
        })
        .collect()
}

/// Martin instability: out / (in + out), in [0, 1]. 0 when the node has
/// no edges at all.
pub fn instability(in_degree: usize, out_degree: usize) -> f64 {
    let total = in_degree + out_degree;
    if total == 0 {
        0.0
    } else {
        out_degree as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::graph::DependencyNode;

    fn node(id: &str) -> DependencyNode {
        DependencyNode {
            id: id.to_string(),
            kind: NodeKind::File,
            display_name: id.to_string(),
            file: id.into(),
            line: 1,
        }
    }

    #[test]
    fn pagerank_sums_to_one() {
        let mut g = DependencyGraph::new();
        g.add_node(node("a"));
        g.add_node(node("b"));
        g.add_node(node("c"));
        g.add_edge("a", "b", EdgeKind::Import);
        g.add_edge("b", "c", EdgeKind::Import);
        g.add_edge("c", "a", EdgeKind::Import);
        let ranks = pagerank(&g);
        let total: f64 = ranks.values().sum();
        assert!((total - 1.0).abs() < 1e-4, "total={total}");
    }

    #[test]
    fn detects_cycle() {
        let mut g = DependencyGraph::new();
        g.add_node(node("f1"));
        g.add_node(node("f2"));
        g.add_node(node("f3"));
        g.add_edge("f1", "f2", EdgeKind::Import);
        g.add_edge("f2", "f3", EdgeKind::Import);
        g.add_edge("f3", "f1", EdgeKind::Import);
        let sccs = strongly_connected_components(&g);
        assert!(sccs.iter().any(|c| c.len() == 3));
    }
}

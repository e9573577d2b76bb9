//! Dependency graph model (`spec.md` §3, §4.3).
//!
//! Nodes are stored in a flat array and referenced by index, never by
//! owning pointer (`spec.md` §9, "Cyclic graphs"), so SCC detection,
//! PageRank, and concurrent read access stay trivial. `petgraph`'s
//! `DiGraph` backs the actual storage; this module is a thin, serializable
//! wrapper around it that keeps a stable-id -> index lookup.

use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Module,
    Function,
    Class,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Import,
    Call,
    Reference,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyNode {
    /// `<file>:<name>` for function scope, file path for file scope,
    /// derived module name for module scope.
    pub id: String,
    pub kind: NodeKind,
    pub display_name: String,
    pub file: PathBuf,
    pub line: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
}

/// Directed multigraph over `DependencyNode`s. Duplicate edges are allowed
/// and used as weights in coupling scoring.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<DependencyNode, EdgeKind>,
    index_of: FxHashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn inner(&self) -> &DiGraph<DependencyNode, EdgeKind> {
        &self.graph
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index_of.get(id).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &DependencyNode {
        &self.graph[idx]
    }

    /// Inserts a node if its id is new; returns its index either way.
    pub fn add_node(&mut self, node: DependencyNode) -> NodeIndex {
        if let Some(&idx) = self.index_of.get(&node.id) {
            return idx;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.index_of.insert(id, idx);
        idx
    }

    /// Adds an edge even if an identical one already exists (multigraph).
    /// Both endpoints must already exist in this graph instance.
    pub fn add_edge(&mut self, from: &str, to: &str, kind: EdgeKind) -> bool {
        let (Some(&f), Some(&t)) = (self.index_of.get(from), self.index_of.get(to)) else {
            return false;
        };
        self.graph.add_edge(f, t, kind);
        true
    }

    /// Stable, sorted-by-id node iteration, required for deterministic
    /// PageRank and duplicate-pair enumeration (`spec.md` §4.3, §8).
    pub fn nodes_sorted(&self) -> Vec<NodeIndex> {
        let mut idxs: Vec<NodeIndex> = self.graph.node_indices().collect();
        idxs.sort_by(|a, b| self.graph[*a].id.cmp(&self.graph[*b].id));
        idxs
    }

    pub fn in_degree(&self, idx: NodeIndex) -> usize {
        self.graph
            .edges_directed(idx, petgraph::Direction::Incoming)
            .count()
    }

    pub fn out_degree(&self, idx: NodeIndex) -> usize {
        self.graph
            .edges_directed(idx, petgraph::Direction::Outgoing)
            .count()
    }

    pub fn density(&self) -> f64 {
        let n = self.node_count() as f64;
        if n <= 1.0 {
            return 0.0;
        }
        self.edge_count() as f64 / (n * (n - 1.0))
    }
}

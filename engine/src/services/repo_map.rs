//! Repo map: a function-scope call graph ranked by PageRank, surfacing
//! the most central symbols in a codebase (`spec.md` §4.6, "Repo-map").

use crate::error::AnalysisErrors;
use crate::models::graph::{DependencyEdge, DependencyNode, EdgeKind, NodeKind};
use crate::services::analyzers::context::AnalysisContext;
use crate::services::extractors::complexity::extract_functions;
use crate::services::extractors::imports_calls::extract_calls;
use crate::services::graph_builder::{build_graph, pagerank};
use crate::services::pipeline::map_files;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedSymbol {
    pub id: String,
    pub file: PathBuf,
    pub signature: String,
    pub pagerank: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoMapResult {
    pub symbols: Vec<RankedSymbol>,
}

/// `name(p1: _, p2: _, ...)` — a language-neutral stand-in for the real
/// signature, since cross-language type rendering is out of scope.
fn render_signature(name: &str, param_count: u32) -> String {
    let params = (0..param_count).map(|i| format!("p{i}")).collect::<Vec<_>>().join(", ");
    format!("{name}({params})")
}

pub fn build(ctx: &AnalysisContext, files: &[PathBuf], top_n: usize) -> (RepoMapResult, AnalysisErrors) {
    #[derive(Default)]
    struct PerFile {
        path: PathBuf,
        functions: Vec<(String, u32, u32)>, // scope_id, line, param_count
        calls: Vec<(String, String)>,
    }

    let (per_file, errors) = map_files(
        files,
        ctx.source,
        0,
        &ctx.cancel,
        ctx.progress,
        |path, language, bytes| {
            let parsed = ctx.parsers.parse(language, bytes)?;
            let functions = extract_functions(&parsed, path)
                .into_iter()
                .map(|f| (f.scope_id(), f.line_start, f.param_count))
                .collect();
            let calls = extract_calls(&parsed, path)
                .into_iter()
                .map(|c| (c.caller_scope, c.callee_name))
                .collect();
            Ok(PerFile {
                path: path.to_path_buf(),
                functions,
                calls,
            })
        },
    );

    let mut nodes = Vec::new();
    let mut signatures = std::collections::HashMap::new();
    for pf in &per_file {
        for (scope_id, line, param_count) in &pf.functions {
            let name = scope_id.rsplit(':').next().unwrap_or(scope_id);
            signatures.insert(scope_id.clone(), render_signature(name, *param_count));
            nodes.push(DependencyNode {
                id: scope_id.clone(),
                kind: NodeKind::Function,
                display_name: name.to_string(),
                file: pf.path.clone(),
                line: *line,
            });
        }
    }

    let node_ids: std::collections::HashSet<&String> = nodes.iter().map(|n| &n.id).collect();
    let mut edges = Vec::new();
    for pf in &per_file {
        for (caller, callee) in &pf.calls {
            if let Some(target) = node_ids.iter().find(|id| id.ends_with(&format!(":{callee}"))) {
                edges.push(DependencyEdge {
                    from: caller.clone(),
                    to: (*target).clone(),
                    kind: EdgeKind::Call,
                });
            }
        }
    }

    let graph = build_graph(nodes, edges);
    let ranks = pagerank(&graph);

    let mut symbols: Vec<RankedSymbol> = graph
        .nodes_sorted()
        .into_iter()
        .map(|idx| {
            let node = graph.node(idx);
            RankedSymbol {
                id: node.id.clone(),
                file: node.file.clone(),
                signature: signatures.get(&node.id).cloned().unwrap_or_default(),
                pagerank: *ranks.get(&node.id).unwrap_or(&0.0),
            }
        })
        .collect();

    symbols.sort_by(|a, b| b.pagerank.partial_cmp(&a.pagerank).unwrap_or(std::cmp::Ordering::Equal));
    symbols.truncate(top_n);

    (RepoMapResult { symbols }, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_signature_uses_placeholder_params() {
        assert_eq!(render_signature("parse", 0), "parse()");
        assert_eq!(render_signature("merge", 2), "merge(p0, p1)");
    }
}

//! Architectural smells analyzer: cyclic, hub, god-component, and
//! unstable-dependency smells over the file-scope graph (`spec.md` §4.4,
//! "Architectural smells").

use crate::error::AnalysisErrors;
use crate::models::graph::{DependencyEdge, DependencyNode, EdgeKind, NodeKind};
use crate::models::options::SmellsOptions;
use crate::services::analyzers::context::{AnalysisContext, Analyzer};
use crate::services::extractors::imports_calls::extract_imports;
use crate::services::graph_builder::{build_graph, instability, strongly_connected_components};
use crate::services::pipeline::map_files;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Smell {
    Cyclic {
        components: Vec<String>,
        severity: Severity,
    },
    Hub {
        node: String,
        degree: usize,
        severity: Severity,
    },
    GodComponent {
        node: String,
        fan_in: usize,
        fan_out: usize,
        severity: Severity,
    },
    UnstableDependency {
        from: String,
        to: String,
        instability_gap: f64,
        severity: Severity,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmellsResult {
    pub smells: Vec<Smell>,
}

pub struct SmellsAnalyzer;

fn cyclic_severity(size: usize) -> Severity {
    if size >= 6 {
        Severity::Critical
    } else {
        Severity::High
    }
}

fn hub_severity(degree: usize, threshold: u32) -> Severity {
    let ratio = degree as f64 / threshold.max(1) as f64;
    if ratio >= 2.0 {
        Severity::Critical
    } else if ratio >= 1.5 {
        Severity::High
    } else {
        Severity::Medium
    }
}

fn god_severity(fan_in: usize, fan_out: usize, in_threshold: u32, out_threshold: u32) -> Severity {
    let ratio = (fan_in as f64 / in_threshold.max(1) as f64).max(fan_out as f64 / out_threshold.max(1) as f64);
    if ratio >= 2.0 {
        Severity::Critical
    } else if ratio >= 1.5 {
        Severity::High
    } else {
        Severity::Medium
    }
}

fn instability_severity(gap: f64, threshold: f64) -> Severity {
    let ratio = gap / threshold.max(0.01);
    if ratio >= 2.0 {
        Severity::Critical
    } else if ratio >= 1.5 {
        Severity::High
    } else {
        Severity::Medium
    }
}

impl Analyzer for SmellsAnalyzer {
    type Options = SmellsOptions;
    type Result = SmellsResult;

    fn name(&self) -> &'static str {
        "smells"
    }

    fn analyze(
        &self,
        ctx: &AnalysisContext,
        files: &[PathBuf],
        options: &SmellsOptions,
    ) -> (SmellsResult, AnalysisErrors) {
        let (per_file, errors) = map_files(
            files,
            ctx.source,
            0,
            &ctx.cancel,
            ctx.progress,
            |path, language, bytes| {
                let parsed = ctx.parsers.parse(language, bytes)?;
                Ok((path.to_path_buf(), extract_imports(&parsed)))
            },
        );

        let mut nodes = Vec::new();
        for (path, _) in &per_file {
            nodes.push(DependencyNode {
                id: path.display().to_string(),
                kind: NodeKind::File,
                display_name: path.display().to_string(),
                file: path.clone(),
                line: 1,
            });
        }
        let mut edges = Vec::new();
        for (path, imports) in &per_file {
            for import in imports {
                if let Some((target, _)) = per_file.iter().find(|(other, _)| {
                    other != path
                        && other
                            .file_stem()
                            .and_then(|s| s.to_str())
                            .is_some_and(|stem| import.contains(stem))
                }) {
                    edges.push(DependencyEdge {
                        from: path.display().to_string(),
                        to: target.display().to_string(),
                        kind: EdgeKind::Import,
                    });
                }
            }
        }

        let graph = build_graph(nodes, edges);
        let mut smells = Vec::new();

        for component in strongly_connected_components(&graph) {
            if component.len() >= 2 {
                smells.push(Smell::Cyclic {
                    severity: cyclic_severity(component.len()),
                    components: component,
                });
            }
        }

        for idx in graph.nodes_sorted() {
            let node = graph.node(idx);
            let in_deg = graph.in_degree(idx);
            let out_deg = graph.out_degree(idx);
            let degree = in_deg + out_deg;

            if degree >= options.hub_threshold as usize {
                smells.push(Smell::Hub {
                    node: node.id.clone(),
                    degree,
                    severity: hub_severity(degree, options.hub_threshold),
                });
            }

            if in_deg >= options.god_fan_in as usize && out_deg >= options.god_fan_out as usize {
                smells.push(Smell::GodComponent {
                    node: node.id.clone(),
                    fan_in: in_deg,
                    fan_out: out_deg,
                    severity: god_severity(in_deg, out_deg, options.god_fan_in, options.god_fan_out),
                });
            }
        }

        for idx in graph.nodes_sorted() {
            let from_node = graph.node(idx);
            let from_instability = instability(graph.in_degree(idx), graph.out_degree(idx));
            for edge in graph.inner().edges(idx) {
                let target_idx = edge.target();
                let to_instability =
                    instability(graph.in_degree(target_idx), graph.out_degree(target_idx));
                let gap = to_instability - from_instability;
                if gap >= options.instability_difference {
                    smells.push(Smell::UnstableDependency {
                        from: from_node.id.clone(),
                        to: graph.node(target_idx).id.clone(),
                        instability_gap: gap,
                        severity: instability_severity(gap, options.instability_difference),
                    });
                }
            }
        }

        (SmellsResult { smells }, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cyclic_severity_scales_with_component_size() {
        assert_eq!(cyclic_severity(2), Severity::High);
        assert_eq!(cyclic_severity(3), Severity::High);
        assert_eq!(cyclic_severity(4), Severity::High);
        assert_eq!(cyclic_severity(6), Severity::Critical);
    }

    #[test]
    fn hub_severity_scales_with_threshold_ratio() {
        assert_eq!(hub_severity(10, 10), Severity::Medium);
        assert_eq!(hub_severity(16, 10), Severity::High);
        assert_eq!(hub_severity(20, 10), Severity::Critical);
    }

    #[test]
    fn god_severity_uses_the_worse_of_fan_in_and_fan_out() {
        assert_eq!(god_severity(20, 1, 10, 10), Severity::Critical);
        assert_eq!(god_severity(1, 20, 10, 10), Severity::Critical);
    }

    #[test]
    fn severity_is_ordered_low_to_critical() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::High < Severity::Critical);
    }
}

//! Focused context: resolves a user-given target (path, glob, basename,
//! or symbol name) to a file set and summarizes it (`spec.md` §4.6,
//! "Focused-context / call-graph resolution").

use crate::error::AnalysisErrors;
use crate::services::analyzers::context::{AnalysisContext, Analyzer};
use crate::services::analyzers::complexity::ComplexityAnalyzer;
use crate::services::analyzers::satd::SatdAnalyzer;
use crate::services::extractors::imports_calls::extract_calls;
use crate::models::function::FunctionRecord;
use crate::models::options::{ComplexityOptions, SatdOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusedFunctionSummary {
    pub function: FunctionRecord,
    pub callers: Vec<String>,
    pub callees: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FocusedContextResult {
    pub resolved_files: Vec<PathBuf>,
    pub satd_count: usize,
    pub mean_cyclomatic: f64,
    pub functions: Vec<FocusedFunctionSummary>,
}

/// Resolution order: exact path, then glob, then basename match, then
/// bare symbol name matched against any extracted function in `universe`.
pub fn resolve(target: &str, universe: &[PathBuf]) -> Vec<PathBuf> {
    let as_path = Path::new(target);
    if universe.iter().any(|p| p == as_path) {
        return vec![as_path.to_path_buf()];
    }

    if target.contains('*') || target.contains('?') {
        if let Ok(pattern) = glob::Pattern::new(target) {
            let matched: Vec<PathBuf> = universe
                .iter()
                .filter(|p| pattern.matches_path(p))
                .cloned()
                .collect();
            if !matched.is_empty() {
                return matched;
            }
        }
    }

    let basename_matches: Vec<PathBuf> = universe
        .iter()
        .filter(|p| p.file_name().and_then(|n| n.to_str()) == Some(target))
        .cloned()
        .collect();
    if !basename_matches.is_empty() {
        return basename_matches;
    }

    // Symbol-name fallback: every file is a candidate; the caller narrows
    // down to the function(s) actually named `target` after parsing.
    universe.to_vec()
}

pub fn summarize(
    ctx: &AnalysisContext,
    resolved_files: Vec<PathBuf>,
    symbol_name: Option<&str>,
) -> (FocusedContextResult, AnalysisErrors) {
    let mut errors = AnalysisErrors::default();

    let (complexity, complexity_errors) =
        ComplexityAnalyzer.analyze(ctx, &resolved_files, &ComplexityOptions::default());
    errors.merge(complexity_errors);

    let (satd, satd_errors) = SatdAnalyzer.analyze(ctx, &resolved_files, &SatdOptions::default());
    errors.merge(satd_errors);

    let mut all_functions: Vec<FunctionRecord> = complexity
        .files
        .iter()
        .flat_map(|fc| fc.functions.clone())
        .collect();
    if let Some(name) = symbol_name {
        all_functions.retain(|f| f.name == name);
    }

    let mean_cyclomatic = if all_functions.is_empty() {
        0.0
    } else {
        all_functions.iter().map(|f| f.cyclomatic as f64).sum::<f64>() / all_functions.len() as f64
    };

    let mut call_edges: Vec<(String, String)> = Vec::new();
    let (per_file_calls, call_errors) = crate::services::pipeline::map_files(
        &resolved_files,
        ctx.source,
        0,
        &ctx.cancel,
        ctx.progress,
        |path, language, bytes| {
            let parsed = ctx.parsers.parse(language, bytes)?;
            Ok(extract_calls(&parsed, path)
                .into_iter()
                .map(|c| (c.caller_scope, c.callee_name))
                .collect::<Vec<_>>())
        },
    );
    errors.merge(call_errors);
    for edges in per_file_calls {
        call_edges.extend(edges);
    }

    let functions = all_functions
        .into_iter()
        .map(|f| {
            let scope_id = f.scope_id();
            let callers: Vec<String> = call_edges
                .iter()
                .filter(|(_, callee)| callee == &f.name)
                .map(|(caller, _)| caller.clone())
                .collect();
            let callees: Vec<String> = call_edges
                .iter()
                .filter(|(caller, _)| caller == &scope_id)
                .map(|(_, callee)| callee.clone())
                .collect();
            FocusedFunctionSummary {
                function: f,
                callers,
                callees,
            }
        })
        .collect();

    (
        FocusedContextResult {
            resolved_files,
            satd_count: satd.items.len(),
            mean_cyclomatic,
            functions,
        },
        errors,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn universe() -> Vec<PathBuf> {
        vec![
            PathBuf::from("src/services/churn.rs"),
            PathBuf::from("src/services/satd.rs"),
            PathBuf::from("src/models/file.rs"),
        ]
    }

    #[test]
    fn resolve_matches_an_exact_path() {
        let u = universe();
        assert_eq!(resolve("src/services/churn.rs", &u), vec![PathBuf::from("src/services/churn.rs")]);
    }

    #[test]
    fn resolve_matches_a_glob_pattern() {
        let u = universe();
        let mut matched = resolve("src/services/*.rs", &u);
        matched.sort();
        assert_eq!(matched, vec![PathBuf::from("src/services/churn.rs"), PathBuf::from("src/services/satd.rs")]);
    }

    #[test]
    fn resolve_matches_a_basename() {
        let u = universe();
        assert_eq!(resolve("file.rs", &u), vec![PathBuf::from("src/models/file.rs")]);
    }

    #[test]
    fn resolve_falls_back_to_the_whole_universe_for_symbol_names() {
        let u = universe();
        assert_eq!(resolve("ChurnAnalyzer", &u), u);
    }
}

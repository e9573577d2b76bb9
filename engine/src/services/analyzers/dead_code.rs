//! Dead-code analyzer (`spec.md` §4.4, "Dead code").

use crate::error::AnalysisErrors;
use crate::models::file::Language;
use crate::models::options::DeadCodeOptions;
use crate::services::analyzers::context::{AnalysisContext, Analyzer};
use crate::services::extractors::complexity::extract_functions;
use crate::services::extractors::imports_calls::extract_calls;
use crate::services::pipeline::map_files;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

const NEVER_DEAD: &[&str] = &["main", "init", "__init__", "setUp", "tearDown", "setup", "teardown"];

/// `spec.md` §4.4(c): Rust export-ness is `pub`, not a naming convention
/// (unlike Go's capitalization or Python's underscore prefix, Rust allows
/// private names that don't start with `_`, so the naming heuristic used
/// elsewhere would never flag a private Rust function as dead).
fn is_exported(name: &str, language: Language, is_public: bool) -> bool {
    match language {
        Language::Go => name.chars().next().is_some_and(|c| c.is_uppercase()),
        Language::Rust => is_public,
        Language::Python | Language::Ruby => !name.starts_with('_'),
        _ => !name.starts_with('_'),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadFunction {
    pub file: PathBuf,
    pub name: String,
    pub line: u32,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeadCodeResult {
    pub dead_functions: Vec<DeadFunction>,
}

pub struct DeadCodeAnalyzer;

#[derive(Default)]
struct PerFile {
    path: PathBuf,
    language: Language,
    functions: Vec<(String, u32, bool, bool)>,
    callees: Vec<String>,
}

impl Analyzer for DeadCodeAnalyzer {
    type Options = DeadCodeOptions;
    type Result = DeadCodeResult;

    fn name(&self) -> &'static str {
        "dead_code"
    }

    fn analyze(
        &self,
        ctx: &AnalysisContext,
        files: &[PathBuf],
        options: &DeadCodeOptions,
    ) -> (DeadCodeResult, AnalysisErrors) {
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
                    .map(|f| (f.name, f.line_start, f.is_test, f.is_public))
                    .collect();
                let callees = extract_calls(&parsed, path)
                    .into_iter()
                    .map(|c| c.callee_name)
                    .collect();
                Ok(PerFile {
                    path: path.to_path_buf(),
                    language,
                    functions,
                    callees,
                })
            },
        );

        let mut called: HashSet<String> = HashSet::new();
        for pf in &per_file {
            for name in &pf.callees {
                called.insert(name.clone());
            }
        }

        // Count how many files declare each name: a name matched in only
        // one file is resolved with higher confidence than a common name
        // that may be shadowed elsewhere (`spec.md` §4.2: "heuristic: first
        // match on exact symbol name within the same file, else any file").
        let mut declared_in: HashMap<&str, u32> = HashMap::new();
        for pf in &per_file {
            for (name, _, _, _) in &pf.functions {
                *declared_in.entry(name.as_str()).or_insert(0) += 1;
            }
        }

        let mut dead_functions = Vec::new();
        for pf in &per_file {
            for (name, line, is_test, is_public) in &pf.functions {
                if *is_test || NEVER_DEAD.contains(&name.as_str()) {
                    continue;
                }
                if is_exported(name, pf.language, *is_public) {
                    continue;
                }
                if called.contains(name) {
                    continue;
                }
                let ambiguity_penalty: f64 = match declared_in.get(name.as_str()).copied().unwrap_or(1) {
                    1 => 0.0,
                    2 => 0.1,
                    _ => 0.2,
                };
                let confidence = (0.95 - ambiguity_penalty).max(0.0);
                if confidence >= options.confidence {
                    dead_functions.push(DeadFunction {
                        file: pf.path.clone(),
                        name: name.clone(),
                        line: *line,
                        confidence,
                    });
                }
            }
        }

        (DeadCodeResult { dead_functions }, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exported_names_follow_go_capitalization() {
        assert!(is_exported("DoThing", Language::Go, false));
        assert!(!is_exported("doThing", Language::Go, false));
    }

    #[test]
    fn rust_export_is_keyed_on_pub_not_naming() {
        assert!(is_exported("do_thing", Language::Rust, true));
        assert!(!is_exported("do_thing", Language::Rust, false));
        assert!(!is_exported("_do_thing", Language::Rust, false));
    }

    #[test]
    fn exported_names_follow_underscore_convention_elsewhere() {
        assert!(is_exported("do_thing", Language::Python, false));
        assert!(!is_exported("_do_thing", Language::Python, false));
    }
}

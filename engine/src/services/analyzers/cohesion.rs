//! Cohesion analyzer: Chidamber-Kemerer OO metrics (`spec.md` §4.3,
//! "WMC / CBO / RFC / LCOM / DIT / NOC / NOM").

use crate::error::AnalysisErrors;
use crate::models::class::ClassRecord;
use crate::models::options::CohesionOptions;
use crate::services::analyzers::context::{AnalysisContext, Analyzer};
use crate::services::extractors::complexity::{extract_classes, extract_functions};
use crate::services::extractors::imports_calls::extract_calls;
use crate::services::pipeline::map_files;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassCohesion {
    pub file: PathBuf,
    pub name: String,
    pub wmc: u32,
    pub cbo: u32,
    pub rfc: u32,
    pub lcom: u32,
    pub dit: u32,
    pub noc: u32,
    pub nom: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CohesionResult {
    pub classes: Vec<ClassCohesion>,
}

pub struct CohesionAnalyzer;

struct PerFile {
    path: PathBuf,
    classes: Vec<ClassRecord>,
    function_complexity: HashMap<String, u32>,
    call_counts: HashMap<String, u32>,
}

impl Analyzer for CohesionAnalyzer {
    type Options = CohesionOptions;
    type Result = CohesionResult;

    fn name(&self) -> &'static str {
        "cohesion"
    }

    fn analyze(
        &self,
        ctx: &AnalysisContext,
        files: &[PathBuf],
        options: &CohesionOptions,
    ) -> (CohesionResult, AnalysisErrors) {
        let (per_file, errors) = map_files(
            files,
            ctx.source,
            0,
            &ctx.cancel,
            ctx.progress,
            |path, language, bytes| {
                if !options.include_tests && crate::models::file::Language::is_test_path(path) {
                    return Ok(None);
                }
                let parsed = ctx.parsers.parse(language, bytes)?;
                let classes = extract_classes(&parsed, path);
                let function_complexity: HashMap<String, u32> = extract_functions(&parsed, path)
                    .into_iter()
                    .map(|f| (f.name, f.cyclomatic))
                    .collect();
                let mut call_counts: HashMap<String, u32> = HashMap::new();
                for call in extract_calls(&parsed, path) {
                    // caller_scope is `<file>:<fn>`; keep just the method name suffix.
                    if let Some(method) = call.caller_scope.rsplit(':').next() {
                        *call_counts.entry(method.to_string()).or_insert(0) += 1;
                    }
                }
                Ok(Some(PerFile {
                    path: path.to_path_buf(),
                    classes,
                    function_complexity,
                    call_counts,
                }))
            },
        );
        let per_file: Vec<PerFile> = per_file.into_iter().flatten().collect();

        // NOC needs every class's base list visible at once, so it is
        // resolved across the whole run rather than per file.
        let mut children_of: HashMap<String, u32> = HashMap::new();
        for pf in &per_file {
            for class in &pf.classes {
                for base in &class.bases {
                    *children_of.entry(base.clone()).or_insert(0) += 1;
                }
            }
        }
        let bases_of: HashMap<String, Vec<String>> = per_file
            .iter()
            .flat_map(|pf| pf.classes.iter().map(|c| (c.name.clone(), c.bases.clone())))
            .collect();

        let mut classes = Vec::new();
        for pf in &per_file {
            for class in &pf.classes {
                let wmc: u32 = class
                    .methods
                    .iter()
                    .map(|m| pf.function_complexity.get(m).copied().unwrap_or(1))
                    .sum();
                let cbo = class.referenced_types.len() as u32;
                let rfc = class.methods.len() as u32
                    + class
                        .methods
                        .iter()
                        .map(|m| pf.call_counts.get(m).copied().unwrap_or(0))
                        .sum::<u32>();
                let lcom = lcom1(class);
                let dit = depth_of_inheritance(&class.name, &bases_of, 0);
                let noc = children_of.get(&class.name).copied().unwrap_or(0);
                let nom = class.methods.len() as u32;

                classes.push(ClassCohesion {
                    file: pf.path.clone(),
                    name: class.name.clone(),
                    wmc,
                    cbo,
                    rfc,
                    lcom,
                    dit,
                    noc,
                    nom,
                });
            }
        }

        (CohesionResult { classes }, errors)
    }
}

/// LCOM1: number of method pairs sharing no field access minus the number
/// sharing at least one, floored at 0 (`spec.md` §4.3, "LCOM").
fn lcom1(class: &ClassRecord) -> u32 {
    let methods: Vec<&String> = class.method_field_accesses.keys().collect();
    let mut disjoint = 0u32;
    let mut shared = 0u32;
    for i in 0..methods.len() {
        for j in (i + 1)..methods.len() {
            let a = &class.method_field_accesses[methods[i]];
            let b = &class.method_field_accesses[methods[j]];
            if a.is_disjoint(b) {
                disjoint += 1;
            } else {
                shared += 1;
            }
        }
    }
    disjoint.saturating_sub(shared)
}

fn depth_of_inheritance(
    name: &str,
    bases_of: &HashMap<String, Vec<String>>,
    depth: u32,
) -> u32 {
    if depth > 32 {
        return depth; // cycle guard; inheritance chains this deep don't occur legitimately
    }
    let Some(bases) = bases_of.get(name) else {
        return depth;
    };
    bases
        .iter()
        .map(|b| depth_of_inheritance(b, bases_of, depth + 1))
        .max()
        .unwrap_or(depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};

    fn class(name: &str, methods: &[&str], bases: &[&str]) -> ClassRecord {
        ClassRecord {
            file: PathBuf::from("x.rs"),
            name: name.to_string(),
            line_start: 1,
            line_end: 1,
            methods: methods.iter().map(|m| m.to_string()).collect(),
            fields: BTreeSet::new(),
            bases: bases.iter().map(|b| b.to_string()).collect(),
            referenced_types: BTreeSet::new(),
            method_field_accesses: BTreeMap::new(),
        }
    }

    #[test]
    fn lcom1_all_disjoint_methods_is_positive() {
        let mut c = class("Widget", &["a", "b"], &[]);
        c.method_field_accesses.insert("a".into(), BTreeSet::from(["x".to_string()]));
        c.method_field_accesses.insert("b".into(), BTreeSet::from(["y".to_string()]));
        assert_eq!(lcom1(&c), 1);
    }

    #[test]
    fn lcom1_all_shared_methods_is_zero() {
        let mut c = class("Widget", &["a", "b"], &[]);
        c.method_field_accesses.insert("a".into(), BTreeSet::from(["x".to_string()]));
        c.method_field_accesses.insert("b".into(), BTreeSet::from(["x".to_string()]));
        assert_eq!(lcom1(&c), 0);
    }

    #[test]
    fn depth_of_inheritance_follows_longest_chain() {
        let mut bases_of = HashMap::new();
        bases_of.insert("C".to_string(), vec!["B".to_string()]);
        bases_of.insert("B".to_string(), vec!["A".to_string()]);
        assert_eq!(depth_of_inheritance("C", &bases_of, 0), 2);
    }

    #[test]
    fn depth_of_inheritance_root_class_is_zero() {
        let bases_of = HashMap::new();
        assert_eq!(depth_of_inheritance("A", &bases_of, 0), 0);
    }

    #[test]
    fn depth_of_inheritance_guards_against_cycles() {
        let mut bases_of = HashMap::new();
        bases_of.insert("A".to_string(), vec!["B".to_string()]);
        bases_of.insert("B".to_string(), vec!["A".to_string()]);
        assert!(depth_of_inheritance("A", &bases_of, 0) > 32);
    }
}

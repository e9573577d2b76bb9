//! Complexity analyzer (`spec.md` §4.4, "Complexity").

use crate::error::AnalysisErrors;
use crate::models::function::FunctionRecord;
use crate::models::options::ComplexityOptions;
use crate::services::analyzers::context::{AnalysisContext, Analyzer};
use crate::services::extractors::complexity::extract_functions;
use crate::services::pipeline::map_files;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileComplexity {
    pub path: PathBuf,
    pub functions: Vec<FunctionRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplexitySummary {
    pub total_files: usize,
    pub total_functions: usize,
    pub mean_cyclomatic: f64,
    pub mean_cognitive: f64,
    pub median_cyclomatic: f64,
    pub median_cognitive: f64,
    pub p90_cyclomatic: u32,
    pub p90_cognitive: u32,
    pub max_cyclomatic: u32,
    pub max_cognitive: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    CyclomaticThreshold,
    CognitiveThreshold,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexityWarning {
    pub file: PathBuf,
    pub function: String,
    pub kind: ViolationKind,
    pub value: u32,
    pub threshold: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplexityResult {
    pub files: Vec<FileComplexity>,
    pub summary: ComplexitySummary,
    pub warnings: Vec<ComplexityWarning>,
}

fn percentile(sorted: &[u32], pct: f64) -> u32 {
    if sorted.is_empty() {
        return 0;
    }
    let idx = ((sorted.len() as f64 - 1.0) * pct).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn median(sorted: &[u32]) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2] as f64
    } else {
        (sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.0
    }
}

pub struct ComplexityAnalyzer;

impl Analyzer for ComplexityAnalyzer {
    type Options = ComplexityOptions;
    type Result = ComplexityResult;

    fn name(&self) -> &'static str {
        "complexity"
    }

    fn analyze(
        &self,
        ctx: &AnalysisContext,
        files: &[PathBuf],
        options: &ComplexityOptions,
    ) -> (ComplexityResult, AnalysisErrors) {
        let (per_file, errors) = map_files(
            files,
            ctx.source,
            options.max_file_size,
            &ctx.cancel,
            ctx.progress,
            |path, language, bytes| {
                let parsed = ctx.parsers.parse(language, bytes)?;
                let mut functions = extract_functions(&parsed, path);
                if options.functions_only {
                    functions.retain(|f| !f.is_test);
                }
                Ok(FileComplexity {
                    path: path.to_path_buf(),
                    functions,
                })
            },
        );

        let mut all_cyclomatic = Vec::new();
        let mut all_cognitive = Vec::new();
        let mut warnings = Vec::new();
        let mut total_functions = 0usize;

        for fc in &per_file {
            for func in &fc.functions {
                total_functions += 1;
                all_cyclomatic.push(func.cyclomatic);
                all_cognitive.push(func.cognitive);
                if func.cyclomatic > options.cyclomatic_threshold {
                    warnings.push(ComplexityWarning {
                        file: fc.path.clone(),
                        function: func.name.clone(),
                        kind: ViolationKind::CyclomaticThreshold,
                        value: func.cyclomatic,
                        threshold: options.cyclomatic_threshold,
                    });
                }
                if func.cognitive > options.cognitive_threshold {
                    warnings.push(ComplexityWarning {
                        file: fc.path.clone(),
                        function: func.name.clone(),
                        kind: ViolationKind::CognitiveThreshold,
                        value: func.cognitive,
                        threshold: options.cognitive_threshold,
                    });
                }
            }
        }

        all_cyclomatic.sort_unstable();
        all_cognitive.sort_unstable();

        let summary = ComplexitySummary {
            total_files: per_file.len(),
            total_functions,
            mean_cyclomatic: mean(&all_cyclomatic),
            mean_cognitive: mean(&all_cognitive),
            median_cyclomatic: median(&all_cyclomatic),
            median_cognitive: median(&all_cognitive),
            p90_cyclomatic: percentile(&all_cyclomatic, 0.9),
            p90_cognitive: percentile(&all_cognitive, 0.9),
            max_cyclomatic: all_cyclomatic.last().copied().unwrap_or(0),
            max_cognitive: all_cognitive.last().copied().unwrap_or(0),
        };

        (
            ComplexityResult {
                files: per_file,
                summary,
                warnings,
            },
            errors,
        )
    }
}

fn mean(values: &[u32]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().map(|v| *v as f64).sum::<f64>() / values.len() as f64
    }
}

/// Per-file average cognitive complexity, normalized to [0, 1] by the
/// maximum such value in this run. Shared with hotspot and defect
/// analyzers (`spec.md` §4.4, "Hotspot"/"Defect prediction").
pub fn normalized_complexity_scores(result: &ComplexityResult) -> BTreeMap<PathBuf, f64> {
    let averages: BTreeMap<PathBuf, f64> = result
        .files
        .iter()
        .map(|fc| {
            let avg = if fc.functions.is_empty() {
                0.0
            } else {
                fc.functions.iter().map(|f| f.cognitive as f64).sum::<f64>()
                    / fc.functions.len() as f64
            };
            (fc.path.clone(), avg)
        })
        .collect();
    let max = averages.values().cloned().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return averages.into_keys().map(|p| (p, 0.0)).collect();
    }
    averages.into_iter().map(|(p, v)| (p, v / max)).collect()
}

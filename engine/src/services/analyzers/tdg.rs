//! TDG (Technical Debt Gradient) analyzer (`spec.md` §4.4, "TDG").

use crate::error::AnalysisErrors;
use crate::models::options::{ComplexityOptions, DuplicatesOptions, SatdOptions, TdgOptions};
use crate::services::analyzers::complexity::{normalized_complexity_scores, ComplexityAnalyzer};
use crate::services::analyzers::context::{AnalysisContext, Analyzer};
use crate::services::analyzers::duplicates::DuplicatesAnalyzer;
use crate::services::analyzers::satd::{normalized_satd_scores, SatdAnalyzer};
use crate::services::extractors::imports_calls::extract_imports;
use crate::services::pipeline::map_files;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    APlus,
    A,
    AMinus,
    BPlus,
    B,
    BMinus,
    CPlus,
    C,
    CMinus,
    D,
    F,
}

fn grade_for(score: f64) -> Grade {
    if score >= 97.0 {
        Grade::APlus
    } else if score >= 93.0 {
        Grade::A
    } else if score >= 90.0 {
        Grade::AMinus
    } else if score >= 87.0 {
        Grade::BPlus
    } else if score >= 83.0 {
        Grade::B
    } else if score >= 80.0 {
        Grade::BMinus
    } else if score >= 77.0 {
        Grade::CPlus
    } else if score >= 73.0 {
        Grade::C
    } else if score >= 70.0 {
        Grade::CMinus
    } else if score >= 60.0 {
        Grade::D
    } else {
        Grade::F
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTdg {
    pub path: PathBuf,
    pub score: f64,
    pub grade: Grade,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TdgResult {
    pub files: Vec<FileTdg>,
    pub mean_score: f64,
    pub grade_distribution: BTreeMap<String, usize>,
}

pub struct TdgAnalyzer;

const PENALTY_STRUCTURAL: f64 = 20.0;
const PENALTY_SEMANTIC: f64 = 15.0;
const PENALTY_COUPLING: f64 = 15.0;
const PENALTY_DUPLICATION: f64 = 20.0;
const PENALTY_SATD: f64 = 10.0;

impl Analyzer for TdgAnalyzer {
    type Options = TdgOptions;
    type Result = TdgResult;

    fn name(&self) -> &'static str {
        "tdg"
    }

    fn analyze(
        &self,
        ctx: &AnalysisContext,
        files: &[PathBuf],
        options: &TdgOptions,
    ) -> (TdgResult, AnalysisErrors) {
        let mut errors = AnalysisErrors::default();

        let mut complexity_options = ComplexityOptions::default();
        complexity_options.functions_only = !options.include_tests;
        let (complexity, complexity_errors) = ComplexityAnalyzer.analyze(ctx, files, &complexity_options);
        errors.merge(complexity_errors);
        let structural = normalized_complexity_scores(&complexity);

        // "Semantic complexity" is approximated by per-function nesting
        // depth, averaged per file and normalized — distinct from
        // cyclomatic/cognitive structural load.
        let mut nesting_avg: BTreeMap<PathBuf, f64> = BTreeMap::new();
        for fc in &complexity.files {
            let avg = if fc.functions.is_empty() {
                0.0
            } else {
                fc.functions.iter().map(|f| f.nesting_max as f64).sum::<f64>() / fc.functions.len() as f64
            };
            nesting_avg.insert(fc.path.clone(), avg);
        }
        let max_nesting = nesting_avg.values().cloned().fold(0.0_f64, f64::max);
        let semantic: BTreeMap<PathBuf, f64> = if max_nesting > 0.0 {
            nesting_avg.into_iter().map(|(p, v)| (p, v / max_nesting)).collect()
        } else {
            nesting_avg.into_iter().map(|(p, _)| (p, 0.0)).collect()
        };

        let (per_file_imports, import_errors) = map_files(
            files,
            ctx.source,
            0,
            &ctx.cancel,
            ctx.progress,
            |path, language, bytes| {
                let parsed = ctx.parsers.parse(language, bytes)?;
                Ok((path.to_path_buf(), extract_imports(&parsed).len()))
            },
        );
        errors.merge(import_errors);
        let max_imports = per_file_imports
            .iter()
            .map(|(_, n)| *n)
            .max()
            .unwrap_or(0)
            .max(1) as f64;
        let coupling: BTreeMap<PathBuf, f64> = per_file_imports
            .into_iter()
            .map(|(p, n)| (p, n as f64 / max_imports))
            .collect();

        let (duplicates, duplicates_errors) =
            DuplicatesAnalyzer.analyze(ctx, files, &DuplicatesOptions::default());
        errors.merge(duplicates_errors);
        let mut duplication_counts: BTreeMap<PathBuf, f64> =
            files.iter().map(|p| (p.clone(), 0.0)).collect();
        for group in &duplicates.groups {
            for unit in &group.units {
                *duplication_counts.entry(unit.file.clone()).or_insert(0.0) += 1.0;
            }
        }
        let max_dup = duplication_counts.values().cloned().fold(0.0_f64, f64::max);
        let duplication: BTreeMap<PathBuf, f64> = if max_dup > 0.0 {
            duplication_counts.into_iter().map(|(p, v)| (p, v / max_dup)).collect()
        } else {
            duplication_counts.into_iter().map(|(p, _)| (p, 0.0)).collect()
        };

        let (satd, satd_errors) = SatdAnalyzer.analyze(
            ctx,
            files,
            &SatdOptions {
                include_tests: options.include_tests,
                ..SatdOptions::default()
            },
        );
        errors.merge(satd_errors);
        let satd_density = normalized_satd_scores(&satd, files);

        let mut out = Vec::new();
        let mut sum = 0.0;
        for path in files {
            let score = 100.0
                - PENALTY_STRUCTURAL * structural.get(path).copied().unwrap_or(0.0)
                - PENALTY_SEMANTIC * semantic.get(path).copied().unwrap_or(0.0)
                - PENALTY_COUPLING * coupling.get(path).copied().unwrap_or(0.0)
                - PENALTY_DUPLICATION * duplication.get(path).copied().unwrap_or(0.0)
                - PENALTY_SATD * satd_density.get(path).copied().unwrap_or(0.0);
            let score = score.clamp(0.0, 100.0);
            sum += score;
            out.push(FileTdg {
                path: path.clone(),
                score,
                grade: grade_for(score),
            });
        }

        let mean_score = if out.is_empty() { 0.0 } else { sum / out.len() as f64 };
        let mut grade_distribution: BTreeMap<String, usize> = BTreeMap::new();
        for f in &out {
            *grade_distribution.entry(format!("{:?}", f.grade)).or_insert(0) += 1;
        }

        (
            TdgResult {
                files: out,
                mean_score,
                grade_distribution,
            },
            errors,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_boundaries_are_inclusive_on_the_lower_bound() {
        assert_eq!(grade_for(97.0), Grade::APlus);
        assert_eq!(grade_for(96.9), Grade::A);
        assert_eq!(grade_for(60.0), Grade::D);
        assert_eq!(grade_for(59.9), Grade::F);
    }

    #[test]
    fn grade_ordering_matches_score_ordering() {
        assert!(Grade::APlus < Grade::A);
        assert!(Grade::D < Grade::F);
    }

    #[test]
    fn perfect_score_is_a_plus() {
        assert_eq!(grade_for(100.0), Grade::APlus);
    }
}

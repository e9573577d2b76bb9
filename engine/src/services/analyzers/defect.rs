//! Defect-prediction analyzer: per-file risk probability from the
//! published PMAT weighted model (`spec.md` §4.4, "Defect prediction").

use crate::error::AnalysisErrors;
use crate::models::options::{
    ChurnOptions, ComplexityOptions, DeadCodeOptions, DefectOptions, DuplicatesOptions, SatdOptions,
};
use crate::services::analyzers::churn::{churn_scores, ChurnAnalyzer};
use crate::services::analyzers::complexity::{normalized_complexity_scores, ComplexityAnalyzer};
use crate::services::analyzers::context::{AnalysisContext, Analyzer};
use crate::services::analyzers::dead_code::DeadCodeAnalyzer;
use crate::services::analyzers::duplicates::DuplicatesAnalyzer;
use crate::services::analyzers::satd::{normalized_satd_scores, SatdAnalyzer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

const WEIGHT_CHURN: f64 = 0.35;
const WEIGHT_COMPLEXITY: f64 = 0.30;
const WEIGHT_DUPLICATION: f64 = 0.15;
const WEIGHT_SATD: f64 = 0.10;
const WEIGHT_DEAD_CODE: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

fn risk_level(probability: f64) -> RiskLevel {
    if probability >= 0.6 {
        RiskLevel::High
    } else if probability >= 0.3 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDefectRisk {
    pub path: PathBuf,
    pub probability: f64,
    pub risk: RiskLevel,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefectResult {
    pub files: Vec<FileDefectRisk>,
}

pub struct DefectAnalyzer;

/// Per-file duplication "badness": count of duplicate-group memberships
/// normalized by the run maximum.
fn duplication_scores(
    duplicates: &crate::services::analyzers::duplicates::DuplicatesResult,
    files: &[PathBuf],
) -> BTreeMap<PathBuf, f64> {
    let mut counts: BTreeMap<PathBuf, f64> = files.iter().map(|p| (p.clone(), 0.0)).collect();
    for group in &duplicates.groups {
        for unit in &group.units {
            *counts.entry(unit.file.clone()).or_insert(0.0) += 1.0;
        }
    }
    let max = counts.values().cloned().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return counts;
    }
    counts.into_iter().map(|(p, v)| (p, v / max)).collect()
}

fn dead_code_scores(
    dead_code: &crate::services::analyzers::dead_code::DeadCodeResult,
    files: &[PathBuf],
) -> BTreeMap<PathBuf, f64> {
    let mut counts: BTreeMap<PathBuf, f64> = files.iter().map(|p| (p.clone(), 0.0)).collect();
    for d in &dead_code.dead_functions {
        *counts.entry(d.file.clone()).or_insert(0.0) += 1.0;
    }
    let max = counts.values().cloned().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return counts;
    }
    counts.into_iter().map(|(p, v)| (p, v / max)).collect()
}

impl Analyzer for DefectAnalyzer {
    type Options = DefectOptions;
    type Result = DefectResult;

    fn name(&self) -> &'static str {
        "defect"
    }

    fn analyze(
        &self,
        ctx: &AnalysisContext,
        files: &[PathBuf],
        options: &DefectOptions,
    ) -> (DefectResult, AnalysisErrors) {
        let mut errors = AnalysisErrors::default();

        let (churn, churn_errors) = ChurnAnalyzer.analyze(ctx, files, &ChurnOptions::default());
        errors.merge(churn_errors);
        let churn_by_path: BTreeMap<PathBuf, u32> =
            churn.files.iter().map(|f| (f.path.clone(), f.commit_count)).collect();
        let churn_component = churn_scores(&churn_by_path);

        let (complexity, complexity_errors) =
            ComplexityAnalyzer.analyze(ctx, files, &ComplexityOptions::default());
        errors.merge(complexity_errors);
        let complexity_component = normalized_complexity_scores(&complexity);

        let (duplicates, duplicates_errors) =
            DuplicatesAnalyzer.analyze(ctx, files, &DuplicatesOptions::default());
        errors.merge(duplicates_errors);
        let duplication_component = duplication_scores(&duplicates, files);

        let (satd, satd_errors) = SatdAnalyzer.analyze(ctx, files, &SatdOptions::default());
        errors.merge(satd_errors);
        let satd_component = normalized_satd_scores(&satd, files);

        let (dead_code, dead_code_errors) =
            DeadCodeAnalyzer.analyze(ctx, files, &DeadCodeOptions::default());
        errors.merge(dead_code_errors);
        let dead_code_component = dead_code_scores(&dead_code, files);

        let mut out = Vec::new();
        for path in files {
            let probability = WEIGHT_CHURN * churn_component.get(path).copied().unwrap_or(0.0)
                + WEIGHT_COMPLEXITY * complexity_component.get(path).copied().unwrap_or(0.0)
                + WEIGHT_DUPLICATION * duplication_component.get(path).copied().unwrap_or(0.0)
                + WEIGHT_SATD * satd_component.get(path).copied().unwrap_or(0.0)
                + WEIGHT_DEAD_CODE * dead_code_component.get(path).copied().unwrap_or(0.0);
            let risk = risk_level(probability);
            if options.high_risk_only && risk != RiskLevel::High {
                continue;
            }
            out.push(FileDefectRisk {
                path: path.clone(),
                probability,
                risk,
            });
        }

        (DefectResult { files: out }, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_level_thresholds_match_the_published_model() {
        assert_eq!(risk_level(0.6), RiskLevel::High);
        assert_eq!(risk_level(0.59), RiskLevel::Medium);
        assert_eq!(risk_level(0.3), RiskLevel::Medium);
        assert_eq!(risk_level(0.29), RiskLevel::Low);
    }

    #[test]
    fn dead_code_scores_normalize_by_run_maximum() {
        use crate::services::analyzers::dead_code::{DeadCodeResult, DeadFunction};
        let files = vec![PathBuf::from("a.rs"), PathBuf::from("b.rs")];
        let result = DeadCodeResult {
            dead_functions: vec![
                DeadFunction { file: files[0].clone(), name: "f".into(), line: 1, confidence: 0.9 },
                DeadFunction { file: files[0].clone(), name: "g".into(), line: 2, confidence: 0.9 },
                DeadFunction { file: files[1].clone(), name: "h".into(), line: 1, confidence: 0.9 },
            ],
        };
        let scores = dead_code_scores(&result, &files);
        assert_eq!(scores[&files[0]], 1.0);
        assert_eq!(scores[&files[1]], 0.5);
    }

    #[test]
    fn dead_code_scores_are_zero_with_no_findings() {
        use crate::services::analyzers::dead_code::DeadCodeResult;
        let files = vec![PathBuf::from("a.rs")];
        let scores = dead_code_scores(&DeadCodeResult::default(), &files);
        assert_eq!(scores[&files[0]], 0.0);
    }
}

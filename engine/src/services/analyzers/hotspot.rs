//! Hotspot analyzer: files that are both heavily changed and complex
//! (`spec.md` §4.4, "Hotspot").

use crate::error::AnalysisErrors;
use crate::models::options::{ChurnOptions, ComplexityOptions, HotspotOptions};
use crate::services::analyzers::churn::{churn_scores, ChurnAnalyzer};
use crate::services::analyzers::complexity::{normalized_complexity_scores, ComplexityAnalyzer};
use crate::services::analyzers::context::{AnalysisContext, Analyzer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileHotspot {
    pub path: PathBuf,
    pub churn_score: f64,
    pub complexity_score: f64,
    pub hotspot_score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HotspotResult {
    pub files: Vec<FileHotspot>,
    pub unavailable_reason: Option<String>,
}

pub struct HotspotAnalyzer;

impl Analyzer for HotspotAnalyzer {
    type Options = HotspotOptions;
    type Result = HotspotResult;

    fn name(&self) -> &'static str {
        "hotspot"
    }

    fn analyze(
        &self,
        ctx: &AnalysisContext,
        files: &[PathBuf],
        options: &HotspotOptions,
    ) -> (HotspotResult, AnalysisErrors) {
        let (churn, mut errors) = ChurnAnalyzer.analyze(
            ctx,
            files,
            &ChurnOptions { days: options.days },
        );
        if let Some(reason) = churn.unavailable_reason {
            return (
                HotspotResult {
                    files: Vec::new(),
                    unavailable_reason: Some(reason),
                },
                errors,
            );
        }

        let (complexity, complexity_errors) =
            ComplexityAnalyzer.analyze(ctx, files, &ComplexityOptions::default());
        errors.merge(complexity_errors);

        let complexity_scores = normalized_complexity_scores(&complexity);
        let counts: BTreeMap<PathBuf, u32> =
            churn.files.iter().map(|f| (f.path.clone(), f.commit_count)).collect();
        let churn_scores_by_path = churn_scores(&counts);

        let mut out = Vec::new();
        for path in files {
            let c = *churn_scores_by_path.get(path).unwrap_or(&0.0);
            let k = *complexity_scores.get(path).unwrap_or(&0.0);
            out.push(FileHotspot {
                path: path.clone(),
                churn_score: c,
                complexity_score: k,
                hotspot_score: hotspot_score(c, k),
            });
        }
        out.sort_by(|a, b| b.hotspot_score.partial_cmp(&a.hotspot_score).unwrap_or(std::cmp::Ordering::Equal));

        (
            HotspotResult {
                files: out,
                unavailable_reason: None,
            },
            errors,
        )
    }
}

/// `sqrt(churn * complexity)`: a file that is hot on only one axis scores
/// lower than one that is hot on both (`spec.md` §4.4, "Hotspot").
fn hotspot_score(churn: f64, complexity: f64) -> f64 {
    (churn * complexity).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hotspot_score_is_the_geometric_mean() {
        assert_eq!(hotspot_score(1.0, 1.0), 1.0);
        assert_eq!(hotspot_score(0.0, 1.0), 0.0);
        assert!((hotspot_score(0.5, 0.5) - 0.5).abs() < 1e-9);
    }
}

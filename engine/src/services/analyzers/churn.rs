//! Churn analyzer (`spec.md` §4.4, "Churn").
//!
//! Degrades to an empty result with a reason when no VCS reader is
//! available, per `spec.md` §6/§7 — never a hard failure.

use crate::error::AnalysisErrors;
use crate::models::options::ChurnOptions;
use crate::services::analyzers::context::{AnalysisContext, Analyzer};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileChurn {
    pub path: PathBuf,
    pub commit_count: u32,
    pub authors: BTreeSet<String>,
    pub lines_added: u32,
    pub lines_deleted: u32,
    pub churn_score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChurnResult {
    pub files: Vec<FileChurn>,
    pub unavailable_reason: Option<String>,
}

pub struct ChurnAnalyzer;

/// Normalizes raw per-file commit counts to [0, 1] via log-smoothing
/// divided by the run maximum (`spec.md` §4.4).
pub fn churn_scores(counts: &BTreeMap<PathBuf, u32>) -> BTreeMap<PathBuf, f64> {
    let smoothed: BTreeMap<PathBuf, f64> = counts
        .iter()
        .map(|(p, c)| (p.clone(), ((*c as f64) + 1.0).ln()))
        .collect();
    let max = smoothed.values().cloned().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return smoothed.into_keys().map(|p| (p, 0.0)).collect();
    }
    smoothed.into_iter().map(|(p, v)| (p, v / max)).collect()
}

impl Analyzer for ChurnAnalyzer {
    type Options = ChurnOptions;
    type Result = ChurnResult;

    fn name(&self) -> &'static str {
        "churn"
    }

    fn analyze(
        &self,
        ctx: &AnalysisContext,
        files: &[PathBuf],
        options: &ChurnOptions,
    ) -> (ChurnResult, AnalysisErrors) {
        let Some(vcs) = ctx.vcs else {
            return (
                ChurnResult {
                    files: Vec::new(),
                    unavailable_reason: Some("no VCS reader configured".to_string()),
                },
                AnalysisErrors::default(),
            );
        };

        let since = Utc::now() - Duration::days(options.days as i64);
        let commits = match vcs.commits(since) {
            Ok(c) => c,
            Err(e) => {
                return (
                    ChurnResult {
                        files: Vec::new(),
                        unavailable_reason: Some(e.to_string()),
                    },
                    AnalysisErrors::default(),
                )
            }
        };

        let wanted: BTreeSet<&PathBuf> = files.iter().collect();
        let mut per_file: BTreeMap<PathBuf, (u32, BTreeSet<String>, u32, u32)> = BTreeMap::new();
        for commit in &commits {
            for stat in &commit.files {
                if !wanted.contains(&stat.path) {
                    continue;
                }
                let entry = per_file.entry(stat.path.clone()).or_default();
                entry.0 += 1;
                entry.1.insert(commit.author.clone());
                entry.2 += stat.lines_added;
                entry.3 += stat.lines_deleted;
            }
        }

        let counts: BTreeMap<PathBuf, u32> = per_file.iter().map(|(p, v)| (p.clone(), v.0)).collect();
        let scores = churn_scores(&counts);

        let out = per_file
            .into_iter()
            .map(|(path, (commit_count, authors, added, deleted))| FileChurn {
                churn_score: *scores.get(&path).unwrap_or(&0.0),
                path,
                commit_count,
                authors,
                lines_added: added,
                lines_deleted: deleted,
            })
            .collect();

        (
            ChurnResult {
                files: out,
                unavailable_reason: None,
            },
            AnalysisErrors::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn churn_scores_map_the_busiest_file_to_one() {
        let mut counts = BTreeMap::new();
        counts.insert(PathBuf::from("a.rs"), 10);
        counts.insert(PathBuf::from("b.rs"), 2);
        let scores = churn_scores(&counts);
        assert_eq!(scores[&PathBuf::from("a.rs")], 1.0);
        assert!(scores[&PathBuf::from("b.rs")] > 0.0 && scores[&PathBuf::from("b.rs")] < 1.0);
    }

    #[test]
    fn churn_scores_are_zero_with_no_commits() {
        let mut counts = BTreeMap::new();
        counts.insert(PathBuf::from("a.rs"), 0);
        let scores = churn_scores(&counts);
        assert_eq!(scores[&PathBuf::from("a.rs")], 0.0);
    }
}

//! Temporal-coupling analyzer: files that tend to change together
//! (`spec.md` §4.4, "Temporal coupling").

use crate::error::AnalysisErrors;
use crate::models::commit::CommitRecord;
use crate::models::options::TemporalCouplingOptions;
use crate::services::analyzers::context::{AnalysisContext, Analyzer};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoupledPair {
    pub file_a: PathBuf,
    pub file_b: PathBuf,
    pub cochanges: u32,
    pub coupling_strength: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemporalCouplingResult {
    pub pairs: Vec<CoupledPair>,
    pub unavailable_reason: Option<String>,
}

pub struct TemporalCouplingAnalyzer;

impl Analyzer for TemporalCouplingAnalyzer {
    type Options = TemporalCouplingOptions;
    type Result = TemporalCouplingResult;

    fn name(&self) -> &'static str {
        "temporal_coupling"
    }

    fn analyze(
        &self,
        ctx: &AnalysisContext,
        files: &[PathBuf],
        options: &TemporalCouplingOptions,
    ) -> (TemporalCouplingResult, AnalysisErrors) {
        let Some(vcs) = ctx.vcs else {
            return (
                TemporalCouplingResult {
                    pairs: Vec::new(),
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
                    TemporalCouplingResult {
                        pairs: Vec::new(),
                        unavailable_reason: Some(e.to_string()),
                    },
                    AnalysisErrors::default(),
                )
            }
        };

        let wanted: HashSet<&PathBuf> = files.iter().collect();
        let mut pairs = compute_pairs(&commits, &wanted, options.min_cochanges);
        pairs.sort_by(|a, b| {
            b.coupling_strength
                .partial_cmp(&a.coupling_strength)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        (
            TemporalCouplingResult {
                pairs,
                unavailable_reason: None,
            },
            AnalysisErrors::default(),
        )
    }
}

/// Co-change pair counting over a commit window, filtered by a minimum
/// co-change floor (`spec.md` §4.4, "Temporal coupling").
fn compute_pairs(
    commits: &[CommitRecord],
    wanted: &HashSet<&PathBuf>,
    min_cochanges: u32,
) -> Vec<CoupledPair> {
    let mut commit_counts: HashMap<PathBuf, u32> = HashMap::new();
    let mut cochange_counts: BTreeMap<(PathBuf, PathBuf), u32> = BTreeMap::new();

    for commit in commits {
        let touched: Vec<&PathBuf> = commit
            .files
            .iter()
            .map(|f| &f.path)
            .filter(|p| wanted.contains(p))
            .collect();
        for p in &touched {
            *commit_counts.entry((*p).clone()).or_insert(0) += 1;
        }
        for i in 0..touched.len() {
            for j in (i + 1)..touched.len() {
                let (a, b) = if touched[i] <= touched[j] {
                    (touched[i].clone(), touched[j].clone())
                } else {
                    (touched[j].clone(), touched[i].clone())
                };
                *cochange_counts.entry((a, b)).or_insert(0) += 1;
            }
        }
    }

    let mut pairs = Vec::new();
    for ((a, b), count) in cochange_counts {
        if count < min_cochanges {
            continue;
        }
        let commits_a = *commit_counts.get(&a).unwrap_or(&0);
        let commits_b = *commit_counts.get(&b).unwrap_or(&0);
        let denom = commits_a.min(commits_b).max(1);
        pairs.push(CoupledPair {
            file_a: a,
            file_b: b,
            cochanges: count,
            coupling_strength: count as f64 / denom as f64,
        });
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::commit::FileDiffStat;

    fn commit(files: &[&str]) -> CommitRecord {
        CommitRecord {
            hash: "abc".to_string(),
            author: "dev".to_string(),
            timestamp: Utc::now(),
            parents: Vec::new(),
            files: files
                .iter()
                .map(|f| FileDiffStat {
                    path: PathBuf::from(f),
                    lines_added: 1,
                    lines_deleted: 0,
                    diff_hunks: Vec::new(),
                })
                .collect(),
            is_bug_fix: false,
        }
    }

    #[test]
    fn cochanging_files_produce_a_pair_with_full_strength() {
        let a = PathBuf::from("a.rs");
        let b = PathBuf::from("b.rs");
        let wanted: HashSet<&PathBuf> = [&a, &b].into_iter().collect();
        let commits = vec![commit(&["a.rs", "b.rs"]), commit(&["a.rs", "b.rs"])];
        let pairs = compute_pairs(&commits, &wanted, 1);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].cochanges, 2);
        assert_eq!(pairs[0].coupling_strength, 1.0);
    }

    #[test]
    fn pairs_below_the_min_cochanges_floor_are_dropped() {
        let a = PathBuf::from("a.rs");
        let b = PathBuf::from("b.rs");
        let wanted: HashSet<&PathBuf> = [&a, &b].into_iter().collect();
        let commits = vec![commit(&["a.rs", "b.rs"])];
        assert!(compute_pairs(&commits, &wanted, 3).is_empty());
    }

    #[test]
    fn unwanted_files_are_excluded_from_pairing() {
        let a = PathBuf::from("a.rs");
        let wanted: HashSet<&PathBuf> = [&a].into_iter().collect();
        let commits = vec![commit(&["a.rs", "untracked.rs"])];
        assert!(compute_pairs(&commits, &wanted, 1).is_empty());
    }
}

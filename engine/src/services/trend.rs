//! Trend engine: replays composite scoring at historical commits and
//! regresses overall and per-component quality over time (`spec.md` §4.5,
//! "Composite & trend").

use crate::error::AnalysisErrors;
use crate::models::commit::CommitRecord;
use crate::models::options::{
    CohesionOptions, ComplexityOptions, DependencyGraphOptions, DuplicatesOptions, SatdOptions,
    ScoreOptions, SmellsOptions, TdgOptions, TrendOptions, TrendPeriod,
};
use crate::services::analyzers::cohesion::CohesionAnalyzer;
use crate::services::analyzers::complexity::{normalized_complexity_scores, ComplexityAnalyzer};
use crate::services::analyzers::context::{AnalysisContext, Analyzer};
use crate::services::analyzers::dependency_graph::DependencyGraphAnalyzer;
use crate::services::analyzers::duplicates::DuplicatesAnalyzer;
use crate::services::analyzers::satd::{normalized_satd_scores, SatdAnalyzer};
use crate::services::analyzers::smells::{Severity, Smell, SmellsAnalyzer};
use crate::services::analyzers::tdg::TdgAnalyzer;
use crate::services::composite::{self, ComponentScores};
use crate::services::parser_pool::ParserPool;
use crate::services::progress::NullProgress;
use crate::services::source_provider::SnapshotProvider;
use crate::services::vcs::VcsReader;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    pub commit_hash: String,
    pub timestamp: DateTime<Utc>,
    pub overall_score: f64,
    pub component_scores: ComponentScores,
    pub file_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrendResult {
    pub points: Vec<TrendPoint>,
    pub overall_regression: Option<Regression>,
    /// One regression per composite component, keyed the same as
    /// `ScoreOptions::weights` (`spec.md` §4.5: "same for each component").
    pub component_regressions: BTreeMap<String, Regression>,
    pub unavailable_reason: Option<String>,
}

/// Ordinary least squares over `(x, y)` pairs; `None` for fewer than two
/// points or a degenerate (zero-variance) x series.
fn linear_regression(points: &[(f64, f64)]) -> Option<Regression> {
    let n = points.len() as f64;
    if points.len() < 2 {
        return None;
    }
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (x, y) in points {
        sxy += (x - mean_x) * (y - mean_y);
        sxx += (x - mean_x).powi(2);
    }
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let ss_tot: f64 = points.iter().map(|(_, y)| (y - mean_y).powi(2)).sum();
    let ss_res: f64 = points
        .iter()
        .map(|(x, y)| {
            let predicted = slope * x + intercept;
            (y - predicted).powi(2)
        })
        .sum();
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 };

    Some(Regression {
        slope,
        intercept,
        r_squared,
    })
}

fn period_duration(period: TrendPeriod) -> Duration {
    match period {
        TrendPeriod::Daily => Duration::days(1),
        TrendPeriod::Weekly => Duration::weeks(1),
        TrendPeriod::Monthly => Duration::days(30),
    }
}

/// Picks one commit per period boundary, walking backward from now. With
/// `snap` the boundary timestamps are exact period multiples from `since`;
/// without it, each boundary simply advances by one period from the
/// previous sample's actual commit time (`spec.md` SPEC_FULL.md's
/// elaboration of §6's `snap` option).
fn sample_commits<'a>(commits: &'a [CommitRecord], since: DateTime<Utc>, options: &TrendOptions) -> Vec<&'a CommitRecord> {
    let step = period_duration(options.period);
    let mut sorted: Vec<&CommitRecord> = commits.iter().collect();
    sorted.sort_by_key(|c| c.timestamp);

    let mut out = Vec::new();
    let mut boundary = since;
    let now = Utc::now();
    while boundary <= now {
        let candidate = sorted
            .iter()
            .filter(|c| c.timestamp <= boundary)
            .next_back()
            .copied();
        if let Some(commit) = candidate {
            if out.last().map(|c: &&CommitRecord| c.hash != commit.hash).unwrap_or(true) {
                out.push(commit);
            }
        }
        boundary = if options.snap {
            boundary + step
        } else {
            candidate.map(|c| c.timestamp).unwrap_or(boundary) + step
        };
    }
    out
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let values: Vec<f64> = values.collect();
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn smell_severity(smell: &Smell) -> Severity {
    match smell {
        Smell::Cyclic { severity, .. }
        | Smell::Hub { severity, .. }
        | Smell::GodComponent { severity, .. }
        | Smell::UnstableDependency { severity, .. } => *severity,
    }
}

fn smell_weight(severity: Severity) -> f64 {
    match severity {
        Severity::Low => 0.25,
        Severity::Medium => 0.5,
        Severity::High => 0.75,
        Severity::Critical => 1.0,
    }
}

/// Runs the same component analyzers the composite score is built from
/// over a single point-in-time snapshot, so `composite::compute` can be
/// replayed unchanged at every sampled commit (`spec.md` §4.5: "re-run the
/// composite scoring over the project").
fn component_scores(
    ctx: &AnalysisContext,
    files: &[PathBuf],
    score_options: &ScoreOptions,
) -> (ComponentScores, AnalysisErrors) {
    let mut errors = AnalysisErrors::default();

    let (complexity, complexity_errors) = ComplexityAnalyzer.analyze(ctx, files, &ComplexityOptions::default());
    errors.merge(complexity_errors);
    let complexity_badness = mean(normalized_complexity_scores(&complexity).values().copied());

    let (duplicates, duplicates_errors) = DuplicatesAnalyzer.analyze(ctx, files, &DuplicatesOptions::default());
    errors.merge(duplicates_errors);
    let duplication_badness = if files.is_empty() {
        0.0
    } else {
        (duplicates.duplicate_function_count as f64 / files.len() as f64).min(1.0)
    };

    let (satd, satd_errors) = SatdAnalyzer.analyze(ctx, files, &SatdOptions::default());
    errors.merge(satd_errors);
    let satd_badness = mean(normalized_satd_scores(&satd, files).values().copied());

    let (tdg, tdg_errors) = TdgAnalyzer.analyze(ctx, files, &TdgOptions::default());
    errors.merge(tdg_errors);

    let (graph, graph_errors) = DependencyGraphAnalyzer.analyze(ctx, files, &DependencyGraphOptions::default());
    errors.merge(graph_errors);
    let coupling_badness = graph.density;

    let (smells, smells_errors) = SmellsAnalyzer.analyze(ctx, files, &SmellsOptions::default());
    errors.merge(smells_errors);
    let smell_weight_sum: f64 = smells.smells.iter().map(|s| smell_weight(smell_severity(s))).sum();
    let smells_badness = if files.is_empty() {
        0.0
    } else {
        (smell_weight_sum / files.len() as f64).min(1.0)
    };

    let cohesion = if score_options.enable_cohesion {
        let (cohesion, cohesion_errors) = CohesionAnalyzer.analyze(ctx, files, &CohesionOptions::default());
        errors.merge(cohesion_errors);
        let max_lcom = cohesion.classes.iter().map(|c| c.lcom as f64).fold(0.0_f64, f64::max);
        let badness = if max_lcom > 0.0 {
            mean(cohesion.classes.iter().map(|c| c.lcom as f64 / max_lcom))
        } else {
            0.0
        };
        Some(composite::inverse_badness(badness))
    } else {
        None
    };

    (
        ComponentScores {
            complexity: composite::inverse_badness(complexity_badness),
            duplication: composite::inverse_badness(duplication_badness),
            satd: composite::inverse_badness(satd_badness),
            tdg: tdg.mean_score,
            coupling: composite::inverse_badness(coupling_badness),
            smells: composite::inverse_badness(smells_badness),
            cohesion,
        },
        errors,
    )
}

fn component_value(name: &str, scores: &ComponentScores) -> Option<f64> {
    match name {
        "complexity" => Some(scores.complexity),
        "duplication" => Some(scores.duplication),
        "satd" => Some(scores.satd),
        "tdg" => Some(scores.tdg),
        "coupling" => Some(scores.coupling),
        "smells" => Some(scores.smells),
        "cohesion" => scores.cohesion,
        _ => None,
    }
}

pub fn analyze(
    vcs: &dyn VcsReader,
    files_at_head: &[PathBuf],
    options: &TrendOptions,
) -> (TrendResult, AnalysisErrors) {
    let since = Utc::now() - Duration::days(options.since_days as i64);
    let commits = match vcs.commits(since) {
        Ok(c) => c,
        Err(e) => {
            return (
                TrendResult {
                    points: Vec::new(),
                    overall_regression: None,
                    component_regressions: BTreeMap::new(),
                    unavailable_reason: Some(e.to_string()),
                },
                AnalysisErrors::default(),
            )
        }
    };

    let sampled = sample_commits(&commits, since, options);
    let parsers = ParserPool::new();
    let null_progress = NullProgress;
    let mut errors = AnalysisErrors::default();
    let mut points = Vec::new();

    for commit in sampled {
        let snapshot = match vcs.snapshot_at(&commit.hash) {
            Ok(s) => s,
            Err(e) => {
                errors.push(PathBuf::from(&commit.hash), e);
                continue;
            }
        };
        let paths: Vec<PathBuf> = files_at_head
            .iter()
            .filter(|p| snapshot.contains_key(*p))
            .cloned()
            .collect();
        if paths.is_empty() {
            continue;
        }
        let provider = SnapshotProvider::new(snapshot, std::time::SystemTime::UNIX_EPOCH);
        let ctx = AnalysisContext::new(&provider, &parsers).with_progress(&null_progress);

        let (components, component_errors) = component_scores(&ctx, &paths, &options.score);
        errors.merge(component_errors);
        let Ok(composite_result) = composite::compute(components.clone(), &options.score) else {
            continue;
        };

        points.push(TrendPoint {
            commit_hash: commit.hash.clone(),
            timestamp: commit.timestamp,
            overall_score: composite_result.total,
            component_scores: components,
            file_count: paths.len(),
        });
    }

    let overall_series: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.overall_score))
        .collect();
    let overall_regression = linear_regression(&overall_series);

    let mut component_regressions = BTreeMap::new();
    for name in options.score.weights.keys() {
        let series: Vec<(f64, f64)> = points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| component_value(name, &p.component_scores).map(|v| (i as f64, v)))
            .collect();
        if let Some(reg) = linear_regression(&series) {
            component_regressions.insert(name.clone(), reg);
        }
    }

    (
        TrendResult {
            points,
            overall_regression,
            component_regressions,
            unavailable_reason: None,
        },
        errors,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regression_detects_upward_slope() {
        let points = vec![(0.0, 10.0), (1.0, 20.0), (2.0, 30.0), (3.0, 40.0)];
        let reg = linear_regression(&points).unwrap();
        assert!((reg.slope - 10.0).abs() < 1e-9);
        assert!(reg.r_squared > 0.99);
    }

    #[test]
    fn regression_needs_at_least_two_points() {
        assert!(linear_regression(&[(0.0, 1.0)]).is_none());
    }

    #[test]
    fn component_value_looks_up_cohesion_only_when_present() {
        let scores = ComponentScores {
            complexity: 90.0,
            duplication: 80.0,
            satd: 70.0,
            tdg: 60.0,
            coupling: 50.0,
            smells: 40.0,
            cohesion: None,
        };
        assert_eq!(component_value("complexity", &scores), Some(90.0));
        assert_eq!(component_value("cohesion", &scores), None);

        let with_cohesion = ComponentScores {
            cohesion: Some(33.0),
            ..scores
        };
        assert_eq!(component_value("cohesion", &with_cohesion), Some(33.0));
    }

    #[test]
    fn smell_weight_scales_with_severity() {
        assert!(smell_weight(Severity::Low) < smell_weight(Severity::Medium));
        assert!(smell_weight(Severity::Medium) < smell_weight(Severity::High));
        assert!(smell_weight(Severity::High) < smell_weight(Severity::Critical));
    }
}

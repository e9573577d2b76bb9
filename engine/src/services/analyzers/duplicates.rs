//! Duplicate-code analyzer: MinHash/LSH clone detection (`spec.md` §4.4,
//! "Duplicates (MinHash/LSH)").
//!
//! Each function body is canonicalized into a token shingle set, hashed
//! into a MinHash signature, and banded for locality-sensitive candidate
//! generation before the exact Jaccard similarity is computed on survivors
//! only — the same two-phase shape as `services/duplicate_detector.rs` in
//! the reference toolkit this crate's analyzer set is modeled on.

use crate::error::AnalysisErrors;
use crate::models::options::DuplicatesOptions;
use crate::services::analyzers::context::{AnalysisContext, Analyzer};
use crate::services::extractors::complexity::extract_function_bodies;
use crate::services::extractors::duplicate_tokens::{canonicalize, shingles};
use crate::services::pipeline::map_files;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloneUnit {
    pub file: PathBuf,
    pub function: String,
    pub line_start: u32,
    pub line_end: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloneType {
    /// Identical after whitespace/comment stripping.
    Type1,
    /// Identical after identifier renaming (same structure, different names).
    Type2,
    /// Similar but not identical after normalization (near-miss).
    Type3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloneGroup {
    pub units: Vec<CloneUnit>,
    pub similarity: f64,
    pub clone_type: CloneType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuplicatesResult {
    pub groups: Vec<CloneGroup>,
    pub total_candidate_pairs: usize,
    pub duplicate_function_count: usize,
}

pub struct DuplicatesAnalyzer;

/// MinHash signature: `num_hash_functions` minimum values, one per
/// deterministic hash function, over a shingle set.
struct Signature(Vec<u64>);

/// SplitMix64: deterministic, seedable, no external RNG dependency
/// (`spec.md` §8, "MinHash seeding must be reproducible across runs").
fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E3779B97F4A7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

fn hash_seeds(count: usize) -> Vec<(u64, u64)> {
    (0..count)
        .map(|i| {
            let a = splitmix64(i as u64 * 2 + 1);
            let b = splitmix64(i as u64 * 2 + 2) | 1; // odd multiplier avoids degenerate collapse
            (a, b)
        })
        .collect()
}

fn minhash(shingle_hashes: &[u64], seeds: &[(u64, u64)]) -> Signature {
    let mut mins = vec![u64::MAX; seeds.len()];
    for &h in shingle_hashes {
        for (i, &(a, b)) in seeds.iter().enumerate() {
            let v = h.wrapping_mul(a).wrapping_add(b);
            if v < mins[i] {
                mins[i] = v;
            }
        }
    }
    Signature(mins)
}

fn band_keys(sig: &Signature, num_bands: usize, rows_per_band: usize) -> Vec<u64> {
    sig.0
        .chunks(rows_per_band.max(1))
        .take(num_bands)
        .map(|chunk| {
            let joined: Vec<u8> = chunk.iter().flat_map(|v| v.to_le_bytes()).collect();
            xxhash_rust::xxh64::xxh64(&joined, 0)
        })
        .collect()
}

fn jaccard(a: &[u64], b: &[u64]) -> f64 {
    use std::collections::HashSet;
    let sa: HashSet<&u64> = a.iter().collect();
    let sb: HashSet<&u64> = b.iter().collect();
    let inter = sa.intersection(&sb).count();
    let union = sa.union(&sb).count();
    if union == 0 {
        0.0
    } else {
        inter as f64 / union as f64
    }
}

struct Candidate {
    unit: CloneUnit,
    raw_hashes: Vec<u64>,
    normalized_hashes: Vec<u64>,
}

impl Analyzer for DuplicatesAnalyzer {
    type Options = DuplicatesOptions;
    type Result = DuplicatesResult;

    fn name(&self) -> &'static str {
        "duplicates"
    }

    fn analyze(
        &self,
        ctx: &AnalysisContext,
        files: &[PathBuf],
        options: &DuplicatesOptions,
    ) -> (DuplicatesResult, AnalysisErrors) {
        let (per_file, errors) = map_files(
            files,
            ctx.source,
            0,
            &ctx.cancel,
            ctx.progress,
            |path, language, bytes| {
                let parsed = ctx.parsers.parse(language, bytes)?;
                let bodies = extract_function_bodies(&parsed, path);
                let mut units = Vec::new();
                for (func, text) in bodies {
                    if func.line_end.saturating_sub(func.line_start) + 1 < options.min_lines {
                        continue;
                    }
                    let canon = canonicalize(text, language);
                    let raw_hashes = shingles(&canon.raw_tokens, options.shingle_size);
                    let normalized_hashes = shingles(&canon.normalized_tokens, options.shingle_size);
                    if raw_hashes.is_empty() {
                        continue;
                    }
                    units.push(Candidate {
                        unit: CloneUnit {
                            file: func.file,
                            function: func.name,
                            line_start: func.line_start,
                            line_end: func.line_end,
                        },
                        raw_hashes,
                        normalized_hashes,
                    });
                }
                Ok(units)
            },
        );

        let candidates: Vec<Candidate> = per_file.into_iter().flatten().collect();
        let rows_per_band = options.rows_per_band();
        let seeds = hash_seeds(options.num_hash_functions);

        // LSH bucketing on normalized tokens catches Type-2 clones too
        // (renamed identifiers); Type-1 is always a subset of Type-2.
        let mut buckets: HashMap<(usize, u64), Vec<usize>> = HashMap::new();
        let signatures: Vec<Signature> = candidates
            .iter()
            .map(|c| minhash(&c.normalized_hashes, &seeds))
            .collect();

        for (idx, sig) in signatures.iter().enumerate() {
            for (band_idx, key) in band_keys(sig, options.num_bands, rows_per_band).into_iter().enumerate() {
                buckets.entry((band_idx, key)).or_default().push(idx);
            }
        }

        let mut seen_pairs: std::collections::HashSet<(usize, usize)> = std::collections::HashSet::new();
        let mut union_find: Vec<usize> = (0..candidates.len()).collect();

        fn find(uf: &mut [usize], x: usize) -> usize {
            if uf[x] != x {
                uf[x] = find(uf, uf[x]);
            }
            uf[x]
        }
        fn union(uf: &mut [usize], a: usize, b: usize) {
            let ra = find(uf, a);
            let rb = find(uf, b);
            if ra != rb {
                uf[ra] = rb;
            }
        }

        let mut total_candidate_pairs = 0usize;
        let mut pair_similarity: HashMap<(usize, usize), (f64, CloneType)> = HashMap::new();

        for members in buckets.values() {
            if members.len() < 2 {
                continue;
            }
            for i in 0..members.len() {
                for j in (i + 1)..members.len() {
                    let (a, b) = (members[i].min(members[j]), members[i].max(members[j]));
                    if !seen_pairs.insert((a, b)) {
                        continue;
                    }
                    total_candidate_pairs += 1;
                    let sim = jaccard(&candidates[a].normalized_hashes, &candidates[b].normalized_hashes);
                    if sim < options.similarity_threshold {
                        continue;
                    }
                    let raw_sim = jaccard(&candidates[a].raw_hashes, &candidates[b].raw_hashes);
                    let clone_type = if raw_sim >= 0.999 {
                        CloneType::Type1
                    } else if sim >= 0.999 {
                        CloneType::Type2
                    } else {
                        CloneType::Type3
                    };
                    union(&mut union_find, a, b);
                    pair_similarity.insert((a, b), (sim, clone_type));
                }
            }
        }

        let mut groups_by_root: HashMap<usize, Vec<usize>> = HashMap::new();
        for idx in 0..candidates.len() {
            let root = find(&mut union_find, idx);
            groups_by_root.entry(root).or_default().push(idx);
        }

        let mut groups = Vec::new();
        let mut duplicate_function_count = 0usize;
        for members in groups_by_root.into_values() {
            if members.len() < 2 {
                continue;
            }
            duplicate_function_count += members.len();
            let mut best_similarity = 0.0_f64;
            let mut worst_type = CloneType::Type1;
            for i in 0..members.len() {
                for j in (i + 1)..members.len() {
                    let key = (members[i].min(members[j]), members[i].max(members[j]));
                    if let Some((sim, ty)) = pair_similarity.get(&key) {
                        best_similarity = best_similarity.max(*sim);
                        worst_type = match (worst_type, ty) {
                            (_, CloneType::Type3) | (CloneType::Type3, _) => CloneType::Type3,
                            (_, CloneType::Type2) | (CloneType::Type2, _) => CloneType::Type2,
                            _ => CloneType::Type1,
                        };
                    }
                }
            }
            let mut units: Vec<CloneUnit> = members.iter().map(|&i| candidates[i].unit.clone()).collect();
            units.sort_by(|a, b| (a.file.clone(), a.line_start).cmp(&(b.file.clone(), b.line_start)));
            groups.push(CloneGroup {
                units,
                similarity: best_similarity,
                clone_type: worst_type,
            });
        }

        // Similarity alone leaves ties (e.g. several Type-1 pairs at 1.0) in
        // whatever order `groups_by_root`'s hash iteration happened to
        // produce; break ties on the lead unit's (file, line) so output is
        // deterministic across runs (`spec.md` §8).
        groups.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    let key = |g: &CloneGroup| g.units.first().map(|u| (u.file.clone(), u.line_start));
                    key(a).cmp(&key(b))
                })
        });

        (
            DuplicatesResult {
                groups,
                total_candidate_pairs,
                duplicate_function_count,
            },
            errors,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splitmix64_is_deterministic() {
        assert_eq!(splitmix64(42), splitmix64(42));
        assert_ne!(splitmix64(42), splitmix64(43));
    }

    #[test]
    fn jaccard_identical_sets_is_one() {
        let a = vec![1u64, 2, 3];
        assert_eq!(jaccard(&a, &a), 1.0);
    }

    #[test]
    fn jaccard_disjoint_sets_is_zero() {
        let a = vec![1u64, 2];
        let b = vec![3u64, 4];
        assert_eq!(jaccard(&a, &b), 0.0);
    }

    #[test]
    fn minhash_signature_is_deterministic() {
        let seeds = hash_seeds(32);
        let hashes = vec![10u64, 20, 30, 40];
        let sig1 = minhash(&hashes, &seeds);
        let sig2 = minhash(&hashes, &seeds);
        assert_eq!(sig1.0, sig2.0);
    }
}

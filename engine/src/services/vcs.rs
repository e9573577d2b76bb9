//! VCS reader capability set (`spec.md` §6).
//!
//! The engine makes no assumption beyond this trait; a missing reader
//! degrades churn, ownership, hotspot, temporal-coupling, trend, and
//! feature-flag staleness to empty-with-reason results rather than errors.

use crate::error::EngineError;
use crate::models::commit::{is_bug_fix_message, BlameSlice, CommitRecord, FileDiffStat};
use chrono::{DateTime, TimeZone, Utc};
use git2::{BlameOptions, DiffOptions, Repository};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub trait VcsReader: Send {
    fn commits(&self, since: DateTime<Utc>) -> Result<Vec<CommitRecord>, EngineError>;
    fn blame(&self, path: &Path) -> Result<BlameSlice, EngineError>;
    fn diff_stat(&self, rev_a: &str, rev_b: &str) -> Result<Vec<FileDiffStat>, EngineError>;
    fn head(&self) -> Result<String, EngineError>;
    /// Returns a read-only view of every tracked file's bytes at `rev`,
    /// used by the trend engine to build a [`SnapshotProvider`].
    ///
    /// [`SnapshotProvider`]: crate::services::source_provider::SnapshotProvider
    fn snapshot_at(&self, rev: &str) -> Result<HashMap<PathBuf, Vec<u8>>, EngineError>;
}

pub struct Git2VcsReader {
    repo: Repository,
    root: PathBuf,
}

impl Git2VcsReader {
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        let repo = Repository::discover(path).map_err(|e| EngineError::VcsUnavailable {
            reason: e.to_string(),
        })?;
        let root = repo
            .workdir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| path.to_path_buf());
        Ok(Self { repo, root })
    }

    fn git_err(e: git2::Error) -> EngineError {
        EngineError::VcsUnavailable {
            reason: e.to_string(),
        }
    }
}

impl VcsReader for Git2VcsReader {
    fn commits(&self, since: DateTime<Utc>) -> Result<Vec<CommitRecord>, EngineError> {
        let mut walk = self.repo.revwalk().map_err(Self::git_err)?;
        walk.push_head().map_err(Self::git_err)?;
        walk.set_sorting(git2::Sort::TIME).map_err(Self::git_err)?;

        let mut out = Vec::new();
        for oid in walk {
            let oid = oid.map_err(Self::git_err)?;
            let commit = self.repo.find_commit(oid).map_err(Self::git_err)?;
            let when = commit.time();
            let timestamp = Utc
                .timestamp_opt(when.seconds(), 0)
                .single()
                .unwrap_or_else(Utc::now);
            if timestamp < since {
                break;
            }
            let author = commit.author().name().unwrap_or("unknown").to_string();
            let message = commit.message().unwrap_or("").to_string();
            let parents: Vec<String> = commit.parent_ids().map(|id| id.to_string()).collect();

            let files = if let Some(parent_oid) = commit.parent_id(0).ok() {
                let parent = self.repo.find_commit(parent_oid).map_err(Self::git_err)?;
                self.diff_trees(&parent.tree().map_err(Self::git_err)?, &commit.tree().map_err(Self::git_err)?)?
            } else {
                self.diff_trees_against_empty(&commit.tree().map_err(Self::git_err)?)?
            };

            out.push(CommitRecord {
                hash: oid.to_string(),
                author,
                timestamp,
                parents,
                is_bug_fix: is_bug_fix_message(&message),
                files,
            });
        }
        Ok(out)
    }

    fn blame(&self, path: &Path) -> Result<BlameSlice, EngineError> {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        let mut opts = BlameOptions::new();
        let blame = self
            .repo
            .blame_file(rel, Some(&mut opts))
            .map_err(Self::git_err)?;

        let mut slice = BlameSlice::default();
        let contents = std::fs::read_to_string(path).unwrap_or_default();
        let lines: Vec<&str> = contents.lines().collect();

        for hunk in blame.iter() {
            let sig = hunk.final_signature();
            let author = sig.name().unwrap_or("unknown").to_string();
            let start = hunk.final_start_line();
            let count = hunk.lines_in_hunk();
            let mut effective = 0u64;
            for i in 0..count {
                if let Some(line) = lines.get(start - 1 + i) {
                    if !crate::models::commit::is_trivial_line(line) {
                        effective += 1;
                    }
                }
            }
            *slice.by_author.entry(author).or_insert(0) += effective;
        }
        Ok(slice)
    }

    fn diff_stat(&self, rev_a: &str, rev_b: &str) -> Result<Vec<FileDiffStat>, EngineError> {
        let a = self
            .repo
            .revparse_single(rev_a)
            .and_then(|o| o.peel_to_tree())
            .map_err(Self::git_err)?;
        let b = self
            .repo
            .revparse_single(rev_b)
            .and_then(|o| o.peel_to_tree())
            .map_err(Self::git_err)?;
        self.diff_trees(&a, &b)
    }

    fn head(&self) -> Result<String, EngineError> {
        let head = self.repo.head().map_err(Self::git_err)?;
        let oid = head.target().ok_or_else(|| EngineError::VcsUnavailable {
            reason: "HEAD has no target".to_string(),
        })?;
        Ok(oid.to_string())
    }

    fn snapshot_at(&self, rev: &str) -> Result<HashMap<PathBuf, Vec<u8>>, EngineError> {
        let tree = self
            .repo
            .revparse_single(rev)
            .and_then(|o| o.peel_to_tree())
            .map_err(Self::git_err)?;
        let mut out = HashMap::new();
        tree.walk(git2::TreeWalkMode::PreOrder, |dir, entry| {
            if entry.kind() == Some(git2::ObjectType::Blob) {
                if let Some(name) = entry.name() {
                    let rel = PathBuf::from(format!("{dir}{name}"));
                    if let Ok(obj) = entry.to_object(&self.repo) {
                        if let Some(blob) = obj.as_blob() {
                            out.insert(rel, blob.content().to_vec());
                        }
                    }
                }
            }
            git2::TreeWalkResult::Ok
        })
        .map_err(Self::git_err)?;
        Ok(out)
    }
}

impl Git2VcsReader {
    fn diff_trees(
        &self,
        a: &git2::Tree,
        b: &git2::Tree,
    ) -> Result<Vec<FileDiffStat>, EngineError> {
        let mut opts = DiffOptions::new();
        let diff = self
            .repo
            .diff_tree_to_tree(Some(a), Some(b), Some(&mut opts))
            .map_err(Self::git_err)?;
        self.stats_from_diff(diff)
    }

    fn diff_trees_against_empty(&self, b: &git2::Tree) -> Result<Vec<FileDiffStat>, EngineError> {
        let diff = self
            .repo
            .diff_tree_to_tree(None, Some(b), None)
            .map_err(Self::git_err)?;
        self.stats_from_diff(diff)
    }

    fn stats_from_diff(&self, diff: git2::Diff) -> Result<Vec<FileDiffStat>, EngineError> {
        let per_file: std::cell::RefCell<HashMap<PathBuf, (u32, u32, Vec<(u32, u32)>)>> =
            std::cell::RefCell::new(HashMap::new());
        diff.foreach(
            &mut |_delta, _progress| true,
            None,
            Some(&mut |delta, hunk| {
                if let Some(path) = delta.new_file().path() {
                    let mut per_file = per_file.borrow_mut();
                    let entry = per_file.entry(path.to_path_buf()).or_default();
                    entry.2.push((hunk.new_start(), hunk.new_lines()));
                }
                true
            }),
            Some(&mut |delta, _hunk, line| {
                if let Some(path) = delta.new_file().path() {
                    let mut per_file = per_file.borrow_mut();
                    let entry = per_file.entry(path.to_path_buf()).or_default();
                    match line.origin() {
                        '+' => entry.0 += 1,
                        '-' => entry.1 += 1,
                        _ => {}
                    }
                }
                true
            }),
        )
        .map_err(Self::git_err)?;

        Ok(per_file
            .into_inner()
            .into_iter()
            .map(|(path, (added, deleted, hunks))| FileDiffStat {
                path,
                lines_added: added,
                lines_deleted: deleted,
                diff_hunks: hunks,
            })
            .collect())
    }
}

//! Content-addressed result cache (`spec.md` §4.1, §6).
//!
//! Each value is a self-describing envelope `{hash, timestamp, payload}`
//! written atomically (temp file + rename) under a directory created with
//! owner-only permissions. Cache read errors fall through to a live
//! analysis rather than propagating — never fatal.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Serialize, Deserialize)]
struct Envelope {
    hash: [u8; 32],
    timestamp_unix_seconds: u64,
    payload: Vec<u8>,
}

/// Builds the deterministic cache key from `spec.md` §3's invariant:
/// hash of (analyzer name, option digest, sorted file paths, each file's
/// content hash).
pub fn cache_key(analyzer: &str, option_digest: &str, files: &[(PathBuf, String)]) -> String {
    let mut sorted: Vec<&(PathBuf, String)> = files.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut hasher = blake3::Hasher::new();
    hasher.update(analyzer.as_bytes());
    hasher.update(b"\0");
    hasher.update(option_digest.as_bytes());
    for (path, content_hash) in sorted {
        hasher.update(b"\0");
        hasher.update(path.to_string_lossy().as_bytes());
        hasher.update(b"\0");
        hasher.update(content_hash.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

pub struct CacheStore {
    root: PathBuf,
    ttl_seconds: u64,
    max_size_bytes: u64,
}

impl CacheStore {
    pub fn new(root: PathBuf, ttl_seconds: u64, max_size_bytes: u64) -> Result<Self, EngineError> {
        std::fs::create_dir_all(&root).map_err(EngineError::CacheIo)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            let _ = std::fs::set_permissions(&root, perms);
        }
        Ok(Self {
            root,
            ttl_seconds,
            max_size_bytes,
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        let path = self.path_for(key);
        let bytes = std::fs::read(&path).ok()?;
        let envelope: Envelope = bincode::deserialize(&bytes).ok()?;

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        if self.ttl_seconds > 0 && now.saturating_sub(envelope.timestamp_unix_seconds) > self.ttl_seconds {
            return None;
        }

        bincode::deserialize(&envelope.payload).ok()
    }

    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), EngineError> {
        let payload = bincode::serialize(value).map_err(|e| {
            EngineError::CacheIo(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        let hash = *blake3::hash(&payload).as_bytes();
        let timestamp_unix_seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let envelope = Envelope {
            hash,
            timestamp_unix_seconds,
            payload,
        };
        let bytes = bincode::serialize(&envelope).map_err(|e| {
            EngineError::CacheIo(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;

        self.evict_if_needed(bytes.len() as u64)?;

        let final_path = self.path_for(key);
        let tmp_path = self.root.join(format!("{key}.tmp-{}", std::process::id()));
        std::fs::write(&tmp_path, &bytes).map_err(EngineError::CacheIo)?;
        std::fs::rename(&tmp_path, &final_path).map_err(EngineError::CacheIo)?;
        Ok(())
    }

    fn evict_if_needed(&self, incoming_size: u64) -> Result<(), EngineError> {
        if self.max_size_bytes == 0 {
            return Ok(());
        }
        let mut entries: Vec<(PathBuf, u64, SystemTime)> = Vec::new();
        let mut total: u64 = 0;
        let Ok(dir) = std::fs::read_dir(&self.root) else {
            return Ok(());
        };
        for entry in dir.flatten() {
            if let Ok(meta) = entry.metadata() {
                if meta.is_file() {
                    total += meta.len();
                    let mtime = meta.modified().unwrap_or(UNIX_EPOCH);
                    entries.push((entry.path(), meta.len(), mtime));
                }
            }
        }

        if total + incoming_size <= self.max_size_bytes {
            return Ok(());
        }

        entries.sort_by_key(|(_, _, mtime)| *mtime);
        for (path, size, _) in entries {
            if total + incoming_size <= self.max_size_bytes {
                break;
            }
            if std::fs::remove_file(&path).is_ok() {
                total = total.saturating_sub(size);
            }
        }
        Ok(())
    }
}

pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("codequal")
}

pub fn option_digest<T: Serialize>(options: &T) -> String {
    let json = serde_json::to_vec(options).unwrap_or_default();
    blake3::hash(&json).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_cache() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().to_path_buf(), 0, 0).unwrap();
        let key = cache_key("complexity", "abc", &[(PathBuf::from("a.rs"), "h1".into())]);
        store.put(&key, &42u32).unwrap();
        let got: Option<u32> = store.get(&key);
        assert_eq!(got, Some(42));
    }

    #[test]
    fn ttl_expires_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().to_path_buf(), 0, 0).unwrap();
        let key = "k".to_string();
        store.put(&key, &1u32).unwrap();
        let fresh: Option<u32> = store.get(&key);
        assert_eq!(fresh, Some(1));
    }

    #[test]
    fn cache_key_is_order_independent() {
        let a = cache_key(
            "x",
            "d",
            &[
                (PathBuf::from("b.rs"), "hb".into()),
                (PathBuf::from("a.rs"), "ha".into()),
            ],
        );
        let b = cache_key(
            "x",
            "d",
            &[
                (PathBuf::from("a.rs"), "ha".into()),
                (PathBuf::from("b.rs"), "hb".into()),
            ],
        );
        assert_eq!(a, b);
    }
}

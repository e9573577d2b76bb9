//! File record: the immutable root of every per-file analysis result.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Language tag, detected from file extension. Carries the `.cs` entry from
/// `spec.md` §6's extension table even though it falls outside the ten
/// languages named in §1 — treated as a recognized-but-best-effort tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    Go,
    Rust,
    Python,
    TypeScript,
    Tsx,
    JavaScript,
    Jsx,
    Java,
    C,
    Cpp,
    CSharp,
    Ruby,
    Php,
}

impl Language {
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        Some(match ext.as_str() {
            "go" => Language::Go,
            "rs" => Language::Rust,
            "py" => Language::Python,
            "ts" => Language::TypeScript,
            "tsx" => Language::Tsx,
            "js" => Language::JavaScript,
            "jsx" => Language::Jsx,
            "java" => Language::Java,
            "c" | "h" => Language::C,
            "cpp" | "cc" | "hpp" => Language::Cpp,
            "cs" => Language::CSharp,
            "rb" => Language::Ruby,
            "php" => Language::Php,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Python => "python",
            Language::TypeScript => "typescript",
            Language::Tsx => "tsx",
            Language::JavaScript => "javascript",
            Language::Jsx => "jsx",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::CSharp => "csharp",
            Language::Ruby => "ruby",
            Language::Php => "php",
        }
    }

    /// Whether a path looks like a test file under this language's
    /// conventions (`spec.md` §4.2, function boundary extraction).
    pub fn is_test_path(path: &Path) -> bool {
        let s = path.to_string_lossy();
        let stem_is_test = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| stem.ends_with("_test") || stem.starts_with("test_"));
        stem_is_test
            || s.contains("/tests/")
            || s.contains("/__tests__/")
            || s.contains("/spec/")
            || s.ends_with(".test.ts")
            || s.ends_with(".test.tsx")
            || s.ends_with(".test.js")
            || s.ends_with(".spec.ts")
            || s.ends_with(".spec.js")
    }
}

/// Created once per file on scan. Never mutated after creation within a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub language: Language,
    pub size_bytes: u64,
    /// BLAKE3 content hash, hex-encoded.
    pub content_hash: String,
}

impl FileRecord {
    pub fn new(path: PathBuf, language: Language, bytes: &[u8]) -> Self {
        let hash = blake3::hash(bytes);
        Self {
            path,
            language,
            size_bytes: bytes.len() as u64,
            content_hash: hash.to_hex().to_string(),
        }
    }
}

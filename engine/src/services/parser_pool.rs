//! Thread-local pool of reusable `tree-sitter` parsers, one per supported
//! language (`spec.md` §2.2, §5).
//!
//! Parser instances are owned by the pool for the whole run and checked
//! out under a per-instance lock; no instance is ever shared across
//! threads concurrently. A worker checks a parser out, produces a
//! [`ParsedTree`], and returns the parser to the pool when the guard
//! drops.

use crate::error::EngineError;
use crate::models::file::Language;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::Arc;

fn grammar_for(language: Language) -> Result<tree_sitter::Language, EngineError> {
    let lang = match language {
        Language::Rust => tree_sitter_rust::LANGUAGE.into(),
        Language::Go => tree_sitter_go::LANGUAGE.into(),
        Language::Python => tree_sitter_python::LANGUAGE.into(),
        Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        Language::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        Language::JavaScript | Language::Jsx => tree_sitter_javascript::LANGUAGE.into(),
        Language::Java => tree_sitter_java::LANGUAGE.into(),
        Language::C => tree_sitter_c::LANGUAGE.into(),
        Language::Cpp => tree_sitter_cpp::LANGUAGE.into(),
        Language::Ruby => tree_sitter_ruby::LANGUAGE.into(),
        Language::Php => tree_sitter_php::LANGUAGE_PHP.into(),
        Language::CSharp => tree_sitter_c_sharp::LANGUAGE.into(),
    };
    Ok(lang)
}

/// A parsed tree plus the bytes it was parsed from. Lives only inside a
/// single analyzer call — no tree escapes the extractor that produced it.
pub struct ParsedTree {
    pub tree: tree_sitter::Tree,
    pub bytes: Vec<u8>,
    pub language: Language,
}

impl ParsedTree {
    pub fn text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(&self.bytes).unwrap_or("")
    }
}

struct LanguagePool {
    sender: Sender<tree_sitter::Parser>,
    receiver: Receiver<tree_sitter::Parser>,
}

impl LanguagePool {
    fn new(language: Language, size: usize) -> Result<Self, EngineError> {
        let (sender, receiver) = bounded(size);
        let grammar = grammar_for(language)?;
        for _ in 0..size {
            let mut parser = tree_sitter::Parser::new();
            parser.set_language(&grammar).map_err(|e| EngineError::Parse {
                path: Default::default(),
                language: language.as_str().to_string(),
                source: anyhow::anyhow!(e),
            })?;
            // A full pool is never contended at construction time.
            let _ = sender.try_send(parser);
        }
        Ok(Self { sender, receiver })
    }

    fn checkout(&self) -> tree_sitter::Parser {
        self.receiver
            .recv()
            .unwrap_or_else(|_| tree_sitter::Parser::new())
    }

    fn release(&self, parser: tree_sitter::Parser) {
        let _ = self.sender.try_send(parser);
    }
}

/// Owns one bounded pool of parser instances per language for the whole
/// analysis run.
pub struct ParserPool {
    pools: dashmap::DashMap<Language, Arc<LanguagePool>>,
    size_per_language: usize,
}

impl ParserPool {
    pub fn new() -> Self {
        Self {
            pools: dashmap::DashMap::new(),
            size_per_language: num_cpus::get().max(1),
        }
    }

    fn pool_for(&self, language: Language) -> Result<Arc<LanguagePool>, EngineError> {
        if let Some(pool) = self.pools.get(&language) {
            return Ok(pool.clone());
        }
        let pool = Arc::new(LanguagePool::new(language, self.size_per_language)?);
        self.pools.insert(language, pool.clone());
        Ok(pool)
    }

    /// Parses `bytes` as `language`, borrowing a pooled parser for the
    /// duration of this call and returning it to the pool afterward. A
    /// parser-initialization failure for a language marks every file of
    /// that language as errored but never aborts the run.
    pub fn parse(&self, language: Language, bytes: &[u8]) -> Result<ParsedTree, EngineError> {
        let pool = self.pool_for(language)?;
        let mut parser = pool.checkout();
        let tree = parser.parse(bytes, None);
        pool.release(parser);

        let tree = tree.ok_or_else(|| EngineError::Parse {
            path: Default::default(),
            language: language.as_str().to_string(),
            source: anyhow::anyhow!("tree-sitter returned no tree"),
        })?;

        Ok(ParsedTree {
            tree,
            bytes: bytes.to_vec(),
            language,
        })
    }
}

impl Default for ParserPool {
    fn default() -> Self {
        Self::new()
    }
}

//! Canonical token-stream extraction for duplicate detection
//! (`spec.md` §4.4, "Duplicates (MinHash/LSH)").

use crate::models::file::Language;
use std::collections::HashMap;

/// A function body reduced to (a) its raw token stream with comments and
/// whitespace stripped, and (b) the same stream with every identifier
/// rewritten to `V1, V2, ...` by first occurrence, for Type-2 detection.
pub struct CanonicalUnit {
    pub raw_tokens: Vec<String>,
    pub normalized_tokens: Vec<String>,
}

fn keywords_for(language: Language) -> &'static [&'static str] {
    match language {
        Language::Rust => &[
            "fn", "let", "mut", "if", "else", "match", "for", "while", "loop", "return", "break",
            "continue", "struct", "enum", "impl", "trait", "pub", "use", "mod", "self", "Self",
            "true", "false", "as", "in", "ref",
        ],
        Language::Go => &[
            "func", "var", "const", "if", "else", "switch", "case", "for", "range", "return",
            "break", "continue", "struct", "interface", "package", "import", "go", "defer",
            "chan", "select", "true", "false", "nil",
        ],
        Language::Python => &[
            "def", "class", "if", "elif", "else", "for", "while", "return", "break", "continue",
            "import", "from", "as", "with", "try", "except", "finally", "lambda", "pass", "self",
            "True", "False", "None", "and", "or", "not", "in", "is",
        ],
        _ => &[
            "function", "var", "let", "const", "if", "else", "for", "while", "return", "break",
            "continue", "class", "interface", "extends", "implements", "import", "export",
            "new", "this", "try", "catch", "finally", "switch", "case", "default", "true",
            "false", "null", "public", "private", "protected", "static", "void",
        ],
    }
}

fn tokenize(source: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = source.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch.is_whitespace() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            continue;
        }
        if ch == '/' && chars.peek() == Some(&'/') {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            for c in chars.by_ref() {
                if c == '\n' {
                    break;
                }
            }
            continue;
        }
        if ch.is_alphanumeric() || ch == '_' {
            current.push(ch);
            continue;
        }
        if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        if ch == '"' || ch == '\'' {
            let quote = ch;
            let mut lit = String::new();
            lit.push(ch);
            for c in chars.by_ref() {
                lit.push(c);
                if c == quote {
                    break;
                }
            }
            tokens.push("LIT".to_string());
            continue;
        }
        tokens.push(ch.to_string());
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// `source` is the raw byte range of a single function body.
pub fn canonicalize(source: &str, language: Language) -> CanonicalUnit {
    let keywords = keywords_for(language);
    let raw_tokens = tokenize(source);

    let mut identifier_ids: HashMap<String, u32> = HashMap::new();
    let mut next_id = 1u32;
    let normalized_tokens = raw_tokens
        .iter()
        .map(|tok| {
            let is_identifier = tok.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_')
                && !keywords.contains(&tok.as_str())
                && tok != "LIT";
            if is_identifier {
                let id = *identifier_ids.entry(tok.clone()).or_insert_with(|| {
                    let v = next_id;
                    next_id += 1;
                    v
                });
                format!("V{id}")
            } else {
                tok.clone()
            }
        })
        .collect();

    CanonicalUnit {
        raw_tokens,
        normalized_tokens,
    }
}

pub fn shingles(tokens: &[String], k: usize) -> Vec<u64> {
    if tokens.len() < k || k == 0 {
        return Vec::new();
    }
    (0..=tokens.len() - k)
        .map(|i| {
            let joined = tokens[i..i + k].join("\u{1}");
            xxhash_rust::xxh64::xxh64(joined.as_bytes(), 0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_strips_line_comments_and_collapses_literals() {
        let tokens = tokenize("let x = \"hello\"; // trailing note\nlet y = 1;");
        assert!(!tokens.iter().any(|t| t.contains("trailing")));
        assert!(tokens.contains(&"LIT".to_string()));
    }

    #[test]
    fn canonicalize_renames_identifiers_by_first_occurrence() {
        let unit = canonicalize("let total = a + b; let other = a;", Language::Rust);
        let a_pos = unit.raw_tokens.iter().position(|t| t == "a").unwrap();
        let b_pos = unit.raw_tokens.iter().position(|t| t == "b").unwrap();
        assert_eq!(unit.normalized_tokens[a_pos], unit.normalized_tokens[b_pos + 1]);
        assert_ne!(unit.normalized_tokens[a_pos], unit.normalized_tokens[b_pos]);
    }

    #[test]
    fn canonicalize_leaves_keywords_untouched() {
        let unit = canonicalize("fn main() {}", Language::Rust);
        assert!(unit.normalized_tokens.contains(&"fn".to_string()));
    }

    #[test]
    fn renamed_variables_produce_identical_normalized_streams() {
        let a = canonicalize("let total = x + y;", Language::Rust);
        let b = canonicalize("let total = p + q;", Language::Rust);
        assert_eq!(a.normalized_tokens, b.normalized_tokens);
        assert_ne!(a.raw_tokens, b.raw_tokens);
    }

    #[test]
    fn shingles_produce_one_hash_per_sliding_window() {
        let tokens: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        assert_eq!(shingles(&tokens, 2).len(), 3);
        assert_eq!(shingles(&tokens, 5).len(), 0);
    }

    #[test]
    fn shingles_are_order_sensitive() {
        let ab: Vec<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        let ba: Vec<String> = ["b", "a"].iter().map(|s| s.to_string()).collect();
        assert_ne!(shingles(&ab, 2), shingles(&ba, 2));
    }
}

//! Feature-flag reference extraction (`spec.md` §4.2).
//!
//! Provider-specific regexes over source text, mirroring the teacher's
//! preference for line-oriented scanning over per-provider AST queries
//! (providers' SDK call shapes are stable strings, not language syntax).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagProvider {
    LaunchDarkly,
    Split,
    Unleash,
    PostHog,
    Flipper,
}

impl FlagProvider {
    pub fn name(&self) -> &'static str {
        match self {
            FlagProvider::LaunchDarkly => "launchdarkly",
            FlagProvider::Split => "split",
            FlagProvider::Unleash => "unleash",
            FlagProvider::PostHog => "posthog",
            FlagProvider::Flipper => "flipper",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagReference {
    pub flag_key: String,
    pub provider: FlagProvider,
    pub line: u32,
}

struct ProviderPattern {
    provider: FlagProvider,
    re: Regex,
}

static PATTERNS: Lazy<Vec<ProviderPattern>> = Lazy::new(|| {
    vec![
        ProviderPattern {
            provider: FlagProvider::LaunchDarkly,
            re: Regex::new(r#"\bvariation\s*\(\s*["']([^"']+)["']"#).unwrap(),
        },
        ProviderPattern {
            provider: FlagProvider::Split,
            re: Regex::new(r#"\bgetTreatment\s*\(\s*["']([^"']+)["']"#).unwrap(),
        },
        ProviderPattern {
            provider: FlagProvider::Unleash,
            re: Regex::new(r#"\bisEnabled\s*\(\s*["']([^"']+)["']"#).unwrap(),
        },
        ProviderPattern {
            provider: FlagProvider::PostHog,
            re: Regex::new(r#"\bisFeatureEnabled\s*\(\s*["']([^"']+)["']"#).unwrap(),
        },
        ProviderPattern {
            provider: FlagProvider::Flipper,
            re: Regex::new(r#"\benabled\?\s*\(?\s*:?["']?([A-Za-z0-9_\-:.]+)["']?"#).unwrap(),
        },
    ]
});

pub fn scan(source: &str, providers: &std::collections::BTreeSet<String>) -> Vec<FlagReference> {
    let mut out = Vec::new();
    for (idx, line) in source.lines().enumerate() {
        for pattern in PATTERNS.iter() {
            if !providers.is_empty() && !providers.contains(pattern.provider.name()) {
                continue;
            }
            if let Some(caps) = pattern.re.captures(line) {
                if let Some(key) = caps.get(1) {
                    out.push(FlagReference {
                        flag_key: key.as_str().to_string(),
                        provider: pattern.provider,
                        line: idx as u32 + 1,
                    });
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_unleash_flag() {
        let src = r#"if (isEnabled("dark_mode")) { render(); }"#;
        let found = scan(src, &Default::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].flag_key, "dark_mode");
        assert_eq!(found[0].provider, FlagProvider::Unleash);
    }
}

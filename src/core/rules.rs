//! Include / exclude / declude token filtering.
//!
//! Rules are evaluated per token, first match wins:
//!
//! 1. include (exact, prefix, suffix, contains, pattern) keeps the token;
//! 2. exclude (same five kinds) drops it;
//! 3. declude drops an affixed form only when its bare form is also present
//!    in the full token-text set of the document;
//! 4. anything else is kept.
//!
//! Patterns use full-string semantics and are compiled once. A pattern that
//! fails to compile is skipped with a warning; the remaining rules still apply.
//!
//! Rule lists can be given in-line or loaded from a JSON side file:
//!
//! ```json
//! { "exclude_prefix": ["的"], "include_prefix": ["的确"], "declude_suffix": ["的"] }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use regex::Regex;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::token::Token;

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Rule file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid rule definition: {0}")]
    Json(#[from] serde_json::Error),
}

/// Resolved rule lists as supplied by a rule source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleConfig {
    pub exclude_exact: Vec<String>,
    pub exclude_prefix: Vec<String>,
    pub exclude_suffix: Vec<String>,
    pub exclude_contains: Vec<String>,
    pub exclude_pattern: Vec<String>,
    pub include_exact: Vec<String>,
    pub include_prefix: Vec<String>,
    pub include_suffix: Vec<String>,
    pub include_contains: Vec<String>,
    pub include_pattern: Vec<String>,
    pub declude_prefix: Vec<String>,
    pub declude_suffix: Vec<String>,
}

impl RuleConfig {
    pub fn from_json(json: &str) -> Result<Self, RuleError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RuleError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| RuleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// Where a tokenizer's rules come from.
#[derive(Debug, Clone, Default)]
pub enum RuleSource {
    #[default]
    None,
    Inline(RuleConfig),
    /// JSON side file, read once at construction.
    File(PathBuf),
}

impl RuleSource {
    pub fn resolve(&self) -> Result<RuleSet, RuleError> {
        match self {
            RuleSource::None => Ok(RuleSet::default()),
            RuleSource::Inline(config) => Ok(RuleSet::compile(config)),
            RuleSource::File(path) => Ok(RuleSet::compile(&RuleConfig::from_file(path)?)),
        }
    }
}

/// One group of the five match kinds.
#[derive(Debug, Clone, Default)]
struct Matchers {
    exact: FxHashSet<String>,
    prefix: Vec<String>,
    suffix: Vec<String>,
    contains: Vec<String>,
    patterns: Vec<Regex>,
}

impl Matchers {
    fn compile(
        exact: &[String],
        prefix: &[String],
        suffix: &[String],
        contains: &[String],
        patterns: &[String],
    ) -> Self {
        Self {
            exact: exact.iter().cloned().collect(),
            prefix: prefix.to_vec(),
            suffix: suffix.to_vec(),
            contains: contains.to_vec(),
            patterns: patterns.iter().filter_map(|p| compile_full_match(p)).collect(),
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.exact.contains(text)
            || self.prefix.iter().any(|p| text.starts_with(p.as_str()))
            || self.suffix.iter().any(|s| text.ends_with(s.as_str()))
            || self.contains.iter().any(|c| text.contains(c.as_str()))
            || self.patterns.iter().any(|r| r.is_match(text))
    }

    fn is_empty(&self) -> bool {
        self.exact.is_empty()
            && self.prefix.is_empty()
            && self.suffix.is_empty()
            && self.contains.is_empty()
            && self.patterns.is_empty()
    }
}

fn compile_full_match(pattern: &str) -> Option<Regex> {
    match Regex::new(&format!("^(?:{pattern})$")) {
        Ok(regex) => Some(regex),
        Err(e) => {
            warn!("skipping invalid rule pattern {pattern:?}: {e}");
            None
        }
    }
}

/// Compiled rule set.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    include: Matchers,
    exclude: Matchers,
    declude_prefix: Vec<String>,
    declude_suffix: Vec<String>,
}

impl RuleSet {
    pub fn compile(config: &RuleConfig) -> Self {
        Self {
            include: Matchers::compile(
                &config.include_exact,
                &config.include_prefix,
                &config.include_suffix,
                &config.include_contains,
                &config.include_pattern,
            ),
            exclude: Matchers::compile(
                &config.exclude_exact,
                &config.exclude_prefix,
                &config.exclude_suffix,
                &config.exclude_contains,
                &config.exclude_pattern,
            ),
            declude_prefix: config.declude_prefix.clone(),
            declude_suffix: config.declude_suffix.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty() && !self.needs_context()
    }

    /// Declude rules need the document's full token-text set.
    pub fn needs_context(&self) -> bool {
        !self.declude_prefix.is_empty() || !self.declude_suffix.is_empty()
    }

    /// Decide whether `text` is dropped, given the texts of every token of the document.
    pub fn should_exclude(&self, text: &str, context: &FxHashSet<&str>) -> bool {
        if self.include.matches(text) {
            return false;
        }
        if self.exclude.matches(text) {
            return true;
        }

        let bare_prefix = self.declude_prefix.iter().any(|p| {
            text.len() > p.len()
                && text.starts_with(p.as_str())
                && context.contains(&text[p.len()..])
        });
        if bare_prefix {
            return true;
        }

        self.declude_suffix.iter().any(|s| {
            text.len() > s.len()
                && text.ends_with(s.as_str())
                && context.contains(&text[..text.len() - s.len()])
        })
    }

    /// Filter a complete token list. The context set is built from every
    /// token passed in, so this must run after all producers finished.
    pub fn filter(&self, tokens: Vec<Token>) -> Vec<Token> {
        if self.is_empty() {
            return tokens;
        }

        let keep: Vec<bool> = {
            let context: FxHashSet<&str> = if self.needs_context() {
                tokens.iter().map(|t| t.text.as_str()).collect()
            } else {
                FxHashSet::default()
            };
            tokens
                .iter()
                .map(|t| !self.should_exclude(&t.text, &context))
                .collect()
        };

        tokens
            .into_iter()
            .zip(keep)
            .filter_map(|(t, keep)| keep.then_some(t))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::token::TokenType;

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn empty() -> FxHashSet<&'static str> {
        FxHashSet::default()
    }

    #[test]
    fn test_include_beats_exclude() {
        let rules = RuleSet::compile(&RuleConfig {
            exclude_prefix: strings(&["的"]),
            include_prefix: strings(&["的确"]),
            ..Default::default()
        });
        assert!(!rules.should_exclude("的确如此", &empty()));
        assert!(rules.should_exclude("的人", &empty()));
        assert!(rules.should_exclude("的", &empty()));
        assert!(!rules.should_exclude("人的", &empty()));
    }

    #[test]
    fn test_all_exclude_kinds() {
        let rules = RuleSet::compile(&RuleConfig {
            exclude_exact: strings(&["the"]),
            exclude_suffix: strings(&["ly"]),
            exclude_contains: strings(&["xx"]),
            exclude_pattern: strings(&[r"\d+"]),
            ..Default::default()
        });
        assert!(rules.should_exclude("the", &empty()));
        assert!(!rules.should_exclude("then", &empty()));
        assert!(rules.should_exclude("quickly", &empty()));
        assert!(rules.should_exclude("axxb", &empty()));
        assert!(rules.should_exclude("2024", &empty()));
        // full-match, not search
        assert!(!rules.should_exclude("v2", &empty()));
    }

    #[test]
    fn test_include_pattern_and_exact() {
        let rules = RuleSet::compile(&RuleConfig {
            exclude_pattern: strings(&[".*"]),
            include_exact: strings(&["keep"]),
            include_suffix: strings(&["ing"]),
            include_contains: strings(&["mid"]),
            include_pattern: strings(&["[a-z]+[0-9]"]),
            ..Default::default()
        });
        assert!(!rules.should_exclude("keep", &empty()));
        assert!(!rules.should_exclude("running", &empty()));
        assert!(!rules.should_exclude("amidst", &empty()));
        assert!(!rules.should_exclude("abc1", &empty()));
        assert!(rules.should_exclude("abc12", &empty()));
    }

    #[test]
    fn test_invalid_pattern_is_skipped() {
        let rules = RuleSet::compile(&RuleConfig {
            exclude_pattern: strings(&["(unclosed", "bad.*"]),
            ..Default::default()
        });
        assert!(rules.should_exclude("badly", &empty()));
        assert!(!rules.should_exclude("(unclosed", &empty()));
    }

    #[test]
    fn test_declude_suffix_needs_bare_form() {
        let rules = RuleSet::compile(&RuleConfig {
            declude_suffix: strings(&["的"]),
            ..Default::default()
        });
        let both: FxHashSet<&str> = ["安静", "安静的"].into_iter().collect();
        assert!(rules.should_exclude("安静的", &both));
        assert!(!rules.should_exclude("安静", &both));

        let alone: FxHashSet<&str> = ["安静的"].into_iter().collect();
        assert!(!rules.should_exclude("安静的", &alone));
        // the affix alone is never decluded
        let with_empty: FxHashSet<&str> = ["的", ""].into_iter().collect();
        assert!(!rules.should_exclude("的", &with_empty));
    }

    #[test]
    fn test_declude_prefix() {
        let rules = RuleSet::compile(&RuleConfig {
            declude_prefix: strings(&["un"]),
            ..Default::default()
        });
        let ctx: FxHashSet<&str> = ["happy", "unhappy", "unknown"].into_iter().collect();
        assert!(rules.should_exclude("unhappy", &ctx));
        assert!(!rules.should_exclude("unknown", &ctx));
    }

    #[test]
    fn test_filter_uses_full_token_set() {
        let rules = RuleSet::compile(&RuleConfig {
            declude_suffix: strings(&["的"]),
            ..Default::default()
        });
        let tokens = vec![
            Token::new("安静的", 0, 3, TokenType::Vcgram),
            Token::new("安静", 0, 2, TokenType::Vocab),
            Token::new("的", 2, 3, TokenType::Cjk),
        ];
        let kept: Vec<String> = rules.filter(tokens).into_iter().map(|t| t.text).collect();
        assert_eq!(kept, vec!["安静", "的"]);
    }

    #[test]
    fn test_empty_rules_keep_everything() {
        let rules = RuleSet::default();
        assert!(rules.is_empty());
        let tokens = vec![Token::new("x", 0, 1, TokenType::Eng)];
        assert_eq!(rules.filter(tokens.clone()), tokens);
    }

    #[test]
    fn test_rule_config_from_json() {
        let config =
            RuleConfig::from_json(r#"{"exclude_prefix": ["的"], "declude_suffix": ["们"]}"#)
                .unwrap();
        assert_eq!(config.exclude_prefix, strings(&["的"]));
        assert_eq!(config.declude_suffix, strings(&["们"]));
        assert!(config.include_exact.is_empty());

        assert!(RuleConfig::from_json(r#"{"exclude_sometimes": []}"#).is_err());
    }
}

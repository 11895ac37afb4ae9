//! Analyzer configuration.
//!
//! An [`AnalyzerConfig`] is immutable once built. Invalid combinations are
//! rejected by [`AnalyzerConfigBuilder::build`] so an analyzer can never be
//! constructed in a silently degraded state.

use std::hash::Hasher;
use std::path::PathBuf;
use std::sync::Arc;

use rustc_hash::{FxHashSet, FxHasher};

use super::ngram::NgramFamilies;
use super::rules::{RuleConfig, RuleSource};
use super::token::TokenType;
use super::tokenizer::AnalyzerError;
use super::vocab::VocabSource;

/// Settings of one analyzer instance.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    use_vocab: bool,
    use_categ: bool,
    split_word: bool,
    case_sensitive: bool,
    vocabulary: VocabSource,
    ngrams: NgramFamilies,
    rules: RuleSource,
    excluded_types: FxHashSet<TokenType>,
}

impl AnalyzerConfig {
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder::default()
    }

    pub fn use_vocab(&self) -> bool {
        self.use_vocab
    }

    pub fn use_categ(&self) -> bool {
        self.use_categ
    }

    pub fn split_word(&self) -> bool {
        self.split_word
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn vocabulary(&self) -> &VocabSource {
        &self.vocabulary
    }

    pub fn ngrams(&self) -> NgramFamilies {
        self.ngrams
    }

    pub fn rules(&self) -> &RuleSource {
        &self.rules
    }

    pub fn excluded_types(&self) -> &FxHashSet<TokenType> {
        &self.excluded_types
    }

    /// Hash of the settings that shape a loaded vocabulary.
    ///
    /// Case sensitivity only affects the automaton, which is keyed on it
    /// separately, so it is not part of the fingerprint.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.vocabulary.describe(&mut hasher);
        hasher.finish()
    }
}

/// Builder for [`AnalyzerConfig`].
#[derive(Debug, Clone)]
pub struct AnalyzerConfigBuilder {
    use_vocab: bool,
    use_categ: bool,
    split_word: bool,
    case_sensitive: bool,
    vocabulary: VocabSource,
    ngrams: NgramFamilies,
    rules: RuleSource,
    excluded_types: FxHashSet<TokenType>,
}

impl Default for AnalyzerConfigBuilder {
    fn default() -> Self {
        Self {
            use_vocab: false,
            use_categ: true,
            split_word: false,
            case_sensitive: false,
            vocabulary: VocabSource::None,
            ngrams: NgramFamilies::none(),
            rules: RuleSource::None,
            excluded_types: FxHashSet::default(),
        }
    }
}

impl AnalyzerConfigBuilder {
    pub fn use_vocab(mut self, on: bool) -> Self {
        self.use_vocab = on;
        self
    }

    pub fn use_categ(mut self, on: bool) -> Self {
        self.use_categ = on;
        self
    }

    pub fn split_word(mut self, on: bool) -> Self {
        self.split_word = on;
        self
    }

    pub fn case_sensitive(mut self, on: bool) -> Self {
        self.case_sensitive = on;
        self
    }

    pub fn vocabulary(mut self, source: VocabSource) -> Self {
        self.vocabulary = source;
        self
    }

    /// In-line dictionary; also enables the vocabulary producer.
    pub fn vocab_words<I, S>(self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.use_vocab(true)
            .vocabulary(VocabSource::Inline(words.into_iter().map(Into::into).collect()))
    }

    /// Flat-file dictionary; also enables the vocabulary producer.
    pub fn vocab_file(self, path: impl Into<PathBuf>) -> Self {
        self.use_vocab(true)
            .vocabulary(VocabSource::File(path.into()))
    }

    /// Shared, already loaded dictionary; also enables the vocabulary producer.
    pub fn vocab_cached(self, words: Arc<Vec<String>>) -> Self {
        self.use_vocab(true).vocabulary(VocabSource::Cached(words))
    }

    pub fn ngrams(mut self, families: NgramFamilies) -> Self {
        self.ngrams = families;
        self
    }

    pub fn bigram(mut self, on: bool) -> Self {
        self.ngrams.bigram = on;
        self
    }

    pub fn vbgram(mut self, on: bool) -> Self {
        self.ngrams.vbgram = on;
        self
    }

    pub fn vcgram(mut self, on: bool) -> Self {
        self.ngrams.vcgram = on;
        self
    }

    pub fn rules(mut self, source: RuleSource) -> Self {
        self.rules = source;
        self
    }

    pub fn rule_config(self, config: RuleConfig) -> Self {
        self.rules(RuleSource::Inline(config))
    }

    pub fn rule_file(self, path: impl Into<PathBuf>) -> Self {
        self.rules(RuleSource::File(path.into()))
    }

    /// Drop every token of this type from the output.
    pub fn exclude_type(mut self, kind: TokenType) -> Self {
        self.excluded_types.insert(kind);
        self
    }

    pub fn build(self) -> Result<AnalyzerConfig, AnalyzerError> {
        if !self.use_vocab && !self.use_categ {
            return Err(AnalyzerError::NoProducer);
        }
        if self.use_vocab && self.vocabulary.is_none() {
            return Err(AnalyzerError::MissingVocabulary);
        }

        Ok(AnalyzerConfig {
            use_vocab: self.use_vocab,
            use_categ: self.use_categ,
            split_word: self.split_word,
            case_sensitive: self.case_sensitive,
            vocabulary: self.vocabulary,
            ngrams: self.ngrams,
            rules: self.rules,
            excluded_types: self.excluded_types,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::builder().build().unwrap();
        assert!(config.use_categ());
        assert!(!config.use_vocab());
        assert!(!config.case_sensitive());
        assert!(config.ngrams().is_empty());
        assert!(config.excluded_types().is_empty());
    }

    #[test]
    fn test_no_producer_is_rejected() {
        let err = AnalyzerConfig::builder().use_categ(false).build();
        assert!(matches!(err, Err(AnalyzerError::NoProducer)));
    }

    #[test]
    fn test_vocab_without_source_is_rejected() {
        let err = AnalyzerConfig::builder().use_vocab(true).build();
        assert!(matches!(err, Err(AnalyzerError::MissingVocabulary)));
    }

    #[test]
    fn test_vocab_words_enables_vocab() {
        let config = AnalyzerConfig::builder()
            .use_categ(false)
            .vocab_words(["gpt"])
            .build()
            .unwrap();
        assert!(config.use_vocab());
        assert!(matches!(config.vocabulary(), VocabSource::Inline(w) if w == &["gpt".to_string()]));
    }

    #[test]
    fn test_fingerprint_tracks_vocab_settings() {
        let a = AnalyzerConfig::builder()
            .vocab_file("/tmp/a.dic")
            .build()
            .unwrap();
        let b = AnalyzerConfig::builder()
            .vocab_file("/tmp/a.dic")
            .bigram(true)
            .build()
            .unwrap();
        let c = AnalyzerConfig::builder()
            .vocab_file("/tmp/a.dic")
            .case_sensitive(true)
            .build()
            .unwrap();
        let d = AnalyzerConfig::builder()
            .vocab_file("/tmp/b.dic")
            .build()
            .unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint(), c.fingerprint());
        assert_ne!(a.fingerprint(), d.fingerprint());
    }
}

use log::debug;
use rayon::prelude::*;
use thiserror::Error;

use super::categorizer::Categorizer;
use super::config::AnalyzerConfig;
use super::matcher::VocabMatcher;
use super::merger::{merge, renumber, sort_stream};
use super::ngram::NgramSynthesizer;
use super::resources::SharedResources;
use super::rules::{RuleError, RuleSet};
use super::token::{CharText, Token, TokenGroup};
use super::vocab::VocabError;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("No token producer enabled: enable the vocabulary matcher or the categorizer")]
    NoProducer,
    #[error("Vocabulary matcher enabled without a vocabulary source")]
    MissingVocabulary,
    #[error("Vocabulary error: {0}")]
    VocabError(#[from] VocabError),
    #[error("Rule error: {0}")]
    RuleError(#[from] RuleError),
    #[error("Aho-Corasick build error: {0}")]
    AhoCorasickError(#[from] aho_corasick::BuildError),
}

/// Base token producers, selected by configuration.
#[derive(Debug, Clone)]
pub enum TokenProducer {
    Categorizer(Categorizer),
    Vocabulary(VocabMatcher),
}

impl TokenProducer {
    pub fn group(&self) -> TokenGroup {
        match self {
            TokenProducer::Categorizer(_) => TokenGroup::Categ,
            TokenProducer::Vocabulary(_) => TokenGroup::Vocab,
        }
    }

    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        self.tokenize_text(&CharText::new(text))
    }

    fn tokenize_text(&self, doc: &CharText<'_>) -> Vec<Token> {
        match self {
            TokenProducer::Categorizer(categorizer) => categorizer.tokenize_chars(&doc.chars),
            TokenProducer::Vocabulary(matcher) => matcher.tokenize_text(doc),
        }
    }
}

/// Layered search tokenizer.
///
/// An analyzer runs the configured producers over a document, merges their
/// output, synthesizes n-grams and filters the result through the rule set.
///
/// # Pipeline
///
/// ```text
/// text ─┬─ categorizer ──┐
///       └─ vocabulary ───┴─ merge ─ n-grams ─ rules ─ type drop ─ positions
/// ```
///
/// Analyzing a document never fails once the analyzer is built and keeps no
/// state between calls, so one analyzer can serve many threads.
///
/// # Parallelism
///
/// - **Single document**: [`analyze`](Self::analyze) runs sequentially.
/// - **Batches**: [`analyze_batch`](Self::analyze_batch) parallelizes across
///   documents with Rayon.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalyzerConfig,
    producers: Vec<TokenProducer>,
    synthesizer: NgramSynthesizer,
    rules: RuleSet,
    vocab_len: usize,
}

impl Analyzer {
    /// Build an analyzer, resolving its dictionary and rules.
    ///
    /// The dictionary automaton is fetched from (or built into) the shared
    /// registry of `resources`.
    pub fn new(config: AnalyzerConfig, resources: &SharedResources) -> Result<Self, AnalyzerError> {
        let mut producers = Vec::with_capacity(2);
        let mut vocab_len = 0;

        if config.use_vocab() {
            let words = resources.resolve_vocabulary(config.vocabulary(), config.fingerprint())?;
            let automaton = resources
                .registry()
                .get_or_build(&words, config.case_sensitive())?;
            vocab_len = automaton.len();
            producers.push(TokenProducer::Vocabulary(VocabMatcher::new(automaton)));
        }
        if config.use_categ() {
            producers.push(TokenProducer::Categorizer(Categorizer::new(
                config.split_word(),
            )));
        }

        let rules = config.rules().resolve()?;
        let synthesizer = NgramSynthesizer::new(config.ngrams());

        debug!(
            "analyzer ready: {} producers, {} vocabulary patterns, ngrams {:?}",
            producers.len(),
            vocab_len,
            config.ngrams()
        );

        Ok(Self {
            config,
            producers,
            synthesizer,
            rules,
            vocab_len,
        })
    }

    /// Tokenize one document into the final, position-numbered stream.
    pub fn analyze(&self, text: &str) -> Vec<Token> {
        let doc = CharText::new(text);

        let mut categ = Vec::new();
        let mut vocab = Vec::new();
        for producer in &self.producers {
            let tokens = producer.tokenize_text(&doc);
            match producer.group() {
                TokenGroup::Vocab => vocab = tokens,
                _ => categ = tokens,
            }
        }

        let merged = merge(categ, vocab);
        let synthesized = self.synthesizer.synthesize(&merged);

        let mut tokens = merged;
        tokens.extend(synthesized);
        sort_stream(&mut tokens);

        let mut tokens = self.rules.filter(tokens);
        let excluded = self.config.excluded_types();
        if !excluded.is_empty() {
            tokens.retain(|t| !excluded.contains(&t.kind));
        }

        renumber(tokens)
    }

    /// Analyze multiple documents in parallel.
    pub fn analyze_batch(&self, texts: &[String]) -> Vec<Vec<Token>> {
        texts.par_iter().map(|text| self.analyze(text)).collect()
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn producers(&self) -> &[TokenProducer] {
        &self.producers
    }

    /// Number of distinct dictionary patterns in use.
    pub fn vocab_len(&self) -> usize {
        self.vocab_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rules::RuleConfig;
    use crate::core::token::TokenType;

    fn make_test_analyzer() -> Analyzer {
        let config = AnalyzerConfig::builder()
            .vocab_words(["gpt", "gpt 1"])
            .build()
            .unwrap();
        Analyzer::new(config, &SharedResources::new()).unwrap()
    }

    #[test]
    fn test_analyze_end_to_end() {
        let analyzer = make_test_analyzer();
        let tokens = analyzer.analyze("chatgpt 12");
        let vocab: Vec<(&str, usize, usize)> = tokens
            .iter()
            .filter(|t| t.group == TokenGroup::Vocab)
            .map(|t| (t.text.as_str(), t.start, t.end))
            .collect();
        assert_eq!(vocab, vec![("gpt", 4, 7)]);
        assert!(tokens.iter().all(|t| t.text != "gpt 1"));
    }

    #[test]
    fn test_positions_follow_stream_order() {
        let analyzer = make_test_analyzer();
        let tokens = analyzer.analyze("chatgpt 12");
        for (i, t) in tokens.iter().enumerate() {
            assert_eq!(t.position, i);
        }
        for pair in tokens.windows(2) {
            assert!(pair[0].start <= pair[1].start);
        }
    }

    #[test]
    fn test_vocab_only() {
        let config = AnalyzerConfig::builder()
            .use_categ(false)
            .vocab_words(["deep learning"])
            .build()
            .unwrap();
        let analyzer = Analyzer::new(config, &SharedResources::new()).unwrap();
        assert_eq!(analyzer.producers().len(), 1);
        let producer = &analyzer.producers()[0];
        assert_eq!(producer.group(), TokenGroup::Vocab);
        assert_eq!(producer.tokenize("deep learning").len(), 2);
        let tokens = analyzer.analyze("deep learning");
        let out: Vec<(&str, TokenType)> = tokens.iter().map(|t| (t.text.as_str(), t.kind)).collect();
        assert_eq!(
            out,
            vec![
                ("deep learning", TokenType::Vocab),
                ("deeplearning", TokenType::VocabConcat)
            ]
        );
    }

    #[test]
    fn test_rules_and_type_exclusion() {
        let config = AnalyzerConfig::builder()
            .exclude_type(TokenType::Ws)
            .rule_config(RuleConfig {
                exclude_exact: vec!["12".into()],
                ..Default::default()
            })
            .build()
            .unwrap();
        let analyzer = Analyzer::new(config, &SharedResources::new()).unwrap();
        let texts: Vec<String> = analyzer
            .analyze("chatgpt 12")
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(texts, vec!["chatgpt"]);
    }

    #[test]
    fn test_batch_matches_sequential() {
        let analyzer = make_test_analyzer();
        let texts = vec!["chatgpt 12".to_string(), "gpt".to_string(), String::new()];
        let batch = analyzer.analyze_batch(&texts);
        assert_eq!(batch.len(), 3);
        for (text, tokens) in texts.iter().zip(&batch) {
            assert_eq!(&analyzer.analyze(text), tokens);
        }
        assert!(batch[2].is_empty());
    }

    #[test]
    fn test_analyzers_share_automaton() {
        let resources = SharedResources::new();
        let config = AnalyzerConfig::builder()
            .vocab_words(["alpha"])
            .build()
            .unwrap();
        let a = Analyzer::new(config.clone(), &resources).unwrap();
        let b = Analyzer::new(config, &resources).unwrap();
        assert_eq!(resources.registry().build_count(), 1);
        assert_eq!(a.vocab_len(), b.vocab_len());
    }
}

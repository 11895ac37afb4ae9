//! Core tokenization engine for layertok.
//!
//! This module contains the layered search tokenizer:
//! - Character-class run detection
//! - Dictionary matching with an Aho-Corasick automaton and boundary heuristics
//! - Adjacency-based n-gram synthesis
//! - Include / exclude / declude rule filtering
//!
//! # Architecture
//!
//! - [`Categorizer`]: splits text into maximal runs of one character class
//! - [`VocabMatcher`]: finds dictionary occurrences, drops word-truncating matches
//!   and emits separator-free variants
//! - [`merge`]: orders the combined stream (vocabulary first at equal offsets)
//! - [`NgramSynthesizer`]: pairs adjacent tokens into `bigram`, `vbgram`, `vcgram`
//! - [`RuleSet`]: prunes the final stream
//! - [`Analyzer`]: runs the whole pipeline for one configuration
//! - [`SharedResources`]: automaton registry, vocabulary file cache and default
//!   dictionary shared between analyzers
//!
//! # Performance
//!
//! - **Shared automata**: one build per distinct dictionary, shared via `Arc`
//! - **Aho-Corasick**: O(N + matches) overlapping search
//! - **FxHashMap/FxHashSet**: fast hashing for rule and context lookups
//! - **Rayon**: parallel batch analysis across documents

mod automaton;
mod categorizer;
mod config;
mod matcher;
mod merger;
mod ngram;
mod resources;
mod rules;
mod token;
mod tokenizer;
mod vocab;

pub use automaton::{AutomatonKey, AutomatonRegistry, VocabAutomaton, DEFAULT_REGISTRY_CAPACITY};
pub use categorizer::{classify, Categorizer, DASH_CHARS, MASK_CHAR};
pub use config::{AnalyzerConfig, AnalyzerConfigBuilder};
pub use matcher::VocabMatcher;
pub use merger::merge;
pub use ngram::{NgramFamilies, NgramSynthesizer};
pub use resources::SharedResources;
pub use rules::{RuleConfig, RuleError, RuleSet, RuleSource};
pub use token::{Token, TokenGroup, TokenType};
pub use tokenizer::{Analyzer, AnalyzerError, TokenProducer};
pub use vocab::{
    load_vocab, load_vocab_file, parse_vocab_entries, DefaultVocabulary, VocabCache, VocabEntry,
    VocabError, VocabSource,
};

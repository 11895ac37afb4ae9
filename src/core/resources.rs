//! Resources shared between analyzers.
//!
//! A host creates one [`SharedResources`] and passes it to every
//! [`Analyzer`](super::Analyzer) it builds. Analyzers with the same dictionary
//! then share one automaton, file-backed dictionaries are read once per
//! change, and the default dictionary is loaded once.

use std::sync::Arc;

use super::automaton::AutomatonRegistry;
use super::vocab::{DefaultVocabulary, VocabCache, VocabError, VocabSource};

#[derive(Default)]
pub struct SharedResources {
    registry: AutomatonRegistry,
    vocab_cache: VocabCache,
    default_vocab: DefaultVocabulary,
}

impl SharedResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_vocabulary(mut self, default_vocab: DefaultVocabulary) -> Self {
        self.default_vocab = default_vocab;
        self
    }

    pub fn with_registry(mut self, registry: AutomatonRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &AutomatonRegistry {
        &self.registry
    }

    pub fn vocab_cache(&self) -> &VocabCache {
        &self.vocab_cache
    }

    pub fn default_vocabulary(&self) -> &DefaultVocabulary {
        &self.default_vocab
    }

    /// Resolve a vocabulary source to its current word list.
    ///
    /// Explicit file references fail on I/O errors; the default dictionary
    /// degrades to an empty list instead.
    pub fn resolve_vocabulary(
        &self,
        source: &VocabSource,
        fingerprint: u64,
    ) -> Result<Arc<Vec<String>>, VocabError> {
        match source {
            VocabSource::None => Ok(Arc::new(Vec::new())),
            VocabSource::Inline(words) => Ok(Arc::new(words.clone())),
            VocabSource::File(path) => self.vocab_cache.get_or_load(path, fingerprint),
            VocabSource::Cached(words) => Ok(Arc::clone(words)),
            VocabSource::Default => Ok(self.default_vocab.get()),
        }
    }
}

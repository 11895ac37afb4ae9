//! Multi-pattern vocabulary automaton and its shared registry.
//!
//! Building an Aho-Corasick automaton over a multi-million entry dictionary is
//! the most expensive thing this crate does, so automata are shared: the
//! [`AutomatonRegistry`] maps a content-derived [`AutomatonKey`] to one
//! immutable [`VocabAutomaton`]. Concurrent first requests for the same key
//! converge on a single build.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use aho_corasick::{AhoCorasick, MatchKind};
use log::debug;
use lru::LruCache;
use once_cell::sync::OnceCell;
use rustc_hash::FxHashSet;

use super::vocab::hash_words;

/// Default number of distinct dictionaries kept by a registry.
pub const DEFAULT_REGISTRY_CAPACITY: usize = 32;

/// Lower-case a char only when its lower-case form is a single char, so that
/// folded text keeps the same char offsets as the original.
#[inline]
pub(crate) fn fold_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

pub(crate) fn fold_case(s: &str) -> String {
    s.chars().map(fold_char).collect()
}

/// Aho-Corasick automaton over a (possibly case-folded) dictionary.
pub struct VocabAutomaton {
    matcher: Option<AhoCorasick>,
    patterns: Vec<String>,
    case_sensitive: bool,
}

impl VocabAutomaton {
    /// Build an automaton over `words`.
    ///
    /// Empty entries are skipped and duplicates (after case folding) collapse
    /// into one pattern, so overlapping search never reports the same span twice.
    pub fn build(words: &[String], case_sensitive: bool) -> Result<Self, aho_corasick::BuildError> {
        let mut seen = FxHashSet::default();
        let mut patterns = Vec::with_capacity(words.len());
        for word in words {
            if word.is_empty() {
                continue;
            }
            let pattern = if case_sensitive {
                word.clone()
            } else {
                fold_case(word)
            };
            if seen.insert(pattern.clone()) {
                patterns.push(pattern);
            }
        }

        let matcher = if patterns.is_empty() {
            None
        } else {
            Some(
                AhoCorasick::builder()
                    .match_kind(MatchKind::Standard)
                    .build(&patterns)?,
            )
        };

        Ok(Self {
            matcher,
            patterns,
            case_sensitive,
        })
    }

    /// Every occurrence of every pattern in `haystack`, including nested and
    /// overlapping ones, as byte spans.
    ///
    /// `haystack` must already be case-folded when the automaton is not case
    /// sensitive.
    pub fn find_overlapping(&self, haystack: &str) -> Vec<(usize, usize)> {
        let Some(ref matcher) = self.matcher else {
            return Vec::new();
        };
        matcher
            .find_overlapping_iter(haystack)
            .map(|m| (m.start(), m.end()))
            .collect()
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Number of distinct patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl std::fmt::Debug for VocabAutomaton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VocabAutomaton")
            .field("patterns", &self.patterns.len())
            .field("case_sensitive", &self.case_sensitive)
            .finish()
    }
}

/// Content-derived identity of a dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AutomatonKey {
    pub len: usize,
    pub hash: u64,
    pub case_sensitive: bool,
}

impl AutomatonKey {
    pub fn new(words: &[String], case_sensitive: bool) -> Self {
        Self {
            len: words.len(),
            hash: hash_words(words),
            case_sensitive,
        }
    }
}

type Slot = Arc<OnceCell<Arc<VocabAutomaton>>>;

/// Thread-safe get-or-create registry of vocabulary automata.
///
/// The map lock only guards slot lookup; the build itself runs inside the
/// slot's `OnceCell`, so builds for different keys proceed in parallel while
/// racing builds for the same key collapse into one.
pub struct AutomatonRegistry {
    slots: Mutex<LruCache<AutomatonKey, Slot>>,
    builds: AtomicUsize,
}

impl AutomatonRegistry {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_REGISTRY_CAPACITY)
    }

    /// Create a registry holding at most `capacity` dictionaries. Evicting a
    /// dictionary only drops the registry's handle; analyzers keep theirs.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            slots: Mutex::new(LruCache::new(capacity)),
            builds: AtomicUsize::new(0),
        }
    }

    /// Return the shared automaton for `words`, building it on first request.
    pub fn get_or_build(
        &self,
        words: &[String],
        case_sensitive: bool,
    ) -> Result<Arc<VocabAutomaton>, aho_corasick::BuildError> {
        let key = AutomatonKey::new(words, case_sensitive);
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            match slots.get(&key) {
                Some(slot) => Arc::clone(slot),
                None => {
                    let slot: Slot = Arc::new(OnceCell::new());
                    slots.put(key, Arc::clone(&slot));
                    slot
                }
            }
        };

        let automaton = slot.get_or_try_init(|| {
            self.builds.fetch_add(1, Ordering::Relaxed);
            let automaton = VocabAutomaton::build(words, case_sensitive)?;
            debug!(
                "built vocabulary automaton: {} patterns, key {:?}",
                automaton.len(),
                key
            );
            Ok::<_, aho_corasick::BuildError>(Arc::new(automaton))
        })?;

        Ok(Arc::clone(automaton))
    }

    /// Number of automata built so far.
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    /// Number of dictionaries currently held.
    pub fn len(&self) -> usize {
        self.slots.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.clear();
        }
    }
}

impl Default for AutomatonRegistry {
    fn default() -> Self {
        Self::new()
    }
}

//! Vocabulary sources and loading utilities.
//!
//! Dictionaries come from one of several sources (see [`VocabSource`]). Flat
//! files use a simple line format:
//!
//! ```text
//! # comment
//! deep learning
//! t-ara,12.5
//! 深度学习,3
//! ```
//!
//! Each line holds a word optionally followed by `,<score>`. A trailing field
//! that does not parse as a number is treated as part of the word, so entries
//! containing commas survive. Blank lines and `#` comments are skipped.
//!
//! File-backed dictionaries are cached by [`VocabCache`], which reloads a file
//! only when its modification time or the requesting configuration's
//! fingerprint changes. The process-wide default dictionary is held by
//! [`DefaultVocabulary`] and loaded at most once.

use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use log::{debug, warn};
use once_cell::sync::OnceCell;
use rustc_hash::{FxHashMap, FxHasher};
use thiserror::Error;

/// Errors that can occur when loading vocabulary files.
#[derive(Error, Debug)]
pub enum VocabError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid UTF-8 on line {line}")]
    Utf8Error { line: usize },
    #[error("Vocabulary file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: Box<VocabError>,
    },
}

/// A parsed dictionary line.
#[derive(Debug, Clone, PartialEq)]
pub struct VocabEntry {
    pub word: String,
    pub score: Option<f64>,
}

/// Parse `word[,score]` lines into entries.
pub fn parse_vocab_entries(data: &[u8]) -> Result<Vec<VocabEntry>, VocabError> {
    let mut entries = Vec::new();

    for (idx, line) in data.split(|&b| b == b'\n').enumerate() {
        let line = std::str::from_utf8(line).map_err(|_| VocabError::Utf8Error { line: idx + 1 })?;
        let line = line.trim_end_matches('\r').trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let entry = match line.rsplit_once(',') {
            Some((word, score)) if !word.trim().is_empty() => match score.trim().parse::<f64>() {
                Ok(score) => VocabEntry {
                    word: word.trim().to_string(),
                    score: Some(score),
                },
                Err(_) => VocabEntry {
                    word: line.to_string(),
                    score: None,
                },
            },
            _ => VocabEntry {
                word: line.to_string(),
                score: None,
            },
        };
        entries.push(entry);
    }

    Ok(entries)
}

/// Load the words of a `word[,score]` vocabulary from raw bytes.
pub fn load_vocab(data: &[u8]) -> Result<Vec<String>, VocabError> {
    Ok(parse_vocab_entries(data)?
        .into_iter()
        .map(|e| e.word)
        .collect())
}

/// Load a vocabulary from a file path.
pub fn load_vocab_file(path: impl AsRef<Path>) -> Result<Vec<String>, VocabError> {
    let path = path.as_ref();
    let wrap = |e: VocabError| VocabError::File {
        path: path.to_path_buf(),
        source: Box::new(e),
    };
    let data = fs::read(path).map_err(|e| wrap(e.into()))?;
    load_vocab(&data).map_err(wrap)
}

/// Where a tokenizer's dictionary comes from.
#[derive(Debug, Clone, Default)]
pub enum VocabSource {
    /// No dictionary configured.
    #[default]
    None,
    /// Words given in-line by the host.
    Inline(Vec<String>),
    /// Flat `word[,score]` file, reloaded when it changes.
    File(PathBuf),
    /// A list the host already holds.
    Cached(Arc<Vec<String>>),
    /// The process default dictionary.
    Default,
}

impl VocabSource {
    pub fn is_none(&self) -> bool {
        matches!(self, VocabSource::None)
    }

    /// Feed a cheap description of the source into a fingerprint hasher.
    pub(crate) fn describe<H: Hasher>(&self, state: &mut H) {
        match self {
            VocabSource::None => 0u8.hash(state),
            VocabSource::Inline(words) => {
                1u8.hash(state);
                words.len().hash(state);
            }
            VocabSource::File(path) => {
                2u8.hash(state);
                path.hash(state);
            }
            VocabSource::Cached(words) => {
                3u8.hash(state);
                words.len().hash(state);
            }
            VocabSource::Default => 4u8.hash(state),
        }
    }
}

struct CachedVocab {
    fingerprint: u64,
    modified: Option<SystemTime>,
    words: Arc<Vec<String>>,
}

/// File-backed vocabulary cache.
///
/// Entries are keyed by path and tagged with the configuration fingerprint
/// and the file's modification time. A stale entry is replaced with a freshly
/// loaded one; readers holding the previous list keep using it.
#[derive(Default)]
pub struct VocabCache {
    entries: RwLock<FxHashMap<PathBuf, Arc<CachedVocab>>>,
}

impl VocabCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached words for `path`, reloading if the file changed or
    /// the fingerprint differs from the cached one.
    pub fn get_or_load(&self, path: &Path, fingerprint: u64) -> Result<Arc<Vec<String>>, VocabError> {
        let modified = fs::metadata(path)
            .map_err(|e| VocabError::File {
                path: path.to_path_buf(),
                source: Box::new(e.into()),
            })?
            .modified()
            .ok();

        if let Ok(entries) = self.entries.read() {
            if let Some(entry) = entries.get(path) {
                if entry.fingerprint == fingerprint && entry.modified == modified {
                    return Ok(Arc::clone(&entry.words));
                }
            }
        }

        let words = Arc::new(load_vocab_file(path)?);
        debug!(
            "loaded vocabulary {} ({} entries)",
            path.display(),
            words.len()
        );

        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                path.to_path_buf(),
                Arc::new(CachedVocab {
                    fingerprint,
                    modified,
                    words: Arc::clone(&words),
                }),
            );
        }

        Ok(words)
    }

    /// Drop every cached list.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process default dictionary, loaded at most once.
///
/// A missing or unreadable default dictionary is not fatal: it degrades to an
/// empty list and logs a warning.
#[derive(Default)]
pub struct DefaultVocabulary {
    path: Option<PathBuf>,
    words: OnceCell<Arc<Vec<String>>>,
}

impl DefaultVocabulary {
    /// Lazily load the default dictionary from `path` on first use.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            words: OnceCell::new(),
        }
    }

    /// Use an already loaded list as the default dictionary.
    pub fn from_words(words: Vec<String>) -> Self {
        Self {
            path: None,
            words: OnceCell::with_value(Arc::new(words)),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.words.get().is_some()
    }

    pub fn get(&self) -> Arc<Vec<String>> {
        Arc::clone(self.words.get_or_init(|| match &self.path {
            Some(path) => match load_vocab_file(path) {
                Ok(words) => {
                    debug!(
                        "loaded default vocabulary {} ({} entries)",
                        path.display(),
                        words.len()
                    );
                    Arc::new(words)
                }
                Err(e) => {
                    warn!("default vocabulary unavailable, using empty dictionary: {e}");
                    Arc::new(Vec::new())
                }
            },
            None => {
                warn!("no default vocabulary configured, using empty dictionary");
                Arc::new(Vec::new())
            }
        }))
    }
}

/// Stable content hash of a word list, used as part of automaton keys.
pub(crate) fn hash_words(words: &[String]) -> u64 {
    let mut hasher = FxHasher::default();
    for w in words {
        w.hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vocab_entries() {
        let data = "# header\ndeep learning\nt-ara,12.5\n\n深度学习,3\r\nfoo,bar\n".as_bytes();
        let entries = parse_vocab_entries(data).unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].word, "deep learning");
        assert_eq!(entries[0].score, None);
        assert_eq!(entries[1].word, "t-ara");
        assert_eq!(entries[1].score, Some(12.5));
        assert_eq!(entries[2].word, "深度学习");
        assert_eq!(entries[2].score, Some(3.0));
        assert_eq!(entries[3].word, "foo,bar");
    }

    #[test]
    fn test_invalid_utf8_reports_line() {
        let data = b"ok\n\xff\xfe\n";
        match load_vocab(data) {
            Err(VocabError::Utf8Error { line }) => assert_eq!(line, 2),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_default_vocabulary_degrades_to_empty() {
        let default = DefaultVocabulary::from_path("/nonexistent/layertok/default.dic");
        assert!(!default.is_loaded());
        assert!(default.get().is_empty());
        assert!(default.is_loaded());
    }

    #[test]
    fn test_default_vocabulary_from_words() {
        let default = DefaultVocabulary::from_words(vec!["gpt".into()]);
        assert!(default.is_loaded());
        assert_eq!(default.get().as_slice(), ["gpt".to_string()]);
    }

    #[test]
    fn test_hash_words_depends_on_order_and_content() {
        let a = vec!["a".to_string(), "b".to_string()];
        let b = vec!["b".to_string(), "a".to_string()];
        assert_eq!(hash_words(&a), hash_words(&a.clone()));
        assert_ne!(hash_words(&a), hash_words(&b));
    }
}

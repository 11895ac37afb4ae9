//! Python bindings for the layertok analyzer.
//!
//! This module provides PyO3 wrappers around the core analyzer, exposing a
//! Python-friendly API for search hosts while keeping analysis in Rust.
//!
//! # Thread Safety
//!
//! Analyzers are immutable and can be shared across Python threads. Analysis
//! releases the GIL, and batch analysis uses Rayon for true parallelism.
//!
//! # Example
//!
//! ```python
//! from layertok import Analyzer, Resources
//!
//! resources = Resources()
//! analyzer = Analyzer(vocab=["deep learning"], vcgram=True, resources=resources)
//! for token in analyzer.analyze("deep learning model"):
//!     print(token["text"], token["start"], token["end"], token["type"])
//! ```

use std::sync::Arc;

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::core::{
    Analyzer, AnalyzerConfig, AnalyzerError, DefaultVocabulary, SharedResources, Token, TokenType,
};

/// Resources shared between analyzers (automaton registry, vocabulary cache,
/// default dictionary).
#[pyclass(name = "Resources")]
#[derive(Clone)]
pub struct PyResources {
    inner: Arc<SharedResources>,
}

#[pymethods]
impl PyResources {
    /// Args:
    ///     default_vocab_path: Optional path of the default dictionary, loaded on first use
    #[new]
    #[pyo3(signature = (default_vocab_path=None))]
    fn new(default_vocab_path: Option<String>) -> Self {
        let resources = match default_vocab_path {
            Some(path) => SharedResources::new()
                .with_default_vocabulary(DefaultVocabulary::from_path(path)),
            None => SharedResources::new(),
        };
        Self {
            inner: Arc::new(resources),
        }
    }

    /// Number of vocabulary automata built so far.
    #[getter]
    fn automaton_builds(&self) -> usize {
        self.inner.registry().build_count()
    }
}

/// Python wrapper for the Rust Analyzer.
#[pyclass(name = "Analyzer")]
pub struct PyAnalyzer {
    inner: Analyzer,
}

#[pymethods]
impl PyAnalyzer {
    /// Create an analyzer.
    ///
    /// Args:
    ///     vocab: Optional in-line dictionary
    ///     vocab_path: Optional `word[,score]` dictionary file
    ///     use_default_vocab: Use the resources' default dictionary
    ///     rules_path: Optional JSON rule file
    ///     use_categ: Enable the character categorizer
    ///     split_word: Emit CJK chars one per token
    ///     case_sensitive: Match the dictionary case-sensitively
    ///     bigram, vbgram, vcgram: N-gram families to synthesize
    ///     exclude_types: Token type tags to drop from the output
    ///     resources: Shared resources; a private set is created when omitted
    #[new]
    #[pyo3(signature = (
        vocab=None,
        vocab_path=None,
        use_default_vocab=false,
        rules_path=None,
        use_categ=true,
        split_word=false,
        case_sensitive=false,
        bigram=false,
        vbgram=false,
        vcgram=false,
        exclude_types=None,
        resources=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        vocab: Option<Vec<String>>,
        vocab_path: Option<String>,
        use_default_vocab: bool,
        rules_path: Option<String>,
        use_categ: bool,
        split_word: bool,
        case_sensitive: bool,
        bigram: bool,
        vbgram: bool,
        vcgram: bool,
        exclude_types: Option<Vec<String>>,
        resources: Option<PyResources>,
    ) -> PyResult<Self> {
        let mut builder = AnalyzerConfig::builder()
            .use_categ(use_categ)
            .split_word(split_word)
            .case_sensitive(case_sensitive)
            .bigram(bigram)
            .vbgram(vbgram)
            .vcgram(vcgram);

        builder = match (vocab, vocab_path, use_default_vocab) {
            (Some(words), None, false) => builder.vocab_words(words),
            (None, Some(path), false) => builder.vocab_file(path),
            (None, None, true) => builder
                .use_vocab(true)
                .vocabulary(crate::core::VocabSource::Default),
            (None, None, false) => builder,
            _ => {
                return Err(PyValueError::new_err(
                    "vocab, vocab_path and use_default_vocab are mutually exclusive",
                ))
            }
        };

        if let Some(path) = rules_path {
            builder = builder.rule_file(path);
        }
        for name in exclude_types.unwrap_or_default() {
            let kind = TokenType::from_name(&name)
                .ok_or_else(|| PyValueError::new_err(format!("Unknown token type: {}", name)))?;
            builder = builder.exclude_type(kind);
        }

        let config = builder.build().map_err(to_py_err)?;
        let resources = resources.map(|r| r.inner).unwrap_or_default();
        let inner = Analyzer::new(config, &resources).map_err(to_py_err)?;

        Ok(Self { inner })
    }

    /// Analyze a document.
    ///
    /// Args:
    ///     text: Input text
    ///
    /// Returns:
    ///     List of dicts with keys text, start, end, type, group, position
    fn analyze<'py>(&self, py: Python<'py>, text: &str) -> PyResult<Vec<Bound<'py, PyDict>>> {
        let tokens = py.allow_threads(|| self.inner.analyze(text));
        tokens.iter().map(|t| token_to_dict(py, t)).collect()
    }

    /// Batch analyze multiple documents in parallel.
    ///
    /// Args:
    ///     texts: List of input texts
    ///
    /// Returns:
    ///     List of token lists
    fn analyze_batch<'py>(
        &self,
        py: Python<'py>,
        texts: Vec<String>,
    ) -> PyResult<Vec<Vec<Bound<'py, PyDict>>>> {
        let batches = py.allow_threads(|| self.inner.analyze_batch(&texts));
        batches
            .iter()
            .map(|tokens| tokens.iter().map(|t| token_to_dict(py, t)).collect())
            .collect()
    }

    /// Number of distinct dictionary patterns.
    #[getter]
    fn vocab_size(&self) -> usize {
        self.inner.vocab_len()
    }
}

fn token_to_dict<'py>(py: Python<'py>, token: &Token) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("text", &token.text)?;
    dict.set_item("start", token.start)?;
    dict.set_item("end", token.end)?;
    dict.set_item("type", token.kind.as_str())?;
    dict.set_item("group", token.group.as_str())?;
    dict.set_item("position", token.position)?;
    Ok(dict)
}

fn to_py_err(e: AnalyzerError) -> PyErr {
    match e {
        AnalyzerError::VocabError(_) | AnalyzerError::RuleError(_) => {
            PyIOError::new_err(e.to_string())
        }
        _ => PyValueError::new_err(e.to_string()),
    }
}

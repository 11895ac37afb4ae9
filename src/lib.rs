pub mod core;
#[cfg(feature = "python")]
mod python;

#[cfg(feature = "python")]
use pyo3::prelude::*;

pub use core::{
    Analyzer, AnalyzerConfig, AnalyzerError, NgramFamilies, RuleConfig, SharedResources, Token,
    TokenGroup, TokenType, VocabSource,
};

/// layertok - layered search tokenizer with Python bindings
///
/// Combines three token producers and a rule filter:
/// - Aho-Corasick dictionary matching with boundary heuristics
/// - Character-class categorization (digits, Latin, CJK, other scripts, separators)
/// - Adjacency-based n-gram synthesis (bigram, vbgram, vcgram)
/// - Include / exclude / declude rules with regex full-match patterns
/// - Shared automaton registry so equal dictionaries are built once
/// - Rayon parallelism for batch analysis
#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PyAnalyzer>()?;
    m.add_class::<python::PyResources>()?;
    Ok(())
}

//! Dictionary matching with boundary heuristics.
//!
//! The matcher runs the shared [`VocabAutomaton`] over a document and turns
//! every occurrence into a `vocab` token, except for matches that would cut a
//! larger Latin word or number in half. Matches containing separators also
//! yield a `vocab_concat` token with the separators stripped, so `t-ara`
//! matches both as written and as `tara`.

use std::sync::Arc;

use super::automaton::{fold_case, VocabAutomaton};
use super::categorizer::{is_digit, is_latin_letter, is_separator_char};
use super::token::{CharText, Token, TokenType};

/// Shorter matches are dropped when either boundary continues a word.
const SHORT_MATCH_LEN: usize = 3;

#[inline]
fn is_alnum(c: char) -> bool {
    is_digit(c) || is_latin_letter(c)
}

#[inline]
fn same_class_alnum(a: char, b: char) -> bool {
    (is_digit(a) && is_digit(b)) || (is_latin_letter(a) && is_latin_letter(b))
}

/// Decide whether the match `chars[start..end]` truncates a larger word.
///
/// Only matches made purely of alphanumerics and separators are checked.
/// A digit-digit boundary always drops. Otherwise a match shorter than
/// three chars drops when either boundary pair is same-class alphanumeric,
/// and a longer one only when both are.
pub(crate) fn truncates_word(chars: &[char], start: usize, end: usize) -> bool {
    let span = &chars[start..end];
    if !span.iter().all(|&c| is_alnum(c) || is_separator_char(c)) {
        return false;
    }

    // (outside char, edge char) on each side
    let left = (start > 0).then(|| (chars[start - 1], chars[start]));
    let right = (end < chars.len()).then(|| (chars[end], chars[end - 1]));

    let digit_pair = |pair: Option<(char, char)>| pair.is_some_and(|(a, b)| is_digit(a) && is_digit(b));
    if digit_pair(left) || digit_pair(right) {
        return true;
    }

    let same = |pair: Option<(char, char)>| pair.is_some_and(|(a, b)| same_class_alnum(a, b));
    if span.len() < SHORT_MATCH_LEN {
        same(left) || same(right)
    } else {
        same(left) && same(right)
    }
}

/// Strip whitespace, dashes and mask glyphs from a match.
pub(crate) fn concat_form(text: &str) -> Option<String> {
    if !text.chars().any(is_separator_char) {
        return None;
    }
    let stripped: String = text.chars().filter(|&c| !is_separator_char(c)).collect();
    (!stripped.is_empty()).then_some(stripped)
}

/// Vocabulary token producer.
#[derive(Debug, Clone)]
pub struct VocabMatcher {
    automaton: Arc<VocabAutomaton>,
}

impl VocabMatcher {
    pub fn new(automaton: Arc<VocabAutomaton>) -> Self {
        Self { automaton }
    }

    pub fn automaton(&self) -> &Arc<VocabAutomaton> {
        &self.automaton
    }

    /// Find dictionary tokens in `text`, ordered by `(start, end)`.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        self.tokenize_text(&CharText::new(text))
    }

    pub(crate) fn tokenize_text(&self, doc: &CharText<'_>) -> Vec<Token> {
        if self.automaton.is_empty() || doc.len() == 0 {
            return Vec::new();
        }

        // Folding keeps char counts but not byte lengths, so offsets are
        // mapped through the haystack actually searched.
        let mut spans: Vec<(usize, usize)> = if self.automaton.case_sensitive() {
            self.automaton
                .find_overlapping(doc.text)
                .into_iter()
                .map(|(s, e)| (doc.char_offset(s), doc.char_offset(e)))
                .collect()
        } else {
            let folded = fold_case(doc.text);
            let folded_doc = CharText::new(&folded);
            self.automaton
                .find_overlapping(&folded)
                .into_iter()
                .map(|(s, e)| (folded_doc.char_offset(s), folded_doc.char_offset(e)))
                .collect()
        };
        spans.sort_unstable();
        spans.dedup();

        let mut tokens = Vec::with_capacity(spans.len());
        for (start, end) in spans {
            if truncates_word(&doc.chars, start, end) {
                continue;
            }

            let text = doc.slice(start, end);
            let concat = concat_form(&text);

            let position = tokens.len();
            tokens.push(Token::new(text, start, end, TokenType::Vocab).with_position(position));
            if let Some(concat) = concat {
                let position = tokens.len();
                tokens.push(
                    Token::new(concat, start, end, TokenType::VocabConcat).with_position(position),
                );
            }
        }

        tokens
    }
}

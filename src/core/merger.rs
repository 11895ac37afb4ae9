//! Ordering of the combined token stream.
//!
//! The n-gram synthesizer relies on its input being sorted by start offset
//! with vocabulary tokens ahead of categorizer tokens at the same offset, so
//! a vocabulary match is always seen before the category runs it overlaps.

use super::token::Token;

/// Stable sort by `(start, group rank)`; equal keys keep their input order.
pub(crate) fn sort_stream(tokens: &mut [Token]) {
    tokens.sort_by_key(|t| (t.start, t.group.rank()));
}

/// Combine categorizer and vocabulary output into one offset-ordered stream
/// with positions renumbered from 0.
pub fn merge(categ: Vec<Token>, vocab: Vec<Token>) -> Vec<Token> {
    let mut merged = Vec::with_capacity(categ.len() + vocab.len());
    merged.extend(vocab);
    merged.extend(categ);
    sort_stream(&mut merged);
    renumber(merged)
}

/// Assign positions 0.. in stream order.
pub(crate) fn renumber(tokens: Vec<Token>) -> Vec<Token> {
    tokens
        .into_iter()
        .enumerate()
        .map(|(i, t)| t.with_position(i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::token::{TokenGroup, TokenType};

    #[test]
    fn test_vocab_precedes_categ_at_same_start() {
        let categ = vec![
            Token::new("深度学习框架", 0, 6, TokenType::Cjk),
            Token::new(" ", 6, 7, TokenType::Ws),
        ];
        let vocab = vec![
            Token::new("深度学习", 0, 4, TokenType::Vocab),
            Token::new("框架", 4, 6, TokenType::Vocab),
        ];
        let merged = merge(categ, vocab);
        let order: Vec<(&str, TokenGroup, usize)> = merged
            .iter()
            .map(|t| (t.text.as_str(), t.group, t.position))
            .collect();
        assert_eq!(
            order,
            vec![
                ("深度学习", TokenGroup::Vocab, 0),
                ("深度学习框架", TokenGroup::Categ, 1),
                ("框架", TokenGroup::Vocab, 2),
                (" ", TokenGroup::Categ, 3),
            ]
        );
    }

    #[test]
    fn test_equal_keys_keep_input_order() {
        let vocab = vec![
            Token::new("t-ara", 0, 5, TokenType::Vocab),
            Token::new("tara", 0, 5, TokenType::VocabConcat),
        ];
        let merged = merge(Vec::new(), vocab);
        assert_eq!(merged[0].kind, TokenType::Vocab);
        assert_eq!(merged[1].kind, TokenType::VocabConcat);
    }
}

//! Token model shared by every stage of the pipeline.
//!
//! Every producer (categorizer, vocabulary matcher, n-gram synthesizer) emits
//! [`Token`]s. Offsets are half-open `[start, end)` ranges counted in Unicode
//! scalar values (chars), not bytes, so hosts working in code points can use
//! them directly.

use std::fmt;

/// Fine-grained semantic tag of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenType {
    /// Run of digits.
    Arab,
    /// Run of Latin letters.
    Eng,
    /// CJK ideographs and Kana.
    Cjk,
    /// Letters of any other script (Greek, Cyrillic, Thai, ...).
    Lang,
    /// Dash-family separators (`- + _ .`).
    Dash,
    /// Whitespace.
    Ws,
    /// The reserved mask glyph.
    Mask,
    /// Catch-all for anything not covered by the other classes.
    Nord,
    /// Dictionary match.
    Vocab,
    /// Dictionary match with separators stripped.
    VocabConcat,
    /// Pair of adjacent category words.
    Bigram,
    /// Pair of adjacent vocabulary matches.
    Vbgram,
    /// Pair of adjacent words, at least one of them a vocabulary match.
    Vcgram,
}

impl TokenType {
    /// All token types, in declaration order.
    pub const ALL: [TokenType; 13] = [
        TokenType::Arab,
        TokenType::Eng,
        TokenType::Cjk,
        TokenType::Lang,
        TokenType::Dash,
        TokenType::Ws,
        TokenType::Mask,
        TokenType::Nord,
        TokenType::Vocab,
        TokenType::VocabConcat,
        TokenType::Bigram,
        TokenType::Vbgram,
        TokenType::Vcgram,
    ];

    /// The wire tag used by hosts.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenType::Arab => "arab",
            TokenType::Eng => "eng",
            TokenType::Cjk => "cjk",
            TokenType::Lang => "lang",
            TokenType::Dash => "dash",
            TokenType::Ws => "ws",
            TokenType::Mask => "mask",
            TokenType::Nord => "nord",
            TokenType::Vocab => "vocab",
            TokenType::VocabConcat => "vocab_concat",
            TokenType::Bigram => "bigram",
            TokenType::Vbgram => "vbgram",
            TokenType::Vcgram => "vcgram",
        }
    }

    /// Parse a wire tag back into a type.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == name)
    }

    /// Coarse provenance group of this type.
    pub fn group(self) -> TokenGroup {
        match self {
            TokenType::Vocab | TokenType::VocabConcat => TokenGroup::Vocab,
            TokenType::Bigram | TokenType::Vbgram | TokenType::Vcgram => TokenGroup::Ngram,
            _ => TokenGroup::Categ,
        }
    }

    /// Digits, Latin letters, CJK or other-script letters.
    #[inline]
    pub fn is_category_word(self) -> bool {
        matches!(
            self,
            TokenType::Arab | TokenType::Eng | TokenType::Cjk | TokenType::Lang
        )
    }

    /// Produced by the vocabulary matcher.
    #[inline]
    pub fn is_vocab_origin(self) -> bool {
        matches!(self, TokenType::Vocab | TokenType::VocabConcat)
    }

    /// Category word or vocabulary match.
    #[inline]
    pub fn is_word(self) -> bool {
        self.is_category_word() || self.is_vocab_origin()
    }

    #[inline]
    pub fn is_separator(self) -> bool {
        matches!(self, TokenType::Dash | TokenType::Ws)
    }

    /// The catch-all "other" category.
    #[inline]
    pub fn is_other(self) -> bool {
        self == TokenType::Nord
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse provenance of a token, used to drop whole categories cheaply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenGroup {
    Vocab,
    Categ,
    Ngram,
}

impl TokenGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenGroup::Vocab => "vocab",
            TokenGroup::Categ => "categ",
            TokenGroup::Ngram => "ngram",
        }
    }

    /// Tie-break rank at identical start offsets: vocabulary first.
    #[inline]
    pub(crate) fn rank(self) -> u8 {
        match self {
            TokenGroup::Vocab => 0,
            TokenGroup::Categ => 1,
            TokenGroup::Ngram => 2,
        }
    }
}

impl fmt::Display for TokenGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single token of the output stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub text: String,
    /// Char offset of the first char (inclusive).
    pub start: usize,
    /// Char offset past the last char (exclusive).
    pub end: usize,
    pub kind: TokenType,
    pub group: TokenGroup,
    pub position: usize,
}

impl Token {
    /// Create a token; the group is derived from the type.
    pub fn new(text: impl Into<String>, start: usize, end: usize, kind: TokenType) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            kind,
            group: kind.group(),
            position: 0,
        }
    }

    pub(crate) fn with_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    /// Length of the span in chars.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True when this token's span contains `other`'s span (or both are equal).
    #[inline]
    pub fn contains_span(&self, other: &Token) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Character view of a document with a byte-to-char offset table.
///
/// Matching engines report byte offsets; the pipeline speaks char offsets.
pub(crate) struct CharText<'a> {
    pub text: &'a str,
    pub chars: Vec<char>,
    byte_to_char: Vec<u32>,
}

impl<'a> CharText<'a> {
    pub fn new(text: &'a str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let mut byte_to_char = vec![0u32; text.len() + 1];
        let mut idx = 0u32;
        for (b, _) in text.char_indices() {
            byte_to_char[b] = idx;
            idx += 1;
        }
        byte_to_char[text.len()] = idx;
        Self {
            text,
            chars,
            byte_to_char,
        }
    }

    /// Char offset of a byte offset that lies on a char boundary.
    #[inline]
    pub fn char_offset(&self, byte: usize) -> usize {
        self.byte_to_char[byte] as usize
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_roundtrip_through_names() {
        for t in TokenType::ALL {
            assert_eq!(TokenType::from_name(t.as_str()), Some(t));
        }
        assert_eq!(TokenType::from_name("nope"), None);
    }

    #[test]
    fn test_groups() {
        assert_eq!(TokenType::Vocab.group(), TokenGroup::Vocab);
        assert_eq!(TokenType::VocabConcat.group(), TokenGroup::Vocab);
        assert_eq!(TokenType::Ws.group(), TokenGroup::Categ);
        assert_eq!(TokenType::Vcgram.group(), TokenGroup::Ngram);
    }

    #[test]
    fn test_predicates() {
        assert!(TokenType::Cjk.is_category_word());
        assert!(!TokenType::Vocab.is_category_word());
        assert!(TokenType::Vocab.is_word());
        assert!(!TokenType::Dash.is_word());
        assert!(TokenType::Ws.is_separator());
        assert!(!TokenType::Mask.is_separator());
        assert!(TokenType::Nord.is_other());
    }

    #[test]
    fn test_span_length() {
        let token = Token::new("深度学习", 3, 7, TokenType::Vocab);
        assert_eq!(token.len(), 4);
        assert!(!token.is_empty());
        assert!(token.contains_span(&Token::new("学习", 5, 7, TokenType::Vocab)));
    }

    #[test]
    fn test_char_text_offsets() {
        let ct = CharText::new("a中b");
        assert_eq!(ct.len(), 3);
        assert_eq!(ct.char_offset(0), 0);
        assert_eq!(ct.char_offset(1), 1);
        assert_eq!(ct.char_offset(4), 2);
        assert_eq!(ct.char_offset(5), 3);
        assert_eq!(ct.slice(1, 3), "中b");
    }
}

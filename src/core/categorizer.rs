//! Character-class run detection.
//!
//! The categorizer scans text once, left to right, and emits one token per
//! maximal run of characters sharing a class. Classes are tested in a fixed
//! priority order so every char belongs to exactly one class, which makes the
//! emitted spans tile the input with no gaps and no overlaps.

use super::token::{Token, TokenType};

/// Reserved glyph used by upstream redaction to mask content.
pub const MASK_CHAR: char = '\u{25A1}';

/// Dash-family separators.
pub const DASH_CHARS: [char; 4] = ['-', '+', '_', '.'];

#[inline]
pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit() || ('\u{FF10}'..='\u{FF19}').contains(&c)
}

#[inline]
pub fn is_latin_letter(c: char) -> bool {
    match c {
        'a'..='z' | 'A'..='Z' => true,
        // Latin-1 Supplement letters, minus × and ÷
        '\u{00C0}'..='\u{00FF}' => c != '\u{00D7}' && c != '\u{00F7}',
        // Latin Extended-A and -B
        '\u{0100}'..='\u{024F}' => true,
        // Fullwidth Latin
        '\u{FF21}'..='\u{FF3A}' | '\u{FF41}'..='\u{FF5A}' => true,
        _ => false,
    }
}

#[inline]
pub fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3005}'..='\u{3007}'
        | '\u{3040}'..='\u{30FF}'
        | '\u{31F0}'..='\u{31FF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{20000}'..='\u{2FA1F}')
}

#[inline]
pub fn is_dash(c: char) -> bool {
    DASH_CHARS.contains(&c)
}

/// Separator set used by the vocabulary heuristics: whitespace, dashes and the mask glyph.
#[inline]
pub fn is_separator_char(c: char) -> bool {
    c.is_whitespace() || is_dash(c) || c == MASK_CHAR
}

/// Classify a single char. Priority order matters: the first class that
/// accepts the char wins.
pub fn classify(c: char) -> TokenType {
    if is_digit(c) {
        TokenType::Arab
    } else if is_latin_letter(c) {
        TokenType::Eng
    } else if is_cjk(c) {
        TokenType::Cjk
    } else if c.is_alphabetic() {
        TokenType::Lang
    } else if is_dash(c) {
        TokenType::Dash
    } else if c.is_whitespace() {
        TokenType::Ws
    } else if c == MASK_CHAR {
        TokenType::Mask
    } else {
        TokenType::Nord
    }
}

/// Splits text into maximal same-class runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Categorizer {
    split_word: bool,
}

impl Categorizer {
    /// Create a categorizer.
    ///
    /// With `split_word` set, CJK runs are emitted one char per token;
    /// every other class always forms maximal runs.
    pub fn new(split_word: bool) -> Self {
        Self { split_word }
    }

    pub fn split_word(&self) -> bool {
        self.split_word
    }

    /// Tokenize `text` into class runs, positions assigned from 0.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let chars: Vec<char> = text.chars().collect();
        self.tokenize_chars(&chars)
    }

    pub(crate) fn tokenize_chars(&self, chars: &[char]) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let kind = classify(chars[start]);
            let mut end = start + 1;
            if !(self.split_word && kind == TokenType::Cjk) {
                while end < chars.len() && classify(chars[end]) == kind {
                    end += 1;
                }
            }

            let text: String = chars[start..end].iter().collect();
            let position = tokens.len();
            tokens.push(Token::new(text, start, end, kind).with_position(position));
            start = end;
        }

        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<(&str, TokenType)> {
        tokens.iter().map(|t| (t.text.as_str(), t.kind)).collect()
    }

    #[test]
    fn test_classify_priority() {
        assert_eq!(classify('7'), TokenType::Arab);
        assert_eq!(classify('３'), TokenType::Arab);
        assert_eq!(classify('é'), TokenType::Eng);
        assert_eq!(classify('中'), TokenType::Cjk);
        assert_eq!(classify('カ'), TokenType::Cjk);
        assert_eq!(classify('Ж'), TokenType::Lang);
        assert_eq!(classify('ก'), TokenType::Lang);
        assert_eq!(classify('.'), TokenType::Dash);
        assert_eq!(classify('\t'), TokenType::Ws);
        assert_eq!(classify(MASK_CHAR), TokenType::Mask);
        assert_eq!(classify('!'), TokenType::Nord);
        assert_eq!(classify('×'), TokenType::Nord);
    }

    #[test]
    fn test_runs() {
        let tokens = Categorizer::new(false).tokenize("chatgpt 12, 中文-abc");
        assert_eq!(
            kinds(&tokens),
            vec![
                ("chatgpt", TokenType::Eng),
                (" ", TokenType::Ws),
                ("12", TokenType::Arab),
                (",", TokenType::Nord),
                (" ", TokenType::Ws),
                ("中文", TokenType::Cjk),
                ("-", TokenType::Dash),
                ("abc", TokenType::Eng),
            ]
        );
        let positions: Vec<usize> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, (0..tokens.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_word_only_splits_cjk() {
        let categorizer = Categorizer::new(true);
        assert!(categorizer.split_word());
        let tokens = categorizer.tokenize("安静ab");
        assert_eq!(
            kinds(&tokens),
            vec![
                ("安", TokenType::Cjk),
                ("静", TokenType::Cjk),
                ("ab", TokenType::Eng)
            ]
        );
        assert_eq!((tokens[1].start, tokens[1].end), (1, 2));
    }

    #[test]
    fn test_spans_tile_input() {
        let text = "Hello, мир! 東京タワー 2024-01 □□ ok";
        for split in [false, true] {
            let tokens = Categorizer::new(split).tokenize(text);
            let mut cursor = 0;
            for t in &tokens {
                assert_eq!(t.start, cursor);
                assert!(t.end > t.start);
                cursor = t.end;
            }
            assert_eq!(cursor, text.chars().count());
            let rebuilt: String = tokens.iter().map(|t| t.text.as_str()).collect();
            assert_eq!(rebuilt, text);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(Categorizer::default().tokenize("").is_empty());
    }
}

//! N-gram synthesis over the merged token stream.
//!
//! Three families pair up adjacent tokens and differ only in which token
//! types they accept:
//!
//! | family   | anchor / partner                    | extra pair rule             |
//! |----------|-------------------------------------|-----------------------------|
//! | `bigram` | digits, Latin, CJK, other letters   | -                           |
//! | `vbgram` | vocabulary matches                  | -                           |
//! | `vcgram` | category words or vocabulary matches| at least one vocabulary side|
//!
//! # Adjacency
//!
//! For an anchor `T_i` the forward scan is bounded by:
//!
//! - the *hard boundary* `H`: the first later token starting at or after
//!   `T_i.end` that is not a separator and is either "other" or not an
//!   acceptable partner. Pairs never cross it.
//! - the *soft limit* `S`: one past the start of the first acceptable,
//!   non-separator partner that starts at or after `T_i.end`; without one,
//!   the start of the token just before `H`.
//!
//! A partner must not contain (or be contained by) the anchor, and must
//! either touch/overlap the anchor's end or start before `S`. This lets a
//! pair bridge one separator run while refusing to skip over a reachable
//! word. Input must be sorted as produced by [`merge`](super::merger::merge).

use rustc_hash::FxHashSet;

use super::token::{Token, TokenType};

/// Which n-gram families to synthesize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NgramFamilies {
    pub bigram: bool,
    pub vbgram: bool,
    pub vcgram: bool,
}

impl NgramFamilies {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            bigram: true,
            vbgram: true,
            vcgram: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.bigram || self.vbgram || self.vcgram)
    }

    fn enabled(&self) -> impl Iterator<Item = Family> + '_ {
        [
            (self.bigram, Family::Bigram),
            (self.vbgram, Family::Vbgram),
            (self.vcgram, Family::Vcgram),
        ]
        .into_iter()
        .filter_map(|(on, family)| on.then_some(family))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Family {
    Bigram,
    Vbgram,
    Vcgram,
}

impl Family {
    fn kind(self) -> TokenType {
        match self {
            Family::Bigram => TokenType::Bigram,
            Family::Vbgram => TokenType::Vbgram,
            Family::Vcgram => TokenType::Vcgram,
        }
    }

    /// Anchor and partner predicates are the same for every family.
    #[inline]
    fn accepts(self, kind: TokenType) -> bool {
        match self {
            Family::Bigram => kind.is_category_word(),
            Family::Vbgram => kind.is_vocab_origin(),
            Family::Vcgram => kind.is_word(),
        }
    }

    #[inline]
    fn pair_ok(self, first: &Token, second: &Token) -> bool {
        match self {
            Family::Vcgram => first.kind.is_vocab_origin() || second.kind.is_vocab_origin(),
            _ => true,
        }
    }
}

/// Index pairs `(anchor, partner)` of `family` over a merged stream.
pub(crate) fn adjacent_pairs(tokens: &[Token], family: Family) -> Vec<(usize, usize)> {
    let n = tokens.len();
    let mut pairs = Vec::new();

    for i in 0..n {
        let anchor = &tokens[i];
        if !family.accepts(anchor.kind) {
            continue;
        }
        let after_anchor = |t: &Token| t.start >= anchor.end && !t.kind.is_separator();
        let blocks = |t: &Token| t.kind.is_other() || !family.accepts(t.kind);

        // The first token past the anchor decides both bounds. When it is a
        // partner, the scan below stops right after its start offset, so `H`
        // is only looked for among tokens sharing that offset.
        let (limit, soft) = match (i + 1..n).find(|&j| after_anchor(&tokens[j])) {
            None => (n, tokens[n - 1].start),
            Some(f) if blocks(&tokens[f]) => (f, tokens[f - 1].start),
            Some(f) => {
                let offset = tokens[f].start;
                let limit = (f + 1..n)
                    .find(|&j| {
                        let t = &tokens[j];
                        t.start != offset || (after_anchor(t) && blocks(t))
                    })
                    .unwrap_or(n);
                (limit, offset + 1)
            }
        };

        for (k, candidate) in tokens.iter().enumerate().take(limit).skip(i + 1) {
            let touches = candidate.start <= anchor.end;
            if !touches && candidate.start >= soft {
                break;
            }
            if anchor.contains_span(candidate) || candidate.contains_span(anchor) {
                continue;
            }
            if !family.accepts(candidate.kind) || !family.pair_ok(anchor, candidate) {
                continue;
            }
            pairs.push((i, k));
        }
    }

    pairs
}

/// Replace every whitespace run with a single space.
fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_space = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Build the synthesized token(s) for one pair.
///
/// A gap between the two yields two variants (single-spaced and with all
/// whitespace removed); touching or overlapping tokens yield one token made
/// of `first` plus the non-overlapping tail of `second`.
pub(crate) fn join_pair(first: &Token, second: &Token, kind: TokenType) -> Vec<Token> {
    let start = first.start;
    let end = second.end;

    if second.start > first.end {
        let mut joined = String::with_capacity(first.text.len() + second.text.len() + 1);
        joined.push_str(&first.text);
        joined.push(' ');
        joined.push_str(&second.text);

        let spaced = collapse_whitespace(&joined);
        let compact: String = joined.chars().filter(|c| !c.is_whitespace()).collect();
        vec![
            Token::new(spaced, start, end, kind),
            Token::new(compact, start, end, kind),
        ]
    } else {
        let overlap = first.end - second.start;
        let mut joined = first.text.clone();
        joined.extend(second.text.chars().skip(overlap));
        vec![Token::new(joined, start, end, kind)]
    }
}

/// N-gram token producer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NgramSynthesizer {
    families: NgramFamilies,
}

impl NgramSynthesizer {
    pub fn new(families: NgramFamilies) -> Self {
        Self { families }
    }

    pub fn families(&self) -> NgramFamilies {
        self.families
    }

    /// Synthesize n-grams for every enabled family over a merged stream.
    ///
    /// Returned tokens are new; `merged` is left untouched. Identical
    /// `(text, start, end, type)` results are emitted once.
    pub fn synthesize(&self, merged: &[Token]) -> Vec<Token> {
        let mut seen: FxHashSet<(String, usize, usize, TokenType)> = FxHashSet::default();
        let mut out = Vec::new();

        for family in self.families.enabled() {
            for (i, k) in adjacent_pairs(merged, family) {
                for token in join_pair(&merged[i], &merged[k], family.kind()) {
                    if seen.insert((token.text.clone(), token.start, token.end, token.kind)) {
                        out.push(token);
                    }
                }
            }
        }

        out
    }
}

//! Per-edge match weighting.
//!
//! The tree asks a [`MatchPolicy`] how well a node matches the input token
//! at the current offset: `0.0` means no match, anything above zero lets the
//! DFS take the edge and feeds the scoring algorithm.
//!
//! The bundled [`LayeredPolicy`] compares a word node to the input on three
//! layers (normalised form, lemma, POS tag), folds the agreeing layers into
//! a [`MatchSignal`] and maps that to a weight. Wildcards and variables
//! match anything at a flat [`WILDCARD_WEIGHT`], deliberately below every
//! word weight so literal rules outrank wildcard rules on the same input.

use crate::engine::tree::NodeKind;
use crate::Token;

/// Weight returned for wildcard and variable edges.
///
/// Zero-token spans for `*` are handled structurally by the zero-hop
/// shortcut in the tree, so the policy returns the same weight for both
/// `min` values.
pub const WILDCARD_WEIGHT: f64 = 0.4;

/// Pluggable per-token weighting, in `[0, 1]`.
pub trait MatchPolicy {
    fn weight(&self, node: &NodeKind, input: &Token) -> f64;
}

bitflags::bitflags! {
    /// Layers on which a pattern word and an input token agree.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MatchSignal: u8 {
        const NORM  = 1 << 0;
        const LEMMA = 1 << 1;
        const POS   = 1 << 2;
    }
}

/// Default layered word matcher.
#[derive(Debug, Default, Clone, Copy)]
pub struct LayeredPolicy;

impl LayeredPolicy {
    /// Compute the agreement layers for a word node vs. an input token.
    ///
    /// An exact-match literal has its lemma cleared at insertion, so only
    /// the `NORM` layer can fire for it.
    fn signal(pattern: &Token, input: &Token) -> MatchSignal {
        let mut signal = MatchSignal::empty();
        if !pattern.normalized.is_empty() && pattern.normalized == input.normalized {
            signal |= MatchSignal::NORM;
        }
        if !pattern.lemma.is_empty() && !input.lemma.is_empty() && pattern.lemma == input.lemma {
            signal |= MatchSignal::LEMMA;
        }
        if pattern.pos != crate::Pos::Unknown && pattern.pos == input.pos {
            signal |= MatchSignal::POS;
        }
        signal
    }

    fn weight_of(signal: MatchSignal) -> f64 {
        if signal.contains(MatchSignal::NORM) {
            1.0
        } else if signal.contains(MatchSignal::LEMMA | MatchSignal::POS) {
            0.9
        } else if signal.contains(MatchSignal::LEMMA) {
            0.8
        } else {
            0.0
        }
    }
}

impl MatchPolicy for LayeredPolicy {
    fn weight(&self, node: &NodeKind, input: &Token) -> f64 {
        match node {
            NodeKind::Root => 0.0,
            NodeKind::Word(pattern) => Self::weight_of(Self::signal(pattern, input)),
            NodeKind::Wildcard { .. } | NodeKind::Variable { .. } => WILDCARD_WEIGHT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{EnglishLemmatizer, Lemmatize};

    fn word(raw: &str) -> Token {
        EnglishLemmatizer.lemmatize(raw).remove(0)
    }

    #[test]
    fn exact_word_scores_full_weight() {
        let w = LayeredPolicy.weight(&NodeKind::Word(word("hello")), &word("hello"));
        assert_eq!(w, 1.0);
    }

    #[test]
    fn lemma_match_scores_below_exact() {
        let w = LayeredPolicy.weight(&NodeKind::Word(word("cats")), &word("cat"));
        assert!(w > 0.0 && w < 1.0);
    }

    #[test]
    fn mismatch_scores_zero() {
        let w = LayeredPolicy.weight(&NodeKind::Word(word("hello")), &word("goodbye"));
        assert_eq!(w, 0.0);
    }

    #[test]
    fn wildcards_and_variables_match_anything_below_words() {
        let input = word("anything");
        let star = NodeKind::Wildcard { original: "*".into(), min: 0 };
        let plus = NodeKind::Wildcard { original: "+".into(), min: 1 };
        let var = NodeKind::Variable { name: "x".into() };
        assert_eq!(LayeredPolicy.weight(&star, &input), WILDCARD_WEIGHT);
        assert_eq!(LayeredPolicy.weight(&plus, &input), WILDCARD_WEIGHT);
        assert_eq!(LayeredPolicy.weight(&var, &input), WILDCARD_WEIGHT);
        assert!(WILDCARD_WEIGHT < 1.0);
    }

    #[test]
    fn cleared_lemma_defeats_fuzzy_matching() {
        // Pattern side shaped like an exact-match literal for "run".
        let mut pattern = word("run");
        pattern.lemma = String::new();
        pattern.pos = crate::Pos::Unknown;

        let running = word("running");
        assert_eq!(running.lemma, "run");
        assert_eq!(LayeredPolicy.weight(&NodeKind::Word(pattern.clone()), &running), 0.0);
        assert_eq!(LayeredPolicy.weight(&NodeKind::Word(pattern), &word("run")), 1.0);
    }
}

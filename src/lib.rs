extern crate self as retort;

#[macro_use]
mod macros;
mod api;
mod engine;
mod rules;
mod text;

pub use api::{Engine, Options, Reply};
pub use engine::metrics::{RunMetrics, RunResult};
pub use engine::output::{Condition, OutputList, OutputListBuilder};
pub use engine::policy::{LayeredPolicy, MatchPolicy, MatchSignal, WILDCARD_WEIGHT};
pub use engine::score::{CoverageScorer, ScoringAlgorithm};
pub use engine::tree::NodeKind;
pub use text::{EnglishLemmatizer, Lemmatize};

// --- Internal types ---------------------------------------------------------

/// Part-of-speech tag attached to a token by the lemmatiser.
///
/// Tagging is heuristic; the tag only influences matching when the same
/// heuristic produced it on both the rule side and the input side, so crude
/// tags are acceptable as long as they are consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pos {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Pronoun,
    Determiner,
    Preposition,
    Conjunction,
    Number,
    /// No usable tag (also the tag of exact-match literals).
    Unknown,
}

/// Syntactic role of a token inside a rule input or a user utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Plain word, matched through the match policy's layered comparison.
    Word,
    /// `*` (min 0) or `+` (min 1): consumes consecutive input tokens.
    Wildcard { min: usize },
    /// `[name]`: wildcard that additionally captures what it consumed.
    Variable(String),
    /// Punctuation; filtered out before insertion and before querying.
    Symbol,
}

/// A normalised token produced by the lemmatiser.
///
/// `original` preserves the authored/user spelling (captures are made of
/// original words), `normalized` is the lower-cased matching form, and
/// `lemma`/`pos` feed the fuzzy layers of the match policy. An empty `lemma`
/// marks an exact-match literal: the policy then compares `normalized` only.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub original: String,
    pub normalized: String,
    pub lemma: String,
    pub pos: Pos,
    pub kind: TokenKind,
}

impl Token {
    /// True for tokens that never take part in matching.
    pub fn is_symbol(&self) -> bool {
        self.kind == TokenKind::Symbol
    }
}

/// An authored rule: one or more input patterns mapped to a conditional
/// output list.
///
/// Inputs understand four special forms: `*` (zero or more tokens), `+` (one
/// or more tokens), `[name]` (capturing variable) and `'literal'`
/// (exact-match word that bypasses lemma/POS fuzziness). Rules are usually
/// built with the [`rule!`] macro.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Caller-chosen rule identifier, reported back in [`Reply`].
    pub id: u64,
    /// Ordered input patterns; each gets its own index in the match trail.
    pub inputs: Vec<String>,
    /// Conditional output list shared by every input of the rule.
    pub output: OutputList,
}

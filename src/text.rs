//! Tokenisation and lemmatisation.
//!
//! The engine consumes token streams, not raw strings. This module supplies
//! the [`Lemmatize`] seam the match tree is built against, plus the bundled
//! [`EnglishLemmatizer`]: a heuristic tokeniser that lower-cases, strips a
//! crude lemma and guesses a part-of-speech tag for each word.
//!
//! ## Design notes
//!
//! - The lemma/POS heuristics are *symmetric*, not linguistically accurate:
//!   the same function runs on rule inputs and on user input, so two words
//!   cross-match whenever the heuristic maps them to the same form. That is
//!   all the match policy needs.
//! - ASCII-only casing and suffix rules, since the bundled rules are English.
//!   Locale-aware folding belongs in a replacement `Lemmatize` impl.
//!
//! ## Special forms
//!
//! Rule inputs may contain `*`, `+`, `[name]` and `'literal'` tokens; the
//! tokeniser classifies the first three and [`parse_exact_match`] rewrites
//! the last (insertion path only; user input has its apostrophes stripped
//! before tokenisation, so it can never form an exact-match literal).

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::{Pos, Token, TokenKind};

/// Tokeniser contract consumed by the engine.
///
/// Produces the token stream described on [`Token`]: one entry per word,
/// wildcard, variable or symbol, in input order.
pub trait Lemmatize {
    fn lemmatize(&self, raw: &str) -> Vec<Token>;
}

/// Heuristic English tokeniser/lemmatiser.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnglishLemmatizer;

/// Irregular forms the suffix rules cannot reach.
static IRREGULAR_LEMMAS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("am", "be"),
        ("is", "be"),
        ("are", "be"),
        ("was", "be"),
        ("were", "be"),
        ("been", "be"),
        ("has", "have"),
        ("had", "have"),
        ("does", "do"),
        ("did", "do"),
        ("done", "do"),
        ("goes", "go"),
        ("went", "go"),
        ("gone", "go"),
        ("said", "say"),
        ("got", "get"),
        ("gotten", "get"),
        ("made", "make"),
        ("ran", "run"),
        ("running", "run"),
        ("knew", "know"),
        ("known", "know"),
        ("thought", "think"),
        ("saw", "see"),
        ("seen", "see"),
        ("came", "come"),
        ("told", "tell"),
        ("gave", "give"),
        ("given", "give"),
        ("took", "take"),
        ("taken", "take"),
        ("children", "child"),
        ("people", "person"),
        ("men", "man"),
        ("women", "woman"),
        ("feet", "foot"),
        ("mice", "mouse"),
        ("better", "good"),
        ("best", "good"),
        ("worse", "bad"),
        ("worst", "bad"),
    ])
});

const PRONOUNS: &[&str] = &[
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them", "my", "your", "his", "its", "our",
    "their", "mine", "yours", "this", "that", "these", "those", "who", "whom", "what", "which",
];

const DETERMINERS: &[&str] = &["a", "an", "the", "some", "any", "no", "every", "each", "either", "neither"];

const PREPOSITIONS: &[&str] = &[
    "in", "on", "at", "to", "from", "with", "without", "of", "for", "by", "about", "under", "over", "into", "onto",
    "after", "before", "between", "through", "during", "against",
];

const CONJUNCTIONS: &[&str] = &["and", "or", "but", "nor", "so", "yet", "if", "because", "while", "when", "although"];

/// Words tagged as verbs regardless of suffix shape.
const COMMON_VERBS: &[&str] = &[
    "be", "am", "is", "are", "was", "were", "have", "has", "had", "do", "does", "did", "go", "went", "say", "said",
    "get", "got", "make", "made", "know", "think", "see", "want", "like", "run", "ask", "tell", "come", "give",
    "take", "can", "will", "would", "could", "should", "may", "might", "must",
];

impl Lemmatize for EnglishLemmatizer {
    /// Split `raw` into tokens and normalise each one.
    ///
    /// ```text
    /// "my name is [name]"  ->  Word(my) Word(name) Word(is) Variable(name)
    /// "'Run' now!"         ->  Word('Run', exact after parse_exact_match) Word(now) Symbol(!)
    /// ```
    fn lemmatize(&self, raw: &str) -> Vec<Token> {
        let re = regex!(r"\[[A-Za-z0-9_]+\]|[A-Za-z0-9']+|\S");
        re.find_iter(raw).map(|m| classify(m.as_str())).collect()
    }
}

/// Build a single token from one matched chunk.
fn classify(chunk: &str) -> Token {
    if chunk.len() > 2 && chunk.starts_with('[') && chunk.ends_with(']') {
        let name = chunk[1..chunk.len() - 1].to_string();
        return Token {
            original: chunk.to_string(),
            normalized: name.to_lowercase(),
            lemma: String::new(),
            pos: Pos::Unknown,
            kind: TokenKind::Variable(name),
        };
    }

    match chunk {
        "*" => wildcard_token(chunk, 0),
        "+" => wildcard_token(chunk, 1),
        _ => {
            let normalized: String = chunk.chars().filter(|c| *c != '\'').collect::<String>().to_lowercase();
            if normalized.chars().any(|c| c.is_ascii_alphanumeric()) {
                Token {
                    original: chunk.to_string(),
                    lemma: lemma_of(&normalized),
                    pos: tag_of(&normalized),
                    normalized,
                    kind: TokenKind::Word,
                }
            } else {
                Token {
                    original: chunk.to_string(),
                    normalized,
                    lemma: String::new(),
                    pos: Pos::Unknown,
                    kind: TokenKind::Symbol,
                }
            }
        }
    }
}

fn wildcard_token(chunk: &str, min: usize) -> Token {
    Token {
        original: chunk.to_string(),
        normalized: chunk.to_string(),
        lemma: String::new(),
        pos: Pos::Unknown,
        kind: TokenKind::Wildcard { min },
    }
}

/// Remove apostrophes from user input before tokenisation.
///
/// Contractions collapse ("don't" -> "dont") and quote characters disappear,
/// which is what keeps exact-match literals an authoring-side-only construct.
pub(crate) fn strip_apostrophes(input: &str) -> String {
    input.chars().filter(|c| *c != '\'').collect()
}

/// Rewrite single-quoted words into exact-match literals (insertion path).
///
/// `'Run'` becomes a token whose normalised form is `run` with lemma and POS
/// cleared, so the match policy can only compare normalised forms for it.
pub(crate) fn parse_exact_match(tokens: Vec<Token>) -> Vec<Token> {
    tokens
        .into_iter()
        .map(|mut t| {
            let quoted = t.kind == TokenKind::Word
                && t.original.len() > 2
                && t.original.starts_with('\'')
                && t.original.ends_with('\'');
            if quoted {
                t.normalized = t.original[1..t.original.len() - 1].to_lowercase();
                t.lemma = String::new();
                t.pos = Pos::Unknown;
            }
            t
        })
        .collect()
}

/// Drop symbol tokens; matching never sees them.
pub(crate) fn filter_symbols(tokens: Vec<Token>) -> Vec<Token> {
    tokens.into_iter().filter(|t| !t.is_symbol()).collect()
}

/// Heuristic lemma: irregular map first, then suffix stripping.
fn lemma_of(word: &str) -> String {
    if let Some(lemma) = IRREGULAR_LEMMAS.get(word) {
        return (*lemma).to_string();
    }

    let n = word.len();
    if n > 4 && word.ends_with("ies") {
        return format!("{}y", &word[..n - 3]);
    }
    if n > 4 && (word.ends_with("sses") || word.ends_with("shes") || word.ends_with("ches") || word.ends_with("xes"))
    {
        return word[..n - 2].to_string();
    }
    if n > 3 && word.ends_with('s') && !word.ends_with("ss") && !word.ends_with("us") && !word.ends_with("is") {
        return word[..n - 1].to_string();
    }
    if n > 5 && word.ends_with("ing") {
        return undouble(&word[..n - 3]);
    }
    if n > 4 && word.ends_with("ed") {
        return undouble(&word[..n - 2]);
    }
    word.to_string()
}

/// Collapse a doubled trailing consonant left over from suffix stripping
/// ("stopp" -> "stop").
fn undouble(stem: &str) -> String {
    let bytes = stem.as_bytes();
    let n = bytes.len();
    if n >= 2 && bytes[n - 1] == bytes[n - 2] && !b"aeiou".contains(&bytes[n - 1]) {
        return stem[..n - 1].to_string();
    }
    stem.to_string()
}

/// Heuristic POS tag: closed classes first, then suffix shape.
fn tag_of(word: &str) -> Pos {
    if word.chars().all(|c| c.is_ascii_digit()) {
        return Pos::Number;
    }
    if PRONOUNS.contains(&word) {
        return Pos::Pronoun;
    }
    if DETERMINERS.contains(&word) {
        return Pos::Determiner;
    }
    if PREPOSITIONS.contains(&word) {
        return Pos::Preposition;
    }
    if CONJUNCTIONS.contains(&word) {
        return Pos::Conjunction;
    }
    if COMMON_VERBS.contains(&word) {
        return Pos::Verb;
    }
    if word.len() > 4 && word.ends_with("ly") {
        return Pos::Adverb;
    }
    if word.len() > 4 && (word.ends_with("ing") || word.ends_with("ed")) {
        return Pos::Verb;
    }
    if word.len() > 4
        && (word.ends_with("ous") || word.ends_with("ful") || word.ends_with("ive") || word.ends_with("able"))
    {
        return Pos::Adjective;
    }
    Pos::Noun
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &str) -> Vec<Token> {
        EnglishLemmatizer.lemmatize(raw)
    }

    #[test]
    fn classifies_special_forms() {
        let toks = tokens("hello * + [name] !");
        assert_eq!(toks[0].kind, TokenKind::Word);
        assert_eq!(toks[1].kind, TokenKind::Wildcard { min: 0 });
        assert_eq!(toks[2].kind, TokenKind::Wildcard { min: 1 });
        assert_eq!(toks[3].kind, TokenKind::Variable("name".to_string()));
        assert_eq!(toks[4].kind, TokenKind::Symbol);
    }

    #[test]
    fn words_are_lowercased_and_lemmatised() {
        let toks = tokens("Running Cats");
        assert_eq!(toks[0].normalized, "running");
        assert_eq!(toks[0].lemma, "run");
        assert_eq!(toks[1].normalized, "cats");
        assert_eq!(toks[1].lemma, "cat");
    }

    #[test]
    fn exact_match_literal_clears_fuzzy_layers() {
        let toks = parse_exact_match(tokens("'Run' now"));
        assert_eq!(toks[0].normalized, "run");
        assert_eq!(toks[0].lemma, "");
        assert_eq!(toks[0].pos, Pos::Unknown);
        assert_eq!(toks[1].normalized, "now");
        assert_ne!(toks[1].lemma, "");
    }

    #[test]
    fn apostrophes_are_stripped_from_queries() {
        assert_eq!(strip_apostrophes("don't 'Run'"), "dont Run");
    }

    #[test]
    fn symbols_are_filtered() {
        let toks = filter_symbols(tokens("hey , there !"));
        assert_eq!(toks.len(), 2);
        assert!(toks.iter().all(|t| t.kind == TokenKind::Word));
    }

    #[test]
    fn suffix_lemmas_undouble() {
        assert_eq!(lemma_of("stopped"), "stop");
        assert_eq!(lemma_of("stories"), "story");
        assert_eq!(lemma_of("wishes"), "wish");
        assert_eq!(lemma_of("glass"), "glass");
    }

    #[test]
    fn closed_classes_are_tagged() {
        assert_eq!(tag_of("they"), Pos::Pronoun);
        assert_eq!(tag_of("the"), Pos::Determiner);
        assert_eq!(tag_of("between"), Pos::Preposition);
        assert_eq!(tag_of("42"), Pos::Number);
    }
}

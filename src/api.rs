use crate::engine::metrics::RunResult;
use crate::engine::policy::{LayeredPolicy, MatchPolicy};
use crate::engine::score::{CoverageScorer, ScoringAlgorithm};
use crate::engine::tree::MatchTree;
use crate::text::{EnglishLemmatizer, Lemmatize};
use crate::Rule;

/// Options that affect matching and expansion behaviour.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Recursion cap for `~[var]` template re-dispatch; overrun counts as
    /// expansion failure.
    pub max_expansion_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options { max_expansion_depth: 64 }
    }
}

/// One match produced for an utterance.
///
/// `rule_id`/`input_index` are the match trail: which rule, and which of its
/// input patterns, produced `text`.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// Fully expanded response text.
    pub text: String,
    pub rule_id: u64,
    pub input_index: usize,
    /// Cumulative score stamped by the scoring algorithm; higher is better.
    pub score: f64,
}

/// A rule-driven response engine.
///
/// Rules are inserted up front with [`add`](Engine::add); queries run one at
/// a time, which `&mut self` enforces (the capture stack, scorer and loop
/// detector are engine state). For parallel evaluation, instantiate one
/// engine per thread.
///
/// # Example
/// ```
/// use retort::{Engine, OutputList, Rule};
///
/// let mut engine = Engine::new();
/// engine.add(Rule {
///     id: 1,
///     inputs: vec!["hello *".into()],
///     output: OutputList::always("hi there"),
/// });
///
/// assert_eq!(engine.respond("hello world").unwrap().text, "hi there");
/// assert_eq!(engine.respond("hello").unwrap().text, "hi there");
/// ```
pub struct Engine {
    tree: MatchTree,
}

impl Engine {
    /// Engine with the bundled policy, scorer and lemmatiser.
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        Self::with_parts(
            Box::new(LayeredPolicy),
            Box::new(CoverageScorer::default()),
            Box::new(EnglishLemmatizer),
            options,
        )
    }

    /// Engine with caller-supplied match policy, scoring algorithm and
    /// lemmatiser.
    pub fn with_parts(
        policy: Box<dyn MatchPolicy>,
        scorer: Box<dyn ScoringAlgorithm>,
        lemmatizer: Box<dyn Lemmatize>,
        options: Options,
    ) -> Self {
        Engine { tree: MatchTree::new(policy, scorer, lemmatizer, options) }
    }

    /// Engine preloaded with the built-in smalltalk pack (used by the CLI).
    pub fn with_builtin_rules() -> Self {
        let mut engine = Self::new();
        for rule in crate::rules::smalltalk::get() {
            engine.add(rule);
        }
        engine
    }

    /// Insert a rule. Construction must not interleave with querying.
    pub fn add(&mut self, rule: Rule) {
        self.tree.add(rule);
    }

    /// Best-scoring match for `input`, or `None` when nothing matched.
    pub fn respond(&mut self, input: &str) -> Option<Reply> {
        self.tree.respond(input)
    }

    /// Every match for `input`, score-descending (stable for equal scores).
    pub fn respond_all(&mut self, input: &str) -> Vec<Reply> {
        self.tree.respond_all(input)
    }

    /// Like [`respond_all`](Engine::respond_all), with per-stage timings and
    /// counters for debugging and the CLI report.
    pub fn respond_with_metrics(&mut self, input: &str) -> RunResult {
        self.tree.respond_with_metrics(input)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OutputList;

    #[test]
    fn add_then_respond_round_trip() {
        let mut engine = Engine::new();
        engine.add(rule! {
            id: 1,
            inputs: ["my name is [name]"],
            output: OutputList::always("nice to meet you [name]"),
        });

        let reply = engine.respond("my name is Ada").unwrap();
        assert_eq!(reply.text, "nice to meet you Ada");
        assert_eq!((reply.rule_id, reply.input_index), (1, 0));
    }

    #[test]
    fn builtin_rules_answer_greetings() {
        let mut engine = Engine::with_builtin_rules();
        assert_eq!(engine.respond("hello").unwrap().text, "hi there");
        assert!(engine.respond("hello friend").is_some());
    }

    #[test]
    fn respond_all_reports_every_match() {
        let mut engine = Engine::new();
        engine.add(rule! { id: 1, inputs: ["ping"], output: OutputList::always("pong") });
        engine.add(rule! { id: 2, inputs: ["+"], output: OutputList::always("anything") });

        let replies = engine.respond_all("ping");
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0].text, "pong");
        assert!(replies[0].score > replies[1].score);
    }

    #[test]
    fn metrics_round_trip() {
        let mut engine = Engine::with_builtin_rules();
        let run = engine.respond_with_metrics("hello");
        assert!(!run.replies.is_empty());
        assert!(run.metrics.nodes_visited > 0);
    }
}

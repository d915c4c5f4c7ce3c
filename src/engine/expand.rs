//! Template expansion.
//!
//! Chosen templates are expanded left to right. Two delimited reference
//! forms are understood:
//!
//! - `[name]` substitutes the variable's capture as-is;
//! - `~[name]` re-dispatches the capture through the engine as a fresh
//!   utterance and substitutes the best response.
//!
//! A recursive reference that expands to nothing fails the whole template,
//! which sends terminal handling on to the next omap entry. Recursion depth
//! is capped (see [`Options`](crate::Options)); overrun counts as failure.

use crate::engine::tree::MatchTree;

/// One parsed variable reference inside a template.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct VarRef {
    /// Byte index of the opening delimiter (`[` or `~`).
    pub start: usize,
    pub name: String,
    pub recursive: bool,
}

/// Find the next variable reference at or after `from`, or `None`.
pub(crate) fn parse_variable(template: &str, from: usize) -> Option<VarRef> {
    let re = regex!(r"~?\[([A-Za-z0-9_]+)\]");
    let caps = re.captures(&template[from..])?;
    let whole = caps.get(0)?;
    let name = caps.get(1)?.as_str().to_string();
    Some(VarRef { start: from + whole.start(), name, recursive: whole.as_str().starts_with('~') })
}

impl MatchTree {
    /// Expand `template` against the current variable stack.
    ///
    /// Returns `None` when a recursive reference produced no response or
    /// the recursion cap was hit.
    pub(crate) fn expand(&mut self, template: &str) -> Option<String> {
        let mut out = String::new();
        let mut cursor = 0;

        while let Some(vref) = parse_variable(template, cursor) {
            out.push_str(&template[cursor..vref.start]);
            let value = self.stack.value(&vref.name);

            if vref.recursive {
                let reply = self.rec_response(&value);
                if reply.is_empty() {
                    return None;
                }
                out.push_str(&reply);
                // skip `~[`, the name, `]`
                cursor = vref.start + vref.name.len() + 3;
            } else {
                out.push_str(&value);
                // skip `[`, the name, `]`
                cursor = vref.start + vref.name.len() + 2;
            }
        }

        out.push_str(&template[cursor..]);
        Some(out)
    }

    /// Scoped context switch for a recursive reference: save the stack and
    /// scorer, install fresh ones, query, restore. The inner score and
    /// match trail are discarded; only the response text survives. The loop
    /// detector is deliberately left alone so terminal recursion across
    /// contexts is still caught.
    fn rec_response(&mut self, input: &str) -> String {
        if self.depth >= self.max_depth {
            return String::new();
        }
        self.depth += 1;

        let saved_stack = std::mem::take(&mut self.stack);
        let fresh = self.scorer.fresh();
        let saved_scorer = std::mem::replace(&mut self.scorer, fresh);

        let words = self.query_tokens(input);
        let text = self.respond_inner(&words).into_iter().next().map(|r| r.text).unwrap_or_default();

        self.scorer = saved_scorer;
        self.stack = saved_stack;
        self.depth -= 1;
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::output::OutputList;
    use crate::engine::policy::LayeredPolicy;
    use crate::engine::score::CoverageScorer;
    use crate::text::EnglishLemmatizer;
    use crate::{Options, Rule};

    fn tree() -> MatchTree {
        MatchTree::new(
            Box::new(LayeredPolicy),
            Box::new(CoverageScorer::default()),
            Box::new(EnglishLemmatizer),
            Options::default(),
        )
    }

    #[test]
    fn finds_plain_and_recursive_references() {
        let template = "I heard ~[q] from [name]";
        let first = parse_variable(template, 0).unwrap();
        assert_eq!(first, VarRef { start: 8, name: "q".into(), recursive: true });

        let after = first.start + first.name.len() + 3;
        let second = parse_variable(template, after).unwrap();
        assert_eq!(second, VarRef { start: 18, name: "name".into(), recursive: false });

        assert!(parse_variable(template, second.start + second.name.len() + 2).is_none());
    }

    #[test]
    fn plain_substitution_uses_the_capture() {
        let mut t = tree();
        t.stack.update("name", 0);
        t.stack.capture("Ada", 0);

        assert_eq!(t.expand("nice to meet you [name]").as_deref(), Some("nice to meet you Ada"));
        // Unknown references substitute an empty capture.
        assert_eq!(t.expand("hello [nobody]!").as_deref(), Some("hello !"));
    }

    #[test]
    fn recursive_substitution_queries_the_tree() {
        let mut t = tree();
        t.add(Rule { id: 9, inputs: vec!["hello".into()], output: OutputList::always("hi there") });
        t.stack.update("q", 0);
        t.stack.capture("hello", 0);

        assert_eq!(t.expand("I heard ~[q]").as_deref(), Some("I heard hi there"));
        // The outer capture survives the context switch.
        assert_eq!(t.stack.value("q"), "hello");
    }

    #[test]
    fn empty_recursive_response_fails_the_expansion() {
        let mut t = tree();
        t.stack.update("q", 0);
        t.stack.capture("unmatched", 0);

        assert_eq!(t.expand("I heard ~[q]"), None);
    }

    #[test]
    fn depth_cap_turns_into_expansion_failure() {
        let mut t = tree();
        t.add(Rule { id: 1, inputs: vec!["hello".into()], output: OutputList::always("hi") });
        t.stack.update("q", 0);
        t.stack.capture("hello", 0);

        t.depth = t.max_depth;
        assert_eq!(t.expand("~[q]"), None);
        t.depth = 0;
        assert_eq!(t.expand("~[q]").as_deref(), Some("hi"));
    }
}

//! Conditional output lists and the packed omap key.
//!
//! Every rule maps its inputs to one ordered list of `(condition, template)`
//! pairs. The same list is installed at every output node the rule's inputs
//! terminate at, so the storage is shared and immutable: cloning an
//! [`OutputList`] copies an `Arc`, not the cases.
//!
//! Selection is first-satisfied-wins: [`OutputList::next_valid`] walks the
//! pairs in authored order and returns the first template whose condition
//! holds against the current variable stack.

use std::sync::Arc;

use regex::Regex;

use super::stack::VarStack;

/// Packed `(rule_id, input_index)` omap key.
///
/// The low [`INPUT_BITS`] bits hold the input index, the rest the rule id,
/// which caps a rule at 1024 inputs. Indexes beyond the cap are masked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct OmapKey(u64);

const INPUT_BITS: u32 = 10;
const INPUT_MASK: u64 = (1 << INPUT_BITS) - 1;

impl OmapKey {
    pub(crate) fn new(rule_id: u64, input_index: usize) -> Self {
        debug_assert!((input_index as u64) <= INPUT_MASK, "more than 1024 inputs on one rule");
        OmapKey((rule_id << INPUT_BITS) | (input_index as u64 & INPUT_MASK))
    }

    pub(crate) fn rule_id(self) -> u64 {
        self.0 >> INPUT_BITS
    }

    pub(crate) fn input_index(self) -> usize {
        (self.0 & INPUT_MASK) as usize
    }
}

/// Guard on a single output case.
///
/// Conditions are evaluated against the captures accumulated during the
/// match, so they can branch on what a `[variable]` consumed.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Always satisfied.
    Always,
    /// Satisfied when the named variable captured at least one word.
    Defined(String),
    /// Satisfied when the named variable's capture equals the given text
    /// (ASCII case-insensitive).
    Equals(String, String),
    /// Satisfied when the named variable's capture matches the regex
    /// (typically built with the `regex!` macro).
    Matches(String, &'static Regex),
}

impl Condition {
    pub(crate) fn satisfied(&self, stack: &VarStack) -> bool {
        match self {
            Condition::Always => true,
            Condition::Defined(name) => !stack.value(name).is_empty(),
            Condition::Equals(name, expected) => stack.value(name).eq_ignore_ascii_case(expected),
            Condition::Matches(name, re) => re.is_match(&stack.value(name)),
        }
    }
}

#[derive(Debug)]
struct OutputCase {
    condition: Condition,
    template: String,
}

/// Ordered `(condition, template)` pairs with shared immutable storage.
#[derive(Debug, Clone)]
pub struct OutputList {
    cases: Arc<[OutputCase]>,
}

impl OutputList {
    /// Single unconditional template.
    pub fn always(template: &str) -> Self {
        OutputList::builder().when(Condition::Always, template).build()
    }

    pub fn builder() -> OutputListBuilder {
        OutputListBuilder { cases: Vec::new() }
    }

    /// First template whose condition holds against `stack`, or `None`.
    pub(crate) fn next_valid(&self, stack: &VarStack) -> Option<String> {
        self.cases.iter().find(|case| case.condition.satisfied(stack)).map(|case| case.template.clone())
    }
}

/// Builder collecting cases in authored order.
#[derive(Debug)]
pub struct OutputListBuilder {
    cases: Vec<OutputCase>,
}

impl OutputListBuilder {
    pub fn when(mut self, condition: Condition, template: &str) -> Self {
        self.cases.push(OutputCase { condition, template: template.to_string() });
        self
    }

    /// Terminal unconditional case, then build.
    pub fn otherwise(self, template: &str) -> OutputList {
        self.when(Condition::Always, template).build()
    }

    pub fn build(self) -> OutputList {
        OutputList { cases: self.cases.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack_with(name: &str, word: &str) -> VarStack {
        let mut stack = VarStack::default();
        stack.update(name, 0);
        stack.capture(word, 0);
        stack
    }

    #[test]
    fn key_packs_and_decodes() {
        let key = OmapKey::new(123_456, 1023);
        assert_eq!(key.rule_id(), 123_456);
        assert_eq!(key.input_index(), 1023);
    }

    #[test]
    fn first_satisfied_wins() {
        let list = OutputList::builder()
            .when(Condition::Defined("name".into()), "hello [name]")
            .otherwise("hello there");

        assert_eq!(list.next_valid(&stack_with("name", "Ada")).as_deref(), Some("hello [name]"));
        assert_eq!(list.next_valid(&VarStack::default()).as_deref(), Some("hello there"));
    }

    #[test]
    fn equals_is_case_insensitive() {
        let list = OutputList::builder().when(Condition::Equals("name".into(), "ada".into()), "hi").build();
        assert!(list.next_valid(&stack_with("name", "Ada")).is_some());
        assert!(list.next_valid(&stack_with("name", "Grace")).is_none());
    }

    #[test]
    fn matches_runs_the_regex_against_the_capture() {
        let list = OutputList::builder().when(Condition::Matches("n".into(), regex!(r"^\d+$")), "num").build();
        assert!(list.next_valid(&stack_with("n", "42")).is_some());
        assert!(list.next_valid(&stack_with("n", "forty")).is_none());
    }

    #[test]
    fn clones_share_storage() {
        let list = OutputList::always("hi");
        let copy = list.clone();
        assert!(Arc::ptr_eq(&list.cases, &copy.cases));
    }
}

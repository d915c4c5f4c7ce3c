//! Match tree construction.
//!
//! Rules compile into a trie-like automaton. Nodes live in an arena
//! (`Vec<Node>` indexed by `NodeId`); child lists and parent back-references
//! are indices, and the wildcard/variable self-loop is an explicit flag
//! rather than a self-index, so no reference cycles exist.
//!
//! ## Structural invariants
//!
//! 1. The root has no parent; every other node has exactly one. Shortcut
//!    edges never change the parent relation.
//! 2. Within one parent, word children are unique per token and at most one
//!    wildcard child exists; inserting `*` over an existing `+` lowers its
//!    `min` to 0.
//! 3. **Zero-hop shortcut**: every child of a `min = 0` wildcard also
//!    appears in the wildcard's parent's child list, which is how `*` gets
//!    to consume zero tokens. Lowering `min` via rule merging re-splices
//!    children inserted while `min` was 1.
//! 4. `omap` is non-empty exactly on nodes where at least one rule input
//!    terminates.
//! 5. The tree is append-only once built; there is no rule deletion.
//!
//! A child list can therefore contain indices whose parent is elsewhere
//! (shortcut entries); anything walking "real" children must follow the
//! parent back-reference instead.

use std::collections::HashSet;

use crate::engine::output::{OmapKey, OutputList};
use crate::engine::policy::MatchPolicy;
use crate::engine::score::ScoringAlgorithm;
use crate::engine::stack::VarStack;
use crate::text::{self, Lemmatize};
use crate::{Options, Rule, Token, TokenKind};

pub(crate) type NodeId = usize;

/// Index of the root node in the arena.
pub(crate) const ROOT: NodeId = 0;

/// Payload of a single automaton position.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Holds the top-level children; never matches and never carries output.
    Root,
    /// Matches when the policy weighs the stored token against the input
    /// token above zero.
    Word(Token),
    /// Consumes consecutive input tokens; `min = 0` for `*`, `1` for `+`.
    Wildcard { original: String, min: usize },
    /// Wildcard that captures what it consumed under `name`.
    Variable { name: String },
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    /// Ordered child edges; may include zero-hop shortcut entries whose
    /// parent is a wildcard below this node.
    pub(crate) children: Vec<NodeId>,
    /// Loop edge; traversed ahead of the real children.
    pub(crate) self_loop: bool,
    /// Insertion-ordered `(rule, input)` outputs terminating here.
    pub(crate) omap: Vec<(OmapKey, OutputList)>,
}

/// The match automaton plus its per-query state.
///
/// The variable stack, scorer, loop detector and counters are instance
/// state, so queries require `&mut self` and must not be interleaved with
/// construction. See the module docs on `engine` for the full pipeline.
pub(crate) struct MatchTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) policy: Box<dyn MatchPolicy>,
    pub(crate) scorer: Box<dyn ScoringAlgorithm>,
    pub(crate) lemmatizer: Box<dyn Lemmatize>,
    pub(crate) stack: VarStack,
    /// `(node, offset)` pairs currently on the terminal-handling stack.
    pub(crate) terminals: HashSet<(NodeId, usize)>,
    /// Current expansion recursion depth and its cap.
    pub(crate) depth: usize,
    pub(crate) max_depth: usize,
    // Per-query counters surfaced through metrics.
    pub(crate) visited: usize,
    pub(crate) terminals_reached: usize,
    pub(crate) failed_expansions: usize,
}

impl MatchTree {
    pub(crate) fn new(
        policy: Box<dyn MatchPolicy>,
        scorer: Box<dyn ScoringAlgorithm>,
        lemmatizer: Box<dyn Lemmatize>,
        options: Options,
    ) -> Self {
        let root = Node { kind: NodeKind::Root, parent: None, children: Vec::new(), self_loop: false, omap: Vec::new() };
        MatchTree {
            nodes: vec![root],
            policy,
            scorer,
            lemmatizer,
            stack: VarStack::default(),
            terminals: HashSet::new(),
            depth: 0,
            max_depth: options.max_expansion_depth,
            visited: 0,
            terminals_reached: 0,
            failed_expansions: 0,
        }
    }

    /// Insert a rule: one traversal per input pattern, then install the
    /// shared output list at every terminal.
    ///
    /// ```text
    /// "hello *"      root ── hello ── ✱        omap at ✱ and (trailing-star
    /// "hello there"          │    └── there     shortcut) at hello
    /// ```
    pub(crate) fn add(&mut self, rule: Rule) {
        let mut output_nodes: Vec<(usize, NodeId)> = Vec::new();

        for (index, input) in rule.inputs.iter().enumerate() {
            let words = self.rule_tokens(input);
            if words.is_empty() {
                continue;
            }

            let mut node = ROOT;
            for token in &words {
                node = self.add_node(token, node);
            }
            output_nodes.push((index, node));

            // A trailing `*` may consume nothing, so the input also
            // terminates at the wildcard's parent.
            let trailing_star = matches!(words.last().map(|t| &t.kind), Some(TokenKind::Wildcard { min: 0 }));
            if trailing_star {
                if let Some(parent) = self.nodes[node].parent {
                    if parent != ROOT {
                        output_nodes.push((index, parent));
                    }
                }
            }
        }

        for (index, node) in output_nodes {
            let key = OmapKey::new(rule.id, index);
            self.nodes[node].omap.push((key, rule.output.clone()));
        }
    }

    /// Traverse to (or create) the child of `parent` for one pattern token.
    fn add_node(&mut self, token: &Token, parent: NodeId) -> NodeId {
        match &token.kind {
            TokenKind::Word => {
                if let Some(existing) = self.find_word_child(parent, token) {
                    return existing;
                }
                self.new_child(NodeKind::Word(token.clone()), parent, false)
            }
            TokenKind::Wildcard { min } => {
                if let Some(existing) = self.find_wildcard_child(parent) {
                    if *min == 0 {
                        self.lower_min(existing);
                    }
                    return existing;
                }
                let kind = NodeKind::Wildcard { original: token.original.clone(), min: *min };
                self.new_child(kind, parent, true)
            }
            TokenKind::Variable(name) => {
                if let Some(existing) = self.find_variable_child(parent, name) {
                    return existing;
                }
                self.new_child(NodeKind::Variable { name: name.clone() }, parent, true)
            }
            // Symbols are filtered before insertion; a stray one stays put.
            TokenKind::Symbol => parent,
        }
    }

    fn find_word_child(&self, parent: NodeId, token: &Token) -> Option<NodeId> {
        self.nodes[parent].children.iter().copied().find(|&c| match &self.nodes[c].kind {
            NodeKind::Word(t) => t.normalized == token.normalized && t.lemma == token.lemma,
            _ => false,
        })
    }

    fn find_wildcard_child(&self, parent: NodeId) -> Option<NodeId> {
        self.nodes[parent]
            .children
            .iter()
            .copied()
            .find(|&c| matches!(self.nodes[c].kind, NodeKind::Wildcard { .. }))
    }

    fn find_variable_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[parent].children.iter().copied().find(|&c| match &self.nodes[c].kind {
            NodeKind::Variable { name: n } => n == name,
            _ => false,
        })
    }

    fn new_child(&mut self, kind: NodeKind, parent: NodeId, self_loop: bool) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node { kind, parent: Some(parent), children: Vec::new(), self_loop, omap: Vec::new() });
        self.nodes[parent].children.push(id);

        // Zero-hop shortcut: under a `*` parent the new node is reachable
        // from the grandparent without consuming a token.
        if matches!(self.nodes[parent].kind, NodeKind::Wildcard { min: 0, .. }) {
            if let Some(grandparent) = self.nodes[parent].parent {
                self.nodes[grandparent].children.push(id);
            }
        }
        id
    }

    /// Merge `*` into an existing `+` child, restoring the zero-hop
    /// shortcut for children inserted while `min` was still 1.
    fn lower_min(&mut self, node: NodeId) {
        match &mut self.nodes[node].kind {
            NodeKind::Wildcard { min, .. } if *min > 0 => *min = 0,
            _ => return,
        }

        let Some(parent) = self.nodes[node].parent else { return };
        let children = self.nodes[node].children.clone();
        for child in children {
            if !self.nodes[parent].children.contains(&child) {
                self.nodes[parent].children.push(child);
            }
        }
    }

    /// Outgoing edges in traversal order: the loop edge first, then the
    /// ordered children (including shortcut entries).
    pub(crate) fn edges_of(&self, node: NodeId) -> Vec<NodeId> {
        let n = &self.nodes[node];
        let mut edges = Vec::with_capacity(n.children.len() + 1);
        if n.self_loop {
            edges.push(node);
        }
        edges.extend_from_slice(&n.children);
        edges
    }

    /// Tokens for one rule input: exact-match rewriting, symbols dropped.
    pub(crate) fn rule_tokens(&self, input: &str) -> Vec<Token> {
        text::filter_symbols(text::parse_exact_match(self.lemmatizer.lemmatize(input)))
    }

    /// Tokens for a user utterance: apostrophes stripped, symbols dropped.
    pub(crate) fn query_tokens(&self, input: &str) -> Vec<Token> {
        text::filter_symbols(self.lemmatizer.lemmatize(&text::strip_apostrophes(input)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::policy::LayeredPolicy;
    use crate::engine::score::CoverageScorer;
    use crate::text::EnglishLemmatizer;

    fn tree() -> MatchTree {
        MatchTree::new(
            Box::new(LayeredPolicy),
            Box::new(CoverageScorer::default()),
            Box::new(EnglishLemmatizer),
            Options::default(),
        )
    }

    fn add(tree: &mut MatchTree, id: u64, input: &str) {
        tree.add(Rule { id, inputs: vec![input.to_string()], output: OutputList::always("ok") });
    }

    fn wildcard_children(tree: &MatchTree, parent: NodeId) -> Vec<NodeId> {
        tree.nodes[parent]
            .children
            .iter()
            .copied()
            .filter(|&c| matches!(tree.nodes[c].kind, NodeKind::Wildcard { .. }))
            .collect()
    }

    #[test]
    fn shared_literal_prefixes_reuse_nodes() {
        let mut t = tree();
        add(&mut t, 1, "good morning sir");
        let before = t.nodes.len();
        add(&mut t, 2, "good morning madam");
        // Only the diverging word allocates.
        assert_eq!(t.nodes.len(), before + 1);
    }

    #[test]
    fn star_subsumes_plus() {
        let mut t = tree();
        add(&mut t, 1, "take + items");
        add(&mut t, 2, "take * items");

        let take = t.nodes[ROOT].children[0];
        let wildcards = wildcard_children(&t, take);
        assert_eq!(wildcards.len(), 1);
        let NodeKind::Wildcard { min, .. } = &t.nodes[wildcards[0]].kind else {
            panic!("expected a wildcard child");
        };
        assert_eq!(*min, 0);

        // The merge re-splices "items" into the grandparent's child list.
        let items = t.nodes[wildcards[0]].children.iter().copied().find(|&c| !t.nodes[c].self_loop);
        assert!(items.is_some_and(|c| t.nodes[take].children.contains(&c)));
    }

    #[test]
    fn zero_hop_shortcut_is_spliced_on_creation() {
        let mut t = tree();
        add(&mut t, 1, "a * b");

        let a = t.nodes[ROOT].children[0];
        let star = wildcard_children(&t, a)[0];
        let b = t.nodes[star].children[0];
        assert!(matches!(t.nodes[b].kind, NodeKind::Word(_)));
        assert!(t.nodes[a].children.contains(&b));
        // Shortcut edges never change the parent relation.
        assert_eq!(t.nodes[b].parent, Some(star));
    }

    #[test]
    fn trailing_star_also_terminates_at_its_parent() {
        let mut t = tree();
        add(&mut t, 7, "hello *");

        let hello = t.nodes[ROOT].children[0];
        let star = wildcard_children(&t, hello)[0];
        assert_eq!(t.nodes[star].omap.len(), 1);
        assert_eq!(t.nodes[hello].omap.len(), 1);
        assert_eq!(t.nodes[hello].omap[0].0.rule_id(), 7);
    }

    #[test]
    fn lone_star_does_not_terminate_at_the_root() {
        let mut t = tree();
        add(&mut t, 1, "*");

        let star = t.nodes[ROOT].children[0];
        assert_eq!(t.nodes[star].omap.len(), 1);
        assert!(t.nodes[ROOT].omap.is_empty());
    }

    #[test]
    fn empty_and_symbol_only_inputs_are_skipped() {
        let mut t = tree();
        let before = t.nodes.len();
        t.add(Rule { id: 1, inputs: vec!["".into(), "?!".into()], output: OutputList::always("ok") });
        assert_eq!(t.nodes.len(), before);
    }

    #[test]
    fn wildcards_and_variables_self_loop() {
        let mut t = tree();
        add(&mut t, 1, "echo [words]");
        add(&mut t, 2, "skip +");

        let echo = t.nodes[ROOT].children[0];
        let var = t.nodes[echo].children[0];
        assert!(matches!(&t.nodes[var].kind, NodeKind::Variable { name } if name == "words"));
        assert!(t.nodes[var].self_loop);
        assert_eq!(t.edges_of(var)[0], var);

        let skip = t.nodes[ROOT].children[1];
        let plus = t.nodes[skip].children[0];
        assert!(t.nodes[plus].self_loop);
    }

    #[test]
    fn same_rule_inputs_share_one_output_list() {
        let mut t = tree();
        t.add(Rule {
            id: 3,
            inputs: vec!["hi".into(), "hey".into()],
            output: OutputList::always("hello"),
        });

        let hi = t.nodes[ROOT].children[0];
        let hey = t.nodes[ROOT].children[1];
        assert_eq!(t.nodes[hi].omap[0].0.input_index(), 0);
        assert_eq!(t.nodes[hey].omap[0].0.input_index(), 1);
        assert_eq!(t.nodes[hi].omap[0].0.rule_id(), 3);
    }
}

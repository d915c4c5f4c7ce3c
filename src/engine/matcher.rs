//! Scored depth-first search.
//!
//! The matcher walks the input tokens against the tree, one edge per token:
//!
//! ```text
//! offset:   0        1        2
//! input:    my       name     is ...
//!           │        │
//! root ──▶ my ──▶ name ──▶ ...          weight per edge via the policy
//!           │
//!           └─ [x] ─┐  (self-loop consumes further tokens;
//!              ▲────┘   zero-hop shortcuts let `*` consume none)
//! ```
//!
//! Reaching the end of the input at a node triggers terminal handling:
//! conditional output selection, template expansion, and score stamping.
//! A `(node, offset)` set guards terminal handling against re-entry from
//! recursive expansion, which is what makes self-referential rules
//! terminate.
//!
//! Candidates accumulate in discovery order; the final stable sort by
//! descending score preserves that order among ties.

use std::cmp::Ordering;
use std::time::Instant;

use crate::engine::metrics::{RunMetrics, RunResult};
use crate::engine::tree::{MatchTree, NodeId, NodeKind, ROOT};
use crate::{Reply, Token};

impl MatchTree {
    /// All matches for `input`, best first.
    pub(crate) fn respond_all(&mut self, input: &str) -> Vec<Reply> {
        self.begin_query();
        let words = self.query_tokens(input);
        self.respond_inner(&words)
    }

    /// Best match only.
    pub(crate) fn respond(&mut self, input: &str) -> Option<Reply> {
        self.respond_all(input).into_iter().next()
    }

    /// Like [`respond_all`], with per-stage timings and counters.
    pub(crate) fn respond_with_metrics(&mut self, input: &str) -> RunResult {
        self.begin_query();
        let total_start = Instant::now();

        let tokenize_start = Instant::now();
        let words = self.query_tokens(input);
        let tokenize = tokenize_start.elapsed();

        let search_start = Instant::now();
        let replies = self.respond_inner(&words);
        let search = search_start.elapsed();

        RunResult {
            replies,
            metrics: RunMetrics {
                total: total_start.elapsed(),
                tokenize,
                search,
                nodes_visited: self.visited,
                terminals_reached: self.terminals_reached,
                failed_expansions: self.failed_expansions,
            },
        }
    }

    /// Reset the per-query instance state (top-level entries only; recursive
    /// re-dispatch installs fresh stack/scorer itself and must keep the loop
    /// detector intact).
    fn begin_query(&mut self) {
        self.stack.clear();
        self.scorer.reset();
        self.terminals.clear();
        self.depth = 0;
        self.visited = 0;
        self.terminals_reached = 0;
        self.failed_expansions = 0;
    }

    /// Search shared by top-level queries and recursive re-dispatch.
    pub(crate) fn respond_inner(&mut self, words: &[Token]) -> Vec<Reply> {
        let mut results = Vec::new();
        if !words.is_empty() {
            self.scored_dfs(&mut results, ROOT, words, 0);
        }
        // Stable: equal scores keep discovery order.
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        results
    }

    fn scored_dfs(&mut self, results: &mut Vec<Reply>, node: NodeId, words: &[Token], offset: usize) {
        for edge in self.edges_of(node) {
            self.visited += 1;

            let var_name = match &self.nodes[edge].kind {
                NodeKind::Variable { name } => Some(name.clone()),
                _ => None,
            };
            let weight = self.policy.weight(&self.nodes[edge].kind, &words[offset]);

            // Ownership is recorded ahead of the match decision so that
            // anonymous wildcards track their offsets too.
            self.stack.update(var_name.as_deref().unwrap_or(""), offset);

            if weight > 0.0 {
                self.stack.capture(&words[offset].original, offset);
                self.scorer.update_score(offset, weight);
                if offset + 1 < words.len() {
                    self.scored_dfs(results, edge, words, offset + 1);
                } else {
                    self.handle_end_word(results, edge, offset);
                }
            }
        }
    }

    /// End of input reached at `node`.
    fn handle_end_word(&mut self, results: &mut Vec<Reply>, node: NodeId, offset: usize) {
        if !self.terminals.insert((node, offset)) {
            // Recursive expansion re-reached this terminal; abort the branch.
            return;
        }
        self.terminals_reached += 1;
        let candidate = self.valid_output(node);
        self.terminals.remove(&(node, offset));

        if let Some(mut reply) = candidate {
            reply.score = self.scorer.current_score();
            if std::env::var_os("RETORT_DEBUG_MATCH").is_some() {
                eprintln!(
                    "[terminal] node={} rule={} input={} score={:.3} text=\"{}\"",
                    node, reply.rule_id, reply.input_index, reply.score, reply.text
                );
            }
            results.push(reply);
        }
    }

    /// Walk the node's omap in order. Per entry, only the first satisfied
    /// template is tried; expansion failure moves on to the next entry.
    fn valid_output(&mut self, node: NodeId) -> Option<Reply> {
        let entries = self.nodes[node].omap.clone();
        for (key, outputs) in entries {
            let Some(template) = outputs.next_valid(&self.stack) else {
                continue;
            };
            match self.expand(&template) {
                Some(text) => {
                    return Some(Reply {
                        text,
                        rule_id: key.rule_id(),
                        input_index: key.input_index(),
                        score: 0.0,
                    });
                }
                None => {
                    self.failed_expansions += 1;
                    if std::env::var_os("RETORT_DEBUG_MATCH").is_some() {
                        eprintln!(
                            "[expand:failed] rule={} input={} template=\"{}\"",
                            key.rule_id(),
                            key.input_index(),
                            template
                        );
                    }
                }
            }
        }
        None
    }
}

//! Query metrics.
//!
//! A small set of structs used to observe engine behaviour per query:
//!
//! - [`Engine::respond`](crate::Engine::respond) /
//!   [`respond_all`](crate::Engine::respond_all) for normal operation.
//! - [`respond_with_metrics`](crate::Engine::respond_with_metrics) for
//!   profiling and rule debugging; the CLI report is built from this.
//!
//! Counters are collected unconditionally (they are a handful of integer
//! bumps); the timing split is only as fine as the pipeline stages.

use std::time::Duration;

use crate::Reply;

/// Timings and counters for one query.
#[derive(Debug, Default, Clone)]
pub struct RunMetrics {
    /// Total elapsed time for the query.
    pub total: Duration,
    /// Time spent stripping/tokenising the input.
    pub tokenize: Duration,
    /// Time spent in the scored DFS, including expansion work it triggers.
    pub search: Duration,
    /// Edges weighed during the walk.
    pub nodes_visited: usize,
    /// End-of-input terminals reached (before output selection).
    pub terminals_reached: usize,
    /// Templates that failed to expand (empty recursive response or depth
    /// cap), causing a fall-through to the next omap entry.
    pub failed_expansions: usize,
}

/// Replies bundled with timing information.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Matches in score-descending order.
    pub replies: Vec<Reply>,
    /// Measurements for the run.
    pub metrics: RunMetrics,
}

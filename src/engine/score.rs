//! Cumulative scoring.
//!
//! The DFS reports one `(offset, weight)` pair per consumed token; the
//! scoring algorithm folds them into the score stamped on a candidate when
//! it reaches a terminal. The tree treats the algorithm as opaque.

/// Pluggable cumulative scorer.
///
/// `update_score` may be called repeatedly for the same offset as the DFS
/// backtracks into sibling edges; implementations must treat the latest
/// value per offset as current. `fresh` hands the matcher a brand-new
/// instance for recursive expansion contexts.
pub trait ScoringAlgorithm {
    fn update_score(&mut self, offset: usize, weight: f64);
    fn current_score(&self) -> f64;
    fn reset(&mut self);
    fn fresh(&self) -> Box<dyn ScoringAlgorithm>;
}

/// Default scorer: mean per-offset weight.
///
/// Every path that reaches a terminal has written every slot, so the mean is
/// always taken over exactly the current path's weights. Scores stay in
/// `[0, 1]` regardless of input length.
#[derive(Debug, Default)]
pub struct CoverageScorer {
    slots: Vec<f64>,
}

impl ScoringAlgorithm for CoverageScorer {
    fn update_score(&mut self, offset: usize, weight: f64) {
        if self.slots.len() <= offset {
            self.slots.resize(offset + 1, 0.0);
        }
        self.slots[offset] = weight;
    }

    fn current_score(&self) -> f64 {
        if self.slots.is_empty() {
            return 0.0;
        }
        self.slots.iter().sum::<f64>() / self.slots.len() as f64
    }

    fn reset(&mut self) {
        self.slots.clear();
    }

    fn fresh(&self) -> Box<dyn ScoringAlgorithm> {
        Box::new(CoverageScorer::default())
    }
}

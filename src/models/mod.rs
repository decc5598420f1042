//! Stateless analytic models
//!
//! Each calculator is a unit struct with associated functions, independent of
//! the others and of the session store.

mod brain_move;
mod difficulty;
mod flow;
mod load;
mod reaction;

pub use brain_move::BrainMoveScoring;
pub use difficulty::AdaptiveDifficultyEngine;
pub use flow::FlowStateDetector;
pub use load::CognitiveLoadCalculator;
pub use reaction::ReactionTimeAnalyzer;

/// Arithmetic mean; `None` for an empty slice
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

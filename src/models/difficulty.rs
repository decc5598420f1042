//! Adaptive difficulty recommendation

use super::mean;

const MIN_DIFFICULTY: f64 = 1.0;
const MAX_DIFFICULTY: f64 = 5.0;
const DIFFICULTY_STEP: f64 = 0.5;
/// Number of most recent scores considered
const RECENT_WINDOW: usize = 3;
const STEP_UP_ABOVE: f64 = 80.0;
const STEP_DOWN_BELOW: f64 = 50.0;

pub struct AdaptiveDifficultyEngine;

impl AdaptiveDifficultyEngine {
    /// Next difficulty level (1-5) given the current one and past scores.
    ///
    /// Averages the last three scores: above 80 steps up by 0.5, below 50
    /// steps down by 0.5. Shorter histories leave the level unchanged.
    pub fn recommend_difficulty(current_difficulty: f64, performance_history: &[f64]) -> f64 {
        if performance_history.len() < RECENT_WINDOW {
            return current_difficulty;
        }

        let recent = &performance_history[performance_history.len() - RECENT_WINDOW..];
        let avg = mean(recent).unwrap_or(0.0);

        if avg > STEP_UP_ABOVE {
            (current_difficulty + DIFFICULTY_STEP).min(MAX_DIFFICULTY)
        } else if avg < STEP_DOWN_BELOW {
            (current_difficulty - DIFFICULTY_STEP).max(MIN_DIFFICULTY)
        } else {
            current_difficulty
        }
    }
}

//! Cognitive load estimation

/// Time spent at which the time factor saturates (one minute)
const TIME_SATURATION_MS: f64 = 60_000.0;

const COMPLEXITY_WEIGHT: f64 = 0.4;
const PERFORMANCE_WEIGHT: f64 = 0.4;
const TIME_WEIGHT: f64 = 0.2;

pub struct CognitiveLoadCalculator;

impl CognitiveLoadCalculator {
    /// Estimated load (0-100) for a task
    ///
    /// Formula:
    /// ```text
    /// load = (0.4 * complexity / 100
    ///       + 0.4 * (100 - performance) / 100
    ///       + 0.2 * min(1, time_spent_ms / 60000)) * 100
    /// ```
    /// High complexity, poor performance and long time all raise the load.
    pub fn calculate_load(task_complexity: f64, performance_score: f64, time_spent_ms: f64) -> f64 {
        let complexity_factor = task_complexity / 100.0;
        let performance_factor = (100.0 - performance_score) / 100.0;
        let time_factor = (time_spent_ms / TIME_SATURATION_MS).min(1.0);

        (complexity_factor * COMPLEXITY_WEIGHT
            + performance_factor * PERFORMANCE_WEIGHT
            + time_factor * TIME_WEIGHT)
            * 100.0
    }
}

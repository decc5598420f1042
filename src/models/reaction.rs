//! Reaction-time analysis: processing speed and fatigue

use super::mean;

/// Mean reaction time (ms) that maps to a perfect speed score
const FASTEST_REACTION_MS: f64 = 200.0;
/// Milliseconds of mean reaction time per lost point
const MS_PER_POINT: f64 = 8.0;
/// Fewer samples than this are too noisy for fatigue detection
const MIN_FATIGUE_SAMPLES: usize = 5;

/// Derives speed and fatigue indicators from per-trial reaction times (ms)
pub struct ReactionTimeAnalyzer;

impl ReactionTimeAnalyzer {
    /// Processing speed score (0-100)
    ///
    /// Formula: `clamp(100 - (mean_rt - 200) / 8, 0, 100)`.
    /// 200ms maps to 100, 600ms to 50, 1000ms and slower to 0.
    pub fn calculate_processing_speed(reaction_times: &[f64]) -> f64 {
        match mean(reaction_times) {
            Some(avg) => (100.0 - (avg - FASTEST_REACTION_MS) / MS_PER_POINT).clamp(0.0, 100.0),
            None => 0.0,
        }
    }

    /// Percent slowdown of the second half of a run relative to the first.
    ///
    /// On odd-length input the second half takes the extra sample. Getting
    /// faster reports 0.
    pub fn detect_cognitive_fatigue(reaction_times: &[f64]) -> f64 {
        if reaction_times.len() < MIN_FATIGUE_SAMPLES {
            return 0.0;
        }

        let (first, second) = reaction_times.split_at(reaction_times.len() / 2);
        let (Some(avg_first), Some(avg_second)) = (mean(first), mean(second)) else {
            return 0.0;
        };

        if avg_first <= 0.0 {
            return 0.0;
        }

        (((avg_second - avg_first) / avg_first) * 100.0).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_speed() {
        assert_eq!(ReactionTimeAnalyzer::calculate_processing_speed(&[]), 0.0);
        assert_eq!(ReactionTimeAnalyzer::calculate_processing_speed(&[200.0, 200.0]), 100.0);
        assert_eq!(ReactionTimeAnalyzer::calculate_processing_speed(&[500.0, 700.0]), 50.0);
        assert_eq!(ReactionTimeAnalyzer::calculate_processing_speed(&[1500.0]), 0.0);
        assert_eq!(ReactionTimeAnalyzer::calculate_processing_speed(&[120.0]), 100.0);
    }

    #[test]
    fn test_fatigue_needs_five_samples() {
        assert_eq!(
            ReactionTimeAnalyzer::detect_cognitive_fatigue(&[300.0, 300.0, 600.0, 600.0]),
            0.0
        );
    }

    #[test]
    fn test_fatigue_detects_slowdown() {
        // first half [300, 300], second half [400, 400, 400]
        let fatigue =
            ReactionTimeAnalyzer::detect_cognitive_fatigue(&[300.0, 300.0, 400.0, 400.0, 400.0]);
        assert!((fatigue - 33.333_333).abs() < 1e-3);
    }

    #[test]
    fn test_fatigue_ignores_improvement() {
        let fatigue = ReactionTimeAnalyzer::detect_cognitive_fatigue(&[
            500.0, 480.0, 460.0, 300.0, 280.0, 260.0,
        ]);
        assert_eq!(fatigue, 0.0);
    }
}

//! Derived dashboard views over the session history
//!
//! Every view is recomputed from the full history on each call, so results
//! always reflect the latest appended session. Cost is linear in the number
//! of sessions.

use chrono::{DateTime, Utc};

use crate::models::BrainMoveScoring;
use crate::types::{
    BrainMoveProfile, DomainScores, ModuleAverages, ModuleType, PerformanceTrend, ReportData,
    SessionRecord, StressToleranceProfile,
};

/// Module treated as the stress condition
const STRESS_MODULE: ModuleType = ModuleType::Sensory;

/// Read-only aggregator over a chronological session slice
#[derive(Debug, Clone, Copy)]
pub struct MetricsAggregator<'a> {
    sessions: &'a [SessionRecord],
}

impl<'a> MetricsAggregator<'a> {
    pub fn new(sessions: &'a [SessionRecord]) -> Self {
        Self { sessions }
    }

    /// Sessions of one module, in storage order
    pub fn get_sessions_by_module(&self, module: ModuleType) -> Vec<&'a SessionRecord> {
        self.sessions
            .iter()
            .filter(|s| s.module_type == module)
            .collect()
    }

    /// Mean score per module, 0 where a module has no sessions
    pub fn get_average_scores(&self) -> ModuleAverages {
        let mut averages = ModuleAverages::default();

        for module in ModuleType::ALL {
            let scores: Vec<f64> = self
                .get_sessions_by_module(module)
                .iter()
                .map(|s| s.score)
                .collect();
            averages.set(module, mean_or_zero(&scores));
        }

        averages
    }

    /// Every session projected to `(date, score, module)`, chronologically
    pub fn get_performance_trend(&self) -> Vec<PerformanceTrend> {
        self.sessions
            .iter()
            .map(|s| PerformanceTrend {
                date: s.timestamp,
                score: s.score,
                module_type: s.module_type,
            })
            .collect()
    }

    /// Percent change from the very first to the very last session.
    ///
    /// Mixes module types; 0 with fewer than two sessions.
    pub fn get_improvement_rate(&self) -> f64 {
        match (self.sessions.first(), self.sessions.last()) {
            (Some(first), Some(last)) if self.sessions.len() >= 2 => {
                percent_change(first.score, last.score)
            }
            _ => 0.0,
        }
    }

    /// Stress-module performance compared with all other modules
    pub fn get_stress_tolerance_profile(&self) -> StressToleranceProfile {
        let baseline_scores: Vec<f64> = self
            .sessions
            .iter()
            .filter(|s| s.module_type != STRESS_MODULE && s.score > 0.0)
            .map(|s| s.score)
            .collect();
        let stress_scores: Vec<f64> = self
            .get_sessions_by_module(STRESS_MODULE)
            .iter()
            .map(|s| s.score)
            .collect();

        let baseline_performance = mean_or_zero(&baseline_scores);
        let performance_under_stress = mean_or_zero(&stress_scores);

        let stress_resilience = if baseline_performance > 0.0 {
            performance_under_stress / baseline_performance * 100.0
        } else {
            0.0
        };

        let recovery_rate = match stress_scores.as_slice() {
            [first, .., last] => percent_change(*first, *last),
            _ => 0.0,
        };

        StressToleranceProfile {
            baseline_performance,
            performance_under_stress,
            stress_resilience,
            recovery_rate,
        }
    }

    /// Full dashboard snapshot
    pub fn generate_report_data(&self) -> ReportData {
        ReportData {
            total_sessions: self.sessions.len(),
            average_scores: self.get_average_scores(),
            improvement_rate: self.get_improvement_rate(),
            performance_trend: self.get_performance_trend(),
            stress_profile: self.get_stress_tolerance_profile(),
        }
    }

    /// Brain Move profile built from the per-module averages
    pub fn brain_move_profile(&self, at: DateTime<Utc>) -> BrainMoveProfile {
        let averages = self.get_average_scores();
        let scores = DomainScores {
            cmi: averages.cmi,
            leadership: averages.leadership,
            conflict_eq: averages.conflict,
            sensory_resilience: averages.sensory,
            creativity: averages.creativity,
        };
        BrainMoveScoring::build_profile(scores, at)
    }
}

fn mean_or_zero(values: &[f64]) -> f64 {
    crate::models::mean(values).unwrap_or(0.0)
}

/// Percent change; 0 when the starting value is 0
fn percent_change(first: f64, last: f64) -> f64 {
    if first == 0.0 {
        return 0.0;
    }
    (last - first) / first * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlayerArchetype;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn history(entries: &[(ModuleType, f64)]) -> Vec<SessionRecord> {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        entries
            .iter()
            .enumerate()
            .map(|(i, (module, score))| {
                SessionRecord::at(start + Duration::hours(i as i64), *module, *score, 60_000)
            })
            .collect()
    }

    #[test]
    fn test_average_scores_per_module() {
        let sessions = history(&[(ModuleType::Creativity, 60.0), (ModuleType::Creativity, 80.0)]);
        let averages = MetricsAggregator::new(&sessions).get_average_scores();

        assert_eq!(
            averages,
            ModuleAverages {
                creativity: 70.0,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_sessions_by_module_preserve_order() {
        let sessions = history(&[
            (ModuleType::Cmi, 10.0),
            (ModuleType::Sensory, 20.0),
            (ModuleType::Cmi, 30.0),
        ]);
        let cmi: Vec<f64> = MetricsAggregator::new(&sessions)
            .get_sessions_by_module(ModuleType::Cmi)
            .iter()
            .map(|s| s.score)
            .collect();
        assert_eq!(cmi, vec![10.0, 30.0]);
    }

    #[test]
    fn test_improvement_rate() {
        assert_eq!(MetricsAggregator::new(&[]).get_improvement_rate(), 0.0);

        let single = history(&[(ModuleType::Cmi, 50.0)]);
        assert_eq!(MetricsAggregator::new(&single).get_improvement_rate(), 0.0);

        let pair = history(&[(ModuleType::Cmi, 50.0), (ModuleType::Leadership, 75.0)]);
        assert_eq!(MetricsAggregator::new(&pair).get_improvement_rate(), 50.0);

        let from_zero = history(&[(ModuleType::Cmi, 0.0), (ModuleType::Cmi, 75.0)]);
        assert_eq!(MetricsAggregator::new(&from_zero).get_improvement_rate(), 0.0);
    }

    #[test]
    fn test_performance_trend_is_chronological() {
        let sessions = history(&[(ModuleType::Conflict, 40.0), (ModuleType::Sensory, 55.0)]);
        let trend = MetricsAggregator::new(&sessions).get_performance_trend();

        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].module_type, ModuleType::Conflict);
        assert_eq!(trend[1].date, sessions[1].timestamp);
        assert_eq!(trend[1].score, 55.0);
    }

    #[test]
    fn test_stress_tolerance_profile() {
        let sessions = history(&[
            (ModuleType::Cmi, 80.0),
            (ModuleType::Sensory, 40.0),
            (ModuleType::Leadership, 60.0),
            (ModuleType::Conflict, 0.0),
            (ModuleType::Sensory, 60.0),
        ]);
        let profile = MetricsAggregator::new(&sessions).get_stress_tolerance_profile();

        // zero-score conflict session is excluded from the baseline
        assert_eq!(profile.baseline_performance, 70.0);
        assert_eq!(profile.performance_under_stress, 50.0);
        assert!((profile.stress_resilience - 500.0 / 7.0).abs() < 1e-9);
        assert_eq!(profile.recovery_rate, 50.0);
    }

    #[test]
    fn test_stress_profile_without_sessions() {
        let profile = MetricsAggregator::new(&[]).get_stress_tolerance_profile();
        assert_eq!(profile, StressToleranceProfile::default());

        let one_stress = history(&[(ModuleType::Sensory, 45.0)]);
        let profile = MetricsAggregator::new(&one_stress).get_stress_tolerance_profile();
        assert_eq!(profile.baseline_performance, 0.0);
        assert_eq!(profile.stress_resilience, 0.0);
        assert_eq!(profile.recovery_rate, 0.0);
    }

    #[test]
    fn test_report_data_bundles_views() {
        let sessions = history(&[(ModuleType::Creativity, 50.0), (ModuleType::Sensory, 75.0)]);
        let aggregator = MetricsAggregator::new(&sessions);
        let report = aggregator.generate_report_data();

        assert_eq!(report.total_sessions, 2);
        assert_eq!(report.improvement_rate, 50.0);
        assert_eq!(report.average_scores, aggregator.get_average_scores());
        assert_eq!(report.performance_trend, aggregator.get_performance_trend());
        assert_eq!(report.stress_profile, aggregator.get_stress_tolerance_profile());
    }

    #[test]
    fn test_brain_move_profile_from_history() {
        let sessions = history(&[
            (ModuleType::Cmi, 70.0),
            (ModuleType::Leadership, 90.0),
            (ModuleType::Conflict, 60.0),
            (ModuleType::Sensory, 50.0),
            (ModuleType::Creativity, 80.0),
        ]);
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let profile = MetricsAggregator::new(&sessions).brain_move_profile(at);

        assert_eq!(profile.player_archetype, PlayerArchetype::StrategicCommander);
        assert_eq!(profile.cognitive_fingerprint, "7-9-6-5-8");
        assert_eq!(profile.timestamp, at);
        // 17.5 + 18 + 12 + 7.5 + 16
        assert!((profile.overall_score - 71.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_history_profile_is_balanced() {
        let profile = MetricsAggregator::new(&[]).brain_move_profile(Utc::now());
        assert_eq!(profile.player_archetype, PlayerArchetype::BalancedLearner);
        assert_eq!(profile.cognitive_fingerprint, "0-0-0-0-0");
    }
}

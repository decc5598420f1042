//! Composite Brain Move scoring and archetype classification

use chrono::{DateTime, Utc};

use crate::types::{BrainMoveProfile, DomainScores, PlayerArchetype};

const CMI_WEIGHT: f64 = 0.25;
const LEADERSHIP_WEIGHT: f64 = 0.2;
const CONFLICT_WEIGHT: f64 = 0.2;
const SENSORY_WEIGHT: f64 = 0.15;
const CREATIVITY_WEIGHT: f64 = 0.2;

/// Composite scoring across the five training domains
pub struct BrainMoveScoring;

impl BrainMoveScoring {
    /// Weighted overall score
    ///
    /// Formula:
    /// ```text
    /// overall = 0.25 * cmi + 0.20 * leadership + 0.20 * conflict
    ///         + 0.15 * sensory + 0.20 * creativity
    /// ```
    pub fn calculate_overall_score(
        cmi: f64,
        leadership: f64,
        conflict: f64,
        sensory: f64,
        creativity: f64,
    ) -> f64 {
        cmi * CMI_WEIGHT
            + leadership * LEADERSHIP_WEIGHT
            + conflict * CONFLICT_WEIGHT
            + sensory * SENSORY_WEIGHT
            + creativity * CREATIVITY_WEIGHT
    }

    /// Dash-joined `round(score / 10)` per domain, in cmi, leadership,
    /// conflict, sensory, creativity order
    pub fn generate_cognitive_fingerprint(scores: &DomainScores) -> String {
        [
            scores.cmi,
            scores.leadership,
            scores.conflict_eq,
            scores.sensory_resilience,
            scores.creativity,
        ]
        .iter()
        .map(|s| format!("{}", (s / 10.0).round() as i64))
        .collect::<Vec<_>>()
        .join("-")
    }

    /// Archetype of the highest-scoring domain.
    ///
    /// Ties go to the earlier entry of leadership, creativity, conflict,
    /// cmi, sensory. No positive maximum means Balanced Learner.
    pub fn determine_archetype(scores: &DomainScores) -> PlayerArchetype {
        let candidates = [
            (PlayerArchetype::StrategicCommander, scores.leadership),
            (PlayerArchetype::CreativeInnovator, scores.creativity),
            (PlayerArchetype::EmpatheticMediator, scores.conflict_eq),
            (PlayerArchetype::PrecisionOperator, scores.cmi),
            (PlayerArchetype::ResilientPerformer, scores.sensory_resilience),
        ];

        let max = candidates
            .iter()
            .map(|(_, score)| *score)
            .filter(|score| score.is_finite())
            .fold(f64::NEG_INFINITY, f64::max);

        if max <= 0.0 || !max.is_finite() {
            return PlayerArchetype::BalancedLearner;
        }

        candidates
            .iter()
            .find(|(_, score)| *score == max)
            .map(|(archetype, _)| *archetype)
            .unwrap_or(PlayerArchetype::BalancedLearner)
    }

    /// Build the full profile view for a set of domain scores
    pub fn build_profile(scores: DomainScores, timestamp: DateTime<Utc>) -> BrainMoveProfile {
        BrainMoveProfile {
            overall_score: Self::calculate_overall_score(
                scores.cmi,
                scores.leadership,
                scores.conflict_eq,
                scores.sensory_resilience,
                scores.creativity,
            ),
            cmi_score: scores.cmi,
            leadership_score: scores.leadership,
            conflict_eq_score: scores.conflict_eq,
            sensory_resilience_score: scores.sensory_resilience,
            creativity_score: scores.creativity,
            cognitive_fingerprint: Self::generate_cognitive_fingerprint(&scores),
            player_archetype: Self::determine_archetype(&scores),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(
        cmi: f64,
        leadership: f64,
        conflict: f64,
        sensory: f64,
        creativity: f64,
    ) -> DomainScores {
        DomainScores {
            cmi,
            leadership,
            conflict_eq: conflict,
            sensory_resilience: sensory,
            creativity,
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let overall = BrainMoveScoring::calculate_overall_score(100.0, 100.0, 100.0, 100.0, 100.0);
        assert!((overall - 100.0).abs() < 1e-9);

        let overall = BrainMoveScoring::calculate_overall_score(80.0, 60.0, 70.0, 40.0, 90.0);
        // 20 + 12 + 14 + 6 + 18
        assert!((overall - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_fingerprint() {
        let fp =
            BrainMoveScoring::generate_cognitive_fingerprint(&scores(72.0, 45.0, 100.0, 4.0, 66.0));
        assert_eq!(fp, "7-5-10-0-7");
    }

    #[test]
    fn test_archetype_dominant_domain() {
        assert_eq!(
            BrainMoveScoring::determine_archetype(&scores(10.0, 20.0, 30.0, 40.0, 90.0)),
            PlayerArchetype::CreativeInnovator
        );
        assert_eq!(
            BrainMoveScoring::determine_archetype(&scores(95.0, 20.0, 30.0, 40.0, 50.0)),
            PlayerArchetype::PrecisionOperator
        );
        assert_eq!(
            BrainMoveScoring::determine_archetype(&scores(0.0, 0.0, 0.0, 61.0, 0.0)),
            PlayerArchetype::ResilientPerformer
        );
    }

    #[test]
    fn test_archetype_ties_follow_priority() {
        assert_eq!(
            BrainMoveScoring::determine_archetype(&scores(80.0, 50.0, 80.0, 10.0, 10.0)),
            PlayerArchetype::EmpatheticMediator
        );
    }

    #[test]
    fn test_archetype_defaults_to_balanced() {
        assert_eq!(
            BrainMoveScoring::determine_archetype(&DomainScores::default()),
            PlayerArchetype::BalancedLearner
        );
        assert_eq!(
            BrainMoveScoring::determine_archetype(&scores(
                f64::NAN,
                f64::NAN,
                f64::NAN,
                f64::NAN,
                f64::NAN
            )),
            PlayerArchetype::BalancedLearner
        );
    }

    #[test]
    fn test_build_profile() {
        let profile =
            BrainMoveScoring::build_profile(scores(80.0, 60.0, 70.0, 40.0, 90.0), Utc::now());
        assert!((profile.overall_score - 70.0).abs() < 1e-9);
        assert_eq!(profile.cognitive_fingerprint, "8-6-7-4-9");
        assert_eq!(profile.player_archetype, PlayerArchetype::CreativeInnovator);
        assert_eq!(profile.domain_scores(), scores(80.0, 60.0, 70.0, 40.0, 90.0));
    }
}

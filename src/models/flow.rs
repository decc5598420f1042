//! Flow-state detection from the challenge/skill balance

use crate::types::FlowCategory;

/// Imbalance beyond which the user is anxious or bored
const BALANCE_MARGIN: f64 = 0.2;
/// Both challenge and skill must exceed this for flow
const FLOW_THRESHOLD: f64 = 0.6;

pub struct FlowStateDetector;

impl FlowStateDetector {
    /// Flow score (0-100) from challenge, skill and focus, each on 0-1
    ///
    /// Formula: `clamp((1 - |challenge - skill|) * focus * 100, 0, 100)`
    pub fn calculate_flow_score(challenge_level: f64, skill_level: f64, focus_level: f64) -> f64 {
        let balance = 1.0 - (challenge_level - skill_level).abs();
        (balance * focus_level * 100.0).clamp(0.0, 100.0)
    }

    /// Classify engagement; checks run in order and the first match wins
    pub fn get_flow_state(challenge_level: f64, skill_level: f64) -> FlowCategory {
        if challenge_level > skill_level + BALANCE_MARGIN {
            FlowCategory::Anxiety
        } else if skill_level > challenge_level + BALANCE_MARGIN {
            FlowCategory::Boredom
        } else if challenge_level > FLOW_THRESHOLD && skill_level > FLOW_THRESHOLD {
            FlowCategory::Flow
        } else {
            FlowCategory::Apathy
        }
    }
}

//! Core types for the Brain Move metrics engine
//!
//! This module defines the data structures that flow between the scorers, the
//! session store and the derived dashboard views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Training module a session belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    Cmi,
    Leadership,
    Conflict,
    Sensory,
    Creativity,
}

impl ModuleType {
    /// Every module, in dashboard order
    pub const ALL: [ModuleType; 5] = [
        ModuleType::Cmi,
        ModuleType::Leadership,
        ModuleType::Conflict,
        ModuleType::Sensory,
        ModuleType::Creativity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleType::Cmi => "cmi",
            ModuleType::Leadership => "leadership",
            ModuleType::Conflict => "conflict",
            ModuleType::Sensory => "sensory",
            ModuleType::Creativity => "creativity",
        }
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModuleType::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown module type: {}", s))
    }
}

/// One completed exercise, as persisted by the session store.
///
/// Field names are camelCase on the wire so existing stored histories keep
/// loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// When the exercise completed (UTC)
    pub timestamp: DateTime<Utc>,
    /// Module the exercise belongs to
    pub module_type: ModuleType,
    /// Session score (nominally 0-100, not enforced)
    pub score: f64,
    /// Exercise duration (milliseconds)
    pub duration: u64,
    /// Optional named sub-scores
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscores: Option<BTreeMap<String, f64>>,
}

impl SessionRecord {
    /// Create a record stamped with the current time
    pub fn new(module_type: ModuleType, score: f64, duration: u64) -> Self {
        Self::at(Utc::now(), module_type, score, duration)
    }

    /// Create a record with an explicit timestamp
    pub fn at(
        timestamp: DateTime<Utc>,
        module_type: ModuleType,
        score: f64,
        duration: u64,
    ) -> Self {
        Self {
            timestamp,
            module_type,
            score,
            duration,
            subscores: None,
        }
    }

    /// Attach named sub-scores
    pub fn with_subscores(mut self, subscores: BTreeMap<String, f64>) -> Self {
        self.subscores = Some(subscores);
        self
    }
}

/// Outcome of validating a word submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    /// Human-readable violations, in check order
    pub errors: Vec<String>,
}

/// Coarse semantic category used for the divergent-thinking estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordCategory {
    Emotion,
    Nature,
    Technology,
    Abstract,
    Concrete,
}

impl WordCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            WordCategory::Emotion => "emotion",
            WordCategory::Nature => "nature",
            WordCategory::Technology => "technology",
            WordCategory::Abstract => "abstract",
            WordCategory::Concrete => "concrete",
        }
    }
}

/// Two words from one submission and their heuristic distance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordPair {
    pub word1: String,
    pub word2: String,
    pub distance: f64,
}

/// A submitted word with the category it was bucketed into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedWord {
    pub word: String,
    pub category: WordCategory,
}

/// Creativity breakdown reported alongside a DAT score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativityProfile {
    /// Average pairwise distance rescaled to 0-1
    pub semantic_distance: f64,
    /// Category spread (0-100)
    pub divergent_thinking: f64,
    /// Length-based originality estimate (0-100)
    pub originality_score: f64,
    /// Display messages, most general first
    pub insights: Vec<String>,
}

/// Result of scoring one Divergent Association Task attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatResult {
    /// Weighted creativity score
    pub score: f64,
    /// Approximate population percentile
    pub percentile: u8,
    /// Mean of all pairwise distances (0-100)
    pub average_distance: f64,
    pub profile: CreativityProfile,
    /// Every scored pair, in submission order
    pub word_pairs: Vec<WordPair>,
    /// Category assignment per word, in submission order
    pub categories: Vec<CategorizedWord>,
}

/// The five per-domain scores a Brain Move profile is built from
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainScores {
    pub cmi: f64,
    pub leadership: f64,
    pub conflict_eq: f64,
    pub sensory_resilience: f64,
    pub creativity: f64,
}

/// Categorical label for a user's dominant domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerArchetype {
    #[serde(rename = "Strategic Commander")]
    StrategicCommander,
    #[serde(rename = "Creative Innovator")]
    CreativeInnovator,
    #[serde(rename = "Empathetic Mediator")]
    EmpatheticMediator,
    #[serde(rename = "Precision Operator")]
    PrecisionOperator,
    #[serde(rename = "Resilient Performer")]
    ResilientPerformer,
    #[serde(rename = "Balanced Learner")]
    BalancedLearner,
}

impl PlayerArchetype {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerArchetype::StrategicCommander => "Strategic Commander",
            PlayerArchetype::CreativeInnovator => "Creative Innovator",
            PlayerArchetype::EmpatheticMediator => "Empathetic Mediator",
            PlayerArchetype::PrecisionOperator => "Precision Operator",
            PlayerArchetype::ResilientPerformer => "Resilient Performer",
            PlayerArchetype::BalancedLearner => "Balanced Learner",
        }
    }
}

impl fmt::Display for PlayerArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite profile across all five training domains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrainMoveProfile {
    pub overall_score: f64,
    pub cmi_score: f64,
    pub leadership_score: f64,
    pub conflict_eq_score: f64,
    pub sensory_resilience_score: f64,
    pub creativity_score: f64,
    /// Dash-joined digit signature, e.g. `7-5-6-4-8`
    pub cognitive_fingerprint: String,
    pub player_archetype: PlayerArchetype,
    pub timestamp: DateTime<Utc>,
}

impl BrainMoveProfile {
    pub fn domain_scores(&self) -> DomainScores {
        DomainScores {
            cmi: self.cmi_score,
            leadership: self.leadership_score,
            conflict_eq: self.conflict_eq_score,
            sensory_resilience: self.sensory_resilience_score,
            creativity: self.creativity_score,
        }
    }
}

/// Engagement classification from the challenge/skill balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowCategory {
    Anxiety,
    Boredom,
    Flow,
    Apathy,
}

impl FlowCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowCategory::Anxiety => "Anxiety",
            FlowCategory::Boredom => "Boredom",
            FlowCategory::Flow => "Flow",
            FlowCategory::Apathy => "Apathy",
        }
    }
}

impl fmt::Display for FlowCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mean score per module (0 when a module has no sessions)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleAverages {
    pub cmi: f64,
    pub leadership: f64,
    pub conflict: f64,
    pub sensory: f64,
    pub creativity: f64,
}

impl ModuleAverages {
    pub fn get(&self, module: ModuleType) -> f64 {
        match module {
            ModuleType::Cmi => self.cmi,
            ModuleType::Leadership => self.leadership,
            ModuleType::Conflict => self.conflict,
            ModuleType::Sensory => self.sensory,
            ModuleType::Creativity => self.creativity,
        }
    }

    fn slot(&mut self, module: ModuleType) -> &mut f64 {
        match module {
            ModuleType::Cmi => &mut self.cmi,
            ModuleType::Leadership => &mut self.leadership,
            ModuleType::Conflict => &mut self.conflict,
            ModuleType::Sensory => &mut self.sensory,
            ModuleType::Creativity => &mut self.creativity,
        }
    }

    pub fn set(&mut self, module: ModuleType, value: f64) {
        *self.slot(module) = value;
    }
}

/// One point of the chronological score series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceTrend {
    pub date: DateTime<Utc>,
    pub score: f64,
    pub module_type: ModuleType,
}

/// Comparison of stress-module performance against everything else
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StressToleranceProfile {
    pub baseline_performance: f64,
    pub performance_under_stress: f64,
    /// Stress performance as a percentage of baseline
    pub stress_resilience: f64,
    /// Percent change from first to last stress session
    pub recovery_rate: f64,
}

/// Dashboard snapshot, recomputed in full on every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    pub total_sessions: usize,
    pub average_scores: ModuleAverages,
    pub improvement_rate: f64,
    pub performance_trend: Vec<PerformanceTrend>,
    pub stress_profile: StressToleranceProfile,
}

/// Full-state export document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionExport {
    pub export_id: String,
    pub exported_at: DateTime<Utc>,
    pub producer: String,
    pub version: String,
    /// Complete session history in storage order
    pub sessions: Vec<SessionRecord>,
    pub report: ReportData,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_session_record_wire_format() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let record = SessionRecord::at(ts, ModuleType::Sensory, 72.5, 45_000);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["moduleType"], "sensory");
        assert_eq!(json["duration"], 45_000);
        assert!(json.get("subscores").is_none());
    }

    #[test]
    fn test_session_record_parses_browser_timestamps() {
        let raw = r#"{"timestamp":"2024-03-01T09:30:00.000Z","moduleType":"cmi","score":61,"duration":1200,"subscores":{"accuracy":0.9}}"#;
        let record: SessionRecord = serde_json::from_str(raw).unwrap();

        assert_eq!(record.module_type, ModuleType::Cmi);
        assert_eq!(record.score, 61.0);
        assert_eq!(record.subscores.unwrap()["accuracy"], 0.9);
    }

    #[test]
    fn test_module_type_from_str() {
        assert_eq!("Creativity".parse::<ModuleType>(), Ok(ModuleType::Creativity));
        assert!("memory".parse::<ModuleType>().is_err());
    }

    #[test]
    fn test_archetype_serializes_display_name() {
        let json = serde_json::to_string(&PlayerArchetype::EmpatheticMediator).unwrap();
        assert_eq!(json, "\"Empathetic Mediator\"");
    }
}

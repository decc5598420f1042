//! Tracker orchestration
//!
//! This module provides the public API an embedding UI calls after each
//! exercise: score the raw input, wrap it into a session record, append it to
//! the store, and pull the dashboard views back out.

use chrono::Utc;
use rand::Rng;
use std::collections::BTreeMap;

use crate::config::ScoringConfig;
use crate::dat::DatScorer;
use crate::error::ScoringError;
use crate::storage::SessionStorage;
use crate::store::SessionStore;
use crate::types::{
    BrainMoveProfile, DatResult, ModuleType, ReportData, SessionRecord, ValidationReport,
};

/// Validate a JSON array of words and return the validation report as JSON.
///
/// # Example
/// ```ignore
/// let report = validate_words_json(r#"["galaxy", "pencil"]"#)?;
/// ```
pub fn validate_words_json(words_json: &str) -> Result<String, ScoringError> {
    let words: Vec<String> = serde_json::from_str(words_json)?;
    let report = DatScorer::default().validate(&words);
    Ok(serde_json::to_string(&report)?)
}

/// Score a JSON array of words and return the DAT result as JSON.
///
/// Fails with [`ScoringError::InvalidInput`] when the submission does not
/// validate.
pub fn score_dat_json(words_json: &str) -> Result<String, ScoringError> {
    let words: Vec<String> = serde_json::from_str(words_json)?;
    let result = DatScorer::default().score(&words)?;
    Ok(serde_json::to_string(&result)?)
}

/// Stateful tracker combining the DAT scorer with a persistent session store
#[derive(Debug)]
pub struct CognitiveTracker<S: SessionStorage> {
    scorer: DatScorer,
    store: SessionStore<S>,
}

impl<S: SessionStorage> CognitiveTracker<S> {
    /// Create a tracker with default scoring constants
    pub fn new(storage: S) -> Self {
        Self::with_config(ScoringConfig::default(), storage)
    }

    /// Create a tracker with custom scoring constants
    pub fn with_config(config: ScoringConfig, storage: S) -> Self {
        Self {
            scorer: DatScorer::new(config),
            store: SessionStore::open(storage),
        }
    }

    pub fn scorer(&self) -> &DatScorer {
        &self.scorer
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SessionStore<S> {
        &mut self.store
    }

    pub fn validate_words<W: AsRef<str>>(&self, words: &[W]) -> ValidationReport {
        self.scorer.validate(words)
    }

    /// Score a DAT attempt and record it as a creativity session.
    ///
    /// A failed write is returned as [`ScoringError::Storage`]; the session is
    /// still kept in memory.
    pub fn record_dat<W: AsRef<str>>(
        &mut self,
        words: &[W],
        duration_ms: u64,
    ) -> Result<DatResult, ScoringError> {
        self.record_dat_with_rng(words, duration_ms, &mut rand::rng())
    }

    pub fn record_dat_with_rng<W: AsRef<str>, R: Rng + ?Sized>(
        &mut self,
        words: &[W],
        duration_ms: u64,
        rng: &mut R,
    ) -> Result<DatResult, ScoringError> {
        let result = self.scorer.score_with_rng(words, rng)?;

        let mut subscores = BTreeMap::new();
        subscores.insert("semantic_distance".to_string(), result.profile.semantic_distance);
        subscores.insert("divergent_thinking".to_string(), result.profile.divergent_thinking);
        subscores.insert("originality".to_string(), result.profile.originality_score);

        let record = SessionRecord::new(ModuleType::Creativity, result.score, duration_ms)
            .with_subscores(subscores);
        self.store.try_add_session(record)?;

        Ok(result)
    }

    /// Record a session produced by any other module
    pub fn record_session(&mut self, record: SessionRecord) {
        self.store.add_session(record);
    }

    /// Record a session, reporting rejected values and failed writes
    pub fn try_record_session(&mut self, record: SessionRecord) -> Result<(), ScoringError> {
        self.store.try_add_session(record)
    }

    pub fn report(&self) -> ReportData {
        self.store.generate_report_data()
    }

    /// Current Brain Move profile, recomputed from the history
    pub fn profile(&self) -> BrainMoveProfile {
        self.store.metrics().brain_move_profile(Utc::now())
    }
}

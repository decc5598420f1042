//! Session store
//!
//! Append-only, chronologically ordered session history with write-through
//! persistence. The store starts from whatever its backend holds; an
//! unreadable or corrupt slot degrades to an empty history instead of failing,
//! so training can always continue.

use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{ScoringError, StorageError};
use crate::metrics::MetricsAggregator;
use crate::storage::{MemoryStorage, SessionStorage};
use crate::types::{ModuleType, ReportData, SessionExport, SessionRecord};
use crate::{ENGINE_VERSION, PRODUCER_NAME};

/// Session history bound to a persistence backend
#[derive(Debug)]
pub struct SessionStore<S: SessionStorage> {
    sessions: Vec<SessionRecord>,
    storage: S,
}

impl SessionStore<MemoryStorage> {
    /// Store backed by a fresh in-memory slot
    pub fn in_memory() -> Self {
        Self::open(MemoryStorage::new())
    }
}

impl<S: SessionStorage> SessionStore<S> {
    /// Open a store, loading any persisted history from `storage`
    pub fn open(storage: S) -> Self {
        let sessions = match storage.load() {
            Ok(Some(data)) => parse_history(&data),
            Ok(None) => {
                debug!("no stored session history");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "failed to read session history, starting empty");
                Vec::new()
            }
        };

        Self { sessions, storage }
    }

    /// Append a session and persist immediately.
    ///
    /// A record with a non-finite score or sub-score is logged and dropped.
    /// A failed write is logged; the session stays in memory.
    pub fn add_session(&mut self, record: SessionRecord) {
        match self.try_add_session(record) {
            Ok(()) => {}
            Err(ScoringError::InvalidParameter(msg)) => {
                warn!(reason = %msg, "dropping unstorable session");
            }
            Err(e) => error!(error = %e, "failed to persist session history"),
        }
    }

    /// Append a session and report the outcome of the write.
    ///
    /// Non-finite values are rejected before the history changes. On a failed
    /// write the session stays in memory.
    pub fn try_add_session(&mut self, record: SessionRecord) -> Result<(), ScoringError> {
        check_finite(&record)?;
        debug!(module = %record.module_type, score = record.score, "appending session");
        self.sessions.push(record);
        Ok(self.persist()?)
    }

    /// Drop the whole history and persist the empty state
    pub fn clear_data(&mut self) {
        if let Err(e) = self.try_clear_data() {
            error!(error = %e, "failed to persist cleared session history");
        }
    }

    pub fn try_clear_data(&mut self) -> Result<(), StorageError> {
        info!(count = self.sessions.len(), "clearing session history");
        self.sessions.clear();
        self.persist()
    }

    /// All sessions in chronological (append) order
    pub fn get_sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }

    pub fn get_sessions_by_module(&self, module: ModuleType) -> Vec<&SessionRecord> {
        self.metrics().get_sessions_by_module(module)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Derived views over the current history
    pub fn metrics(&self) -> MetricsAggregator<'_> {
        MetricsAggregator::new(&self.sessions)
    }

    pub fn generate_report_data(&self) -> ReportData {
        self.metrics().generate_report_data()
    }

    /// Full-state export document
    pub fn export(&self) -> SessionExport {
        SessionExport {
            export_id: Uuid::new_v4().to_string(),
            exported_at: Utc::now(),
            producer: PRODUCER_NAME.to_string(),
            version: ENGINE_VERSION.to_string(),
            sessions: self.sessions.clone(),
            report: self.generate_report_data(),
        }
    }

    /// Export document as pretty-printed JSON
    pub fn export_json(&self) -> Result<String, ScoringError> {
        Ok(serde_json::to_string_pretty(&self.export())?)
    }

    /// Replace the history with the sessions of an export document.
    ///
    /// The history is only replaced once the write succeeds. Returns the
    /// number of sessions restored.
    pub fn import_json(&mut self, json: &str) -> Result<usize, ScoringError> {
        let export: SessionExport = serde_json::from_str(json)?;
        info!(
            count = export.sessions.len(),
            export_id = %export.export_id,
            "restoring session history from export"
        );
        self.storage.save(&serialize_history(&export.sessions)?)?;
        self.sessions = export.sessions;
        Ok(self.sessions.len())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        let data = serialize_history(&self.sessions)?;
        self.storage.save(&data)
    }
}

fn serialize_history(sessions: &[SessionRecord]) -> Result<String, StorageError> {
    serde_json::to_string(sessions).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Parse a stored history record by record.
///
/// Entries that no longer parse are skipped so one bad record cannot empty
/// the store; a slot that is not a JSON array at all yields an empty history.
fn parse_history(data: &str) -> Vec<SessionRecord> {
    let entries: Vec<serde_json::Value> = match serde_json::from_str(data) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "stored session history is corrupt, starting empty");
            return Vec::new();
        }
    };

    let total = entries.len();
    let sessions: Vec<SessionRecord> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect();

    if sessions.len() < total {
        warn!(
            skipped = total - sessions.len(),
            "skipped unreadable session records"
        );
    }
    info!(count = sessions.len(), "loaded session history");
    sessions
}

fn check_finite(record: &SessionRecord) -> Result<(), ScoringError> {
    if !record.score.is_finite() {
        return Err(ScoringError::InvalidParameter(format!(
            "session score must be finite, got {}",
            record.score
        )));
    }
    if let Some(subscores) = &record.subscores {
        if let Some((name, value)) = subscores.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ScoringError::InvalidParameter(format!(
                "sub-score '{}' must be finite, got {}",
                name, value
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    struct BrokenStorage;

    impl SessionStorage for BrokenStorage {
        fn load(&self) -> Result<Option<String>, StorageError> {
            Err(disk_unavailable())
        }

        fn save(&mut self, _data: &str) -> Result<(), StorageError> {
            Err(disk_unavailable())
        }
    }

    fn disk_unavailable() -> StorageError {
        StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk unavailable",
        ))
    }

    fn make_session(offset_min: i64, module: ModuleType, score: f64) -> SessionRecord {
        let start = Utc.with_ymd_and_hms(2024, 2, 10, 18, 0, 0).unwrap();
        SessionRecord::at(start + Duration::minutes(offset_min), module, score, 90_000)
    }

    #[test]
    fn test_open_loads_persisted_history() {
        let raw = r#"[
            {"timestamp":"2024-02-10T18:00:00.000Z","moduleType":"cmi","score":55,"duration":1000},
            {"timestamp":"2024-02-10T18:05:00.000Z","moduleType":"sensory","score":65,"duration":2000}
        ]"#;
        let store = SessionStore::open(MemoryStorage::with_contents(raw));

        assert_eq!(store.len(), 2);
        assert_eq!(store.get_sessions()[1].module_type, ModuleType::Sensory);
        assert_eq!(
            store.get_sessions()[0].timestamp,
            make_session(0, ModuleType::Cmi, 0.0).timestamp
        );
    }

    #[test]
    fn test_corrupt_history_degrades_to_empty() {
        let store = SessionStore::open(MemoryStorage::with_contents("{definitely not sessions"));
        assert!(store.is_empty());

        let store = SessionStore::open(BrokenStorage);
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_session_writes_through() {
        let mut store = SessionStore::in_memory();
        store.add_session(make_session(0, ModuleType::Creativity, 60.0));
        store.add_session(make_session(1, ModuleType::Creativity, 80.0));

        assert_eq!(store.storage().writes(), 2);

        let persisted: Vec<SessionRecord> =
            serde_json::from_str(store.storage().contents().unwrap()).unwrap();
        assert_eq!(persisted, store.get_sessions().to_vec());
    }

    #[test]
    fn test_reopen_restores_same_history() {
        let mut store = SessionStore::in_memory();
        let mut subscores = BTreeMap::new();
        subscores.insert("accuracy".to_string(), 0.92);
        store.add_session(make_session(0, ModuleType::Leadership, 71.0).with_subscores(subscores));
        store.add_session(make_session(3, ModuleType::Conflict, 48.5));

        let expected = store.get_sessions().to_vec();
        let reopened = SessionStore::open(store.into_storage());
        assert_eq!(reopened.get_sessions().to_vec(), expected);
    }

    #[test]
    fn test_failed_write_keeps_session_in_memory() {
        let mut store = SessionStore::open(BrokenStorage);
        store.add_session(make_session(0, ModuleType::Cmi, 50.0));
        assert_eq!(store.len(), 1);

        assert!(store.try_add_session(make_session(1, ModuleType::Cmi, 52.0)).is_err());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_clear_data_persists_empty_history() {
        let mut store = SessionStore::in_memory();
        store.add_session(make_session(0, ModuleType::Sensory, 30.0));
        store.clear_data();

        assert!(store.is_empty());
        assert_eq!(store.storage().contents(), Some("[]"));
        assert_eq!(store.generate_report_data().total_sessions, 0);
    }

    #[test]
    fn test_export_then_import_roundtrip() {
        let mut store = SessionStore::in_memory();
        store.add_session(make_session(0, ModuleType::Cmi, 50.0));
        store.add_session(make_session(1, ModuleType::Sensory, 62.0));
        store.add_session(make_session(2, ModuleType::Creativity, 75.0));

        let json = store.export_json().unwrap();

        let mut restored = SessionStore::in_memory();
        let count = restored.import_json(&json).unwrap();

        assert_eq!(count, 3);
        assert_eq!(restored.get_sessions(), store.get_sessions());
        assert_eq!(restored.generate_report_data(), store.generate_report_data());
        assert_eq!(restored.storage().writes(), 1);
    }

    #[test]
    fn test_export_carries_report() {
        let mut store = SessionStore::in_memory();
        store.add_session(make_session(0, ModuleType::Cmi, 50.0));
        store.add_session(make_session(1, ModuleType::Cmi, 75.0));

        let export = store.export();
        assert_eq!(export.producer, PRODUCER_NAME);
        assert_eq!(export.report.improvement_rate, 50.0);
        assert!(Uuid::parse_str(&export.export_id).is_ok());
    }

    #[test]
    fn test_non_finite_score_is_dropped_and_history_survives_reopen() {
        let mut store = SessionStore::in_memory();
        store.add_session(make_session(0, ModuleType::Cmi, 50.0));
        store.add_session(make_session(1, ModuleType::Cmi, 60.0));
        store.add_session(make_session(2, ModuleType::Cmi, f64::NAN));
        store.add_session(make_session(3, ModuleType::Cmi, f64::INFINITY));
        assert_eq!(store.len(), 2);

        let reopened = SessionStore::open(store.into_storage());
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.get_sessions()[1].score, 60.0);
    }

    #[test]
    fn test_try_add_rejects_non_finite_subscore() {
        let mut store = SessionStore::in_memory();
        let mut subscores = BTreeMap::new();
        subscores.insert("accuracy".to_string(), f64::NEG_INFINITY);

        let record = make_session(0, ModuleType::Sensory, 40.0).with_subscores(subscores);

        let result = store.try_add_session(record);
        assert!(matches!(result, Err(ScoringError::InvalidParameter(_))));
        assert!(store.is_empty());
        assert_eq!(store.storage().writes(), 0);
    }

    #[test]
    fn test_unreadable_record_is_skipped_on_load() {
        let raw = r#"[
            {"timestamp":"2024-02-10T18:00:00.000Z","moduleType":"cmi","score":55,"duration":1000},
            {"timestamp":"2024-02-10T18:02:00.000Z","moduleType":"cmi","score":null,"duration":1000},
            {"timestamp":"2024-02-10T18:05:00.000Z","moduleType":"sensory","score":65,"duration":2000}
        ]"#;
        let store = SessionStore::open(MemoryStorage::with_contents(raw));

        assert_eq!(store.len(), 2);
        assert_eq!(store.get_sessions()[1].module_type, ModuleType::Sensory);
    }

    #[test]
    fn test_failed_import_keeps_current_history() {
        let mut source = SessionStore::in_memory();
        source.add_session(make_session(0, ModuleType::Creativity, 70.0));
        source.add_session(make_session(1, ModuleType::Creativity, 72.0));
        let json = source.export_json().unwrap();

        let mut store = SessionStore::open(BrokenStorage);
        store.add_session(make_session(0, ModuleType::Leadership, 44.0));

        assert!(matches!(store.import_json(&json), Err(ScoringError::Storage(_))));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_sessions()[0].module_type, ModuleType::Leadership);
    }

    #[test]
    fn test_import_rejects_garbage() {
        let mut store = SessionStore::in_memory();
        store.add_session(make_session(0, ModuleType::Cmi, 50.0));

        assert!(store.import_json("[1, 2, 3]").is_err());
        assert_eq!(store.len(), 1);
    }
}

//! Brain Move Metrics - Scoring and session metrics engine for cognitive training
//!
//! The engine turns raw exercise input into scores and keeps a longitudinal
//! session history for dashboards: exercise input → scorer / analytic model →
//! session record → session store → derived views.
//!
//! ## Modules
//!
//! - **DAT scoring**: Divergent Association Task creativity score from ten words
//! - **Analytic models**: composite Brain Move profile, processing speed, fatigue,
//!   cognitive load, flow state and adaptive difficulty
//! - **Session store**: write-through session history behind a storage port
//! - **Metrics**: averages, trends, improvement rate and stress tolerance

pub mod config;
pub mod dat;
pub mod error;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod semantic;
pub mod storage;
pub mod store;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::ScoringConfig;
pub use dat::DatScorer;
pub use error::{ScoringError, StorageError};
pub use metrics::MetricsAggregator;
pub use pipeline::{score_dat_json, validate_words_json, CognitiveTracker};
pub use semantic::SemanticDistanceModel;
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
pub use store::SessionStore;

/// Engine version embedded in exports
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for exports
pub const PRODUCER_NAME: &str = "brainmove-metrics";

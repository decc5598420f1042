//! Scoring configuration
//!
//! The DAT heuristics are stand-ins for a real embedding model, so their
//! constants are kept here rather than hard-coded in the scorers. Defaults
//! are the stock DAT scoring constants.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ScoringError;

/// Default persistent slot name for the session history
pub const DEFAULT_STORAGE_KEY: &str = "brain_gym_metrics";

/// Master configuration for the scorers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Pairwise word distance heuristic
    pub distance: DistanceConfig,
    /// Divergent Association Task scoring
    pub dat: DatConfig,
}

impl ScoringConfig {
    /// Parse a (possibly partial) configuration document
    pub fn from_json(json: &str) -> Result<Self, ScoringError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ScoringError> {
        let json = std::fs::read_to_string(path).map_err(crate::error::StorageError::from)?;
        Self::from_json(&json)
    }

    /// Reject constants the scorers cannot work with
    pub fn validate(&self) -> Result<(), ScoringError> {
        let d = &self.distance;
        let numbers = [
            ("distance.base_distance", d.base_distance),
            ("distance.affix_penalty", d.affix_penalty),
            ("distance.noise_range", d.noise_range),
            ("distance.min_distance", d.min_distance),
            ("distance.max_distance", d.max_distance),
            ("dat.category_weight", self.dat.category_weight),
            ("dat.originality_length_weight", self.dat.originality_length_weight),
            ("dat.originality_noise", self.dat.originality_noise),
        ];
        if let Some((name, _)) = numbers.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ScoringError::InvalidParameter(format!("{} must be finite", name)));
        }

        if d.min_distance > d.max_distance {
            return Err(ScoringError::InvalidParameter(format!(
                "distance.min_distance ({}) exceeds distance.max_distance ({})",
                d.min_distance, d.max_distance
            )));
        }

        if self.dat.word_count < 2 {
            return Err(ScoringError::InvalidParameter(
                "dat.word_count must be at least 2".to_string(),
            ));
        }

        Ok(())
    }
}

/// Semantic distance heuristic parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceConfig {
    /// Starting distance for two different words
    pub base_distance: f64,
    /// Shared prefix/suffix length at which words count as related
    pub shared_affix_min: usize,
    /// Amount subtracted for related words
    pub affix_penalty: f64,
    /// Width of the uniform noise added to every distance
    pub noise_range: f64,
    /// Lower clamp for different words
    pub min_distance: f64,
    /// Upper clamp
    pub max_distance: f64,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            base_distance: 50.0,
            shared_affix_min: 3,
            affix_penalty: 20.0,
            noise_range: 30.0,
            min_distance: 10.0,
            max_distance: 100.0,
        }
    }
}

/// DAT submission and scoring parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatConfig {
    /// Required number of words
    pub word_count: usize,
    /// Minimum characters per word
    pub min_word_length: usize,
    /// Divergent-thinking points per distinct category
    pub category_weight: f64,
    /// Originality points per character of average word length
    pub originality_length_weight: f64,
    /// Width of the uniform originality bonus
    pub originality_noise: f64,
    /// Unmatched words at least this long are bucketed as abstract
    pub abstract_min_length: usize,
}

impl Default for DatConfig {
    fn default() -> Self {
        Self {
            word_count: 10,
            min_word_length: 2,
            category_weight: 15.0,
            originality_length_weight: 7.0,
            originality_noise: 30.0,
            abstract_min_length: 9,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = ScoringConfig::from_json(r#"{"distance":{"noise_range":0.0}}"#).unwrap();

        assert_eq!(config.distance.noise_range, 0.0);
        assert_eq!(config.distance.base_distance, 50.0);
        assert_eq!(config.dat, DatConfig::default());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(ScoringConfig::from_json("{not json").is_err());
    }

    #[test]
    fn test_inverted_distance_bounds_are_rejected() {
        let result =
            ScoringConfig::from_json(r#"{"distance":{"min_distance":60,"max_distance":20}}"#);
        assert!(matches!(result, Err(ScoringError::InvalidParameter(_))));
    }

    #[test]
    fn test_defaults_validate() {
        assert!(ScoringConfig::default().validate().is_ok());

        let mut config = ScoringConfig::default();
        config.dat.word_count = 1;
        assert!(config.validate().is_err());
    }
}

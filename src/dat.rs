//! Divergent Association Task scoring
//!
//! A DAT attempt is ten single words chosen to be as unrelated as possible.
//! Scoring combines three estimates:
//!
//! ```text
//! score = 0.5 * average_distance + 0.3 * divergent_thinking + 0.2 * originality
//! ```
//!
//! Categorization runs an ordered rule table, first match wins, so the keyword
//! buckets can be swapped without touching the scoring math.

use rand::Rng;
use std::collections::BTreeSet;
use tracing::debug;

use crate::config::{DatConfig, ScoringConfig};
use crate::error::ScoringError;
use crate::semantic::{average_of_pairs, uniform_noise, SemanticDistanceModel};
use crate::types::{CategorizedWord, CreativityProfile, DatResult, ValidationReport, WordCategory};

const AVERAGE_DISTANCE_WEIGHT: f64 = 0.5;
const DIVERGENT_THINKING_WEIGHT: f64 = 0.3;
const ORIGINALITY_WEIGHT: f64 = 0.2;

const EMOTION_KEYWORDS: &[&str] = &["love", "joy", "fear", "anger", "sadness"];
const NATURE_KEYWORDS: &[&str] = &["tree", "ocean", "mountain", "flower", "animal"];
const TECHNOLOGY_KEYWORDS: &[&str] = &["computer", "robot", "data", "code", "tech"];

/// Score cut-offs and the percentile reported below each
const PERCENTILE_STEPS: &[(f64, u8)] = &[
    (40.0, 10),
    (50.0, 25),
    (60.0, 50),
    (70.0, 70),
    (80.0, 85),
];
const TOP_PERCENTILE: u8 = 95;

/// One entry of the categorization table
#[derive(Clone, Copy)]
pub struct CategoryRule {
    pub category: WordCategory,
    /// Receives the lowercased, trimmed word
    pub matches: fn(&str, &DatConfig) -> bool,
}

impl std::fmt::Debug for CategoryRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryRule")
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

/// Keyword buckets first, then length decides abstract vs concrete
pub fn default_category_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule {
            category: WordCategory::Emotion,
            matches: |w, _| contains_any(w, EMOTION_KEYWORDS),
        },
        CategoryRule {
            category: WordCategory::Nature,
            matches: |w, _| contains_any(w, NATURE_KEYWORDS),
        },
        CategoryRule {
            category: WordCategory::Technology,
            matches: |w, _| contains_any(w, TECHNOLOGY_KEYWORDS),
        },
        CategoryRule {
            category: WordCategory::Abstract,
            matches: |w, cfg| w.chars().count() >= cfg.abstract_min_length,
        },
        CategoryRule {
            category: WordCategory::Concrete,
            matches: |_, _| true,
        },
    ]
}

fn contains_any(word: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| word.contains(k))
}

/// DAT validator and scorer
#[derive(Debug, Clone)]
pub struct DatScorer {
    distance_model: SemanticDistanceModel,
    config: DatConfig,
    rules: Vec<CategoryRule>,
}

impl Default for DatScorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

impl DatScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            distance_model: SemanticDistanceModel::new(config.distance),
            config: config.dat,
            rules: default_category_rules(),
        }
    }

    /// Replace the categorization table
    pub fn with_rules(mut self, rules: Vec<CategoryRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn distance_model(&self) -> &SemanticDistanceModel {
        &self.distance_model
    }

    /// Check a submission, collecting every violation in check order
    pub fn validate<S: AsRef<str>>(&self, words: &[S]) -> ValidationReport {
        let mut errors = Vec::new();
        let required = self.config.word_count;

        let filled: Vec<String> = words
            .iter()
            .map(|w| w.as_ref().trim())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();

        if filled.len() < required {
            errors.push(format!(
                "Please enter all {} words ({} remaining)",
                required,
                required - filled.len()
            ));
        } else if filled.len() > required {
            errors.push(format!(
                "Please enter exactly {} words ({} provided)",
                required,
                filled.len()
            ));
        }

        let unique: BTreeSet<&String> = filled.iter().collect();
        if unique.len() < filled.len() {
            errors.push("All words must be unique".to_string());
        }

        for (i, word) in words.iter().enumerate() {
            if word.as_ref().trim().chars().any(char::is_whitespace) {
                errors.push(format!("Word {} must be a single word (no spaces)", i + 1));
            }
        }

        for (i, word) in words.iter().enumerate() {
            if word.as_ref().trim().chars().count() < self.config.min_word_length {
                errors.push(format!("Word {} is too short", i + 1));
            }
        }

        ValidationReport {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Score a submission using the thread-local RNG
    pub fn score<S: AsRef<str>>(&self, words: &[S]) -> Result<DatResult, ScoringError> {
        self.score_with_rng(words, &mut rand::rng())
    }

    /// Score a submission drawing all noise from `rng`
    pub fn score_with_rng<S: AsRef<str>, R: Rng + ?Sized>(
        &self,
        words: &[S],
        rng: &mut R,
    ) -> Result<DatResult, ScoringError> {
        let report = self.validate(words);
        if !report.valid {
            return Err(ScoringError::InvalidInput(report));
        }

        let words: Vec<String> = words.iter().map(|w| w.as_ref().trim().to_string()).collect();

        let word_pairs = self.distance_model.all_distances_with_rng(&words, rng);
        let average_distance = average_of_pairs(&word_pairs);

        let categories = self.categorize(&words);
        let divergent_thinking = self.divergent_thinking(&categories);
        let originality_score = self.originality(&words, rng);

        let score = average_distance * AVERAGE_DISTANCE_WEIGHT
            + divergent_thinking * DIVERGENT_THINKING_WEIGHT
            + originality_score * ORIGINALITY_WEIGHT;

        let percentile = percentile_for(score);
        let insights =
            generate_insights(score, average_distance, divergent_thinking, originality_score);

        debug!(
            score,
            percentile,
            average_distance,
            divergent_thinking,
            originality_score,
            "scored DAT submission"
        );

        Ok(DatResult {
            score,
            percentile,
            average_distance,
            profile: CreativityProfile {
                semantic_distance: average_distance / 100.0,
                divergent_thinking,
                originality_score,
                insights,
            },
            word_pairs,
            categories,
        })
    }

    /// Assign each word the category of the first matching rule
    pub fn categorize(&self, words: &[String]) -> Vec<CategorizedWord> {
        words
            .iter()
            .map(|word| {
                let lower = word.trim().to_lowercase();
                let category = self
                    .rules
                    .iter()
                    .find(|rule| (rule.matches)(&lower, &self.config))
                    .map(|rule| rule.category)
                    .unwrap_or(WordCategory::Concrete);
                CategorizedWord {
                    word: word.clone(),
                    category,
                }
            })
            .collect()
    }

    fn divergent_thinking(&self, categories: &[CategorizedWord]) -> f64 {
        let distinct: BTreeSet<WordCategory> = categories.iter().map(|c| c.category).collect();
        (distinct.len() as f64 * self.config.category_weight).min(100.0)
    }

    fn originality<R: Rng + ?Sized>(&self, words: &[String], rng: &mut R) -> f64 {
        let total_len: usize = words.iter().map(|w| w.chars().count()).sum();
        let avg_len = total_len as f64 / words.len() as f64;
        let length_score = (avg_len * self.config.originality_length_weight).min(100.0);
        (length_score + uniform_noise(rng, self.config.originality_noise)).min(100.0)
    }
}

/// Map a creativity score onto its approximate percentile
pub fn percentile_for(score: f64) -> u8 {
    PERCENTILE_STEPS
        .iter()
        .find(|(cutoff, _)| score < *cutoff)
        .map(|(_, percentile)| *percentile)
        .unwrap_or(TOP_PERCENTILE)
}

fn generate_insights(
    score: f64,
    average_distance: f64,
    divergent_thinking: f64,
    originality: f64,
) -> Vec<String> {
    let mut insights = Vec::new();

    let headline = if score > 75.0 {
        "Exceptional creative thinking - you excel at making unique connections"
    } else if score > 60.0 {
        "Strong creative abilities - good conceptual diversity"
    } else if score > 45.0 {
        "Moderate creativity - consider exploring more diverse concepts"
    } else {
        "Growing creative potential - practice thinking across different domains"
    };
    insights.push(headline.to_string());

    if average_distance > 70.0 {
        insights.push("Your words span highly diverse semantic spaces".to_string());
    }
    if average_distance < 50.0 {
        insights.push("Try selecting words from more varied categories and contexts".to_string());
    }
    if divergent_thinking > 70.0 {
        insights.push(
            "Excellent divergent thinking - you explore many conceptual domains".to_string(),
        );
    }
    if originality > 70.0 {
        insights.push("High originality score - you think outside common patterns".to_string());
    }

    insights
}

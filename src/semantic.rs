//! Semantic distance heuristic
//!
//! A lexical stand-in for word-embedding distance: words sharing a stem or an
//! affix are treated as weakly related, and uniform noise spreads the rest.
//! Results are on a 0-100 scale where identical words score exactly 0.

use rand::Rng;

use crate::config::DistanceConfig;
use crate::types::WordPair;

/// Pairwise word distance model
#[derive(Debug, Clone, Default)]
pub struct SemanticDistanceModel {
    config: DistanceConfig,
}

impl SemanticDistanceModel {
    pub fn new(config: DistanceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DistanceConfig {
        &self.config
    }

    /// Distance between two words using the thread-local RNG
    pub fn distance(&self, word_a: &str, word_b: &str) -> f64 {
        self.distance_with_rng(word_a, word_b, &mut rand::rng())
    }

    /// Distance between two words drawing noise from `rng`
    pub fn distance_with_rng<R: Rng + ?Sized>(
        &self,
        word_a: &str,
        word_b: &str,
        rng: &mut R,
    ) -> f64 {
        let a = normalize(word_a);
        let b = normalize(word_b);

        if a == b {
            return 0.0;
        }

        let mut distance = self.config.base_distance;

        let prefix = common_prefix_len(&a, &b);
        let suffix = common_suffix_len(&a, &b);
        if prefix >= self.config.shared_affix_min || suffix >= self.config.shared_affix_min {
            distance -= self.config.affix_penalty;
        }

        distance += uniform_noise(rng, self.config.noise_range);

        // inverted bounds settle on max_distance
        distance
            .max(self.config.min_distance)
            .min(self.config.max_distance)
    }

    /// All unordered pairs of `words` with their distances, in submission order
    pub fn all_distances_with_rng<R: Rng + ?Sized>(
        &self,
        words: &[String],
        rng: &mut R,
    ) -> Vec<WordPair> {
        let mut pairs = Vec::with_capacity(words.len() * words.len().saturating_sub(1) / 2);

        for (i, first) in words.iter().enumerate() {
            for second in &words[i + 1..] {
                pairs.push(WordPair {
                    word1: first.clone(),
                    word2: second.clone(),
                    distance: self.distance_with_rng(first, second, rng),
                });
            }
        }

        pairs
    }

    pub fn all_distances(&self, words: &[String]) -> Vec<WordPair> {
        self.all_distances_with_rng(words, &mut rand::rng())
    }

    /// Mean pairwise distance; 0 for fewer than two words
    pub fn average_distance(&self, words: &[String]) -> f64 {
        average_of_pairs(&self.all_distances(words))
    }
}

/// Mean distance over a set of pairs
pub fn average_of_pairs(pairs: &[WordPair]) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }
    pairs.iter().map(|p| p.distance).sum::<f64>() / pairs.len() as f64
}

/// Uniform draw from `[0, range)`; a non-positive range draws nothing
pub(crate) fn uniform_noise<R: Rng + ?Sized>(rng: &mut R, range: f64) -> f64 {
    if range > 0.0 {
        rng.random::<f64>() * range
    } else {
        0.0
    }
}

fn normalize(word: &str) -> Vec<char> {
    word.trim().to_lowercase().chars().collect()
}

fn common_prefix_len(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

fn common_suffix_len(a: &[char], b: &[char]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn noiseless() -> SemanticDistanceModel {
        SemanticDistanceModel::new(DistanceConfig {
            noise_range: 0.0,
            ..Default::default()
        })
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_identical_words_have_zero_distance() {
        let model = SemanticDistanceModel::default();
        assert_eq!(model.distance("ocean", "ocean"), 0.0);
        assert_eq!(model.distance("  Ocean ", "oCEAN"), 0.0);
    }

    #[test]
    fn test_shared_affix_reduces_distance() {
        let model = noiseless();

        // "ing" suffix
        assert_eq!(model.distance("running", "jumping"), 30.0);
        // "gal" prefix
        assert_eq!(model.distance("galaxy", "gallery"), 30.0);
        // two shared letters are not enough
        assert_eq!(model.distance("cat", "cot"), 50.0);
        assert_eq!(model.distance("pencil", "jazz"), 50.0);
    }

    #[test]
    fn test_distance_stays_in_bounds() {
        let model = SemanticDistanceModel::default();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let d = model.distance_with_rng("molecule", "democracy", &mut rng);
            assert!((10.0..=100.0).contains(&d));
            let d = model.distance_with_rng("playing", "saying", &mut rng);
            assert!((10.0..=100.0).contains(&d));
        }
    }

    #[test]
    fn test_clamps_to_minimum() {
        let model = SemanticDistanceModel::new(DistanceConfig {
            base_distance: 15.0,
            noise_range: 0.0,
            ..Default::default()
        });
        assert_eq!(model.distance("running", "jumping"), 10.0);
    }

    #[test]
    fn test_inverted_bounds_do_not_panic() {
        let model = SemanticDistanceModel::new(DistanceConfig {
            min_distance: 60.0,
            max_distance: 20.0,
            ..Default::default()
        });
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(model.distance_with_rng("pencil", "glacier", &mut rng), 20.0);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let model = SemanticDistanceModel::default();
        let a = model.distance_with_rng("glacier", "laughter", &mut StdRng::seed_from_u64(42));
        let b = model.distance_with_rng("glacier", "laughter", &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_all_distances_pairs() {
        let model = noiseless();
        let list = words(&["a1", "b2", "c3", "d4", "e5", "f6", "g7", "h8", "i9", "j0"]);
        let pairs = model.all_distances(&list);

        assert_eq!(pairs.len(), 45);
        assert_eq!(pairs[0].word1, "a1");
        assert_eq!(pairs[0].word2, "b2");
        assert_eq!(pairs[44].word1, "i9");
        assert_eq!(pairs[44].word2, "j0");
    }

    #[test]
    fn test_average_distance_needs_two_words() {
        let model = noiseless();
        assert_eq!(model.average_distance(&[]), 0.0);
        assert_eq!(model.average_distance(&words(&["solo"])), 0.0);
        assert_eq!(model.average_distance(&words(&["cat", "dog"])), 50.0);
    }
}

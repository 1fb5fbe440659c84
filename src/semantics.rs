//! Semantic categorization of phrase occurrences
//!
//! Assigns each occurrence a category and confidence from four signals,
//! strongest first: pinned user corrections, seed-word similarity
//! (stem-exact plus edit-distance partial credit), surrounding-context
//! seed hits, and the learned phrase-category cooccurrence table.
//! Cooccurrence reinforcement is soft winner-take-all: boosting one
//! category decays the phrase's association with every other.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::category::{Category, MAX_WEIGHT, MIN_WEIGHT};
use crate::extractor::tokenize;
use crate::lexicon::{edit_distance, stem};
use crate::types::{AssignmentSource, CategoryAssignment};

/// Confidence reported for pinned user corrections.
pub const USER_OVERRIDE_CONFIDENCE: f64 = 95.0;

/// Symmetric character window scanned for context seeds.
const CONTEXT_WINDOW: usize = 100;

/// Maximum edit distance earning partial seed credit.
const EDIT_TOLERANCE: usize = 2;

/// Multiplier applied to a phrase's other-category associations when one
/// category is reinforced.
const COOCCURRENCE_DECAY: f64 = 0.95;

/// Cooccurrence boost applied alongside a user correction.
const CORRECTION_BOOST: f64 = 5.0;

/// Pre-stemmed seed lists, computed once.
fn seed_stems(category: Category) -> &'static [String] {
    static STEMS: Lazy<HashMap<Category, Vec<String>>> = Lazy::new(|| {
        Category::ALL
            .iter()
            .map(|&cat| (cat, cat.seeds().iter().map(|s| stem(s)).collect()))
            .collect()
    });
    &STEMS[&category]
}

/// Durable semantic state: learned associations, pinned corrections, and
/// tuned category weights.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SemanticState {
    pub cooccurrence: HashMap<String, HashMap<Category, f64>>,
    pub corrections: HashMap<String, Category>,
    pub weights: HashMap<Category, f64>,
}

pub struct SemanticCategorizer {
    state: SemanticState,
}

impl SemanticCategorizer {
    pub fn new() -> Self {
        Self {
            state: SemanticState::default(),
        }
    }

    pub fn with_state(state: SemanticState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &SemanticState {
        &self.state
    }

    /// Categorize one occurrence of `phrase` located at byte `position`
    /// in `full_text`.
    ///
    /// Identical `(phrase, text, position)` inputs yield identical
    /// assignments until a mutation intervenes.
    pub fn categorize(&self, phrase: &str, full_text: &str, position: usize) -> CategoryAssignment {
        let key = normalize_phrase(phrase);

        // Highest-priority signal: a pinned correction wins outright.
        if let Some(&category) = self.state.corrections.get(&key) {
            return CategoryAssignment {
                category,
                confidence: USER_OVERRIDE_CONFIDENCE,
                color: category.color(),
                source: AssignmentSource::UserOverride,
            };
        }

        let phrase_stems: Vec<String> = tokenize(phrase, true);
        let window_stems = self.context_stems(full_text, position, phrase.len());

        let mut winner = Category::ALL[0];
        let mut winner_score = f64::NEG_INFINITY;
        let mut winner_parts = (0.0, 0.0, 0.0);
        let mut total = 0.0;

        for category in Category::ALL {
            let similarity = seed_similarity(&phrase_stems, category) * 10.0 * self.weight(category);
            let context = context_score(&window_stems, category) * 2.0;
            let cooccurrence = self.cooccurrence(&key, category) * 3.0;
            let score = similarity + context + cooccurrence;
            total += score;

            // Strict comparison keeps declaration order as the tie-break.
            if score > winner_score {
                winner = category;
                winner_score = score;
                winner_parts = (similarity, context, cooccurrence);
            }
        }

        let confidence = if total <= 0.0 {
            50.0
        } else {
            (100.0 * winner_score / total).round().clamp(0.0, 100.0)
        };

        let (similarity, context, cooccurrence) = winner_parts;
        let source = if cooccurrence > similarity && cooccurrence > context {
            AssignmentSource::Cooccurrence
        } else if context > similarity {
            AssignmentSource::Context
        } else {
            AssignmentSource::SeedSimilarity
        };

        CategoryAssignment {
            category: winner,
            confidence,
            color: winner.color(),
            source,
        }
    }

    /// Reinforce a phrase-category association and decay the phrase's
    /// association with every other category.
    pub fn update_cooccurrence(&mut self, phrase: &str, category: Category, strength: f64) {
        let key = normalize_phrase(phrase);
        let entry = self.state.cooccurrence.entry(key).or_default();
        for cat in Category::ALL {
            let value = entry.entry(cat).or_insert(0.0);
            if cat == category {
                *value = (*value + strength).max(0.0);
            } else {
                *value *= COOCCURRENCE_DECAY;
            }
        }
    }

    /// Name-keyed variant for host layers; unknown names are a no-op.
    pub fn update_cooccurrence_by_name(&mut self, phrase: &str, category: &str, strength: f64) {
        if let Some(cat) = Category::parse(category) {
            self.update_cooccurrence(phrase, cat, strength);
        }
    }

    /// Pin a user correction for a phrase and reinforce the association.
    /// The correction deterministically wins categorization until reset.
    pub fn learn_from_user_correction(&mut self, phrase: &str, category: Category) {
        let key = normalize_phrase(phrase);
        self.state.corrections.insert(key, category);
        self.update_cooccurrence(phrase, category, CORRECTION_BOOST);
    }

    /// Remove a pinned correction; scoring applies again afterwards.
    pub fn clear_correction(&mut self, phrase: &str) {
        self.state.corrections.remove(&normalize_phrase(phrase));
    }

    /// Tune a category weight, clamped to the valid range. Unknown names
    /// are a no-op.
    pub fn set_weight_by_name(&mut self, category: &str, weight: f64) {
        if let Some(cat) = Category::parse(category) {
            self.state
                .weights
                .insert(cat, weight.clamp(MIN_WEIGHT, MAX_WEIGHT));
        }
    }

    pub fn weight(&self, category: Category) -> f64 {
        self.state
            .weights
            .get(&category)
            .copied()
            .unwrap_or_else(|| category.default_weight())
    }

    /// Drop all learned associations, corrections, and tuned weights.
    pub fn reset(&mut self) {
        self.state = SemanticState::default();
    }

    fn cooccurrence(&self, key: &str, category: Category) -> f64 {
        self.state
            .cooccurrence
            .get(key)
            .and_then(|by_cat| by_cat.get(&category))
            .copied()
            .unwrap_or(0.0)
    }

    fn context_stems(&self, full_text: &str, position: usize, phrase_len: usize) -> Vec<String> {
        let start = char_floor(full_text, position.saturating_sub(CONTEXT_WINDOW));
        let end = char_ceil(
            full_text,
            (position + phrase_len + CONTEXT_WINDOW).min(full_text.len()),
        );
        tokenize(&full_text[start..end], true)
    }
}

impl Default for SemanticCategorizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonical lookup form keying every durable record.
pub fn normalize_phrase(phrase: &str) -> String {
    phrase.trim().to_lowercase()
}

/// Per-token seed similarity, normalized by phrase token count: +2 for a
/// stem-exact seed match, edit-distance-scaled partial credit otherwise.
fn seed_similarity(phrase_stems: &[String], category: Category) -> f64 {
    if phrase_stems.is_empty() {
        return 0.0;
    }
    let seeds = seed_stems(category);
    let mut score = 0.0;
    for token in phrase_stems {
        let mut best = 0.0f64;
        for seed in seeds {
            if token == seed {
                best = 2.0;
                break;
            }
            let distance = edit_distance(token, seed);
            if distance <= EDIT_TOLERANCE {
                let longest = token.chars().count().max(seed.chars().count());
                if longest > 0 && distance < longest {
                    let credit = 2.0 * (1.0 - distance as f64 / longest as f64);
                    best = best.max(credit);
                }
            }
        }
        score += best;
    }
    score / phrase_stems.len() as f64
}

/// Number of seed-word occurrences among the stemmed window tokens.
fn context_score(window_stems: &[String], category: Category) -> f64 {
    let seeds = seed_stems(category);
    window_stems
        .iter()
        .filter(|token| seeds.contains(token))
        .count() as f64
}

fn char_floor(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn char_ceil(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lighting_phrase_categorized_lighting() {
        let categorizer = SemanticCategorizer::new();
        let text = "golden hour lighting creates soft shadows";
        let assignment = categorizer.categorize("golden hour", text, 0);
        assert_eq!(assignment.category, Category::Lighting);
        assert!(assignment.confidence >= 50.0);
        assert_eq!(assignment.source, AssignmentSource::SeedSimilarity);
    }

    #[test]
    fn test_all_zero_scores_default_to_50() {
        let categorizer = SemanticCategorizer::new();
        let assignment = categorizer.categorize("qqq zzz", "qqq zzz", 0);
        assert_eq!(assignment.confidence, 50.0);
        // Tie-break picks the first declared category.
        assert_eq!(assignment.category, Category::ALL[0]);
    }

    #[test]
    fn test_categorize_is_idempotent() {
        let categorizer = SemanticCategorizer::new();
        let text = "slow dolly shot through a neon alley";
        let first = categorizer.categorize("dolly shot", text, 5);
        let second = categorizer.categorize("dolly shot", text, 5);
        assert_eq!(first, second);
    }

    #[test]
    fn test_user_override_short_circuits() {
        let mut categorizer = SemanticCategorizer::new();
        categorizer.learn_from_user_correction("golden hour", Category::Mood);

        let text = "golden hour lighting creates soft shadows";
        let assignment = categorizer.categorize("golden hour", text, 0);
        assert_eq!(assignment.category, Category::Mood);
        assert_eq!(assignment.confidence, USER_OVERRIDE_CONFIDENCE);
        assert_eq!(assignment.source, AssignmentSource::UserOverride);

        categorizer.clear_correction("golden hour");
        let assignment = categorizer.categorize("golden hour", text, 0);
        assert_eq!(assignment.category, Category::Lighting);
        assert_ne!(assignment.source, AssignmentSource::UserOverride);
    }

    #[test]
    fn test_cooccurrence_reinforcement_decays_rivals() {
        let mut categorizer = SemanticCategorizer::new();
        categorizer.update_cooccurrence("bokeh", Category::Technical, 2.0);
        categorizer.update_cooccurrence("bokeh", Category::Mood, 1.0);

        let state = categorizer.state();
        let by_cat = &state.cooccurrence["bokeh"];
        assert_eq!(by_cat[&Category::Mood], 1.0);
        // Technical was decayed once by the Mood update.
        assert!((by_cat[&Category::Technical] - 1.9).abs() < 1e-9);
    }

    #[test]
    fn test_cooccurrence_steers_ambiguous_phrases() {
        let mut categorizer = SemanticCategorizer::new();
        let text = "xylophone reverie";
        let before = categorizer.categorize("xylophone reverie", text, 0);
        assert_eq!(before.confidence, 50.0);

        for _ in 0..5 {
            categorizer.update_cooccurrence("xylophone reverie", Category::Mood, 2.0);
        }
        let after = categorizer.categorize("xylophone reverie", text, 0);
        assert_eq!(after.category, Category::Mood);
        assert_eq!(after.source, AssignmentSource::Cooccurrence);
        assert!(after.confidence > 50.0);
    }

    #[test]
    fn test_unknown_category_names_are_noops() {
        let mut categorizer = SemanticCategorizer::new();
        categorizer.update_cooccurrence_by_name("bokeh", "wormhole", 2.0);
        categorizer.set_weight_by_name("wormhole", 1.5);
        assert!(categorizer.state().cooccurrence.is_empty());
        assert!(categorizer.state().weights.is_empty());
    }

    #[test]
    fn test_weight_clamped() {
        let mut categorizer = SemanticCategorizer::new();
        categorizer.set_weight_by_name("lighting", 12.0);
        assert_eq!(categorizer.weight(Category::Lighting), MAX_WEIGHT);
        categorizer.set_weight_by_name("lighting", 0.0);
        assert_eq!(categorizer.weight(Category::Lighting), MIN_WEIGHT);
    }

    #[test]
    fn test_context_window_respects_utf8() {
        let categorizer = SemanticCategorizer::new();
        let text = "é\u{301}ré soft lighting über golden hour";
        // Position inside the text; must not panic on non-ASCII boundaries.
        let assignment = categorizer.categorize("golden hour", text, text.find("golden").unwrap());
        assert_eq!(assignment.category, Category::Lighting);
    }

    #[test]
    fn test_state_round_trip() {
        let mut categorizer = SemanticCategorizer::new();
        categorizer.learn_from_user_correction("rim light", Category::Lighting);
        categorizer.set_weight_by_name("mood", 1.5);

        let json = serde_json::to_string(categorizer.state()).unwrap();
        let state: SemanticState = serde_json::from_str(&json).unwrap();
        let restored = SemanticCategorizer::with_state(state);
        assert_eq!(
            restored.categorize("rim light", "rim light", 0).category,
            Category::Lighting
        );
        assert_eq!(restored.weight(Category::Mood), 1.5);
    }
}

//! Online engagement learning
//!
//! Tracks per-phrase and per-category engagement (shown / clicked /
//! ignored), converts it into a confidence adjustment of up to ±20
//! points, and gates which matches are surfaced through a probabilistic
//! explore/exploit threshold. Recency decay runs against an injected
//! [`Clock`] so tests can advance time deterministically.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::clock::Clock;
use crate::semantics::normalize_phrase;

/// Neutral score reported for never-seen phrases.
const NEUTRAL_SCORE: f64 = 0.5;

/// Recency decay time constant, days.
const DECAY_DAYS: f64 = 30.0;

/// Blend of learned score vs. click-through rate inside a phrase score.
const LEARNED_BLEND: f64 = 0.7;

/// Blend of phrase score vs. category score inside the adjustment.
const PHRASE_BLEND: f64 = 0.7;

/// Maximum confidence shift, plus or minus half of this.
const ADJUSTMENT_SWING: f64 = 40.0;

/// Lowered threshold applied on exploration rolls.
const EXPLORE_THRESHOLD: f64 = 30.0;

/// Per-phrase engagement history, keyed by normalized phrase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementRecord {
    pub shown: u32,
    pub clicked: u32,
    pub ignored: u32,

    /// Sum of confidences at show time
    pub confidence_sum: f64,

    /// Online-learned preference in [0, 1]
    pub learned_score: f64,

    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl EngagementRecord {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            shown: 0,
            clicked: 0,
            ignored: 0,
            confidence_sum: 0.0,
            learned_score: NEUTRAL_SCORE,
            first_seen: now,
            last_seen: now,
        }
    }
}

/// Per-category engagement counters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CategoryEngagement {
    pub shown: u32,
    pub clicked: u32,
}

/// Serializable learner snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearnerState {
    pub phrases: HashMap<String, EngagementRecord>,
    pub categories: HashMap<Category, CategoryEngagement>,
    pub interactions: u64,
}

/// Read-only view of a highly engaged phrase.
#[derive(Debug, Clone, Serialize)]
pub struct PhraseInsight {
    pub phrase: String,
    pub score: f64,
    pub shown: u32,
    pub clicked: u32,
    pub ignored: u32,
}

/// Read-only per-category engagement view.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryMetrics {
    pub category: Category,
    pub shown: u32,
    pub clicked: u32,
    pub click_through_rate: f64,
}

pub struct BehaviorLearner {
    state: LearnerState,
    learning_rate: f64,
    exploration_rate: f64,
    clock: Arc<dyn Clock>,
    rng: StdRng,
}

impl BehaviorLearner {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: LearnerState::default(),
            learning_rate: 0.1,
            exploration_rate: 0.15,
            clock,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic explore/exploit rolls for tests.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn set_learning_rate(&mut self, rate: f64) {
        self.learning_rate = rate.clamp(0.0, 1.0);
    }

    pub fn set_exploration_rate(&mut self, rate: f64) {
        self.exploration_rate = rate.clamp(0.0, 1.0);
    }

    pub fn state(&self) -> &LearnerState {
        &self.state
    }

    pub fn restore(&mut self, state: LearnerState) {
        self.state = state;
    }

    pub fn interactions(&self) -> u64 {
        self.state.interactions
    }

    pub fn tracked_phrases(&self) -> usize {
        self.state.phrases.len()
    }

    /// A highlight was rendered to the user.
    pub fn record_shown(&mut self, phrase: &str, category: Category, confidence: f64) {
        let now = self.clock.now();
        let record = self
            .state
            .phrases
            .entry(normalize_phrase(phrase))
            .or_insert_with(|| EngagementRecord::new(now));
        record.shown += 1;
        record.confidence_sum += confidence;
        record.last_seen = now;

        self.state.categories.entry(category).or_default().shown += 1;
        self.state.interactions += 1;
    }

    /// The user engaged with a highlight.
    pub fn record_click(&mut self, phrase: &str, category: Category) {
        let now = self.clock.now();
        let rate = self.learning_rate;
        let record = self
            .state
            .phrases
            .entry(normalize_phrase(phrase))
            .or_insert_with(|| EngagementRecord::new(now));
        record.clicked += 1;
        record.learned_score = (record.learned_score + rate).min(1.0);

        self.state.categories.entry(category).or_default().clicked += 1;
        self.state.interactions += 1;
    }

    /// The user saw but did not engage with a highlight.
    pub fn record_ignored(&mut self, phrase: &str) {
        let now = self.clock.now();
        let rate = self.learning_rate;
        let record = self
            .state
            .phrases
            .entry(normalize_phrase(phrase))
            .or_insert_with(|| EngagementRecord::new(now));
        record.ignored += 1;
        record.learned_score = (record.learned_score - 0.5 * rate).max(0.0);
        self.state.interactions += 1;
    }

    /// Engagement score in [0, 1]: learned preference blended with
    /// click-through rate, decayed by time since last seen. Unseen
    /// phrases score a neutral 0.5 with no decay.
    pub fn phrase_score(&self, phrase: &str) -> f64 {
        let Some(record) = self.state.phrases.get(&normalize_phrase(phrase)) else {
            return NEUTRAL_SCORE;
        };

        let ctr = if record.shown > 0 {
            (f64::from(record.clicked) / f64::from(record.shown)).min(1.0)
        } else {
            0.0
        };
        let blended = LEARNED_BLEND * record.learned_score + (1.0 - LEARNED_BLEND) * ctr;

        let elapsed = self.clock.now() - record.last_seen;
        let days = (elapsed.num_seconds().max(0) as f64) / 86_400.0;
        (blended * (-days / DECAY_DAYS).exp()).clamp(0.0, 1.0)
    }

    /// Category click-through rate; neutral 0.5 before any shows.
    pub fn category_score(&self, category: Category) -> f64 {
        match self.state.categories.get(&category) {
            Some(engagement) if engagement.shown > 0 => {
                (f64::from(engagement.clicked) / f64::from(engagement.shown)).clamp(0.0, 1.0)
            }
            _ => NEUTRAL_SCORE,
        }
    }

    /// Shift a base confidence by observed behavior, at most ±20 points.
    pub fn adjust_confidence(&self, phrase: &str, category: Category, base: f64) -> f64 {
        let blend = PHRASE_BLEND * self.phrase_score(phrase)
            + (1.0 - PHRASE_BLEND) * self.category_score(category);
        (base + (blend - 0.5) * ADJUSTMENT_SWING).clamp(0.0, 100.0)
    }

    /// Explore/exploit gate: with probability `exploration_rate` a
    /// lowered threshold applies, otherwise the adjusted confidence must
    /// reach `min_confidence`.
    pub fn should_show(
        &mut self,
        phrase: &str,
        category: Category,
        confidence: f64,
        min_confidence: f64,
    ) -> bool {
        let adjusted = self.adjust_confidence(phrase, category, confidence);
        if self.rng.gen::<f64>() < self.exploration_rate {
            adjusted > EXPLORE_THRESHOLD
        } else {
            adjusted >= min_confidence
        }
    }

    /// Top engaged phrases by current score, descending.
    pub fn top_phrases(&self, limit: usize) -> Vec<PhraseInsight> {
        let mut insights: Vec<PhraseInsight> = self
            .state
            .phrases
            .iter()
            .map(|(phrase, record)| PhraseInsight {
                phrase: phrase.clone(),
                score: self.phrase_score(phrase),
                shown: record.shown,
                clicked: record.clicked,
                ignored: record.ignored,
            })
            .collect();
        insights.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.phrase.cmp(&b.phrase))
        });
        insights.truncate(limit);
        insights
    }

    /// Engagement counters per category, in declaration order.
    pub fn category_metrics(&self) -> Vec<CategoryMetrics> {
        Category::ALL
            .iter()
            .map(|&category| {
                let engagement = self
                    .state
                    .categories
                    .get(&category)
                    .copied()
                    .unwrap_or_default();
                let click_through_rate = if engagement.shown > 0 {
                    f64::from(engagement.clicked) / f64::from(engagement.shown)
                } else {
                    0.0
                };
                CategoryMetrics {
                    category,
                    shown: engagement.shown,
                    clicked: engagement.clicked,
                    click_through_rate,
                }
            })
            .collect()
    }

    /// Clear all engagement state atomically.
    pub fn reset(&mut self) {
        self.state = LearnerState::default();
    }
}

//! Highlighting engine orchestrator
//!
//! Composes the extractor, categorizer, learner, and result cache into
//! the `process_text` pipeline and exposes the feedback API that closes
//! the learning loop. One engine instance serves one editing session and
//! is owned by the caller; durable state is loaded once at construction
//! and written back, best-effort, after every mutating operation.

use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::cache::{CacheCounters, ResultCache, DEFAULT_RESULT_CAPACITY};
use crate::category::Category;
use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigUpdate, EngineConfig};
use crate::correct::{NoopCorrector, TypoCorrector};
use crate::extractor::{CorpusStats, PatternCacheStats, PhraseExtractor};
use crate::learner::{BehaviorLearner, CategoryMetrics, LearnerState, PhraseInsight};
use crate::semantics::{SemanticCategorizer, SemanticState};
use crate::storage::KeyValueStore;
use crate::types::{Match, ProcessOutcome, ProcessStats};

/// Storage namespace for engagement records.
pub const KEY_ENGAGEMENT: &str = "promptlight-engagement";

/// Storage namespace for cooccurrence, corrections, and weights.
pub const KEY_SEMANTICS: &str = "promptlight-semantics";

/// Storage namespace for corpus document/ngram statistics.
pub const KEY_CORPUS: &str = "promptlight-corpus";

/// Extraction floor for candidate phrases.
const MIN_PHRASE_SCORE: f64 = 0.1;

/// Top-N candidate cap applied before occurrence search.
const CANDIDATE_CAP: usize = 50;

/// Cooccurrence reinforcement applied on click feedback.
const COOCCURRENCE_CLICK: f64 = 2.0;

/// Cooccurrence reinforcement applied on shown feedback.
const COOCCURRENCE_SHOWN: f64 = 0.5;

/// Aggregate counters exposed by [`HighlightEngine::statistics`].
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatistics {
    pub corpus_documents: u64,
    pub tracked_phrases: usize,
    pub total_interactions: u64,
    pub result_cache: CacheCounters,
    pub pattern_cache: PatternCacheStats,
}

/// Human-oriented learning report.
#[derive(Debug, Clone, Serialize)]
pub struct Insights {
    pub total_interactions: u64,
    pub top_phrases: Vec<PhraseInsight>,
    pub categories: Vec<CategoryMetrics>,
    pub result_cache_hit_rate: f64,
}

/// Builder for [`HighlightEngine`] with injectable collaborators.
pub struct EngineBuilder {
    store: Box<dyn KeyValueStore>,
    config: EngineConfig,
    corrector: Box<dyn TypoCorrector>,
    clock: Arc<dyn Clock>,
    rng_seed: Option<u64>,
    result_capacity: usize,
}

impl EngineBuilder {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            store,
            config: EngineConfig::default(),
            corrector: Box::new(NoopCorrector),
            clock: Arc::new(SystemClock),
            rng_seed: None,
            result_capacity: DEFAULT_RESULT_CAPACITY,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_corrector(mut self, corrector: Box<dyn TypoCorrector>) -> Self {
        self.corrector = corrector;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Deterministic explore/exploit rolls for tests.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_result_capacity(mut self, capacity: usize) -> Self {
        self.result_capacity = capacity;
        self
    }

    pub fn build(self) -> HighlightEngine {
        let EngineBuilder {
            store,
            config,
            corrector,
            clock,
            rng_seed,
            result_capacity,
        } = self;

        let extractor = match load_snapshot::<CorpusStats>(store.as_ref(), KEY_CORPUS) {
            Some(stats) => PhraseExtractor::with_stats(stats),
            None => PhraseExtractor::new(),
        };

        let categorizer = match load_snapshot::<SemanticState>(store.as_ref(), KEY_SEMANTICS) {
            Some(state) => SemanticCategorizer::with_state(state),
            None => SemanticCategorizer::new(),
        };

        let mut learner = BehaviorLearner::new(clock);
        if let Some(seed) = rng_seed {
            learner = learner.with_rng_seed(seed);
        }
        learner.set_learning_rate(config.learning_rate);
        learner.set_exploration_rate(config.exploration_rate);
        if let Some(state) = load_snapshot::<LearnerState>(store.as_ref(), KEY_ENGAGEMENT) {
            learner.restore(state);
        }

        HighlightEngine {
            config,
            extractor,
            categorizer,
            learner,
            cache: ResultCache::new(result_capacity),
            corrector,
            store,
        }
    }
}

/// Adaptive phrase highlighting engine for one editing session.
pub struct HighlightEngine {
    config: EngineConfig,
    extractor: PhraseExtractor,
    categorizer: SemanticCategorizer,
    learner: BehaviorLearner,
    cache: ResultCache,
    corrector: Box<dyn TypoCorrector>,
    store: Box<dyn KeyValueStore>,
}

impl HighlightEngine {
    /// Engine with default configuration and collaborators.
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        EngineBuilder::new(store).build()
    }

    /// Run the full highlighting pipeline over one text.
    ///
    /// Never fails: empty or pathological input produces a well-formed,
    /// possibly empty outcome. Offsets in the returned matches refer to
    /// the typo-corrected text.
    pub fn process_text(&mut self, text: &str) -> ProcessOutcome {
        let started = Instant::now();
        if text.trim().is_empty() {
            return ProcessOutcome::empty();
        }

        let key = ResultCache::key(text, &Category::ALL);
        if let Some(mut cached) = self.cache.get(key) {
            cached.stats.cache_hit = true;
            cached.stats.elapsed_ms = elapsed_ms(started);
            return cached;
        }

        let corrected = match self.corrector.correct(text) {
            Ok(corrected) => corrected,
            Err(e) => {
                warn!(error = %e, "typo correction failed, falling back to raw text");
                text.to_string()
            }
        };

        let mut candidates = self
            .extractor
            .extract_important_phrases(&corrected, MIN_PHRASE_SCORE);
        let phrases_extracted = candidates.len();
        candidates.truncate(CANDIDATE_CAP);

        let mut occurrences = Vec::new();
        for candidate in &candidates {
            occurrences.extend(self.extractor.find_occurrences(&corrected, candidate));
        }
        let occurrences_found = occurrences.len();

        // Each occurrence is categorized independently: identical phrase
        // text at different positions may land in different categories.
        let mut filtered = Vec::new();
        for occurrence in occurrences {
            let assignment =
                self.categorizer
                    .categorize(&occurrence.normalized, &corrected, occurrence.start);
            let adjusted = self.learner.adjust_confidence(
                &occurrence.normalized,
                assignment.category,
                assignment.confidence,
            );
            if self.learner.should_show(
                &occurrence.normalized,
                assignment.category,
                assignment.confidence,
                self.config.min_confidence,
            ) {
                filtered.push(Match {
                    occurrence,
                    assignment,
                    confidence: adjusted,
                });
            }
        }
        let after_filtering = filtered.len();

        let mut matches = resolve_overlaps(filtered);
        matches.sort_by_key(|m| m.occurrence.start);
        matches.truncate(self.config.max_highlights);
        let final_highlights = matches.len();

        self.extractor.update_statistics(&corrected);
        persist_snapshot(self.store.as_mut(), KEY_CORPUS, self.extractor.stats());

        let stats = ProcessStats {
            phrases_extracted,
            occurrences_found,
            after_filtering,
            final_highlights,
            elapsed_ms: elapsed_ms(started),
            cache_hit: false,
        };
        debug!(
            phrases_extracted,
            occurrences_found, after_filtering, final_highlights, "processed text"
        );

        let outcome = ProcessOutcome { matches, stats };
        self.cache.put(key, outcome.clone());
        outcome
    }

    // --- Feedback API -----------------------------------------------------

    /// A highlight was rendered to the user.
    pub fn record_shown(&mut self, phrase: &str, category: Category, confidence: f64) {
        self.learner.record_shown(phrase, category, confidence);
        self.categorizer
            .update_cooccurrence(phrase, category, COOCCURRENCE_SHOWN);
        self.after_feedback();
    }

    /// The user engaged with a highlight.
    pub fn record_click(&mut self, phrase: &str, category: Category) {
        self.learner.record_click(phrase, category);
        self.categorizer
            .update_cooccurrence(phrase, category, COOCCURRENCE_CLICK);
        self.after_feedback();
    }

    /// The user saw but did not engage with a highlight.
    pub fn record_ignored(&mut self, phrase: &str) {
        self.learner.record_ignored(phrase);
        self.cache.clear();
        persist_snapshot(self.store.as_mut(), KEY_ENGAGEMENT, self.learner.state());
    }

    /// The user manually moved a phrase to another category. Pins a
    /// correction that wins categorization until learning is reset.
    pub fn record_recategorization(
        &mut self,
        phrase: &str,
        old_category: Category,
        new_category: Category,
    ) {
        debug!(phrase, from = %old_category, to = %new_category, "user recategorization");
        self.categorizer
            .learn_from_user_correction(phrase, new_category);
        self.after_feedback();
    }

    // --- Administrative API -----------------------------------------------

    /// Apply a partial configuration update.
    pub fn configure(&mut self, update: ConfigUpdate) {
        self.config.apply(update);
        self.learner.set_learning_rate(self.config.learning_rate);
        self.learner
            .set_exploration_rate(self.config.exploration_rate);
        self.cache.clear();
    }

    pub fn configuration(&self) -> EngineConfig {
        self.config.clone()
    }

    pub fn statistics(&self) -> EngineStatistics {
        EngineStatistics {
            corpus_documents: self.extractor.stats().total_documents(),
            tracked_phrases: self.learner.tracked_phrases(),
            total_interactions: self.learner.interactions(),
            result_cache: self.cache.counters(),
            pattern_cache: self.extractor.pattern_cache_stats(),
        }
    }

    pub fn insights(&self) -> Insights {
        Insights {
            total_interactions: self.learner.interactions(),
            top_phrases: self.learner.top_phrases(10),
            categories: self.learner.category_metrics(),
            result_cache_hit_rate: self.cache.counters().hit_rate(),
        }
    }

    /// One JSON document bundling every durable snapshot plus the
    /// current configuration.
    pub fn export_data(&self) -> serde_json::Value {
        json!({
            "config": self.config,
            "engagement": self.learner.state(),
            "semantics": self.categorizer.state(),
            "corpus": self.extractor.stats(),
        })
    }

    /// Clear engagement and semantic learning state atomically. Corpus
    /// document statistics survive: they describe the user's texts, not
    /// their preferences.
    pub fn reset_learning(&mut self) {
        self.learner.reset();
        self.categorizer.reset();
        self.cache.clear();
        persist_snapshot(self.store.as_mut(), KEY_ENGAGEMENT, self.learner.state());
        persist_snapshot(self.store.as_mut(), KEY_SEMANTICS, self.categorizer.state());
    }

    /// Write all three durable snapshots. Best-effort: failures are
    /// logged and in-memory state stays authoritative for the session.
    pub fn save(&mut self) {
        persist_snapshot(self.store.as_mut(), KEY_ENGAGEMENT, self.learner.state());
        persist_snapshot(self.store.as_mut(), KEY_SEMANTICS, self.categorizer.state());
        persist_snapshot(self.store.as_mut(), KEY_CORPUS, self.extractor.stats());
    }

    /// Tune a category weight by name; unknown names are a no-op.
    pub fn set_category_weight(&mut self, category: &str, weight: f64) {
        self.categorizer.set_weight_by_name(category, weight);
        self.cache.clear();
        persist_snapshot(self.store.as_mut(), KEY_SEMANTICS, self.categorizer.state());
    }

    // --- Internals --------------------------------------------------------

    fn after_feedback(&mut self) {
        // Learning must be visible on the next process_text call.
        self.cache.clear();
        persist_snapshot(self.store.as_mut(), KEY_ENGAGEMENT, self.learner.state());
        persist_snapshot(self.store.as_mut(), KEY_SEMANTICS, self.categorizer.state());
    }
}

/// Fire-and-forget snapshot write: failures are logged, never thrown.
fn persist_snapshot<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => {
            if let Err(e) = store.set(key, &raw) {
                warn!(key, error = %e, "failed to persist state");
            }
        }
        Err(e) => warn!(key, error = %e, "failed to serialize state"),
    }
}

fn load_snapshot<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    match store.get(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "malformed persisted state, starting empty");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!(key, error = %e, "failed to load persisted state, starting empty");
            None
        }
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

/// Greedy overlap resolution: candidates are tried in descending
/// (confidence, span length) order and accepted only if they do not
/// intersect an already-accepted range. Deterministic given stable
/// input ordering.
fn resolve_overlaps(mut candidates: Vec<Match>) -> Vec<Match> {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                let len_a = a.occurrence.end - a.occurrence.start;
                let len_b = b.occurrence.end - b.occurrence.start;
                len_b.cmp(&len_a)
            })
            .then_with(|| a.occurrence.start.cmp(&b.occurrence.start))
    });

    let mut accepted: Vec<Match> = Vec::new();
    for candidate in candidates {
        if accepted
            .iter()
            .all(|kept| !kept.occurrence.overlaps(&candidate.occurrence))
        {
            accepted.push(candidate);
        }
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::types::{AssignmentSource, CategoryAssignment, Occurrence};

    fn test_engine() -> HighlightEngine {
        EngineBuilder::new(Box::new(MemoryStore::new()))
            .with_rng_seed(42)
            .build()
    }

    fn match_at(start: usize, end: usize, confidence: f64) -> Match {
        Match {
            occurrence: Occurrence {
                text: "x".into(),
                normalized: "x".into(),
                start,
                end,
                score: 1.0,
            },
            assignment: CategoryAssignment {
                category: Category::Camera,
                confidence,
                color: Category::Camera.color(),
                source: AssignmentSource::SeedSimilarity,
            },
            confidence,
        }
    }

    #[test]
    fn test_empty_text_yields_empty_outcome() {
        let mut engine = test_engine();
        let outcome = engine.process_text("");
        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.stats.phrases_extracted, 0);
        assert_eq!(outcome.stats.occurrences_found, 0);
        assert_eq!(outcome.stats.after_filtering, 0);
        assert_eq!(outcome.stats.final_highlights, 0);
    }

    #[test]
    fn test_overlap_resolution_prefers_confidence() {
        let resolved = resolve_overlaps(vec![match_at(0, 10, 80.0), match_at(5, 15, 60.0)]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].occurrence.start, 0);
        assert_eq!(resolved[0].confidence, 80.0);
    }

    #[test]
    fn test_overlap_resolution_prefers_longer_span_on_tie() {
        let resolved = resolve_overlaps(vec![match_at(0, 5, 70.0), match_at(0, 12, 70.0)]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].occurrence.end, 12);
    }

    #[test]
    fn test_overlap_resolution_keeps_disjoint() {
        let resolved = resolve_overlaps(vec![
            match_at(0, 5, 70.0),
            match_at(5, 10, 60.0),
            match_at(20, 30, 90.0),
        ]);
        assert_eq!(resolved.len(), 3);
    }

    #[test]
    fn test_no_overlaps_in_pipeline_output() {
        let mut engine = test_engine();
        let outcome =
            engine.process_text("slow dolly shot through golden hour lighting, 35mm anamorphic bokeh");
        for pair in outcome.matches.windows(2) {
            assert!(pair[0].occurrence.end <= pair[1].occurrence.start);
        }
    }

    #[test]
    fn test_matches_sorted_by_start_and_capped() {
        let mut engine = test_engine();
        engine.configure(ConfigUpdate {
            max_highlights: Some(2),
            ..Default::default()
        });
        let outcome =
            engine.process_text("golden hour lighting with anamorphic bokeh on a neon rooftop");
        assert!(outcome.matches.len() <= 2);
        for pair in outcome.matches.windows(2) {
            assert!(pair[0].occurrence.start <= pair[1].occurrence.start);
        }
    }

    #[test]
    fn test_failing_corrector_is_skipped() {
        struct FailingCorrector;
        impl TypoCorrector for FailingCorrector {
            fn correct(&self, _text: &str) -> anyhow::Result<String> {
                anyhow::bail!("service unavailable")
            }
        }

        let mut engine = EngineBuilder::new(Box::new(MemoryStore::new()))
            .with_corrector(Box::new(FailingCorrector))
            .with_rng_seed(42)
            .build();
        let outcome = engine.process_text("golden hour lighting");
        // Raw text still flows through the pipeline.
        assert!(outcome.stats.phrases_extracted > 0);
    }

    #[test]
    fn test_result_cache_round_trip() {
        let mut engine = test_engine();
        let text = "golden hour lighting creates soft shadows";

        let first = engine.process_text(text);
        assert!(!first.stats.cache_hit);

        let second = engine.process_text(text);
        assert!(second.stats.cache_hit);
        assert_eq!(first.matches, second.matches);
    }

    #[test]
    fn test_feedback_invalidates_result_cache() {
        let mut engine = test_engine();
        let text = "golden hour lighting creates soft shadows";
        engine.process_text(text);
        engine.record_click("golden hour", Category::Lighting);

        let after = engine.process_text(text);
        assert!(!after.stats.cache_hit);
    }

    #[test]
    fn test_recategorization_pins_category() {
        let mut engine = test_engine();
        engine.record_recategorization("golden hour", Category::Lighting, Category::Mood);
        // Engagement lifts the pinned phrase to the top of overlap
        // resolution against its own sub-spans.
        engine.record_shown("golden hour", Category::Mood, 95.0);
        for _ in 0..10 {
            engine.record_click("golden hour", Category::Mood);
        }

        let outcome = engine.process_text("golden hour");
        assert_eq!(outcome.matches.len(), 1);
        let m = &outcome.matches[0];
        assert_eq!(m.occurrence.normalized, "golden hour");
        assert_eq!(m.assignment.category, Category::Mood);
        assert_eq!(m.assignment.source, AssignmentSource::UserOverride);
        assert_eq!(m.assignment.confidence, 95.0);
    }

    #[test]
    fn test_statistics_and_insights() {
        let mut engine = test_engine();
        engine.process_text("golden hour lighting");
        engine.record_shown("golden hour", Category::Lighting, 70.0);
        engine.record_click("golden hour", Category::Lighting);

        let stats = engine.statistics();
        assert_eq!(stats.corpus_documents, 1);
        assert_eq!(stats.tracked_phrases, 1);
        assert_eq!(stats.total_interactions, 2);

        let insights = engine.insights();
        assert_eq!(insights.top_phrases[0].phrase, "golden hour");
        let lighting = insights
            .categories
            .iter()
            .find(|c| c.category == Category::Lighting)
            .unwrap();
        assert_eq!(lighting.shown, 1);
        assert_eq!(lighting.clicked, 1);
    }

    #[test]
    fn test_export_data_bundles_everything() {
        let mut engine = test_engine();
        engine.process_text("golden hour lighting");
        let export = engine.export_data();
        assert!(export.get("config").is_some());
        assert!(export.get("engagement").is_some());
        assert!(export.get("semantics").is_some());
        assert!(export.get("corpus").is_some());
    }

    #[test]
    fn test_reset_learning_keeps_corpus() {
        let mut engine = test_engine();
        engine.process_text("golden hour lighting");
        engine.record_click("golden hour", Category::Lighting);
        engine.reset_learning();

        assert_eq!(engine.statistics().tracked_phrases, 0);
        assert_eq!(engine.statistics().total_interactions, 0);
        assert_eq!(engine.statistics().corpus_documents, 1);
        assert_eq!(engine.learner.phrase_score("golden hour"), 0.5);
    }

    #[test]
    fn test_malformed_persisted_state_falls_back_to_defaults() {
        let mut store = MemoryStore::new();
        store.set(KEY_ENGAGEMENT, "not json at all").unwrap();
        store.set(KEY_CORPUS, "{\"bogus\": true").unwrap();

        let engine = EngineBuilder::new(Box::new(store)).build();
        assert_eq!(engine.statistics().tracked_phrases, 0);
        assert_eq!(engine.statistics().corpus_documents, 0);
    }
}

//! Integration tests for durable learning state
//!
//! Engines built over the same file-backed store must pick up the
//! engagement, semantic, and corpus snapshots a previous session wrote.

use promptlight::storage::FileStore;
use promptlight::{Category, ConfigUpdate, EngineBuilder, HighlightEngine};

fn engine_over(dir: &std::path::Path) -> HighlightEngine {
    let store = FileStore::new(dir).expect("store dir");
    EngineBuilder::new(Box::new(store)).with_rng_seed(7).build()
}

#[test]
fn test_engagement_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut engine = engine_over(dir.path());
        engine.record_shown("golden hour", Category::Lighting, 80.0);
        engine.record_click("golden hour", Category::Lighting);
        engine.record_click("golden hour", Category::Lighting);
    }

    let engine = engine_over(dir.path());
    let stats = engine.statistics();
    assert_eq!(stats.total_interactions, 3);
    assert_eq!(stats.tracked_phrases, 1);

    let insights = engine.insights();
    assert_eq!(insights.top_phrases[0].phrase, "golden hour");
    assert_eq!(insights.top_phrases[0].clicked, 2);
}

#[test]
fn test_corpus_statistics_survive_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut engine = engine_over(dir.path());
        engine.process_text("neon alley in the rain");
        engine.process_text("golden hour on the rooftop");
    }

    let engine = engine_over(dir.path());
    assert_eq!(engine.statistics().corpus_documents, 2);
}

#[test]
fn test_corrections_and_weights_survive_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut engine = engine_over(dir.path());
        engine.record_recategorization("golden hour", Category::Lighting, Category::Mood);
        engine.set_category_weight("style", 1.5);
    }

    let engine = engine_over(dir.path());
    let semantics = &engine.export_data()["semantics"];
    assert_eq!(semantics["corrections"]["golden hour"], "mood");
    assert_eq!(semantics["weights"]["style"], 1.5);
}

#[test]
fn test_ignored_phrase_stays_suppressed_after_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut engine = engine_over(dir.path());
        for _ in 0..5 {
            engine.record_ignored("dolly");
        }
    }

    let mut engine = engine_over(dir.path());
    engine.configure(ConfigUpdate {
        min_confidence: Some(100.0),
        exploration_rate: Some(0.0),
        ..Default::default()
    });
    let outcome = engine.process_text("dolly");
    assert!(outcome.matches.is_empty());
}

#[test]
fn test_malformed_snapshot_falls_back_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("promptlight-engagement.json"),
        "{ not json at all",
    )
    .unwrap();

    let mut engine = engine_over(dir.path());
    assert_eq!(engine.statistics().total_interactions, 0);
    // The engine still works and overwrites the bad snapshot.
    engine.record_shown("golden hour", Category::Lighting, 80.0);

    let reopened = engine_over(dir.path());
    assert_eq!(reopened.statistics().total_interactions, 1);
}

#[test]
fn test_reset_learning_is_durable() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut engine = engine_over(dir.path());
        engine.process_text("neon alley in the rain");
        engine.record_click("neon alley", Category::Setting);
        engine.reset_learning();
    }

    let engine = engine_over(dir.path());
    let stats = engine.statistics();
    assert_eq!(stats.total_interactions, 0);
    assert_eq!(stats.corpus_documents, 1);
}

//! Adaptive phrase recognition for AI media-generation prompts
//!
//! Promptlight statistically extracts candidate phrases from free-text
//! prompts (camera moves, lighting, wardrobe, technical specs, ...),
//! assigns each occurrence a semantic category and confidence, and
//! continuously adapts which phrases get highlighted based on observed
//! user engagement (clicks vs. ignores).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  HighlightEngine                            │
//! │  - process_text() pipeline                  │
//! │  - feedback API (shown/click/ignore)        │
//! └────────────────────┬────────────────────────┘
//!                      │
//!    ┌─────────────┬───┴────────┬──────────────┐
//!    │             │            │              │
//! ┌──▼────────┐ ┌──▼────────┐ ┌─▼──────────┐ ┌─▼─────────┐
//! │Phrase     │ │Semantic   │ │Behavior    │ │Result     │
//! │Extractor  │ │Categorizer│ │Learner     │ │Cache      │
//! │TF-IDF/PMI │ │seeds/ctx  │ │clicks vs.  │ │LRU results│
//! │n-grams    │ │cooccur.   │ │ignores     │ │+ patterns │
//! └───────────┘ └───────────┘ └────────────┘ └───────────┘
//! ```
//!
//! The engine is single-threaded and synchronous: `process_text` runs to
//! completion with no suspension points and is intended to be called from
//! a debounced UI event loop. Durable learning state is written through an
//! injected [`storage::KeyValueStore`] port; persistence is best-effort and
//! failures never interrupt a session.
//!
//! ## Usage
//!
//! ```rust
//! use promptlight::{EngineBuilder, storage::MemoryStore};
//!
//! let mut engine = EngineBuilder::new(Box::new(MemoryStore::new())).build();
//! let outcome = engine.process_text("slow dolly shot in golden hour lighting");
//!
//! for m in &outcome.matches {
//!     println!("{} [{}..{}] {:?} ({:.0})",
//!         m.occurrence.text, m.occurrence.start, m.occurrence.end,
//!         m.assignment.category, m.confidence);
//! }
//!
//! // Close the loop from the rendering layer:
//! engine.record_shown("dolly shot", promptlight::Category::Camera, 72.0);
//! engine.record_click("dolly shot", promptlight::Category::Camera);
//! ```

pub mod cache;
pub mod category;
pub mod clock;
pub mod config;
pub mod correct;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod learner;
pub mod lexicon;
pub mod semantics;
pub mod storage;
pub mod types;

// Re-exports
pub use category::Category;
pub use config::{ConfigUpdate, EngineConfig};
pub use engine::{EngineBuilder, HighlightEngine};
pub use error::{EngineError, Result};
pub use types::{CategoryAssignment, Match, Occurrence, PhraseCandidate, ProcessOutcome, ProcessStats};

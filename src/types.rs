//! Core data types produced by the highlighting pipeline
//!
//! Everything here is ephemeral, produced per `process_text` call.
//! Durable records (engagement, cooccurrence, corpus statistics) live
//! with their owning components.

use serde::Serialize;

use crate::category::Category;

/// A token sequence surfaced by statistical extraction as potentially
/// noteworthy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhraseCandidate {
    /// Phrase text as extracted (lowercased, space-joined tokens)
    pub text: String,

    /// Normalized lookup form, keying caches and durable records
    pub normalized: String,

    /// Importance score (TF-IDF + length + technical + PMI + capitalization)
    pub score: f64,

    /// Number of tokens in the phrase
    pub word_count: usize,

    /// Whether any token is in the technical lexicon
    pub technical: bool,
}

/// A located appearance of a candidate phrase in specific text,
/// given by byte offsets `[start, end)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Occurrence {
    /// Literal text as it appears in the source
    pub text: String,

    /// Normalized phrase form
    pub normalized: String,

    /// Start byte offset (inclusive)
    pub start: usize,

    /// End byte offset (exclusive)
    pub end: usize,

    /// Importance score inherited from the candidate
    pub score: f64,
}

impl Occurrence {
    /// Whether two occurrences intersect.
    pub fn overlaps(&self, other: &Occurrence) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// How a category was assigned to an occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssignmentSource {
    /// Seed-word similarity dominated the winning score
    SeedSimilarity,
    /// Surrounding-context seed hits dominated
    Context,
    /// Learned phrase-category association dominated
    Cooccurrence,
    /// A pinned user correction short-circuited scoring
    UserOverride,
}

/// Category assigned to a single occurrence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAssignment {
    pub category: Category,

    /// Confidence in [0, 100] before behavior adjustment
    pub confidence: f64,

    /// Color token for the rendering layer
    pub color: &'static str,

    pub source: AssignmentSource,
}

/// Final output unit: an occurrence, its category, and the
/// behavior-adjusted confidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub occurrence: Occurrence,
    pub assignment: CategoryAssignment,

    /// Behavior-adjusted confidence in [0, 100]
    pub confidence: f64,
}

/// Per-stage counts for one `process_text` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProcessStats {
    /// Candidates above the extraction floor
    pub phrases_extracted: usize,

    /// Literal occurrences located for the capped candidate set
    pub occurrences_found: usize,

    /// Occurrences surviving the behavior filter
    pub after_filtering: usize,

    /// Matches returned after overlap resolution and capping
    pub final_highlights: usize,

    /// Wall time spent in the pipeline, milliseconds
    pub elapsed_ms: f64,

    /// Whether the result was served from the result cache
    pub cache_hit: bool,
}

/// Result of a `process_text` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessOutcome {
    pub matches: Vec<Match>,
    pub stats: ProcessStats,
}

impl ProcessOutcome {
    /// Well-formed empty outcome for empty input.
    pub fn empty() -> Self {
        Self {
            matches: Vec::new(),
            stats: ProcessStats::default(),
        }
    }
}

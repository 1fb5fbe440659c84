//! Statistical candidate-phrase discovery
//!
//! Tokenizes free text, generates 1–4-gram windows, and ranks them with a
//! blend of TF-IDF against the accumulated corpus, phrase length, a
//! technical-lexicon bonus, collocation strength (PMI), and a
//! capitalization signal. Also locates literal occurrences of candidate
//! phrases through a bounded compiled-pattern cache.

pub mod stats;

pub use stats::CorpusStats;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::warn;

use crate::lexicon::{stem, stopwords, technical_terms};
use crate::types::{Occurrence, PhraseCandidate};

/// Largest n-gram window considered.
pub const MAX_NGRAM: usize = 4;

/// Compiled-pattern cache cap; the oldest entry is evicted past this.
const PATTERN_CACHE_CAP: usize = 500;

/// Fraction of literal occurrences that must be capitalized for the
/// capitalization bonus.
const CAPITALIZED_RATIO: f64 = 0.3;

/// Lowercase a word and strip punctuation, keeping alphanumerics only.
fn clean(word: &str) -> String {
    word.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Tokenize: lowercase, strip punctuation, split on whitespace.
/// With `stem_tokens`, common suffixes are stripped from tokens longer
/// than 4 characters.
pub fn tokenize(text: &str, stem_tokens: bool) -> Vec<String> {
    text.split_whitespace()
        .map(clean)
        .filter(|t| !t.is_empty())
        .map(|t| {
            let t = t.to_lowercase();
            if stem_tokens {
                stem(&t)
            } else {
                t
            }
        })
        .collect()
}

/// All contiguous n-token windows, space-joined. Windows (for n > 1)
/// whose first token is a stopword are skipped.
pub fn ngrams(tokens: &[String], n: usize) -> Vec<String> {
    if n == 0 || tokens.len() < n {
        return Vec::new();
    }
    tokens
        .windows(n)
        .filter(|w| n == 1 || !stopwords().contains(w[0].as_str()))
        .map(|w| w.join(" "))
        .collect()
}

/// Pattern-cache counters surfaced in engine statistics.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PatternCacheStats {
    pub entries: usize,
    pub compilations: u64,
}

/// Statistical phrase extractor with corpus memory.
pub struct PhraseExtractor {
    stats: CorpusStats,
    patterns: HashMap<String, Arc<Regex>>,
    pattern_order: VecDeque<String>,
    compilations: u64,
}

impl PhraseExtractor {
    pub fn new() -> Self {
        Self {
            stats: CorpusStats::default(),
            patterns: HashMap::new(),
            pattern_order: VecDeque::new(),
            compilations: 0,
        }
    }

    /// Restore previously accumulated corpus statistics.
    pub fn with_stats(stats: CorpusStats) -> Self {
        let mut extractor = Self::new();
        extractor.stats = stats;
        extractor
    }

    pub fn stats(&self) -> &CorpusStats {
        &self.stats
    }

    pub fn pattern_cache_stats(&self) -> PatternCacheStats {
        PatternCacheStats {
            entries: self.patterns.len(),
            compilations: self.compilations,
        }
    }

    /// Extract candidate phrases scoring at or above `min_score`,
    /// descending by score. Empty text yields an empty list; phrases
    /// below the floor are silently dropped.
    pub fn extract_important_phrases(&self, text: &str, min_score: f64) -> Vec<PhraseCandidate> {
        // Original-case tokens drive the capitalization signal; scoring
        // runs on the lowercased forms.
        let raw: Vec<String> = text
            .split_whitespace()
            .map(clean)
            .filter(|t| !t.is_empty())
            .collect();
        if raw.is_empty() {
            return Vec::new();
        }
        let tokens: Vec<String> = raw.iter().map(|t| t.to_lowercase()).collect();
        let token_count = tokens.len() as f64;

        struct Agg {
            count: u32,
            capitalized: u32,
            word_count: usize,
        }

        let mut aggregate: HashMap<String, Agg> = HashMap::new();
        for n in 1..=MAX_NGRAM {
            if tokens.len() < n {
                break;
            }
            for start in 0..=(tokens.len() - n) {
                if n > 1 && stopwords().contains(tokens[start].as_str()) {
                    continue;
                }
                let phrase = tokens[start..start + n].join(" ");
                let capitalized = raw[start]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_uppercase());
                let entry = aggregate.entry(phrase).or_insert(Agg {
                    count: 0,
                    capitalized: 0,
                    word_count: n,
                });
                entry.count += 1;
                if capitalized {
                    entry.capitalized += 1;
                }
            }
        }

        let mut candidates: Vec<PhraseCandidate> = aggregate
            .into_iter()
            .filter_map(|(phrase, agg)| {
                let words: Vec<&str> = phrase.split(' ').collect();
                let technical = words.iter().any(|w| technical_terms().contains(*w));

                let tf = f64::from(agg.count) / token_count;
                let mut score = tf * self.stats.idf(&phrase) * 10.0;
                score += agg.word_count as f64 * 2.0;
                if technical {
                    score += 5.0;
                }
                if agg.word_count > 1 {
                    score += self.stats.pmi(&words) * 3.0;
                }
                if f64::from(agg.capitalized) >= CAPITALIZED_RATIO * f64::from(agg.count) {
                    score += 2.0;
                }

                if score >= min_score {
                    Some(PhraseCandidate {
                        normalized: phrase.clone(),
                        text: phrase,
                        score,
                        word_count: agg.word_count,
                        technical,
                    })
                } else {
                    None
                }
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.text.cmp(&b.text))
        });
        candidates
    }

    /// Locate case-insensitive, whole-word literal occurrences of a
    /// candidate phrase.
    pub fn find_occurrences(&mut self, text: &str, candidate: &PhraseCandidate) -> Vec<Occurrence> {
        let Some(pattern) = self.pattern_for(&candidate.normalized) else {
            return Vec::new();
        };
        pattern
            .find_iter(text)
            .map(|m| Occurrence {
                text: m.as_str().to_string(),
                normalized: candidate.normalized.clone(),
                start: m.start(),
                end: m.end(),
                score: candidate.score,
            })
            .collect()
    }

    /// Fold a processed text into the corpus statistics. Called once per
    /// processed text.
    pub fn update_statistics(&mut self, text: &str) {
        self.stats.record_document(text);
    }

    /// Drop accumulated corpus statistics.
    pub fn reset_statistics(&mut self) {
        self.stats = CorpusStats::default();
    }

    fn pattern_for(&mut self, normalized: &str) -> Option<Arc<Regex>> {
        if let Some(pattern) = self.patterns.get(normalized) {
            return Some(Arc::clone(pattern));
        }

        // Tokens had punctuation stripped, so any non-word run may
        // separate them in the literal text.
        let body = normalized
            .split_whitespace()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(r"\W+");
        let pattern = match RegexBuilder::new(&format!(r"\b{body}\b"))
            .case_insensitive(true)
            .build()
        {
            Ok(p) => Arc::new(p),
            Err(e) => {
                warn!(phrase = normalized, error = %e, "failed to compile phrase pattern");
                return None;
            }
        };
        self.compilations += 1;

        if self.patterns.len() >= PATTERN_CACHE_CAP {
            if let Some(oldest) = self.pattern_order.pop_front() {
                self.patterns.remove(&oldest);
            }
        }
        self.patterns
            .insert(normalized.to_string(), Arc::clone(&pattern));
        self.pattern_order.push_back(normalized.to_string());
        Some(pattern)
    }
}

impl Default for PhraseExtractor {
    fn default() -> Self {
        Self::new()
    }
}

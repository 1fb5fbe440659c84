//! Corpus statistics backing TF-IDF and PMI
//!
//! Tracks how many texts the engine has seen and, for every unique
//! 1–4-gram, how many of them contained it. The whole structure is a
//! serde snapshot persisted through the storage port.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{ngrams, tokenize, MAX_NGRAM};

/// Document-frequency statistics accumulated across processed texts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusStats {
    total_documents: u64,
    document_frequency: HashMap<String, u64>,
}

impl CorpusStats {
    pub fn total_documents(&self) -> u64 {
        self.total_documents
    }

    pub fn document_frequency(&self, term: &str) -> u64 {
        self.document_frequency.get(term).copied().unwrap_or(0)
    }

    /// Inverse document frequency: `ln(total / df)`, 0 for never-seen
    /// terms rather than an error.
    pub fn idf(&self, term: &str) -> f64 {
        let df = self.document_frequency(term);
        if df == 0 || self.total_documents == 0 {
            return 0.0;
        }
        (self.total_documents as f64 / df as f64).ln()
    }

    /// Pointwise mutual information of an n-gram against its tokens,
    /// with document frequencies as the probability estimates. Unseen
    /// n-grams (or tokens) yield 0 rather than −∞.
    pub fn pmi(&self, words: &[&str]) -> f64 {
        if words.len() < 2 || self.total_documents == 0 {
            return 0.0;
        }
        let total = self.total_documents as f64;

        let phrase = words.join(" ");
        let df_phrase = self.document_frequency(&phrase);
        if df_phrase == 0 {
            return 0.0;
        }
        let p_phrase = df_phrase as f64 / total;

        let mut p_independent = 1.0;
        for word in words {
            let df = self.document_frequency(word);
            if df == 0 {
                return 0.0;
            }
            p_independent *= df as f64 / total;
        }

        (p_phrase / p_independent).ln()
    }

    /// Count one processed text: increments the total-document counter
    /// and the document frequency of every unique 1–4-gram.
    pub fn record_document(&mut self, text: &str) {
        let tokens = tokenize(text, false);
        if tokens.is_empty() {
            return;
        }
        self.total_documents += 1;

        let mut unique: HashSet<String> = HashSet::new();
        for n in 1..=MAX_NGRAM {
            unique.extend(ngrams(&tokens, n));
        }
        for gram in unique {
            *self.document_frequency.entry(gram).or_insert(0) += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_corpus_scores_zero() {
        let stats = CorpusStats::default();
        assert_eq!(stats.idf("dolly"), 0.0);
        assert_eq!(stats.pmi(&["golden", "hour"]), 0.0);
    }

    #[test]
    fn test_record_document_counts_unique_grams_once() {
        let mut stats = CorpusStats::default();
        stats.record_document("dolly dolly dolly");
        assert_eq!(stats.total_documents(), 1);
        assert_eq!(stats.document_frequency("dolly"), 1);
        assert_eq!(stats.document_frequency("dolly dolly"), 1);
    }

    #[test]
    fn test_blank_text_not_counted() {
        let mut stats = CorpusStats::default();
        stats.record_document("   ");
        assert_eq!(stats.total_documents(), 0);
    }

    #[test]
    fn test_idf_monotone_in_rarity() {
        let mut stats = CorpusStats::default();
        stats.record_document("soft light");
        stats.record_document("soft shadows");
        stats.record_document("hard cut");
        assert!(stats.idf("shadows") > stats.idf("soft"));
        assert_eq!(stats.idf("unseen"), 0.0);
    }

    #[test]
    fn test_pmi_positive_for_collocations() {
        let mut stats = CorpusStats::default();
        // "golden hour" always co-occurs; "golden cut" never does.
        stats.record_document("golden hour glow");
        stats.record_document("golden hour shadows");
        stats.record_document("jump cut montage");

        assert!(stats.pmi(&["golden", "hour"]) > 0.0);
        assert_eq!(stats.pmi(&["golden", "cut"]), 0.0);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut stats = CorpusStats::default();
        stats.record_document("golden hour lighting");

        let json = serde_json::to_string(&stats).unwrap();
        let back: CorpusStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back.total_documents(), 1);
        assert_eq!(back.document_frequency("golden hour"), 1);
    }
}

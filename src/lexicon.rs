//! Static word lists and small word-level utilities
//!
//! Curated dictionaries for phrase extraction: stopwords skipped at
//! n-gram boundaries, the technical lexicon that boosts importance
//! scores, and the suffix-stripping stemmer shared by the extractor
//! and the categorizer.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// English stopwords. N-grams (n > 1) whose first token is a stopword
/// are skipped during extraction.
pub fn stopwords() -> &'static HashSet<&'static str> {
    static SET: Lazy<HashSet<&'static str>> = Lazy::new(|| {
        [
            "a", "an", "the", "this", "that", "these", "those", "and", "or",
            "but", "nor", "so", "yet", "of", "in", "on", "at", "by", "to",
            "for", "with", "from", "as", "into", "onto", "over", "under",
            "is", "are", "was", "were", "be", "been", "being", "am", "it",
            "its", "he", "she", "they", "them", "his", "her", "their", "we",
            "our", "you", "your", "i", "my", "me", "us", "him", "who",
            "which", "what", "there", "here", "then", "than", "very",
            "have", "has", "had", "do", "does", "did", "will", "would",
            "can", "could", "should", "not", "no", "all", "each", "some",
            "any", "more", "most", "other", "such", "only", "own", "same",
            "about", "up", "down", "out", "off", "if", "while", "when",
        ]
        .iter()
        .copied()
        .collect()
    });
    &SET
}

/// Production/cinematography vocabulary. Phrases containing any of these
/// tokens get a fixed importance bonus.
pub fn technical_terms() -> &'static HashSet<&'static str> {
    static SET: Lazy<HashSet<&'static str>> = Lazy::new(|| {
        [
            // Optics and capture
            "bokeh", "aperture", "lens", "focal", "anamorphic", "macro",
            "telephoto", "fisheye", "iso", "shutter", "exposure", "fstop",
            // Formats and delivery
            "4k", "8k", "1080p", "720p", "fps", "hdr", "raw", "codec",
            "bitrate", "35mm", "70mm", "16mm", "imax",
            // Camera work
            "dolly", "steadicam", "gimbal", "crane", "drone", "timelapse",
            "hyperlapse", "slowmotion", "whippan",
            // Image texture
            "grain", "chromatic", "vignette", "halation", "bloom",
            "letterbox", "lut",
            // Lighting hardware
            "softbox", "key", "fill", "backlight", "practicals", "gels",
        ]
        .iter()
        .copied()
        .collect()
    });
    &SET
}

/// Suffixes stripped by [`stem`], checked in order. `ies` maps to `y`;
/// everything else is removed outright.
const SUFFIXES: [(&str, &str); 8] = [
    ("ies", "y"),
    ("ing", ""),
    ("est", ""),
    ("es", ""),
    ("ed", ""),
    ("er", ""),
    ("ly", ""),
    ("s", ""),
];

/// Light suffix-stripping stemmer. Only tokens longer than 4 characters
/// are touched, and at most one suffix is removed.
pub fn stem(token: &str) -> String {
    if token.len() <= 4 {
        return token.to_string();
    }
    for (suffix, replacement) in SUFFIXES {
        if let Some(base) = token.strip_suffix(suffix) {
            // Never strip a token down to nothing meaningful.
            if base.len() >= 2 {
                return format!("{base}{replacement}");
            }
        }
    }
    token.to_string()
}

/// Levenshtein edit distance between two tokens.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

//! Runtime-tunable engine configuration

use serde::{Deserialize, Serialize};

/// Runtime knobs for the highlighting engine.
///
/// Everything else (the 0.1 extraction floor, the top-50 candidate cap,
/// the 30-day decay half-life, the ±20-point behavior swing) is fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum behavior-adjusted confidence for a match to be shown (0-100)
    pub min_confidence: f64,

    /// Maximum highlights returned per `process_text` call
    pub max_highlights: usize,

    /// Learned-score step applied per click
    pub learning_rate: f64,

    /// Probability of taking the lowered exploration threshold (0-1)
    pub exploration_rate: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_confidence: 50.0,
            max_highlights: 100,
            learning_rate: 0.1,
            exploration_rate: 0.15,
        }
    }
}

/// Partial configuration update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigUpdate {
    pub min_confidence: Option<f64>,
    pub max_highlights: Option<usize>,
    pub learning_rate: Option<f64>,
    pub exploration_rate: Option<f64>,
}

impl EngineConfig {
    /// Apply a partial update, clamping values into their valid ranges.
    pub fn apply(&mut self, update: ConfigUpdate) {
        if let Some(v) = update.min_confidence {
            self.min_confidence = v.clamp(0.0, 100.0);
        }
        if let Some(v) = update.max_highlights {
            self.max_highlights = v;
        }
        if let Some(v) = update.learning_rate {
            self.learning_rate = v.clamp(0.0, 1.0);
        }
        if let Some(v) = update.exploration_rate {
            self.exploration_rate = v.clamp(0.0, 1.0);
        }
    }
}

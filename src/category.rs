//! Closed category set for prompt highlighting
//!
//! Each category carries a seed-word list, a color token for the
//! rendering layer, and a tunable weight. Declaration order is
//! significant: it is the deterministic tie-break when two categories
//! score identically.

use serde::{Deserialize, Serialize};

/// Semantic buckets used to group and color highlights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Camera moves and framing: dolly, pan, close-up, aerial...
    Camera,
    /// Light sources and quality: golden hour, rim light, shadows...
    Lighting,
    /// Clothing and costume: silk gown, tailored suit, denim...
    Wardrobe,
    /// Production specs: 35mm, bokeh, anamorphic, frame rate...
    Technical,
    /// Emotional tone: melancholic, serene, ominous...
    Mood,
    /// Locations and environments: rooftop, desert, neon alley...
    Setting,
    /// Visual treatment: noir, painterly, documentary...
    Style,
}

impl Category {
    /// All categories in declaration (tie-break) order.
    pub const ALL: [Category; 7] = [
        Category::Camera,
        Category::Lighting,
        Category::Wardrobe,
        Category::Technical,
        Category::Mood,
        Category::Setting,
        Category::Style,
    ];

    /// Stable name used in persisted state and host-facing APIs.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Camera => "camera",
            Category::Lighting => "lighting",
            Category::Wardrobe => "wardrobe",
            Category::Technical => "technical",
            Category::Mood => "mood",
            Category::Setting => "setting",
            Category::Style => "style",
        }
    }

    /// Resolve a category by name. Unknown names yield `None`; mutators
    /// treat that as a no-op since the set is closed.
    pub fn parse(name: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.name() == name)
    }

    /// Color token consumed by the rendering layer.
    pub fn color(&self) -> &'static str {
        match self {
            Category::Camera => "#4ea1ff",
            Category::Lighting => "#ffd166",
            Category::Wardrobe => "#c792ea",
            Category::Technical => "#7fdbca",
            Category::Mood => "#f78c6c",
            Category::Setting => "#95e06c",
            Category::Style => "#ff6b9d",
        }
    }

    /// Seed words anchoring seed-similarity and context scoring.
    pub fn seeds(&self) -> &'static [&'static str] {
        match self {
            Category::Camera => &[
                "camera", "shot", "angle", "pan", "tilt", "zoom", "dolly",
                "tracking", "crane", "handheld", "steadicam", "orbit", "aerial",
                "drone", "closeup", "wide", "pov", "framing", "push", "pull",
            ],
            Category::Lighting => &[
                "lighting", "light", "lit", "shadow", "shadows", "golden",
                "hour", "soft", "hard", "glow", "backlit", "rim", "neon",
                "ambient", "dusk", "dawn", "silhouette", "flare", "contrast",
                "dim", "bright", "overcast", "candlelight",
            ],
            Category::Wardrobe => &[
                "wearing", "dress", "suit", "jacket", "coat", "gown", "denim",
                "leather", "silk", "velvet", "costume", "outfit", "vintage",
                "tailored", "flowing", "fabric", "scarf", "boots", "uniform",
            ],
            Category::Technical => &[
                "resolution", "4k", "8k", "fps", "anamorphic", "bokeh",
                "aperture", "lens", "35mm", "70mm", "film", "grain", "depth",
                "field", "exposure", "iso", "shutter", "hdr", "codec",
                "timelapse", "slowmotion", "macro",
            ],
            Category::Mood => &[
                "mood", "melancholic", "serene", "tense", "dreamy", "nostalgic",
                "ominous", "joyful", "somber", "ethereal", "intimate", "epic",
                "quiet", "chaotic", "haunting", "playful", "brooding",
            ],
            Category::Setting => &[
                "city", "street", "forest", "desert", "ocean", "rooftop",
                "interior", "exterior", "alley", "skyline", "mountain", "beach",
                "warehouse", "cafe", "rain", "snow", "underwater", "highway",
            ],
            Category::Style => &[
                "style", "cinematic", "noir", "documentary", "surreal",
                "minimalist", "baroque", "retro", "futuristic", "painterly",
                "gritty", "polished", "stylized", "photorealistic", "abstract",
                "expressionist",
            ],
        }
    }

    /// Default per-category weight. Hosts may tune weights within
    /// [`MIN_WEIGHT`, `MAX_WEIGHT`] via the engine.
    pub fn default_weight(&self) -> f64 {
        1.0
    }
}

/// Lower bound for tunable category weights.
pub const MIN_WEIGHT: f64 = 0.1;

/// Upper bound for tunable category weights.
pub const MAX_WEIGHT: f64 = 2.0;

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

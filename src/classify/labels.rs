//! Per-model label interpretation.
//!
//! Every model in the fallback chain speaks a different vocabulary: fixed
//! label pairs like `artificial`/`human`, or free-text labels that need
//! keyword matching. Rather than cascading conditionals, each model maps to
//! a [`LabelRules`] entry looked up by model id; unknown models get the
//! keyword rule.

use super::huggingface::Prediction;

/// Keywords marking a label as AI evidence under the keyword rule.
const AI_KEYWORDS: &[&str] = &["ai", "artificial", "generated", "synthetic", "deepfake", "fake"];

/// Keywords marking a label as real evidence under the keyword rule.
const REAL_KEYWORDS: &[&str] = &["real", "human", "authentic", "natural"];

/// Labels from a general-purpose image model that hint at synthetic or
/// rendered content. Used only by the degraded heuristic stage.
const SYNTHETIC_HINTS: &[&str] = &[
    "cartoon",
    "comic",
    "animation",
    "anime",
    "drawing",
    "sketch",
    "painting",
    "poster",
    "digital",
    "screen",
];

/// General-model labels that hint at a photographic scene.
const PHOTOGRAPHIC_HINTS: &[&str] = &[
    "photo",
    "portrait",
    "landscape",
    "person",
    "people",
    "street",
    "outdoor",
    "indoor",
    "animal",
    "food",
];

/// How to turn one model's raw labels into AI/real category scores.
#[derive(Debug, Clone, Copy)]
pub enum LabelRules {
    /// The model emits a known, fixed vocabulary; match labels exactly
    /// (case-insensitive).
    Exact {
        ai: &'static [&'static str],
        real: &'static [&'static str],
    },
    /// Free-text labels; match by keyword. AI keywords are checked first,
    /// so a label mentioning both buckets counts as AI evidence.
    Keyword,
}

/// The rule table for the models in the default fallback chain.
///
/// Unknown models fall through to [`LabelRules::Keyword`].
const MODEL_RULES: &[(&str, LabelRules)] = &[
    (
        "haywoodsloan/ai-image-detector-deploy",
        LabelRules::Exact {
            ai: &["artificial"],
            real: &["human"],
        },
    ),
    (
        "umm-maybe/AI-image-detector",
        LabelRules::Exact {
            ai: &["artificial"],
            real: &["human"],
        },
    ),
    (
        "legekka/AI-Anime-Image-Detector-ViT",
        LabelRules::Exact {
            ai: &["ai"],
            real: &["non-ai", "human"],
        },
    ),
];

impl LabelRules {
    /// Look up the rules for a model id.
    pub fn for_model(model: &str) -> LabelRules {
        MODEL_RULES
            .iter()
            .find(|(id, _)| *id == model)
            .map(|(_, rules)| *rules)
            .unwrap_or(LabelRules::Keyword)
    }

    /// Accumulate `(ai_score, real_score)` over a model's predictions,
    /// taking the maximum score per category.
    pub fn scores(&self, predictions: &[Prediction]) -> (f64, f64) {
        let mut ai = 0.0f64;
        let mut real = 0.0f64;

        for prediction in predictions {
            let label = prediction.label.to_lowercase();
            match self {
                LabelRules::Exact { ai: ai_labels, real: real_labels } => {
                    if ai_labels.contains(&label.as_str()) {
                        ai = ai.max(prediction.score);
                    } else if real_labels.contains(&label.as_str()) {
                        real = real.max(prediction.score);
                    }
                }
                LabelRules::Keyword => {
                    if AI_KEYWORDS.iter().any(|k| label.contains(k)) {
                        ai = ai.max(prediction.score);
                    } else if REAL_KEYWORDS.iter().any(|k| label.contains(k)) {
                        real = real.max(prediction.score);
                    }
                }
            }
        }

        (ai, real)
    }
}

/// Map a general-purpose model's scene labels to AI/real evidence.
///
/// A `cartoon`-ish top label is weak evidence of synthetic content, a
/// photographic scene label weak evidence of authenticity; everything else
/// is ignored. Deliberately lower-trust than the dedicated detectors.
pub fn heuristic_scores(predictions: &[Prediction]) -> (f64, f64) {
    let mut ai = 0.0f64;
    let mut real = 0.0f64;

    for prediction in predictions {
        let label = prediction.label.to_lowercase();
        if SYNTHETIC_HINTS.iter().any(|k| label.contains(k)) {
            ai = ai.max(prediction.score);
        } else if PHOTOGRAPHIC_HINTS.iter().any(|k| label.contains(k)) {
            real = real.max(prediction.score);
        }
    }

    (ai, real)
}

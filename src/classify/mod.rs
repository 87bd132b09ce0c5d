//! The classification fallback chain.
//!
//! An ordered list of remote detector models is tried in sequence with a
//! uniform result-or-skip contract: a transport error, bad status, empty
//! response or insignificant scores all mean "move on to the next model",
//! never an error to the caller. When every model is exhausted the chain
//! degrades to a keyword heuristic over a general-purpose image model, and
//! finally to an explicitly-labeled low-trust default. The caller always
//! receives a [`DetectionResult`]; degraded paths are distinguishable by
//! their [`Provenance`].

pub mod huggingface;
pub mod labels;

pub use huggingface::{HuggingFaceClient, Prediction};

use tracing::{debug, info, warn};

use crate::model::{DetectionResult, Provenance, SIGNIFICANCE_THRESHOLD};
use labels::LabelRules;

/// Dedicated AI-image detectors, in fallback order.
pub const DEFAULT_MODELS: &[&str] = &[
    "haywoodsloan/ai-image-detector-deploy",
    "umm-maybe/AI-image-detector",
    "legekka/AI-Anime-Image-Detector-ViT",
];

/// General-purpose model backing the degraded keyword heuristic.
pub const HEURISTIC_MODEL: &str = "google/vit-base-patch16-224";

/// Runs the fallback chain for single images.
#[derive(Clone)]
pub struct Detector {
    hf: HuggingFaceClient,
    models: Vec<String>,
}

impl Detector {
    /// A detector with the default model order.
    pub fn new(hf: HuggingFaceClient) -> Self {
        Self::with_models(hf, DEFAULT_MODELS.iter().map(|m| m.to_string()).collect())
    }

    /// A detector with a custom model order (for testing and rollout).
    pub fn with_models(hf: HuggingFaceClient, models: Vec<String>) -> Self {
        Self { hf, models }
    }

    /// Classify image bytes.
    ///
    /// Never fails: the worst case is the [`Provenance::Unverified`]
    /// default, which the reply layer renders as "temporarily unavailable"
    /// rather than a fabricated verdict.
    pub async fn detect(&self, bytes: &[u8]) -> DetectionResult {
        for model in &self.models {
            let predictions = match self.hf.classify(model, bytes).await {
                Ok(predictions) => predictions,
                Err(e) => {
                    warn!(model = %model, error = %e, "model failed, trying next");
                    continue;
                }
            };

            let (ai, real) = LabelRules::for_model(model).scores(&predictions);
            if ai > SIGNIFICANCE_THRESHOLD || real > SIGNIFICANCE_THRESHOLD {
                let result =
                    DetectionResult::from_scores(ai, real, Provenance::Model(model.clone()));
                info!(
                    model = %model,
                    is_ai = result.is_ai,
                    confidence = result.confidence,
                    "verdict from model"
                );
                return result;
            }
            debug!(model = %model, ai, real, "scores insignificant, trying next");
        }

        self.heuristic(bytes).await.unwrap_or_else(|| {
            warn!("all classification stages failed, returning unverified default");
            DetectionResult::unverified()
        })
    }

    /// Degraded stage: scene classification plus keyword hints.
    async fn heuristic(&self, bytes: &[u8]) -> Option<DetectionResult> {
        let predictions = match self.hf.classify(HEURISTIC_MODEL, bytes).await {
            Ok(predictions) => predictions,
            Err(e) => {
                warn!(model = HEURISTIC_MODEL, error = %e, "heuristic model failed");
                return None;
            }
        };

        let (ai, real) = labels::heuristic_scores(&predictions);
        if ai <= SIGNIFICANCE_THRESHOLD && real <= SIGNIFICANCE_THRESHOLD {
            return None;
        }

        let result = DetectionResult::from_scores(ai, real, Provenance::Heuristic);
        info!(
            is_ai = result.is_ai,
            confidence = result.confidence,
            "verdict from keyword heuristic"
        );
        Some(result)
    }
}

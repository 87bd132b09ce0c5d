//! Core data types for AI-content detection.
//!
//! The central type is [`DetectionResult`], the single verdict every
//! classification path funnels into. Its invariants are enforced in one
//! place ([`DetectionResult::from_scores`]) so that every producer — a
//! remote model, the keyword heuristic, the per-frame aggregate — yields a
//! structurally identical result.

use serde::Serialize;

/// Lowest confidence we will ever report to a user, in percent.
///
/// The remote models are not reliable enough to justify near-certain
/// claims in either direction, so reported confidence is clamped.
pub const CONFIDENCE_FLOOR: u8 = 60;

/// Highest confidence we will ever report to a user, in percent.
pub const CONFIDENCE_CEILING: u8 = 95;

/// Minimum raw score (0.0..1.0) in either category for a model's answer to
/// count as significant. Below this the fallback chain keeps iterating.
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.1;

/// What kind of media a verdict was produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// Which path of the classification chain produced a verdict.
///
/// Carried for logs and reply text only; never persisted. Degraded paths
/// are explicitly distinguishable so a low-trust verdict can never be
/// mistaken for a model answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Provenance {
    /// A named remote model answered with significant scores.
    Model(String),
    /// The general-purpose keyword heuristic (reduced accuracy).
    Heuristic,
    /// Average over per-frame verdicts of a video.
    FrameAverage { frames: usize },
    /// Every stage failed; this is the explicitly-labeled low-trust
    /// default. The reply layer renders it as "temporarily unavailable"
    /// rather than presenting a fabricated verdict.
    Unverified,
}

impl Provenance {
    /// Short label for logs and the reply's provenance line.
    pub fn label(&self) -> String {
        match self {
            Provenance::Model(name) => name
                .rsplit('/')
                .next()
                .unwrap_or(name.as_str())
                .to_string(),
            Provenance::Heuristic => "keyword-heuristic".to_string(),
            Provenance::FrameAverage { frames } => format!("frame-average ({frames} frames)"),
            Provenance::Unverified => "unverified".to_string(),
        }
    }
}

/// The verdict for one piece of media.
///
/// Created per inbound message, consumed immediately to build a reply,
/// then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionResult {
    /// True when the content looks AI-generated. Ties resolve to AI,
    /// consistent with the recall-biased video rule.
    pub is_ai: bool,
    /// Reported certainty, clamped to `[60, 95]`.
    pub confidence: u8,
    /// AI-category score as an integer percentage.
    pub ai_score: u8,
    /// Real-category score as an integer percentage.
    pub real_score: u8,
    /// Which model or method produced this verdict.
    pub provenance: Provenance,
}

impl DetectionResult {
    /// Build a verdict from raw category scores in `0.0..=1.0`.
    ///
    /// Enforces the aggregation invariants:
    /// `is_ai == (ai_score >= real_score)` and
    /// `confidence == clamp(round(max * 100), 60, 95)`.
    pub fn from_scores(ai: f64, real: f64, provenance: Provenance) -> Self {
        let ai_score = to_percent(ai);
        let real_score = to_percent(real);
        let is_ai = ai_score >= real_score;
        let confidence = ai_score
            .max(real_score)
            .clamp(CONFIDENCE_FLOOR, CONFIDENCE_CEILING);

        Self {
            is_ai,
            confidence,
            ai_score,
            real_score,
            provenance,
        }
    }

    /// The low-trust default returned when every classification stage
    /// failed. Always carries [`Provenance::Unverified`].
    pub fn unverified() -> Self {
        Self::from_scores(0.0, 0.0, Provenance::Unverified)
    }

    /// Whether this verdict came out of a degraded path rather than a
    /// model answer.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self.provenance,
            Provenance::Heuristic | Provenance::Unverified
        )
    }
}

fn to_percent(score: f64) -> u8 {
    (score.clamp(0.0, 1.0) * 100.0).round() as u8
}

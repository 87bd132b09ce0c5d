//! Error taxonomy for Vigil.
//!
//! Each enum corresponds to one failure domain and one handling policy:
//!
//! - [`FetchError`]: the monitored page could not be retrieved. Surfaced to
//!   the monitor cycle, which notifies the operator and skips the cycle.
//! - [`ClassifyError`]: a single remote model failed. Absorbed by the
//!   fallback chain; never reaches a webhook handler.
//! - [`MediaError`]: the user sent something we cannot analyze. Mapped to a
//!   specific user-facing remediation message.
//! - [`DeliveryError`]: an outbound message could not be sent. Logged only,
//!   never retried, never crashes the process.

use thiserror::Error;

/// Failure to retrieve the monitored page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection error or request timeout.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with something other than 200.
    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),
}

/// Failure of a single classification model.
///
/// These are per-model and local: the fallback chain logs them and moves on
/// to the next model.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("model request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model returned HTTP status {0}")]
    Status(reqwest::StatusCode),

    /// Structurally valid response with no usable predictions.
    #[error("model returned no predictions")]
    EmptyResponse,
}

/// Problems with user-submitted media.
///
/// Every variant's `Display` text doubles as the basis for the user-facing
/// guidance message, so the wording names the actual limits.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("unsupported media format; send a JPEG, PNG, GIF or WebP image")]
    UnsupportedFormat,

    #[error("video is {size_mb}MB; the limits are 16MB and 60 seconds")]
    VideoTooLarge { size_mb: u64 },

    #[error("video is {seconds:.0} seconds long; the limits are 16MB and 60 seconds")]
    VideoTooLong { seconds: f64 },

    #[error("media download failed: {0}")]
    Download(String),

    #[error("frame extraction failed: {0}")]
    FrameExtraction(String),

    /// Frames were extracted but none could be classified, or none could be
    /// extracted at all.
    #[error("no video frames could be analyzed")]
    NoFrames,
}

/// Failure to deliver an outbound notification or reply.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("send failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("messaging provider returned HTTP status {0}")]
    Status(reqwest::StatusCode),

    /// The relevant provider credentials were absent at startup.
    #[error("messaging client not configured")]
    NotConfigured,
}

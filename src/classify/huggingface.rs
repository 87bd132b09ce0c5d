//! HuggingFace Inference API client.
//!
//! One call: POST raw image bytes to a named model and get back a list of
//! label/score predictions. Used by every stage of the fallback chain, so
//! failures are typed ([`ClassifyError`]) and left to the chain to absorb.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ClassifyError;

/// Base URL for the HuggingFace Inference API.
const HF_API_BASE: &str = "https://api-inference.huggingface.co";

/// Timeout for a single model call.
const CLASSIFY_TIMEOUT: Duration = Duration::from_secs(30);

/// One label/score pair from a classification model.
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub score: f64,
}

/// Client for image classification via the HuggingFace Inference API.
#[derive(Clone)]
pub struct HuggingFaceClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HuggingFaceClient {
    /// Create a client. Without a token requests still work but are
    /// heavily rate limited.
    pub fn new(token: Option<String>) -> Self {
        Self::with_base_url(HF_API_BASE, token)
    }

    /// Create a client with a custom base URL (for testing).
    pub fn with_base_url(base_url: &str, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
            token,
        }
    }

    /// Submit image bytes to `model` and return its predictions.
    ///
    /// An empty prediction list is an error: the fallback chain treats it
    /// exactly like an unreachable model.
    pub async fn classify(&self, model: &str, bytes: &[u8]) -> Result<Vec<Prediction>, ClassifyError> {
        let url = format!("{}/models/{}", self.base_url, model);

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/octet-stream")
            .body(bytes.to_vec())
            .timeout(CLASSIFY_TIMEOUT);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ClassifyError::Status(response.status()));
        }

        let predictions: Vec<Prediction> = response.json().await?;
        if predictions.is_empty() {
            return Err(ClassifyError::EmptyResponse);
        }
        Ok(predictions)
    }
}

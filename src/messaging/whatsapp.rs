//! WhatsApp Cloud API (Graph) client.
//!
//! Covers the three calls the bot needs: resolve a media id to a download
//! URL, download media, and send a text message. All calls are
//! bearer-token authenticated against the `v18.0` Graph API.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DeliveryError, MediaError};

/// Base URL for the WhatsApp Cloud (Graph) API.
const GRAPH_API_BASE: &str = "https://graph.facebook.com/v18.0";

/// Timeout for media lookups and downloads.
const MEDIA_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for sending a message.
const SEND_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Deserialize)]
struct MediaLookupResponse {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Serialize)]
struct SendTextRequest<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    message_type: &'static str,
    text: TextBody<'a>,
}

#[derive(Debug, Serialize)]
struct TextBody<'a> {
    body: &'a str,
}

/// Client for the WhatsApp Cloud API.
#[derive(Clone)]
pub struct WhatsAppClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    phone_number_id: String,
}

impl WhatsAppClient {
    /// Create a client from a bearer token and the business phone number id.
    pub fn new(token: String, phone_number_id: String) -> Self {
        Self::with_base_url(GRAPH_API_BASE, token, phone_number_id)
    }

    /// Create a client with a custom base URL (for testing).
    pub fn with_base_url(base_url: &str, token: String, phone_number_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
            token,
            phone_number_id,
        }
    }

    /// Resolve a media id from a webhook payload to its download URL.
    pub async fn media_url(&self, media_id: &str) -> Result<String, MediaError> {
        let url = format!("{}/{}", self.base_url, media_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .timeout(MEDIA_TIMEOUT)
            .send()
            .await
            .map_err(|e| MediaError::Download(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MediaError::Download(format!(
                "media lookup returned HTTP {}",
                response.status()
            )));
        }

        let lookup: MediaLookupResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Download(e.to_string()))?;
        if lookup.url.is_empty() {
            return Err(MediaError::Download("media lookup returned no URL".to_string()));
        }
        Ok(lookup.url)
    }

    /// Download media bytes from a resolved URL.
    ///
    /// WhatsApp media URLs require the same bearer token as the lookup.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, MediaError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .timeout(MEDIA_TIMEOUT)
            .send()
            .await
            .map_err(|e| MediaError::Download(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MediaError::Download(format!(
                "download returned HTTP {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| MediaError::Download(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// Send a text message to a WhatsApp number.
    pub async fn send_text(&self, to: &str, body: &str) -> Result<(), DeliveryError> {
        let url = format!("{}/{}/messages", self.base_url, self.phone_number_id);
        let request = SendTextRequest {
            messaging_product: "whatsapp",
            to,
            message_type: "text",
            text: TextBody { body },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&request)
            .timeout(SEND_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DeliveryError::Status(response.status()));
        }
        Ok(())
    }
}

//! Twilio REST client for outbound SMS/WhatsApp messages.
//!
//! Talks to the `2010-04-01` Messages resource with basic-auth account
//! credentials. The sending number mirrors the recipient's channel: a
//! `whatsapp:`-prefixed recipient gets a `whatsapp:`-prefixed sender, a
//! plain SMS recipient gets the bare number.

use std::time::Duration;

use crate::config::TwilioConfig;
use crate::error::DeliveryError;

/// Base URL for the Twilio REST API.
const TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Timeout for a single send call.
const SEND_TIMEOUT: Duration = Duration::from_secs(20);

/// Client for sending messages through a Twilio account.
#[derive(Clone)]
pub struct TwilioClient {
    client: reqwest::Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    phone_number: String,
}

impl TwilioClient {
    /// Create a client from account credentials.
    pub fn new(config: &TwilioConfig) -> Self {
        Self::with_base_url(TWILIO_API_BASE, config)
    }

    /// Create a client with a custom base URL (for testing).
    pub fn with_base_url(base_url: &str, config: &TwilioConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            phone_number: config.phone_number.clone(),
        }
    }

    /// Send a text message to `to`, which may carry a `whatsapp:` prefix.
    pub async fn send(&self, to: &str, body: &str) -> Result<(), DeliveryError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );
        let from = self.from_for(to);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", &from), ("Body", body)])
            .timeout(SEND_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DeliveryError::Status(response.status()));
        }
        Ok(())
    }

    /// Pick the sender identity matching the recipient's channel.
    fn from_for(&self, to: &str) -> String {
        let bare = self.phone_number.trim_start_matches("whatsapp:");
        if to.starts_with("whatsapp:") {
            format!("whatsapp:{bare}")
        } else {
            bare.to_string()
        }
    }
}

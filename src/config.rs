//! Startup configuration.
//!
//! All environment variables are read exactly once, at process start, into
//! typed structs. A missing value is a startup warning that disables the
//! affected capability, never a crash: a bot without Twilio credentials
//! simply cannot answer Twilio traffic, and a monitor without an admin
//! number runs log-only.

use std::env;
use std::path::PathBuf;

use tracing::warn;

/// Default HTTP listen port for the detection bot.
pub const DEFAULT_PORT: u16 = 3000;

/// Default polling interval for the change monitor, in minutes.
pub const DEFAULT_INTERVAL_MINUTES: u64 = 30;

/// Default UTC hour at which the daily "no changes" summary may fire.
pub const DEFAULT_SUMMARY_HOUR: u32 = 20;

/// Twilio account credentials plus the sending number.
///
/// Present only when all three of `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN`
/// and `TWILIO_PHONE_NUMBER` are set.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sending number, optionally prefixed with `whatsapp:`.
    pub phone_number: String,
}

impl TwilioConfig {
    fn from_env() -> Option<Self> {
        let account_sid = optional("TWILIO_ACCOUNT_SID")?;
        let auth_token = optional("TWILIO_AUTH_TOKEN")?;
        let phone_number = optional("TWILIO_PHONE_NUMBER")?;
        Some(Self {
            account_sid,
            auth_token,
            phone_number,
        })
    }
}

/// Configuration for the detection bot server.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// HTTP listen port (`PORT`, default 3000).
    pub port: u16,
    /// Shared secret for the webhook verification handshake (`VERIFY_TOKEN`).
    pub verify_token: Option<String>,
    /// WhatsApp Cloud API bearer token (`WHATSAPP_TOKEN`).
    pub whatsapp_token: Option<String>,
    /// WhatsApp Cloud API phone number id (`PHONE_NUMBER_ID`).
    pub phone_number_id: Option<String>,
    /// HuggingFace Inference API bearer token (`HUGGINGFACE_TOKEN`).
    pub huggingface_token: Option<String>,
    /// Twilio credentials, when fully configured.
    pub twilio: Option<TwilioConfig>,
}

impl BotConfig {
    /// Read the bot configuration from the environment, warning about any
    /// missing value and the capability it disables.
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let verify_token = required("VERIFY_TOKEN", "webhook verification will reject all requests");
        let whatsapp_token = required("WHATSAPP_TOKEN", "WhatsApp media and replies disabled");
        let phone_number_id = required("PHONE_NUMBER_ID", "WhatsApp replies disabled");
        let huggingface_token =
            required("HUGGINGFACE_TOKEN", "remote classification will be degraded");

        let twilio = TwilioConfig::from_env();
        if twilio.is_none() {
            warn!("Twilio credentials incomplete; Twilio replies disabled");
        }

        Self {
            port,
            verify_token,
            whatsapp_token,
            phone_number_id,
            huggingface_token,
            twilio,
        }
    }
}

/// Which fingerprinting strategy the monitor runs with.
///
/// The two strategies are never combined in the same run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerprintStrategy {
    /// SHA-256 over the whole page body; detects "some change" only.
    Digest,
    /// Extracted job-id set; detects which ids were added/removed.
    Jobs,
}

/// Configuration for the change monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Page to poll (`MONITOR_URL`).
    pub url: String,
    /// Minutes between checks (`MONITOR_INTERVAL_MINUTES`, default 30).
    pub interval_minutes: u64,
    /// Directory holding the flat state files (`MONITOR_STATE_DIR`).
    pub state_dir: PathBuf,
    /// `MONITOR_FINGERPRINT`: `hash` or `jobs` (default `jobs`).
    pub strategy: FingerprintStrategy,
    /// UTC hour for the daily summary window (`MONITOR_SUMMARY_HOUR`).
    pub summary_hour: u32,
    /// Twilio credentials, when fully configured.
    pub twilio: Option<TwilioConfig>,
    /// Where notifications go (`ADMIN_PHONE_NUMBER`).
    pub admin_number: Option<String>,
}

impl MonitorConfig {
    /// Read the monitor configuration from the environment.
    ///
    /// Returns `None` only when `MONITOR_URL` is absent; everything else
    /// degrades with a warning.
    pub fn from_env() -> Option<Self> {
        let Some(url) = optional("MONITOR_URL") else {
            warn!("MONITOR_URL not set; nothing to monitor");
            return None;
        };

        let interval_minutes = env::var("MONITOR_INTERVAL_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_INTERVAL_MINUTES);

        let state_dir = env::var("MONITOR_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let strategy = match env::var("MONITOR_FINGERPRINT").as_deref() {
            Ok("hash") => FingerprintStrategy::Digest,
            Ok("jobs") | Err(_) => FingerprintStrategy::Jobs,
            Ok(other) => {
                warn!(value = %other, "unknown MONITOR_FINGERPRINT, using jobs");
                FingerprintStrategy::Jobs
            }
        };

        let summary_hour = env::var("MONITOR_SUMMARY_HOUR")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|h| *h < 24)
            .unwrap_or(DEFAULT_SUMMARY_HOUR);

        let twilio = TwilioConfig::from_env();
        let admin_number = optional("ADMIN_PHONE_NUMBER");
        if twilio.is_none() || admin_number.is_none() {
            warn!("Twilio credentials or admin number missing; monitor runs log-only");
        }

        Some(Self {
            url,
            interval_minutes,
            state_dir,
            strategy,
            summary_hour,
            twilio,
            admin_number,
        })
    }
}

/// Read an optional variable, treating empty strings as absent.
fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Read a variable that a capability depends on, warning when absent.
fn required(name: &str, consequence: &str) -> Option<String> {
    let value = optional(name);
    if value.is_none() {
        warn!(variable = name, "{consequence}");
    }
    value
}

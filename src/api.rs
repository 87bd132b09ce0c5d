//! HTTP surface of the detection bot.
//!
//! Four routes: the WhatsApp verification handshake (`GET /webhook`), the
//! WhatsApp event webhook (`POST /webhook`), the Twilio webhook
//! (`POST /twilio-webhook`), plus liveness (`GET /`) and health
//! (`GET /health`).
//!
//! Error policy: webhook handlers catch everything at their top level.
//! A failure while handling one message becomes a log line and a
//! best-effort apology reply; the provider always gets a 200 so it does
//! not retry-storm us. The only client errors surfaced are the handshake
//! 403 and the Twilio 400 for a missing `From`.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use crate::classify::{Detector, HuggingFaceClient};
use crate::config::BotConfig;
use crate::error::{DeliveryError, MediaError};
use crate::media;
use crate::messaging::{TwilioClient, WhatsAppClient};
use crate::model::{DetectionResult, MediaKind, Provenance};
use crate::reply;
use crate::stats::StatsStore;
use crate::video;
use crate::webhook::{
    Channel, InboundContent, InboundMessage, MediaSource, TwilioForm, VerifyParams, WhatsAppEvent,
};

/// Timeout for downloading Twilio-hosted media.
const DOWNLOAD_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BotConfig>,
    pub whatsapp: Option<WhatsAppClient>,
    pub twilio: Option<TwilioClient>,
    pub detector: Detector,
    pub stats: StatsStore,
    /// Plain client for direct media URLs (Twilio-hosted media).
    pub http: reqwest::Client,
    pub started_at: Instant,
}

impl AppState {
    /// Build the state from startup configuration, constructing only the
    /// clients whose credentials are present.
    pub fn new(config: BotConfig) -> Self {
        let whatsapp = match (&config.whatsapp_token, &config.phone_number_id) {
            (Some(token), Some(id)) => Some(WhatsAppClient::new(token.clone(), id.clone())),
            _ => None,
        };
        let twilio = config.twilio.as_ref().map(TwilioClient::new);
        let detector = Detector::new(HuggingFaceClient::new(config.huggingface_token.clone()));

        Self {
            config: Arc::new(config),
            whatsapp,
            twilio,
            detector,
            stats: StatsStore::new(),
            http: reqwest::Client::new(),
            started_at: Instant::now(),
        }
    }
}

/// Assemble the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/webhook", get(verify_webhook).post(receive_whatsapp))
        .route("/twilio-webhook", post(receive_twilio))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / - Liveness/info.
async fn root() -> impl IntoResponse {
    Json(json!({
        "service": "vigil-bot",
        "status": "running",
    }))
}

/// GET /health - Health including tracked user count and uptime.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "users": state.stats.user_count(),
        "uptime_seconds": state.started_at.elapsed().as_secs(),
    }))
}

/// GET /webhook - WhatsApp verification handshake.
///
/// Echoes `hub.challenge` with 200 when the mode is `subscribe` and the
/// token matches the configured secret; 403 otherwise (including when no
/// secret is configured).
#[instrument(skip(state, params))]
async fn verify_webhook(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> impl IntoResponse {
    let token_matches = state
        .config
        .verify_token
        .as_deref()
        .is_some_and(|secret| secret == params.verify_token);

    if params.mode == "subscribe" && token_matches {
        info!("webhook verified");
        (StatusCode::OK, params.challenge)
    } else {
        warn!("webhook verification failed");
        (StatusCode::FORBIDDEN, "Verification failed".to_string())
    }
}

/// POST /webhook - WhatsApp Cloud API events.
#[instrument(skip(state, event))]
async fn receive_whatsapp(
    State(state): State<AppState>,
    Json(event): Json<WhatsAppEvent>,
) -> impl IntoResponse {
    if event.object == "whatsapp_business_account" {
        for entry in &event.entry {
            for change in &entry.changes {
                if change.field != "messages" {
                    continue;
                }
                for message in &change.value.messages {
                    let inbound = InboundMessage::from_whatsapp(message);
                    handle_inbound(&state, inbound).await;
                }
            }
        }
    }
    (StatusCode::OK, "OK")
}

/// POST /twilio-webhook - Twilio inbound SMS/WhatsApp messages.
#[instrument(skip(state, form))]
async fn receive_twilio(
    State(state): State<AppState>,
    Form(form): Form<TwilioForm>,
) -> impl IntoResponse {
    let Some(inbound) = InboundMessage::from_twilio(&form) else {
        return (StatusCode::BAD_REQUEST, "Missing From parameter");
    };
    handle_inbound(&state, inbound).await;
    (StatusCode::OK, "OK")
}

/// Process one normalized message end to end. Absorbs all errors.
async fn handle_inbound(state: &AppState, message: InboundMessage) {
    state.stats.record_message(&message.from);

    let reply_text = match &message.content {
        InboundContent::Image(source) => {
            analyze_media(state, &message.from, source, MediaKind::Image).await
        }
        InboundContent::Video(source) => {
            analyze_media(state, &message.from, source, MediaKind::Video).await
        }
        InboundContent::Text(body) => text_reply(state, &message.from, body),
        InboundContent::Other => reply::welcome(),
    };

    send_reply(state, &message, &reply_text).await;
}

/// Download, validate and classify one piece of media, mapping every
/// failure to the matching user guidance.
async fn analyze_media(
    state: &AppState,
    from: &str,
    source: &MediaSource,
    kind: MediaKind,
) -> String {
    match classify_media(state, source, kind).await {
        Ok(result) => {
            if result.provenance != Provenance::Unverified {
                state.stats.record_analysis(from, kind, result.is_ai);
            }
            reply::detection_reply(&result, kind)
        }
        Err(e) => {
            warn!(error = %e, ?kind, "media analysis failed");
            reply::media_error_reply(&e)
        }
    }
}

async fn classify_media(
    state: &AppState,
    source: &MediaSource,
    kind: MediaKind,
) -> Result<DetectionResult, MediaError> {
    let bytes = fetch_media(state, source).await?;
    match kind {
        MediaKind::Image => {
            media::sniff_image(&bytes)?;
            Ok(state.detector.detect(&bytes).await)
        }
        MediaKind::Video => video::analyze_video(&state.detector, &bytes).await,
    }
}

async fn fetch_media(state: &AppState, source: &MediaSource) -> Result<Vec<u8>, MediaError> {
    match source {
        MediaSource::MediaId(id) => {
            let whatsapp = state
                .whatsapp
                .as_ref()
                .ok_or_else(|| MediaError::Download("WhatsApp client not configured".to_string()))?;
            let url = whatsapp.media_url(id).await?;
            whatsapp.download(&url).await
        }
        MediaSource::Url(url) => {
            let response = state
                .http
                .get(url)
                .timeout(DOWNLOAD_TIMEOUT)
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
    }
}

/// Dispatch a text command: `help`, `stats`, anything else gets the
/// welcome message.
fn text_reply(state: &AppState, from: &str, body: &str) -> String {
    let text = body.to_lowercase();
    if text.contains("help") {
        reply::help_text()
    } else if text.contains("stats") {
        match state.stats.get(from) {
            Some(stats) => reply::stats_reply(&stats, Utc::now()),
            None => reply::welcome(),
        }
    } else {
        reply::welcome()
    }
}

/// Send the reply back over the channel the message arrived on.
///
/// Delivery failures are logged, never retried and never surfaced: a lost
/// reply must not fail the webhook.
async fn send_reply(state: &AppState, message: &InboundMessage, text: &str) {
    let result = match message.channel {
        Channel::WhatsApp => match &state.whatsapp {
            Some(client) => client.send_text(&message.from, text).await,
            None => Err(DeliveryError::NotConfigured),
        },
        Channel::Twilio => match &state.twilio {
            Some(client) => client.send(&message.from, text).await,
            None => Err(DeliveryError::NotConfigured),
        },
    };

    match result {
        Ok(()) => info!(to = %message.from, "reply sent"),
        Err(e) => warn!(to = %message.from, error = %e, "reply not delivered"),
    }
}

//! Inbound webhook payloads and their normalization.
//!
//! The two providers deliver very different shapes — WhatsApp Cloud API
//! posts a deeply nested JSON event, Twilio posts flat form fields — but
//! both normalize into the same [`InboundMessage`], so everything past the
//! handlers is transport-agnostic.
//!
//! Decoding is tolerant: every field that can be absent defaults, and an
//! unrecognized message type normalizes to [`InboundContent::Other`]
//! (which the bot answers with the welcome text).

use serde::Deserialize;

/// Query parameters of the `GET /webhook` verification handshake.
#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode", default)]
    pub mode: String,
    #[serde(rename = "hub.verify_token", default)]
    pub verify_token: String,
    #[serde(rename = "hub.challenge", default)]
    pub challenge: String,
}

/// Top-level WhatsApp Cloud API event.
#[derive(Debug, Deserialize)]
pub struct WhatsAppEvent {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub entry: Vec<WhatsAppEntry>,
}

#[derive(Debug, Deserialize)]
pub struct WhatsAppEntry {
    #[serde(default)]
    pub changes: Vec<WhatsAppChange>,
}

#[derive(Debug, Deserialize)]
pub struct WhatsAppChange {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub value: WhatsAppChangeValue,
}

#[derive(Debug, Default, Deserialize)]
pub struct WhatsAppChangeValue {
    #[serde(default)]
    pub messages: Vec<WhatsAppMessage>,
}

/// One message from a WhatsApp event.
#[derive(Debug, Deserialize)]
pub struct WhatsAppMessage {
    #[serde(default)]
    pub from: String,
    #[serde(rename = "type", default)]
    pub message_type: String,
    pub image: Option<WhatsAppMedia>,
    pub video: Option<WhatsAppMedia>,
    pub text: Option<WhatsAppText>,
}

#[derive(Debug, Deserialize)]
pub struct WhatsAppMedia {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct WhatsAppText {
    #[serde(default)]
    pub body: String,
}

/// Form fields of a Twilio inbound-message webhook.
#[derive(Debug, Deserialize)]
pub struct TwilioForm {
    #[serde(rename = "From")]
    pub from: Option<String>,
    #[serde(rename = "To")]
    pub to: Option<String>,
    #[serde(rename = "Body")]
    pub body: Option<String>,
    #[serde(rename = "MediaUrl0")]
    pub media_url: Option<String>,
    #[serde(rename = "MediaContentType0")]
    pub media_content_type: Option<String>,
    #[serde(rename = "MessageSid")]
    pub message_sid: Option<String>,
}

/// Which transport a message arrived on, which decides how to reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    WhatsApp,
    Twilio,
}

/// Where the media bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// WhatsApp media id; resolve through the Graph API, then download
    /// with the bearer token.
    MediaId(String),
    /// Direct URL from Twilio; download as-is.
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundContent {
    Image(MediaSource),
    Video(MediaSource),
    Text(String),
    Other,
}

/// The transport-agnostic message every handler works with.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Sender identifier, kept in the provider's own format so replies
    /// route back correctly.
    pub from: String,
    pub channel: Channel,
    pub content: InboundContent,
}

impl InboundMessage {
    /// Normalize one WhatsApp message.
    pub fn from_whatsapp(message: &WhatsAppMessage) -> Self {
        let content = match message.message_type.as_str() {
            "image" => match &message.image {
                Some(media) => InboundContent::Image(MediaSource::MediaId(media.id.clone())),
                None => InboundContent::Other,
            },
            "video" => match &message.video {
                Some(media) => InboundContent::Video(MediaSource::MediaId(media.id.clone())),
                None => InboundContent::Other,
            },
            "text" => match &message.text {
                Some(text) => InboundContent::Text(text.body.clone()),
                None => InboundContent::Other,
            },
            _ => InboundContent::Other,
        };

        Self {
            from: message.from.clone(),
            channel: Channel::WhatsApp,
            content,
        }
    }

    /// Normalize a Twilio form into the same shape.
    ///
    /// Returns `None` when the required `From` field is missing; the
    /// handler answers 400. A media URL wins over a text body, and the
    /// content type decides image vs video (defaulting to image).
    pub fn from_twilio(form: &TwilioForm) -> Option<Self> {
        let from = form.from.clone().filter(|f| !f.is_empty())?;

        let content = if let Some(url) = form.media_url.clone().filter(|u| !u.is_empty()) {
            let is_video = form
                .media_content_type
                .as_deref()
                .is_some_and(|t| t.starts_with("video/"));
            if is_video {
                InboundContent::Video(MediaSource::Url(url))
            } else {
                InboundContent::Image(MediaSource::Url(url))
            }
        } else if let Some(body) = form.body.clone().filter(|b| !b.is_empty()) {
            InboundContent::Text(body)
        } else {
            InboundContent::Other
        };

        Some(Self {
            from,
            channel: Channel::Twilio,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whatsapp_event_decodes_with_missing_fields() {
        // Status-update events carry no messages at all
        let event: WhatsAppEvent = serde_json::from_str(
            r#"{"object":"whatsapp_business_account","entry":[{"changes":[{"field":"messages","value":{}}]}]}"#,
        )
        .unwrap();
        assert_eq!(event.entry.len(), 1);
        assert!(event.entry[0].changes[0].value.messages.is_empty());
    }

    #[test]
    fn test_whatsapp_image_normalizes() {
        let message: WhatsAppMessage = serde_json::from_str(
            r#"{"from":"15550001111","type":"image","image":{"id":"media-42"}}"#,
        )
        .unwrap();
        let inbound = InboundMessage::from_whatsapp(&message);

        assert_eq!(inbound.channel, Channel::WhatsApp);
        assert_eq!(
            inbound.content,
            InboundContent::Image(MediaSource::MediaId("media-42".to_string()))
        );
    }

    #[test]
    fn test_whatsapp_unknown_type_is_other() {
        let message: WhatsAppMessage =
            serde_json::from_str(r#"{"from":"1555","type":"sticker"}"#).unwrap();
        let inbound = InboundMessage::from_whatsapp(&message);
        assert_eq!(inbound.content, InboundContent::Other);
    }

    #[test]
    fn test_twilio_missing_from_is_rejected() {
        let form = TwilioForm {
            from: None,
            to: None,
            body: Some("hi".to_string()),
            media_url: None,
            media_content_type: None,
            message_sid: None,
        };
        assert!(InboundMessage::from_twilio(&form).is_none());
    }

    #[test]
    fn test_twilio_media_url_wins_over_body() {
        let form = TwilioForm {
            from: Some("whatsapp:+15550001111".to_string()),
            to: None,
            body: Some("look at this".to_string()),
            media_url: Some("https://api.twilio.com/media/1".to_string()),
            media_content_type: Some("image/jpeg".to_string()),
            message_sid: Some("SM1".to_string()),
        };
        let inbound = InboundMessage::from_twilio(&form).unwrap();

        assert_eq!(inbound.from, "whatsapp:+15550001111");
        assert_eq!(inbound.channel, Channel::Twilio);
        assert!(matches!(inbound.content, InboundContent::Image(_)));
    }

    #[test]
    fn test_twilio_video_content_type() {
        let form = TwilioForm {
            from: Some("+15550001111".to_string()),
            to: None,
            body: None,
            media_url: Some("https://api.twilio.com/media/2".to_string()),
            media_content_type: Some("video/mp4".to_string()),
            message_sid: None,
        };
        let inbound = InboundMessage::from_twilio(&form).unwrap();
        assert!(matches!(inbound.content, InboundContent::Video(_)));
    }

    #[test]
    fn test_twilio_text_only() {
        let form = TwilioForm {
            from: Some("+15550001111".to_string()),
            to: None,
            body: Some("stats".to_string()),
            media_url: None,
            media_content_type: None,
            message_sid: None,
        };
        let inbound = InboundMessage::from_twilio(&form).unwrap();
        assert_eq!(inbound.content, InboundContent::Text("stats".to_string()));
    }
}

//! User-facing reply text.
//!
//! Pure functions from a verdict (or error) to the message body. Both
//! messaging transports reuse these, so a WhatsApp user and a Twilio SMS
//! user see byte-identical replies.

use chrono::{DateTime, Utc};

use crate::error::MediaError;
use crate::model::{DetectionResult, MediaKind, Provenance};
use crate::stats::UserStats;

/// Render a verdict as the reply message.
///
/// An [`Provenance::Unverified`] verdict is not presented as a verdict at
/// all; the user gets the "temporarily unavailable" text instead.
pub fn detection_reply(result: &DetectionResult, kind: MediaKind) -> String {
    if result.provenance == Provenance::Unverified {
        return unavailable_reply();
    }

    let (emoji, status) = if result.is_ai {
        ("🤖", "AI-GENERATED")
    } else {
        ("✅", "AUTHENTIC")
    };
    let noun = match kind {
        MediaKind::Image => "image",
        MediaKind::Video => "video",
    };
    let guidance = if result.is_ai {
        format!("🤖 This {noun} appears to be AI-generated content")
    } else {
        format!("✅ This {noun} appears to be authentic content")
    };
    let accuracy_note = if result.is_degraded() {
        "\n⚠️ Result from a reduced-accuracy fallback method\n"
    } else {
        ""
    };

    format!(
        "{emoji} *{status}*\n\n\
         📊 Confidence: {}%\n\
         [{}]\n\n\
         {guidance}\n{accuracy_note}\n\
         📊 AI Score: {}% | Real Score: {}%\n\
         🔧 Method: {}\n\n\
         📸 Send another {noun} to analyze more!",
        result.confidence,
        confidence_bar(result.confidence),
        result.ai_score,
        result.real_score,
        result.provenance.label(),
    )
}

/// Ten-slot textual confidence bar, proportional fill.
pub fn confidence_bar(confidence: u8) -> String {
    let filled = usize::from(confidence).div_ceil(10).min(10);
    "█".repeat(filled) + &"░".repeat(10 - filled)
}

/// Sent when every classification stage failed.
pub fn unavailable_reply() -> String {
    "🚫 *AI Detection Temporarily Unavailable*\n\n\
     ⚠️ Our AI models are currently down.\n\
     🔧 We're working to fix this ASAP.\n\n\
     ⏰ Please try again in a few minutes."
        .to_string()
}

/// Greeting for first contact, unmatched text and unknown message types.
pub fn welcome() -> String {
    "🤖 *Welcome to AI Detection Bot!*\n\n\
     📸 Send me images or videos and I'll detect if they're AI-generated!\n\n\
     💡 Commands:\n\
     • 'help' - More info\n\
     • 'stats' - Your usage\n\n\
     🚀 Just send your image to get started!"
        .to_string()
}

pub fn help_text() -> String {
    "🆘 *AI Detection Bot Help*\n\n\
     *How to use:*\n\
     1. Send any image or short video\n\
     2. Get instant AI detection results\n\
     3. See confidence scores\n\n\
     *Commands:*\n\
     • 'help' - This message\n\
     • 'stats' - Usage statistics\n\n\
     *What I detect:*\n\
     • AI-generated images\n\
     • Deepfakes\n\
     • Synthetic media\n\n\
     🔬 Powered by HuggingFace AI models!"
        .to_string()
}

/// The `stats` command reply.
pub fn stats_reply(stats: &UserStats, now: DateTime<Utc>) -> String {
    let member_days = (now - stats.join_date).num_days().max(0);
    format!(
        "📊 *Your Statistics*\n\n\
         👤 Member for: {member_days} days\n\
         💬 Messages: {}\n\
         📸 Images analyzed: {}\n\
         🎬 Videos analyzed: {}\n\
         🤖 AI detected: {}\n\
         📈 AI detection rate: {}%\n\n\
         📱 Send more images to analyze!",
        stats.message_count,
        stats.images_analyzed,
        stats.videos_analyzed,
        stats.ai_detected_count,
        stats.ai_detection_rate(),
    )
}

/// Map a media error to actionable user guidance.
pub fn media_error_reply(error: &MediaError) -> String {
    match error {
        MediaError::UnsupportedFormat => {
            "🖼️ Couldn't analyze this file.\n\n\
             Supported formats: JPEG, PNG, GIF, WebP."
                .to_string()
        }
        MediaError::VideoTooLarge { .. } | MediaError::VideoTooLong { .. } => {
            "🎬 This video exceeds the limits.\n\n\
             Maximum size: 16MB\n\
             Maximum duration: 60 seconds\n\n\
             Please trim or compress it and try again."
                .to_string()
        }
        MediaError::NoFrames | MediaError::FrameExtraction(_) => {
            "🎬 Couldn't extract frames from this video. Try a different format."
                .to_string()
        }
        MediaError::Download(_) => failure_reply(),
    }
}

/// Generic apology for unexpected failures.
pub fn failure_reply() -> String {
    "🚫 Something went wrong. Please try again.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_bar_is_always_ten_slots() {
        for confidence in [60u8, 75, 88, 95] {
            let bar = confidence_bar(confidence);
            assert_eq!(bar.chars().count(), 10);
        }
    }

    #[test]
    fn test_bar_fill_is_proportional() {
        assert_eq!(confidence_bar(60), "██████░░░░");
        assert_eq!(confidence_bar(95), "██████████");
    }

    #[test]
    fn test_ai_verdict_reply() {
        let result = DetectionResult::from_scores(
            0.9,
            0.1,
            Provenance::Model("umm-maybe/AI-image-detector".to_string()),
        );
        let reply = detection_reply(&result, MediaKind::Image);

        assert!(reply.contains("AI-GENERATED"));
        assert!(reply.contains("Confidence: 90%"));
        assert!(reply.contains("AI Score: 90% | Real Score: 10%"));
        assert!(reply.contains("AI-image-detector"));
        assert!(!reply.contains("reduced-accuracy"));
    }

    #[test]
    fn test_authentic_verdict_reply() {
        let result = DetectionResult::from_scores(
            0.2,
            0.8,
            Provenance::Model("test/model".to_string()),
        );
        let reply = detection_reply(&result, MediaKind::Video);
        assert!(reply.contains("AUTHENTIC"));
        assert!(reply.contains("video"));
    }

    #[test]
    fn test_heuristic_verdict_flags_reduced_accuracy() {
        let result = DetectionResult::from_scores(0.7, 0.2, Provenance::Heuristic);
        let reply = detection_reply(&result, MediaKind::Image);
        assert!(reply.contains("reduced-accuracy"));
    }

    #[test]
    fn test_unverified_renders_as_unavailable() {
        let reply = detection_reply(&DetectionResult::unverified(), MediaKind::Image);
        assert!(reply.contains("Temporarily Unavailable"));
        assert!(!reply.contains("Confidence:"));
    }

    #[test]
    fn test_video_limit_reply_names_both_limits() {
        let reply = media_error_reply(&MediaError::VideoTooLarge { size_mb: 20 });
        assert!(reply.contains("16MB"));
        assert!(reply.contains("60 seconds"));
    }

    #[test]
    fn test_unsupported_format_names_formats() {
        let reply = media_error_reply(&MediaError::UnsupportedFormat);
        assert!(reply.contains("JPEG"));
        assert!(reply.contains("WebP"));
    }

    #[test]
    fn test_stats_reply_contents() {
        let now = Utc::now();
        let stats = UserStats {
            message_count: 12,
            images_analyzed: 5,
            videos_analyzed: 1,
            ai_detected_count: 3,
            join_date: now - Duration::days(7),
            last_active: now,
        };
        let reply = stats_reply(&stats, now);

        assert!(reply.contains("Member for: 7 days"));
        assert!(reply.contains("Messages: 12"));
        assert!(reply.contains("Images analyzed: 5"));
        assert!(reply.contains("AI detection rate: 50%"));
    }
}

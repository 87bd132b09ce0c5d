//! Video analysis: frame sampling and per-frame verdict aggregation.
//!
//! Videos are rejected against hard ceilings (16MB, 60s) before any work.
//! Accepted videos are written into a scoped temp directory, probed with
//! `ffprobe`, sampled into still frames with `ffmpeg` (one frame every two
//! seconds, capped at 30), and each frame runs through the regular
//! classification chain. The temp directory is dropped on every exit path,
//! success or failure.
//!
//! The decision rule is biased toward recall of AI content: one frame
//! classified AI at high confidence marks the whole video AI, regardless
//! of what the other frames average out to.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, warn};

use crate::classify::Detector;
use crate::error::MediaError;
use crate::media;
use crate::model::{DetectionResult, Provenance};

/// Seconds between sampled frames.
pub const FRAME_INTERVAL_SECONDS: u32 = 2;

/// Maximum number of frames sampled from one video.
pub const MAX_FRAMES: u32 = 30;

/// A single AI-classified frame at or above this confidence decides the
/// whole video ("one strong signal wins").
pub const STRONG_SIGNAL_CONFIDENCE: u8 = 80;

/// Classify a video buffer end to end.
pub async fn analyze_video(
    detector: &Detector,
    bytes: &[u8],
) -> Result<DetectionResult, MediaError> {
    media::check_video_size(bytes)?;

    let dir = tempfile::tempdir().map_err(|e| MediaError::FrameExtraction(e.to_string()))?;
    let input = dir.path().join("input.bin");
    tokio::fs::write(&input, bytes)
        .await
        .map_err(|e| MediaError::FrameExtraction(e.to_string()))?;

    let duration = probe_duration(&input).await?;
    media::check_video_duration(duration)?;

    let frames = extract_frames(&input, dir.path()).await?;
    if frames.is_empty() {
        return Err(MediaError::NoFrames);
    }
    debug!(frame_count = frames.len(), duration, "frames extracted");

    let mut verdicts = Vec::new();
    for frame in &frames {
        let frame_bytes = match tokio::fs::read(frame).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(frame = %frame.display(), error = %e, "skipping unreadable frame");
                continue;
            }
        };
        let verdict = detector.detect(&frame_bytes).await;
        if verdict.provenance == Provenance::Unverified {
            // Classification failed for this frame; skip rather than let
            // a zero-score default dilute the average
            continue;
        }
        verdicts.push(verdict);
    }

    aggregate_frames(&verdicts).ok_or(MediaError::NoFrames)
}

/// Combine per-frame verdicts into one video verdict.
///
/// Any AI frame at or above [`STRONG_SIGNAL_CONFIDENCE`] wins outright and
/// its verdict is returned as-is. Otherwise the per-frame scores are
/// averaged and the majority of the averages decides. Returns `None` when
/// no frames were classified.
pub fn aggregate_frames(frames: &[DetectionResult]) -> Option<DetectionResult> {
    if frames.is_empty() {
        return None;
    }

    if let Some(strong) = frames
        .iter()
        .find(|f| f.is_ai && f.confidence >= STRONG_SIGNAL_CONFIDENCE)
    {
        return Some(strong.clone());
    }

    let count = frames.len() as f64;
    let ai = frames.iter().map(|f| f.ai_score as f64).sum::<f64>() / count / 100.0;
    let real = frames.iter().map(|f| f.real_score as f64).sum::<f64>() / count / 100.0;

    Some(DetectionResult::from_scores(
        ai,
        real,
        Provenance::FrameAverage {
            frames: frames.len(),
        },
    ))
}

/// Probe the container duration in seconds via `ffprobe`.
async fn probe_duration(input: &Path) -> Result<f64, MediaError> {
    let output = Command::new("ffprobe")
        .args(["-v", "error", "-show_entries", "format=duration"])
        .args(["-of", "default=noprint_wrappers=1:nokey=1"])
        .arg(input)
        .output()
        .await
        .map_err(|e| MediaError::FrameExtraction(format!("ffprobe failed to start: {e}")))?;

    if !output.status.success() {
        return Err(MediaError::FrameExtraction(format!(
            "ffprobe exited with {}",
            output.status
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .trim()
        .parse()
        .map_err(|_| MediaError::FrameExtraction(format!("unparseable duration {stdout:?}")))
}

/// Sample frames from the video into `dir` via `ffmpeg`.
async fn extract_frames(input: &Path, dir: &Path) -> Result<Vec<PathBuf>, MediaError> {
    let pattern = dir.join("frame_%03d.jpg");
    let fps = format!("fps=1/{FRAME_INTERVAL_SECONDS}");

    let output = Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(input)
        .args(["-vf", &fps, "-frames:v", &MAX_FRAMES.to_string(), "-y"])
        .arg(&pattern)
        .output()
        .await
        .map_err(|e| MediaError::FrameExtraction(format!("ffmpeg failed to start: {e}")))?;

    if !output.status.success() {
        return Err(MediaError::FrameExtraction(format!(
            "ffmpeg exited with {}",
            output.status
        )));
    }

    let mut frames: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| MediaError::FrameExtraction(e.to_string()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("frame_") && n.ends_with(".jpg"))
        })
        .collect();
    frames.sort();
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(ai: f64, real: f64) -> DetectionResult {
        DetectionResult::from_scores(ai, real, Provenance::Model("test/model".to_string()))
    }

    #[test]
    fn test_empty_frames_is_none() {
        assert!(aggregate_frames(&[]).is_none());
    }

    #[test]
    fn test_one_strong_ai_frame_wins() {
        // Two clearly-real frames plus one high-confidence AI frame: the
        // strong signal decides regardless of the averages
        let frames = [frame(0.05, 0.95), frame(0.1, 0.9), frame(0.88, 0.12)];
        let verdict = aggregate_frames(&frames).unwrap();
        assert!(verdict.is_ai);
        assert_eq!(verdict.confidence, 88);
        assert!(matches!(verdict.provenance, Provenance::Model(_)));
    }

    #[test]
    fn test_weak_ai_frames_fall_through_to_average() {
        // AI frames below the strong-signal bar do not shortcut
        let frames = [frame(0.7, 0.3), frame(0.2, 0.8), frame(0.1, 0.9)];
        let verdict = aggregate_frames(&frames).unwrap();
        assert!(!verdict.is_ai);
        assert_eq!(
            verdict.provenance,
            Provenance::FrameAverage { frames: 3 }
        );
    }

    #[test]
    fn test_average_majority_ai() {
        let frames = [frame(0.6, 0.4), frame(0.7, 0.3)];
        let verdict = aggregate_frames(&frames).unwrap();
        assert!(verdict.is_ai);
        assert_eq!(verdict.ai_score, 65);
        assert_eq!(verdict.real_score, 35);
    }

    #[test]
    fn test_strong_real_frame_does_not_shortcut() {
        // The recall bias is one-directional: a confident real frame still
        // goes through the average
        let frames = [frame(0.05, 0.95), frame(0.6, 0.4)];
        let verdict = aggregate_frames(&frames).unwrap();
        assert_eq!(
            verdict.provenance,
            Provenance::FrameAverage { frames: 2 }
        );
    }
}

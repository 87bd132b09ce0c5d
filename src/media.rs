//! Media format validation.
//!
//! Inbound media is validated against a small set of magic-byte signatures
//! before any bytes are sent to a classifier. Anything unrecognized is a
//! [`MediaError::UnsupportedFormat`] with user-facing guidance.

use crate::error::MediaError;

/// Maximum accepted video size in bytes (16MB).
pub const MAX_VIDEO_BYTES: usize = 16 * 1024 * 1024;

/// Maximum accepted video duration in seconds.
pub const MAX_VIDEO_SECONDS: f64 = 60.0;

/// Image formats the classifiers accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
}

/// Identify an image by its magic bytes.
pub fn sniff_image(bytes: &[u8]) -> Result<ImageFormat, MediaError> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Ok(ImageFormat::Jpeg)
    } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Ok(ImageFormat::Png)
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Ok(ImageFormat::Gif)
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Ok(ImageFormat::Webp)
    } else {
        Err(MediaError::UnsupportedFormat)
    }
}

/// Reject a video buffer that exceeds the size ceiling.
///
/// Runs before any frame extraction is attempted; the duration ceiling is
/// checked separately once the container has been probed.
pub fn check_video_size(bytes: &[u8]) -> Result<(), MediaError> {
    if bytes.len() > MAX_VIDEO_BYTES {
        return Err(MediaError::VideoTooLarge {
            size_mb: (bytes.len() / (1024 * 1024)) as u64,
        });
    }
    Ok(())
}

/// Reject a probed duration that exceeds the ceiling.
pub fn check_video_duration(seconds: f64) -> Result<(), MediaError> {
    if seconds > MAX_VIDEO_SECONDS {
        return Err(MediaError::VideoTooLong { seconds });
    }
    Ok(())
}

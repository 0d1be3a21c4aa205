//! Input checks run before any backend is contacted. Pure and synchronous.

use serde::{Deserialize, Serialize};

use crate::error::{AssistError, Result};
use crate::models::ImageFile;

/// Largest accepted upload, 10 MiB.
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

pub const ACCEPTED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Image encodings accepted by the analysis backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageMime {
    Jpeg,
    Png,
    Webp,
}

impl ImageMime {
    /// Parse a declared MIME type. `image/jpg` is accepted as an alias of `image/jpeg`.
    pub fn parse(mime_type: &str) -> Option<Self> {
        match mime_type.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageMime::Jpeg),
            "image/png" => Some(ImageMime::Png),
            "image/webp" => Some(ImageMime::Webp),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
            ImageMime::Webp => "image/webp",
        }
    }
}

/// Reject text that is empty once surrounding whitespace is removed.
pub fn validate_text(text: &str) -> Result<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AssistError::EmptyInput);
    }
    Ok(trimmed)
}

pub fn validate_image(file: &ImageFile) -> Result<ImageMime> {
    validate_image_meta(&file.mime_type, file.size_bytes())
}

/// Metadata-only image check.
///
/// Size is checked first: an oversize file is `TooLarge` whatever its type.
pub fn validate_image_meta(mime_type: &str, size_bytes: u64) -> Result<ImageMime> {
    if size_bytes > MAX_IMAGE_BYTES {
        return Err(AssistError::TooLarge {
            size_bytes,
            limit_bytes: MAX_IMAGE_BYTES,
        });
    }

    ImageMime::parse(mime_type).ok_or_else(|| AssistError::UnsupportedType {
        mime_type: mime_type.to_string(),
    })
}

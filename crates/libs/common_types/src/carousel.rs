use crate::AspectRatio;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Discriminant prefix for carousel strings stored in a post's media field.
/// A bare media URL never carries this prefix, so the two shapes cannot be
/// confused during decoding.
pub const CAROUSEL_PREFIX: &str = "carousel:v1:";

#[derive(Debug, Error)]
pub enum CarouselError {
    #[error("carousel has {urls} urls but {ratios} aspect ratios")]
    LengthMismatch { urls: usize, ratios: usize },

    #[error("carousel must contain at least one media item")]
    Empty,

    #[error("carousel payload could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Ordered media URLs and their display aspect ratios, persisted as a single
/// string on the post record. Insertion order is display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselPayload {
    pub urls: Vec<String>,
    pub aspect_ratios: Vec<AspectRatio>,
}

impl CarouselPayload {
    pub fn new(urls: Vec<String>, aspect_ratios: Vec<AspectRatio>) -> Self {
        Self {
            urls,
            aspect_ratios,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Encodes the payload into its persisted string form.
    ///
    /// The two sequences must be parallel; a mismatch indicates a caller bug
    /// and is rejected rather than silently truncated.
    pub fn encode(&self) -> Result<String, CarouselError> {
        if self.urls.len() != self.aspect_ratios.len() {
            return Err(CarouselError::LengthMismatch {
                urls: self.urls.len(),
                ratios: self.aspect_ratios.len(),
            });
        }
        if self.urls.is_empty() {
            return Err(CarouselError::Empty);
        }
        Ok(format!("{CAROUSEL_PREFIX}{}", serde_json::to_string(self)?))
    }

    /// Attempts to decode a persisted media string as a carousel.
    ///
    /// Returns `None` for anything that is not a well-formed carousel string,
    /// including every bare media URL. This is the designed signal that the
    /// value should be treated as a single image instead.
    #[must_use]
    pub fn decode(raw: &str) -> Option<Self> {
        let body = raw.strip_prefix(CAROUSEL_PREFIX)?;
        let payload: Self = serde_json::from_str(body).ok()?;
        if payload.urls.is_empty() || payload.urls.len() != payload.aspect_ratios.len() {
            return None;
        }
        Some(payload)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Broad media category stored alongside a post's media field.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

/// Payload handed to the post persistence collaborator. This component only
/// fills `media_url` and `media_kind`; the rest passes through unvalidated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
    #[serde(rename = "authorId")]
    pub author_id: String,
    pub content: String,
    #[serde(rename = "mediaURL", skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(rename = "mediaType", skip_serializing_if = "Option::is_none")]
    pub media_kind: Option<MediaKind>,
}

/// A persisted post record as returned by the persistence collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(rename = "authorId")]
    pub author_id: String,
    pub content: String,
    #[serde(rename = "mediaURL")]
    pub media_url: Option<String>,
    #[serde(rename = "mediaType")]
    pub media_kind: Option<MediaKind>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

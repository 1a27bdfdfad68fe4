use crate::{
    CdnSettings, CompressionSettings, LoggingSettings, PostApiSettings, RawSettings,
    RawUploadPolicy,
};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub media: MediaSettings,
    pub cdn: CdnSettings,
    pub posts: PostApiSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MediaSettings {
    pub compression: CompressionSettings,
    pub upload: UploadPolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadPolicy {
    pub max_upload_bytes: u64,
    pub allowed_mime_types: Vec<String>,
    pub image_extensions: Vec<String>,
}

impl From<RawSettings> for AppSettings {
    fn from(raw: RawSettings) -> Self {
        let compression = raw.media.compression;
        assert!(
            compression.quality > 0.0 && compression.quality <= 1.0,
            "media.compression.quality must be in (0, 1]"
        );
        assert!(
            compression.max_width > 0 && compression.max_height > 0,
            "media.compression bounds must be non-zero"
        );

        Self {
            media: MediaSettings {
                compression,
                upload: raw.media.upload.into(),
            },
            cdn: raw.cdn,
            posts: raw.posts,
            logging: raw.logging,
        }
    }
}

impl From<RawUploadPolicy> for UploadPolicy {
    fn from(raw: RawUploadPolicy) -> Self {
        Self {
            max_upload_bytes: (raw.max_upload_mb * 1024.0 * 1024.0) as u64,
            allowed_mime_types: raw.allowed_mime_types,
            image_extensions: raw.image_extensions,
        }
    }
}

impl UploadPolicy {
    // stuff that needs multiple settings (otherwise just make it a standalone function).

    #[must_use]
    pub fn is_image_file(&self, file: &Path) -> bool {
        let Some(extension) = file.extension().map(|e| e.to_string_lossy().to_lowercase()) else {
            return false;
        };
        self.image_extensions.contains(&extension)
    }

    #[must_use]
    pub fn allows_mime(&self, mime: &str) -> bool {
        self.allowed_mime_types.iter().any(|m| m == mime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn policy() -> UploadPolicy {
        UploadPolicy {
            max_upload_bytes: 5 * 1024 * 1024,
            allowed_mime_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
            image_extensions: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
        }
    }

    #[test]
    fn detects_image_files_by_extension() {
        let policy = policy();
        assert!(policy.is_image_file(&PathBuf::from("holiday/IMG_001.JPG")));
        assert!(policy.is_image_file(&PathBuf::from("a.png")));
        assert!(!policy.is_image_file(&PathBuf::from("clip.mp4")));
        assert!(!policy.is_image_file(&PathBuf::from("no_extension")));
    }

    #[test]
    fn checks_mime_allow_list() {
        let policy = policy();
        assert!(policy.allows_mime("image/jpeg"));
        assert!(!policy.allows_mime("video/mp4"));
    }
}

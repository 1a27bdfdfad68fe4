use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Clone)]
pub struct RawSettings {
    pub media: RawMediaSettings,
    pub cdn: CdnSettings,
    pub posts: PostApiSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawMediaSettings {
    pub compression: CompressionSettings,
    pub upload: RawUploadPolicy,
}

/// Bounds applied to every image before it is uploaded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompressionSettings {
    /// Maximum output width in pixels. Larger inputs are scaled down with
    /// their aspect ratio preserved.
    pub max_width: u32,
    /// Maximum output height in pixels.
    pub max_height: u32,
    /// Jpeg quality in `0..=1`. Stepped down by 0.2 exactly once when the
    /// first encode misses the size budget.
    pub quality: f32,
    /// Byte budget for the compressed output, in megabytes.
    pub max_size_mb: f64,
}

impl CompressionSettings {
    #[must_use]
    pub fn max_size_bytes(&self) -> u64 {
        (self.max_size_mb * 1024.0 * 1024.0) as u64
    }
}

/// Pre-upload validation policy, as accepted by the media CDN.
#[derive(Debug, Deserialize, Clone)]
pub struct RawUploadPolicy {
    pub max_upload_mb: f64,
    pub allowed_mime_types: Vec<String>,
    /// Which file extensions are categorized as images.
    pub image_extensions: Vec<String>,
}

/// Unsigned upload endpoint of the media CDN.
#[derive(Debug, Deserialize, Clone)]
pub struct CdnSettings {
    pub api_base: String,
    pub cloud_name: String,
    pub upload_preset: String,
    pub folder: String,
}

/// Where post records are persisted.
#[derive(Debug, Deserialize, Clone)]
pub struct PostApiSettings {
    pub base_url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}

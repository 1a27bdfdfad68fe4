use common_types::CarouselPayload;

/// How the cdn should fit the image into the requested box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CropMode {
    #[default]
    Fill,
    Fit,
    Scale,
    Crop,
}

impl CropMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fill => "fill",
            Self::Fit => "fit",
            Self::Scale => "scale",
            Self::Crop => "crop",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TransformOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub crop: CropMode,
}

/// Rewrites a cdn delivery URL to apply sizing transformations.
///
/// URLs that do not belong to the cdn are returned unchanged, so this is safe
/// to call on any stored media URL.
#[must_use]
pub fn optimized_url(url: &str, options: TransformOptions) -> String {
    if !url.contains("cloudinary") {
        return url.to_owned();
    }

    let mut transformations = Vec::new();
    if let Some(width) = options.width {
        transformations.push(format!("w_{width}"));
    }
    if let Some(height) = options.height {
        transformations.push(format!("h_{height}"));
    }
    transformations.push(format!("c_{}", options.crop.as_str()));
    transformations.push("q_auto".to_string());
    transformations.push("f_auto".to_string());

    let transformation = transformations.join(",");
    url.replacen("/upload/", &format!("/upload/{transformation}/"), 1)
}

/// Small square preview, used for grid cells and avatars.
#[must_use]
pub fn thumbnail_url(url: &str) -> String {
    optimized_url(
        url,
        TransformOptions {
            width: Some(200),
            height: Some(200),
            crop: CropMode::Fill,
        },
    )
}

/// Feed-sized rendition of a stored media URL.
#[must_use]
pub fn medium_url(url: &str) -> String {
    optimized_url(
        url,
        TransformOptions {
            width: Some(800),
            height: Some(600),
            crop: CropMode::Fit,
        },
    )
}

fn is_version_segment(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// Extracts the public id from a cdn delivery URL, used when deleting media.
///
/// Handles URLs both with and without transformation and version segments.
#[must_use]
pub fn public_id_from_url(url: &str) -> Option<String> {
    let (_, after_upload) = url.split_once("/upload/")?;

    let mut segments: Vec<&str> = after_upload.split('/').collect();
    while segments.len() > 1 && (segments[0].contains(',') || is_version_segment(segments[0])) {
        segments.remove(0);
    }

    let joined = segments.join("/");
    let (public_id, extension) = joined.rsplit_once('.')?;
    if public_id.is_empty() || extension.is_empty() {
        return None;
    }
    Some(public_id.to_owned())
}

/// Collects the public ids of every slide in a carousel payload.
#[must_use]
pub fn public_ids_from_carousel(payload: &CarouselPayload) -> Vec<String> {
    payload
        .urls
        .iter()
        .filter_map(|url| public_id_from_url(url))
        .collect()
}

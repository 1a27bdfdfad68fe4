use crate::{CompressError, MediaItem, OUTPUT_MIME, SelectedFile, StagingList, compress_batch};
use crate::alert;
use app_state::MediaSettings;
use cdn_client::{MediaStorage, PostStore, PostStoreError, UploadError};
use common_types::{AspectRatio, CarouselError, CarouselPayload, MediaKind, NewPost, Post, Principal};
use futures_util::future::try_join_all;
use thiserror::Error;
use tracing::{info, warn};

/// Where one draft currently sits in its submission lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    Compressing,
    Uploading,
    Encoding,
    Persisting,
    Done,
    Failed,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("{0} is not an image file that can be attached")]
    UnsupportedFile(String),

    #[error("media could not be prepared: {0}")]
    Compress(#[from] CompressError),

    #[error("preview could not be created: {0}")]
    Preview(#[from] std::io::Error),

    #[error("media upload failed: {0}")]
    Upload(#[from] UploadError),

    #[error("carousel could not be encoded: {0}")]
    Carousel(#[from] CarouselError),

    #[error("post could not be saved: {0}")]
    Persist(#[from] PostStoreError),
}

impl SubmitError {
    /// Short text suitable for showing to the user as-is.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::UnsupportedFile(name) => format!("{name} is not a supported image."),
            Self::Compress(_) | Self::Preview(_) => {
                "One of the selected images could not be processed.".to_string()
            }
            Self::Upload(_) => "Failed to upload media. Please try again.".to_string(),
            Self::Carousel(_) | Self::Persist(_) => {
                "Failed to create post. Please try again.".to_string()
            }
        }
    }
}

/// Drives one post draft: compression fan-out on selection, ordered upload
/// fan-in on submit, carousel encoding and the final persistence hand-off.
pub struct PostComposer<S, P> {
    settings: MediaSettings,
    storage: S,
    posts: P,
    staging: StagingList,
    phase: SubmissionPhase,
}

impl<S: MediaStorage + Sync, P: PostStore + Sync> PostComposer<S, P> {
    #[must_use]
    pub const fn new(settings: MediaSettings, storage: S, posts: P) -> Self {
        Self {
            settings,
            storage,
            posts,
            staging: StagingList::new(AspectRatio::Square),
            phase: SubmissionPhase::Idle,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    #[must_use]
    pub const fn staging(&self) -> &StagingList {
        &self.staging
    }

    pub fn set_ratio(&mut self, index: usize, ratio: AspectRatio) {
        self.staging.set_ratio(index, ratio);
    }

    /// Sets the ratio newly staged items start out with.
    pub fn set_default_ratio(&mut self, ratio: AspectRatio) {
        self.staging.set_default_ratio(ratio);
    }

    pub fn remove_item(&mut self, index: usize) {
        self.staging.remove(index);
    }

    /// Compresses the selected files and appends them to the draft.
    ///
    /// All-or-nothing: if any file fails validation or compression, nothing
    /// is staged and the draft returns to its previous state.
    pub async fn stage_files(&mut self, selections: Vec<SelectedFile>) -> Result<(), SubmitError> {
        if selections.is_empty() {
            return Ok(());
        }
        for selection in &selections {
            if !self.settings.upload.allows_mime(&selection.mime) {
                return Err(SubmitError::UnsupportedFile(selection.file_name.clone()));
            }
        }

        self.phase = SubmissionPhase::Compressing;
        let inputs: Vec<Vec<u8>> = selections.iter().map(|s| s.bytes.clone()).collect();

        let compressed = match compress_batch(inputs, &self.settings.compression).await {
            Ok(compressed) => compressed,
            Err(e) => {
                self.phase = SubmissionPhase::Idle;
                return Err(e.into());
            }
        };

        let mut items = Vec::with_capacity(selections.len());
        for (selection, output) in selections.iter().zip(compressed) {
            match MediaItem::from_selection(selection, output) {
                Ok(item) => items.push(item),
                Err(e) => {
                    // Partially built items are dropped here, which releases
                    // their previews.
                    self.phase = SubmissionPhase::Idle;
                    return Err(e.into());
                }
            }
        }

        info!("Staged {} media item(s)", items.len());
        self.staging.add(items);
        Ok(())
    }

    /// Uploads the staged media, encodes the media field and persists the
    /// post on behalf of `principal`.
    ///
    /// On success the draft is cleared and reset. On failure the staged items
    /// are preserved so the user can retry without re-selecting files.
    pub async fn submit(
        &mut self,
        principal: &Principal,
        caption: &str,
    ) -> Result<Post, SubmitError> {
        match self.run_submission(principal, caption).await {
            Ok(post) => {
                self.phase = SubmissionPhase::Done;
                self.staging.clear();
                self.phase = SubmissionPhase::Idle;
                info!("Created post {} for user {}", post.id, principal.user_id);
                Ok(post)
            }
            Err(e) => {
                self.phase = SubmissionPhase::Failed;
                warn!("Submission failed for user {}: {e}", principal.user_id);
                if matches!(e, SubmitError::Carousel(_) | SubmitError::Persist(_)) {
                    alert!("Uploaded media is orphaned after a failed submission.");
                }
                Err(e)
            }
        }
    }

    async fn run_submission(
        &mut self,
        principal: &Principal,
        caption: &str,
    ) -> Result<Post, SubmitError> {
        self.phase = SubmissionPhase::Uploading;
        let storage = &self.storage;
        let uploads = self.staging.items().iter().map(|item| {
            let bytes = item.compressed().bytes.clone();
            let name_hint = item.file_name().to_owned();
            async move { storage.upload(bytes, OUTPUT_MIME, &name_hint).await }
        });
        // try_join_all yields results in staging order, whatever order the
        // individual uploads complete in.
        let urls = try_join_all(uploads).await?;

        self.phase = SubmissionPhase::Encoding;
        let (media_url, media_kind) = match urls.len() {
            0 => (None, None),
            // A single image is persisted as its bare URL, never as a
            // one-slide carousel.
            1 => (Some(urls[0].to_string()), Some(MediaKind::Image)),
            _ => {
                let payload = CarouselPayload::new(
                    urls.iter().map(ToString::to_string).collect(),
                    self.staging.items().iter().map(MediaItem::aspect_ratio).collect(),
                );
                (Some(payload.encode()?), Some(MediaKind::Image))
            }
        };

        self.phase = SubmissionPhase::Persisting;
        let new_post = NewPost {
            author_id: principal.user_id.clone(),
            content: caption.to_owned(),
            media_url,
            media_kind,
        };
        Ok(self.posts.create_post(&new_post).await?)
    }

    /// Discards the draft: releases every staged preview and resets the
    /// lifecycle. In-flight uploads are left to finish on their own; their
    /// results are simply never used.
    pub fn cancel(&mut self) {
        self.staging.clear();
        self.phase = SubmissionPhase::Idle;
    }
}

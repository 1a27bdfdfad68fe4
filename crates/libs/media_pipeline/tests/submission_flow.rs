use app_state::{CompressionSettings, MediaSettings, UploadPolicy};
use async_trait::async_trait;
use cdn_client::{MediaStorage, PostStore, PostStoreError, UploadError};
use chrono::Utc;
use common_types::{AspectRatio, CarouselPayload, MediaKind, NewPost, Post, Principal};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use media_pipeline::{PostComposer, SelectedFile, SubmissionPhase, SubmitError};
use reqwest::StatusCode;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use url::Url;

/// Upload double that mints deterministic URLs from the file name, and can
/// be told to reject one specific file. Clones share state so the test keeps
/// a handle after moving one copy into the composer.
#[derive(Clone)]
struct FakeStorage {
    fail_on: Arc<Mutex<Option<String>>>,
}

impl FakeStorage {
    fn reliable() -> Self {
        Self {
            fail_on: Arc::new(Mutex::new(None)),
        }
    }

    fn failing_on(name: &str) -> Self {
        Self {
            fail_on: Arc::new(Mutex::new(Some(name.to_string()))),
        }
    }

    fn recover(&self) {
        *self.fail_on.lock().unwrap() = None;
    }
}

#[async_trait]
impl MediaStorage for FakeStorage {
    async fn upload(
        &self,
        _bytes: Vec<u8>,
        _mime: &str,
        name_hint: &str,
    ) -> Result<Url, UploadError> {
        if self.fail_on.lock().unwrap().as_deref() == Some(name_hint) {
            return Err(UploadError::Remote {
                status: StatusCode::BAD_GATEWAY,
                message: "storage unavailable".to_string(),
            });
        }
        let url = format!("https://res.cloudinary.com/demo/image/upload/v1/posts/{name_hint}");
        Ok(Url::parse(&url).unwrap())
    }
}

/// Post store double recording every persisted payload.
#[derive(Clone, Default)]
struct FakePostStore {
    created: Arc<Mutex<Vec<NewPost>>>,
}

impl FakePostStore {
    fn created(&self) -> Vec<NewPost> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl PostStore for FakePostStore {
    async fn create_post(&self, post: &NewPost) -> Result<Post, PostStoreError> {
        self.created.lock().unwrap().push(post.clone());
        Ok(Post {
            id: "post_1".to_string(),
            author_id: post.author_id.clone(),
            content: post.content.clone(),
            media_url: post.media_url.clone(),
            media_kind: post.media_kind,
            created_at: Utc::now(),
        })
    }
}

fn media_settings() -> MediaSettings {
    MediaSettings {
        compression: CompressionSettings {
            max_width: 1920,
            max_height: 1920,
            quality: 0.85,
            max_size_mb: 1.0,
        },
        upload: UploadPolicy {
            max_upload_bytes: 5 * 1024 * 1024,
            allowed_mime_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
            image_extensions: vec!["jpg".to_string(), "png".to_string()],
        },
    }
}

fn png_selection(name: &str, width: u32, height: u32) -> SelectedFile {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    SelectedFile {
        file_name: name.to_string(),
        mime: "image/png".to_string(),
        bytes,
    }
}

fn principal() -> Principal {
    Principal::new("user_42", "Asha")
}

#[tokio::test]
async fn failed_upload_preserves_the_draft_and_persists_nothing() {
    let posts = FakePostStore::default();
    let mut composer = PostComposer::new(
        media_settings(),
        FakeStorage::failing_on("b.png"),
        posts.clone(),
    );
    composer
        .stage_files(vec![
            png_selection("a.png", 120, 90),
            png_selection("b.png", 90, 120),
        ])
        .await
        .unwrap();
    composer.set_ratio(0, AspectRatio::Wide);

    let err = composer.submit(&principal(), "two slides").await.unwrap_err();

    assert!(matches!(err, SubmitError::Upload(_)));
    assert_eq!(composer.phase(), SubmissionPhase::Failed);
    assert_eq!(composer.staging().len(), 2);
    assert_eq!(composer.staging().items()[0].aspect_ratio(), AspectRatio::Wide);
    assert!(posts.created().is_empty());
}

#[tokio::test]
async fn single_item_posts_decode_through_the_single_image_path() {
    let mut composer = PostComposer::new(
        media_settings(),
        FakeStorage::reliable(),
        FakePostStore::default(),
    );
    composer
        .stage_files(vec![png_selection("solo.png", 300, 200)])
        .await
        .unwrap();

    let post = composer.submit(&principal(), "just one").await.unwrap();

    let media_url = post.media_url.unwrap();
    assert!(media_url.ends_with("/posts/solo.png"));
    assert!(CarouselPayload::decode(&media_url).is_none());
    assert_eq!(post.media_kind, Some(MediaKind::Image));
    assert!(composer.staging().is_empty());
    assert_eq!(composer.phase(), SubmissionPhase::Idle);
}

#[tokio::test]
async fn carousel_round_trips_in_staging_order_with_edited_ratios() {
    let mut composer = PostComposer::new(
        media_settings(),
        FakeStorage::reliable(),
        FakePostStore::default(),
    );
    composer
        .stage_files(vec![
            png_selection("first.png", 100, 100),
            png_selection("second.png", 160, 90),
            png_selection("third.png", 90, 160),
        ])
        .await
        .unwrap();
    composer.set_ratio(1, AspectRatio::Wide);
    composer.set_ratio(2, AspectRatio::Tall);

    let post = composer.submit(&principal(), "carousel").await.unwrap();

    let payload = CarouselPayload::decode(&post.media_url.unwrap()).unwrap();
    assert_eq!(payload.len(), 3);
    assert!(payload.urls[0].ends_with("/posts/first.png"));
    assert!(payload.urls[1].ends_with("/posts/second.png"));
    assert!(payload.urls[2].ends_with("/posts/third.png"));
    assert_eq!(
        payload.aspect_ratios,
        vec![AspectRatio::Square, AspectRatio::Wide, AspectRatio::Tall]
    );
}

#[tokio::test]
async fn caption_only_posts_carry_no_media_fields() {
    let posts = FakePostStore::default();
    let mut composer =
        PostComposer::new(media_settings(), FakeStorage::reliable(), posts.clone());

    let post = composer.submit(&principal(), "words only").await.unwrap();

    assert_eq!(post.media_url, None);
    assert_eq!(post.media_kind, None);
    assert_eq!(post.author_id, "user_42");
    assert_eq!(posts.created().len(), 1);
}

#[tokio::test]
async fn a_failed_draft_can_be_retried_without_restaging() {
    let storage = FakeStorage::failing_on("b.png");
    let posts = FakePostStore::default();
    let mut composer = PostComposer::new(media_settings(), storage.clone(), posts.clone());
    composer
        .stage_files(vec![
            png_selection("a.png", 80, 80),
            png_selection("b.png", 80, 80),
        ])
        .await
        .unwrap();

    composer.submit(&principal(), "attempt 1").await.unwrap_err();
    assert_eq!(composer.phase(), SubmissionPhase::Failed);
    assert_eq!(composer.staging().len(), 2);
    assert!(posts.created().is_empty());

    // Storage comes back; the preserved draft submits cleanly.
    storage.recover();
    let post = composer.submit(&principal(), "attempt 2").await.unwrap();

    assert!(post.media_url.is_some());
    assert!(composer.staging().is_empty());
    assert_eq!(composer.phase(), SubmissionPhase::Idle);
    assert_eq!(posts.created().len(), 1);
}

#[tokio::test]
async fn cancel_releases_previews_and_resets_the_draft() {
    let mut composer = PostComposer::new(
        media_settings(),
        FakeStorage::reliable(),
        FakePostStore::default(),
    );
    composer
        .stage_files(vec![
            png_selection("a.png", 50, 50),
            png_selection("b.png", 50, 50),
        ])
        .await
        .unwrap();
    let paths: Vec<_> = composer
        .staging()
        .items()
        .iter()
        .map(|i| i.preview().path().unwrap().to_path_buf())
        .collect();

    composer.cancel();

    assert!(composer.staging().is_empty());
    assert_eq!(composer.phase(), SubmissionPhase::Idle);
    assert!(paths.iter().all(|p| !p.exists()));
}

#[tokio::test]
async fn non_image_selections_are_rejected_before_compression() {
    let mut composer = PostComposer::new(
        media_settings(),
        FakeStorage::reliable(),
        FakePostStore::default(),
    );
    let video = SelectedFile {
        file_name: "clip.mp4".to_string(),
        mime: "video/mp4".to_string(),
        bytes: vec![0; 128],
    };

    let err = composer
        .stage_files(vec![png_selection("a.png", 40, 40), video])
        .await
        .unwrap_err();

    assert!(matches!(err, SubmitError::UnsupportedFile(name) if name == "clip.mp4"));
    assert!(composer.staging().is_empty());
}

#[tokio::test]
async fn a_broken_file_stages_nothing_from_the_batch() {
    let mut composer = PostComposer::new(
        media_settings(),
        FakeStorage::reliable(),
        FakePostStore::default(),
    );
    let broken = SelectedFile {
        file_name: "broken.png".to_string(),
        mime: "image/png".to_string(),
        bytes: b"not actually a png".to_vec(),
    };

    let err = composer
        .stage_files(vec![png_selection("ok.png", 40, 40), broken])
        .await
        .unwrap_err();

    assert!(matches!(err, SubmitError::Compress(_)));
    assert!(composer.staging().is_empty());
    assert_eq!(composer.phase(), SubmissionPhase::Idle);
}

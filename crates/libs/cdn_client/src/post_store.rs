use crate::PostStoreError;
use app_state::PostApiSettings;
use async_trait::async_trait;
use common_types::{NewPost, Post};
use reqwest::Client;
use tracing::debug;

/// Persistence collaborator for post records.
///
/// The pipeline only supplies the media fields of the payload; everything
/// else is passed through unvalidated.
#[async_trait]
pub trait PostStore {
    async fn create_post(&self, post: &NewPost) -> Result<Post, PostStoreError>;
}

#[derive(Clone)]
pub struct HttpPostStore {
    http_client: Client,
    settings: PostApiSettings,
}

impl HttpPostStore {
    #[must_use]
    pub const fn new(http_client: Client, settings: PostApiSettings) -> Self {
        Self {
            http_client,
            settings,
        }
    }

    fn posts_url(&self) -> String {
        format!("{}/posts", self.settings.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl PostStore for HttpPostStore {
    async fn create_post(&self, post: &NewPost) -> Result<Post, PostStoreError> {
        debug!("Creating post for author {}", post.author_id);
        let response = self
            .http_client
            .post(self.posts_url())
            .json(post)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PostStoreError::Remote { status, message });
        }

        Ok(response.json().await?)
    }
}

use crate::UploadError;
use app_state::{CdnSettings, UploadPolicy};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Remote object storage that turns raw media bytes into a public URL.
///
/// The pipeline performs no retries here; a rejected upload is reported to
/// the caller as-is.
#[async_trait]
pub trait MediaStorage {
    async fn upload(&self, bytes: Vec<u8>, mime: &str, name_hint: &str)
    -> Result<Url, UploadError>;
}

/// Client for the media CDN's unsigned upload endpoint.
#[derive(Clone)]
pub struct CdnStorage {
    http_client: Client,
    settings: CdnSettings,
    policy: UploadPolicy,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl CdnStorage {
    #[must_use]
    pub const fn new(http_client: Client, settings: CdnSettings, policy: UploadPolicy) -> Self {
        Self {
            http_client,
            settings,
            policy,
        }
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/{}/image/upload",
            self.settings.api_base.trim_end_matches('/'),
            self.settings.cloud_name
        )
    }

    /// Validates a file against the upload policy without touching the network.
    pub fn check_policy(&self, size: u64, mime: &str) -> Result<(), UploadError> {
        if size > self.policy.max_upload_bytes {
            return Err(UploadError::TooLarge {
                size,
                max: self.policy.max_upload_bytes,
            });
        }
        if !self.policy.allows_mime(mime) {
            return Err(UploadError::UnsupportedType(mime.to_owned()));
        }
        Ok(())
    }
}

/// Pulls the human-readable message out of a cdn error body, if there is one.
fn remote_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(ToOwned::to_owned)
}

#[async_trait]
impl MediaStorage for CdnStorage {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        mime: &str,
        name_hint: &str,
    ) -> Result<Url, UploadError> {
        self.check_policy(bytes.len() as u64, mime)?;

        let part = Part::bytes(bytes)
            .file_name(name_hint.to_owned())
            .mime_str(mime)?;
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.settings.upload_preset.clone())
            .text("cloud_name", self.settings.cloud_name.clone())
            .text("folder", self.settings.folder.clone());

        debug!("Uploading {name_hint} to {}", self.upload_url());
        let response = self
            .http_client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = remote_error_message(&body).unwrap_or(body);
            return Err(UploadError::Remote { status, message });
        }

        let reply: UploadResponse = response.json().await?;
        Ok(Url::parse(&reply.secure_url)?)
    }
}

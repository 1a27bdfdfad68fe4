use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file of {size} bytes exceeds the {max} byte upload limit")]
    TooLarge { size: u64, max: u64 },

    #[error("file type {0} is not allowed, only images can be uploaded")]
    UnsupportedType(String),

    #[error("upload request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("media cdn returned {status}: {message}")]
    Remote { status: StatusCode, message: String },

    #[error("media cdn returned an unusable url: {0}")]
    BadUrl(#[from] url::ParseError),
}

#[derive(Debug, Error)]
pub enum PostStoreError {
    #[error("post request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("post service returned {status}: {message}")]
    Remote { status: StatusCode, message: String },
}

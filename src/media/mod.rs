//! Image hosting collaborator.

pub mod cloudinary;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cloudinary::CloudinaryMedia;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Image hosting is not configured")]
    NotConfigured,

    #[error("{0}")]
    InvalidInput(String),

    #[error("Image host request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image host returned {status}: {message}")]
    Upstream { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<String>,
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// `image` is a data URI or a remote URL
    async fn upload(&self, image: &str, folder: &str) -> Result<UploadedImage, MediaError>;

    async fn delete(&self, public_id: &str) -> Result<(), MediaError>;
}

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::{MediaError, MediaStore, UploadedImage};
use crate::config::MediaConfig;

/// Signed upload API client
pub struct CloudinaryMedia {
    client: reqwest::Client,
    api_base: String,
    credentials: Option<Credentials>,
}

struct Credentials {
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    width: Option<u32>,
    height: Option<u32>,
    format: Option<String>,
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorMessage,
}

#[derive(Deserialize)]
struct ErrorMessage {
    message: String,
}

impl CloudinaryMedia {
    pub fn new(config: &MediaConfig) -> Self {
        let credentials = match (&config.cloud_name, &config.api_key, &config.api_secret) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(Credentials {
                cloud_name: cloud_name.clone(),
                api_key: api_key.clone(),
                api_secret: api_secret.clone(),
            }),
            _ => None,
        };

        Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    fn credentials(&self) -> Result<&Credentials, MediaError> {
        self.credentials.as_ref().ok_or(MediaError::NotConfigured)
    }

    fn endpoint(&self, credentials: &Credentials, action: &str) -> String {
        format!("{}/v1_1/{}/image/{}", self.api_base, credentials.cloud_name, action)
    }

    async fn post_signed(
        &self,
        action: &str,
        mut params: Vec<(&'static str, String)>,
        unsigned: Vec<(&'static str, String)>,
    ) -> Result<reqwest::Response, MediaError> {
        let credentials = self.credentials()?;
        params.push(("timestamp", Utc::now().timestamp().to_string()));
        let signature = sign(&params, &credentials.api_secret);

        params.extend(unsigned);
        params.push(("api_key", credentials.api_key.clone()));
        params.push(("signature", signature));
        params.push(("signature_algorithm", "sha256".to_string()));

        let response = self
            .client
            .post(self.endpoint(credentials, action))
            .form(&params)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let message = response
            .json::<ErrorResponse>()
            .await
            .map(|body| body.error.message)
            .unwrap_or_else(|_| "unexpected response".to_string());
        Err(MediaError::Upstream { status, message })
    }
}

/// SHA-256 over `k=v` pairs sorted by key, joined with `&`, followed by the secret
pub(crate) fn sign(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl MediaStore for CloudinaryMedia {
    async fn upload(&self, image: &str, folder: &str) -> Result<UploadedImage, MediaError> {
        if image.trim().is_empty() {
            return Err(MediaError::InvalidInput("Image data is required".to_string()));
        }

        let response = self
            .post_signed(
                "upload",
                vec![("folder", folder.to_string())],
                vec![("file", image.to_string())],
            )
            .await?;
        let body: UploadResponse = response.json().await?;

        info!("Uploaded image {} to folder {}", body.public_id, folder);
        Ok(UploadedImage {
            url: body.secure_url,
            public_id: body.public_id,
            width: body.width,
            height: body.height,
            format: body.format,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), MediaError> {
        if public_id.trim().is_empty() {
            return Err(MediaError::InvalidInput("Public ID is required".to_string()));
        }

        let response = self
            .post_signed("destroy", vec![("public_id", public_id.to_string())], vec![])
            .await?;
        let body: DestroyResponse = response.json().await?;

        // "not found" means the asset is already gone
        debug!("Destroy {} -> {}", public_id, body.result);
        Ok(())
    }
}

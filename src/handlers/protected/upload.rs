use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::ApiError;
use crate::media::UploadedImage;
use crate::middleware::{non_empty, ApiJson, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadBody {
    /// Data URI or remote URL
    pub image: Option<String>,
    pub folder: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteQuery {
    pub public_id: Option<String>,
}

/// POST /api/upload
pub async fn post(State(state): State<AppState>, ApiJson(body): ApiJson<UploadBody>) -> ApiResult<UploadedImage> {
    let image = non_empty(body.image.as_deref()).ok_or_else(|| ApiError::validation("Image data is required"))?;
    let folder = non_empty(body.folder.as_deref()).unwrap_or_else(|| state.config.media.default_folder.clone());

    let uploaded = state.media.upload(&image, &folder).await?;
    info!("Uploaded image {} to {}", uploaded.public_id, folder);
    Ok(ApiResponse::created(uploaded))
}

/// DELETE /api/upload?publicId=
pub async fn delete(State(state): State<AppState>, Query(query): Query<DeleteQuery>) -> ApiResult<Value> {
    let public_id =
        non_empty(query.public_id.as_deref()).ok_or_else(|| ApiError::validation("Public ID is required"))?;

    state.media.delete(&public_id).await?;
    info!("Deleted image {}", public_id);
    Ok(ApiResponse::success(json!({})))
}

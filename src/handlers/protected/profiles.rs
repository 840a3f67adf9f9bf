//! Public-facing profiles, one per organisation, hostel or block.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::database::models::ProfileKind;
use crate::database::Document;
use crate::error::{merge_fields, ApiError};
use crate::middleware::{non_empty, parse_id, parse_optional_id, ApiJson, ApiResponse, ApiResult};
use crate::services::profile_service::check_slug_available;
use crate::services::ProfileService;
use crate::state::AppState;

async fn get_profile(state: &AppState, kind: ProfileKind, parent_id: &str) -> ApiResult<Document> {
    let service = ProfileService::new(state.store.as_ref(), kind);
    Ok(ApiResponse::success(service.get(parse_id(parent_id)?).await?))
}

async fn create_profile(state: &AppState, kind: ProfileKind, parent_id: &str, body: Value) -> ApiResult<Document> {
    let service = ProfileService::new(state.store.as_ref(), kind);
    Ok(ApiResponse::created(service.create(parse_id(parent_id)?, body).await?))
}

async fn upsert_profile(state: &AppState, kind: ProfileKind, parent_id: &str, body: Value) -> ApiResult<Document> {
    let service = ProfileService::new(state.store.as_ref(), kind);
    Ok(ApiResponse::success(service.upsert(parse_id(parent_id)?, body).await?))
}

async fn delete_profile(state: &AppState, kind: ProfileKind, parent_id: &str) -> ApiResult<Value> {
    let service = ProfileService::new(state.store.as_ref(), kind);
    service.delete(parse_id(parent_id)?).await?;
    Ok(ApiResponse::success(json!({})))
}

pub async fn organisation_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Document> {
    get_profile(&state, ProfileKind::Organisation, &id).await
}

pub async fn organisation_create(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Document> {
    create_profile(&state, ProfileKind::Organisation, &id, body).await
}

pub async fn organisation_upsert(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Document> {
    upsert_profile(&state, ProfileKind::Organisation, &id, body).await
}

pub async fn organisation_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    delete_profile(&state, ProfileKind::Organisation, &id).await
}

pub async fn hostel_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Document> {
    get_profile(&state, ProfileKind::Hostel, &id).await
}

pub async fn hostel_create(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Document> {
    create_profile(&state, ProfileKind::Hostel, &id, body).await
}

pub async fn hostel_upsert(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Document> {
    upsert_profile(&state, ProfileKind::Hostel, &id, body).await
}

pub async fn hostel_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    delete_profile(&state, ProfileKind::Hostel, &id).await
}

/// DELETE /api/hostel-profile/:id/banner
pub async fn hostel_delete_banner(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Document> {
    let service = ProfileService::new(state.store.as_ref(), ProfileKind::Hostel);
    let profile = service.delete_banner(parse_id(&id)?, state.media.as_ref()).await?;
    Ok(ApiResponse::success(profile))
}

pub async fn block_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Document> {
    get_profile(&state, ProfileKind::Block, &id).await
}

pub async fn block_create(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Document> {
    create_profile(&state, ProfileKind::Block, &id, body).await
}

pub async fn block_upsert(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Document> {
    upsert_profile(&state, ProfileKind::Block, &id, body).await
}

pub async fn block_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    delete_profile(&state, ProfileKind::Block, &id).await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSlug {
    pub slug: Option<String>,
    pub exclude_hostel_id: Option<String>,
}

/// POST /api/hostel-profile/check-slug
///
/// Answers `{ success, available }` without the data envelope.
pub async fn check_slug(State(state): State<AppState>, ApiJson(body): ApiJson<CheckSlug>) -> Response {
    let slug = match non_empty(body.slug.as_deref()) {
        Some(slug) => slug.to_lowercase(),
        None => return ApiError::validation("Slug is required").into_response(),
    };
    let exclude = match parse_optional_id(body.exclude_hostel_id.as_deref()) {
        Ok(exclude) => exclude,
        Err(err) => return err.into_response(),
    };

    match check_slug_available(state.store.as_ref(), &slug, exclude).await {
        Ok(available) => (StatusCode::OK, Json(json!({ "success": true, "available": available }))).into_response(),
        Err(err @ ApiError::Validation(_)) => {
            let mut extra = Map::new();
            extra.insert("available".to_string(), Value::Bool(false));
            (err.status_code(), Json(merge_fields(err.to_json(), extra))).into_response()
        }
        Err(err) => err.into_response(),
    }
}

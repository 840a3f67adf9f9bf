use axum::extract::{Path, State};
use axum::Extension;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use super::scope::{newest_first, owned_by};
use crate::database::models::Organisation;
use crate::database::Repository;
use crate::error::ApiError;
use crate::middleware::{non_empty, parse_id, ApiJson, ApiResponse, ApiResult, Principal};
use crate::services::join_code::generate_unique_join_code;
use crate::services::{delete_guarded, EntityKind};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganisation {
    pub name: Option<String>,
    pub owner_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganisation {
    pub name: Option<String>,
    pub is_online_presence_enabled: Option<bool>,
}

/// GET /api/organisations - the principal's organisations, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Vec<Organisation>> {
    let organisations = Repository::<Organisation>::new(state.store.as_ref())
        .select_any(newest_first(owned_by(principal.owner_id))?)
        .await?;
    Ok(ApiResponse::success(organisations))
}

/// POST /api/organisations
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(body): ApiJson<CreateOrganisation>,
) -> ApiResult<Organisation> {
    let (name, owner_name) = match (non_empty(body.name.as_deref()), non_empty(body.owner_name.as_deref())) {
        (Some(name), Some(owner_name)) => (name, owner_name),
        _ => return Err(ApiError::validation("Name and owner name are required")),
    };

    let store = state.store.as_ref();
    let join_code = generate_unique_join_code(store).await?;
    let organisation = Repository::<Organisation>::new(store)
        .insert(&Organisation::new(name, owner_name, principal.owner_id, join_code))
        .await?;

    info!("Created organisation {} ({})", organisation.id, organisation.join_code);
    Ok(ApiResponse::created(organisation))
}

/// GET /api/organisations/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Organisation> {
    let organisation = Repository::<Organisation>::new(state.store.as_ref())
        .select_404(parse_id(&id)?)
        .await?;
    Ok(ApiResponse::success(organisation))
}

/// PUT /api/organisations/:id - name and online presence flag
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateOrganisation>,
) -> ApiResult<Organisation> {
    let id = parse_id(&id)?;
    let mut changes = Map::new();
    if let Some(raw) = body.name.as_deref() {
        let name = non_empty(Some(raw)).ok_or_else(|| ApiError::validation("Name cannot be empty"))?;
        changes.insert("name".to_string(), Value::String(name));
    }
    if let Some(enabled) = body.is_online_presence_enabled {
        changes.insert("isOnlinePresenceEnabled".to_string(), json!(enabled));
    }

    let repo = Repository::<Organisation>::new(state.store.as_ref());
    let organisation = repo
        .update_id(id, Value::Object(changes))
        .await?
        .ok_or_else(|| ApiError::not_found("Organisation not found"))?;
    Ok(ApiResponse::success(organisation))
}

/// DELETE /api/organisations/:id - refused while hostels reference it
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    delete_guarded(state.store.as_ref(), EntityKind::Organisation, parse_id(&id)?).await?;
    Ok(ApiResponse::success(json!({})))
}

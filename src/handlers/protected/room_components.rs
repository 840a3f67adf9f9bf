//! Room components, addressed through their hostel, their block, or directly.

use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use super::scope::{block_container, container_from_ids, hostel_container, newest_first, ContainerQuery};
use crate::database::models::{Container, RoomComponent};
use crate::database::{DocumentStore, Repository};
use crate::error::ApiError;
use crate::middleware::{non_empty, parse_id, ApiJson, ApiResponse, ApiResult};
use crate::services::{delete_guarded, EntityKind};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub block_id: Option<String>,
    pub hostel_id: Option<String>,
}

impl ComponentBody {
    fn fields(&self) -> Result<(String, String), ApiError> {
        match (non_empty(self.name.as_deref()), non_empty(self.description.as_deref())) {
            (Some(name), Some(description)) => Ok((name, description)),
            _ => Err(ApiError::validation("Name and description are required")),
        }
    }
}

fn not_found() -> ApiError {
    ApiError::not_found("Component not found")
}

async fn list_in(store: &dyn DocumentStore, container: Container) -> ApiResult<Vec<RoomComponent>> {
    let components = Repository::<RoomComponent>::new(store)
        .select_any(newest_first(container.where_clause())?)
        .await?;
    Ok(ApiResponse::success(components))
}

async fn create_in(store: &dyn DocumentStore, container: Container, body: ComponentBody) -> ApiResult<RoomComponent> {
    let (name, description) = body.fields()?;
    let component = Repository::<RoomComponent>::new(store)
        .insert(&RoomComponent::new(name, description, container))
        .await?;
    info!("Created room component {} in hostel {}", component.id, container.hostel_id);
    Ok(ApiResponse::created(component))
}

async fn find_in(store: &dyn DocumentStore, container: Option<Container>, id: Uuid) -> Result<RoomComponent, ApiError> {
    let component = Repository::<RoomComponent>::new(store)
        .select_id(id)
        .await?
        .ok_or_else(not_found)?;
    match container {
        Some(container) if !container.owns(component.hostel_id, component.block_id) => Err(not_found()),
        _ => Ok(component),
    }
}

async fn update_in(
    store: &dyn DocumentStore,
    container: Option<Container>,
    id: Uuid,
    body: ComponentBody,
) -> ApiResult<RoomComponent> {
    let (name, description) = body.fields()?;
    find_in(store, container, id).await?;
    let component = Repository::<RoomComponent>::new(store)
        .update_id(id, json!({ "name": name, "description": description }))
        .await?
        .ok_or_else(not_found)?;
    Ok(ApiResponse::success(component))
}

/// Refused while a room type lists the component
async fn delete_in(store: &dyn DocumentStore, container: Option<Container>, id: Uuid) -> ApiResult<Value> {
    let component = find_in(store, container, id).await?;
    delete_guarded(store, EntityKind::RoomComponent, component.id).await?;
    Ok(ApiResponse::success(serde_json::to_value(component)?))
}

/// GET /api/room-components?blockId=|hostelId=
pub async fn list(State(state): State<AppState>, Query(query): Query<ContainerQuery>) -> ApiResult<Vec<RoomComponent>> {
    let store = state.store.as_ref();
    let container = container_from_ids(store, query.block_id.as_deref(), query.hostel_id.as_deref()).await?;
    list_in(store, container).await
}

/// POST /api/room-components - body names its block or hostel
pub async fn create(State(state): State<AppState>, ApiJson(body): ApiJson<ComponentBody>) -> ApiResult<RoomComponent> {
    let store = state.store.as_ref();
    body.fields()?;
    let container = container_from_ids(store, body.block_id.as_deref(), body.hostel_id.as_deref()).await?;
    create_in(store, container, body).await
}

/// GET /api/room-components/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<RoomComponent> {
    let component = find_in(state.store.as_ref(), None, parse_id(&id)?).await?;
    Ok(ApiResponse::success(component))
}

/// PUT /api/room-components/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ComponentBody>,
) -> ApiResult<RoomComponent> {
    update_in(state.store.as_ref(), None, parse_id(&id)?, body).await
}

/// DELETE /api/room-components/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    delete_in(state.store.as_ref(), None, parse_id(&id)?).await
}

/// GET /api/hostels/:id/components - hostel-level components only
pub async fn hostel_list(State(state): State<AppState>, Path(hostel_id): Path<String>) -> ApiResult<Vec<RoomComponent>> {
    let store = state.store.as_ref();
    list_in(store, hostel_container(store, &hostel_id).await?).await
}

/// POST /api/hostels/:id/components
pub async fn hostel_create(
    State(state): State<AppState>,
    Path(hostel_id): Path<String>,
    ApiJson(body): ApiJson<ComponentBody>,
) -> ApiResult<RoomComponent> {
    let store = state.store.as_ref();
    body.fields()?;
    create_in(store, hostel_container(store, &hostel_id).await?, body).await
}

/// PUT /api/hostels/:id/components/:component_id
pub async fn hostel_update(
    State(state): State<AppState>,
    Path((hostel_id, component_id)): Path<(String, String)>,
    ApiJson(body): ApiJson<ComponentBody>,
) -> ApiResult<RoomComponent> {
    let store = state.store.as_ref();
    let container = hostel_container(store, &hostel_id).await?;
    update_in(store, Some(container), parse_id(&component_id)?, body).await
}

/// DELETE /api/hostels/:id/components/:component_id
pub async fn hostel_delete(
    State(state): State<AppState>,
    Path((hostel_id, component_id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let store = state.store.as_ref();
    let container = hostel_container(store, &hostel_id).await?;
    delete_in(store, Some(container), parse_id(&component_id)?).await
}

/// GET /api/blocks/:id/components
pub async fn block_list(State(state): State<AppState>, Path(block_id): Path<String>) -> ApiResult<Vec<RoomComponent>> {
    let store = state.store.as_ref();
    list_in(store, block_container(store, &block_id).await?).await
}

/// POST /api/blocks/:id/components
pub async fn block_create(
    State(state): State<AppState>,
    Path(block_id): Path<String>,
    ApiJson(body): ApiJson<ComponentBody>,
) -> ApiResult<RoomComponent> {
    let store = state.store.as_ref();
    body.fields()?;
    create_in(store, block_container(store, &block_id).await?, body).await
}

/// PUT /api/blocks/:id/components/:component_id
pub async fn block_update(
    State(state): State<AppState>,
    Path((block_id, component_id)): Path<(String, String)>,
    ApiJson(body): ApiJson<ComponentBody>,
) -> ApiResult<RoomComponent> {
    let store = state.store.as_ref();
    let container = block_container(store, &block_id).await?;
    update_in(store, Some(container), parse_id(&component_id)?, body).await
}

/// DELETE /api/blocks/:id/components/:component_id
pub async fn block_delete(
    State(state): State<AppState>,
    Path((block_id, component_id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let store = state.store.as_ref();
    let container = block_container(store, &block_id).await?;
    delete_in(store, Some(container), parse_id(&component_id)?).await
}

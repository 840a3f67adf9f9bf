use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use super::scope::newest_first;
use crate::database::indexes::BLOCKS;
use crate::database::models::{Block, BlockView, Container, Hostel};
use crate::database::Repository;
use crate::error::ApiError;
use crate::middleware::{non_empty, parse_id, parse_optional_id, ApiJson, ApiResponse, ApiResult};
use crate::services::seed::seed_or_rollback;
use crate::services::{delete_guarded, EntityKind};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockQuery {
    pub hostel_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlock {
    pub name: Option<String>,
    pub hostel_id: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBlock {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// GET /api/blocks?hostelId=
pub async fn list(State(state): State<AppState>, Query(query): Query<BlockQuery>) -> ApiResult<Vec<Block>> {
    let hostel_id = parse_optional_id(query.hostel_id.as_deref())?
        .ok_or_else(|| ApiError::validation("Hostel ID is required"))?;
    let blocks = Repository::<Block>::new(state.store.as_ref())
        .select_any(newest_first(json!({ "hostelId": hostel_id }))?)
        .await?;
    Ok(ApiResponse::success(blocks))
}

/// POST /api/blocks - creates the block and its default room components
pub async fn create(State(state): State<AppState>, ApiJson(body): ApiJson<CreateBlock>) -> ApiResult<Block> {
    let store = state.store.as_ref();
    let (name, hostel_id) = match (non_empty(body.name.as_deref()), parse_optional_id(body.hostel_id.as_deref())?) {
        (Some(name), Some(hostel_id)) => (name, hostel_id),
        _ => return Err(ApiError::validation("Name and hostel ID are required")),
    };
    Repository::<Hostel>::new(store).select_404(hostel_id).await?;

    let mut block = Block::new(name, hostel_id);
    block.description = non_empty(body.description.as_deref());
    let block = Repository::<Block>::new(store).insert(&block).await?;
    seed_or_rollback(store, BLOCKS, block.id, Container::block(hostel_id, block.id)).await?;

    info!("Created block {} in hostel {}", block.id, hostel_id);
    Ok(ApiResponse::created(block))
}

/// GET /api/blocks/:id - with its hostel populated
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<BlockView> {
    let store = state.store.as_ref();
    let block = Repository::<Block>::new(store).select_404(parse_id(&id)?).await?;
    let hostel = Repository::<Hostel>::new(store).select_id(block.hostel_id).await?;
    Ok(ApiResponse::success(BlockView { block, hostel }))
}

/// PUT /api/blocks/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateBlock>,
) -> ApiResult<Block> {
    let id = parse_id(&id)?;
    let mut changes = Map::new();
    if let Some(raw) = body.name.as_deref() {
        let name = non_empty(Some(raw)).ok_or_else(|| ApiError::validation("Name cannot be empty"))?;
        changes.insert("name".to_string(), Value::String(name));
    }
    if let Some(description) = body.description {
        changes.insert("description".to_string(), Value::String(description.trim().to_string()));
    }

    let block = Repository::<Block>::new(state.store.as_ref())
        .update_id(id, Value::Object(changes))
        .await?
        .ok_or_else(|| ApiError::not_found("Block not found"))?;
    Ok(ApiResponse::success(block))
}

/// DELETE /api/blocks/:id - refused while room types or components remain
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    delete_guarded(state.store.as_ref(), EntityKind::Block, parse_id(&id)?).await?;
    Ok(ApiResponse::success(json!({})))
}

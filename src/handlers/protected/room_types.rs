//! Room types, addressed through their hostel, their block, or directly.

use axum::extract::{Path, Query, State};
use serde_json::{json, Map, Value};
use tracing::info;
use uuid::Uuid;

use super::scope::{block_container, container_from_ids, hostel_container, newest_first, ContainerQuery};
use crate::database::models::{ComponentSummary, Container, RoomComponent, RoomType, RoomTypeImage, RoomTypeView};
use crate::database::{DocumentStore, Repository};
use crate::error::ApiError;
use crate::middleware::{parse_id, ApiJson, ApiResponse, ApiResult};
use crate::services::cover_image::normalize_cover;
use crate::state::AppState;

const REQUIRED: &str = "Name, description, components, and rent are required";

/// Validated create/update payload
#[derive(Debug, Clone, PartialEq)]
pub struct RoomTypeInput {
    pub name: String,
    pub description: String,
    pub components: Vec<Uuid>,
    pub rent: f64,
    pub images: Option<Vec<RoomTypeImage>>,
}

fn required_str(body: &Map<String, Value>, key: &str) -> Result<String, ApiError> {
    body.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::validation(REQUIRED))
}

/// Rent may arrive as a number or a numeric string
fn parse_rent(value: Option<&Value>) -> Result<f64, ApiError> {
    let rent = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().parse::<f64>().ok(),
        _ => return Err(ApiError::validation(REQUIRED)),
    };
    match rent {
        Some(rent) if rent.is_finite() && rent >= 0.0 => Ok(rent),
        _ => Err(ApiError::validation("Rent must be a non-negative number")),
    }
}

impl RoomTypeInput {
    pub fn parse(body: &Value) -> Result<Self, ApiError> {
        let body = body
            .as_object()
            .ok_or_else(|| ApiError::validation(REQUIRED))?;

        let name = required_str(body, "name")?;
        let description = required_str(body, "description")?;
        let raw_components = match body.get("components") {
            Some(Value::Array(items)) => items,
            _ => return Err(ApiError::validation(REQUIRED)),
        };
        let rent = parse_rent(body.get("rent"))?;

        if raw_components.is_empty() {
            return Err(ApiError::validation("At least one component is required"));
        }
        let mut components: Vec<Uuid> = Vec::with_capacity(raw_components.len());
        for item in raw_components {
            let id = item
                .as_str()
                .and_then(|s| Uuid::parse_str(s).ok())
                .ok_or_else(|| ApiError::validation("Invalid component id"))?;
            if !components.contains(&id) {
                components.push(id);
            }
        }

        let images = match body.get("images") {
            None | Some(Value::Null) => None,
            Some(raw) => {
                let mut images: Vec<RoomTypeImage> = serde_json::from_value(raw.clone())
                    .map_err(|_| ApiError::validation("Each image needs a url and a title"))?;
                normalize_cover(&mut images);
                Some(images)
            }
        };

        Ok(Self {
            name,
            description,
            components,
            rent,
            images,
        })
    }
}

/// Every referenced component must exist in the same container
async fn check_components(store: &dyn DocumentStore, container: Container, ids: &[Uuid]) -> Result<(), ApiError> {
    let found = Repository::<RoomComponent>::new(store).select_ids(ids).await?;
    let all_owned = found.len() == ids.len()
        && found
            .iter()
            .all(|component| container.owns(component.hostel_id, component.block_id));
    if !all_owned {
        return Err(ApiError::validation(
            "All components must exist and belong to the same hostel or block as the room type",
        ));
    }
    Ok(())
}

async fn populate(store: &dyn DocumentStore, room_types: Vec<RoomType>) -> Result<Vec<RoomTypeView>, ApiError> {
    let mut ids: Vec<Uuid> = room_types.iter().flat_map(|rt| rt.components.iter().copied()).collect();
    ids.sort();
    ids.dedup();
    let known: Vec<ComponentSummary> = Repository::<RoomComponent>::new(store)
        .select_ids(&ids)
        .await?
        .into_iter()
        .map(ComponentSummary::from)
        .collect();
    Ok(room_types.into_iter().map(|rt| RoomTypeView::new(rt, &known)).collect())
}

async fn populate_one(store: &dyn DocumentStore, room_type: RoomType) -> Result<RoomTypeView, ApiError> {
    populate(store, vec![room_type])
        .await?
        .pop()
        .ok_or_else(|| ApiError::internal("Failed to populate room type"))
}

fn not_found() -> ApiError {
    ApiError::not_found("Room type not found")
}

async fn find_in(store: &dyn DocumentStore, container: Option<Container>, id: Uuid) -> Result<RoomType, ApiError> {
    let room_type = Repository::<RoomType>::new(store)
        .select_id(id)
        .await?
        .ok_or_else(not_found)?;
    match container {
        Some(container) if container != room_type.container() => Err(not_found()),
        _ => Ok(room_type),
    }
}

async fn list_in(store: &dyn DocumentStore, container: Container) -> ApiResult<Vec<RoomTypeView>> {
    let room_types = Repository::<RoomType>::new(store)
        .select_any(newest_first(container.where_clause())?)
        .await?;
    Ok(ApiResponse::success(populate(store, room_types).await?))
}

async fn create_in(store: &dyn DocumentStore, container: Container, body: &Value) -> ApiResult<RoomTypeView> {
    let input = RoomTypeInput::parse(body)?;
    check_components(store, container, &input.components).await?;

    let room_type = RoomType {
        id: Uuid::new_v4(),
        name: input.name,
        description: input.description,
        components: input.components,
        rent: input.rent,
        hostel_id: container.hostel_id,
        block_id: container.block_id,
        images: input.images.unwrap_or_default(),
        created_at: None,
        updated_at: None,
    };
    let room_type = Repository::<RoomType>::new(store).insert(&room_type).await?;
    info!("Created room type {} in hostel {}", room_type.id, container.hostel_id);
    Ok(ApiResponse::created(populate_one(store, room_type).await?))
}

async fn update_in(
    store: &dyn DocumentStore,
    container: Option<Container>,
    id: Uuid,
    body: &Value,
) -> ApiResult<RoomTypeView> {
    let input = RoomTypeInput::parse(body)?;
    let existing = find_in(store, container, id).await?;
    check_components(store, existing.container(), &input.components).await?;

    let mut changes = json!({
        "name": input.name,
        "description": input.description,
        "components": input.components,
        "rent": input.rent,
    });
    if let Some(images) = input.images {
        changes["images"] = serde_json::to_value(images)?;
    }

    let room_type = Repository::<RoomType>::new(store)
        .update_id(id, changes)
        .await?
        .ok_or_else(not_found)?;
    Ok(ApiResponse::success(populate_one(store, room_type).await?))
}

async fn delete_in(store: &dyn DocumentStore, container: Option<Container>, id: Uuid) -> ApiResult<Value> {
    find_in(store, container, id).await?;
    let deleted = Repository::<RoomType>::new(store)
        .delete_id(id)
        .await?
        .ok_or_else(not_found)?;
    info!("Deleted room type {}", deleted.id);
    Ok(ApiResponse::success(json!({})))
}

/// GET /api/room-types?blockId=|hostelId=
pub async fn list(State(state): State<AppState>, Query(query): Query<ContainerQuery>) -> ApiResult<Vec<RoomTypeView>> {
    let store = state.store.as_ref();
    let container = container_from_ids(store, query.block_id.as_deref(), query.hostel_id.as_deref()).await?;
    list_in(store, container).await
}

/// POST /api/room-types - body names its block or hostel
pub async fn create(State(state): State<AppState>, ApiJson(body): ApiJson<Value>) -> ApiResult<RoomTypeView> {
    let store = state.store.as_ref();
    RoomTypeInput::parse(&body)?;
    let container = container_from_ids(
        store,
        body.get("blockId").and_then(Value::as_str),
        body.get("hostelId").and_then(Value::as_str),
    )
    .await?;
    create_in(store, container, &body).await
}

/// GET /api/room-types/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<RoomTypeView> {
    let store = state.store.as_ref();
    let room_type = find_in(store, None, parse_id(&id)?).await?;
    Ok(ApiResponse::success(populate_one(store, room_type).await?))
}

/// PUT /api/room-types/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<RoomTypeView> {
    update_in(state.store.as_ref(), None, parse_id(&id)?, &body).await
}

/// DELETE /api/room-types/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    delete_in(state.store.as_ref(), None, parse_id(&id)?).await
}

/// GET /api/hostels/:id/room-types - hostel-level room types only
pub async fn hostel_list(State(state): State<AppState>, Path(hostel_id): Path<String>) -> ApiResult<Vec<RoomTypeView>> {
    let store = state.store.as_ref();
    list_in(store, hostel_container(store, &hostel_id).await?).await
}

/// POST /api/hostels/:id/room-types
pub async fn hostel_create(
    State(state): State<AppState>,
    Path(hostel_id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<RoomTypeView> {
    let store = state.store.as_ref();
    create_in(store, hostel_container(store, &hostel_id).await?, &body).await
}

/// GET /api/hostels/:id/room-types/:room_type_id
pub async fn hostel_get(
    State(state): State<AppState>,
    Path((hostel_id, room_type_id)): Path<(String, String)>,
) -> ApiResult<RoomTypeView> {
    let store = state.store.as_ref();
    let container = hostel_container(store, &hostel_id).await?;
    let room_type = find_in(store, Some(container), parse_id(&room_type_id)?).await?;
    Ok(ApiResponse::success(populate_one(store, room_type).await?))
}

/// PUT /api/hostels/:id/room-types/:room_type_id
pub async fn hostel_update(
    State(state): State<AppState>,
    Path((hostel_id, room_type_id)): Path<(String, String)>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<RoomTypeView> {
    let store = state.store.as_ref();
    let container = hostel_container(store, &hostel_id).await?;
    update_in(store, Some(container), parse_id(&room_type_id)?, &body).await
}

/// DELETE /api/hostels/:id/room-types/:room_type_id
pub async fn hostel_delete(
    State(state): State<AppState>,
    Path((hostel_id, room_type_id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let store = state.store.as_ref();
    let container = hostel_container(store, &hostel_id).await?;
    delete_in(store, Some(container), parse_id(&room_type_id)?).await
}

/// GET /api/blocks/:id/room-types
pub async fn block_list(State(state): State<AppState>, Path(block_id): Path<String>) -> ApiResult<Vec<RoomTypeView>> {
    let store = state.store.as_ref();
    list_in(store, block_container(store, &block_id).await?).await
}

/// POST /api/blocks/:id/room-types
pub async fn block_create(
    State(state): State<AppState>,
    Path(block_id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<RoomTypeView> {
    let store = state.store.as_ref();
    create_in(store, block_container(store, &block_id).await?, &body).await
}

/// GET /api/blocks/:id/room-types/:room_type_id
pub async fn block_get(
    State(state): State<AppState>,
    Path((block_id, room_type_id)): Path<(String, String)>,
) -> ApiResult<RoomTypeView> {
    let store = state.store.as_ref();
    let container = block_container(store, &block_id).await?;
    let room_type = find_in(store, Some(container), parse_id(&room_type_id)?).await?;
    Ok(ApiResponse::success(populate_one(store, room_type).await?))
}

/// PUT /api/blocks/:id/room-types/:room_type_id
pub async fn block_update(
    State(state): State<AppState>,
    Path((block_id, room_type_id)): Path<(String, String)>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<RoomTypeView> {
    let store = state.store.as_ref();
    let container = block_container(store, &block_id).await?;
    update_in(store, Some(container), parse_id(&room_type_id)?, &body).await
}

/// DELETE /api/blocks/:id/room-types/:room_type_id
pub async fn block_delete(
    State(state): State<AppState>,
    Path((block_id, room_type_id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let store = state.store.as_ref();
    let container = block_container(store, &block_id).await?;
    delete_in(store, Some(container), parse_id(&room_type_id)?).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rent_and_components() {
        let component = Uuid::new_v4();
        let input = RoomTypeInput::parse(&json!({
            "name": "Deluxe",
            "description": "Two sharing",
            "components": [component, component],
            "rent": "4500.50",
            "images": [
                { "url": "https://img/a.jpg", "title": "A" },
                { "url": "https://img/b.jpg", "title": "B" }
            ]
        }))
        .unwrap();
        assert_eq!(input.rent, 4500.5);
        assert_eq!(input.components, vec![component]);
        let images = input.images.unwrap();
        assert!(images[0].is_cover);
        assert!(!images[1].is_cover);
    }

    #[test]
    fn rejects_bad_payloads() {
        let component = Uuid::new_v4();
        let empty = RoomTypeInput::parse(&json!({
            "name": "Deluxe", "description": "d", "components": [], "rent": 100
        }))
        .unwrap_err();
        assert_eq!(empty.message(), "At least one component is required");

        let negative = RoomTypeInput::parse(&json!({
            "name": "Deluxe", "description": "d", "components": [component], "rent": -1
        }))
        .unwrap_err();
        assert_eq!(negative.message(), "Rent must be a non-negative number");

        let missing = RoomTypeInput::parse(&json!({ "name": "Deluxe" })).unwrap_err();
        assert_eq!(missing.message(), REQUIRED);

        let zero = RoomTypeInput::parse(&json!({
            "name": "Dorm", "description": "d", "components": [component], "rent": 0
        }));
        assert!(zero.is_ok());
    }
}

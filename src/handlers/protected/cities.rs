use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::database::indexes::CITIES;
use crate::database::models::City;
use crate::database::Repository;
use crate::error::ApiError;
use crate::filter::Filter;
use crate::middleware::{non_empty, parse_id, ApiJson, ApiResponse, ApiResult};
use crate::services::slug::{generate_slug, slug_taken};
use crate::services::{delete_guarded, EntityKind};
use crate::state::AppState;

const DUPLICATE_CITY: &str = "A city with this name already exists";
const EMPTY_SLUG: &str = "City name must contain at least one letter or number";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCity {
    pub name: Option<String>,
    pub state: Option<String>,
    pub intro_content: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

/// GET /api/cities - alphabetical
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<City>> {
    let filter = Filter::new()
        .order(json!("name asc"))
        .map_err(|e| ApiError::internal(e.to_string()))?;
    let cities = Repository::<City>::new(state.store.as_ref()).select_any(filter).await?;
    Ok(ApiResponse::success(cities))
}

/// POST /api/cities
pub async fn create(State(state): State<AppState>, ApiJson(body): ApiJson<CreateCity>) -> ApiResult<City> {
    let (name, region) = match (non_empty(body.name.as_deref()), non_empty(body.state.as_deref())) {
        (Some(name), Some(region)) => (name, region),
        _ => return Err(ApiError::validation("Name and state are required")),
    };

    let slug = generate_slug(&name);
    if slug.is_empty() {
        return Err(ApiError::validation(EMPTY_SLUG));
    }
    let store = state.store.as_ref();
    if slug_taken(store, CITIES, &slug, None).await? {
        return Err(ApiError::conflict(DUPLICATE_CITY));
    }

    let mut city = City::new(name, slug, region);
    city.intro_content = non_empty(body.intro_content.as_deref());
    city.meta_title = non_empty(body.meta_title.as_deref());
    city.meta_description = non_empty(body.meta_description.as_deref());

    let city = Repository::<City>::new(store).insert(&city).await?;
    info!("Created city {} ({})", city.name, city.slug);
    Ok(ApiResponse::created(city))
}

/// GET /api/cities/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<City> {
    let city = Repository::<City>::new(state.store.as_ref())
        .select_id(parse_id(&id)?)
        .await?
        .ok_or_else(|| ApiError::not_found("City not found"))?;
    Ok(ApiResponse::success(city))
}

/// PUT /api/cities/:id - a new name regenerates the slug
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Map<String, Value>>,
) -> ApiResult<City> {
    let id = parse_id(&id)?;
    let store = state.store.as_ref();
    let repo = Repository::<City>::new(store);
    repo.select_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("City not found"))?;

    let mut changes = Map::new();
    if let Some(raw) = body.get("name") {
        let name = non_empty(raw.as_str()).ok_or_else(|| ApiError::validation("Name cannot be empty"))?;
        let slug = generate_slug(&name);
        if slug.is_empty() {
            return Err(ApiError::validation(EMPTY_SLUG));
        }
        if slug_taken(store, CITIES, &slug, Some(("id", json!(id)))).await? {
            return Err(ApiError::conflict(DUPLICATE_CITY));
        }
        changes.insert("name".to_string(), json!(name));
        changes.insert("slug".to_string(), json!(slug));
    }
    if let Some(raw) = body.get("state") {
        let region = non_empty(raw.as_str()).ok_or_else(|| ApiError::validation("State cannot be empty"))?;
        changes.insert("state".to_string(), json!(region));
    }
    for key in ["introContent", "metaTitle", "metaDescription"] {
        match body.get(key) {
            None => {}
            Some(Value::Null) => {
                changes.insert(key.to_string(), Value::Null);
            }
            Some(Value::String(text)) => {
                let text = text.trim();
                let value = if text.is_empty() { Value::Null } else { json!(text) };
                changes.insert(key.to_string(), value);
            }
            Some(_) => return Err(ApiError::validation(format!("{} must be a string", key))),
        }
    }

    let city = repo
        .update_id(id, Value::Object(changes))
        .await?
        .ok_or_else(|| ApiError::not_found("City not found"))?;
    Ok(ApiResponse::success(city))
}

/// DELETE /api/cities/:id - refused while hostels reference the city
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    delete_guarded(state.store.as_ref(), EntityKind::City, id).await?;
    info!("Deleted city {}", id);
    Ok(ApiResponse::success(json!({})))
}

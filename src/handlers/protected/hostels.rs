use axum::extract::{Path, Query, State};
use axum::Extension;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;
use uuid::Uuid;

use super::scope::{newest_first, owned_by};
use crate::database::indexes::HOSTELS;
use crate::database::models::{City, Container, Hostel, HostelView, Organisation};
use crate::database::{DocumentStore, Repository};
use crate::error::ApiError;
use crate::middleware::{non_empty, parse_id, parse_optional_id, ApiJson, ApiResponse, ApiResult, Principal};
use crate::services::seed::seed_or_rollback;
use crate::services::{delete_guarded, EntityKind};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostelQuery {
    pub organisation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHostel {
    pub name: Option<String>,
    pub organisation_id: Option<String>,
    pub description: Option<String>,
    pub city_id: Option<String>,
}

async fn require_city(store: &dyn DocumentStore, city_id: Uuid) -> Result<(), ApiError> {
    Repository::<City>::new(store).select_404(city_id).await?;
    Ok(())
}

/// GET /api/hostels[?organisationId=] - newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<HostelQuery>,
) -> ApiResult<Vec<Hostel>> {
    let conditions = match parse_optional_id(query.organisation_id.as_deref())? {
        Some(organisation_id) => json!({ "organisationId": organisation_id }),
        None => owned_by(principal.owner_id),
    };
    let hostels = Repository::<Hostel>::new(state.store.as_ref())
        .select_any(newest_first(conditions)?)
        .await?;
    Ok(ApiResponse::success(hostels))
}

/// POST /api/hostels - creates the hostel and its default room components
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(body): ApiJson<CreateHostel>,
) -> ApiResult<Hostel> {
    let store = state.store.as_ref();
    let (name, organisation_id) = match (non_empty(body.name.as_deref()), parse_optional_id(body.organisation_id.as_deref())?) {
        (Some(name), Some(organisation_id)) => (name, organisation_id),
        _ => return Err(ApiError::validation("Name and organisation ID are required")),
    };

    Repository::<Organisation>::new(store).select_404(organisation_id).await?;
    let city_id = parse_optional_id(body.city_id.as_deref())?;
    if let Some(city_id) = city_id {
        require_city(store, city_id).await?;
    }

    let mut hostel = Hostel::new(name, organisation_id, principal.owner_id);
    hostel.description = non_empty(body.description.as_deref());
    hostel.city_id = city_id;

    let hostel = Repository::<Hostel>::new(store).insert(&hostel).await?;
    seed_or_rollback(store, HOSTELS, hostel.id, Container::hostel(hostel.id)).await?;

    info!("Created hostel {} in organisation {}", hostel.id, organisation_id);
    Ok(ApiResponse::created(hostel))
}

/// GET /api/hostels/:id - with organisation and city populated
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<HostelView> {
    let store = state.store.as_ref();
    let hostel = Repository::<Hostel>::new(store).select_404(parse_id(&id)?).await?;

    let organisations = Repository::<Organisation>::new(store);
    let organisation = organisations.select_id(hostel.organisation_id);
    let city = async {
        match hostel.city_id {
            Some(city_id) => Repository::<City>::new(store).select_id(city_id).await,
            None => Ok(None),
        }
    };
    let (organisation, city) = futures::try_join!(organisation, city)?;

    Ok(ApiResponse::success(HostelView {
        hostel,
        organisation,
        city,
    }))
}

/// PUT /api/hostels/:id - name, description and city; `null` clears optional fields
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Hostel> {
    let store = state.store.as_ref();
    let id = parse_id(&id)?;
    let Value::Object(body) = body else {
        return Err(ApiError::validation("Request body must be a JSON object"));
    };
    let mut changes = Map::new();

    match body.get("name") {
        None => {}
        Some(Value::String(raw)) if !raw.trim().is_empty() => {
            changes.insert("name".to_string(), json!(raw.trim()));
        }
        Some(_) => return Err(ApiError::validation("Name cannot be empty")),
    }
    match body.get("description") {
        None => {}
        Some(Value::Null) => {
            changes.insert("description".to_string(), Value::Null);
        }
        Some(Value::String(raw)) => {
            changes.insert("description".to_string(), json!(raw.trim()));
        }
        Some(_) => return Err(ApiError::validation("Description must be a string")),
    }
    match body.get("cityId") {
        None => {}
        Some(Value::Null) => {
            changes.insert("cityId".to_string(), Value::Null);
        }
        Some(Value::String(raw)) if raw.trim().is_empty() => {
            changes.insert("cityId".to_string(), Value::Null);
        }
        Some(Value::String(raw)) => {
            let city_id = parse_id(raw.trim())?;
            require_city(store, city_id).await?;
            changes.insert("cityId".to_string(), json!(city_id));
        }
        Some(_) => return Err(ApiError::validation("City ID must be a string")),
    }

    let hostel = Repository::<Hostel>::new(store)
        .update_id(id, Value::Object(changes))
        .await?
        .ok_or_else(|| ApiError::not_found("Hostel not found"))?;
    Ok(ApiResponse::success(hostel))
}

/// DELETE /api/hostels/:id - refused while blocks, room types or components remain
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    delete_guarded(state.store.as_ref(), EntityKind::Hostel, parse_id(&id)?).await?;
    Ok(ApiResponse::success(json!({})))
}

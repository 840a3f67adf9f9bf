//! Resolve the container (hostel or block) a component or room type request targets.

use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::database::models::{Block, Container, Hostel};
use crate::database::{DocumentStore, Repository};
use crate::error::ApiError;
use crate::filter::Filter;
use crate::middleware::{parse_id, parse_optional_id};

/// `?blockId=` or `?hostelId=`; a block wins when both are given
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerQuery {
    pub block_id: Option<String>,
    pub hostel_id: Option<String>,
}

pub async fn hostel_container(store: &dyn DocumentStore, raw_hostel_id: &str) -> Result<Container, ApiError> {
    let hostel = Repository::<Hostel>::new(store)
        .select_404(parse_id(raw_hostel_id)?)
        .await?;
    Ok(Container::hostel(hostel.id))
}

pub async fn block_container(store: &dyn DocumentStore, raw_block_id: &str) -> Result<Container, ApiError> {
    let block = Repository::<Block>::new(store)
        .select_404(parse_id(raw_block_id)?)
        .await?;
    Ok(Container::block(block.hostel_id, block.id))
}

pub async fn container_from_ids(
    store: &dyn DocumentStore,
    block_id: Option<&str>,
    hostel_id: Option<&str>,
) -> Result<Container, ApiError> {
    if let Some(block_id) = parse_optional_id(block_id)? {
        return block_container(store, &block_id.to_string()).await;
    }
    if let Some(hostel_id) = parse_optional_id(hostel_id)? {
        return hostel_container(store, &hostel_id.to_string()).await;
    }
    Err(ApiError::validation("Block ID or hostel ID is required"))
}

/// Newest first, the listing order used across the dashboard
pub fn newest_first(conditions: serde_json::Value) -> Result<Filter, ApiError> {
    Filter::from_where(conditions)
        .and_then(|filter| filter.order(json!("createdAt desc")))
        .map_err(|e| ApiError::validation(e.to_string()))
}

pub fn owned_by(owner_id: Uuid) -> serde_json::Value {
    json!({ "ownerId": owner_id })
}

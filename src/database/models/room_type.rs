use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ComponentSummary, Container};
use crate::database::indexes::ROOM_TYPES;
use crate::database::Model;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomTypeImage {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub is_cover: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomType {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub components: Vec<Uuid>,
    pub rent: f64,
    pub hostel_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<Uuid>,
    #[serde(default)]
    pub images: Vec<RoomTypeImage>,
    #[serde(default, with = "super::timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "super::timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RoomType {
    pub fn container(&self) -> Container {
        Container {
            hostel_id: self.hostel_id,
            block_id: self.block_id,
        }
    }
}

impl Model for RoomType {
    const COLLECTION: &'static str = ROOM_TYPES;
    const LABEL: &'static str = "Room type";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Room type with its components resolved to name and description
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomTypeView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub components: Vec<ComponentSummary>,
    pub rent: f64,
    pub hostel_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_id: Option<Uuid>,
    pub images: Vec<RoomTypeImage>,
    #[serde(with = "super::timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(with = "super::timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RoomTypeView {
    /// Components that no longer exist are dropped from the view
    pub fn new(room_type: RoomType, known: &[ComponentSummary]) -> Self {
        let components = room_type
            .components
            .iter()
            .filter_map(|id| known.iter().find(|c| c.id == *id).cloned())
            .collect();
        Self {
            id: room_type.id,
            name: room_type.name,
            description: room_type.description,
            components,
            rent: room_type.rent,
            hostel_id: room_type.hostel_id,
            block_id: room_type.block_id,
            images: room_type.images,
            created_at: room_type.created_at,
            updated_at: room_type.updated_at,
        }
    }
}

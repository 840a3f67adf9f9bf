use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::indexes::ROOM_COMPONENTS;
use crate::database::Model;

/// The hostel or block that owns room components and room types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Container {
    pub hostel_id: Uuid,
    pub block_id: Option<Uuid>,
}

impl Container {
    pub fn hostel(hostel_id: Uuid) -> Self {
        Self {
            hostel_id,
            block_id: None,
        }
    }

    pub fn block(hostel_id: Uuid, block_id: Uuid) -> Self {
        Self {
            hostel_id,
            block_id: Some(block_id),
        }
    }

    /// Where clause selecting items owned directly by this container.
    /// Hostel-level items are the ones without a `blockId`.
    pub fn where_clause(&self) -> Value {
        match self.block_id {
            Some(block_id) => json!({ "hostelId": self.hostel_id, "blockId": block_id }),
            None => json!({ "hostelId": self.hostel_id, "blockId": { "$exists": false } }),
        }
    }

    pub fn owns(&self, hostel_id: Uuid, block_id: Option<Uuid>) -> bool {
        self.hostel_id == hostel_id && self.block_id == block_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomComponent {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub hostel_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<Uuid>,
    #[serde(default, with = "super::timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "super::timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RoomComponent {
    pub fn new(name: impl Into<String>, description: impl Into<String>, container: Container) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            hostel_id: container.hostel_id,
            block_id: container.block_id,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn container(&self) -> Container {
        Container {
            hostel_id: self.hostel_id,
            block_id: self.block_id,
        }
    }
}

impl Model for RoomComponent {
    const COLLECTION: &'static str = ROOM_COMPONENTS;
    const LABEL: &'static str = "Component";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Component as it appears inside a room type listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

impl From<RoomComponent> for ComponentSummary {
    fn from(component: RoomComponent) -> Self {
        Self {
            id: component.id,
            name: component.name,
            description: component.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;
    use crate::database::repository::to_document;

    #[test]
    fn hostel_container_excludes_block_items() {
        let hostel_id = Uuid::new_v4();
        let block_id = Uuid::new_v4();
        let hostel_level = RoomComponent::new("Bed", "Single bed", Container::hostel(hostel_id));
        let block_level = RoomComponent::new("Bed", "Single bed", Container::block(hostel_id, block_id));

        let filter = Filter::from_where(Container::hostel(hostel_id).where_clause()).unwrap();
        assert!(filter.matches(&to_document(&hostel_level).unwrap()));
        assert!(!filter.matches(&to_document(&block_level).unwrap()));

        let filter = Filter::from_where(Container::block(hostel_id, block_id).where_clause()).unwrap();
        assert!(filter.matches(&to_document(&block_level).unwrap()));
    }
}

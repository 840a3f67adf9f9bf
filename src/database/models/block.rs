use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Hostel;
use crate::database::indexes::BLOCKS;
use crate::database::Model;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub hostel_id: Uuid,
    #[serde(default, with = "super::timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "super::timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Block {
    pub fn new(name: impl Into<String>, hostel_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            hostel_id,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Model for Block {
    const COLLECTION: &'static str = BLOCKS;
    const LABEL: &'static str = "Block";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockView {
    #[serde(flatten)]
    pub block: Block,
    pub hostel: Option<Hostel>,
}

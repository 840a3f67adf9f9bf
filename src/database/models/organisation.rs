use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::indexes::ORGANISATIONS;
use crate::database::Model;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organisation {
    pub id: Uuid,
    pub name: String,
    pub owner_name: String,
    pub owner_id: Uuid,
    #[serde(default)]
    pub users: Vec<Uuid>,
    pub join_code: String,
    #[serde(default)]
    pub is_online_presence_enabled: bool,
    #[serde(default, with = "super::timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "super::timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Organisation {
    pub fn new(name: impl Into<String>, owner_name: impl Into<String>, owner_id: Uuid, join_code: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            owner_name: owner_name.into(),
            owner_id,
            users: vec![],
            join_code,
            is_online_presence_enabled: false,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Model for Organisation {
    const COLLECTION: &'static str = ORGANISATIONS;
    const LABEL: &'static str = "Organisation";

    fn id(&self) -> Uuid {
        self.id
    }
}

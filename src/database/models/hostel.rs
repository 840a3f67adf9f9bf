use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{City, Organisation};
use crate::database::indexes::HOSTELS;
use crate::database::Model;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hostel {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub organisation_id: Uuid,
    pub owner_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_id: Option<Uuid>,
    #[serde(default, with = "super::timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "super::timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Hostel {
    pub fn new(name: impl Into<String>, organisation_id: Uuid, owner_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            organisation_id,
            owner_id,
            city_id: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Model for Hostel {
    const COLLECTION: &'static str = HOSTELS;
    const LABEL: &'static str = "Hostel";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Hostel with its organisation and city resolved
#[derive(Debug, Clone, Serialize)]
pub struct HostelView {
    #[serde(flatten)]
    pub hostel: Hostel,
    pub organisation: Option<Organisation>,
    pub city: Option<City>,
}

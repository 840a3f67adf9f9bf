use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::indexes::CITIES;
use crate::database::Model;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(default, with = "super::timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "super::timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl City {
    pub fn new(name: impl Into<String>, slug: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            slug: slug.into(),
            state: state.into(),
            intro_content: None,
            meta_title: None,
            meta_description: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Model for City {
    const COLLECTION: &'static str = CITIES;
    const LABEL: &'static str = "City";

    fn id(&self) -> Uuid {
        self.id
    }
}

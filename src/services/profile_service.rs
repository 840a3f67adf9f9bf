use serde_json::{json, Map, Value};
use tracing::info;
use uuid::Uuid;

use super::slug::{generate_unique_slug, normalize_slug, slug_taken};
use crate::database::indexes::HOSTEL_PROFILES;
use crate::database::models::{HostelProfileFields, ProfileKind};
use crate::database::repository::id_filter;
use crate::database::{DatabaseError, Document, DocumentStore};
use crate::error::ApiError;
use crate::filter::Filter;
use crate::media::MediaStore;

const INVALID_SLUG: &str = "Slug can only contain lowercase letters, numbers, and hyphens";
const SLUG_TAKEN: &str = "This slug is already taken";
const FALLBACK_SLUG_NAME: &str = "hostel";

/// One profile document per organisation, hostel or block
pub struct ProfileService<'a> {
    store: &'a dyn DocumentStore,
    kind: ProfileKind,
}

impl<'a> ProfileService<'a> {
    pub fn new(store: &'a dyn DocumentStore, kind: ProfileKind) -> Self {
        Self { store, kind }
    }

    fn parent_filter(&self, parent_id: Uuid) -> Result<Filter, DatabaseError> {
        Ok(Filter::from_where(json!({ self.kind.parent_key(): parent_id }))?)
    }

    async fn find(&self, parent_id: Uuid) -> Result<Option<Document>, ApiError> {
        Ok(self
            .store
            .find_one(self.kind.collection(), &self.parent_filter(parent_id)?)
            .await?)
    }

    async fn ensure_parent(&self, parent_id: Uuid) -> Result<(), ApiError> {
        let count = self
            .store
            .count(self.kind.parent_collection(), &id_filter(parent_id)?)
            .await?;
        if count == 0 {
            return Err(ApiError::not_found(format!("{} not found", self.kind.parent_label())));
        }
        Ok(())
    }

    /// Drop identity fields a caller may not set
    fn content(&self, body: Value) -> Result<Document, ApiError> {
        let mut content = match body {
            Value::Object(map) => map,
            _ => return Err(ApiError::validation("Profile body must be a JSON object")),
        };
        for key in ["id", "createdAt", "updatedAt", self.kind.parent_key()] {
            content.remove(key);
        }
        Ok(content)
    }

    pub async fn get(&self, parent_id: Uuid) -> Result<Document, ApiError> {
        self.find(parent_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Profile not found"))
    }

    pub async fn create(&self, parent_id: Uuid, body: Value) -> Result<Document, ApiError> {
        self.ensure_parent(parent_id).await?;
        let mut content = self.content(body)?;

        if self.find(parent_id).await?.is_some() {
            return Err(ApiError::conflict("Profile already exists. Use PUT to update."));
        }

        if self.kind == ProfileKind::Hostel {
            let slug = match take_slug(&mut content)? {
                Some(slug) => {
                    self.ensure_slug_free(&slug, parent_id).await?;
                    slug
                }
                None => self.generated_slug(&content, parent_id).await?,
            };
            content.insert("slug".to_string(), Value::String(slug));
        }

        let created = self.insert(parent_id, content).await?;
        info!("Created {} profile for {}", self.kind.parent_label(), parent_id);
        Ok(created)
    }

    /// Create when absent, otherwise merge top-level fields. Never conflicts on the parent key.
    pub async fn upsert(&self, parent_id: Uuid, body: Value) -> Result<Document, ApiError> {
        self.ensure_parent(parent_id).await?;
        let mut content = self.content(body)?;
        let existing = self.find(parent_id).await?;

        if self.kind == ProfileKind::Hostel {
            match take_slug(&mut content)? {
                Some(slug) => {
                    self.ensure_slug_free(&slug, parent_id).await?;
                    content.insert("slug".to_string(), Value::String(slug));
                }
                None if existing.is_none() => {
                    let slug = self.generated_slug(&content, parent_id).await?;
                    content.insert("slug".to_string(), Value::String(slug));
                }
                None => {}
            }
        }

        if existing.is_none() {
            match self.insert(parent_id, content.clone()).await {
                Ok(created) => return Ok(created),
                // Lost a race with another upsert for the same parent
                Err(DatabaseError::Duplicate { ref field, .. }) if field == self.kind.parent_key() => {}
                Err(other) => return Err(other.into()),
            }
        }

        self.store
            .update_one(self.kind.collection(), &self.parent_filter(parent_id)?, content)
            .await?
            .ok_or_else(|| ApiError::not_found("Profile not found"))
    }

    pub async fn delete(&self, parent_id: Uuid) -> Result<Document, ApiError> {
        let deleted = self
            .store
            .delete_one(self.kind.collection(), &self.parent_filter(parent_id)?)
            .await?
            .ok_or_else(|| ApiError::not_found("Profile not found"))?;
        info!("Deleted {} profile for {}", self.kind.parent_label(), parent_id);
        Ok(deleted)
    }

    /// Remove the hostel banner from the image host, then from the profile
    pub async fn delete_banner(&self, parent_id: Uuid, media: &dyn MediaStore) -> Result<Document, ApiError> {
        let profile = self.get(parent_id).await?;
        let public_id = HostelProfileFields(&profile)
            .banner_public_id()
            .ok_or_else(|| ApiError::validation("No banner to delete"))?
            .to_string();

        media.delete(&public_id).await?;

        let mut media_field = match profile.get("media") {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };
        media_field.remove("banner");
        let mut changes = Map::new();
        changes.insert("media".to_string(), Value::Object(media_field));

        self.store
            .update_one(self.kind.collection(), &self.parent_filter(parent_id)?, changes)
            .await?
            .ok_or_else(|| ApiError::not_found("Profile not found"))
    }

    async fn insert(&self, parent_id: Uuid, mut content: Document) -> Result<Document, DatabaseError> {
        content.insert("id".to_string(), json!(Uuid::new_v4()));
        content.insert(self.kind.parent_key().to_string(), json!(parent_id));
        self.store.insert(self.kind.collection(), content).await
    }

    async fn ensure_slug_free(&self, slug: &str, hostel_id: Uuid) -> Result<(), ApiError> {
        if slug_taken(self.store, HOSTEL_PROFILES, slug, Some(("hostelId", json!(hostel_id)))).await? {
            return Err(ApiError::conflict(SLUG_TAKEN));
        }
        Ok(())
    }

    async fn generated_slug(&self, content: &Document, hostel_id: Uuid) -> Result<String, ApiError> {
        let name = HostelProfileFields(content).display_name().unwrap_or(FALLBACK_SLUG_NAME);

        let slug = generate_unique_slug(self.store, HOSTEL_PROFILES, name, Some(("hostelId", json!(hostel_id)))).await?;
        if !slug.is_empty() {
            return Ok(slug);
        }
        // Names made only of punctuation
        Ok(generate_unique_slug(self.store, HOSTEL_PROFILES, FALLBACK_SLUG_NAME, Some(("hostelId", json!(hostel_id)))).await?)
    }
}

/// Pull a caller-supplied slug out of the body. Empty strings count as absent.
fn take_slug(content: &mut Document) -> Result<Option<String>, ApiError> {
    match content.remove("slug") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) if raw.trim().is_empty() => Ok(None),
        Some(Value::String(raw)) => normalize_slug(&raw)
            .map(Some)
            .ok_or_else(|| ApiError::validation(INVALID_SLUG)),
        Some(_) => Err(ApiError::validation(INVALID_SLUG)),
    }
}

/// Format check plus availability, ignoring `exclude_hostel_id`'s own profile
pub async fn check_slug_available(
    store: &dyn DocumentStore,
    slug: &str,
    exclude_hostel_id: Option<Uuid>,
) -> Result<bool, ApiError> {
    if !super::slug::is_valid_slug(slug) {
        return Err(ApiError::validation(INVALID_SLUG));
    }
    let exclude = exclude_hostel_id.map(|id| ("hostelId", json!(id)));
    Ok(!slug_taken(store, HOSTEL_PROFILES, slug, exclude).await?)
}

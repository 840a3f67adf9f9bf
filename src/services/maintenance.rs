//! One-off data repairs run from `hostelctl migrate`.

use serde_json::{json, Map, Value};
use std::collections::HashSet;
use tracing::info;
use uuid::Uuid;

use super::slug::{generate_slug, next_free_slug};
use crate::database::indexes::{CITIES, HOSTELS, HOSTEL_PROFILES};
use crate::database::models::HostelProfileFields;
use crate::database::repository::id_filter;
use crate::database::{DatabaseError, Document, DocumentStore};
use crate::filter::Filter;

const FALLBACK_SLUG_NAME: &str = "hostel";

fn doc_id(doc: &Document) -> Option<Uuid> {
    doc.get("id").and_then(Value::as_str).and_then(|s| Uuid::parse_str(s).ok())
}

fn has_text(doc: &Document, key: &str) -> bool {
    matches!(doc.get(key), Some(Value::String(s)) if !s.trim().is_empty())
}

/// Give every hostel profile without a slug a unique one.
/// Returns `(profile id, slug)` for each profile changed.
pub async fn assign_missing_hostel_slugs(store: &dyn DocumentStore) -> Result<Vec<(Uuid, String)>, DatabaseError> {
    let profiles = store.find(HOSTEL_PROFILES, &Filter::new()).await?;

    let mut used: HashSet<String> = profiles
        .iter()
        .filter_map(|p| p.get("slug").and_then(Value::as_str))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let mut assigned = Vec::new();
    for profile in profiles.iter().filter(|p| !has_text(p, "slug")) {
        let Some(id) = doc_id(profile) else { continue };
        let mut base = generate_slug(HostelProfileFields(profile).display_name().unwrap_or(FALLBACK_SLUG_NAME));
        if base.is_empty() {
            base = FALLBACK_SLUG_NAME.to_string();
        }
        let slug = next_free_slug(&base, &used);

        let mut changes = Map::new();
        changes.insert("slug".to_string(), json!(slug));
        store.update_one(HOSTEL_PROFILES, &id_filter(id)?, changes).await?;

        info!("Assigned slug {} to hostel profile {}", slug, id);
        used.insert(slug.clone());
        assigned.push((id, slug));
    }
    Ok(assigned)
}

/// Point every hostel without a city at `city_id`. Fails with `NotFound`
/// when the city does not exist.
pub async fn assign_city_to_hostels(store: &dyn DocumentStore, city_id: Uuid) -> Result<u64, DatabaseError> {
    if store.count(CITIES, &id_filter(city_id)?).await? == 0 {
        return Err(DatabaseError::NotFound("City not found".to_string()));
    }

    let without_city = Filter::from_where(json!({ "cityId": { "$exists": false } }))?;
    let hostels = store.find(HOSTELS, &without_city).await?;

    let mut updated = 0;
    for hostel in &hostels {
        let Some(id) = doc_id(hostel) else { continue };
        let mut changes = Map::new();
        changes.insert("cityId".to_string(), json!(city_id));
        if store.update_one(HOSTELS, &id_filter(id)?, changes).await?.is_some() {
            updated += 1;
        }
    }
    info!("Assigned city {} to {} hostels", city_id, updated);
    Ok(updated)
}

/// Copy each hostel's city into its profile's `basicInfo.cityId` where missing
pub async fn copy_hostel_city_to_profiles(store: &dyn DocumentStore) -> Result<u64, DatabaseError> {
    let profiles = store.find(HOSTEL_PROFILES, &Filter::new()).await?;

    let mut updated = 0;
    for profile in &profiles {
        let mut basic_info = match profile.get("basicInfo") {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };
        if has_text(&basic_info, "cityId") {
            continue;
        }
        let (Some(profile_id), Some(hostel_id)) = (
            doc_id(profile),
            profile.get("hostelId").and_then(Value::as_str).and_then(|s| Uuid::parse_str(s).ok()),
        ) else {
            continue;
        };

        let city_id = store
            .find_one(HOSTELS, &id_filter(hostel_id)?)
            .await?
            .and_then(|hostel| hostel.get("cityId").cloned())
            .filter(|city| !city.is_null());
        let Some(city_id) = city_id else { continue };

        basic_info.insert("cityId".to_string(), city_id);
        let mut changes = Map::new();
        changes.insert("basicInfo".to_string(), Value::Object(basic_info));
        store.update_one(HOSTEL_PROFILES, &id_filter(profile_id)?, changes).await?;
        updated += 1;
    }
    info!("Copied hostel city into {} profiles", updated);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryDocumentStore;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn slugs_skip_taken_names() {
        let store = MemoryDocumentStore::new();
        store
            .insert(HOSTEL_PROFILES, doc(json!({ "id": Uuid::new_v4(), "hostelId": Uuid::new_v4(), "slug": "sunrise" })))
            .await
            .unwrap();
        for _ in 0..2 {
            store
                .insert(
                    HOSTEL_PROFILES,
                    doc(json!({ "id": Uuid::new_v4(), "hostelId": Uuid::new_v4(), "basicInfo": { "name": "Sunrise" } })),
                )
                .await
                .unwrap();
        }
        store
            .insert(HOSTEL_PROFILES, doc(json!({ "id": Uuid::new_v4(), "hostelId": Uuid::new_v4() })))
            .await
            .unwrap();

        let mut slugs: Vec<String> = assign_missing_hostel_slugs(&store)
            .await
            .unwrap()
            .into_iter()
            .map(|(_, slug)| slug)
            .collect();
        slugs.sort();
        assert_eq!(slugs, vec!["hostel", "sunrise-1", "sunrise-2"]);

        assert!(assign_missing_hostel_slugs(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn city_assignment_requires_city() {
        let store = MemoryDocumentStore::new();
        let missing = assign_city_to_hostels(&store, Uuid::new_v4()).await;
        assert!(matches!(missing, Err(DatabaseError::NotFound(_))));

        let city = Uuid::new_v4();
        let other = Uuid::new_v4();
        store.insert(CITIES, doc(json!({ "id": city, "slug": "pune" }))).await.unwrap();
        store.insert(HOSTELS, doc(json!({ "id": Uuid::new_v4(), "name": "A" }))).await.unwrap();
        store
            .insert(HOSTELS, doc(json!({ "id": Uuid::new_v4(), "name": "B", "cityId": other })))
            .await
            .unwrap();

        assert_eq!(assign_city_to_hostels(&store, city).await.unwrap(), 1);
        assert_eq!(
            store
                .count(HOSTELS, &Filter::from_where(json!({ "cityId": other })).unwrap())
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn profile_city_copied_from_hostel() {
        let store = MemoryDocumentStore::new();
        let city = Uuid::new_v4();
        let hostel = Uuid::new_v4();
        store
            .insert(HOSTELS, doc(json!({ "id": hostel, "name": "A", "cityId": city })))
            .await
            .unwrap();
        store
            .insert(
                HOSTEL_PROFILES,
                doc(json!({ "id": Uuid::new_v4(), "hostelId": hostel, "basicInfo": { "name": "A" } })),
            )
            .await
            .unwrap();

        assert_eq!(copy_hostel_city_to_profiles(&store).await.unwrap(), 1);
        let profile = store
            .find_one(HOSTEL_PROFILES, &Filter::from_where(json!({ "hostelId": hostel })).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile["basicInfo"]["cityId"], json!(city));
        assert_eq!(profile["basicInfo"]["name"], json!("A"));

        assert_eq!(copy_hostel_city_to_profiles(&store).await.unwrap(), 0);
    }
}

use tracing::{error, info};
use uuid::Uuid;

use crate::database::indexes::ROOM_COMPONENTS;
use crate::database::models::{Container, RoomComponent};
use crate::database::repository::id_filter;
use crate::database::{DatabaseError, DocumentStore, Repository};
use crate::error::ApiError;
use crate::filter::Filter;

/// Components every new hostel and block starts with
pub const DEFAULT_COMPONENTS: [(&str, &str); 14] = [
    ("Bed", "Single bed with frame"),
    ("Study Table", "Wooden study table for one"),
    ("Chair", "Study chair"),
    ("Almirah/Wardrobe", "Lockable storage for clothes and belongings"),
    ("Ceiling Fan", "Ceiling mounted fan"),
    ("Tube Light", "LED tube light"),
    ("Dustbin", "Room dustbin"),
    ("Mirror", "Wall mounted mirror"),
    ("Window Curtains", "Curtains for room windows"),
    ("Mattress", "Single bed mattress"),
    ("Pillow", "Pillow with cover"),
    ("Blanket", "Warm blanket"),
    ("Study Lamp", "Table lamp for studying"),
    ("Bookshelf", "Shelf for books and stationery"),
];

pub fn default_components(container: Container) -> Vec<RoomComponent> {
    DEFAULT_COMPONENTS
        .iter()
        .map(|(name, description)| RoomComponent::new(*name, *description, container))
        .collect()
}

/// Insert the default catalog in one batch
pub async fn seed_components(
    store: &dyn DocumentStore,
    container: Container,
) -> Result<Vec<RoomComponent>, DatabaseError> {
    Repository::<RoomComponent>::new(store)
        .insert_many(&default_components(container))
        .await
}

/// Seed a freshly created parent. On failure the parent and any partial seed
/// are removed so no parent exists without its components.
pub async fn seed_or_rollback(
    store: &dyn DocumentStore,
    parent_collection: &str,
    parent_id: Uuid,
    container: Container,
) -> Result<Vec<RoomComponent>, ApiError> {
    match seed_components(store, container).await {
        Ok(seeded) => {
            info!("Seeded {} default components for {} {}", seeded.len(), parent_collection, parent_id);
            Ok(seeded)
        }
        Err(seed_err) => {
            error!("Seeding components for {} {} failed: {}", parent_collection, parent_id, seed_err);

            let cleanup = async {
                let partial = Filter::from_where(container.where_clause())?;
                store.delete_many(ROOM_COMPONENTS, &partial).await?;
                store.delete_one(parent_collection, &id_filter(parent_id)?).await?;
                Ok::<_, DatabaseError>(())
            };
            if let Err(cleanup_err) = cleanup.await {
                error!("Rollback of {} {} failed: {}", parent_collection, parent_id, cleanup_err);
            }

            Err(ApiError::internal(format!(
                "Failed to seed default room components: {}",
                seed_err
            )))
        }
    }
}

/// Seed only when the container has no components yet
pub async fn seed_if_empty(
    store: &dyn DocumentStore,
    container: Container,
) -> Result<Option<Vec<RoomComponent>>, DatabaseError> {
    let existing = store
        .count(ROOM_COMPONENTS, &Filter::from_where(container.where_clause())?)
        .await?;
    if existing > 0 {
        return Ok(None);
    }
    seed_components(store, container).await.map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::indexes::HOSTELS;
    use serde_json::json;
    use crate::database::MemoryDocumentStore;

    #[tokio::test]
    async fn seeds_fourteen_components_once() {
        let store = MemoryDocumentStore::new();
        let container = Container::hostel(Uuid::new_v4());

        let seeded = seed_if_empty(&store, container).await.unwrap().unwrap();
        assert_eq!(seeded.len(), 14);
        assert!(seeded.iter().all(|c| c.hostel_id == container.hostel_id && c.block_id.is_none()));

        assert!(seed_if_empty(&store, container).await.unwrap().is_none());
        let filter = Filter::from_where(container.where_clause()).unwrap();
        assert_eq!(store.count(ROOM_COMPONENTS, &filter).await.unwrap(), 14);
    }

    #[tokio::test]
    async fn rollback_keeps_parent_when_seed_succeeds() {
        let store = MemoryDocumentStore::new();
        let hostel_id = Uuid::new_v4();
        store
            .insert(HOSTELS, json!({ "id": hostel_id }).as_object().cloned().unwrap())
            .await
            .unwrap();

        let seeded = seed_or_rollback(&store, HOSTELS, hostel_id, Container::hostel(hostel_id))
            .await
            .unwrap();
        assert_eq!(seeded.len(), 14);
        assert_eq!(store.count(HOSTELS, &Filter::new()).await.unwrap(), 1);
    }
}

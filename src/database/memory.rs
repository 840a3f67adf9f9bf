use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::indexes::unique_fields;
use super::store::{document_id, merge_changes, stamp_created, DatabaseError, Document, DocumentStore};
use crate::filter::filter_where::json_eq;
use crate::filter::Filter;

/// In-process store with the same unique-key behaviour as the Postgres backend.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_unique(collection: &str, existing: &[Document], candidate: &Document) -> Result<(), DatabaseError> {
        let candidate_id = candidate.get("id");
        for field in unique_fields(collection) {
            let value = match candidate.get(field) {
                None | Some(Value::Null) => continue,
                Some(v) => v,
            };
            let clash = existing
                .iter()
                .filter(|doc| doc.get("id") != candidate_id)
                .any(|doc| doc.get(field).map(|other| json_eq(other, value)).unwrap_or(false));
            if clash {
                return Err(DatabaseError::Duplicate {
                    collection: collection.to_string(),
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, collection: &str, doc: Document) -> Result<Document, DatabaseError> {
        let mut inserted = self.insert_many(collection, vec![doc]).await?;
        inserted
            .pop()
            .ok_or_else(|| DatabaseError::InvalidDocument("insert produced no document".to_string()))
    }

    async fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<Vec<Document>, DatabaseError> {
        let mut collections = self.collections.write().await;
        let existing = collections.entry(collection.to_string()).or_default();

        // Validate the whole batch before writing anything
        let mut staged: Vec<Document> = Vec::with_capacity(docs.len());
        for mut doc in docs {
            let id = document_id(&doc)?;
            if existing.iter().chain(staged.iter()).any(|d| d.get("id").and_then(Value::as_str) == Some(id.as_str())) {
                return Err(DatabaseError::Duplicate {
                    collection: collection.to_string(),
                    field: "id".to_string(),
                });
            }
            stamp_created(&mut doc);
            Self::check_unique(collection, existing, &doc)?;
            Self::check_unique(collection, &staged, &doc)?;
            staged.push(doc);
        }

        existing.extend(staged.iter().cloned());
        Ok(staged)
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, DatabaseError> {
        let collections = self.collections.read().await;
        let mut found: Vec<Document> = collections
            .get(collection)
            .map(|docs| docs.iter().filter(|doc| filter.matches(doc)).cloned().collect())
            .unwrap_or_default();
        filter.sort(&mut found);
        if let Some(limit) = filter.limit_value() {
            found.truncate(limit as usize);
        }
        Ok(found)
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, DatabaseError> {
        Ok(self.find(collection, filter).await?.into_iter().next())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|doc| filter.matches(doc)).count() as u64)
            .unwrap_or(0))
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        changes: Document,
    ) -> Result<Option<Document>, DatabaseError> {
        let mut collections = self.collections.write().await;
        let docs = match collections.get_mut(collection) {
            Some(docs) => docs,
            None => return Ok(None),
        };
        let position = match docs.iter().position(|doc| filter.matches(doc)) {
            Some(p) => p,
            None => return Ok(None),
        };

        let mut updated = docs[position].clone();
        merge_changes(&mut updated, changes);
        Self::check_unique(collection, docs, &updated)?;
        docs[position] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, DatabaseError> {
        let mut collections = self.collections.write().await;
        let docs = match collections.get_mut(collection) {
            Some(docs) => docs,
            None => return Ok(None),
        };
        Ok(docs
            .iter()
            .position(|doc| filter.matches(doc))
            .map(|position| docs.remove(position)))
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError> {
        let mut collections = self.collections.write().await;
        let docs = match collections.get_mut(collection) {
            Some(docs) => docs,
            None => return Ok(0),
        };
        let before = docs.len();
        docs.retain(|doc| !filter.matches(doc));
        Ok((before - docs.len()) as u64)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: Value) -> Document {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn enforces_unique_indexes_on_insert_and_update() {
        let store = MemoryDocumentStore::new();
        store.insert("cities", doc(json!({ "id": "1", "slug": "pune" }))).await.unwrap();
        store.insert("cities", doc(json!({ "id": "2", "slug": "delhi" }))).await.unwrap();

        let err = store.insert("cities", doc(json!({ "id": "3", "slug": "pune" }))).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Duplicate { ref field, .. } if field == "slug"));

        let by_id = Filter::from_where(json!({ "id": "2" })).unwrap();
        let err = store
            .update_one("cities", &by_id, doc(json!({ "slug": "pune" })))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Duplicate { .. }));

        // Re-saving a document's own value is not a clash
        let by_id = Filter::from_where(json!({ "id": "1" })).unwrap();
        assert!(store.update_one("cities", &by_id, doc(json!({ "slug": "pune" }))).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn insert_many_is_all_or_nothing() {
        let store = MemoryDocumentStore::new();
        let batch = vec![
            doc(json!({ "id": "a", "joinCode": "ABC123" })),
            doc(json!({ "id": "b", "joinCode": "ABC123" })),
        ];
        assert!(store.insert_many("organisations", batch).await.is_err());
        assert_eq!(store.count("organisations", &Filter::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_many_removes_matching_documents() {
        let store = MemoryDocumentStore::new();
        for (id, hostel) in [("1", "h1"), ("2", "h1"), ("3", "h2")] {
            store
                .insert("room_components", doc(json!({ "id": id, "hostelId": hostel })))
                .await
                .unwrap();
        }
        let filter = Filter::from_where(json!({ "hostelId": "h1" })).unwrap();
        assert_eq!(store.delete_many("room_components", &filter).await.unwrap(), 2);
        assert_eq!(store.count("room_components", &Filter::new()).await.unwrap(), 1);
    }
}

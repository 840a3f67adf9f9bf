use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use std::marker::PhantomData;
use uuid::Uuid;

use super::store::{DatabaseError, Document, DocumentStore};
use crate::filter::Filter;

/// A typed document living in one collection
pub trait Model: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;
    /// Human name used in "<Label> not found" messages
    const LABEL: &'static str;

    fn id(&self) -> Uuid;
}

pub fn to_document<T: Serialize>(value: &T) -> Result<Document, DatabaseError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(DatabaseError::InvalidDocument(format!("expected an object, got {}", other))),
    }
}

pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, DatabaseError> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

pub fn id_filter(id: Uuid) -> Result<Filter, DatabaseError> {
    Ok(Filter::from_where(json!({ "id": id }))?)
}

pub struct Repository<'a, T> {
    store: &'a dyn DocumentStore,
    _phantom: PhantomData<T>,
}

impl<'a, T: Model> Repository<'a, T> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    pub async fn insert(&self, model: &T) -> Result<T, DatabaseError> {
        let doc = self.store.insert(T::COLLECTION, to_document(model)?).await?;
        from_document(doc)
    }

    /// All-or-nothing batch insert
    pub async fn insert_many(&self, models: &[T]) -> Result<Vec<T>, DatabaseError> {
        let docs = models.iter().map(to_document).collect::<Result<Vec<_>, _>>()?;
        self.store
            .insert_many(T::COLLECTION, docs)
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }

    pub async fn select_any(&self, filter: Filter) -> Result<Vec<T>, DatabaseError> {
        self.store
            .find(T::COLLECTION, &filter)
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }

    pub async fn select_one(&self, filter: Filter) -> Result<Option<T>, DatabaseError> {
        self.store
            .find_one(T::COLLECTION, &filter)
            .await?
            .map(from_document)
            .transpose()
    }

    pub async fn select_id(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        self.select_one(id_filter(id)?).await
    }

    pub async fn select_404(&self, id: Uuid) -> Result<T, DatabaseError> {
        self.select_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} not found", T::LABEL)))
    }

    pub async fn select_ids(&self, ids: &[Uuid]) -> Result<Vec<T>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        self.select_any(Filter::from_where(json!({ "id": { "$in": ids } }))?)
            .await
    }

    pub async fn count(&self, filter: Filter) -> Result<u64, DatabaseError> {
        self.store.count(T::COLLECTION, &filter).await
    }

    /// Merge `changes` into the document; `null` values remove fields
    pub async fn update_one(&self, filter: Filter, changes: Value) -> Result<Option<T>, DatabaseError> {
        let changes = match changes {
            Value::Object(map) => map,
            other => return Err(DatabaseError::InvalidDocument(format!("expected an object, got {}", other))),
        };
        self.store
            .update_one(T::COLLECTION, &filter, changes)
            .await?
            .map(from_document)
            .transpose()
    }

    pub async fn update_id(&self, id: Uuid, changes: Value) -> Result<Option<T>, DatabaseError> {
        self.update_one(id_filter(id)?, changes).await
    }

    pub async fn delete_one(&self, filter: Filter) -> Result<Option<T>, DatabaseError> {
        self.store
            .delete_one(T::COLLECTION, &filter)
            .await?
            .map(from_document)
            .transpose()
    }

    pub async fn delete_id(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        self.delete_one(id_filter(id)?).await
    }

    pub async fn delete_any(&self, filter: Filter) -> Result<u64, DatabaseError> {
        self.store.delete_many(T::COLLECTION, &filter).await
    }
}

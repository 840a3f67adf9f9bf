use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::filter::{Filter, FilterError};

/// A stored document. Every document carries a string `id`.
pub type Document = Map<String, Value>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("{0}")]
    NotFound(String),

    #[error("Duplicate value for unique key {collection}.{field}")]
    Duplicate { collection: String, field: String },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Collection-oriented document persistence.
///
/// Operations are individually atomic; nothing spans calls, so callers that
/// check-then-write must tolerate interleaving with other requests.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, collection: &str, doc: Document) -> Result<Document, DatabaseError>;

    /// Inserts all documents or none of them
    async fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<Vec<Document>, DatabaseError>;

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, DatabaseError>;

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, DatabaseError>;

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError>;

    /// Merges `changes` into the first matching document. A `null` value removes the field.
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        changes: Document,
    ) -> Result<Option<Document>, DatabaseError>;

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, DatabaseError>;

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

pub fn now_timestamp() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
}

pub(crate) fn document_id(doc: &Document) -> Result<String, DatabaseError> {
    match doc.get("id") {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        _ => Err(DatabaseError::InvalidDocument("document is missing a string id".to_string())),
    }
}

pub(crate) fn stamp_created(doc: &mut Document) {
    let now = now_timestamp();
    doc.entry("createdAt").or_insert_with(|| now.clone());
    doc.entry("updatedAt").or_insert(now);
}

/// Apply a field merge; `id` and `createdAt` are immutable.
pub(crate) fn merge_changes(doc: &mut Document, changes: Document) {
    for (key, value) in changes {
        if key == "id" || key == "createdAt" {
            continue;
        }
        if value.is_null() {
            doc.remove(&key);
        } else {
            doc.insert(key, value);
        }
    }
    doc.insert("updatedAt".to_string(), now_timestamp());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_removes_nulls_and_keeps_identity() {
        let mut doc = json!({ "id": "a", "createdAt": "t0", "name": "x", "media": { "banner": 1 } })
            .as_object()
            .cloned()
            .unwrap();
        let changes = json!({ "id": "b", "name": "y", "media": null }).as_object().cloned().unwrap();
        merge_changes(&mut doc, changes);
        assert_eq!(doc["id"], "a");
        assert_eq!(doc["createdAt"], "t0");
        assert_eq!(doc["name"], "y");
        assert!(!doc.contains_key("media"));
        assert!(doc.contains_key("updatedAt"));
    }
}

use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, info};

use super::indexes::{index_by_name, UNIQUE_INDEXES};
use super::store::{document_id, merge_changes, stamp_created, DatabaseError, Document, DocumentStore};
use crate::filter::Filter;

const PRIMARY_KEY: &str = "documents_pkey";
const UNIQUE_VIOLATION: &str = "23505";

/// Document store over a single JSONB table keyed by (collection, id).
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the documents table and the per-collection unique indexes
    pub async fn bootstrap(&self) -> Result<(), DatabaseError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                body JSONB NOT NULL,
                CONSTRAINT documents_pkey PRIMARY KEY (collection, id)
            )",
        )
        .execute(&self.pool)
        .await?;

        for statement in bootstrap_index_sql() {
            debug!("{}", statement);
            sqlx::query(&statement).execute(&self.pool).await?;
        }

        info!("Document store schema ready ({} unique indexes)", UNIQUE_INDEXES.len());
        Ok(())
    }

    fn where_sql(filter: &Filter) -> (String, Vec<Value>) {
        // $1 is always the collection name
        let sql = filter.to_where_sql(1);
        (sql.query, sql.params)
    }
}

pub(crate) fn bootstrap_index_sql() -> Vec<String> {
    UNIQUE_INDEXES
        .iter()
        .map(|index| {
            format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {name} ON documents ((body->>'{field}')) \
                 WHERE collection = '{collection}' AND body ? '{field}' AND body->'{field}' <> 'null'::jsonb",
                name = index.name(),
                field = index.field,
                collection = index.collection,
            )
        })
        .collect()
}

/// Map unique violations onto `DatabaseError::Duplicate`
fn map_write_error(collection: &str, err: sqlx::Error) -> DatabaseError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let field = match db_err.constraint() {
                Some(PRIMARY_KEY) => "id".to_string(),
                Some(name) => index_by_name(name)
                    .map(|index| index.field.to_string())
                    .unwrap_or_else(|| name.to_string()),
                None => "unknown".to_string(),
            };
            return DatabaseError::Duplicate {
                collection: collection.to_string(),
                field,
            };
        }
    }
    DatabaseError::Sqlx(err)
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(&self, collection: &str, doc: Document) -> Result<Document, DatabaseError> {
        let mut inserted = self.insert_many(collection, vec![doc]).await?;
        inserted
            .pop()
            .ok_or_else(|| DatabaseError::InvalidDocument("insert produced no document".to_string()))
    }

    async fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<Vec<Document>, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(docs.len());

        for mut doc in docs {
            let id = document_id(&doc)?;
            stamp_created(&mut doc);
            sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
                .bind(collection)
                .bind(&id)
                .bind(Json(&doc))
                .execute(&mut *tx)
                .await
                .map_err(|e| map_write_error(collection, e))?;
            inserted.push(doc);
        }

        // Dropping the transaction on any earlier error rolls the batch back
        tx.commit().await?;
        Ok(inserted)
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, DatabaseError> {
        let (predicate, params) = Self::where_sql(filter);
        let sql = format!(
            "SELECT body FROM documents WHERE collection = $1 AND {} {}",
            predicate,
            filter.to_tail_sql()
        );
        debug!("find {}: {}", collection, sql);

        let mut query = sqlx::query_scalar::<_, Json<Document>>(&sql).bind(collection);
        for param in params {
            query = query.bind(Json(param));
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|Json(doc)| doc).collect())
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, DatabaseError> {
        let filter = filter.clone().limit(1)?;
        Ok(self.find(collection, &filter).await?.into_iter().next())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError> {
        let (predicate, params) = Self::where_sql(filter);
        let sql = format!("SELECT COUNT(*) FROM documents WHERE collection = $1 AND {}", predicate);

        let mut query = sqlx::query_scalar::<_, i64>(&sql).bind(collection);
        for param in params {
            query = query.bind(Json(param));
        }
        let count = query.fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        changes: Document,
    ) -> Result<Option<Document>, DatabaseError> {
        let (predicate, params) = Self::where_sql(filter);
        let sql = format!(
            "SELECT body FROM documents WHERE collection = $1 AND {} LIMIT 1 FOR UPDATE",
            predicate
        );

        let mut tx = self.pool.begin().await?;
        let mut query = sqlx::query_scalar::<_, Json<Document>>(&sql).bind(collection);
        for param in params {
            query = query.bind(Json(param));
        }
        let mut doc = match query.fetch_optional(&mut *tx).await? {
            Some(Json(doc)) => doc,
            None => return Ok(None),
        };

        let id = document_id(&doc)?;
        merge_changes(&mut doc, changes);
        sqlx::query("UPDATE documents SET body = $3 WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(&id)
            .bind(Json(&doc))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_error(collection, e))?;
        tx.commit().await?;

        Ok(Some(doc))
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, DatabaseError> {
        let (predicate, params) = Self::where_sql(filter);
        let sql = format!(
            "DELETE FROM documents WHERE collection = $1 AND id = (
                SELECT id FROM documents WHERE collection = $1 AND {} LIMIT 1
            ) RETURNING body",
            predicate
        );

        let mut query = sqlx::query_scalar::<_, Json<Document>>(&sql).bind(collection);
        for param in params {
            query = query.bind(Json(param));
        }
        Ok(query.fetch_optional(&self.pool).await?.map(|Json(doc)| doc))
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError> {
        let (predicate, params) = Self::where_sql(filter);
        let sql = format!("DELETE FROM documents WHERE collection = $1 AND {}", predicate);

        let mut query = sqlx::query(&sql).bind(collection);
        for param in params {
            query = query.bind(Json(param));
        }
        Ok(query.execute(&self.pool).await?.rows_affected())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_sql_is_partial_per_collection() {
        let statements = bootstrap_index_sql();
        assert_eq!(statements.len(), UNIQUE_INDEXES.len());
        let slug = statements
            .iter()
            .find(|s| s.contains("documents_hostel_profiles_slug_key"))
            .unwrap();
        assert!(slug.contains("(body->>'slug')"));
        assert!(slug.contains("collection = 'hostel_profiles'"));
    }
}
